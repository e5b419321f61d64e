use super::*;

#[test]
fn channel_flags_contains_and_count() {
    let rg = ChannelFlags::new(true, true, false, false);
    assert_eq!(rg.count(), 2);
    assert!(ChannelFlags::RGBA.contains(rg));
    assert!(!rg.contains(ChannelFlags::RGBA));
    assert!(rg.contains(ChannelFlags::NONE));
}

#[test]
fn pixel_type_sizes() {
    assert_eq!(PixelType::Bgra8Fixed.bytes_per_pixel(), 4);
    assert_eq!(PixelType::Rgba8Fixed.bytes_per_pixel(), 4);
    assert_eq!(PixelType::Rgba32Float.bytes_per_pixel(), 16);
    assert_eq!(PixelType::Rgba32Float.words_per_pixel(), 4);
    assert_eq!(PixelType::default(), PixelType::Bgra8Fixed);
}

#[test]
fn aspect_validity() {
    assert!(Aspect::from_size(16, 9).is_valid());
    assert!(!Aspect::new(0.0, 1.0).is_valid());
    assert!(!Aspect::new(f32::NAN, 1.0).is_valid());
}

#[test]
fn pixel_type_serde_names() {
    let s = serde_json::to_string(&PixelType::Rgba32Float).unwrap();
    assert_eq!(s, "\"rgba32_float\"");
}

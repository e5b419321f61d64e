use super::*;

#[test]
fn sizes_follow_pixel_type() {
    let b = PixelBuffer::new(5, 3, PixelType::Bgra8Fixed);
    assert_eq!(b.bytes().len(), 5 * 3 * 4);
    assert_eq!(b.row_bytes(), 20);

    let f = PixelBuffer::new(5, 3, PixelType::Rgba32Float);
    assert_eq!(f.bytes().len(), 5 * 3 * 16);
    assert_eq!(f.floats().unwrap().len(), 5 * 3 * 4);
    assert!(b.floats().is_none());
}

#[test]
fn every_allocation_gets_a_fresh_id() {
    let a = PixelBuffer::new(1, 1, PixelType::Rgba8Fixed);
    let b = PixelBuffer::new(1, 1, PixelType::Rgba8Fixed);
    assert_ne!(a.id(), b.id());
}

#[test]
fn bgra_stores_blue_first() {
    let mut b = PixelBuffer::new(2, 1, PixelType::Bgra8Fixed);
    b.set_pixel(1, 0, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(&b.bytes()[4..8], &[0, 0, 255, 255]);
    assert_eq!(b.pixel(1, 0), Some([1.0, 0.0, 0.0, 1.0]));
    assert_eq!(&b.to_rgba8()[4..8], &[255, 0, 0, 255]);
}

#[test]
fn float_pixels_round_trip_unclamped() {
    let mut b = PixelBuffer::new(1, 2, PixelType::Rgba32Float);
    b.set_pixel(0, 1, [2.5, 0.25, -1.0, 1.0]);
    assert_eq!(b.pixel(0, 1), Some([2.5, 0.25, -1.0, 1.0]));
    assert_eq!(&b.floats().unwrap()[4..8], &[2.5, 0.25, -1.0, 1.0]);
    assert_eq!(&b.to_rgba8()[4..8], &[255, 64, 0, 255]);
}

#[test]
fn out_of_bounds_access_is_ignored() {
    let mut b = PixelBuffer::new(2, 2, PixelType::Rgba8Fixed);
    b.set_pixel(2, 0, [1.0; 4]);
    assert!(b.bytes().iter().all(|&v| v == 0));
    assert_eq!(b.pixel(0, 2), None);
}

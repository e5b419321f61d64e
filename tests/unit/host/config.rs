use super::*;
use crate::buffers::pixel::PixelBuffer;
use crate::foundation::core::PixelType;

fn input(w: u32, h: u32) -> Texture {
    Texture::from_buffer(PixelBuffer::new(w, h, PixelType::Rgba8Fixed))
}

#[test]
fn empty_json_gives_defaults() {
    let cfg = HostConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, HostConfig::default());
}

#[test]
fn partial_json_overrides_fields() {
    let cfg = HostConfig::from_json_str(
        r#"{ "node": { "size": "half_input", "width": 640, "height": 360, "bits_per_channel": 16 } }"#,
    )
    .unwrap();
    assert_eq!(cfg.node.size, SizePolicy::HalfInput);
    assert_eq!(cfg.node.bits_per_channel, 16);
    assert_eq!(cfg.node.anti_alias, 1);
}

#[test]
fn invalid_json_and_values_are_rejected() {
    assert!(matches!(
        HostConfig::from_json_str("{ nope"),
        Err(TexOpError::Serde(_))
    ));
    assert!(HostConfig::from_json_str(r#"{ "node": { "width": 0 } }"#).is_err());
    assert!(HostConfig::from_json_str(r#"{ "caps": { "color_formats": [] } }"#).is_err());
}

#[test]
fn missing_file_is_a_validation_error() {
    let err = HostConfig::from_path("/definitely/not/here.json").unwrap_err();
    assert!(err.to_string().contains("open host config"));
}

#[test]
fn size_policies() {
    let inputs = [input(100, 50), input(33, 9)];
    let mut node = NodeConfig {
        width: 7,
        height: 5,
        ..NodeConfig::default()
    };

    let r = node.default_request(&inputs, 1);
    assert_eq!((r.width, r.height), (7, 5));

    node.size = SizePolicy::Input;
    let r = node.default_request(&inputs, 1);
    assert_eq!((r.width, r.height), (33, 9));
    let r = node.default_request(&inputs, 9);
    assert_eq!((r.width, r.height), (100, 50));
    let r = node.default_request(&[], 0);
    assert_eq!((r.width, r.height), (7, 5));

    node.size = SizePolicy::HalfInput;
    let r = node.default_request(&inputs, 1);
    assert_eq!((r.width, r.height), (16, 4));
}

#[test]
fn explicit_aspect_is_carried() {
    let node = NodeConfig {
        aspect: Some(Aspect::new(16.0, 9.0)),
        ..NodeConfig::default()
    };
    assert_eq!(node.default_request(&[], 0).aspect, Aspect::new(16.0, 9.0));
}

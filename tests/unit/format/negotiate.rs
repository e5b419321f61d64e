use super::*;
use crate::format::caps::ColorFormatCap;

fn rgba_only_caps() -> HostCaps {
    HostCaps {
        color_formats: vec![
            ColorFormatCap::new(ChannelLayout::Rgba, 8, false),
            ColorFormatCap::new(ChannelLayout::Rgba, 16, false),
            ColorFormatCap::new(ChannelLayout::Rgba, 32, true),
        ],
        ..HostCaps::default()
    }
}

fn request(width: u32, height: u32) -> OutputFormat {
    OutputFormat::new(width, height)
}

#[test]
fn size_is_honored_exactly() {
    for (w, h) in [(1, 1), (7, 1913), (1920, 1080), (4097, 3)] {
        let r = request(w, h);
        let caps = HostCaps::default();
        let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &caps).unwrap();
        assert_eq!((out.width, out.height), (w, h));
    }
}

#[test]
fn two_channel_16_fixed_widens_to_rgba_16_fixed() {
    let mut r = request(64, 32);
    r.channels = ChannelFlags::new(true, true, false, false);
    r.bits_per_channel = 16;
    r.float_precision = false;

    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &rgba_only_caps())
        .unwrap();
    assert_eq!(out.layout, ChannelLayout::Rgba);
    assert_eq!(out.bits_per_channel(), 16);
    assert!(!out.float_precision);
    assert_eq!((out.red_bits, out.green_bits), (16, 16));
    assert_eq!((out.blue_bits, out.alpha_bits), (16, 16));
    assert_eq!(out.populated, r.channels);
}

#[test]
fn bit_depth_rounds_up_when_supported() {
    let mut r = request(16, 16);
    r.bits_per_channel = 12;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap();
    assert_eq!(out.bits_per_channel(), 16);
    assert!(!out.float_precision);
}

#[test]
fn bit_depth_falls_to_nearest_lower_when_unsupported() {
    let caps = HostCaps {
        color_formats: vec![
            ColorFormatCap::new(ChannelLayout::Rgba, 8, false),
            ColorFormatCap::new(ChannelLayout::Rgba, 10, false),
        ],
        ..HostCaps::default()
    };
    let mut r = request(16, 16);
    r.bits_per_channel = 16;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &caps).unwrap();
    assert_eq!(out.bits_per_channel(), 10);
}

#[test]
fn float_downgrades_to_fixed_only_without_float_support() {
    let caps = HostCaps {
        color_formats: vec![
            ColorFormatCap::new(ChannelLayout::Rgba, 8, false),
            ColorFormatCap::new(ChannelLayout::Rgba, 16, false),
        ],
        ..HostCaps::default()
    };
    let mut r = request(16, 16);
    r.bits_per_channel = 16;
    r.float_precision = true;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &caps).unwrap();
    assert!(!out.float_precision);
    assert_eq!(out.bits_per_channel(), 16);

    // With float available at a deeper precision, float is kept and depth rounds up.
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &rgba_only_caps())
        .unwrap();
    assert!(out.float_precision);
    assert_eq!(out.bits_per_channel(), 32);
}

#[test]
fn fixed_32_request_uses_float_32() {
    let mut r = request(16, 16);
    r.bits_per_channel = 32;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &rgba_only_caps())
        .unwrap();
    assert_eq!(out.bits_per_channel(), 32);
    assert!(out.float_precision);
}

#[test]
fn no_opinion_resolves_node_default() {
    let mut node_default = request(320, 240);
    node_default.bits_per_channel = 16;
    let out = negotiate(None, &node_default, ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap();
    assert_eq!((out.width, out.height), (320, 240));
    assert_eq!(out.bits_per_channel(), 16);
}

#[test]
fn cpu_modes_drop_render_target_extras() {
    let mut r = request(32, 32);
    r.anti_alias = 4;
    r.color_buffers = 3;
    r.depth_bits = 24;
    r.stencil_bits = 8;
    for mode in [ExecuteMode::CpuWriteOnly, ExecuteMode::CpuReadWrite] {
        let out = negotiate(Some(&r), &request(8, 8), mode, &HostCaps::default()).unwrap();
        assert_eq!(out.anti_alias, 1);
        assert_eq!(out.color_buffers, 1);
        assert_eq!((out.depth_bits, out.stencil_bits), (0, 0));
    }
}

#[test]
fn stencil_implies_depth() {
    let mut r = request(32, 32);
    r.stencil_bits = 8;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap();
    assert_eq!(out.stencil_bits, 8);
    assert_eq!(out.depth_bits, 16);
}

#[test]
fn anti_alias_and_color_buffers_clamp_to_caps() {
    let mut r = request(32, 32);
    r.anti_alias = 6;
    r.color_buffers = 40;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap();
    assert_eq!(out.anti_alias, 4);
    assert_eq!(out.color_buffers, 8);

    r.anti_alias = 0;
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap();
    assert_eq!(out.anti_alias, 1);
}

#[test]
fn uncovered_channels_fall_back_to_widest_layout() {
    let mut r = request(8, 8);
    r.channels = ChannelFlags::new(false, false, true, false);
    let caps = HostCaps {
        color_formats: vec![
            ColorFormatCap::new(ChannelLayout::R, 8, false),
            ColorFormatCap::new(ChannelLayout::Rg, 8, false),
        ],
        ..HostCaps::default()
    };
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &caps).unwrap();
    assert_eq!(out.layout, ChannelLayout::Rg);
}

#[test]
fn invalid_aspect_is_derived_from_size() {
    let mut r = request(200, 100);
    r.aspect = Aspect::new(0.0, 0.0);
    let out = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap();
    assert_eq!(out.aspect, Aspect::new(200.0, 100.0));
}

#[test]
fn zero_size_is_rejected() {
    let r = request(0, 10);
    let err = negotiate(Some(&r), &request(8, 8), ExecuteMode::RenderTarget, &HostCaps::default())
        .unwrap_err();
    assert!(err.to_string().contains("non-zero"));
}

#[test]
fn size_beyond_texture_limit_is_rejected() {
    let caps = HostCaps {
        max_texture_size: 4096,
        ..HostCaps::default()
    };
    let at_limit = request(4096, 4096);
    negotiate(Some(&at_limit), &request(8, 8), ExecuteMode::RenderTarget, &caps).unwrap();

    for (w, h) in [(4097, 8), (8, 4097), (70_000, 1)] {
        let r = request(w, h);
        for mode in [ExecuteMode::RenderTarget, ExecuteMode::CpuWriteOnly] {
            let err = negotiate(Some(&r), &request(8, 8), mode, &caps).unwrap_err();
            assert!(matches!(err, TexOpError::Negotiation(_)), "{w}x{h} {mode:?}");
        }
    }
}

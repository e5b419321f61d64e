use crate::foundation::core::{Aspect, ChannelFlags};

/// The output a module would like the host to allocate.
///
/// The host hands the module a request pre-filled from node configuration. A module that wants a
/// different output clones it, edits fields, and returns it. New fields are only ever appended,
/// so the struct is `#[non_exhaustive]`: build it with [`OutputFormat::new`] or from the pre-filled
/// value, never with a struct literal.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub struct OutputFormat {
    /// Width in pixels. Always honored exactly.
    pub width: u32,
    /// Height in pixels. Always honored exactly.
    pub height: u32,
    /// Output aspect ratio. Non-positive values mean "derive from width/height".
    pub aspect: Aspect,
    /// Multisample level, 1 (off) to 32. Render-target mode only.
    pub anti_alias: u32,
    /// Channels the module wants. Extra channels may still be present in the result.
    pub channels: ChannelFlags,
    /// Desired bits per channel.
    pub bits_per_channel: u32,
    /// Prefer floating-point storage.
    pub float_precision: bool,
    /// Number of color targets. Render-target mode only.
    pub color_buffers: u32,
    /// Depth buffer bits, 0 for none. Render-target mode only.
    pub depth_bits: u32,
    /// Stencil buffer bits, 0 for none. A stencil buffer implies a depth buffer.
    pub stencil_bits: u32,
}

impl OutputFormat {
    /// 8-bit fixed RGBA at the given size with no multisampling or depth.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            aspect: Aspect::from_size(width, height),
            anti_alias: 1,
            channels: ChannelFlags::RGBA,
            bits_per_channel: 8,
            float_precision: false,
            color_buffers: 1,
            depth_bits: 0,
            stencil_bits: 0,
        }
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(256, 256)
    }
}

use crate::foundation::core::ChannelFlags;
use crate::foundation::error::{TexOpError, TexOpResult};

/// Physical channel arrangement of a color format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelLayout {
    /// Single red channel.
    R,
    /// Single alpha channel.
    A,
    /// Red and green.
    Rg,
    /// Red, green and blue.
    Rgb,
    /// All four channels.
    Rgba,
}

impl ChannelLayout {
    /// Channels physically present in this layout.
    pub fn flags(self) -> ChannelFlags {
        match self {
            Self::R => ChannelFlags::new(true, false, false, false),
            Self::A => ChannelFlags::new(false, false, false, true),
            Self::Rg => ChannelFlags::new(true, true, false, false),
            Self::Rgb => ChannelFlags::new(true, true, true, false),
            Self::Rgba => ChannelFlags::RGBA,
        }
    }

    /// Number of physical channels.
    pub fn channel_count(self) -> u32 {
        self.flags().count()
    }

    /// `true` when every requested channel exists in this layout.
    pub fn covers(self, requested: ChannelFlags) -> bool {
        self.flags().contains(requested)
    }
}

/// One color format the host can allocate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ColorFormatCap {
    /// Channel arrangement.
    pub layout: ChannelLayout,
    /// Bits per channel.
    pub bits: u32,
    /// Floating-point storage.
    pub float: bool,
}

impl ColorFormatCap {
    /// Build a capability entry.
    pub const fn new(layout: ChannelLayout, bits: u32, float: bool) -> Self {
        Self {
            layout,
            bits,
            float,
        }
    }
}

/// What the host's graphics device can allocate.
///
/// Negotiation never fails because of a format gap; it only picks the closest entry. The one hard
/// limit is `max_texture_size`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HostCaps {
    /// Supported color formats.
    pub color_formats: Vec<ColorFormatCap>,
    /// Supported depth-buffer bit depths (excluding 0).
    pub depth_bits: Vec<u32>,
    /// Supported stencil-buffer bit depths (excluding 0).
    pub stencil_bits: Vec<u32>,
    /// Highest multisample count.
    pub max_anti_alias: u32,
    /// Highest number of simultaneous color targets.
    pub max_color_buffers: u32,
    /// Largest width or height of an output texture, at most [`MAX_TEXTURE_SIZE`].
    pub max_texture_size: u32,
}

/// Upper bound on anti-alias samples accepted in a request.
pub const MAX_ANTI_ALIAS: u32 = 32;
/// Upper bound on color targets accepted in a request.
pub const MAX_COLOR_BUFFERS: u32 = 32;
/// Upper bound on `max_texture_size`; render targets address pixels with `u16`.
pub const MAX_TEXTURE_SIZE: u32 = u16::MAX as u32;

impl Default for HostCaps {
    fn default() -> Self {
        use ChannelLayout::*;
        let mut color_formats = vec![ColorFormatCap::new(A, 8, false)];
        for layout in [R, Rg, Rgba] {
            color_formats.push(ColorFormatCap::new(layout, 8, false));
            color_formats.push(ColorFormatCap::new(layout, 16, false));
            color_formats.push(ColorFormatCap::new(layout, 16, true));
            color_formats.push(ColorFormatCap::new(layout, 32, true));
        }
        Self {
            color_formats,
            depth_bits: vec![16, 24, 32],
            stencil_bits: vec![8],
            max_anti_alias: 8,
            max_color_buffers: 8,
            max_texture_size: 16384,
        }
    }
}

impl HostCaps {
    /// Reject capability tables negotiation could not pick from.
    pub fn validate(&self) -> TexOpResult<()> {
        if self.color_formats.is_empty() {
            return Err(TexOpError::validation(
                "host caps must list at least one color format",
            ));
        }
        if let Some(c) = self.color_formats.iter().find(|c| c.bits == 0) {
            return Err(TexOpError::validation(format!(
                "color format {:?} has zero bits per channel",
                c.layout
            )));
        }
        if self.depth_bits.contains(&0) || self.stencil_bits.contains(&0) {
            return Err(TexOpError::validation(
                "depth/stencil caps list bit depths, 0 is implied",
            ));
        }
        if self.max_anti_alias == 0 || self.max_color_buffers == 0 {
            return Err(TexOpError::validation(
                "max_anti_alias and max_color_buffers must be >= 1",
            ));
        }
        if !(1..=MAX_TEXTURE_SIZE).contains(&self.max_texture_size) {
            return Err(TexOpError::validation(format!(
                "max_texture_size must be in 1..={MAX_TEXTURE_SIZE}, got {}",
                self.max_texture_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/format/caps.rs"]
mod tests;

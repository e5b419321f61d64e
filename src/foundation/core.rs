/// Interface version implemented by this host.
///
/// Modules report the version they were built against through
/// [`crate::OperatorFactory::api_version`].
pub const API_VERSION: u32 = 4;

/// Oldest module interface version this host still loads.
///
/// Every capability added after this version has a no-op default on
/// [`crate::TextureOperator`], so older modules keep working unchanged.
pub const MIN_SUPPORTED_API_VERSION: u32 = 3;

/// 0-based index of a cook on one operator instance.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize,
    serde::Deserialize,
)]
pub struct FrameIndex(pub u64);

/// Output aspect ratio as `x:y`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Aspect {
    /// Horizontal component.
    pub x: f32,
    /// Vertical component.
    pub y: f32,
}

impl Aspect {
    /// Build an aspect ratio.
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Aspect derived from pixel dimensions (square pixels).
    pub fn from_size(width: u32, height: u32) -> Self {
        Self {
            x: width as f32,
            y: height as f32,
        }
    }

    /// `true` when both components are finite and positive.
    pub fn is_valid(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.x > 0.0 && self.y > 0.0
    }
}

/// Per-channel inclusion flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ChannelFlags {
    /// Red channel requested / populated.
    pub red: bool,
    /// Green channel requested / populated.
    pub green: bool,
    /// Blue channel requested / populated.
    pub blue: bool,
    /// Alpha channel requested / populated.
    pub alpha: bool,
}

impl ChannelFlags {
    /// All four channels.
    pub const RGBA: Self = Self {
        red: true,
        green: true,
        blue: true,
        alpha: true,
    };

    /// No channels.
    pub const NONE: Self = Self {
        red: false,
        green: false,
        blue: false,
        alpha: false,
    };

    /// Build from explicit flags.
    pub fn new(red: bool, green: bool, blue: bool, alpha: bool) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Number of channels set.
    pub fn count(self) -> u32 {
        [self.red, self.green, self.blue, self.alpha]
            .into_iter()
            .filter(|&c| c)
            .count() as u32
    }

    /// `true` when every channel set in `other` is also set in `self`.
    pub fn contains(self, other: Self) -> bool {
        (!other.red || self.red)
            && (!other.green || self.green)
            && (!other.blue || self.blue)
            && (!other.alpha || self.alpha)
    }
}

impl Default for ChannelFlags {
    fn default() -> Self {
        Self::RGBA
    }
}

/// Element layout of CPU pixel memory.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum PixelType {
    /// 4x 8-bit fixed, ordered B,G,R,A. Preferred ordering for upload speed.
    #[default]
    Bgra8Fixed,
    /// 4x 8-bit fixed, ordered R,G,B,A.
    Rgba8Fixed,
    /// 4x 32-bit float, ordered R,G,B,A.
    Rgba32Float,
}

impl PixelType {
    /// Size of one pixel in bytes.
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            Self::Bgra8Fixed | Self::Rgba8Fixed => 4,
            Self::Rgba32Float => 16,
        }
    }

    /// Size of one pixel in 32-bit storage words.
    pub(crate) fn words_per_pixel(self) -> usize {
        self.bytes_per_pixel() / 4
    }

    /// `true` for the floating-point layout.
    pub fn is_float(self) -> bool {
        matches!(self, Self::Rgba32Float)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;

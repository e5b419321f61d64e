use crate::format::caps::HostCaps;
use crate::format::request::OutputFormat;
use crate::foundation::core::{Aspect, ChannelFlags};
use crate::foundation::error::{TexOpError, TexOpResult};
use crate::render::texture::Texture;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// How a node picks its default output size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePolicy {
    /// Use [`NodeConfig::width`] x [`NodeConfig::height`].
    #[default]
    Custom,
    /// Inherit the size of the input chosen by `input_size_index`.
    Input,
    /// Half the size of that input (rounded down, at least 1).
    HalfInput,
}

/// Node-level output configuration. This pre-fills the module's format request.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct NodeConfig {
    /// Size policy.
    pub size: SizePolicy,
    /// Custom width, and the fallback when the chosen input is missing.
    pub width: u32,
    /// Custom height, and the fallback when the chosen input is missing.
    pub height: u32,
    /// Explicit aspect ratio; derived from the size when absent.
    pub aspect: Option<Aspect>,
    /// Default channels.
    pub channels: ChannelFlags,
    /// Default bits per channel.
    pub bits_per_channel: u32,
    /// Default float preference.
    pub float_precision: bool,
    /// Default multisample level.
    pub anti_alias: u32,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            size: SizePolicy::Custom,
            width: 256,
            height: 256,
            aspect: None,
            channels: ChannelFlags::RGBA,
            bits_per_channel: 8,
            float_precision: false,
            anti_alias: 1,
        }
    }
}

impl NodeConfig {
    /// The request the node would make on its own.
    ///
    /// `input_size_index` selects the input for the input-following policies; a missing input
    /// falls back to input 0, then to the custom size.
    pub fn default_request(&self, inputs: &[Texture], input_size_index: usize) -> OutputFormat {
        let input = inputs.get(input_size_index).or_else(|| inputs.first());
        let (width, height) = match (self.size, input) {
            (SizePolicy::Input, Some(t)) => (t.width(), t.height()),
            (SizePolicy::HalfInput, Some(t)) => ((t.width() / 2).max(1), (t.height() / 2).max(1)),
            _ => (self.width, self.height),
        };

        let mut req = OutputFormat::new(width, height);
        if let Some(aspect) = self.aspect {
            req.aspect = aspect;
        }
        req.channels = self.channels;
        req.bits_per_channel = self.bits_per_channel;
        req.float_precision = self.float_precision;
        req.anti_alias = self.anti_alias;
        req
    }
}

/// Everything the host needs to run operator nodes.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Device capabilities.
    pub caps: HostCaps,
    /// Node output configuration.
    pub node: NodeConfig,
}

impl HostConfig {
    /// Parse configuration from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> TexOpResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| TexOpError::serde(format!("parse host config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse configuration from a JSON string.
    pub fn from_json_str(s: &str) -> TexOpResult<Self> {
        Self::from_reader(s.as_bytes())
    }

    /// Parse configuration from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> TexOpResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            TexOpError::validation(format!("open host config '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Check capability and node settings for consistency.
    pub fn validate(&self) -> TexOpResult<()> {
        self.caps.validate()?;
        if self.node.width == 0 || self.node.height == 0 {
            return Err(TexOpError::validation("node width/height must be >= 1"));
        }
        if self.node.bits_per_channel == 0 {
            return Err(TexOpError::validation("node bits_per_channel must be >= 1"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/host/config.rs"]
mod tests;

use crate::execute::mode::ExecuteMode;
use crate::format::caps::{
    ChannelLayout, ColorFormatCap, HostCaps, MAX_ANTI_ALIAS, MAX_COLOR_BUFFERS, MAX_TEXTURE_SIZE,
};
use crate::format::request::OutputFormat;
use crate::foundation::core::{Aspect, ChannelFlags};
use crate::foundation::error::{TexOpError, TexOpResult};
use std::cmp::Reverse;

/// How color target 0 is attached in render-target mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorAttachmentKind {
    /// A sampled 2D texture.
    Texture2d,
    /// A multisampled renderbuffer, resolved by the host after the cook.
    Renderbuffer,
}

/// Handles of the host targets bound for one render-target cook.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RenderBinding {
    /// Identifier of the framebuffer object the host has bound.
    pub fbo_index: u32,
    /// Attachment kind of color target 0.
    pub color0_kind: ColorAttachmentKind,
    /// One handle per color target.
    pub color_buffers: Vec<u32>,
    /// Depth/stencil buffer handle, present when depth or stencil bits are non-zero.
    pub depth_buffer: Option<u32>,
}

/// The format the host actually allocated for this cook.
///
/// Valid only while the current cook's `execute` runs.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub struct ResolvedFormat {
    /// Width in pixels (equals the request).
    pub width: u32,
    /// Height in pixels (equals the request).
    pub height: u32,
    /// Final aspect ratio.
    pub aspect: Aspect,
    /// Final multisample level.
    pub anti_alias: u32,
    /// Physical channel layout of the color targets.
    pub layout: ChannelLayout,
    /// Bits in the red channel, 0 when absent.
    pub red_bits: u32,
    /// Bits in the green channel, 0 when absent.
    pub green_bits: u32,
    /// Bits in the blue channel, 0 when absent.
    pub blue_bits: u32,
    /// Bits in the alpha channel, 0 when absent.
    pub alpha_bits: u32,
    /// Floating-point storage.
    pub float_precision: bool,
    /// Channels the module asked for. Physical channels outside this set carry no meaning.
    pub populated: ChannelFlags,
    /// Number of color targets.
    pub color_buffers: u32,
    /// Depth buffer bits.
    pub depth_bits: u32,
    /// Stencil buffer bits.
    pub stencil_bits: u32,
    /// Bound target handles. Render-target mode only, filled by the host before `execute`.
    pub render: Option<RenderBinding>,
}

impl ResolvedFormat {
    /// Bits per channel of the chosen color format.
    pub fn bits_per_channel(&self) -> u32 {
        self.red_bits
            .max(self.green_bits)
            .max(self.blue_bits)
            .max(self.alpha_bits)
    }
}

/// Reconcile a module's preference with host capability.
///
/// `request == None` is the module's "no opinion": the node configuration's `node_default` is
/// resolved instead. Width and height are honored exactly; everything else is matched to the
/// closest entry in `caps`. Mismatches are never errors; the only failures are a zero-sized
/// output and one larger than `caps.max_texture_size` on either side.
#[tracing::instrument(skip(request, node_default, caps))]
pub fn negotiate(
    request: Option<&OutputFormat>,
    node_default: &OutputFormat,
    mode: ExecuteMode,
    caps: &HostCaps,
) -> TexOpResult<ResolvedFormat> {
    let req = request.unwrap_or(node_default);
    if req.width == 0 || req.height == 0 {
        return Err(TexOpError::negotiation(format!(
            "output size must be non-zero, got {}x{}",
            req.width, req.height
        )));
    }
    let limit = caps.max_texture_size.min(MAX_TEXTURE_SIZE);
    if req.width > limit || req.height > limit {
        return Err(TexOpError::negotiation(format!(
            "output size {}x{} exceeds the host limit of {limit}",
            req.width, req.height
        )));
    }

    let color = pick_color_format(caps, req.channels, req.bits_per_channel, req.float_precision)?;
    let present = color.layout.flags();
    let bits_if = |on: bool| if on { color.bits } else { 0 };

    let aspect = if req.aspect.is_valid() {
        req.aspect
    } else {
        Aspect::from_size(req.width, req.height)
    };

    let (anti_alias, color_buffers, depth_bits, stencil_bits) = if mode.is_cpu() {
        (1, 1, 0, 0)
    } else {
        let (depth, stencil) = pick_depth_stencil(caps, req.depth_bits, req.stencil_bits);
        (
            pick_anti_alias(caps, req.anti_alias),
            req.color_buffers
                .clamp(1, MAX_COLOR_BUFFERS.min(caps.max_color_buffers.max(1))),
            depth,
            stencil,
        )
    };

    let substituted = color.bits != req.bits_per_channel || color.float != req.float_precision;
    if request.is_some() && substituted {
        tracing::debug!(
            requested_bits = req.bits_per_channel,
            requested_float = req.float_precision,
            bits = color.bits,
            float = color.float,
            "substituted nearest supported color format"
        );
    }

    Ok(ResolvedFormat {
        width: req.width,
        height: req.height,
        aspect,
        anti_alias,
        layout: color.layout,
        red_bits: bits_if(present.red),
        green_bits: bits_if(present.green),
        blue_bits: bits_if(present.blue),
        alpha_bits: bits_if(present.alpha),
        float_precision: color.float,
        populated: req.channels,
        color_buffers,
        depth_bits,
        stencil_bits,
        render: None,
    })
}

/// Closest supported color format.
///
/// Preference order: same precision with enough bits, the other precision with enough bits, then
/// the deepest format below the request. Within a tier the fewest bits win, then the fewest
/// channels.
pub(crate) fn pick_color_format(
    caps: &HostCaps,
    channels: ChannelFlags,
    bits: u32,
    float: bool,
) -> TexOpResult<ColorFormatCap> {
    let mut covering: Vec<ColorFormatCap> = caps
        .color_formats
        .iter()
        .copied()
        .filter(|c| c.layout.covers(channels))
        .collect();
    if covering.is_empty() {
        // Nothing holds every requested channel: fall back to the widest layouts on offer.
        let widest = caps
            .color_formats
            .iter()
            .map(|c| c.layout.channel_count())
            .max()
            .unwrap_or(0);
        covering = caps
            .color_formats
            .iter()
            .copied()
            .filter(|c| c.layout.channel_count() == widest)
            .collect();
    }

    let rank = |c: &ColorFormatCap| (c.bits, c.layout.channel_count());
    let at_least = |want_float: bool| {
        covering
            .iter()
            .filter(|c| c.float == want_float && c.bits >= bits)
            .min_by_key(|c| rank(c))
            .copied()
    };

    at_least(float)
        .or_else(|| at_least(!float))
        .or_else(|| {
            covering
                .iter()
                .max_by_key(|c| (c.bits, c.float == float, Reverse(c.layout.channel_count())))
                .copied()
        })
        .ok_or_else(|| TexOpError::negotiation("host exposes no color formats"))
}

fn pick_anti_alias(caps: &HostCaps, requested: u32) -> u32 {
    let cap = MAX_ANTI_ALIAS.min(caps.max_anti_alias.max(1));
    let n = requested.clamp(1, cap);
    // Multisample counts are powers of two; round down.
    1 << (31 - n.leading_zeros())
}

fn pick_depth_stencil(caps: &HostCaps, depth: u32, stencil: u32) -> (u32, u32) {
    let stencil = if stencil == 0 {
        0
    } else {
        round_up_or_nearest(&caps.stencil_bits, stencil)
    };
    // A stencil buffer always comes with a depth buffer.
    let want_depth = if stencil > 0 { depth.max(1) } else { depth };
    let depth = if want_depth == 0 {
        0
    } else {
        round_up_or_nearest(&caps.depth_bits, want_depth)
    };
    (depth, stencil)
}

fn round_up_or_nearest(supported: &[u32], want: u32) -> u32 {
    supported
        .iter()
        .copied()
        .filter(|&b| b >= want)
        .min()
        .or_else(|| supported.iter().copied().max())
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "../../tests/unit/format/negotiate.rs"]
mod tests;

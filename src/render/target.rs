use crate::buffers::pixel::PixelBuffer;
use crate::format::negotiate::{ColorAttachmentKind, RenderBinding, ResolvedFormat};
use crate::foundation::core::{FrameIndex, PixelType};
use crate::foundation::error::{TexOpError, TexOpResult};
use crate::render::texture::{Texture, over_in_place};
use std::sync::atomic::{AtomicU32, Ordering};

static NEXT_HANDLE: AtomicU32 = AtomicU32::new(1);

fn handle() -> u32 {
    NEXT_HANDLE.fetch_add(1, Ordering::Relaxed)
}

/// Host-owned color targets lent to a render-target module during `execute`.
///
/// Drawing goes through one `vello_cpu::RenderContext` per color target. The host resolves color
/// target 0 into the node's texture after `execute` returns.
pub struct RenderTarget {
    width: u16,
    height: u16,
    anti_alias: u32,
    depth_bits: u32,
    stencil_bits: u32,
    contexts: Vec<vello_cpu::RenderContext>,
    scratch: vello_cpu::Pixmap,
    binding: RenderBinding,
}

impl std::fmt::Debug for RenderTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderTarget")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("binding", &self.binding)
            .finish_non_exhaustive()
    }
}

impl RenderTarget {
    pub(crate) fn allocate(format: &ResolvedFormat) -> TexOpResult<Self> {
        let width: u16 = format
            .width
            .try_into()
            .map_err(|_| TexOpError::negotiation("render target width exceeds u16"))?;
        let height: u16 = format
            .height
            .try_into()
            .map_err(|_| TexOpError::negotiation("render target height exceeds u16"))?;

        let count = format.color_buffers.max(1) as usize;
        let contexts = (0..count)
            .map(|_| vello_cpu::RenderContext::new(width, height))
            .collect();
        let binding = RenderBinding {
            fbo_index: handle(),
            color0_kind: if format.anti_alias > 1 {
                ColorAttachmentKind::Renderbuffer
            } else {
                ColorAttachmentKind::Texture2d
            },
            color_buffers: (0..count).map(|_| handle()).collect(),
            depth_buffer: (format.depth_bits > 0 || format.stencil_bits > 0).then(handle),
        };
        tracing::debug!(width, height, fbo = binding.fbo_index, count, "allocated render target");

        Ok(Self {
            width,
            height,
            anti_alias: format.anti_alias,
            depth_bits: format.depth_bits,
            stencil_bits: format.stencil_bits,
            contexts,
            scratch: vello_cpu::Pixmap::new(width, height),
            binding,
        })
    }

    /// `true` when the current allocation already satisfies `format`.
    pub(crate) fn fits(&self, format: &ResolvedFormat) -> bool {
        u32::from(self.width) == format.width
            && u32::from(self.height) == format.height
            && self.contexts.len() == format.color_buffers.max(1) as usize
            && self.anti_alias == format.anti_alias
            && self.depth_bits == format.depth_bits
            && self.stencil_bits == format.stencil_bits
    }

    pub(crate) fn begin_cook(&mut self) {
        for ctx in &mut self.contexts {
            ctx.reset();
        }
    }

    /// Handles the host bound for this cook.
    pub fn binding(&self) -> &RenderBinding {
        &self.binding
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        u32::from(self.width)
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        u32::from(self.height)
    }

    /// Number of color targets.
    pub fn color_buffer_count(&self) -> usize {
        self.contexts.len()
    }

    /// Drawing context for color target `index`.
    pub fn color(&mut self, index: usize) -> Option<&mut vello_cpu::RenderContext> {
        self.contexts.get_mut(index)
    }

    /// Drawing context for color target 0.
    pub fn primary(&mut self) -> &mut vello_cpu::RenderContext {
        &mut self.contexts[0]
    }

    /// Rasterize color target 0 into a texture.
    ///
    /// Without `clear`, the new drawing is composited over `previous` when sizes match.
    pub(crate) fn resolve(
        &mut self,
        frame: FrameIndex,
        previous: Option<&Texture>,
        clear: bool,
    ) -> TexOpResult<Texture> {
        let ctx = &mut self.contexts[0];
        ctx.flush();
        ctx.render_to_pixmap(&mut self.scratch);
        let drawn = self.scratch.data_as_u8_slice();

        let mut out = PixelBuffer::new(self.width(), self.height(), PixelType::Rgba8Fixed);
        let keep = previous.filter(|p| {
            !clear
                && p.source() == crate::render::texture::TextureSource::RenderTarget
                && p.width() == self.width()
                && p.height() == self.height()
        });
        match keep {
            Some(prev) => {
                out.bytes_mut().copy_from_slice(prev.buffer().bytes());
                over_in_place(out.bytes_mut(), drawn)?;
            }
            None => out.bytes_mut().copy_from_slice(drawn),
        }
        Ok(Texture::rendered(frame, out))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/target.rs"]
mod tests;

use crate::buffers::pixel::PixelBuffer;
use crate::foundation::core::{FrameIndex, PixelType};
use crate::foundation::error::{TexOpError, TexOpResult};

/// Where a texture's pixels came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextureSource {
    /// Uploaded from a CPU slot.
    CpuSlot {
        /// Slot index that was uploaded.
        slot: usize,
    },
    /// Resolved from color target 0 of a render-target cook (premultiplied RGBA8).
    RenderTarget,
    /// Supplied by the host as an operator input.
    Input,
}

/// A GPU-side image as the host sees it: the displayed output of a node, or an input to one.
#[derive(Debug)]
pub struct Texture {
    source: TextureSource,
    frame: FrameIndex,
    buffer: PixelBuffer,
    mips: Vec<PixelBuffer>,
}

impl Texture {
    /// Wrap host pixels as an input texture.
    pub fn from_buffer(buffer: PixelBuffer) -> Self {
        Self {
            source: TextureSource::Input,
            frame: FrameIndex(0),
            buffer,
            mips: Vec::new(),
        }
    }

    pub(crate) fn uploaded(slot: usize, frame: FrameIndex, buffer: PixelBuffer) -> Self {
        Self {
            source: TextureSource::CpuSlot { slot },
            frame,
            buffer,
            mips: Vec::new(),
        }
    }

    pub(crate) fn rendered(frame: FrameIndex, buffer: PixelBuffer) -> Self {
        Self {
            source: TextureSource::RenderTarget,
            frame,
            buffer,
            mips: Vec::new(),
        }
    }

    /// Origin of the pixels.
    pub fn source(&self) -> TextureSource {
        self.source
    }

    /// Cook that produced this texture.
    pub fn frame(&self) -> FrameIndex {
        self.frame
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    /// Pixel layout of level 0.
    pub fn pixel_type(&self) -> PixelType {
        self.buffer.pixel_type()
    }

    /// Level-0 pixels.
    pub fn buffer(&self) -> &PixelBuffer {
        &self.buffer
    }

    /// Number of mip levels below level 0.
    pub fn mip_levels(&self) -> usize {
        self.mips.len()
    }

    /// Mip level `level` (1-based; level 0 is [`Texture::buffer`]).
    pub fn mip(&self, level: usize) -> Option<&PixelBuffer> {
        level.checked_sub(1).and_then(|i| self.mips.get(i))
    }

    /// Level-0 pixels as tightly packed RGBA8.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.buffer.to_rgba8()
    }

    /// Build a box-filtered mip chain down to 1x1. Idempotent.
    pub(crate) fn build_mips(&mut self) {
        if !self.mips.is_empty() {
            return;
        }
        let mut out: Vec<PixelBuffer> = Vec::new();
        loop {
            let prev = out.last().unwrap_or(&self.buffer);
            if prev.width() <= 1 && prev.height() <= 1 {
                break;
            }
            let next = downsample(prev);
            out.push(next);
        }
        self.mips = out;
    }
}

fn downsample(src: &PixelBuffer) -> PixelBuffer {
    let w = (src.width() / 2).max(1);
    let h = (src.height() / 2).max(1);
    let mut dst = PixelBuffer::new(w, h, src.pixel_type());
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0.0f32; 4];
            let mut n = 0.0f32;
            for (sx, sy) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
                if let Some(p) = src.pixel(x * 2 + sx, y * 2 + sy) {
                    for (a, v) in acc.iter_mut().zip(p) {
                        *a += v;
                    }
                    n += 1.0;
                }
            }
            dst.set_pixel(x, y, acc.map(|a| a / n.max(1.0)));
        }
    }
    dst
}

/// Premultiplied source-over of `src` onto `dst`, both tightly packed RGBA8.
pub(crate) fn over_in_place(dst: &mut [u8], src: &[u8]) -> TexOpResult<()> {
    if dst.len() != src.len() || !dst.len().is_multiple_of(4) {
        return Err(TexOpError::validation(
            "over_in_place expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
        d.copy_from_slice(&out);
    }
    Ok(())
}

fn over(dst: [u8; 4], src: [u8; 4]) -> [u8; 4] {
    if src[3] == 0 {
        return dst;
    }
    let inv = 255u16 - u16::from(src[3]);
    let mut out = [0u8; 4];
    for i in 0..4 {
        out[i] = add_sat_u8(u16::from(src[i]), mul_div255(u16::from(dst[i]), inv));
    }
    out
}

fn mul_div255(a: u16, b: u16) -> u16 {
    ((u32::from(a) * u32::from(b) + 127) / 255) as u16
}

fn add_sat_u8(a: u16, b: u16) -> u8 {
    (a + b).min(255) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/texture.rs"]
mod tests;

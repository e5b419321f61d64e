use crate::foundation::core::PixelType;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUFFER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of one host allocation.
///
/// Two handles with the same id refer to the same memory; a replacement allocation always gets a
/// fresh id. This is what "the slot's address changed" means for safe code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BufferId(u64);

impl BufferId {
    fn fresh() -> Self {
        Self(NEXT_BUFFER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// Host-allocated CPU pixel memory of `width * height * bytes_per_pixel` bytes.
///
/// Rows are tightly packed, top row first; pixel `(x, y)` starts at byte
/// `bytes_per_pixel * (y * width + x)`. Storage is word-aligned so float layouts can be viewed as
/// `f32` without copying.
#[derive(Debug)]
pub struct PixelBuffer {
    id: BufferId,
    width: u32,
    height: u32,
    pixel_type: PixelType,
    words: Box<[u32]>,
}

impl PixelBuffer {
    /// Allocate a buffer. Contents are unspecified; modules must write every pixel.
    pub fn new(width: u32, height: u32, pixel_type: PixelType) -> Self {
        let len = (width as usize)
            .saturating_mul(height as usize)
            .saturating_mul(pixel_type.words_per_pixel());
        Self {
            id: BufferId::fresh(),
            width,
            height,
            pixel_type,
            words: vec![0u32; len].into_boxed_slice(),
        }
    }

    /// Allocation identity.
    pub fn id(&self) -> BufferId {
        self.id
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel layout.
    pub fn pixel_type(&self) -> PixelType {
        self.pixel_type
    }

    /// Length of one row in bytes.
    pub fn row_bytes(&self) -> usize {
        self.width as usize * self.pixel_type.bytes_per_pixel()
    }

    /// `true` when this buffer fits a slot of the given geometry.
    pub fn matches(&self, width: u32, height: u32, pixel_type: PixelType) -> bool {
        self.width == width && self.height == height && self.pixel_type == pixel_type
    }

    /// Raw bytes.
    pub fn bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.words)
    }

    /// Raw bytes, writable.
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        bytemuck::cast_slice_mut(&mut self.words)
    }

    /// Float view for [`PixelType::Rgba32Float`] buffers.
    pub fn floats(&self) -> Option<&[f32]> {
        self.pixel_type
            .is_float()
            .then(|| bytemuck::cast_slice(&self.words))
    }

    /// Writable float view for [`PixelType::Rgba32Float`] buffers.
    pub fn floats_mut(&mut self) -> Option<&mut [f32]> {
        if !self.pixel_type.is_float() {
            return None;
        }
        Some(bytemuck::cast_slice_mut(&mut self.words))
    }

    /// Write one pixel given straight RGBA in `[0, 1]`, converting to the buffer's layout.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [f32; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let i = y as usize * self.width as usize + x as usize;
        encode_pixel(self.pixel_type, rgba, self.pixel_bytes_mut(i));
    }

    /// Read one pixel back as RGBA in `[0, 1]` (floats are not clamped).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[f32; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = y as usize * self.width as usize + x as usize;
        let bpp = self.pixel_type.bytes_per_pixel();
        Some(decode_pixel(
            self.pixel_type,
            &self.bytes()[i * bpp..(i + 1) * bpp],
        ))
    }

    fn pixel_bytes_mut(&mut self, i: usize) -> &mut [u8] {
        let bpp = self.pixel_type.bytes_per_pixel();
        &mut self.bytes_mut()[i * bpp..(i + 1) * bpp]
    }

    /// Convert to tightly packed straight RGBA8 for export.
    pub fn to_rgba8(&self) -> Vec<u8> {
        match self.pixel_type {
            PixelType::Rgba8Fixed => self.bytes().to_vec(),
            PixelType::Bgra8Fixed => {
                let mut out = self.bytes().to_vec();
                for px in out.chunks_exact_mut(4) {
                    px.swap(0, 2);
                }
                out
            }
            PixelType::Rgba32Float => bytemuck::cast_slice::<u32, f32>(&self.words)
                .iter()
                .map(|&v| unit_to_u8(v))
                .collect(),
        }
    }
}

/// Encode straight RGBA into one pixel of `pixel_type`. `dst` must be exactly one pixel.
pub fn encode_pixel(pixel_type: PixelType, rgba: [f32; 4], dst: &mut [u8]) {
    match pixel_type {
        PixelType::Rgba8Fixed => {
            for (d, v) in dst.iter_mut().zip(rgba) {
                *d = unit_to_u8(v);
            }
        }
        PixelType::Bgra8Fixed => {
            let [r, g, b, a] = rgba;
            for (d, v) in dst.iter_mut().zip([b, g, r, a]) {
                *d = unit_to_u8(v);
            }
        }
        PixelType::Rgba32Float => {
            for (d, v) in dst.chunks_exact_mut(4).zip(rgba) {
                d.copy_from_slice(&v.to_ne_bytes());
            }
        }
    }
}

fn decode_pixel(pixel_type: PixelType, src: &[u8]) -> [f32; 4] {
    let u = |b: u8| f32::from(b) / 255.0;
    match pixel_type {
        PixelType::Rgba8Fixed => [u(src[0]), u(src[1]), u(src[2]), u(src[3])],
        PixelType::Bgra8Fixed => [u(src[2]), u(src[1]), u(src[0]), u(src[3])],
        PixelType::Rgba32Float => {
            let mut out = [0.0f32; 4];
            for (o, c) in out.iter_mut().zip(src.chunks_exact(4)) {
                *o = f32::from_ne_bytes([c[0], c[1], c[2], c[3]]);
            }
            out
        }
    }
}

fn unit_to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
#[path = "../../tests/unit/buffers/pixel.rs"]
mod tests;

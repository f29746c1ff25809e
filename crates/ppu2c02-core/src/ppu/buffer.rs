//! Double-buffered framebuffer.
//!
//! The PPU writes into the **back** plane; [`FrameBuffer::swap`] publishes it
//! as the **front** plane at the frame boundary, so readers only ever see a
//! completed frame.

use crate::ppu::{SCREEN_HEIGHT, SCREEN_WIDTH, palette::Color};

/// Describes how a color is packed into the underlying byte buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ColorFormat {
    /// 4 bytes per pixel in R, G, B, A order.
    #[default]
    Rgba8888,
    /// 4 bytes per pixel in B, G, R, A order.
    Bgra8888,
    /// 4 bytes per pixel in A, R, G, B order.
    Argb8888,
}

impl ColorFormat {
    /// Returns the number of bytes used to represent a single pixel.
    #[inline]
    pub const fn bytes_per_pixel(self) -> usize {
        4
    }

    /// Packs `color` as an opaque pixel.
    #[inline]
    pub const fn pack(self, color: Color) -> [u8; 4] {
        match self {
            ColorFormat::Rgba8888 => [color.r, color.g, color.b, 0xFF],
            ColorFormat::Bgra8888 => [color.b, color.g, color.r, 0xFF],
            ColorFormat::Argb8888 => [0xFF, color.r, color.g, color.b],
        }
    }
}

/// A double-buffered framebuffer sized to the visible raster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Index of the **back/write** plane.
    active_index: usize,
    planes: [Box<[u8]>; 2],
    format: ColorFormat,
}

impl FrameBuffer {
    pub fn new(format: ColorFormat) -> Self {
        let len = SCREEN_WIDTH * SCREEN_HEIGHT * format.bytes_per_pixel();
        Self {
            active_index: 0,
            planes: [
                vec![0; len].into_boxed_slice(),
                vec![0; len].into_boxed_slice(),
            ],
            format,
        }
    }

    /// Returns a read-only view of the **front** plane.
    pub fn render(&self) -> &[u8] {
        &self.planes[1 - self.active_index]
    }

    /// Mutable view of the **back** plane.
    pub(crate) fn write(&mut self) -> &mut [u8] {
        &mut self.planes[self.active_index]
    }

    /// Bytes per scanline.
    #[inline]
    pub fn pitch(&self) -> usize {
        SCREEN_WIDTH * self.format.bytes_per_pixel()
    }

    /// Total size of a single plane in bytes.
    #[inline]
    pub fn len_bytes(&self) -> usize {
        self.pitch() * SCREEN_HEIGHT
    }

    #[inline]
    pub fn format(&self) -> ColorFormat {
        self.format
    }

    /// Presents the back plane as the new front plane and clears the new back
    /// plane.
    pub(crate) fn swap(&mut self) {
        self.active_index = 1 - self.active_index;
        self.write().fill(0);
    }

    /// Clears both planes to zero.
    pub fn clear(&mut self) {
        for plane in &mut self.planes {
            plane.fill(0);
        }
    }

    /// Writes one pixel into the back plane. Out-of-raster coordinates are ignored.
    pub(crate) fn write_color(&mut self, x: usize, y: usize, color: Color) {
        if x >= SCREEN_WIDTH || y >= SCREEN_HEIGHT {
            return;
        }
        let bpp = self.format.bytes_per_pixel();
        let idx = y * self.pitch() + x * bpp;
        let packed = self.format.pack(color);
        self.write()[idx..idx + bpp].copy_from_slice(&packed);
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new(ColorFormat::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swap_publishes_back_plane() {
        let mut fb = FrameBuffer::new(ColorFormat::Rgba8888);
        fb.write_color(1, 0, Color::new(1, 2, 3));
        assert!(fb.render().iter().all(|&b| b == 0));
        fb.swap();
        assert_eq!(&fb.render()[4..8], &[1, 2, 3, 0xFF]);
        // The new back plane starts clean.
        assert!(fb.write().iter().all(|&b| b == 0));
    }

    #[test]
    fn formats_order_channels() {
        let c = Color::new(10, 20, 30);
        assert_eq!(ColorFormat::Bgra8888.pack(c), [30, 20, 10, 0xFF]);
        assert_eq!(ColorFormat::Argb8888.pack(c), [0xFF, 10, 20, 30]);
    }

    #[test]
    fn out_of_raster_writes_are_dropped() {
        let mut fb = FrameBuffer::default();
        fb.write_color(SCREEN_WIDTH, 0, Color::new(9, 9, 9));
        fb.write_color(0, SCREEN_HEIGHT, Color::new(9, 9, 9));
        assert!(fb.write().iter().all(|&b| b == 0));
        assert_eq!(fb.len_bytes(), SCREEN_WIDTH * SCREEN_HEIGHT * 4);
    }
}

//! Construction-time options for [`Ppu`](crate::ppu::Ppu).

use crate::ppu::{buffer::ColorFormat, palette::Palette};

/// Output configuration. Timing and memory layout are fixed by the hardware
/// and not configurable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PpuConfig {
    /// Pixel packing of the published frame.
    pub color_format: ColorFormat,
    /// System color table used to resolve palette indices.
    pub palette: Palette,
}

impl PpuConfig {
    pub fn with_color_format(mut self, color_format: ColorFormat) -> Self {
        self.color_format = color_format;
        self
    }

    pub fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

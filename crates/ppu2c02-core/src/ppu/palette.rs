//! System color table mapping 6-bit palette indices to RGB.

use crate::error::Error;

/// Number of entries in the system color table.
pub const PALETTE_SIZE: usize = 64;
/// Byte length of a raw `.pal` file (64 RGB triplets).
pub const PALETTE_FILE_LEN: usize = PALETTE_SIZE * 3;

/// 8-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const BLACK: Color = Color::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

#[rustfmt::skip]
const DEFAULT_COLORS: [Color; PALETTE_SIZE] = [
    Color::new(84, 84, 84), Color::new(0, 30, 116), Color::new(8, 16, 144), Color::new(48, 0, 136),
    Color::new(68, 0, 100), Color::new(92, 0, 48), Color::new(84, 4, 0), Color::new(60, 24, 0),
    Color::new(32, 42, 0), Color::new(8, 58, 0), Color::new(0, 64, 0), Color::new(0, 60, 0),
    Color::new(0, 50, 60), Color::new(0, 0, 0), Color::new(0, 0, 0), Color::new(0, 0, 0),
    Color::new(152, 150, 152), Color::new(8, 76, 196), Color::new(48, 50, 236), Color::new(92, 30, 228),
    Color::new(136, 20, 176), Color::new(160, 20, 100), Color::new(152, 34, 32), Color::new(120, 60, 0),
    Color::new(84, 90, 0), Color::new(40, 114, 0), Color::new(8, 124, 0), Color::new(0, 118, 40),
    Color::new(0, 102, 120), Color::new(0, 0, 0), Color::new(0, 0, 0), Color::new(0, 0, 0),
    Color::new(236, 238, 236), Color::new(76, 154, 236), Color::new(120, 124, 236), Color::new(176, 98, 236),
    Color::new(228, 84, 236), Color::new(236, 88, 180), Color::new(236, 106, 100), Color::new(212, 136, 32),
    Color::new(160, 170, 0), Color::new(116, 196, 0), Color::new(76, 208, 32), Color::new(56, 204, 108),
    Color::new(56, 180, 204), Color::new(60, 60, 60), Color::new(0, 0, 0), Color::new(0, 0, 0),
    Color::new(236, 238, 236), Color::new(168, 204, 236), Color::new(188, 188, 236), Color::new(212, 178, 236),
    Color::new(236, 174, 236), Color::new(236, 174, 212), Color::new(236, 180, 176), Color::new(228, 196, 144),
    Color::new(204, 210, 120), Color::new(180, 222, 120), Color::new(168, 226, 144), Color::new(152, 226, 180),
    Color::new(160, 214, 228), Color::new(160, 162, 160), Color::new(0, 0, 0), Color::new(0, 0, 0),
];

/// 64-entry system palette.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Palette([Color; PALETTE_SIZE]);

impl Default for Palette {
    fn default() -> Self {
        Self(DEFAULT_COLORS)
    }
}

impl Palette {
    pub const fn new(colors: [Color; PALETTE_SIZE]) -> Self {
        Self(colors)
    }

    /// Parses a raw palette dump: 64 consecutive `R, G, B` byte triplets.
    pub fn from_rgb_bytes(bytes: &[u8]) -> Result<Self, Error> {
        if bytes.len() != PALETTE_FILE_LEN {
            return Err(Error::PaletteLength {
                actual: bytes.len(),
            });
        }
        let mut colors = [Color::BLACK; PALETTE_SIZE];
        for (color, rgb) in colors.iter_mut().zip(bytes.chunks_exact(3)) {
            *color = Color::new(rgb[0], rgb[1], rgb[2]);
        }
        Ok(Self(colors))
    }

    /// Looks up a color; only the low 6 bits of `index` are used.
    #[inline]
    pub fn color(&self, index: u8) -> Color {
        self.0[usize::from(index) & (PALETTE_SIZE - 1)]
    }

    pub fn colors(&self) -> &[Color; PALETTE_SIZE] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_endpoints() {
        let palette = Palette::default();
        assert_eq!(palette.color(0x00), Color::new(84, 84, 84));
        assert_eq!(palette.color(0x30), Color::new(236, 238, 236));
        assert_eq!(palette.color(0x3F), Color::BLACK);
        // Upper bits are ignored.
        assert_eq!(palette.color(0x41), palette.color(0x01));
    }

    #[test]
    fn raw_bytes_load_and_reject_bad_length() {
        let bytes: Vec<u8> = (0..PALETTE_FILE_LEN).map(|i| i as u8).collect();
        let palette = Palette::from_rgb_bytes(&bytes).expect("valid length");
        assert_eq!(palette.color(1), Color::new(3, 4, 5));

        let err = Palette::from_rgb_bytes(&bytes[..10]).expect_err("short input");
        assert!(matches!(err, Error::PaletteLength { actual: 10 }));
    }
}

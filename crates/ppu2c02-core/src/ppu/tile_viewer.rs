//! Read-only tile and table images for debugging tools.
//!
//! Every query goes through [`Ppu::peek_vram`], so producing an image never
//! touches latches, counters or mapper notifications.

use super::{Ppu, palette::Color, sprite::OamEntry};
use crate::memory::{
    ATTRIBUTE_TABLE_BASE, NAMETABLE_BASE, OAM_ENTRY_COUNT, PALETTE_BASE, PATTERN_TABLE_SIZE,
};

/// Width and height of one tile.
pub const TILE_PIXELS: usize = 8;

const PATTERN_GRID: usize = 16;
const NAMETABLE_COLUMNS: usize = 32;
const NAMETABLE_ROWS: usize = 30;
const BYTES_PER_TILE: u16 = 16;
const SPRITE_PALETTE_OFFSET: u8 = 4;

/// Row-major grid of resolved colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileImage {
    width: usize,
    height: usize,
    pixels: Vec<Color>,
}

impl TileImage {
    fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::BLACK; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixel(&self, x: usize, y: usize) -> Color {
        self.pixels[y * self.width + x]
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    fn set(&mut self, x: usize, y: usize, color: Color) {
        self.pixels[y * self.width + x] = color;
    }

    fn blit(&mut self, tile: &TileImage, x0: usize, y0: usize) {
        for y in 0..tile.height {
            for x in 0..tile.width {
                self.set(x0 + x, y0 + y, tile.pixel(x, y));
            }
        }
    }
}

impl Ppu {
    /// Color of `pixel` in palette group `palette` (0..=7).
    fn debug_color(&self, palette: u8, pixel: u8) -> Color {
        let addr = PALETTE_BASE + (u16::from(palette & 0x07) << 2) + u16::from(pixel & 0x03);
        self.palette.color(self.peek_vram(addr))
    }

    /// Reads one 8-pixel tile row as pixel indices, left to right.
    fn debug_tile_row(&self, row_addr: u16) -> [u8; TILE_PIXELS] {
        let low = self.peek_vram(row_addr);
        let high = self.peek_vram(row_addr + 8);
        core::array::from_fn(|col| {
            let bit = 7 - col;
            (((high >> bit) & 1) << 1) | ((low >> bit) & 1)
        })
    }

    /// One tile of a pattern table, addressed in its 16×16 tile grid.
    pub fn pattern_tile(&self, table: u8, tile_x: u8, tile_y: u8, palette: u8) -> TileImage {
        let base = u16::from(table & 1) * PATTERN_TABLE_SIZE as u16
            + u16::from(tile_y & 0x0F) * BYTES_PER_TILE * PATTERN_GRID as u16
            + u16::from(tile_x & 0x0F) * BYTES_PER_TILE;
        let mut image = TileImage::new(TILE_PIXELS, TILE_PIXELS);
        for row in 0..TILE_PIXELS {
            let pixels = self.debug_tile_row(base + row as u16);
            for (col, pixel) in pixels.into_iter().enumerate() {
                image.set(col, row, self.debug_color(palette, pixel));
            }
        }
        image
    }

    /// One background tile of a logical nametable (0..=3) with its attribute
    /// palette. Transparent pixels resolve through palette 0.
    pub fn nametable_tile(&self, tile_x: u8, tile_y: u8, nametable: u8) -> TileImage {
        let x = u16::from(tile_x & 0x1F);
        let y = u16::from(tile_y) % NAMETABLE_ROWS as u16;
        let offset = u16::from(nametable & 0x03) << 10;

        let tile = self.peek_vram(NAMETABLE_BASE | offset | (y << 5) | x);
        let attribute = self.peek_vram(ATTRIBUTE_TABLE_BASE | offset | ((y >> 2) << 3) | (x >> 2));
        let palette = super::attribute_quadrant(attribute, x as u8, y as u8);
        let base = self.registers.control.background_pattern_table()
            + (u16::from(tile) << 4);

        let mut image = TileImage::new(TILE_PIXELS, TILE_PIXELS);
        for row in 0..TILE_PIXELS {
            let pixels = self.debug_tile_row(base + row as u16);
            for (col, pixel) in pixels.into_iter().enumerate() {
                let group = if pixel == 0 { 0 } else { palette };
                image.set(col, row, self.debug_color(group, pixel));
            }
        }
        image
    }

    /// The sprite drawn by attribute entry `index`, 8×8 or 8×16 per the
    /// current sprite-size flag, with its flips applied. Transparent pixels
    /// resolve through palette 0.
    pub fn oam_tile(&self, index: usize) -> Option<TileImage> {
        if index >= OAM_ENTRY_COUNT {
            return None;
        }
        let entry = OamEntry::from_oam(self.registers.oam.as_slice(), index)?;
        let control = self.registers.control;
        let tall = control.use_8x16_sprites();
        let height = usize::from(control.sprite_height());
        let palette = entry.attributes.palette() + SPRITE_PALETTE_OFFSET;

        let mut image = TileImage::new(TILE_PIXELS, height);
        for row in 0..height {
            let addr = entry.pattern_addr(row as u8, tall, control.sprite_pattern_table());
            let mut pixels = self.debug_tile_row(addr);
            if entry.attributes.flip_horizontal() {
                pixels.reverse();
            }
            for (col, pixel) in pixels.into_iter().enumerate() {
                let group = if pixel == 0 { 0 } else { palette };
                image.set(col, row, self.debug_color(group, pixel));
            }
        }
        Some(image)
    }

    /// A whole pattern table as a 128×128 image.
    pub fn pattern_table_image(&self, table: u8, palette: u8) -> TileImage {
        let side = PATTERN_GRID * TILE_PIXELS;
        let mut image = TileImage::new(side, side);
        for tile_y in 0..PATTERN_GRID {
            for tile_x in 0..PATTERN_GRID {
                let tile = self.pattern_tile(table, tile_x as u8, tile_y as u8, palette);
                image.blit(&tile, tile_x * TILE_PIXELS, tile_y * TILE_PIXELS);
            }
        }
        image
    }

    /// A whole logical nametable as a 256×240 image.
    pub fn nametable_image(&self, nametable: u8) -> TileImage {
        let mut image = TileImage::new(
            NAMETABLE_COLUMNS * TILE_PIXELS,
            NAMETABLE_ROWS * TILE_PIXELS,
        );
        for tile_y in 0..NAMETABLE_ROWS {
            for tile_x in 0..NAMETABLE_COLUMNS {
                let tile = self.nametable_tile(tile_x as u8, tile_y as u8, nametable);
                image.blit(&tile, tile_x * TILE_PIXELS, tile_y * TILE_PIXELS);
            }
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        mapper::{Mirroring, Passthrough},
        ppu::Ppu,
    };

    fn write(ppu: &mut Ppu, addr: u16, values: &[u8]) {
        ppu.cpu_write(6, (addr >> 8) as u8);
        ppu.cpu_write(6, addr as u8);
        for &value in values {
            ppu.cpu_write(7, value);
        }
    }

    fn ppu_with_palette() -> Ppu {
        let mut ppu = Ppu::new(Box::new(Passthrough::new(Mirroring::Horizontal)));
        // Backdrop, then palette 1 = 0x01, 0x02, 0x03.
        write(&mut ppu, 0x3F00, &[0x0F, 0, 0, 0, 0x20, 0x01, 0x02, 0x03]);
        write(&mut ppu, 0x3F14, &[0x20, 0x11, 0x12, 0x13]);
        ppu
    }

    #[test]
    fn pattern_tile_decodes_bitplanes_in_order() {
        let mut ppu = ppu_with_palette();
        // Tile (1, 0) of table 0: row 0 low plane 0b1000_0000, high plane 0b1100_0000.
        write(&mut ppu, 0x0010, &[0x80]);
        write(&mut ppu, 0x0018, &[0xC0]);
        let tile = ppu.pattern_tile(0, 1, 0, 1);
        let palette = ppu.palette().clone();
        assert_eq!(tile.pixel(0, 0), palette.color(0x03));
        assert_eq!(tile.pixel(1, 0), palette.color(0x02));
        assert_eq!(tile.pixel(2, 0), palette.color(0x20));
    }

    #[test]
    fn nametable_tile_uses_attribute_palette_and_backdrop() {
        let mut ppu = ppu_with_palette();
        write(&mut ppu, 0x0050, &[0x80]);
        // Tile (2, 0) -> tile id 5, attribute quadrant top-right = palette 1.
        write(&mut ppu, 0x2002, &[0x05]);
        write(&mut ppu, 0x23C0, &[0b0000_0100]);
        let tile = ppu.nametable_tile(2, 0, 0);
        let palette = ppu.palette().clone();
        assert_eq!(tile.pixel(0, 0), palette.color(0x01));
        assert_eq!(tile.pixel(1, 0), palette.color(0x0F));
    }

    #[test]
    fn oam_tile_applies_flips_and_size() {
        let mut ppu = ppu_with_palette();
        write(&mut ppu, 0x0020, &[0x80]);
        // Entry 3: tile 2, palette 1, horizontal flip.
        ppu.cpu_write(3, 12);
        for byte in [0, 2, 0b0100_0001, 0] {
            ppu.cpu_write(4, byte);
        }
        let tile = ppu.oam_tile(3).expect("entry in range");
        assert_eq!((tile.width(), tile.height()), (8, 8));
        let palette = ppu.palette().clone();
        assert_eq!(tile.pixel(7, 0), palette.color(0x11));
        assert_eq!(tile.pixel(0, 0), palette.color(0x0F));
        assert!(ppu.oam_tile(64).is_none());

        ppu.cpu_write(0, 0b0010_0000);
        assert_eq!(ppu.oam_tile(3).map(|t| t.height()), Some(16));
    }

    #[test]
    fn full_images_have_fixed_sizes() {
        let ppu = ppu_with_palette();
        let table = ppu.pattern_table_image(1, 0);
        assert_eq!((table.width(), table.height()), (128, 128));
        let nametable = ppu.nametable_image(2);
        assert_eq!((nametable.width(), nametable.height()), (256, 240));
        assert!(nametable.pixels().iter().all(|&c| c == ppu.palette().color(0x0F)));
    }
}

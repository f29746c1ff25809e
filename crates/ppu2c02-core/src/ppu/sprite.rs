use bitflags::bitflags;

use crate::memory::OAM_ENTRY_COUNT;

bitflags! {
    /// Attribute bits stored in sprite byte 2.
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V H P . . . p p
    /// ```
    /// - `V`: Vertical flip
    /// - `H`: Horizontal flip
    /// - `P`: Priority (behind background when set)
    /// - `p`: Sprite palette select (0..=3)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SpriteAttributes: u8 {
        const PALETTE = 0b0000_0011;
        /// When set, sprite is drawn behind the background.
        const PRIORITY_BEHIND_BACKGROUND = 0b0010_0000;
        const FLIP_HORIZONTAL = 0b0100_0000;
        const FLIP_VERTICAL = 0b1000_0000;
    }
}

impl SpriteAttributes {
    /// Sprite palette select (0..=3).
    pub fn palette(self) -> u8 {
        self.bits() & Self::PALETTE.bits()
    }

    /// Whether the sprite is drawn in front of opaque background pixels.
    pub fn in_front(self) -> bool {
        !self.contains(Self::PRIORITY_BEHIND_BACKGROUND)
    }

    pub fn flip_horizontal(self) -> bool {
        self.contains(Self::FLIP_HORIZONTAL)
    }

    pub fn flip_vertical(self) -> bool {
        self.contains(Self::FLIP_VERTICAL)
    }
}

/// One decoded sprite attribute entry.
///
/// The table stores each sprite as four consecutive bytes:
/// - byte 0: Y position
/// - byte 1: tile index
/// - byte 2: attribute bits (see [`SpriteAttributes`])
/// - byte 3: X position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct OamEntry {
    pub y: u8,
    pub tile: u8,
    pub attributes: SpriteAttributes,
    pub x: u8,
}

impl OamEntry {
    pub(crate) const BYTES_PER_SPRITE: usize = 4;

    /// Entry with every byte set to the cleared-slot sentinel.
    pub(crate) const SENTINEL: OamEntry = OamEntry {
        y: 0xFF,
        tile: 0xFF,
        attributes: SpriteAttributes::from_bits_retain(0xFF),
        x: 0xFF,
    };

    /// Decodes entry `index` from raw OAM bytes, or `None` when out of range.
    pub fn from_oam(oam: &[u8], index: usize) -> Option<Self> {
        if index >= OAM_ENTRY_COUNT {
            return None;
        }
        let start = index * Self::BYTES_PER_SPRITE;
        let bytes = oam.get(start..start + Self::BYTES_PER_SPRITE)?;
        Some(Self {
            y: bytes[0],
            tile: bytes[1],
            attributes: SpriteAttributes::from_bits_retain(bytes[2]),
            x: bytes[3],
        })
    }

    pub fn to_bytes(self) -> [u8; 4] {
        [self.y, self.tile, self.attributes.bits(), self.x]
    }

    /// Pattern address of bitplane 0 for `row` (0-based, unflipped) of this
    /// sprite. Bitplane 1 lives 8 bytes further.
    ///
    /// In 8×8 mode the table comes from the control register; in 8×16 mode
    /// bit 0 of the tile index selects the table and the even/odd tile pair
    /// forms the top/bottom halves.
    pub(crate) fn pattern_addr(self, row: u8, tall: bool, table_8x8: u16) -> u16 {
        let flip = self.attributes.flip_vertical();
        let tile = u16::from(self.tile);
        if !tall {
            let row = if flip { 7 - (row & 7) } else { row & 7 };
            return table_8x8 | (tile << 4) | u16::from(row);
        }

        let table = (tile & 0x01) << 12;
        let top = tile & 0xFE;
        let row = row & 0x0F;
        // Vertical flip swaps the halves as well as the rows within them.
        let (half, fine) = if flip {
            (if row < 8 { top + 1 } else { top }, (7 - (row & 7)) & 7)
        } else {
            (if row < 8 { top } else { top + 1 }, row & 7)
        };
        table | (half << 4) | u16::from(fine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entries_decode_in_four_byte_stride() {
        let mut oam = [0u8; 256];
        oam[8..12].copy_from_slice(&[10, 0x42, 0b1110_0001, 200]);
        let entry = OamEntry::from_oam(&oam, 2).expect("entry 2");
        assert_eq!(entry.y, 10);
        assert_eq!(entry.tile, 0x42);
        assert_eq!(entry.x, 200);
        assert_eq!(entry.attributes.palette(), 1);
        assert!(!entry.attributes.in_front());
        assert!(entry.attributes.flip_horizontal());
        assert!(entry.attributes.flip_vertical());
        assert_eq!(entry.to_bytes(), [10, 0x42, 0b1110_0001, 200]);
        assert!(OamEntry::from_oam(&oam, 64).is_none());
    }

    #[test]
    fn small_sprite_rows() {
        let mut entry = OamEntry {
            tile: 0x12,
            ..OamEntry::default()
        };
        assert_eq!(entry.pattern_addr(3, false, 0x1000), 0x1123);
        entry.attributes = SpriteAttributes::FLIP_VERTICAL;
        assert_eq!(entry.pattern_addr(3, false, 0x0000), 0x0124);
    }

    #[test]
    fn tall_sprite_halves() {
        let mut entry = OamEntry {
            tile: 0x13,
            ..OamEntry::default()
        };
        // Odd tile selects table 1; the pair is 0x12/0x13.
        assert_eq!(entry.pattern_addr(2, true, 0), 0x1122);
        assert_eq!(entry.pattern_addr(10, true, 0), 0x1132);

        entry.attributes = SpriteAttributes::FLIP_VERTICAL;
        assert_eq!(entry.pattern_addr(0, true, 0), 0x1137);
        assert_eq!(entry.pattern_addr(15, true, 0), 0x1120);
    }
}

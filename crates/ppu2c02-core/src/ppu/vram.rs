//! PPU-internal memories and the address decode that falls back to them when
//! the mapper declines an access.

use super::registers::Mask;
use crate::{
    mapper::Mirroring,
    mem_block::{NametableBank, PaletteRam, PatternBank},
    memory::{
        NAMETABLE_END, PALETTE_INDEX_MASK, PATTERN_END, PATTERN_OFFSET_MASK, VRAM_MIRROR_MASK,
    },
};

/// Stored palette entries are 6 bits wide.
const PALETTE_VALUE_MASK: u8 = 0x3F;

/// Folds a palette address onto its 32-byte storage index, applying the
/// sprite/background backdrop aliases (`$10/$14/$18/$1C` → `$00/$04/$08/$0C`).
#[inline]
pub(crate) fn palette_index(addr: u16) -> usize {
    let index = addr & PALETTE_INDEX_MASK;
    let index = match index {
        0x10 | 0x14 | 0x18 | 0x1C => index - 0x10,
        _ => index,
    };
    usize::from(index)
}

/// Nametable banks, internal pattern banks and palette memory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub(crate) struct Vram {
    pub(crate) nametables: [NametableBank; 2],
    pub(crate) patterns: [PatternBank; 2],
    pub(crate) palette: PaletteRam,
}

impl Vram {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Decodes a read against internal memory.
    ///
    /// Palette reads are masked by the grayscale setting in `mask`.
    pub(crate) fn read(&self, addr: u16, mirroring: Mirroring, mask: Mask) -> u8 {
        let addr = addr & VRAM_MIRROR_MASK;
        match addr {
            0x0000..=PATTERN_END => {
                let (bank, offset) = pattern_location(addr);
                self.patterns[bank][offset]
            }
            0x2000..=NAMETABLE_END => {
                let (bank, offset) = mirroring.bank(addr);
                self.nametables[bank][offset]
            }
            _ => self.palette[palette_index(addr)] & mask.palette_mask(),
        }
    }

    /// Decodes a write against internal memory.
    pub(crate) fn write(&mut self, addr: u16, value: u8, mirroring: Mirroring) {
        let addr = addr & VRAM_MIRROR_MASK;
        match addr {
            0x0000..=PATTERN_END => {
                let (bank, offset) = pattern_location(addr);
                self.patterns[bank][offset] = value;
            }
            0x2000..=NAMETABLE_END => {
                let (bank, offset) = mirroring.bank(addr);
                self.nametables[bank][offset] = value;
            }
            _ => self.palette[palette_index(addr)] = value & PALETTE_VALUE_MASK,
        }
    }
}

#[inline]
fn pattern_location(addr: u16) -> (usize, usize) {
    (
        usize::from((addr >> 12) & 1),
        usize::from(addr & PATTERN_OFFSET_MASK),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backdrop_aliases_are_shared() {
        let mut vram = Vram::new();
        for (mirror, base) in [(0x3F10, 0x3F00), (0x3F14, 0x3F04), (0x3F18, 0x3F08), (0x3F1C, 0x3F0C)] {
            vram.write(mirror, 0x21, Mirroring::Horizontal);
            assert_eq!(vram.read(base, Mirroring::Horizontal, Mask::empty()), 0x21);
            vram.write(base, 0x05, Mirroring::Horizontal);
            assert_eq!(vram.read(mirror, Mirroring::Horizontal, Mask::empty()), 0x05);
        }
        // Non-backdrop sprite entries are distinct.
        vram.write(0x3F11, 0x30, Mirroring::Horizontal);
        assert_ne!(vram.read(0x3F01, Mirroring::Horizontal, Mask::empty()), 0x30);
        // $3F20-$3FFF mirrors the 32 bytes.
        assert_eq!(vram.read(0x3FF1, Mirroring::Horizontal, Mask::empty()), 0x30);
    }

    #[test]
    fn grayscale_masks_palette_reads() {
        let mut vram = Vram::new();
        vram.write(0x3F03, 0x2D, Mirroring::Vertical);
        assert_eq!(vram.read(0x3F03, Mirroring::Vertical, Mask::GRAYSCALE), 0x20);
        assert_eq!(vram.read(0x3F03, Mirroring::Vertical, Mask::empty()), 0x2D);
    }

    #[test]
    fn pattern_banks_split_on_bit_12() {
        let mut vram = Vram::new();
        vram.write(0x0010, 1, Mirroring::Vertical);
        vram.write(0x1010, 2, Mirroring::Vertical);
        assert_eq!(vram.patterns[0][0x10], 1);
        assert_eq!(vram.patterns[1][0x10], 2);
    }

    #[test]
    fn nametables_follow_mirroring() {
        let mut vram = Vram::new();
        vram.write(0x2005, 0xAA, Mirroring::Vertical);
        assert_eq!(vram.read(0x2805, Mirroring::Vertical, Mask::empty()), 0xAA);
        assert_eq!(vram.read(0x2405, Mirroring::Vertical, Mask::empty()), 0x00);
        vram.write(0x2C05, 0xBB, Mirroring::Horizontal);
        assert_eq!(vram.read(0x2805, Mirroring::Horizontal, Mask::empty()), 0xBB);
    }
}

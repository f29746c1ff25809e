use bitflags::bitflags;

use crate::memory;

bitflags! {
    /// PPU control register (port 0).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// N M S B s I Y X
    /// ```
    /// - `X`/`Y`: base nametable select
    /// - `I`: VRAM increment (0=+1, 1=+32)
    /// - `s`: sprite pattern table (8x8 only)
    /// - `B`: background pattern table
    /// - `S`: sprite size (0=8x8, 1=8x16)
    /// - `M`: master/slave select (unused by the core)
    /// - `N`: generate NMI at vblank start
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Control: u8 {
        /// Horizontal nametable select (`$2400` when set).
        const NAMETABLE_X = 0b0000_0001;
        /// Vertical nametable select (`$2800` when set).
        const NAMETABLE_Y = 0b0000_0010;
        const INCREMENT_32 = 0b0000_0100;
        const SPRITE_TABLE = 0b0000_1000;
        const BACKGROUND_TABLE = 0b0001_0000;
        const SPRITE_SIZE_16 = 0b0010_0000;
        const MASTER_SLAVE = 0b0100_0000;
        const GENERATE_NMI = 0b1000_0000;
    }
}

impl Control {
    /// Returns the nametable select bits (0..3).
    pub fn nametable_index(self) -> u8 {
        self.bits() & 0b11
    }

    pub fn nametable_x(self) -> bool {
        self.contains(Control::NAMETABLE_X)
    }

    pub fn nametable_y(self) -> bool {
        self.contains(Control::NAMETABLE_Y)
    }

    /// Returns the VRAM increment amount (1 or 32).
    pub fn vram_increment(self) -> u16 {
        if self.contains(Control::INCREMENT_32) {
            32
        } else {
            1
        }
    }

    /// Sprite pattern table base address (8x8 sprites only).
    pub fn sprite_pattern_table(self) -> u16 {
        if self.contains(Control::SPRITE_TABLE) {
            memory::PATTERN_TABLE_1
        } else {
            memory::PATTERN_TABLE_0
        }
    }

    /// Background pattern table base address.
    pub fn background_pattern_table(self) -> u16 {
        if self.contains(Control::BACKGROUND_TABLE) {
            memory::PATTERN_TABLE_1
        } else {
            memory::PATTERN_TABLE_0
        }
    }

    pub fn use_8x16_sprites(self) -> bool {
        self.contains(Control::SPRITE_SIZE_16)
    }

    /// Sprite height in pixels (8 or 16).
    pub fn sprite_height(self) -> u8 {
        if self.use_8x16_sprites() { 16 } else { 8 }
    }

    pub fn nmi_enabled(self) -> bool {
        self.contains(Control::GENERATE_NMI)
    }
}

//! Shared definitions for the PPU address space.
//!
//! Centralizing address-related constants keeps the hardware layout in one
//! location and keeps magic numbers out of the rendering pipeline.

/// Mask for decoding register mirrors (`port & 0x0007`).
pub const REGISTER_SELECT_MASK: u16 = 0x0007;

/// Address mask applied to every internal VRAM access (16 KiB space).
pub const VRAM_MIRROR_MASK: u16 = 0x3FFF;

/// Last address (inclusive) of the pattern table window.
pub const PATTERN_END: u16 = 0x1FFF;
/// Pattern table base address for table 0.
pub const PATTERN_TABLE_0: u16 = 0x0000;
/// Pattern table base address for table 1.
pub const PATTERN_TABLE_1: u16 = 0x1000;
/// Size of a single pattern bank (4 KiB).
pub const PATTERN_TABLE_SIZE: usize = 0x1000;
/// Offset mask inside a pattern bank.
pub const PATTERN_OFFSET_MASK: u16 = 0x0FFF;

/// Base address of nametable 0.
pub const NAMETABLE_BASE: u16 = 0x2000;
/// Last address (inclusive) of the nametable window before palette space.
pub const NAMETABLE_END: u16 = 0x3EFF;
/// Size of a single nametable bank in bytes.
pub const NAMETABLE_SIZE: usize = 0x0400;
/// Mask folding nametable accesses onto the four logical tables.
pub const NAMETABLE_WINDOW_MASK: u16 = 0x0FFF;
/// In-bank offset mask for a nametable access.
pub const NAMETABLE_OFFSET_MASK: u16 = 0x03FF;
/// Offset of the attribute table inside each nametable.
pub const ATTRIBUTE_TABLE_BASE: u16 = 0x23C0;

/// Palette RAM base address (`$3F00`).
pub const PALETTE_BASE: u16 = 0x3F00;
/// Palette RAM byte count.
pub const PALETTE_RAM_SIZE: usize = 0x20;
/// Mask selecting a palette RAM entry.
pub const PALETTE_INDEX_MASK: u16 = 0x001F;

/// Sprite attribute table size in bytes (64 entries × 4 bytes).
pub const OAM_RAM_SIZE: usize = 0x100;
/// Number of sprite attribute entries.
pub const OAM_ENTRY_COUNT: usize = 64;
/// Maximum number of sprites rendered on one scanline.
pub const SPRITES_PER_LINE: usize = 8;

/// CPU-visible PPU register ports.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Register {
    /// Port 0 - PPUCTRL
    Control = 0,
    /// Port 1 - PPUMASK
    Mask = 1,
    /// Port 2 - PPUSTATUS
    Status = 2,
    /// Port 3 - OAMADDR
    OamAddr = 3,
    /// Port 4 - OAMDATA
    OamData = 4,
    /// Port 5 - PPUSCROLL
    Scroll = 5,
    /// Port 6 - PPUADDR
    Addr = 6,
    /// Port 7 - PPUDATA
    Data = 7,
}

impl Register {
    /// Port number backing the register (0..=7).
    pub const fn port(self) -> u16 {
        self as u16
    }

    /// Resolves the register for a port number or any mirrored CPU address
    /// (`$2000-$3FFF`); only the low three bits are decoded.
    pub const fn from_port(port: u16) -> Self {
        match port & REGISTER_SELECT_MASK {
            0 => Self::Control,
            1 => Self::Mask,
            2 => Self::Status,
            3 => Self::OamAddr,
            4 => Self::OamData,
            5 => Self::Scroll,
            6 => Self::Addr,
            _ => Self::Data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mirrored_cpu_addresses_decode_to_ports() {
        assert_eq!(Register::from_port(0x2000), Register::Control);
        assert_eq!(Register::from_port(0x2007), Register::Data);
        assert_eq!(Register::from_port(0x3FFE), Register::Addr);
        assert_eq!(Register::from_port(0x3FFA), Register::Status);
        assert_eq!(Register::from_port(4), Register::OamData);
        assert_eq!(Register::Scroll.port(), 5);
    }
}

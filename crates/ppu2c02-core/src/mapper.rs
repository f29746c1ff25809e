//! Cartridge mapper capability consumed by the PPU.
//!
//! The PPU never knows which cartridge chip it is talking to. Every internal
//! memory access is first offered to the mapper; only when the mapper declines
//! does the PPU decode the address against its own memories. Two notification
//! hooks let IRQ-counting and CHR-latching mappers observe the address bus.

use std::fmt::Debug;

use dyn_clone::DynClone;

/// Nametable mirroring mode reported by the cartridge.
#[cfg_attr(
    feature = "savestate-serde",
    derive(serde::Serialize, serde::Deserialize)
)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mirroring {
    /// `$2000/$2400` share bank 0, `$2800/$2C00` share bank 1.
    #[default]
    Horizontal,
    /// `$2000/$2800` share bank 0, `$2400/$2C00` share bank 1.
    Vertical,
}

impl Mirroring {
    /// Folds a nametable address onto a physical bank index and in-bank offset.
    ///
    /// `addr` may be any address inside `$2000-$3EFF`; only the low 12 bits
    /// select the logical table.
    #[inline]
    pub fn bank(self, addr: u16) -> (usize, usize) {
        let addr = addr & crate::memory::NAMETABLE_WINDOW_MASK;
        let offset = (addr & crate::memory::NAMETABLE_OFFSET_MASK) as usize;
        let table = addr >> 10;
        let bank = match self {
            Mirroring::Vertical => table & 0b01,
            Mirroring::Horizontal => (table >> 1) & 0b01,
        };
        (bank as usize, offset)
    }
}

/// Cartridge-side hooks the PPU drives.
///
/// Implementations exist per cartridge chip; the PPU only depends on this
/// trait. `ppu_read` takes `&self` because the read-only debug path offers
/// reads to the mapper as well and must not mutate anything.
pub trait Mapper: DynClone + Debug {
    /// Offers a PPU read to the cartridge. `Some` supplies the byte and
    /// suppresses internal decode.
    fn ppu_read(&self, addr: u16) -> Option<u8>;

    /// Offers a PPU write to the cartridge. Returns `true` when the cartridge
    /// accepted it (internal memory is then left untouched).
    fn ppu_write(&mut self, addr: u16, value: u8) -> bool;

    /// Current nametable mirroring mode.
    fn mirroring(&self) -> Mirroring;

    /// Scanline-boundary event (address line A12 rising through `$2007`
    /// access, or dot 260 of a rendering scanline).
    fn on_scanline(&mut self) {}

    /// Address observed on an internal access, for bank-latching mappers.
    fn on_latch_update(&mut self, _addr: u16) {}
}

dyn_clone::clone_trait_object!(Mapper);

/// A mapper that never intercepts, leaving the PPU on its internal pattern
/// banks with a fixed mirroring mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Passthrough {
    mirroring: Mirroring,
}

impl Passthrough {
    pub fn new(mirroring: Mirroring) -> Self {
        Self { mirroring }
    }
}

impl Mapper for Passthrough {
    fn ppu_read(&self, _addr: u16) -> Option<u8> {
        None
    }

    fn ppu_write(&mut self, _addr: u16, _value: u8) -> bool {
        false
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_mirroring_folds_columns() {
        let m = Mirroring::Vertical;
        assert_eq!(m.bank(0x2000), (0, 0));
        assert_eq!(m.bank(0x2800), (0, 0));
        assert_eq!(m.bank(0x2400), (1, 0));
        assert_eq!(m.bank(0x2C00), (1, 0));
        assert_eq!(m.bank(0x2C12), (1, 0x12));
    }

    #[test]
    fn horizontal_mirroring_folds_rows() {
        let m = Mirroring::Horizontal;
        assert_eq!(m.bank(0x2000), (0, 0));
        assert_eq!(m.bank(0x2400), (0, 0));
        assert_eq!(m.bank(0x2800), (1, 0));
        assert_eq!(m.bank(0x2C00), (1, 0));
        // `$3000-$3EFF` mirrors `$2000-$2EFF`.
        assert_eq!(m.bank(0x3BFF), (1, 0x3FF));
    }

    #[test]
    fn passthrough_declines_everything() {
        let mut m = Passthrough::new(Mirroring::Vertical);
        assert_eq!(m.ppu_read(0x0000), None);
        assert!(!m.ppu_write(0x1000, 0xAA));
        assert_eq!(m.mirroring(), Mirroring::Vertical);
        let boxed: Box<dyn Mapper> = Box::new(m);
        let cloned = dyn_clone::clone_box(&*boxed);
        assert_eq!(cloned.mirroring(), Mirroring::Vertical);
    }
}

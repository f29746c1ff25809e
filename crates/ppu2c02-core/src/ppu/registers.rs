//! CPU-visible register state and the internal scroll/address latches.
//!
//! The concrete bit layouts live in submodules.

mod control;
mod mask;
mod status;
mod vram_addr;
mod vram_registers;

pub use control::Control;
pub use mask::Mask;
pub use status::Status;
pub use vram_addr::VramAddr;
pub(crate) use vram_addr::A12;
pub(crate) use vram_registers::VramRegisters;

use crate::mem_block::OamRam;

/// Aggregates the state of all CPU visible PPU registers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Registers {
    pub(crate) control: Control,
    pub(crate) mask: Mask,
    pub(crate) status: Status,
    /// OAM cursor driven by ports 3/4.
    pub(crate) oam_addr: u8,
    /// Sprite attribute table, 64 entries of (Y, tile, attribute, X).
    pub(crate) oam: OamRam,
    /// Internal VRAM registers (`v`/`t`/`x`/`w`).
    pub(crate) vram: VramRegisters,
    /// Delayed port 7 read buffer; also feeds the status register's low bits.
    pub(crate) read_buffer: u8,
}

impl Default for Registers {
    fn default() -> Self {
        Self::new()
    }
}

impl Registers {
    pub(crate) fn new() -> Self {
        Self {
            control: Control::default(),
            mask: Mask::default(),
            status: Status::default(),
            oam_addr: 0,
            oam: OamRam::new(),
            vram: VramRegisters::default(),
            read_buffer: 0,
        }
    }

    /// Restores register values to their reset defaults. OAM contents survive.
    pub(crate) fn reset(&mut self) {
        self.control = Control::default();
        self.mask = Mask::default();
        self.status = Status::RESET;
        self.oam_addr = 0;
        self.vram = VramRegisters::default();
        self.read_buffer = 0;
    }

    /// Updates control, also syncing the nametable bits into `t`.
    pub(crate) fn write_control(&mut self, value: u8) {
        self.control = Control::from_bits_retain(value);
        self.vram.t.set_nametable_x(self.control.nametable_x());
        self.vram.t.set_nametable_y(self.control.nametable_y());
    }

    /// Composes the port 2 value: driven status bits plus stale read-buffer bits.
    pub(crate) fn status_value(&self) -> u8 {
        (self.status.bits() & Status::DRIVEN_BITS) | (self.read_buffer & !Status::DRIVEN_BITS)
    }
}

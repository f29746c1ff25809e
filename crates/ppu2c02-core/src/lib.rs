//! Dot-accurate emulation of the 2C02 picture processing unit.
//!
//! An external driver owns the clock: it issues CPU port accesses through
//! [`Ppu::cpu_read`] / [`Ppu::cpu_write`] and advances the chip one dot at a
//! time with [`Ppu::clock`]. Cartridge hardware plugs in through the
//! [`Mapper`] trait.
//!
//! ```
//! use ppu2c02_core::{Mirroring, Passthrough, Ppu};
//!
//! let mut ppu = Ppu::new(Box::new(Passthrough::new(Mirroring::Vertical)));
//! ppu.cpu_write(0x2001, 0b0001_1110);
//! while !ppu.take_frame_complete() {
//!     ppu.clock();
//! }
//! assert_eq!(ppu.frame().len(), 256 * 240 * 4);
//! ```

pub mod config;
pub mod error;
pub mod mapper;
pub mod mem_block;
pub mod memory;
pub mod ppu;

pub use config::PpuConfig;
pub use error::Error;
pub use mapper::{Mapper, Mirroring, Passthrough};
pub use ppu::{
    Ppu, SCREEN_HEIGHT, SCREEN_WIDTH,
    buffer::{ColorFormat, FrameBuffer},
    palette::{Color, Palette},
    savestate::PpuState,
};

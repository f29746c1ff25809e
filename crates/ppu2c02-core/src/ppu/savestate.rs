//! Snapshot of the complete PPU state.
//!
//! Snapshots capture registers, latches, memories, pipelines and counters.
//! The framebuffer and the mapper's own state are not included.

#[cfg(feature = "savestate-serde")]
use serde::{Deserialize, Serialize};

use super::{
    Ppu,
    background_pipeline::BgLatches,
    registers::{Control, Mask, Status, VramAddr},
    sprite::OamEntry,
    sprite_pipeline::SpriteSlot,
};
use crate::{
    mem_block::{NametableBank, OamRam, PaletteRam, PatternBank},
    memory::SPRITES_PER_LINE,
};

/// Serializable state for the background fetch latches and shifters.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BgPipelineState {
    pub tile_id: u8,
    pub attribute: u8,
    pub pattern_lo: u8,
    pub pattern_hi: u8,
    /// `[pattern_lo, pattern_hi, palette_lo, palette_hi]`.
    pub shifters: [u16; 4],
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpriteSlotState {
    /// Raw attribute entry bytes (Y, tile, attribute, X).
    pub entry: [u8; 4],
    pub pattern_low: u8,
    pub pattern_high: u8,
    pub x_counter: u8,
}

#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpritePipelineState {
    pub count: u8,
    pub sprite0_possible: bool,
    pub slots: [SpriteSlotState; SPRITES_PER_LINE],
}

/// Full PPU snapshot.
#[cfg_attr(feature = "savestate-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PpuState {
    pub control: u8,
    pub mask: u8,
    pub status: u8,
    pub oam_addr: u8,
    pub read_buffer: u8,
    pub v: u16,
    pub t: u16,
    pub fine_x: u8,
    pub write_toggle: bool,
    pub oam: OamRam,
    pub nametables: [NametableBank; 2],
    pub patterns: [PatternBank; 2],
    pub palette_ram: PaletteRam,
    pub bg: BgPipelineState,
    pub sprites: SpritePipelineState,
    pub scanline: i16,
    pub cycle: u16,
    pub frame: u64,
    pub odd_frame: bool,
    pub nmi_pending: bool,
    pub frame_complete: bool,
}

impl PpuState {
    /// Layout version written ahead of encoded snapshots.
    pub const FORMAT_VERSION: u32 = 1;
}

#[cfg(feature = "savestate-postcard")]
impl PpuState {
    /// Encodes the snapshot, prefixed with [`PpuState::FORMAT_VERSION`].
    pub fn to_bytes(&self) -> Result<Vec<u8>, crate::Error> {
        Ok(postcard::to_allocvec(&(Self::FORMAT_VERSION, self))?)
    }

    /// Decodes a snapshot produced by [`PpuState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::Error> {
        let (found, rest) = postcard::take_from_bytes::<u32>(bytes)?;
        if found != Self::FORMAT_VERSION {
            return Err(crate::Error::SavestateVersion {
                expected: Self::FORMAT_VERSION,
                found,
            });
        }
        Ok(postcard::from_bytes(rest)?)
    }
}

impl Ppu {
    /// Captures the current state.
    pub fn save_state(&self) -> PpuState {
        let regs = &self.registers;
        let latches = self.bg.latches;
        let mut slots = [SpriteSlotState::default(); SPRITES_PER_LINE];
        for (dst, src) in slots.iter_mut().zip(self.sprites.slots()) {
            *dst = SpriteSlotState {
                entry: src.entry.to_bytes(),
                pattern_low: src.pattern_low,
                pattern_high: src.pattern_high,
                x_counter: src.x_counter,
            };
        }

        PpuState {
            control: regs.control.bits(),
            mask: regs.mask.bits(),
            status: regs.status.bits(),
            oam_addr: regs.oam_addr,
            read_buffer: regs.read_buffer,
            v: regs.vram.v.raw(),
            t: regs.vram.t.raw(),
            fine_x: regs.vram.x,
            write_toggle: regs.vram.w,
            oam: regs.oam.clone(),
            nametables: self.vram.nametables.clone(),
            patterns: self.vram.patterns.clone(),
            palette_ram: self.vram.palette.clone(),
            bg: BgPipelineState {
                tile_id: latches.tile_id,
                attribute: latches.attribute,
                pattern_lo: latches.pattern_lo,
                pattern_hi: latches.pattern_hi,
                shifters: self.bg.shifters(),
            },
            sprites: SpritePipelineState {
                count: self.sprites.count() as u8,
                sprite0_possible: self.sprites.sprite0_possible(),
                slots,
            },
            scanline: self.scanline,
            cycle: self.cycle,
            frame: self.frame,
            odd_frame: self.odd_frame,
            nmi_pending: self.nmi_pending,
            frame_complete: self.frame_complete,
        }
    }

    /// Restores a previously captured state. Counters are clamped into the
    /// timing grid.
    pub fn load_state(&mut self, state: &PpuState) {
        let regs = &mut self.registers;
        regs.control = Control::from_bits_retain(state.control);
        regs.mask = Mask::from_bits_retain(state.mask);
        regs.status = Status::from_bits_retain(state.status);
        regs.oam_addr = state.oam_addr;
        regs.read_buffer = state.read_buffer;
        regs.vram.v = VramAddr::from(state.v);
        regs.vram.t = VramAddr::from(state.t);
        regs.vram.x = state.fine_x & 0b111;
        regs.vram.w = state.write_toggle;
        regs.oam = state.oam.clone();

        self.vram.nametables = state.nametables.clone();
        self.vram.patterns = state.patterns.clone();
        self.vram.palette = state.palette_ram.clone();

        self.bg.latches = BgLatches {
            tile_id: state.bg.tile_id,
            attribute: state.bg.attribute & 0b11,
            pattern_lo: state.bg.pattern_lo,
            pattern_hi: state.bg.pattern_hi,
        };
        self.bg.set_shifters(state.bg.shifters);

        let mut slots = [SpriteSlot::default(); SPRITES_PER_LINE];
        for (dst, src) in slots.iter_mut().zip(&state.sprites.slots) {
            let [y, tile, attributes, x] = src.entry;
            *dst = SpriteSlot {
                entry: OamEntry {
                    y,
                    tile,
                    attributes: super::sprite::SpriteAttributes::from_bits_retain(attributes),
                    x,
                },
                pattern_low: src.pattern_low,
                pattern_high: src.pattern_high,
                x_counter: src.x_counter,
            };
        }
        self.sprites
            .restore(&slots, state.sprites.count, state.sprites.sprite0_possible);

        self.scanline = state.scanline.clamp(super::PRE_RENDER_SCANLINE, super::LAST_SCANLINE);
        self.cycle = state.cycle.min(super::LAST_DOT);
        self.frame = state.frame;
        self.odd_frame = state.odd_frame;
        self.nmi_pending = state.nmi_pending;
        self.frame_complete = state.frame_complete;
    }
}

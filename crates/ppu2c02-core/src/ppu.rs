//! Picture Processing Unit (2C02).
//!
//! The PPU exposes eight CPU-facing ports that mirror through `$2000-$3FFF`.
//! Rendering is a dot-driven state machine: every call to [`Ppu::clock`]
//! advances one dot of a 341×262 grid, running the background fetch phases,
//! sprite evaluation and the pixel compositor at the dots the hardware does.
//!
//! All memory accesses are offered to the attached [`Mapper`] first; only
//! declined accesses reach the PPU's own nametable, pattern and palette
//! memories.

pub mod buffer;
pub mod palette;
pub mod registers;
pub mod savestate;
pub mod sprite;

mod background_pipeline;
mod compositor;
mod sprite_pipeline;
mod tile_viewer;
mod vram;

use core::fmt;

use tracing::{debug, trace};

use crate::{
    config::PpuConfig,
    mapper::Mapper,
    memory::{PALETTE_BASE, Register as PpuRegister, VRAM_MIRROR_MASK},
};
use background_pipeline::{BgPipeline, attribute_quadrant};
use buffer::{ColorFormat, FrameBuffer};
use palette::Palette;
use registers::{A12, Registers, Status};
use sprite::OamEntry;
use sprite_pipeline::SpritePipeline;
use vram::Vram;

pub use tile_viewer::{TILE_PIXELS, TileImage};

/// Visible raster width in pixels.
pub const SCREEN_WIDTH: usize = 256;
/// Visible raster height in pixels.
pub const SCREEN_HEIGHT: usize = 240;
/// Dots per scanline (0..=340).
pub const CYCLES_PER_SCANLINE: u16 = 341;
/// Scanlines per frame: the pre-render line, 240 visible lines and vblank.
pub const SCANLINES_PER_FRAME: i16 = 262;

const PRE_RENDER_SCANLINE: i16 = -1;
const LAST_SCANLINE: i16 = PRE_RENDER_SCANLINE + SCANLINES_PER_FRAME - 1;
const VBLANK_SCANLINE: i16 = 241;
const VISIBLE_SCANLINES: i16 = SCREEN_HEIGHT as i16;
const LAST_DOT: u16 = CYCLES_PER_SCANLINE - 1;
/// Dot at which rendering scanlines notify the mapper.
const MAPPER_NOTIFY_DOT: u16 = 260;
/// Dot at which the visible list for the next scanline is rebuilt.
const SPRITE_EVAL_DOT: u16 = 320;

/// The picture processing unit.
#[derive(Clone)]
pub struct Ppu {
    /// CPU visible registers, OAM and the scroll/address latches.
    registers: Registers,
    /// Nametables, internal pattern banks and palette memory.
    vram: Vram,
    bg: BgPipeline,
    sprites: SpritePipeline,
    mapper: Box<dyn Mapper>,
    palette: Palette,
    framebuffer: FrameBuffer,
    /// Current dot (0..=340) within the active scanline.
    cycle: u16,
    /// Current scanline. `-1` is the pre-render line, `0..239` are visible.
    scanline: i16,
    /// Frames published since reset.
    frame: u64,
    odd_frame: bool,
    nmi_pending: bool,
    frame_complete: bool,
}

impl fmt::Debug for Ppu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ppu")
            .field("registers", &self.registers)
            .field("mapper", &self.mapper)
            .field("cycle", &self.cycle)
            .field("scanline", &self.scanline)
            .field("frame", &self.frame)
            .field("odd_frame", &self.odd_frame)
            .field("nmi_pending", &self.nmi_pending)
            .finish()
    }
}

impl Ppu {
    /// Creates a PPU in its reset state with the default configuration.
    pub fn new(mapper: Box<dyn Mapper>) -> Self {
        Self::with_config(mapper, PpuConfig::default())
    }

    pub fn with_config(mapper: Box<dyn Mapper>, config: PpuConfig) -> Self {
        let mut ppu = Self {
            registers: Registers::new(),
            vram: Vram::new(),
            bg: BgPipeline::new(),
            sprites: SpritePipeline::new(),
            mapper,
            palette: config.palette,
            framebuffer: FrameBuffer::new(config.color_format),
            cycle: 0,
            scanline: PRE_RENDER_SCANLINE,
            frame: 0,
            odd_frame: false,
            nmi_pending: false,
            frame_complete: false,
        };
        ppu.reset();
        ppu
    }

    /// Restores registers, pipelines and counters to their reset values.
    ///
    /// Memories keep their allocation; OAM, nametable, pattern and palette
    /// contents are left untouched.
    pub fn reset(&mut self) {
        self.registers.reset();
        self.bg.clear();
        self.sprites.clear();
        self.framebuffer.clear();
        self.cycle = 0;
        self.scanline = PRE_RENDER_SCANLINE;
        self.frame = 0;
        self.odd_frame = false;
        self.nmi_pending = false;
        self.frame_complete = false;
        debug!(mapper = ?self.mapper, "ppu reset");
    }

    pub fn mapper(&self) -> &dyn Mapper {
        self.mapper.as_ref()
    }

    pub fn mapper_mut(&mut self) -> &mut dyn Mapper {
        self.mapper.as_mut()
    }

    /// Swaps in a new mapper, returning the previous one.
    pub fn set_mapper(&mut self, mapper: Box<dyn Mapper>) -> Box<dyn Mapper> {
        debug!(mapper = ?mapper, "mapper replaced");
        core::mem::replace(&mut self.mapper, mapper)
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.palette = palette;
    }

    /// Changes the framebuffer pixel packing. Both planes are reallocated
    /// and start cleared.
    pub fn set_color_format(&mut self, format: ColorFormat) {
        if self.framebuffer.format() != format {
            self.framebuffer = FrameBuffer::new(format);
        }
    }

    // CPU port protocol

    /// Handles CPU writes to a port (`port` may be any mirror in `$2000-$3FFF`).
    pub fn cpu_write(&mut self, port: u16, value: u8) {
        match PpuRegister::from_port(port) {
            PpuRegister::Control => self.registers.write_control(value),
            PpuRegister::Mask => self.registers.mask = registers::Mask::from_bits_retain(value),
            PpuRegister::Status => {} // read-only
            PpuRegister::OamAddr => self.registers.oam_addr = value,
            PpuRegister::OamData => self.write_oam_data(value),
            PpuRegister::Scroll => self.registers.vram.write_scroll(value),
            PpuRegister::Addr => self.registers.vram.write_addr(value),
            PpuRegister::Data => self.write_vram_data(value),
        }
    }

    /// Handles CPU reads from a port. Write-only ports read as 0.
    pub fn cpu_read(&mut self, port: u16) -> u8 {
        match PpuRegister::from_port(port) {
            PpuRegister::Status => self.read_status(),
            PpuRegister::OamData => self.read_oam_data(),
            PpuRegister::Data => self.read_vram_data(),
            _ => 0,
        }
    }

    /// Reads a port without any side effect.
    pub fn peek_register(&self, port: u16) -> u8 {
        match PpuRegister::from_port(port) {
            PpuRegister::Control => self.registers.control.bits(),
            PpuRegister::Mask => self.registers.mask.bits(),
            PpuRegister::Status => self.registers.status.bits(),
            PpuRegister::OamData => self.registers.oam[usize::from(self.registers.oam_addr)],
            _ => 0,
        }
    }

    /// Reads the PPU address space without notifying the mapper.
    pub fn peek_vram(&self, addr: u16) -> u8 {
        let addr = addr & VRAM_MIRROR_MASK;
        self.mapper.ppu_read(addr).unwrap_or_else(|| {
            self.vram
                .read(addr, self.mapper.mirroring(), self.registers.mask)
        })
    }

    fn read_status(&mut self) -> u8 {
        let value = self.registers.status_value();
        self.registers.status.remove(Status::VERTICAL_BLANK);
        self.registers.vram.reset_latch();
        value
    }

    fn read_oam_data(&mut self) -> u8 {
        let value = self.registers.oam[usize::from(self.registers.oam_addr)];
        self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
        value
    }

    fn write_oam_data(&mut self, value: u8) {
        self.registers.oam[usize::from(self.registers.oam_addr)] = value;
        self.registers.oam_addr = self.registers.oam_addr.wrapping_add(1);
    }

    /// Port 7 read. Below the palette the value is one access stale: the
    /// buffered byte is returned and refilled from the current address.
    fn read_vram_data(&mut self) -> u8 {
        let addr = self.registers.vram.v.raw();
        let buffered = self.registers.read_buffer;
        self.registers.read_buffer = self.bus_read(addr);
        let value = if (addr & VRAM_MIRROR_MASK) >= PALETTE_BASE {
            self.registers.read_buffer
        } else {
            buffered
        };
        self.increment_vram_addr();
        if addr & A12 == 0 && self.registers.vram.v.raw() & A12 != 0 {
            self.mapper.on_scanline();
        }
        value
    }

    fn write_vram_data(&mut self, value: u8) {
        let addr = self.registers.vram.v.raw();
        self.bus_write(addr, value);
        self.increment_vram_addr();
    }

    fn increment_vram_addr(&mut self) {
        let step = self.registers.control.vram_increment();
        self.registers.vram.v.increment(step);
    }

    // Memory decode

    fn bus_read(&mut self, addr: u16) -> u8 {
        let addr = addr & VRAM_MIRROR_MASK;
        if let Some(value) = self.mapper.ppu_read(addr) {
            return value;
        }
        let value = self
            .vram
            .read(addr, self.mapper.mirroring(), self.registers.mask);
        self.mapper.on_latch_update(addr);
        value
    }

    fn bus_write(&mut self, addr: u16, value: u8) {
        let addr = addr & VRAM_MIRROR_MASK;
        if self.mapper.ppu_write(addr, value) {
            return;
        }
        self.vram.write(addr, value, self.mapper.mirroring());
        self.mapper.on_latch_update(addr);
    }

    // Timing

    /// Advances the PPU by a single dot.
    pub fn clock(&mut self) {
        if (PRE_RENDER_SCANLINE..VISIBLE_SCANLINES).contains(&self.scanline) {
            self.render_dot();
        }

        if self.scanline == VBLANK_SCANLINE && self.cycle == 1 {
            self.registers.status.insert(Status::VERTICAL_BLANK);
            if self.registers.control.nmi_enabled() {
                self.nmi_pending = true;
                trace!(frame = self.frame, "nmi latched");
            }
        }

        if (0..VISIBLE_SCANLINES).contains(&self.scanline) && (1..=257).contains(&self.cycle) {
            self.output_pixel();
        }

        if self.registers.mask.rendering_enabled()
            && self.cycle == MAPPER_NOTIFY_DOT
            && self.scanline < VISIBLE_SCANLINES
        {
            self.mapper.on_scanline();
        }

        self.advance();
    }

    /// Alias of [`Ppu::clock`].
    #[inline]
    pub fn tick(&mut self) {
        self.clock();
    }

    fn advance(&mut self) {
        self.cycle += 1;
        if self.cycle <= LAST_DOT {
            return;
        }
        self.cycle = 0;
        self.scanline += 1;
        if self.scanline > LAST_SCANLINE {
            self.scanline = PRE_RENDER_SCANLINE;
            self.frame_complete = true;
            self.odd_frame = !self.odd_frame;
            self.framebuffer.swap();
            self.frame = self.frame.wrapping_add(1);
            trace!(frame = self.frame, "frame published");
        }
    }

    /// Background fetches, scroll updates and sprite evaluation for the
    /// pre-render and visible scanlines.
    fn render_dot(&mut self) {
        let rendering = self.registers.mask.rendering_enabled();

        if rendering && (257..=SPRITE_EVAL_DOT).contains(&self.cycle) {
            self.registers.oam_addr = 0;
        }

        if self.scanline == 0 && self.cycle == 0 && self.odd_frame && rendering {
            trace!(frame = self.frame, "odd frame dot skipped");
            self.cycle = 1;
        }

        if self.scanline == PRE_RENDER_SCANLINE && self.cycle == 1 {
            self.registers
                .status
                .remove(Status::VERTICAL_BLANK | Status::SPRITE_ZERO_HIT | Status::SPRITE_OVERFLOW);
            self.sprites.clear_shifters();
        }

        if (2..=257).contains(&self.cycle) || (321..=337).contains(&self.cycle) {
            if self.registers.mask.show_background() {
                self.bg.shift();
            }
            if self.registers.mask.show_sprites() && self.cycle <= 257 {
                self.sprites.shift();
            }
            self.fetch_background((self.cycle - 1) % 8, rendering);
        }

        if self.cycle == 256 && rendering {
            self.registers.vram.v.increment_y();
        }

        if self.cycle == 257 {
            self.bg.reload();
            if rendering {
                let t = self.registers.vram.t;
                self.registers.vram.v.copy_horizontal(t);
            }
        }

        if self.cycle == 338 || self.cycle == LAST_DOT {
            let addr = self.registers.vram.v.tile_addr();
            self.bg.latches.tile_id = self.bus_read(addr);
        }

        if self.scanline == PRE_RENDER_SCANLINE && (280..=304).contains(&self.cycle) && rendering {
            let t = self.registers.vram.t;
            self.registers.vram.v.copy_vertical(t);
        }

        if self.cycle == SPRITE_EVAL_DOT {
            self.evaluate_sprites();
        }

        if self.cycle == LAST_DOT {
            self.fetch_sprite_patterns();
        }
    }

    /// One step of the 8-dot tile fetch sequence.
    fn fetch_background(&mut self, phase: u16, rendering: bool) {
        let v = self.registers.vram.v;
        match phase {
            0 => {
                self.bg.reload();
                self.bg.latches.tile_id = self.bus_read(v.tile_addr());
            }
            2 => {
                let attribute = self.bus_read(v.attribute_addr());
                self.bg.latches.attribute = attribute_quadrant(attribute, v.coarse_x(), v.coarse_y());
            }
            4 => {
                let addr = self.background_pattern_addr();
                self.bg.latches.pattern_lo = self.bus_read(addr);
            }
            6 => {
                let addr = self.background_pattern_addr() + 8;
                self.bg.latches.pattern_hi = self.bus_read(addr);
            }
            7 if rendering => self.registers.vram.v.increment_coarse_x(),
            _ => {}
        }
    }

    fn background_pattern_addr(&self) -> u16 {
        self.registers.control.background_pattern_table()
            + (u16::from(self.bg.latches.tile_id) << 4)
            + u16::from(self.registers.vram.v.fine_y())
    }

    fn evaluate_sprites(&mut self) {
        let target = self.scanline + 1;
        let height = self.registers.control.sprite_height();
        if self
            .sprites
            .evaluate(self.registers.oam.as_slice(), target, height)
        {
            self.registers.status.insert(Status::SPRITE_OVERFLOW);
            trace!(scanline = target, "sprite overflow");
        }
    }

    fn fetch_sprite_patterns(&mut self) {
        let target = self.scanline + 1;
        let tall = self.registers.control.use_8x16_sprites();
        let table = self.registers.control.sprite_pattern_table();
        for slot in 0..self.sprites.count() {
            let entry = self.sprites.entry(slot);
            let row = (target - i16::from(entry.y)) as u8;
            let addr = entry.pattern_addr(row, tall, table);
            let low = self.bus_read(addr);
            let high = self.bus_read(addr + 8);
            self.sprites.load_pattern(slot, low, high);
        }
    }

    /// Composites the current dot and writes it into the back plane.
    fn output_pixel(&mut self) {
        let mask = self.registers.mask;
        let left_column = self.cycle < 9;

        let background = if mask.show_background() && (mask.show_background_left() || !left_column)
        {
            self.bg.sample(self.registers.vram.x)
        } else {
            (0, 0)
        };
        let sprite = if mask.show_sprites() && (mask.show_sprites_left() || !left_column) {
            self.sprites.sample()
        } else {
            None
        };

        if compositor::sprite_zero_hit(
            mask,
            self.cycle,
            background.1,
            sprite,
            self.sprites.sprite0_possible(),
        ) {
            self.registers.status.insert(Status::SPRITE_ZERO_HIT);
        }

        let x = usize::from(self.cycle - 1);
        if x < SCREEN_WIDTH {
            let composite = compositor::compose(background, sprite);
            let index = self.bus_read(composite.palette_addr());
            let color = self.palette.color(index);
            self.framebuffer
                .write_color(x, self.scanline as usize, color);
        }
    }

    // Interrupt and frame output

    /// Whether an NMI has been latched and not yet consumed.
    pub fn nmi_pending(&self) -> bool {
        self.nmi_pending
    }

    /// Consumes the latched NMI, returning whether one was pending.
    pub fn take_nmi(&mut self) -> bool {
        core::mem::take(&mut self.nmi_pending)
    }

    /// The most recently published frame.
    pub fn frame(&self) -> &[u8] {
        self.framebuffer.render()
    }

    pub fn frame_buffer(&self) -> &FrameBuffer {
        &self.framebuffer
    }

    pub fn is_frame_complete(&self) -> bool {
        self.frame_complete
    }

    /// Returns and clears the frame-complete flag.
    pub fn take_frame_complete(&mut self) -> bool {
        core::mem::take(&mut self.frame_complete)
    }

    /// Frames published since the last reset.
    pub fn frame_count(&self) -> u64 {
        self.frame
    }

    // Introspection

    pub fn scanline(&self) -> i16 {
        self.scanline
    }

    pub fn dot(&self) -> u16 {
        self.cycle
    }

    pub fn is_odd_frame(&self) -> bool {
        self.odd_frame
    }

    pub fn control(&self) -> registers::Control {
        self.registers.control
    }

    pub fn mask(&self) -> registers::Mask {
        self.registers.mask
    }

    pub fn status(&self) -> Status {
        self.registers.status
    }

    /// Active VRAM address (`v`).
    pub fn vram_addr(&self) -> registers::VramAddr {
        self.registers.vram.v
    }

    /// Staged VRAM address (`t`).
    pub fn temp_vram_addr(&self) -> registers::VramAddr {
        self.registers.vram.t
    }

    pub fn fine_x(&self) -> u8 {
        self.registers.vram.x
    }

    /// Raw sprite attribute table.
    pub fn oam(&self) -> &[u8] {
        self.registers.oam.as_slice()
    }

    /// Decoded attribute entry `index`, or `None` when out of range.
    pub fn oam_entry(&self, index: usize) -> Option<OamEntry> {
        OamEntry::from_oam(self.registers.oam.as_slice(), index)
    }

    /// Attribute entries latched for the scanline being drawn.
    pub fn visible_sprites(&self) -> Vec<OamEntry> {
        (0..self.sprites.count())
            .map(|slot| self.sprites.entry(slot))
            .collect()
    }
}

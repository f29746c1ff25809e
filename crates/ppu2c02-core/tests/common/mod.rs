#![allow(dead_code)]

use std::{cell::RefCell, rc::Rc};

use anyhow::{Result, bail};
use ppu2c02_core::{
    Mapper, Mirroring, Passthrough, Ppu,
    ppu::{CYCLES_PER_SCANLINE, SCANLINES_PER_FRAME},
};

pub const PORT_CONTROL: u16 = 0x2000;
pub const PORT_MASK: u16 = 0x2001;
pub const PORT_STATUS: u16 = 0x2002;
pub const PORT_OAM_ADDR: u16 = 0x2003;
pub const PORT_OAM_DATA: u16 = 0x2004;
pub const PORT_SCROLL: u16 = 0x2005;
pub const PORT_ADDR: u16 = 0x2006;
pub const PORT_DATA: u16 = 0x2007;

pub const DOTS_PER_FRAME: usize = CYCLES_PER_SCANLINE as usize * SCANLINES_PER_FRAME as usize;
/// Upper bound on ticks needed to finish any frame.
const FRAME_TICK_LIMIT: usize = DOTS_PER_FRAME + 1;

/// Events a [`RecordingMapper`] has observed.
#[derive(Debug, Default)]
pub struct MapperLog {
    pub scanline_events: usize,
    pub latch_updates: Vec<u16>,
}

/// Mapper that records every notification. Optionally serves the pattern
/// range from its own CHR memory, intercepting those accesses.
#[derive(Debug, Clone)]
pub struct RecordingMapper {
    mirroring: Mirroring,
    log: Rc<RefCell<MapperLog>>,
    chr: Option<Rc<RefCell<Vec<u8>>>>,
}

impl RecordingMapper {
    pub fn new(mirroring: Mirroring) -> (Self, Rc<RefCell<MapperLog>>) {
        let log = Rc::new(RefCell::new(MapperLog::default()));
        let mapper = Self {
            mirroring,
            log: Rc::clone(&log),
            chr: None,
        };
        (mapper, log)
    }

    /// Variant that intercepts `$0000-$1FFF` with 8 KiB of its own CHR RAM.
    pub fn with_chr(mirroring: Mirroring) -> (Self, Rc<RefCell<MapperLog>>) {
        let (mut mapper, log) = Self::new(mirroring);
        mapper.chr = Some(Rc::new(RefCell::new(vec![0; 0x2000])));
        (mapper, log)
    }
}

impl Mapper for RecordingMapper {
    fn ppu_read(&self, addr: u16) -> Option<u8> {
        let chr = self.chr.as_ref()?;
        (addr < 0x2000).then(|| chr.borrow()[usize::from(addr)])
    }

    fn ppu_write(&mut self, addr: u16, value: u8) -> bool {
        match &self.chr {
            Some(chr) if addr < 0x2000 => {
                chr.borrow_mut()[usize::from(addr)] = value;
                true
            }
            _ => false,
        }
    }

    fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    fn on_scanline(&mut self) {
        self.log.borrow_mut().scanline_events += 1;
    }

    fn on_latch_update(&mut self, addr: u16) {
        self.log.borrow_mut().latch_updates.push(addr);
    }
}

pub fn passthrough_ppu(mirroring: Mirroring) -> Ppu {
    Ppu::new(Box::new(Passthrough::new(mirroring)))
}

pub fn set_vram_addr(ppu: &mut Ppu, addr: u16) {
    ppu.cpu_write(PORT_ADDR, (addr >> 8) as u8);
    ppu.cpu_write(PORT_ADDR, addr as u8);
}

/// Writes `values` starting at `addr` through the data port.
pub fn write_vram(ppu: &mut Ppu, addr: u16, values: &[u8]) {
    set_vram_addr(ppu, addr);
    for &value in values {
        ppu.cpu_write(PORT_DATA, value);
    }
}

/// Writes a full attribute entry through the OAM ports.
pub fn write_sprite(ppu: &mut Ppu, index: u8, y: u8, tile: u8, attributes: u8, x: u8) {
    ppu.cpu_write(PORT_OAM_ADDR, index * 4);
    for byte in [y, tile, attributes, x] {
        ppu.cpu_write(PORT_OAM_DATA, byte);
    }
}

/// Clears the staged and active addresses so rendering starts at the top
/// left of nametable 0.
pub fn reset_scroll(ppu: &mut Ppu) {
    ppu.cpu_read(PORT_STATUS);
    ppu.cpu_write(PORT_CONTROL, 0);
    ppu.cpu_write(PORT_SCROLL, 0);
    ppu.cpu_write(PORT_SCROLL, 0);
    set_vram_addr(ppu, 0);
}

pub fn tick(ppu: &mut Ppu, count: usize) {
    for _ in 0..count {
        ppu.clock();
    }
}

/// Ticks until the PPU sits at `(scanline, dot)`, before that dot executes.
pub fn run_until(ppu: &mut Ppu, scanline: i16, dot: u16) -> Result<()> {
    for _ in 0..2 * FRAME_TICK_LIMIT {
        if ppu.scanline() == scanline && ppu.dot() == dot {
            return Ok(());
        }
        ppu.clock();
    }
    bail!("never reached scanline {scanline} dot {dot}")
}

/// Ticks until the next frame is published.
pub fn run_frame(ppu: &mut Ppu) -> Result<()> {
    for _ in 0..FRAME_TICK_LIMIT {
        ppu.clock();
        if ppu.take_frame_complete() {
            return Ok(());
        }
    }
    bail!("frame did not complete within {FRAME_TICK_LIMIT} ticks")
}

/// RGBA bytes of pixel `(x, y)` in the published frame.
pub fn pixel(ppu: &Ppu, x: usize, y: usize) -> [u8; 4] {
    let pitch = ppu.frame_buffer().pitch();
    let idx = y * pitch + x * 4;
    let mut out = [0; 4];
    out.copy_from_slice(&ppu.frame()[idx..idx + 4]);
    out
}

/// RGBA bytes the default palette produces for a palette index.
pub fn rgba(ppu: &Ppu, index: u8) -> [u8; 4] {
    let c = ppu.palette().color(index);
    [c.r, c.g, c.b, 0xFF]
}

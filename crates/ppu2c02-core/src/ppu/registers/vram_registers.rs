use super::VramAddr;

/// Internal scroll/address register block (`v`/`t`/`x`/`w`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct VramRegisters {
    /// Active VRAM address (`v`).
    pub(crate) v: VramAddr,
    /// Staged VRAM address (`t`).
    pub(crate) t: VramAddr,
    /// Fine X scroll (`x`, 0..7).
    pub(crate) x: u8,
    /// Write toggle (`w`): false => first write, true => second write.
    pub(crate) w: bool,
}

impl VramRegisters {
    /// Port 5 write. The first write splits into fine X / staged coarse X,
    /// the second into staged fine Y / coarse Y.
    pub(crate) fn write_scroll(&mut self, value: u8) {
        if !self.w {
            self.x = value & 0b111;
            self.t.set_coarse_x(value >> 3);
        } else {
            self.t.set_fine_y(value & 0b111);
            self.t.set_coarse_y(value >> 3);
        }
        self.w = !self.w;
    }

    /// Port 6 write. The first write sets the staged high byte (6 bits), the
    /// second sets the low byte and commits `t` into `v`.
    pub(crate) fn write_addr(&mut self, value: u8) {
        if !self.w {
            let hi = u16::from(value & 0b0011_1111) << 8;
            self.t.set_raw((self.t.raw() & 0x00FF) | hi);
        } else {
            self.t.set_raw((self.t.raw() & 0xFF00) | u16::from(value));
            self.v = self.t;
        }
        self.w = !self.w;
    }

    /// Resets the write toggle so the next port 5/6 write is treated as the
    /// first half of the pair.
    pub(crate) fn reset_latch(&mut self) {
        self.w = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scroll_writes_split_into_fields() {
        let mut regs = VramRegisters::default();
        regs.write_scroll(0b0010_1011);
        regs.write_scroll(0b0001_0100);
        assert_eq!(regs.x, 3);
        assert_eq!(regs.t.coarse_x(), 5);
        assert_eq!(regs.t.fine_y(), 4);
        assert_eq!(regs.t.coarse_y(), 2);
        assert!(!regs.w);
    }

    #[test]
    fn address_pair_commits_on_second_write() {
        let mut regs = VramRegisters::default();
        regs.write_addr(0xFF);
        assert_eq!(regs.v.raw(), 0);
        regs.write_addr(0x34);
        assert_eq!(regs.v.raw(), 0x3F34);
        assert_eq!(regs.t.raw(), 0x3F34);

        // Third write starts a new pair.
        regs.write_addr(0x21);
        assert_eq!(regs.v.raw(), 0x3F34);
        regs.write_addr(0x08);
        assert_eq!(regs.v.raw(), 0x2108);
    }
}

use bitflags::bitflags;

bitflags! {
    /// PPU status register (port 2).
    ///
    /// Bit layout:
    /// ```text
    /// 7 6 5 4 3 2 1 0
    /// V S O . . . . .
    /// ```
    /// The low five bits are not driven; reads fill them from the `$2007`
    /// read buffer.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Status: u8 {
        const SPRITE_OVERFLOW = 0b0010_0000;
        const SPRITE_ZERO_HIT = 0b0100_0000;
        /// Reading port 2 clears this bit.
        const VERTICAL_BLANK = 0b1000_0000;
    }
}

impl Status {
    /// Bits actually driven by the status register.
    pub const DRIVEN_BITS: u8 = 0b1110_0000;
    /// Power-up / reset pattern (vblank and overflow set).
    pub const RESET: Status = Status::VERTICAL_BLANK.union(Status::SPRITE_OVERFLOW);

    pub fn vblank(self) -> bool {
        self.contains(Status::VERTICAL_BLANK)
    }

    pub fn sprite_zero_hit(self) -> bool {
        self.contains(Status::SPRITE_ZERO_HIT)
    }

    pub fn sprite_overflow(self) -> bool {
        self.contains(Status::SPRITE_OVERFLOW)
    }
}

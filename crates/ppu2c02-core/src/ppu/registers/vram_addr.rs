use bitflags::bitflags;

// Layout (bits 0-14):
//  14 13 12 11 10 9 8 7 6 5 4 3 2 1 0
//  [fine_y][nt][coarse_y   ][coarse_x   ]
//  yyy     YX   YYYYY         XXXXX
bitflags! {
    /// Bit masks for the 15-bit composite VRAM address.
    pub(crate) struct VramAddrMask: u16 {
        const COARSE_X = 0x001F;
        const COARSE_Y = 0x03E0;
        const NAMETABLE_X = 0x0400;
        const NAMETABLE_Y = 0x0800;
        const FINE_Y = 0x7000;
        const HORIZONTAL = Self::COARSE_X.bits() | Self::NAMETABLE_X.bits();
        const VERTICAL = Self::COARSE_Y.bits() | Self::NAMETABLE_Y.bits() | Self::FINE_Y.bits();
        const ALL = Self::HORIZONTAL.bits() | Self::VERTICAL.bits();
    }
}

const COARSE_Y_SHIFT: u16 = 5;
const FINE_Y_SHIFT: u16 = 12;

/// Bit 12 of the address bus (pattern table 1 / mapper A12).
pub(crate) const A12: u16 = 0x1000;

/// 15-bit composite VRAM address used for the active and staged registers.
///
/// Every setter masks its argument to the field width and the result to 15
/// bits, so no sequence of writes can leave stray high bits behind.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct VramAddr(u16);

impl VramAddr {
    /// Returns the coarse X scroll component (0..31).
    #[inline]
    pub fn coarse_x(self) -> u8 {
        (self.0 & VramAddrMask::COARSE_X.bits()) as u8
    }

    #[inline]
    pub fn set_coarse_x(&mut self, cx: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_X.bits()) | u16::from(cx & 0b1_1111);
    }

    /// Returns the coarse Y scroll component (0..31).
    #[inline]
    pub fn coarse_y(self) -> u8 {
        ((self.0 & VramAddrMask::COARSE_Y.bits()) >> COARSE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_coarse_y(&mut self, cy: u8) {
        self.0 = (self.0 & !VramAddrMask::COARSE_Y.bits())
            | (u16::from(cy & 0b1_1111) << COARSE_Y_SHIFT);
    }

    #[inline]
    pub fn nametable_x(self) -> bool {
        self.0 & VramAddrMask::NAMETABLE_X.bits() != 0
    }

    #[inline]
    pub fn set_nametable_x(&mut self, on: bool) {
        self.0 = (self.0 & !VramAddrMask::NAMETABLE_X.bits())
            | if on { VramAddrMask::NAMETABLE_X.bits() } else { 0 };
    }

    #[inline]
    pub fn nametable_y(self) -> bool {
        self.0 & VramAddrMask::NAMETABLE_Y.bits() != 0
    }

    #[inline]
    pub fn set_nametable_y(&mut self, on: bool) {
        self.0 = (self.0 & !VramAddrMask::NAMETABLE_Y.bits())
            | if on { VramAddrMask::NAMETABLE_Y.bits() } else { 0 };
    }

    /// Returns the fine Y scroll component (0..7).
    #[inline]
    pub fn fine_y(self) -> u8 {
        ((self.0 & VramAddrMask::FINE_Y.bits()) >> FINE_Y_SHIFT) as u8
    }

    #[inline]
    pub fn set_fine_y(&mut self, fy: u8) {
        self.0 = (self.0 & !VramAddrMask::FINE_Y.bits()) | (u16::from(fy & 0b111) << FINE_Y_SHIFT);
    }

    /// Returns the raw 15-bit value.
    #[inline]
    pub fn raw(self) -> u16 {
        self.0
    }

    /// Replaces the raw address, masking to 15 bits.
    #[inline]
    pub fn set_raw(&mut self, v: u16) {
        self.0 = v & VramAddrMask::ALL.bits();
    }

    /// Adds `step` to the raw address, wrapping within 15 bits.
    #[inline]
    pub fn increment(&mut self, step: u16) {
        self.0 = self.0.wrapping_add(step) & VramAddrMask::ALL.bits();
    }

    /// Advances to the next tile column, wrapping into the neighbouring
    /// horizontal nametable after column 31.
    pub fn increment_coarse_x(&mut self) {
        if self.coarse_x() == 31 {
            self.set_coarse_x(0);
            self.set_nametable_x(!self.nametable_x());
        } else {
            self.set_coarse_x(self.coarse_x() + 1);
        }
    }

    /// Advances to the next pixel row.
    ///
    /// Row 29 is the last tile row of a nametable and wraps into the other
    /// vertical table; rows 30/31 (attribute space) wrap to 0 in place.
    pub fn increment_y(&mut self) {
        if self.fine_y() < 7 {
            self.set_fine_y(self.fine_y() + 1);
            return;
        }
        self.set_fine_y(0);
        match self.coarse_y() {
            29 => {
                self.set_coarse_y(0);
                self.set_nametable_y(!self.nametable_y());
            }
            31 => self.set_coarse_y(0),
            cy => self.set_coarse_y(cy + 1),
        }
    }

    /// Copies coarse X and nametable X from `src`.
    #[inline]
    pub fn copy_horizontal(&mut self, src: VramAddr) {
        let mask = VramAddrMask::HORIZONTAL.bits();
        self.0 = (self.0 & !mask) | (src.0 & mask);
    }

    /// Copies fine Y, coarse Y and nametable Y from `src`.
    #[inline]
    pub fn copy_vertical(&mut self, src: VramAddr) {
        let mask = VramAddrMask::VERTICAL.bits();
        self.0 = (self.0 & !mask) | (src.0 & mask);
    }

    /// Nametable byte for the tile under this address.
    #[inline]
    pub fn tile_addr(self) -> u16 {
        crate::memory::NAMETABLE_BASE | (self.0 & crate::memory::NAMETABLE_WINDOW_MASK)
    }

    /// Attribute byte covering the tile under this address.
    #[inline]
    pub fn attribute_addr(self) -> u16 {
        crate::memory::ATTRIBUTE_TABLE_BASE
            | (self.0 & (VramAddrMask::NAMETABLE_X.bits() | VramAddrMask::NAMETABLE_Y.bits()))
            | (u16::from(self.coarse_y() >> 2) << 3)
            | u16::from(self.coarse_x() >> 2)
    }
}

impl core::fmt::Debug for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VramAddr")
            .field("raw", &format_args!("{:#06X}", self.0))
            .field("fine_y", &self.fine_y())
            .field("nametable_y", &self.nametable_y())
            .field("nametable_x", &self.nametable_x())
            .field("coarse_y", &self.coarse_y())
            .field("coarse_x", &self.coarse_x())
            .finish()
    }
}

impl core::fmt::Display for VramAddr {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "raw={:#06X} fy={} nt={}{} cy={} cx={}",
            self.0,
            self.fine_y(),
            u8::from(self.nametable_y()),
            u8::from(self.nametable_x()),
            self.coarse_y(),
            self.coarse_x(),
        )
    }
}

impl From<u16> for VramAddr {
    #[inline]
    fn from(v: u16) -> Self {
        VramAddr(v & VramAddrMask::ALL.bits())
    }
}

impl From<VramAddr> for u16 {
    #[inline]
    fn from(v: VramAddr) -> Self {
        v.raw()
    }
}

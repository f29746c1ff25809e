/// 16-bit left-shifting register used by the background pipeline.
///
/// Layout:
///   [ high 8 bits | low 8 bits ]
///
/// The high byte holds the tile whose pixels are currently shifting out, the
/// low byte holds the prefetched next tile (or its repeated palette bit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
struct Shift16(u16);

impl Shift16 {
    /// Replaces the low byte, keeping the in-flight high byte.
    #[inline]
    fn load_low_byte(&mut self, byte: u8) {
        self.0 = (self.0 & 0xFF00) | u16::from(byte);
    }

    /// Returns the bit at position `15 - fine_x`.
    ///
    /// Fine X selects which bit is visible rather than delaying the shifts.
    #[inline]
    fn bit_with_fine_x(self, fine_x: u8) -> u8 {
        let shift = 15 - u16::from(fine_x & 0b111);
        ((self.0 >> shift) & 1) as u8
    }

    #[inline]
    fn shift(&mut self) {
        self.0 <<= 1;
    }
}

/// Tile data fetched during the 8-dot phase sequence, waiting to be loaded
/// into the shifters at the next tile boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgLatches {
    /// Nametable byte (tile id).
    pub(crate) tile_id: u8,
    /// Two-bit palette select from the attribute table.
    pub(crate) attribute: u8,
    /// Pattern bitplane 0 for the current row.
    pub(crate) pattern_lo: u8,
    /// Pattern bitplane 1 for the current row.
    pub(crate) pattern_hi: u8,
}

/// Background pixel pipeline.
///
/// Four 16-bit shift registers: two pattern bitplanes and two palette bits.
/// Each visible dot samples one bit of each (offset by fine X) and advances
/// them by one; every 8 dots the low bytes are reloaded from the latches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub(crate) struct BgPipeline {
    /// Pattern bitplanes: [bitplane0, bitplane1].
    pattern: [Shift16; 2],
    /// Palette bits: [palette_bit0, palette_bit1].
    palette: [Shift16; 2],
    pub(crate) latches: BgLatches,
}

impl BgPipeline {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Clears shifters and latches.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }

    /// Loads the latched tile into the low byte of every shifter.
    ///
    /// Each palette bit is replicated across the whole byte so that it stays
    /// constant for all eight pixels of the tile.
    pub(crate) fn reload(&mut self) {
        let BgLatches {
            attribute,
            pattern_lo,
            pattern_hi,
            ..
        } = self.latches;
        self.pattern[0].load_low_byte(pattern_lo);
        self.pattern[1].load_low_byte(pattern_hi);
        for (i, shifter) in self.palette.iter_mut().enumerate() {
            let repeated = if (attribute >> i) & 1 != 0 { 0xFF } else { 0x00 };
            shifter.load_low_byte(repeated);
        }
    }

    /// Samples the current background pixel.
    ///
    /// Returns `(palette, pixel)`, both in `0..=3`.
    pub(crate) fn sample(&self, fine_x: u8) -> (u8, u8) {
        let pixel = (self.pattern[1].bit_with_fine_x(fine_x) << 1)
            | self.pattern[0].bit_with_fine_x(fine_x);
        let palette = (self.palette[1].bit_with_fine_x(fine_x) << 1)
            | self.palette[0].bit_with_fine_x(fine_x);
        (palette, pixel)
    }

    /// Advances all four shifters by one dot.
    pub(crate) fn shift(&mut self) {
        for shifter in self.pattern.iter_mut().chain(self.palette.iter_mut()) {
            shifter.shift();
        }
    }

    /// Raw shifter contents as `[pattern_lo, pattern_hi, palette_lo, palette_hi]`.
    pub(crate) fn shifters(&self) -> [u16; 4] {
        [
            self.pattern[0].0,
            self.pattern[1].0,
            self.palette[0].0,
            self.palette[1].0,
        ]
    }

    pub(crate) fn set_shifters(&mut self, raw: [u16; 4]) {
        self.pattern = [Shift16(raw[0]), Shift16(raw[1])];
        self.palette = [Shift16(raw[2]), Shift16(raw[3])];
    }
}

/// Selects the two-bit quadrant palette out of an attribute byte.
#[inline]
pub(crate) fn attribute_quadrant(attribute: u8, coarse_x: u8, coarse_y: u8) -> u8 {
    let mut value = attribute;
    if coarse_y & 0b10 != 0 {
        value >>= 4;
    }
    if coarse_x & 0b10 != 0 {
        value >>= 2;
    }
    value & 0b11
}

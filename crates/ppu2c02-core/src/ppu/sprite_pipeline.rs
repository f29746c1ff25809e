use super::sprite::OamEntry;
use crate::{
    mem_block::MemBlock,
    memory::{OAM_ENTRY_COUNT, SPRITES_PER_LINE},
};

/// A single sprite slot for the upcoming scanline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct SpriteSlot {
    /// Copy of the attribute entry that qualified for this slot.
    pub(crate) entry: OamEntry,
    /// Pattern bitplane 0 (shifted left once per dot after the delay expires).
    pub(crate) pattern_low: u8,
    /// Pattern bitplane 1.
    pub(crate) pattern_high: u8,
    /// Remaining dots before the sprite starts outputting.
    pub(crate) x_counter: u8,
}

impl Default for SpriteSlot {
    fn default() -> Self {
        Self {
            entry: OamEntry::SENTINEL,
            pattern_low: 0,
            pattern_high: 0,
            x_counter: OamEntry::SENTINEL.x,
        }
    }
}

/// Sprite pixel produced by the pipeline for a single dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub(crate) struct SpritePixel {
    /// Color index within the palette (1..=3; transparent pixels are never produced).
    pub(crate) pixel: u8,
    /// Sprite palette select (0..=3).
    pub(crate) palette: u8,
    /// Drawn in front of opaque background pixels.
    pub(crate) in_front: bool,
    /// Came from slot 0.
    pub(crate) slot_zero: bool,
}

type SpriteSlots = MemBlock<SpriteSlot, SPRITES_PER_LINE>;

/// Visible sprite list for one scanline plus its per-slot shifters.
///
/// Sprite shifters are 8 bits wide: a sprite row is exactly one tile, there
/// is no lookahead half as in the background pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SpritePipeline {
    slots: SpriteSlots,
    count: u8,
    sprite0_possible: bool,
}

impl Default for SpritePipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl SpritePipeline {
    pub(crate) fn new() -> Self {
        Self {
            slots: SpriteSlots::filled(SpriteSlot::default()),
            count: 0,
            sprite0_possible: false,
        }
    }

    /// Empties the visible list and resets every slot to the sentinel.
    pub(crate) fn clear(&mut self) {
        self.slots.fill(SpriteSlot::default());
        self.count = 0;
        self.sprite0_possible = false;
    }

    /// Zeroes the pattern shifters of every slot.
    pub(crate) fn clear_shifters(&mut self) {
        for slot in self.slots.iter_mut() {
            slot.pattern_low = 0;
            slot.pattern_high = 0;
        }
    }

    /// Rebuilds the visible list for `target_line` from the attribute table.
    ///
    /// Entries qualify when `0 <= target_line - y < height`. The first eight
    /// in table order are kept. Returns `true` when a ninth entry also
    /// qualified (sprite overflow).
    pub(crate) fn evaluate(&mut self, oam: &[u8], target_line: i16, height: u8) -> bool {
        self.clear();
        let mut overflow = false;
        for index in 0..OAM_ENTRY_COUNT {
            let Some(entry) = OamEntry::from_oam(oam, index) else {
                break;
            };
            let row = target_line - i16::from(entry.y);
            if !(0..i16::from(height)).contains(&row) {
                continue;
            }
            if usize::from(self.count) == SPRITES_PER_LINE {
                overflow = true;
                break;
            }
            if index == 0 {
                self.sprite0_possible = true;
            }
            self.slots[usize::from(self.count)] = SpriteSlot {
                entry,
                pattern_low: 0,
                pattern_high: 0,
                x_counter: entry.x,
            };
            self.count += 1;
        }
        overflow
    }

    /// Number of occupied slots (0..=8).
    pub(crate) fn count(&self) -> usize {
        usize::from(self.count)
    }

    pub(crate) fn sprite0_possible(&self) -> bool {
        self.sprite0_possible
    }

    /// Attribute entry latched into `slot`.
    pub(crate) fn entry(&self, slot: usize) -> OamEntry {
        self.slots[slot].entry
    }

    /// Loads fetched bitplanes into `slot`, pre-reversing them for
    /// horizontally flipped sprites so shifting left always walks pixels
    /// left to right.
    pub(crate) fn load_pattern(&mut self, slot: usize, low: u8, high: u8) {
        let entry = &mut self.slots[slot];
        let (low, high) = if entry.entry.attributes.flip_horizontal() {
            (low.reverse_bits(), high.reverse_bits())
        } else {
            (low, high)
        };
        entry.pattern_low = low;
        entry.pattern_high = high;
    }

    /// Advances every occupied slot by one dot: slots still waiting on their
    /// X delay count down, the rest shift.
    pub(crate) fn shift(&mut self) {
        let count = self.count();
        for slot in self.slots.iter_mut().take(count) {
            if slot.x_counter > 0 {
                slot.x_counter -= 1;
            } else {
                slot.pattern_low <<= 1;
                slot.pattern_high <<= 1;
            }
        }
    }

    /// Returns the first opaque pixel among slots whose delay has expired.
    pub(crate) fn sample(&self) -> Option<SpritePixel> {
        self.slots
            .iter()
            .take(self.count())
            .enumerate()
            .filter(|(_, slot)| slot.x_counter == 0)
            .find_map(|(i, slot)| {
                let pixel = ((slot.pattern_high >> 7) << 1) | (slot.pattern_low >> 7);
                (pixel != 0).then(|| SpritePixel {
                    pixel,
                    palette: slot.entry.attributes.palette(),
                    in_front: slot.entry.attributes.in_front(),
                    slot_zero: i == 0,
                })
            })
    }

    pub(crate) fn slots(&self) -> &[SpriteSlot] {
        self.slots.as_slice()
    }

    pub(crate) fn restore(&mut self, slots: &[SpriteSlot], count: u8, sprite0_possible: bool) {
        self.clear();
        for (dst, src) in self.slots.iter_mut().zip(slots) {
            *dst = *src;
        }
        self.count = count.min(SPRITES_PER_LINE as u8);
        self.sprite0_possible = sprite0_possible;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ppu::sprite::SpriteAttributes;

    fn oam_with(entries: &[(usize, [u8; 4])]) -> [u8; 256] {
        let mut oam = [0xF0u8; 256];
        for (index, bytes) in entries {
            oam[index * 4..index * 4 + 4].copy_from_slice(bytes);
        }
        oam
    }

    #[test]
    fn ninth_match_sets_overflow_and_list_caps_at_eight() {
        let entries: Vec<_> = (0..9).map(|i| (i, [20, i as u8, 0, 8 * i as u8])).collect();
        let oam = oam_with(&entries);
        let mut sprites = SpritePipeline::new();
        assert!(sprites.evaluate(&oam, 25, 8));
        assert_eq!(sprites.count(), 8);
        assert!(sprites.sprite0_possible());
        assert_eq!(sprites.entry(7).tile, 7);
    }

    #[test]
    fn exactly_eight_matches_do_not_overflow() {
        let entries: Vec<_> = (1..9).map(|i| (i, [20, 0, 0, 0])).collect();
        let oam = oam_with(&entries);
        let mut sprites = SpritePipeline::new();
        assert!(!sprites.evaluate(&oam, 20, 8));
        assert_eq!(sprites.count(), 8);
        assert!(!sprites.sprite0_possible());
    }

    #[test]
    fn height_bounds_qualification() {
        let oam = oam_with(&[(0, [100, 0, 0, 0])]);
        let mut sprites = SpritePipeline::new();
        assert!(!sprites.evaluate(&oam, 108, 8));
        assert_eq!(sprites.count(), 0);
        sprites.evaluate(&oam, 108, 16);
        assert_eq!(sprites.count(), 1);
        sprites.evaluate(&oam, 99, 16);
        assert_eq!(sprites.count(), 0);
    }

    #[test]
    fn delay_then_shift_out() {
        let oam = oam_with(&[(0, [0, 0, SpriteAttributes::FLIP_HORIZONTAL.bits(), 2])]);
        let mut sprites = SpritePipeline::new();
        sprites.evaluate(&oam, 0, 8);
        sprites.load_pattern(0, 0b0000_0001, 0b0000_0000);

        // X = 2: two dots of delay before output.
        assert_eq!(sprites.sample(), None);
        sprites.shift();
        sprites.shift();
        let pixel = sprites.sample().expect("opaque after delay");
        assert_eq!(pixel.pixel, 1);
        assert!(pixel.slot_zero);
        sprites.shift();
        assert_eq!(sprites.sample(), None);
    }

    #[test]
    fn lowest_slot_wins() {
        let oam = oam_with(&[(0, [0, 0, 0, 0]), (1, [0, 0, 0b0010_0011, 0])]);
        let mut sprites = SpritePipeline::new();
        sprites.evaluate(&oam, 0, 8);
        sprites.load_pattern(0, 0x00, 0x00);
        sprites.load_pattern(1, 0x80, 0x80);
        let pixel = sprites.sample().expect("slot 1 is opaque");
        assert_eq!(pixel.pixel, 3);
        assert_eq!(pixel.palette, 3);
        assert!(!pixel.in_front);
        assert!(!pixel.slot_zero);

        sprites.load_pattern(0, 0x80, 0x00);
        assert!(sprites.sample().expect("slot 0").slot_zero);
    }

    #[test]
    fn shift_only_advances_occupied_slots() {
        let oam = oam_with(&[(0, [0, 0, 0, 1])]);
        let mut sprites = SpritePipeline::new();
        sprites.evaluate(&oam, 0, 8);
        sprites.load_pattern(0, 0xC0, 0x00);
        for _ in 0..2 {
            sprites.shift();
        }
        assert_eq!(sprites.slots()[0].x_counter, 0);
        assert_eq!(sprites.slots()[0].pattern_low, 0x80);
        assert!(sprites.slots()[1..].iter().all(|slot| *slot == SpriteSlot::default()));
    }
}

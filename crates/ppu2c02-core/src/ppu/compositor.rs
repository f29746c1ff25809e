//! Background/sprite priority multiplexer.

use super::{registers::Mask, sprite_pipeline::SpritePixel};

/// Offset of the sprite palettes inside palette memory (in 4-entry groups).
const SPRITE_PALETTE_BASE: u8 = 4;

/// Palette group and pixel index chosen for one dot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub(crate) struct Composite {
    /// Palette group, 0..=3 for background, 4..=7 for sprites.
    pub(crate) palette: u8,
    /// Pixel index within the group (0 = backdrop).
    pub(crate) pixel: u8,
}

impl Composite {
    /// Palette memory address of the resolved color.
    pub(crate) fn palette_addr(self) -> u16 {
        crate::memory::PALETTE_BASE + (u16::from(self.palette) << 2) + u16::from(self.pixel)
    }
}

/// Merges the background and sprite layers for one dot.
///
/// `background` is `(palette, pixel)`; `sprite` is `None` when no slot
/// produced an opaque pixel.
pub(crate) fn compose(background: (u8, u8), sprite: Option<SpritePixel>) -> Composite {
    let (bg_palette, bg_pixel) = background;
    let bg = Composite {
        palette: bg_palette,
        pixel: bg_pixel,
    };
    match sprite {
        None => bg,
        Some(fg) if bg_pixel == 0 || fg.in_front => Composite {
            palette: fg.palette + SPRITE_PALETTE_BASE,
            pixel: fg.pixel,
        },
        Some(_) => bg,
    }
}

/// Dot range, as `start..end`, in which a sprite-zero hit may register.
pub(crate) fn sprite_zero_window(mask: Mask) -> core::ops::Range<u16> {
    if mask.show_background_left() || mask.show_sprites_left() {
        1..258
    } else {
        9..258
    }
}

/// Sprite-zero hit test: slot 0 and the background are both opaque on a dot
/// inside the hit window, with both layers enabled.
pub(crate) fn sprite_zero_hit(
    mask: Mask,
    dot: u16,
    bg_pixel: u8,
    sprite: Option<SpritePixel>,
    sprite0_possible: bool,
) -> bool {
    let Some(fg) = sprite else {
        return false;
    };
    fg.slot_zero
        && sprite0_possible
        && bg_pixel != 0
        && mask.show_background()
        && mask.show_sprites()
        && sprite_zero_window(mask).contains(&dot)
}

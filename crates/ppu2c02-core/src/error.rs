use thiserror::Error;

use crate::ppu::palette::PALETTE_FILE_LEN;

/// Errors raised at the fallible edges of the core.
///
/// Port accesses and ticks never fail: every address is masked into range
/// before decode. Only palette loading and savestate decoding can reject input.
#[derive(Debug, Error)]
pub enum Error {
    /// Raw palette data did not contain exactly 64 RGB triplets.
    #[error("palette data expected {PALETTE_FILE_LEN} bytes, got {actual}")]
    PaletteLength { actual: usize },

    /// A snapshot was produced by an incompatible layout.
    #[error("savestate format version {found} is not supported (expected {expected})")]
    SavestateVersion { expected: u32, found: u32 },

    /// The binary snapshot could not be encoded or decoded.
    #[cfg(feature = "savestate-postcard")]
    #[error("savestate encoding failed: {0}")]
    Savestate(#[from] postcard::Error),
}

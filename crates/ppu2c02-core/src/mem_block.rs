//! Fixed-size memory blocks backing the PPU's internal RAMs.
//!
//! With the `boxed-memblock` feature the storage lives on the heap, which keeps
//! the `Ppu` struct small on targets with tight stacks.

use core::ops::{Deref, DerefMut};

use crate::memory;

#[cfg(feature = "boxed-memblock")]
type Storage<T, const N: usize> = Box<[T; N]>;

#[cfg(not(feature = "boxed-memblock"))]
type Storage<T, const N: usize> = [T; N];

#[repr(transparent)]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemBlock<T, const N: usize>(Storage<T, N>);

/// One 1 KiB nametable bank.
pub type NametableBank = MemBlock<u8, { memory::NAMETABLE_SIZE }>;
/// One 4 KiB internal pattern bank.
pub type PatternBank = MemBlock<u8, { memory::PATTERN_TABLE_SIZE }>;
/// 32-byte palette memory.
pub type PaletteRam = MemBlock<u8, { memory::PALETTE_RAM_SIZE }>;
/// 256-byte sprite attribute table.
pub type OamRam = MemBlock<u8, { memory::OAM_RAM_SIZE }>;

impl<T: Copy + Default, const N: usize> MemBlock<T, N> {
    pub fn new() -> Self {
        Self::filled(T::default())
    }
}

impl<T: Copy, const N: usize> MemBlock<T, N> {
    /// Create a `MemBlock` where every element is initialized to `value`.
    #[cfg(feature = "boxed-memblock")]
    #[inline]
    pub fn filled(value: T) -> Self {
        Self(Box::new([value; N]))
    }

    /// Create a `MemBlock` where every element is initialized to `value`.
    #[cfg(not(feature = "boxed-memblock"))]
    #[inline]
    pub fn filled(value: T) -> Self {
        Self([value; N])
    }
}

impl<T, const N: usize> MemBlock<T, N> {
    #[inline]
    pub fn as_slice(&self) -> &[T] {
        &self.0[..]
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.0[..]
    }
}

impl<T: Copy + Default, const N: usize> Default for MemBlock<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Deref for MemBlock<T, N> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<T, const N: usize> DerefMut for MemBlock<T, N> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.as_mut_slice()
    }
}

#[cfg(not(feature = "boxed-memblock"))]
impl<T: Copy, const N: usize> Copy for MemBlock<T, N> {}

// serde only derives arrays up to 32 elements, so blocks go through a sequence.
#[cfg(feature = "savestate-serde")]
impl<T, const N: usize> serde::Serialize for MemBlock<T, N>
where
    T: serde::Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(N))?;
        for item in self.as_slice() {
            seq.serialize_element(item)?;
        }
        seq.end()
    }
}

#[cfg(feature = "savestate-serde")]
impl<'de, T, const N: usize> serde::Deserialize<'de> for MemBlock<T, N>
where
    T: Copy + Default + serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor<T, const N: usize>(core::marker::PhantomData<T>);

        impl<'de, T, const N: usize> serde::de::Visitor<'de> for Visitor<T, N>
        where
            T: Copy + Default + serde::Deserialize<'de>,
        {
            type Value = MemBlock<T, N>;

            fn expecting(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "a sequence of length {N}")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = MemBlock::<T, N>::new();
                for idx in 0..N {
                    let Some(value) = seq.next_element::<T>()? else {
                        return Err(serde::de::Error::invalid_length(idx, &self));
                    };
                    out[idx] = value;
                }
                Ok(out)
            }
        }

        deserializer.deserialize_seq(Visitor::<T, N>(core::marker::PhantomData))
    }
}

//! Block size shared by the checksum producer and the sync engine.
//!
//! Fast checksums are only comparable between blocks of the same length, so
//! both sides of a synchronization must agree on one [`BlockSize`]. It is an
//! ordinary value passed to whoever needs it; nothing in the workspace reads
//! it from global state.

use std::fmt;
use std::num::NonZeroU32;

use thiserror::Error;

/// Default block length: 6 KiB.
pub const DEFAULT_BLOCK_SIZE: u32 = 6 * 1024;

/// Largest block length accepted by [`BlockSize::new`] (128 KiB).
pub const MAX_BLOCK_SIZE: u32 = 1 << 17;

/// Smallest block length chosen by [`BlockSize::for_file_len`].
pub const MIN_DERIVED_BLOCK_SIZE: u32 = 700;

/// Error returned when a block size is zero or exceeds [`MAX_BLOCK_SIZE`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
#[error("block size {0} is outside the supported range 1..={MAX_BLOCK_SIZE}")]
pub struct InvalidBlockSize(pub u32);

/// Length of one block in bytes; the last block of a file may be shorter.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u32", into = "u32"))]
pub struct BlockSize(NonZeroU32);

impl BlockSize {
    /// The default block size, [`DEFAULT_BLOCK_SIZE`] bytes.
    pub const DEFAULT: Self = match NonZeroU32::new(DEFAULT_BLOCK_SIZE) {
        Some(size) => Self(size),
        None => unreachable!(),
    };

    /// Creates a block size of `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidBlockSize`] if `bytes` is zero or larger than [`MAX_BLOCK_SIZE`].
    pub const fn new(bytes: u32) -> Result<Self, InvalidBlockSize> {
        if bytes > MAX_BLOCK_SIZE {
            return Err(InvalidBlockSize(bytes));
        }
        match NonZeroU32::new(bytes) {
            Some(size) => Ok(Self(size)),
            None => Err(InvalidBlockSize(bytes)),
        }
    }

    /// Picks a block size close to the square root of `file_len`.
    ///
    /// Files up to 700² bytes use [`MIN_DERIVED_BLOCK_SIZE`]; larger files get
    /// the largest multiple of 8 whose square does not exceed the length,
    /// capped at [`MAX_BLOCK_SIZE`].
    #[must_use]
    pub fn for_file_len(file_len: u64) -> Self {
        let floor = u64::from(MIN_DERIVED_BLOCK_SIZE);
        if file_len <= floor * floor {
            return Self::clamped(MIN_DERIVED_BLOCK_SIZE);
        }

        // Power of two bounding the square root from above.
        let mut c: u64 = 1;
        let mut l = file_len;
        while l >> 2 != 0 {
            c <<= 1;
            l >>= 2;
        }

        if c >= u64::from(MAX_BLOCK_SIZE) {
            return Self::clamped(MAX_BLOCK_SIZE);
        }

        let mut block_len = 0u64;
        let mut current = c;
        while current >= 8 {
            block_len |= current;
            let candidate = u128::from(block_len);
            if u128::from(file_len) < candidate * candidate {
                block_len &= !current;
            }
            current >>= 1;
        }

        Self::clamped(block_len.max(floor) as u32)
    }

    fn clamped(bytes: u32) -> Self {
        Self::new(bytes.clamp(1, MAX_BLOCK_SIZE)).unwrap_or(Self::DEFAULT)
    }

    /// Returns the size in bytes.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns the size in bytes as a buffer length.
    #[inline]
    #[must_use]
    pub const fn as_usize(self) -> usize {
        self.0.get() as usize
    }

    /// Byte offset at which block `ordinal` starts.
    #[inline]
    #[must_use]
    pub const fn offset_of(self, ordinal: u64) -> u64 {
        ordinal.saturating_mul(self.0.get() as u64)
    }

    /// Number of blocks a file of `file_len` bytes is split into.
    #[must_use]
    pub const fn block_count(self, file_len: u64) -> u64 {
        file_len.div_ceil(self.0.get() as u64)
    }
}

impl Default for BlockSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<u32> for BlockSize {
    type Error = InvalidBlockSize;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<BlockSize> for u32 {
    fn from(value: BlockSize) -> Self {
        value.get()
    }
}

impl fmt::Display for BlockSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} bytes", self.get())
    }
}

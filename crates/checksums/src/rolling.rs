//! Fast checksum used to prune candidate blocks.
//!
//! Two 16-bit sums over the block: `a` is the sum of the bytes and `b` the
//! sum of the running values of `a`. Both wrap, so the pair packs into a
//! `u32` as `b << 16 | a`. Transposed bytes change `b`, but distinct blocks
//! still collide often, and a hit is only a hint until a strong digest
//! confirms it.
//!
//! ```rust
//! use checksums::{RollingChecksum, fast_checksum};
//!
//! let mut sum = RollingChecksum::new();
//! sum.update(b"hel");
//! sum.update(b"lo");
//! assert_eq!(sum.value(), fast_checksum(b"hello"));
//! ```

/// Packed fast checksum of one block.
///
/// Checksum records store this value and the sync engine computes it for
/// every block it reads; the two must agree bit for bit.
#[inline]
#[must_use]
pub fn fast_checksum(block: &[u8]) -> u32 {
    let mut sum = RollingChecksum::new();
    sum.update(block);
    sum.value()
}

/// Incremental fast checksum, fed one chunk at a time.
#[doc(alias = "rsum")]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct RollingChecksum {
    a: u16,
    b: u16,
}

impl RollingChecksum {
    /// Checksum of the empty block.
    #[must_use]
    pub const fn new() -> Self {
        Self { a: 0, b: 0 }
    }

    /// Appends `bytes` to the checksummed data.
    pub fn update(&mut self, bytes: &[u8]) {
        let (mut a, mut b) = (self.a, self.b);
        for &byte in bytes {
            a = a.wrapping_add(u16::from(byte));
            b = b.wrapping_add(a);
        }
        self.a = a;
        self.b = b;
    }

    /// Packed checksum of everything fed so far.
    #[must_use]
    pub const fn value(&self) -> u32 {
        ((self.b as u32) << 16) | self.a as u32
    }
}

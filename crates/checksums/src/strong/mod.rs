//! Strong digests used to confirm fast-checksum candidates.
//!
//! The matching engine only needs three things from a strong hash: reset it
//! to the empty state, feed it bytes, and extract the digest. [`StrongHasher`]
//! captures that contract. Every RustCrypto hasher implementing
//! [`digest::Digest`] with resettable fixed output gets it for free, so callers
//! can plug in `sha2::Sha256`, `md5::Md5` or their own type.

use std::fmt;
use std::str::FromStr;

use digest::{Digest, FixedOutputReset};
use thiserror::Error;

pub use md5::Md5;
pub use sha1::Sha1;
pub use sha2::{Sha256, Sha512};

/// Incremental strong hash primitive.
///
/// Implementations must be deterministic: the same byte sequence fed after a
/// [`reset`](Self::reset) always yields the same digest.
pub trait StrongHasher: Send {
    /// Returns the hasher to its empty state, discarding any buffered input.
    fn reset(&mut self);

    /// Feeds `data` into the running digest.
    fn update(&mut self, data: &[u8]);

    /// Finalizes the digest of everything fed since the last reset.
    ///
    /// The hasher is left reset afterwards.
    fn digest(&mut self) -> Vec<u8>;

    /// Width of the produced digest in bytes.
    fn digest_len(&self) -> usize;
}

impl<D> StrongHasher for D
where
    D: Digest + FixedOutputReset + Send,
{
    fn reset(&mut self) {
        Digest::reset(self);
    }

    fn update(&mut self, data: &[u8]) {
        Digest::update(self, data);
    }

    fn digest(&mut self) -> Vec<u8> {
        Digest::finalize_reset(self).to_vec()
    }

    fn digest_len(&self) -> usize {
        <D as Digest>::output_size()
    }
}

/// Built-in strong checksum algorithms.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StrongAlgorithm {
    /// MD5. Fast, but only suitable when collisions are not adversarial.
    Md5,
    /// SHA-1.
    Sha1,
    /// SHA-256, the default.
    #[default]
    Sha256,
    /// SHA-512.
    Sha512,
}

impl StrongAlgorithm {
    /// Every built-in algorithm, in ascending digest width.
    pub const ALL: [Self; 4] = [Self::Md5, Self::Sha1, Self::Sha256, Self::Sha512];

    /// Returns the digest width in bytes.
    #[must_use]
    pub const fn digest_len(self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha1 => 20,
            Self::Sha256 => 32,
            Self::Sha512 => 64,
        }
    }

    /// Returns the canonical lowercase name of the algorithm.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha1 => "sha1",
            Self::Sha256 => "sha256",
            Self::Sha512 => "sha512",
        }
    }

    /// Creates a fresh boxed hasher for the algorithm.
    #[must_use]
    pub fn hasher(self) -> Box<dyn StrongHasher> {
        match self {
            Self::Md5 => Box::new(Md5::new()),
            Self::Sha1 => Box::new(Sha1::new()),
            Self::Sha256 => Box::new(Sha256::new()),
            Self::Sha512 => Box::new(Sha512::new()),
        }
    }

    /// Computes the digest of `data` in one shot.
    #[must_use]
    pub fn compute(self, data: &[u8]) -> Vec<u8> {
        match self {
            Self::Md5 => <Md5 as Digest>::digest(data).to_vec(),
            Self::Sha1 => <Sha1 as Digest>::digest(data).to_vec(),
            Self::Sha256 => <Sha256 as Digest>::digest(data).to_vec(),
            Self::Sha512 => <Sha512 as Digest>::digest(data).to_vec(),
        }
    }
}

impl fmt::Display for StrongAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when parsing an unrecognised algorithm name.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
#[error("unknown strong checksum algorithm '{0}'")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for StrongAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "");
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name() == normalized)
            .ok_or_else(|| UnknownAlgorithm(s.to_owned()))
    }
}

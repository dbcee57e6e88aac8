//! Checksum record describing one remote block.

use std::io;

use checksums::{StrongAlgorithm, fast_checksum};
use thiserror::Error;

/// Fast and strong checksums of one block of the remote file.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlockChecksum {
    ordinal: u64,
    fast: u32,
    strong: Vec<u8>,
}

impl BlockChecksum {
    /// Creates a record from precomputed checksums.
    #[must_use]
    pub const fn new(ordinal: u64, fast: u32, strong: Vec<u8>) -> Self {
        Self {
            ordinal,
            fast,
            strong,
        }
    }

    /// Computes both checksums of `block` with the given strong algorithm.
    #[must_use]
    pub fn compute(ordinal: u64, block: &[u8], algorithm: StrongAlgorithm) -> Self {
        Self::new(ordinal, fast_checksum(block), algorithm.compute(block))
    }

    /// Zero-based position of the block in the remote file, in block units.
    #[inline]
    #[must_use]
    pub const fn ordinal(&self) -> u64 {
        self.ordinal
    }

    /// Fast (rolling) checksum of the block.
    #[inline]
    #[must_use]
    pub const fn fast(&self) -> u32 {
        self.fast
    }

    /// Strong digest of the block.
    #[inline]
    #[must_use]
    pub fn strong(&self) -> &[u8] {
        &self.strong
    }
}

/// Why a producer could not deliver a valid record.
#[derive(Debug, Error)]
pub enum RecordFault {
    /// Reading the block from the remote file failed.
    #[error("failed reading block {ordinal} while generating checksums")]
    Read {
        /// Ordinal of the block that could not be read.
        ordinal: u64,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The record arrived but its content is unusable.
    #[error("malformed checksum record: {reason}")]
    Malformed {
        /// Ordinal of the record, when the producer knows it.
        ordinal: Option<u64>,
        /// Human readable description of the problem.
        reason: String,
    },
}

impl RecordFault {
    /// Creates a [`RecordFault::Malformed`] fault.
    pub fn malformed(ordinal: Option<u64>, reason: impl Into<String>) -> Self {
        Self::Malformed {
            ordinal,
            reason: reason.into(),
        }
    }

    /// Ordinal of the faulty record, if known.
    #[must_use]
    pub const fn ordinal(&self) -> Option<u64> {
        match self {
            Self::Read { ordinal, .. } => Some(*ordinal),
            Self::Malformed { ordinal, .. } => *ordinal,
        }
    }
}

/// One item of a checksum sequence: a valid record or a fault marker.
///
/// A fault does not end the sequence; consumers skip it and keep reading.
pub type ChecksumRecord = Result<BlockChecksum, RecordFault>;

//! Error types for index construction, synchronization and reconstruction.

use std::io;

use thiserror::Error;

use crate::index::BlockIndex;

/// Cooperative cancellation was observed.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Error)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Errors returned by [`build_index`](crate::build_index).
#[derive(Debug, Error)]
pub enum IndexBuildError {
    /// Cancellation was observed before the input was exhausted.
    ///
    /// The records processed up to that point are kept in `partial`.
    #[error("failed building lookup table after {processed} records")]
    Cancelled {
        /// Index holding every valid record consumed before cancellation.
        partial: BlockIndex,
        /// Number of records consumed, faulty ones included.
        processed: u64,
        /// The cancellation itself.
        #[source]
        source: Cancelled,
    },
}

impl IndexBuildError {
    /// Returns the partial index built before the error.
    #[must_use]
    pub fn partial(&self) -> &BlockIndex {
        match self {
            Self::Cancelled { partial, .. } => partial,
        }
    }

    /// Consumes the error, returning the partial index.
    #[must_use]
    pub fn into_partial(self) -> BlockIndex {
        match self {
            Self::Cancelled { partial, .. } => partial,
        }
    }
}

/// Errors raised by the sync engine.
///
/// [`MissingSource`](Self::MissingSource) and [`NoRuntime`](Self::NoRuntime)
/// are returned synchronously by [`SyncEngine::start`](crate::SyncEngine::start);
/// the other variants travel inside a trailing
/// [`BlockOperation::Fault`](crate::BlockOperation::Fault).
#[derive(Debug, Error)]
pub enum SyncError {
    /// No source stream was supplied.
    #[error("sync requires a source reader")]
    MissingSource,
    /// The engine was started outside a tokio runtime.
    #[error("sync engine requires a running tokio runtime")]
    NoRuntime,
    /// The run was cancelled.
    #[error("sync cancelled")]
    Cancelled(#[from] Cancelled),
    /// Reading the local source failed; the run must be restarted from scratch.
    #[error("failed reading block")]
    Read(#[source] io::Error),
}

impl SyncError {
    /// Reports whether this error is a cancellation.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Errors raised while reconstructing a file from an operation stream.
#[derive(Debug, Error)]
pub enum ApplyError {
    /// The stream ended with a fault; partial output must be discarded.
    #[error("operation stream aborted at block {ordinal}")]
    Aborted {
        /// Local ordinal carried by the fault.
        ordinal: u64,
        /// Error reported by the engine.
        #[source]
        source: SyncError,
    },
    /// An unresolved operation carries neither data nor a confirmed remote block.
    #[error(
        "block {ordinal} matched a fast checksum without a strong match and cannot be reconstructed"
    )]
    Unresolved {
        /// Local ordinal of the unresolved block.
        ordinal: u64,
    },
    /// A copy referenced a block beyond the end of the basis file.
    #[error("remote block {ordinal} is beyond the end of the basis file")]
    MissingRemoteBlock {
        /// Remote ordinal that could not be read.
        ordinal: u64,
    },
    /// Reading the basis or writing the output failed.
    #[error("reconstruction I/O failed: {0}")]
    Io(#[from] io::Error),
}

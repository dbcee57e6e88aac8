//! Instructions emitted by the sync engine, one per local block.

use crate::error::SyncError;

/// Classification of one local block against the remote index.
///
/// Operations are emitted in local block order. `Copy` carries the ordinal of
/// the matching *remote* block; every other variant carries the *local*
/// ordinal of the block it describes.
#[derive(Debug)]
pub enum BlockOperation {
    /// The local block equals remote block `ordinal`; the receiver already has it.
    Copy {
        /// Remote ordinal of the matching block.
        ordinal: u64,
    },
    /// No remote block has this fast checksum; the bytes travel verbatim.
    Literal {
        /// Local ordinal of the block.
        ordinal: u64,
        /// Block contents, shorter than the block size only for the final block.
        data: Vec<u8>,
    },
    /// A fast checksum hit without any strong match; no data is attached.
    Unresolved {
        /// Local ordinal of the block.
        ordinal: u64,
    },
    /// The run stopped; this is always the last operation of a stream.
    Fault {
        /// Local ordinal the engine was about to process.
        ordinal: u64,
        /// Why the run stopped.
        error: SyncError,
    },
}

impl BlockOperation {
    /// Ordinal carried by the operation. Remote for `Copy`, local otherwise.
    #[must_use]
    pub const fn ordinal(&self) -> u64 {
        match self {
            Self::Copy { ordinal }
            | Self::Literal { ordinal, .. }
            | Self::Unresolved { ordinal }
            | Self::Fault { ordinal, .. } => *ordinal,
        }
    }

    /// Literal bytes, if any.
    #[must_use]
    pub fn data(&self) -> Option<&[u8]> {
        match self {
            Self::Literal { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Error carried by a fault.
    #[must_use]
    pub const fn fault(&self) -> Option<&SyncError> {
        match self {
            Self::Fault { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Reports whether this is a [`BlockOperation::Copy`].
    #[must_use]
    pub const fn is_copy(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }

    /// Reports whether this is a [`BlockOperation::Literal`].
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal { .. })
    }

    /// Reports whether this is a [`BlockOperation::Unresolved`].
    #[must_use]
    pub const fn is_unresolved(&self) -> bool {
        matches!(self, Self::Unresolved { .. })
    }

    /// Reports whether this is a [`BlockOperation::Fault`].
    #[must_use]
    pub const fn is_fault(&self) -> bool {
        matches!(self, Self::Fault { .. })
    }
}

impl PartialEq for BlockOperation {
    /// Faults compare equal when their ordinals and error kinds match.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Copy { ordinal: a }, Self::Copy { ordinal: b })
            | (Self::Unresolved { ordinal: a }, Self::Unresolved { ordinal: b }) => a == b,
            (
                Self::Literal {
                    ordinal: a,
                    data: da,
                },
                Self::Literal {
                    ordinal: b,
                    data: db,
                },
            ) => a == b && da == db,
            (
                Self::Fault {
                    ordinal: a,
                    error: ea,
                },
                Self::Fault {
                    ordinal: b,
                    error: eb,
                },
            ) => a == b && std::mem::discriminant(ea) == std::mem::discriminant(eb),
            _ => false,
        }
    }
}

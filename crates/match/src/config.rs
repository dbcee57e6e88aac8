//! Sync engine configuration.

use std::num::NonZeroUsize;

use signature::BlockSize;

/// Default bound of the channel between engine and consumer.
///
/// One slot keeps the engine at most one block ahead of its consumer.
pub const DEFAULT_OPERATION_CHANNEL_CAPACITY: usize = 1;

/// What the engine emits when a block's fast checksum is in the index but no
/// candidate's strong digest matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StrongMissPolicy {
    /// Emit [`BlockOperation::Unresolved`](crate::BlockOperation::Unresolved):
    /// the local ordinal with no data. The block's bytes are not transferred.
    Unresolved,
    /// Emit a literal carrying the block's bytes.
    Literal,
}

impl Default for StrongMissPolicy {
    fn default() -> Self {
        if cfg!(feature = "literal-fallback") {
            Self::Literal
        } else {
            Self::Unresolved
        }
    }
}

/// Settings for one [`SyncEngine`](crate::SyncEngine) run.
///
/// `block_size` must equal the block size used to produce the remote
/// checksums, otherwise no block will ever match.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SyncConfig {
    /// Length of each local block read.
    pub block_size: BlockSize,
    /// Bound of the operation channel.
    pub channel_capacity: NonZeroUsize,
    /// Behaviour on a fast hit without a strong match.
    pub strong_miss: StrongMissPolicy,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            block_size: BlockSize::DEFAULT,
            channel_capacity: NonZeroUsize::new(DEFAULT_OPERATION_CHANNEL_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
            strong_miss: StrongMissPolicy::default(),
        }
    }
}

impl SyncConfig {
    /// Returns the default configuration with `block_size`.
    #[must_use]
    pub fn new(block_size: BlockSize) -> Self {
        Self {
            block_size,
            ..Self::default()
        }
    }

    /// Sets the operation channel bound.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Sets the strong-miss policy.
    #[must_use]
    pub fn with_strong_miss(mut self, policy: StrongMissPolicy) -> Self {
        self.strong_miss = policy;
        self
    }
}

//! crates/match/src/engine.rs
//!
//! Streaming block matcher.
//!
//! [`SyncEngine::start`] spawns one tokio task that reads the local source a
//! block at a time, classifies each block against a shared [`BlockIndex`] and
//! sends one [`BlockOperation`] per block through a bounded channel. The
//! channel is the only flow control: with the default capacity of one the
//! task stays at most one block ahead of the consumer.
//!
//! # Cancellation
//!
//! The token is sampled once per iteration, before the read. A read already in
//! progress is never interrupted. Observing cancellation emits a single
//! [`BlockOperation::Fault`] carrying [`SyncError::Cancelled`] and closes the
//! stream. Dropping or closing the [`OperationStream`] stops the task at its
//! next send.

use std::fmt;

use checksums::{StrongAlgorithm, StrongHasher, fast_checksum};
use signature::{BlockSize, fill_block_async};
use tokio::io::AsyncRead;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::{StrongMissPolicy, SyncConfig};
use crate::error::{Cancelled, SyncError};
use crate::index::BlockIndex;
use crate::operation::BlockOperation;

/// Type-erased local source read by the engine task.
pub type BoxedSource = Box<dyn AsyncRead + Send + Unpin>;

/// Builder and entry point for one synchronization run.
///
/// ```no_run
/// # async fn demo(index: matching::BlockIndex) -> Result<(), Box<dyn std::error::Error>> {
/// use matching::{SyncConfig, SyncEngine};
/// use tokio_util::sync::CancellationToken;
///
/// let file = tokio::fs::File::open("local.bin").await?;
/// let mut stream = SyncEngine::new(SyncConfig::default())
///     .with_source(file)
///     .start(index, CancellationToken::new())?;
/// while let Some(op) = stream.recv().await {
///     println!("{op:?}");
/// }
/// # Ok(())
/// # }
/// ```
pub struct SyncEngine {
    config: SyncConfig,
    hasher: Option<Box<dyn StrongHasher>>,
    source: Option<BoxedSource>,
}

impl SyncEngine {
    /// Creates an engine with no source and the default strong hasher.
    #[must_use]
    pub fn new(config: SyncConfig) -> Self {
        Self {
            config,
            hasher: None,
            source: None,
        }
    }

    /// Sets the strong hasher used to confirm fast-checksum candidates.
    ///
    /// It must produce the same digests as the one used for the remote
    /// records. SHA-256 is used when none is set.
    #[must_use]
    pub fn with_hasher(mut self, hasher: Box<dyn StrongHasher>) -> Self {
        self.hasher = Some(hasher);
        self
    }

    /// Sets the local byte stream to synchronize.
    #[must_use]
    pub fn with_source<R>(mut self, source: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the engine configuration.
    #[must_use]
    pub const fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Spawns the engine task and returns the stream of its operations.
    ///
    /// # Errors
    ///
    /// - [`SyncError::MissingSource`] if no source was set.
    /// - [`SyncError::NoRuntime`] if called outside a tokio runtime.
    ///
    /// Both are reported before any task is spawned.
    pub fn start(
        self,
        index: BlockIndex,
        cancel: CancellationToken,
    ) -> Result<OperationStream, SyncError> {
        let reader = self.source.ok_or(SyncError::MissingSource)?;
        let handle = Handle::try_current().map_err(|_| SyncError::NoRuntime)?;
        let hasher = self
            .hasher
            .unwrap_or_else(|| StrongAlgorithm::default().hasher());

        let matcher = BlockMatcher::new(index, hasher, self.config.strong_miss);
        let (tx, rx) = mpsc::channel(self.config.channel_capacity.get());
        let task = handle.spawn(run(reader, matcher, self.config.block_size, cancel, tx));
        Ok(OperationStream { rx, task })
    }
}

impl fmt::Debug for SyncEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncEngine")
            .field("config", &self.config)
            .field("has_hasher", &self.hasher.is_some())
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

/// Classifies single blocks against a [`BlockIndex`].
///
/// This is the per-block decision of the engine, usable on its own when the
/// caller already has the blocks in memory.
pub struct BlockMatcher {
    index: BlockIndex,
    hasher: Box<dyn StrongHasher>,
    strong_miss: StrongMissPolicy,
}

impl BlockMatcher {
    /// Creates a matcher over `index`.
    #[must_use]
    pub fn new(
        index: BlockIndex,
        hasher: Box<dyn StrongHasher>,
        strong_miss: StrongMissPolicy,
    ) -> Self {
        Self {
            index,
            hasher,
            strong_miss,
        }
    }

    /// Classifies `block`, the local block at `ordinal`.
    ///
    /// The strong digest is only computed when the fast checksum hits.
    pub fn classify(&mut self, ordinal: u64, block: &[u8]) -> BlockOperation {
        let fast = fast_checksum(block);
        let Some(bucket) = self.index.get(fast) else {
            logging::trace_block!(ordinal, len = block.len(), "literal block");
            return BlockOperation::Literal {
                ordinal,
                data: block.to_vec(),
            };
        };

        self.hasher.reset();
        self.hasher.update(block);
        let strong = self.hasher.digest();

        if let Some(candidate) = bucket.iter().find(|c| c.strong() == strong.as_slice()) {
            logging::trace_block!(ordinal, remote = candidate.ordinal(), "matched block");
            return BlockOperation::Copy {
                ordinal: candidate.ordinal(),
            };
        }

        logging::trace_block!(
            ordinal,
            candidates = bucket.len(),
            "fast checksum hit without strong match"
        );
        match self.strong_miss {
            StrongMissPolicy::Unresolved => BlockOperation::Unresolved { ordinal },
            StrongMissPolicy::Literal => BlockOperation::Literal {
                ordinal,
                data: block.to_vec(),
            },
        }
    }
}

impl fmt::Debug for BlockMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlockMatcher")
            .field("records", &self.index.len())
            .field("strong_miss", &self.strong_miss)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Default)]
struct RunStats {
    copies: u64,
    literals: u64,
    literal_bytes: u64,
    unresolved: u64,
}

impl RunStats {
    fn record(&mut self, op: &BlockOperation) {
        match op {
            BlockOperation::Copy { .. } => self.copies += 1,
            BlockOperation::Literal { data, .. } => {
                self.literals += 1;
                self.literal_bytes += data.len() as u64;
            }
            BlockOperation::Unresolved { .. } => self.unresolved += 1,
            BlockOperation::Fault { .. } => {}
        }
    }
}

#[cfg_attr(
    feature = "tracing",
    instrument(skip_all, name = "sync_engine", fields(block_size = block_size.get()))
)]
async fn run(
    mut reader: BoxedSource,
    mut matcher: BlockMatcher,
    block_size: BlockSize,
    cancel: CancellationToken,
    tx: mpsc::Sender<BlockOperation>,
) {
    let mut buffer = vec![0u8; block_size.as_usize()];
    let mut ordinal = 0u64;
    let mut stats = RunStats::default();

    loop {
        let op = if cancel.is_cancelled() {
            logging::trace_engine!(ordinal, "sync cancelled");
            BlockOperation::Fault {
                ordinal,
                error: SyncError::Cancelled(Cancelled),
            }
        } else {
            match fill_block_async(&mut reader, &mut buffer).await {
                Ok(0) => break,
                Ok(read) => matcher.classify(ordinal, &buffer[..read]),
                Err(err) => {
                    logging::warn_on!(
                        "blocksync::engine",
                        ordinal,
                        error = %err,
                        "failed reading block"
                    );
                    BlockOperation::Fault {
                        ordinal,
                        error: SyncError::Read(err),
                    }
                }
            }
        };

        let terminal = op.is_fault();
        stats.record(&op);
        if tx.send(op).await.is_err() {
            logging::trace_engine!(ordinal, "operation stream closed by consumer");
            return;
        }
        if terminal {
            return;
        }
        ordinal += 1;
    }

    logging::trace_engine!(
        blocks = ordinal,
        copies = stats.copies,
        literals = stats.literals,
        literal_bytes = stats.literal_bytes,
        unresolved = stats.unresolved,
        "sync finished"
    );
}

/// Receiving end of a running [`SyncEngine`].
///
/// Yields operations in local block order. The stream ends when the source is
/// exhausted or right after a [`BlockOperation::Fault`].
#[derive(Debug)]
pub struct OperationStream {
    rx: mpsc::Receiver<BlockOperation>,
    task: JoinHandle<()>,
}

impl OperationStream {
    /// Waits for the next operation; `None` once the stream has ended.
    pub async fn recv(&mut self) -> Option<BlockOperation> {
        self.rx.recv().await
    }

    /// Blocking variant of [`recv`](Self::recv) for synchronous consumers.
    ///
    /// # Panics
    ///
    /// Panics when called from within an async execution context.
    pub fn blocking_recv(&mut self) -> Option<BlockOperation> {
        self.rx.blocking_recv()
    }

    /// Drains the stream into a vector.
    pub async fn collect_all(mut self) -> Vec<BlockOperation> {
        let mut ops = Vec::new();
        while let Some(op) = self.rx.recv().await {
            ops.push(op);
        }
        ops
    }

    /// Stops accepting operations.
    ///
    /// Operations already buffered can still be received; the engine task
    /// stops at its next send.
    pub fn close(&mut self) {
        self.rx.close();
    }

    /// Reports whether the engine task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Closes the stream and waits for the engine task to exit.
    ///
    /// The wait covers a read in progress, so it only returns once that read
    /// completes.
    ///
    /// # Errors
    ///
    /// Returns the [`JoinError`] if the task panicked.
    pub async fn close_and_join(mut self) -> Result<(), JoinError> {
        self.close();
        while self.rx.recv().await.is_some() {}
        self.task.await
    }
}

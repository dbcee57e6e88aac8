//! Streaming checksum producer.
//!
//! The producer runs as its own tokio task and hands records to the consumer
//! through a bounded channel, one block at a time. It is the remote-side
//! counterpart of the sync engine: the index builder consumes exactly the
//! channel this module returns.
//!
//! - Records arrive in block order with zero-based ordinals.
//! - A read failure is reported in-band as one `Err(RecordFault::Read)` for
//!   the failing ordinal; the producer stops afterwards.
//! - Cancellation is checked before every read and ends the sequence
//!   without any further record.

use std::num::NonZeroUsize;

use checksums::StrongAlgorithm;
use tokio::io::AsyncRead;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::block::{BlockChecksum, ChecksumRecord, RecordFault};
use crate::block_size::BlockSize;
use crate::generation::SignatureError;
use crate::reader::fill_block_async;

/// Default number of records buffered between producer and consumer.
pub const DEFAULT_RECORD_CHANNEL_CAPACITY: usize = 64;

/// Settings for [`spawn_checksum_producer`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ProducerConfig {
    /// Length of each block.
    pub block_size: BlockSize,
    /// Strong digest applied to every block.
    pub algorithm: StrongAlgorithm,
    /// Bound of the record channel.
    pub channel_capacity: NonZeroUsize,
}

impl Default for ProducerConfig {
    fn default() -> Self {
        Self {
            block_size: BlockSize::DEFAULT,
            algorithm: StrongAlgorithm::default(),
            channel_capacity: NonZeroUsize::new(DEFAULT_RECORD_CHANNEL_CAPACITY)
                .unwrap_or(NonZeroUsize::MIN),
        }
    }
}

impl ProducerConfig {
    /// Sets the block size.
    #[must_use]
    pub fn with_block_size(mut self, block_size: BlockSize) -> Self {
        self.block_size = block_size;
        self
    }

    /// Sets the strong digest algorithm.
    #[must_use]
    pub fn with_algorithm(mut self, algorithm: StrongAlgorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Sets the channel bound.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: NonZeroUsize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

/// Spawns a task streaming the block checksums of `reader`.
///
/// The returned receiver closes once the input is exhausted, a read fails,
/// `cancel` fires, or the receiver itself is dropped.
///
/// # Errors
///
/// Returns [`SignatureError::NoRuntime`] when called outside a tokio runtime.
pub fn spawn_checksum_producer<R>(
    reader: R,
    config: ProducerConfig,
    cancel: CancellationToken,
) -> Result<mpsc::Receiver<ChecksumRecord>, SignatureError>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let handle = Handle::try_current().map_err(|_| SignatureError::NoRuntime)?;
    let (tx, rx) = mpsc::channel(config.channel_capacity.get());
    handle.spawn(produce(reader, config, cancel, tx));
    Ok(rx)
}

async fn produce<R>(
    mut reader: R,
    config: ProducerConfig,
    cancel: CancellationToken,
    tx: mpsc::Sender<ChecksumRecord>,
) where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; config.block_size.as_usize()];
    let mut ordinal = 0u64;

    loop {
        if cancel.is_cancelled() {
            logging::trace_signature!(ordinal, "checksum production cancelled");
            return;
        }

        let record = match fill_block_async(&mut reader, &mut buffer).await {
            Ok(0) => break,
            Ok(read) => Ok(BlockChecksum::compute(ordinal, &buffer[..read], config.algorithm)),
            Err(source) => Err(RecordFault::Read { ordinal, source }),
        };

        let failed = record.is_err();
        if tx.send(record).await.is_err() || failed {
            return;
        }
        ordinal += 1;
    }

    logging::trace_signature!(blocks = ordinal, "checksum production finished");
}

//! Rebuilds a file from an operation stream and the receiver's basis copy.
//!
//! The basis is the file the remote checksums were computed from. A copy
//! operation names a remote block, which is read from the basis at
//! `ordinal * block_size`; a literal is written verbatim. Unresolved and fault
//! operations stop reconstruction, and whatever was written so far must be
//! discarded by the caller.

use std::io::SeekFrom;

use signature::{BlockSize, fill_block_async};
use tokio::io::{AsyncRead, AsyncSeek, AsyncSeekExt, AsyncWrite, AsyncWriteExt};
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::engine::OperationStream;
use crate::error::ApplyError;
use crate::operation::BlockOperation;

/// Byte counts of one reconstruction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ApplyStats {
    /// Operations applied.
    pub operations: u64,
    /// Bytes written from literal operations.
    pub literal_bytes: u64,
    /// Bytes copied from the basis.
    pub copied_bytes: u64,
}

impl ApplyStats {
    /// Total bytes written to the output.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.literal_bytes + self.copied_bytes
    }
}

/// Applies operations one at a time.
#[derive(Debug)]
pub struct Applier<B, W> {
    basis: B,
    output: W,
    block_size: BlockSize,
    buffer: Vec<u8>,
    stats: ApplyStats,
}

impl<B, W> Applier<B, W>
where
    B: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates an applier reading remote blocks of `block_size` from `basis`.
    #[must_use]
    pub fn new(basis: B, output: W, block_size: BlockSize) -> Self {
        Self {
            basis,
            output,
            block_size,
            buffer: vec![0u8; block_size.as_usize()],
            stats: ApplyStats::default(),
        }
    }

    /// Applies one operation.
    ///
    /// # Errors
    ///
    /// - [`ApplyError::Unresolved`] for an unresolved operation.
    /// - [`ApplyError::Aborted`] for a fault, carrying the engine's error.
    /// - [`ApplyError::MissingRemoteBlock`] when a copy points past the basis.
    /// - [`ApplyError::Io`] when the basis or the output fails.
    pub async fn apply(&mut self, op: BlockOperation) -> Result<(), ApplyError> {
        match op {
            BlockOperation::Literal { data, .. } => {
                self.output.write_all(&data).await?;
                self.stats.literal_bytes += data.len() as u64;
            }
            BlockOperation::Copy { ordinal } => {
                let offset = self.block_size.offset_of(ordinal);
                self.basis.seek(SeekFrom::Start(offset)).await?;
                let read = fill_block_async(&mut self.basis, &mut self.buffer).await?;
                if read == 0 {
                    return Err(ApplyError::MissingRemoteBlock { ordinal });
                }
                self.output.write_all(&self.buffer[..read]).await?;
                self.stats.copied_bytes += read as u64;
            }
            BlockOperation::Unresolved { ordinal } => {
                return Err(ApplyError::Unresolved { ordinal });
            }
            BlockOperation::Fault { ordinal, error } => {
                logging::warn_on!(
                    "blocksync::apply",
                    ordinal,
                    error = %error,
                    "operation stream aborted"
                );
                return Err(ApplyError::Aborted {
                    ordinal,
                    source: error,
                });
            }
        }
        self.stats.operations += 1;
        Ok(())
    }

    /// Counts so far.
    #[must_use]
    pub const fn stats(&self) -> ApplyStats {
        self.stats
    }

    /// Flushes the output and returns the final counts.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Io`] if flushing fails.
    pub async fn finish(mut self) -> Result<ApplyStats, ApplyError> {
        self.output.flush().await?;
        logging::trace_apply!(
            operations = self.stats.operations,
            literal_bytes = self.stats.literal_bytes,
            copied_bytes = self.stats.copied_bytes,
            "reconstruction finished"
        );
        Ok(self.stats)
    }
}

/// Drains `stream`, writing the reconstructed file to `output`.
///
/// Stops at the first operation that cannot be applied; the stream is dropped
/// on return, which stops the engine.
///
/// # Errors
///
/// See [`Applier::apply`] and [`Applier::finish`].
#[cfg_attr(feature = "tracing", instrument(skip_all, name = "apply_operations"))]
pub async fn apply_operations<B, W>(
    mut stream: OperationStream,
    basis: B,
    output: W,
    block_size: BlockSize,
) -> Result<ApplyStats, ApplyError>
where
    B: AsyncRead + AsyncSeek + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut applier = Applier::new(basis, output, block_size);
    while let Some(op) = stream.recv().await {
        applier.apply(op).await?;
    }
    applier.finish().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    use crate::error::{Cancelled, SyncError};

    fn size(bytes: u32) -> BlockSize {
        BlockSize::new(bytes).expect("valid block size")
    }

    async fn apply_all(
        basis: &[u8],
        ops: Vec<BlockOperation>,
        bytes: u32,
    ) -> (Result<ApplyStats, ApplyError>, Vec<u8>) {
        let mut output = Vec::new();
        let mut applier = Applier::new(Cursor::new(basis.to_vec()), &mut output, size(bytes));
        let mut result = Ok(());
        for op in ops {
            result = applier.apply(op).await;
            if result.is_err() {
                break;
            }
        }
        let result = match result {
            Ok(()) => applier.finish().await,
            Err(err) => Err(err),
        };
        (result, output)
    }

    #[tokio::test]
    async fn copies_and_literals_interleave() {
        let ops = vec![
            BlockOperation::Copy { ordinal: 1 },
            BlockOperation::Literal {
                ordinal: 1,
                data: b"new!".to_vec(),
            },
            BlockOperation::Copy { ordinal: 2 },
            BlockOperation::Copy { ordinal: 0 },
        ];
        let (stats, output) = apply_all(b"aaaabbbbcc", ops, 4).await;

        assert_eq!(output, b"bbbbnew!ccaaaa");
        let stats = stats.expect("applied");
        assert_eq!(stats.operations, 4);
        assert_eq!(stats.literal_bytes, 4);
        assert_eq!(stats.copied_bytes, 10);
        assert_eq!(stats.total_bytes(), 14);
    }

    #[tokio::test]
    async fn unresolved_cannot_be_applied() {
        let ops = vec![
            BlockOperation::Copy { ordinal: 0 },
            BlockOperation::Unresolved { ordinal: 1 },
        ];
        let (result, output) = apply_all(b"aaaa", ops, 4).await;
        assert!(matches!(result, Err(ApplyError::Unresolved { ordinal: 1 })));
        assert_eq!(output, b"aaaa");
    }

    #[tokio::test]
    async fn fault_aborts_with_engine_error() {
        let ops = vec![BlockOperation::Fault {
            ordinal: 5,
            error: SyncError::Cancelled(Cancelled),
        }];
        let (result, _) = apply_all(b"", ops, 4).await;
        match result {
            Err(ApplyError::Aborted { ordinal, source }) => {
                assert_eq!(ordinal, 5);
                assert!(source.is_cancelled());
            }
            other => panic!("expected abort, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn copy_past_basis_end_is_rejected() {
        let ops = vec![BlockOperation::Copy { ordinal: 3 }];
        let (result, output) = apply_all(b"aaaabbbb", ops, 4).await;
        assert!(matches!(
            result,
            Err(ApplyError::MissingRemoteBlock { ordinal: 3 })
        ));
        assert!(output.is_empty());
    }
}

//! Checksum generation for a complete remote file.

use std::io::{self, Read};

use checksums::StrongAlgorithm;
use thiserror::Error;
#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::block::BlockChecksum;
use crate::block_size::BlockSize;
use crate::reader::fill_block;

/// Errors returned when generating block checksums.
#[derive(Debug, Error)]
pub enum SignatureError {
    /// Underlying I/O failure raised while reading file contents.
    #[error("failed to read input while generating checksums: {0}")]
    Io(
        #[from]
        #[source]
        io::Error,
    ),
    /// The producer task was requested outside of a tokio runtime.
    #[error("checksum producer requires a running tokio runtime")]
    NoRuntime,
}

/// Splits `reader` into `block_size` blocks and checksums each one.
///
/// Records are returned in block order with zero-based ordinals. The last
/// block may be shorter than `block_size`; an empty input yields no records.
///
/// # Errors
///
/// Propagates any I/O error surfaced by the reader.
#[cfg_attr(
    feature = "tracing",
    instrument(skip(reader), fields(block_size = block_size.get()), name = "block_checksums")
)]
pub fn block_checksums<R: Read>(
    mut reader: R,
    block_size: BlockSize,
    algorithm: StrongAlgorithm,
) -> Result<Vec<BlockChecksum>, SignatureError> {
    let mut buffer = vec![0u8; block_size.as_usize()];
    let mut records = Vec::new();
    let mut ordinal = 0u64;

    loop {
        let read = fill_block(&mut reader, &mut buffer)?;
        if read == 0 {
            break;
        }
        records.push(BlockChecksum::compute(ordinal, &buffer[..read], algorithm));
        ordinal += 1;
    }

    logging::trace_signature!(blocks = records.len(), %algorithm, "checksums generated");
    Ok(records)
}

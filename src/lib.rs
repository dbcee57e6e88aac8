#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `blocksync` is the facade over the workspace crates that make up a one-way
//! block-level synchronization core:
//!
//! - [`checksums`]: fast rolling checksum and strong digests
//! - [`signature`]: block checksum records and their producers
//! - [`matching`]: the checksum index, the streaming sync engine and the
//!   reconstructor
//! - [`logging`]: diagnostic sinks and `tracing` setup
//!
//! # Flow
//!
//! 1. The side holding the basis file streams [`BlockChecksum`] records, e.g.
//!    with [`spawn_checksum_producer`].
//! 2. [`build_index`] collects them into a read-only [`BlockIndex`].
//! 3. [`SyncEngine`] reads the local file and emits one [`BlockOperation`] per
//!    block: copy a remote block, send literal bytes, or report a fault.
//! 4. [`apply_operations`] rebuilds the local file from the basis and the
//!    operations.
//!
//! # Examples
//!
//! ```
//! use std::io::Cursor;
//!
//! use blocksync::{
//!     BlockSize, CancellationToken, NullSink, ProducerConfig, SyncConfig, SyncEngine,
//!     apply_operations, build_index, spawn_checksum_producer,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let block = BlockSize::new(4).unwrap();
//! let basis = b"aaaabbbbcccc".to_vec();
//! let local = b"ccccXXXXaaaa".to_vec();
//!
//! let cancel = CancellationToken::new();
//! let records = spawn_checksum_producer(
//!     Cursor::new(basis.clone()),
//!     ProducerConfig::default().with_block_size(block),
//!     cancel.clone(),
//! )
//! .unwrap();
//! let index = build_index(records, &cancel, &NullSink).await.unwrap();
//!
//! let stream = SyncEngine::new(SyncConfig::new(block))
//!     .with_source(Cursor::new(local.clone()))
//!     .start(index, cancel)
//!     .unwrap();
//!
//! let mut output = Vec::new();
//! let stats = apply_operations(stream, Cursor::new(basis), &mut output, block)
//!     .await
//!     .unwrap();
//! assert_eq!(output, local);
//! assert_eq!(stats.literal_bytes, 4);
//! # }
//! ```

pub use checksums;
pub use logging;
pub use matching;
pub use signature;

pub use checksums::{StrongAlgorithm, StrongHasher, fast_checksum};
pub use logging::{
    Diagnostic, DiagnosticSink, LoggingConfig, MemorySink, NullSink, Severity, TracingSink,
    init_tracing,
};
pub use matching::{
    ApplyError, ApplyStats, BlockIndex, BlockIndexBuilder, BlockOperation, IndexBuildError,
    OperationStream, StrongMissPolicy, SyncConfig, SyncEngine, SyncError, apply_operations,
    build_index,
};
pub use signature::{
    BlockChecksum, BlockSize, ChecksumRecord, ProducerConfig, RecordFault, block_checksums,
    spawn_checksum_producer,
};
pub use tokio_util::sync::CancellationToken;

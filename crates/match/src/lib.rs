#![deny(unsafe_code)]
#![deny(missing_docs)]

//! Checksum index and streaming block matcher for delta synchronization.
//!
//! This crate is the core of a one-way block-level synchronization:
//! - [`build_index`] turns the remote side's checksum records into a
//!   read-only [`BlockIndex`] keyed by fast checksum
//! - [`SyncEngine`] reads the local file a block at a time and streams one
//!   [`BlockOperation`] per block through an [`OperationStream`]
//! - [`apply_operations`] rebuilds the file from a basis copy and the stream
//!
//! # Design
//!
//! Fast checksums come from the `checksums` crate's rolling checksum and
//! records from the `signature` crate. Blocks are aligned, never rolled byte
//! by byte, so the local file is compared at block boundaries only. A fast
//! checksum hit is confirmed by a strong digest; when several remote blocks
//! share a fast checksum the first strong match in arrival order wins.
//!
//! Both the index build and the engine take a
//! [`CancellationToken`](tokio_util::sync::CancellationToken) and observe it at
//! record or block boundaries.
//!
//! # See also
//!
//! - [`signature`] crate for checksum generation

mod apply;
mod config;
mod engine;
mod error;
mod index;
mod operation;

pub use apply::{Applier, ApplyStats, apply_operations};
pub use config::{DEFAULT_OPERATION_CHANNEL_CAPACITY, StrongMissPolicy, SyncConfig};
pub use engine::{BlockMatcher, BoxedSource, OperationStream, SyncEngine};
pub use error::{ApplyError, Cancelled, IndexBuildError, SyncError};
pub use index::{
    BlockIndex, BlockIndexBuilder, ChecksumSource, INDEX_TARGET, IterSource, build_index,
};
pub use operation::BlockOperation;

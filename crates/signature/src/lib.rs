#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Block checksum records for delta synchronization.
//!
//! The remote side of a synchronization describes its copy of a file as a
//! sequence of [`BlockChecksum`] records, one per [`BlockSize`] block. This
//! crate defines that record type, the in-band [`RecordFault`] marker for
//! records that could not be produced, and two producers:
//!
//! - [`block_checksums`] for a file already at hand;
//! - [`spawn_checksum_producer`] streaming records from an async reader
//!   through a bounded channel, ready to feed the index builder.
//!
//! ```
//! use checksums::StrongAlgorithm;
//! use signature::{BlockSize, block_checksums};
//!
//! let size = BlockSize::new(4).unwrap();
//! let records = block_checksums(&b"abcdefgh"[..], size, StrongAlgorithm::Sha256).unwrap();
//! assert_eq!(records.len(), 2);
//! assert_eq!(records[1].ordinal(), 1);
//! ```

mod block;
pub mod block_size;
mod generation;
mod producer;
mod reader;

pub use block::{BlockChecksum, ChecksumRecord, RecordFault};
pub use block_size::{BlockSize, InvalidBlockSize};
pub use generation::{SignatureError, block_checksums};
pub use producer::{DEFAULT_RECORD_CHANNEL_CAPACITY, ProducerConfig, spawn_checksum_producer};
pub use reader::{fill_block, fill_block_async};

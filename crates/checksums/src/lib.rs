#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! Block checksums for delta synchronization.
//!
//! Two tiers of checksum are used when matching blocks:
//!
//! - the fast [`RollingChecksum`] (packed into a `u32` by [`fast_checksum`])
//!   prunes candidates cheaply but collides often;
//! - a [`StrongHasher`] (SHA-256 by default, see [`StrongAlgorithm`]) confirms
//!   that a candidate really has the same content.

mod rolling;
pub mod strong;

pub use rolling::{RollingChecksum, fast_checksum};
pub use strong::{StrongAlgorithm, StrongHasher, UnknownAlgorithm};

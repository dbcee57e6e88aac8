#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logging` keeps observability out of the core algorithms. Components that
//! need to report something that is not an error (a skipped checksum record,
//! for instance) receive a [`DiagnosticSink`] from their caller instead of
//! printing to the console.
//!
//! # Design
//!
//! - [`Diagnostic`] is a single structured event: a [`Severity`], a static
//!   target naming the subsystem and a rendered message.
//! - [`TracingSink`] forwards diagnostics to the `tracing` ecosystem and is
//!   what production callers normally inject.
//! - [`MemorySink`] collects diagnostics so tests can assert on them.
//! - [`NullSink`] drops everything.
//! - [`init_tracing`] installs a `tracing-subscriber` formatter honouring
//!   `RUST_LOG`.
//!
//! The `trace_*!` macros wrap `tracing` with the workspace's per-subsystem
//! targets, so dependents do not need `tracing` in their own manifests.
//!
//! # Examples
//!
//! ```
//! use logging::{Diagnostic, DiagnosticSink, MemorySink, Severity};
//!
//! let sink = MemorySink::new();
//! sink.record(Diagnostic::warning("blocksync::index", "skipped malformed record"));
//!
//! let events = sink.take();
//! assert_eq!(events.len(), 1);
//! assert_eq!(events[0].severity(), Severity::Warning);
//! ```

mod config;
mod severity;
mod sink;
mod tracing_macros;

pub use config::{LoggingConfig, LoggingInitError, init_tracing};
pub use severity::Severity;
pub use sink::{Diagnostic, DiagnosticSink, MemorySink, NullSink, TracingSink};

#[doc(hidden)]
pub use tracing as __tracing;

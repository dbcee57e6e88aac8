//! Injected diagnostic sinks.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use crate::Severity;

/// A single structured diagnostic event.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    severity: Severity,
    target: &'static str,
    message: String,
}

impl Diagnostic {
    /// Creates a diagnostic with an explicit severity.
    pub fn new(severity: Severity, target: &'static str, message: impl Into<String>) -> Self {
        Self {
            severity,
            target,
            message: message.into(),
        }
    }

    /// Creates a [`Severity::Debug`] diagnostic.
    pub fn debug(target: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Debug, target, message)
    }

    /// Creates a [`Severity::Info`] diagnostic.
    pub fn info(target: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, target, message)
    }

    /// Creates a [`Severity::Warning`] diagnostic.
    pub fn warning(target: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, target, message)
    }

    /// Creates a [`Severity::Error`] diagnostic.
    pub fn error(target: &'static str, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, target, message)
    }

    /// Returns the diagnostic's severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns the subsystem that raised the diagnostic, e.g. `blocksync::index`.
    #[must_use]
    pub const fn target(&self) -> &'static str {
        self.target
    }

    /// Returns the rendered message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.target, self.severity, self.message)
    }
}

/// Destination for diagnostics raised by the core components.
///
/// Sinks are shared by reference across tasks, so implementations must be
/// thread-safe and must not block for long.
pub trait DiagnosticSink: Send + Sync {
    /// Records one diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}

/// Forwards diagnostics to the installed `tracing` subscriber.
///
/// The originating subsystem is attached as the `source` field; all events
/// share the `blocksync::diagnostic` target.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        let source = diagnostic.target;
        let message = diagnostic.message.as_str();
        match diagnostic.severity {
            Severity::Debug => {
                tracing::debug!(target: "blocksync::diagnostic", source, "{message}");
            }
            Severity::Info => {
                tracing::info!(target: "blocksync::diagnostic", source, "{message}");
            }
            Severity::Warning => {
                tracing::warn!(target: "blocksync::diagnostic", source, "{message}");
            }
            Severity::Error => {
                tracing::error!(target: "blocksync::diagnostic", source, "{message}");
            }
        }
    }
}

/// Discards every diagnostic.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl DiagnosticSink for NullSink {
    fn record(&self, _diagnostic: Diagnostic) {}
}

/// Collects diagnostics in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Diagnostic>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the diagnostics recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns the diagnostics recorded so far.
    #[must_use]
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.events.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the number of diagnostics recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Reports whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

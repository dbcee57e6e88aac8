//! Subscriber configuration and installation.

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::Severity;

/// Settings for the process-wide `tracing` subscriber.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LoggingConfig {
    /// Minimum severity emitted when `RUST_LOG` is not set.
    pub level: Severity,
    /// Whether to colourise output.
    pub ansi: bool,
    /// Whether to print each event's target.
    pub show_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Severity::Warning,
            ansi: false,
            show_target: true,
        }
    }
}

impl LoggingConfig {
    /// Returns a configuration emitting events at `level` and above.
    #[must_use]
    pub fn with_level(mut self, level: Severity) -> Self {
        self.level = level;
        self
    }

    /// Builds the filter: `RUST_LOG` wins when present and valid.
    #[must_use]
    pub fn env_filter(&self) -> EnvFilter {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_filter_directive()))
    }
}

/// Error returned when a global subscriber is already installed.
#[derive(Debug, Error)]
#[error("failed to install tracing subscriber: {0}")]
pub struct LoggingInitError(#[source] Box<dyn std::error::Error + Send + Sync + 'static>);

/// Installs a formatting subscriber for the whole process.
///
/// # Errors
///
/// Returns [`LoggingInitError`] if another global subscriber has already been set.
pub fn init_tracing(config: &LoggingConfig) -> Result<(), LoggingInitError> {
    tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_ansi(config.ansi)
        .with_target(config.show_target)
        .try_init()
        .map_err(LoggingInitError)
}

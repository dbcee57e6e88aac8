//! Diagnostic severity levels.

use std::fmt;

use tracing::Level;

/// Importance of a [`Diagnostic`](crate::Diagnostic), ordered from least to most severe.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Severity {
    /// Fine-grained detail useful while debugging.
    Debug,
    /// Normal progress information.
    #[default]
    Info,
    /// Something was skipped or degraded, but processing continued.
    Warning,
    /// An operation failed.
    Error,
}

impl Severity {
    /// Returns the equivalent `tracing` level.
    #[must_use]
    pub const fn as_level(self) -> Level {
        match self {
            Self::Debug => Level::DEBUG,
            Self::Info => Level::INFO,
            Self::Warning => Level::WARN,
            Self::Error => Level::ERROR,
        }
    }

    /// Returns the directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub const fn as_filter_directive(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severities_are_ordered() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn maps_to_tracing_levels() {
        assert_eq!(Severity::Warning.as_level(), Level::WARN);
        assert_eq!(Severity::Debug.as_filter_directive(), "debug");
    }
}

//! Convenience macros for subsystem-specific tracing.
//!
//! These wrap the standard tracing macros with the workspace's targets. They
//! expand through a hidden re-export, so callers only depend on `logging`.

/// Emit a checksum index trace.
///
/// # Example
/// ```ignore
/// trace_index!(records = count, "lookup table built");
/// ```
#[macro_export]
macro_rules! trace_index {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: "blocksync::index", $($arg)*);
    };
}

/// Emit a sync engine trace.
///
/// # Example
/// ```ignore
/// trace_engine!(ordinal, "literal block");
/// ```
#[macro_export]
macro_rules! trace_engine {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: "blocksync::engine", $($arg)*);
    };
}

/// Emit a per-block engine trace, at `trace` level since it fires once per block.
///
/// # Example
/// ```ignore
/// trace_block!(ordinal, len, "read block");
/// ```
#[macro_export]
macro_rules! trace_block {
    ($($arg:tt)*) => {
        $crate::__tracing::trace!(target: "blocksync::engine", $($arg)*);
    };
}

/// Emit a checksum producer trace.
///
/// # Example
/// ```ignore
/// trace_signature!(blocks, "checksums generated");
/// ```
#[macro_export]
macro_rules! trace_signature {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: "blocksync::signature", $($arg)*);
    };
}

/// Emit a reconstruction trace.
///
/// # Example
/// ```ignore
/// trace_apply!(bytes, "copied remote block");
/// ```
#[macro_export]
macro_rules! trace_apply {
    ($($arg:tt)*) => {
        $crate::__tracing::debug!(target: "blocksync::apply", $($arg)*);
    };
}

/// Emit a warning from any subsystem; the target is given explicitly.
///
/// # Example
/// ```ignore
/// warn_on!("blocksync::engine", error = %err, "read failed");
/// ```
#[macro_export]
macro_rules! warn_on {
    ($target:literal, $($arg:tt)*) => {
        $crate::__tracing::warn!(target: $target, $($arg)*);
    };
}

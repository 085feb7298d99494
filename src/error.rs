//! Error types for memshard
//!
//! Table operations never fail: stale writes and unknown keys are reported
//! as data. Errors only arise when building a table from a bad `Config`.

use thiserror::Error;

/// Result type alias using MemShardError
pub type Result<T> = std::result::Result<T, MemShardError>;

/// Unified error type for memshard
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MemShardError {
    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

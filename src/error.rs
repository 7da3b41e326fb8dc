//! Error types for lockfetch
//!
//! Validation and lockfile errors are fatal before any task starts;
//! per-task fetch errors are captured and aggregated by the orchestrator
//! without crashing sibling tasks. Cancellation is never an error.

use std::path::PathBuf;
use thiserror::Error;

use crate::types::PackageSpec;

/// Result type alias for lockfetch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for lockfetch
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "max_concurrent_fetches")
        key: Option<String>,
    },

    /// Lockfile could not be read or parsed
    #[error("lockfile error: {0}")]
    Lockfile(#[from] LockfileError),

    /// A single fetch task failed
    #[error("fetch failed for {spec}: {message}")]
    Fetch {
        /// The package specifier the failed task was fetching
        spec: PackageSpec,
        /// Description of the failure
        message: String,
    },

    /// External fetch tool missing or not executable
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// Destination directory could not be created
    #[error("destination error: {0}")]
    Destination(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A spawned task panicked or was aborted by the runtime
    #[error("task error: {0}")]
    Task(String),
}

/// Lockfile reading and parsing errors
#[derive(Debug, Error)]
pub enum LockfileError {
    /// Failed to read the lockfile from disk
    #[error("failed to read {path}: {source}")]
    Read {
        /// Path to the unreadable lockfile
        path: PathBuf,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// package-lock.json is not valid JSON or has an unexpected shape
    #[error("invalid package-lock.json: {0}")]
    Json(#[source] serde_json::Error),

    /// yarn.lock entry that cannot be interpreted
    #[error("malformed yarn.lock at line {line}: {reason}")]
    Malformed {
        /// 1-based line number of the offending entry
        line: usize,
        /// What was wrong with it
        reason: String,
    },
}

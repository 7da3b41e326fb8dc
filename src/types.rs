//! Core types for lockfetch

use serde::{Deserialize, Serialize};

/// A single fetchable unit from a lockfile.
///
/// Holds an opaque registry specifier, either `name@version` (the usual
/// case for lockfile entries) or a full registry URL. Produced once by a
/// lockfile reader and consumed exactly once by a fetch task.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PackageSpec(String);

impl PackageSpec {
    /// Create a spec from a raw specifier string
    pub fn new(spec: impl Into<String>) -> Self {
        Self(spec.into())
    }

    /// Create a spec from a package name and exact version
    pub fn from_name_version(name: &str, version: &str) -> Self {
        Self(format!("{}@{}", name, version))
    }

    /// Get the raw specifier string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PackageSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PackageSpec {
    fn from(spec: &str) -> Self {
        Self(spec.to_string())
    }
}

impl From<String> for PackageSpec {
    fn from(spec: String) -> Self {
        Self(spec)
    }
}

/// Outcome of one archive fetch
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The child fetch exited with a zero status and wrote its archive
    Completed,
    /// The fetch observed cancellation and stopped; never an error
    Aborted,
    /// The child fetch exited with a non-zero status
    Failed {
        /// Exit code of the child, if it exited normally
        code: Option<i32>,
    },
}

impl FetchOutcome {
    /// Whether this outcome counts toward progress
    pub fn is_completed(&self) -> bool {
        matches!(self, FetchOutcome::Completed)
    }
}

/// Terminal state of a whole run
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    /// Every task finished with a `Completed` outcome
    Completed,
    /// An external interrupt stopped the run
    Interrupted,
    /// At least one task failed and no interrupt was received
    Failed,
}

impl RunStatus {
    /// Process exit code for this terminal state
    ///
    /// 130 for interrupts follows the shell convention for SIGINT
    /// termination; argument errors exit with 2 via clap.
    pub fn exit_code(&self) -> u8 {
        match self {
            RunStatus::Completed => 0,
            RunStatus::Interrupted => 130,
            RunStatus::Failed => 1,
        }
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RunStatus::Completed => "completed",
            RunStatus::Interrupted => "interrupted",
            RunStatus::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Aggregated result of one orchestrator run
#[derive(Clone, Debug)]
pub struct RunReport {
    /// Terminal state the run ended in
    pub status: RunStatus,
    /// Number of tasks that finished with `Completed`
    pub completed: usize,
    /// Number of tasks that observed cancellation and aborted
    pub aborted: usize,
    /// Per-task failures, in completion order
    pub failures: Vec<(PackageSpec, String)>,
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_from_name_version() {
        let spec = PackageSpec::from_name_version("@babel/core", "7.23.0");
        assert_eq!(spec.as_str(), "@babel/core@7.23.0");
        assert_eq!(spec.to_string(), "@babel/core@7.23.0");
    }

    #[test]
    fn test_outcome_completed_flag() {
        assert!(FetchOutcome::Completed.is_completed());
        assert!(!FetchOutcome::Aborted.is_completed());
        assert!(!FetchOutcome::Failed { code: Some(1) }.is_completed());
    }

    #[test]
    fn test_exit_codes_are_distinct() {
        assert_eq!(RunStatus::Completed.exit_code(), 0);
        assert_eq!(RunStatus::Interrupted.exit_code(), 130);
        assert_eq!(RunStatus::Failed.exit_code(), 1);
    }
}

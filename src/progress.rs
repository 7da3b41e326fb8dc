//! Thread-safe progress accounting for completed fetches.

use std::sync::Mutex;

use crate::types::PackageSpec;

/// Shared completion counter.
///
/// One counter is shared by every fetch task in a run. Each successfully
/// completed, non-aborted task calls [`report`](Self::report) exactly
/// once; the counter never decreases and never exceeds the package list
/// length. The increment and read-back happen as one unit under the lock,
/// so no two tasks can observe the same value.
#[derive(Debug, Default)]
pub struct ProgressTracker {
    completed: Mutex<usize>,
}

impl ProgressTracker {
    /// Create a tracker with a zeroed counter
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one completed fetch and log the running percentage.
    ///
    /// Returns the counter value after the increment. The log line is
    /// emitted outside the lock; only the increment + read-back are
    /// serialized.
    pub fn report(&self, spec: &PackageSpec, total: usize) -> usize {
        let value = {
            let mut completed = match self.completed.lock() {
                Ok(guard) => guard,
                // A poisoned counter only means another reporter panicked
                // mid-increment; the value itself is still usable.
                Err(poisoned) => poisoned.into_inner(),
            };
            *completed += 1;
            *completed
        };

        let percent = (value as f64) * 100.0 / (total as f64);
        tracing::info!(
            "{} downloaded ({} / {} - {:.4}% done)",
            spec,
            value,
            total,
            percent
        );

        value
    }

    /// Current counter value
    pub fn completed(&self) -> usize {
        match self.completed.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

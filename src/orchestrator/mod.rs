//! Concurrent fetch orchestration — bounded pool, cancellation, aggregation.
//!
//! The orchestrator submits one task per package specifier to a pool
//! bounded by a semaphore, waits for every task to settle, and folds the
//! per-task outcomes into a single [`RunReport`]. Two cancellation scopes
//! are involved: the external interrupt controller handed in by the
//! caller, and a child scope derived from it that additionally fires on
//! the first task failure so sibling fetches stop early. Draining every
//! join handle keeps the pool from leaking tasks on either path.


use futures::stream::{FuturesUnordered, StreamExt};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::cancel::CancellationController;
use crate::error::Error;
use crate::fetcher::ArchiveFetcher;
use crate::progress::ProgressTracker;
use crate::types::{FetchOutcome, PackageSpec, RunReport, RunStatus};

/// Drives one run over a package list
pub struct Orchestrator {
    fetcher: Arc<dyn ArchiveFetcher>,
    progress: Arc<ProgressTracker>,
    interrupt: CancellationController,
    max_concurrent: usize,
}

impl Orchestrator {
    /// Create an orchestrator.
    ///
    /// `interrupt` is the process-wide cancellation signal; `max_concurrent`
    /// bounds how many fetches run at once (clamped to at least 1).
    pub fn new(
        fetcher: Arc<dyn ArchiveFetcher>,
        interrupt: CancellationController,
        max_concurrent: usize,
    ) -> Self {
        Self {
            fetcher,
            progress: Arc::new(ProgressTracker::new()),
            interrupt,
            max_concurrent: max_concurrent.max(1),
        }
    }

    /// Shared progress tracker for this orchestrator
    pub fn progress(&self) -> Arc<ProgressTracker> {
        Arc::clone(&self.progress)
    }

    /// Fetch every package in `specs` into `dest` and report the outcome.
    ///
    /// Terminal states: `Completed` when every task completed and no
    /// interrupt arrived; `Interrupted` the moment the external signal is
    /// set (failures that also occurred stay listed in the report);
    /// `Failed` when at least one task failed without an interrupt.
    pub async fn run(&self, specs: Vec<PackageSpec>, dest: &Path) -> RunReport {
        let total = specs.len();
        if total == 0 {
            tracing::info!(dest = %dest.display(), "package list is empty, nothing to fetch");
            return RunReport {
                status: RunStatus::Completed,
                completed: 0,
                aborted: 0,
                failures: Vec::new(),
            };
        }

        tracing::info!(
            total,
            concurrency = self.max_concurrent,
            fetcher = self.fetcher.name(),
            dest = %dest.display(),
            "starting fetch run"
        );

        // Fires on external interrupt, or on first failure (fail fast)
        let abort = self.interrupt.child();
        let limiter = Arc::new(Semaphore::new(self.max_concurrent));
        let mut tasks = FuturesUnordered::new();

        for spec in specs {
            let fetcher = Arc::clone(&self.fetcher);
            let progress = Arc::clone(&self.progress);
            let limiter = Arc::clone(&limiter);
            let abort = abort.clone();
            let dest = dest.to_path_buf();

            tasks.push(tokio::spawn(async move {
                // Wait for a pool slot, unless cancellation wins first
                let _permit = tokio::select! {
                    permit = limiter.acquire_owned() => match permit {
                        Ok(permit) => permit,
                        Err(_) => return (spec, Ok(FetchOutcome::Aborted)),
                    },
                    _ = abort.cancelled() => return (spec, Ok(FetchOutcome::Aborted)),
                };

                // Signaled while queued: no new child fetch may start
                if abort.is_signaled() {
                    return (spec, Ok(FetchOutcome::Aborted));
                }

                let outcome = fetcher.fetch(&spec, &dest, &abort).await;
                if matches!(outcome, Ok(FetchOutcome::Completed)) {
                    progress.report(&spec, total);
                }
                (spec, outcome)
            }));
        }

        let mut completed = 0usize;
        let mut aborted = 0usize;
        let mut failures: Vec<(PackageSpec, String)> = Vec::new();

        while let Some(joined) = tasks.next().await {
            match joined {
                Ok((_, Ok(FetchOutcome::Completed))) => completed += 1,
                Ok((_, Ok(FetchOutcome::Aborted))) => aborted += 1,
                Ok((spec, Ok(FetchOutcome::Failed { code }))) => {
                    let message = match code {
                        Some(code) => format!("fetch tool exited with status {}", code),
                        None => "fetch tool terminated by signal".to_string(),
                    };
                    tracing::error!(spec = %spec, %message, "fetch failed");
                    failures.push((spec, message));
                    abort.signal();
                }
                Ok((spec, Err(e))) => {
                    tracing::error!(spec = %spec, error = %e, "fetch task error");
                    failures.push((spec, e.to_string()));
                    abort.signal();
                }
                Err(e) => {
                    let error = Error::Task(e.to_string());
                    tracing::error!(error = %error, "fetch task panicked");
                    failures.push((PackageSpec::new("<task>"), error.to_string()));
                    abort.signal();
                }
            }
        }

        let status = if self.interrupt.is_signaled() {
            RunStatus::Interrupted
        } else if !failures.is_empty() {
            RunStatus::Failed
        } else {
            RunStatus::Completed
        };

        match status {
            RunStatus::Completed => {
                tracing::info!(
                    dest = %dest.display(),
                    completed,
                    "all packages downloaded"
                );
            }
            RunStatus::Interrupted => {
                tracing::warn!(completed, aborted, "download interrupted");
            }
            RunStatus::Failed => {
                tracing::error!(
                    completed,
                    failed = failures.len(),
                    "download failed"
                );
            }
        }

        RunReport {
            status,
            completed,
            aborted,
            failures,
        }
    }
}

//! # lockfetch
//!
//! Bulk package-archive fetcher driven by lockfiles.
//!
//! Given a lockfile enumerating exact package versions, lockfetch
//! downloads each package as a packed archive into a fresh, uniquely
//! named destination directory, in parallel, with live progress
//! reporting and graceful cancellation.
//!
//! ## Quick Start
//!
//! ```no_run
//! use lockfetch::{
//!     CancellationController, CliArchiveFetcher, Config, LockfileFormat, Orchestrator,
//! };
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::default();
//!     let specs = lockfetch::read_lockfile(
//!         Path::new("package-lock.json"),
//!         LockfileFormat::PackageLock,
//!     )?;
//!
//!     let interrupt = CancellationController::new();
//!     lockfetch::signal_on_interrupt(&interrupt);
//!
//!     let dest = lockfetch::create_destination(Path::new("."), None).await?;
//!     let fetcher = Arc::new(CliArchiveFetcher::from_config(&config)?);
//!     let orchestrator =
//!         Orchestrator::new(fetcher, interrupt, config.fetch.max_concurrent_fetches);
//!
//!     let report = orchestrator.run(specs, &dest).await;
//!     println!("run ended: {}", report.status);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// Cooperative cancellation signal
pub mod cancel;
/// Configuration types
pub mod config;
/// Destination directory creation and cleanup
pub mod destination;
/// Error types
pub mod error;
/// Archive fetching behind a pluggable trait
pub mod fetcher;
/// Lockfile readers
pub mod lockfile;
/// Concurrent fetch orchestration
pub mod orchestrator;
/// Progress accounting
pub mod progress;
/// Core types
pub mod types;

// Re-export commonly used types
pub use cancel::CancellationController;
pub use config::{Config, FetchConfig, ToolsConfig};
pub use destination::{CleanupReport, clean_destinations, create_destination};
pub use error::{Error, LockfileError, Result};
pub use fetcher::{ArchiveFetcher, CliArchiveFetcher};
pub use lockfile::{LockfileFormat, read_lockfile};
pub use orchestrator::Orchestrator;
pub use progress::ProgressTracker;
pub use types::{FetchOutcome, PackageSpec, RunReport, RunStatus};

/// Convert the next process-level interrupt into exactly one
/// [`CancellationController::signal`] call.
///
/// Spawns a background task waiting for a termination signal:
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
///
/// Further interrupts while the run winds down are absorbed by the
/// controller's idempotent signal.
pub fn signal_on_interrupt(controller: &CancellationController) {
    let controller = controller.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        controller.signal();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Set up signal handlers - these may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}

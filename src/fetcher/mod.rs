//! Archive fetching behind a pluggable trait.
//!
//! The external registry client is the only collaborator the orchestrator
//! cannot own outright, so it sits behind [`ArchiveFetcher`] (trait object
//! for pluggable implementations). Production uses [`CliArchiveFetcher`];
//! tests substitute stubs that count or script their outcomes.

mod cli;

pub use cli::CliArchiveFetcher;

use async_trait::async_trait;
use std::path::Path;

use crate::cancel::CancellationController;
use crate::types::{FetchOutcome, PackageSpec};

/// One external archive fetch per package specifier.
///
/// Implementations own the lifetime of whatever the fetch spawns. A fetch
/// that observes the cancellation signal mid-flight must stop its child
/// operation and return [`FetchOutcome::Aborted`] — never an error — and
/// must not leave a partially spawned process behind.
#[async_trait]
pub trait ArchiveFetcher: Send + Sync {
    /// Fetch one package archive into `dest`.
    ///
    /// Must not start any child operation if `cancel` is already signaled.
    async fn fetch(
        &self,
        spec: &PackageSpec,
        dest: &Path,
        cancel: &CancellationController,
    ) -> crate::Result<FetchOutcome>;

    /// Short implementation name for diagnostics
    fn name(&self) -> &'static str;
}

//! CLI-based archive fetcher invoking the npm client's pack command.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};

use super::ArchiveFetcher;
use crate::cancel::CancellationController;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{FetchOutcome, PackageSpec};

/// Archive fetcher that shells out to `npm pack`.
///
/// Each fetch spawns one child process writing its tarball into the
/// destination directory, with the client's own console output suppressed.
/// The wait is cancellation-aware: on a signal the child is asked to
/// terminate (SIGTERM on Unix), given a bounded grace period to exit
/// voluntarily, then force-killed.
pub struct CliArchiveFetcher {
    binary_path: PathBuf,
    grace_period: Duration,
}

impl CliArchiveFetcher {
    /// Create a fetcher with an explicit binary path
    pub fn new(binary_path: PathBuf, grace_period: Duration) -> Self {
        Self {
            binary_path,
            grace_period,
        }
    }

    /// Attempt to find the npm client in PATH
    pub fn from_path(grace_period: Duration) -> Option<Self> {
        which::which("npm").ok().map(|p| Self::new(p, grace_period))
    }

    /// Build a fetcher from configuration.
    ///
    /// Uses the explicit `tools.npm_path` when set, otherwise searches
    /// PATH. A missing binary is fatal before any task starts.
    pub fn from_config(config: &Config) -> Result<Self> {
        match &config.tools.npm_path {
            Some(path) => Ok(Self::new(path.clone(), config.fetch.grace_period)),
            None => Self::from_path(config.fetch.grace_period).ok_or_else(|| {
                Error::ExternalTool(
                    "npm not found in PATH; set tools.npm_path explicitly".to_string(),
                )
            }),
        }
    }

    /// Ask the child to terminate, wait out the grace period, then force it.
    async fn terminate(&self, child: &mut Child, spec: &PackageSpec) {
        #[cfg(unix)]
        if let Some(pid) = child.id() {
            // SIGTERM first so the client can clean up its partial tarball
            unsafe {
                libc::kill(pid as i32, libc::SIGTERM);
            }
        }

        match tokio::time::timeout(self.grace_period, child.wait()).await {
            Ok(_) => {
                tracing::debug!(spec = %spec, "child fetch exited within grace period");
            }
            Err(_) => {
                tracing::warn!(
                    spec = %spec,
                    grace = ?self.grace_period,
                    "child fetch ignored termination request, killing"
                );
                if let Err(e) = child.kill().await {
                    tracing::warn!(spec = %spec, error = %e, "failed to kill child fetch");
                }
            }
        }
    }
}

#[async_trait]
impl ArchiveFetcher for CliArchiveFetcher {
    async fn fetch(
        &self,
        spec: &PackageSpec,
        dest: &Path,
        cancel: &CancellationController,
    ) -> Result<FetchOutcome> {
        if cancel.is_signaled() {
            return Ok(FetchOutcome::Aborted);
        }

        let mut child = Command::new(&self.binary_path)
            .arg("pack")
            .arg(spec.as_str())
            .arg("--pack-destination")
            .arg(dest)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        tokio::select! {
            status = child.wait() => {
                let status = status.map_err(|e| Error::Fetch {
                    spec: spec.clone(),
                    message: format!("failed to wait on child fetch: {}", e),
                })?;

                if status.success() {
                    Ok(FetchOutcome::Completed)
                } else {
                    tracing::warn!(
                        spec = %spec,
                        code = ?status.code(),
                        "child fetch exited with non-zero status"
                    );
                    Ok(FetchOutcome::Failed {
                        code: status.code(),
                    })
                }
            }
            _ = cancel.cancelled() => {
                self.terminate(&mut child, spec).await;
                Ok(FetchOutcome::Aborted)
            }
        }
    }

    fn name(&self) -> &'static str {
        "cli-npm"
    }
}

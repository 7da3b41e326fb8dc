//! Destination directory naming, creation, and cleanup sweeps.
//!
//! Every run writes into exactly one fresh directory named
//! `lockfetch-[<label>-]<stamp>-<suffix>`. The random suffix plus a
//! create-and-retry loop keeps concurrent runs from colliding. Runs never
//! remove their own directory; the cleanup sweep is a separate mode.

use rand::Rng;
use rand::distributions::Alphanumeric;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Name prefix shared by every destination directory
pub const DIR_PREFIX: &str = "lockfetch-";

/// Attempts before giving up on finding an unclaimed directory name
const MAX_CREATE_ATTEMPTS: u32 = 16;

/// Length of the random name suffix
const SUFFIX_LEN: usize = 6;

/// Create a fresh, uniquely named destination directory under `base`
pub async fn create_destination(base: &Path, label: Option<&str>) -> Result<PathBuf> {
    for _ in 0..MAX_CREATE_ATTEMPTS {
        let path = base.join(dir_name(label));
        match tokio::fs::create_dir(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "created destination directory");
                return Ok(path);
            }
            // Another run claimed this name first; roll a new suffix
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(Error::Destination(format!(
        "could not find an unclaimed directory name under {} after {} attempts",
        base.display(),
        MAX_CREATE_ATTEMPTS
    )))
}

fn dir_name(label: Option<&str>) -> String {
    let stamp = chrono::Utc::now().format("%Y%m%d%H%M%S");
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(char::from)
        .collect();

    match label {
        Some(label) => format!("{}{}-{}-{}", DIR_PREFIX, label, stamp, suffix),
        None => format!("{}{}-{}", DIR_PREFIX, stamp, suffix),
    }
}

/// Result of a cleanup sweep
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CleanupReport {
    /// Directories removed
    pub removed: usize,
    /// Directories that could not be removed
    pub failed: usize,
}

/// Remove every destination directory under `base`.
///
/// Only directories whose name carries the [`DIR_PREFIX`] are touched.
/// A directory that fails to delete is logged and counted but does not
/// halt the sweep.
pub async fn clean_destinations(base: &Path) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();
    let mut entries = tokio::fs::read_dir(base).await?;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !name.starts_with(DIR_PREFIX) {
            continue;
        }
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => {}
            _ => continue,
        }

        let path = entry.path();
        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "removed destination directory");
                report.removed += 1;
            }
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to remove destination directory"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_destination_is_fresh_and_prefixed() {
        let temp = tempfile::tempdir().unwrap();

        let path = create_destination(temp.path(), None).await.unwrap();

        assert!(path.is_dir());
        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with(DIR_PREFIX));
    }

    #[tokio::test]
    async fn test_label_is_embedded_in_the_name() {
        let temp = tempfile::tempdir().unwrap();

        let path = create_destination(temp.path(), Some("release")).await.unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("lockfetch-release-"));
    }

    #[tokio::test]
    async fn test_same_instant_runs_get_distinct_directories() {
        let temp = tempfile::tempdir().unwrap();

        let (a, b) = tokio::join!(
            create_destination(temp.path(), Some("x")),
            create_destination(temp.path(), Some("x")),
        );

        let a = a.unwrap();
        let b = b.unwrap();
        assert_ne!(a, b, "concurrent runs must never share a directory");
        assert!(a.is_dir());
        assert!(b.is_dir());
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_matching_directories() {
        let temp = tempfile::tempdir().unwrap();
        let matching_a = temp.path().join("lockfetch-aaa");
        let matching_b = temp.path().join("lockfetch-bbb");
        let unrelated = temp.path().join("keep-me");
        let plain_file = temp.path().join("lockfetch-not-a-dir");
        std::fs::create_dir(&matching_a).unwrap();
        std::fs::create_dir(&matching_b).unwrap();
        std::fs::create_dir(&unrelated).unwrap();
        std::fs::write(&plain_file, b"x").unwrap();

        let report = clean_destinations(temp.path()).await.unwrap();

        assert_eq!(report, CleanupReport { removed: 2, failed: 0 });
        assert!(!matching_a.exists());
        assert!(!matching_b.exists());
        assert!(unrelated.exists(), "non-matching directories stay");
        assert!(plain_file.exists(), "files with the prefix stay");
    }

    #[tokio::test]
    async fn test_cleanup_of_empty_directory_reports_zero() {
        let temp = tempfile::tempdir().unwrap();
        let report = clean_destinations(temp.path()).await.unwrap();
        assert_eq!(report, CleanupReport::default());
    }
}

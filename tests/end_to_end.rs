//! End-to-end scenarios over the public library surface.
//!
//! The external registry client is replaced by stub fetchers so the
//! scenarios run hermetically; the child-process path itself is covered
//! by the fetcher's own tests.

use async_trait::async_trait;
use serial_test::serial;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lockfetch::{
    ArchiveFetcher, CancellationController, CleanupReport, FetchOutcome, LockfileFormat,
    Orchestrator, PackageSpec, RunStatus, clean_destinations, create_destination, read_lockfile,
};

const PACKAGE_LOCK_THREE: &str = r#"{
    "name": "fixture",
    "lockfileVersion": 3,
    "packages": {
        "": { "name": "fixture", "version": "1.0.0" },
        "node_modules/left-pad": { "version": "1.3.0" },
        "node_modules/is-even": { "version": "1.0.0" },
        "node_modules/@babel/core": { "version": "7.23.0" }
    }
}"#;

const YARN_LOCK_FIVE: &str = r#"# yarn lockfile v1

a@^1.0.0:
  version "1.0.0"

b@^1.0.0:
  version "1.0.1"

c@^1.0.0:
  version "1.0.2"

d@^1.0.0:
  version "1.0.3"

e@^1.0.0:
  version "1.0.4"
"#;

/// Succeeds for every spec, dropping one marker archive per fetch.
/// Optionally fires the interrupt controller after N completions.
struct StubFetcher {
    completions: AtomicUsize,
    signal_after: Option<(CancellationController, usize)>,
}

impl StubFetcher {
    fn ok() -> Self {
        Self {
            completions: AtomicUsize::new(0),
            signal_after: None,
        }
    }

    fn interrupting(interrupt: CancellationController, after: usize) -> Self {
        Self {
            completions: AtomicUsize::new(0),
            signal_after: Some((interrupt, after)),
        }
    }
}

#[async_trait]
impl ArchiveFetcher for StubFetcher {
    async fn fetch(
        &self,
        spec: &PackageSpec,
        dest: &Path,
        cancel: &CancellationController,
    ) -> lockfetch::Result<FetchOutcome> {
        if cancel.is_signaled() {
            return Ok(FetchOutcome::Aborted);
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
        let archive = format!("{}.tgz", spec.as_str().replace('/', "-"));
        tokio::fs::write(dest.join(archive), b"tarball").await?;

        let done = self.completions.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((interrupt, after)) = &self.signal_after {
            if done == *after {
                interrupt.signal();
            }
        }
        Ok(FetchOutcome::Completed)
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

fn count_archives(dest: &Path) -> usize {
    walkdir::WalkDir::new(dest)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "tgz"))
        .count()
}

/// Scenario 1: three specifiers, no cancellation, every fetch succeeds.
#[tokio::test]
#[serial]
async fn test_full_run_from_package_lock() {
    let temp = tempfile::tempdir().unwrap();
    let lockfile = temp.path().join("package-lock.json");
    std::fs::write(&lockfile, PACKAGE_LOCK_THREE).unwrap();

    let specs = read_lockfile(&lockfile, LockfileFormat::PackageLock).unwrap();
    assert_eq!(specs.len(), 3);

    let dest = create_destination(temp.path(), Some("e2e")).await.unwrap();
    let orchestrator = Orchestrator::new(
        Arc::new(StubFetcher::ok()) as Arc<dyn ArchiveFetcher>,
        CancellationController::new(),
        4,
    );

    let report = orchestrator.run(specs, &dest).await;

    assert_eq!(report.status, RunStatus::Completed);
    assert_eq!(report.status.exit_code(), 0);
    assert_eq!(report.completed, 3);
    assert_eq!(orchestrator.progress().completed(), 3);
    assert_eq!(count_archives(&dest), 3);
}

/// Scenario 2: five specifiers, interrupt fires after the second
/// completion; not-yet-started tasks must not fetch.
#[tokio::test]
#[serial]
async fn test_interrupted_run_from_yarn_lock() {
    let temp = tempfile::tempdir().unwrap();
    let lockfile = temp.path().join("yarn.lock");
    std::fs::write(&lockfile, YARN_LOCK_FIVE).unwrap();

    let specs = read_lockfile(&lockfile, LockfileFormat::YarnLock).unwrap();
    assert_eq!(specs.len(), 5);

    let interrupt = CancellationController::new();
    let fetcher = Arc::new(StubFetcher::interrupting(interrupt.clone(), 2));

    let dest = create_destination(temp.path(), None).await.unwrap();
    let orchestrator = Orchestrator::new(
        Arc::clone(&fetcher) as Arc<dyn ArchiveFetcher>,
        interrupt,
        1,
    );

    let report = orchestrator.run(specs, &dest).await;

    assert_eq!(report.status, RunStatus::Interrupted);
    assert_eq!(report.status.exit_code(), 130);
    assert!(report.completed >= 2 && report.completed <= 5);
    assert_eq!(report.completed + report.aborted, 5);
    assert_eq!(count_archives(&dest), report.completed);
    assert_eq!(
        fetcher.completions.load(Ordering::SeqCst),
        report.completed,
        "aborted tasks must not have fetched"
    );
}

/// Scenario 3: cleanup removes matching directories, leaves the rest.
#[tokio::test]
#[serial]
async fn test_cleanup_sweep() {
    let temp = tempfile::tempdir().unwrap();
    let first = create_destination(temp.path(), Some("old")).await.unwrap();
    let second = create_destination(temp.path(), None).await.unwrap();
    let unrelated = temp.path().join("node_modules");
    std::fs::create_dir(&unrelated).unwrap();
    std::fs::write(first.join("pkg.tgz"), b"tarball").unwrap();

    let report = clean_destinations(temp.path()).await.unwrap();

    assert_eq!(report, CleanupReport { removed: 2, failed: 0 });
    assert!(!first.exists());
    assert!(!second.exists());
    assert!(unrelated.exists());
}

/// Two runs started at nearly the same instant never share a directory.
#[tokio::test]
#[serial]
async fn test_concurrent_runs_use_distinct_destinations() {
    let temp = tempfile::tempdir().unwrap();

    let (a, b) = tokio::join!(
        create_destination(temp.path(), Some("same")),
        create_destination(temp.path(), Some("same")),
    );

    assert_ne!(a.unwrap(), b.unwrap());
}

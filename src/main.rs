//! lockfetch command-line interface.
//!
//! Thin binary over the library: argument parsing, subscriber setup, and
//! exit-code mapping live here; everything else is in `lockfetch`.

use clap::{ArgGroup, Parser};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use lockfetch::{
    CancellationController, CliArchiveFetcher, Config, LockfileFormat, Orchestrator,
    clean_destinations, create_destination, read_lockfile, signal_on_interrupt,
};

#[derive(Debug, Parser)]
#[command(
    name = "lockfetch",
    version,
    about = "Bulk package-archive fetcher driven by lockfiles",
    group(ArgGroup::new("mode").required(true))
)]
struct Cli {
    /// Fetch packages listed in an npm package-lock.json
    #[arg(long, value_name = "FILE", group = "mode")]
    package_lock: Option<PathBuf>,

    /// Fetch packages listed in a classic yarn.lock
    #[arg(long, value_name = "FILE", group = "mode")]
    yarn_lock: Option<PathBuf>,

    /// Remove every lockfetch-* directory in the working directory and exit
    #[arg(long, group = "mode")]
    clean: bool,

    /// Tag embedded in the destination directory name
    #[arg(long, value_name = "NAME", conflicts_with = "clean")]
    label: Option<String>,

    /// Concurrent fetch limit (default: available parallelism)
    #[arg(long, value_name = "N", conflicts_with = "clean")]
    concurrency: Option<usize>,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "lockfetch failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> lockfetch::Result<ExitCode> {
    if cli.clean {
        let report = clean_destinations(Path::new(".")).await?;
        tracing::info!(
            removed = report.removed,
            failed = report.failed,
            "cleanup complete"
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mut config = Config::default();
    if let Some(n) = cli.concurrency {
        config.fetch.max_concurrent_fetches = n.max(1);
    }

    let (path, format) = if let Some(path) = &cli.package_lock {
        (path.as_path(), LockfileFormat::PackageLock)
    } else if let Some(path) = &cli.yarn_lock {
        (path.as_path(), LockfileFormat::YarnLock)
    } else {
        // clap's mode group guarantees one of the three flags was given
        return Ok(ExitCode::from(2));
    };

    // Everything fallible before any task starts happens first, so an
    // unreadable lockfile or missing client leaves no directory behind
    let specs = read_lockfile(path, format)?;
    let fetcher = Arc::new(CliArchiveFetcher::from_config(&config)?);

    let interrupt = CancellationController::new();
    signal_on_interrupt(&interrupt);

    let dest = create_destination(&config.fetch.destination_base, cli.label.as_deref()).await?;

    let orchestrator = Orchestrator::new(
        fetcher,
        interrupt,
        config.fetch.max_concurrent_fetches,
    );
    let report = orchestrator.run(specs, &dest).await;

    Ok(ExitCode::from(report.status.exit_code()))
}

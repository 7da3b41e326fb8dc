//! Lockfile ingestion — turns a lockfile on disk into an ordered package list.
//!
//! Two source formats are supported: npm's `package-lock.json` (format A)
//! and the classic textual `yarn.lock` (format B). Both produce
//! `name@version` specifiers. The readers do not deduplicate: a package
//! pinned at several paths yields several entries, each fetched
//! independently. A parse failure is fatal before any task starts.

mod package_lock;
mod yarn;

use std::path::Path;

use crate::error::{LockfileError, Result};
use crate::types::PackageSpec;

/// Supported lockfile formats
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockfileFormat {
    /// npm `package-lock.json` (v1 through v3)
    PackageLock,
    /// Classic (v1) textual `yarn.lock`
    YarnLock,
}

/// Read a lockfile and return its package list in file order
pub fn read_lockfile(path: &Path, format: LockfileFormat) -> Result<Vec<PackageSpec>> {
    let content = std::fs::read_to_string(path).map_err(|source| LockfileError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let specs = match format {
        LockfileFormat::PackageLock => package_lock::parse(&content)?,
        LockfileFormat::YarnLock => yarn::parse(&content)?,
    };

    tracing::debug!(
        path = %path.display(),
        format = ?format,
        count = specs.len(),
        "parsed lockfile"
    );

    Ok(specs)
}

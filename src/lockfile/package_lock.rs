//! Reader for npm `package-lock.json` (lockfile v1 through v3).

use serde::Deserialize;
use std::collections::BTreeMap;

use crate::error::{LockfileError, Result};
use crate::types::PackageSpec;

/// Path component separating install locations from package names
const NODE_MODULES: &str = "node_modules/";

#[derive(Debug, Deserialize)]
struct PackageLockFile {
    /// Lockfile v2/v3: flat map keyed by install path
    #[serde(default)]
    packages: BTreeMap<String, PackageEntry>,

    /// Lockfile v1: nested dependency tree
    #[serde(default)]
    dependencies: BTreeMap<String, LegacyDependency>,
}

#[derive(Debug, Deserialize)]
struct PackageEntry {
    version: Option<String>,

    /// Workspace link entries point at local paths and are not fetchable
    #[serde(default)]
    link: bool,
}

#[derive(Debug, Deserialize)]
struct LegacyDependency {
    version: Option<String>,

    #[serde(default)]
    dependencies: BTreeMap<String, LegacyDependency>,
}

pub(super) fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    let lock: PackageLockFile = serde_json::from_str(content).map_err(LockfileError::Json)?;

    let mut specs = Vec::new();

    if !lock.packages.is_empty() {
        for (path, entry) in &lock.packages {
            // The "" key is the root project itself; keys without a
            // node_modules component are local workspace packages.
            let Some(idx) = path.rfind(NODE_MODULES) else {
                continue;
            };
            if entry.link {
                continue;
            }
            let Some(version) = &entry.version else {
                continue;
            };
            let name = &path[idx + NODE_MODULES.len()..];
            specs.push(PackageSpec::from_name_version(name, version));
        }
    } else {
        collect_legacy(&lock.dependencies, &mut specs);
    }

    Ok(specs)
}

/// Walk the v1 nested dependency tree depth-first
fn collect_legacy(deps: &BTreeMap<String, LegacyDependency>, specs: &mut Vec<PackageSpec>) {
    for (name, dep) in deps {
        if let Some(version) = &dep.version {
            specs.push(PackageSpec::from_name_version(name, version));
        }
        collect_legacy(&dep.dependencies, specs);
    }
}

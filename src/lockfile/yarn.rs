//! Reader for the classic (v1) textual `yarn.lock` format.
//!
//! Entries look like:
//!
//! ```text
//! "@babel/core@^7.0.0", "@babel/core@^7.2.0":
//!   version "7.23.0"
//!   resolved "https://registry.yarnpkg.com/..."
//! ```
//!
//! The package name is taken from the first selector of the header line;
//! the pinned version from the indented `version` line that follows.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{LockfileError, Result};
use crate::types::PackageSpec;

/// Matches an indented `version "x.y.z"` line
#[allow(clippy::unwrap_used)]
fn version_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    // Static pattern, compiled once
    PATTERN.get_or_init(|| Regex::new(r#"^\s+version\s+"([^"]+)"\s*$"#).unwrap())
}

pub(super) fn parse(content: &str) -> Result<Vec<PackageSpec>> {
    let mut specs = Vec::new();
    // Name from the most recent entry header, pending its version line
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in content.lines().enumerate() {
        let lineno = idx + 1;

        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }

        // Unindented line ending in ':' starts a new entry
        if !line.starts_with(char::is_whitespace) {
            let Some(selectors) = line.strip_suffix(':') else {
                return Err(LockfileError::Malformed {
                    line: lineno,
                    reason: "expected an entry header ending in ':'".to_string(),
                }
                .into());
            };
            if let Some((header_line, name)) = pending.take() {
                return Err(LockfileError::Malformed {
                    line: header_line,
                    reason: format!("entry for \"{}\" has no version line", name),
                }
                .into());
            }
            pending = Some((lineno, entry_name(selectors, lineno)?));
            continue;
        }

        if let Some(captures) = version_pattern().captures(line) {
            let Some((_, name)) = pending.take() else {
                return Err(LockfileError::Malformed {
                    line: lineno,
                    reason: "version line outside any entry".to_string(),
                }
                .into());
            };
            specs.push(PackageSpec::from_name_version(&name, &captures[1]));
        }
        // Other indented fields (resolved, integrity, dependencies) are ignored
    }

    if let Some((header_line, name)) = pending {
        return Err(LockfileError::Malformed {
            line: header_line,
            reason: format!("entry for \"{}\" has no version line", name),
        }
        .into());
    }

    Ok(specs)
}

/// Extract the package name from the first selector of a header line.
///
/// Selectors may be quoted, and scoped names keep their `@scope/` prefix:
/// `"@babel/core@^7.0.0"` → `@babel/core`.
fn entry_name(selectors: &str, lineno: usize) -> Result<String> {
    let first = selectors
        .split(',')
        .next()
        .map(str::trim)
        .unwrap_or_default()
        .trim_matches('"');

    // The version range starts at the last '@'; a leading '@' belongs to the scope
    let name = match first.rfind('@') {
        Some(0) | None => first,
        Some(idx) => &first[..idx],
    };

    if name.is_empty() {
        return Err(LockfileError::Malformed {
            line: lineno,
            reason: format!("cannot extract a package name from \"{}\"", first),
        }
        .into());
    }

    Ok(name.to_string())
}

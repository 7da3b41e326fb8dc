//! Configuration types for lockfetch

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Fetch behavior configuration (concurrency, grace period, destination naming)
///
/// Groups settings related to how archives are fetched and stored.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Maximum concurrent fetches (default: available parallelism)
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent_fetches: usize,

    /// Grace period for a child fetch to exit voluntarily after a
    /// termination request, before it is force-killed (default: 1 second)
    #[serde(default = "default_grace_period", with = "duration_serde")]
    pub grace_period: Duration,

    /// Base directory in which destination directories are created
    /// (default: current working directory)
    #[serde(default = "default_destination_base")]
    pub destination_base: PathBuf,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: default_max_concurrent(),
            grace_period: default_grace_period(),
            destination_base: default_destination_base(),
        }
    }
}

/// External tool configuration (registry client binary)
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ToolsConfig {
    /// Path to the npm executable (auto-detected from PATH if None)
    #[serde(default)]
    pub npm_path: Option<PathBuf>,
}

/// Top-level configuration
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Fetch behavior settings
    #[serde(default)]
    pub fetch: FetchConfig,

    /// External tool settings
    #[serde(default)]
    pub tools: ToolsConfig,
}

fn default_max_concurrent() -> usize {
    std::thread::available_parallelism()
        .map(std::num::NonZeroUsize::get)
        .unwrap_or(4)
}

fn default_grace_period() -> Duration {
    Duration::from_secs(1)
}

fn default_destination_base() -> PathBuf {
    PathBuf::from(".")
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let config = Config::default();
        assert!(config.fetch.max_concurrent_fetches >= 1);
        assert_eq!(config.fetch.grace_period, Duration::from_secs(1));
        assert!(config.tools.npm_path.is_none());
    }

    #[test]
    fn test_partial_deserialization_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"fetch": {"grace_period": 5}}"#).unwrap();
        assert_eq!(config.fetch.grace_period, Duration::from_secs(5));
        assert!(config.fetch.max_concurrent_fetches >= 1);
    }
}

//! Application configuration.
//!
//! Settings come from `{data_dir}/config.yaml`; command line flags override
//! them in `main`. Missing files and fields fall back to defaults.

mod keybindings;

pub use keybindings::{FormBindings, GlobalBindings, KeybindingsConfig, NavigationBindings};

use std::path::{Path, PathBuf};
use std::time::Duration;

use jiff::tz::TimeZone;
use serde::{Deserialize, Serialize};

/// Default length of the failure shake cue
pub const DEFAULT_SHAKE_MS: u64 = 600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the trip API. Local files are used when unset.
    pub server_url: Option<String>,
    /// Value sent in the `Authorization` header
    pub authorization: Option<String>,
    /// IANA zone for form dates, e.g. `Europe/Rome`. System zone when unset.
    pub timezone: Option<String>,
    pub shake_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            authorization: None,
            timezone: None,
            shake_ms: DEFAULT_SHAKE_MS,
        }
    }
}

impl AppConfig {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.yaml")
    }

    pub fn load_or_default(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_saphyr::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring {}: {e}", path.display());
            Self::default()
        })
    }

    pub fn shake_duration(&self) -> Duration {
        Duration::from_millis(self.shake_ms)
    }

    /// Zone used to read and show form dates
    pub fn time_zone(&self) -> TimeZone {
        match &self.timezone {
            Some(name) => TimeZone::get(name).unwrap_or_else(|e| {
                tracing::warn!("Unknown time zone {name:?}: {e}; using system zone");
                TimeZone::system()
            }),
            None => TimeZone::system(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(dir.path());
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.shake_duration(), Duration::from_millis(600));
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            AppConfig::path(dir.path()),
            "server_url: https://example.test/big-trip\ntimezone: UTC\n",
        )
        .unwrap();

        let config = AppConfig::load_or_default(dir.path());
        assert_eq!(
            config.server_url.as_deref(),
            Some("https://example.test/big-trip")
        );
        assert_eq!(config.shake_ms, DEFAULT_SHAKE_MS);
        assert_eq!(config.timezone.as_deref(), Some("UTC"));
    }
}

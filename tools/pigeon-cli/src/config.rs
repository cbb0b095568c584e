//! CLI configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pigeon_data::RetryConfig;
use serde::{Deserialize, Serialize};

/// Config file names searched from the working directory upward.
pub const CONFIG_FILE_NAMES: [&str; 3] = ["pigeon.toml", ".pigeon.toml", "pigeon.json"];

/// Environment variable overriding `base_url`.
pub const BASE_URL_ENV: &str = "PIGEON_BASE_URL";

/// CLI configuration file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart API base URL, e.g. `https://shop.example/api`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-attempt transport timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Delivery cost in minor units, used for totals the server has not
    /// computed yet.
    #[serde(default)]
    pub delivery: i64,

    /// Directory for persisted settings. Defaults to the user data dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state_dir: Option<PathBuf>,

    /// Retry policy for idempotent requests.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_base_url() -> String {
    "http://localhost:8080/api".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            delivery: 0,
            state_dir: None,
            retry: RetryConfig::default(),
        }
    }
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = if path.extension().is_some_and(|e| e == "json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    /// Apply environment overrides.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                self.base_url = url;
            }
        }
        self
    }
}

/// Generate a commented default `pigeon.toml`.
pub fn generate_default_config() -> String {
    r#"# Pigeon cart client configuration

base_url = "http://localhost:8080/api"
timeout_secs = 30

# Delivery cost in minor units (grosze), shown until the server quotes one.
delivery = 0

# state_dir = ".pigeon"

[retry]
max_retries = 3
base_delay_ms = 100
max_delay_ms = 5000
retryable_status_codes = [500, 502, 503, 504]
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let parsed: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(parsed, CliConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let parsed: CliConfig = toml::from_str(
            r#"
base_url = "https://shop.example/api"

[retry]
max_retries = 5
"#,
        )
        .unwrap();
        assert_eq!(parsed.base_url, "https://shop.example/api");
        assert_eq!(parsed.retry.max_retries, 5);
        assert_eq!(parsed.retry.base_delay_ms, 100);
        assert_eq!(parsed.timeout_secs, 30);
    }

    #[test]
    fn test_save_and_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pigeon.json");
        let config = CliConfig {
            delivery: 999,
            ..CliConfig::default()
        };
        config.save(&path).unwrap();
        assert_eq!(CliConfig::load(&path).unwrap(), config);
    }
}

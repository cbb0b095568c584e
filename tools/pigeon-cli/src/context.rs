//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context as _, Result};
use pigeon_cache::{Settings, Store};
use pigeon_cart::{CartClient, OptimisticCart, ProductClient};
use pigeon_data::{FetchClient, ReqwestTransport};

use crate::config::{CliConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// CLI configuration.
    pub config: CliConfig,
    /// Where the configuration came from, if a file was found.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&Path>, output: Output) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = match config_path {
            Some(path) => (CliConfig::load(path)?, Some(path.to_path_buf())),
            None => match Self::find_config(&cwd) {
                Some(path) => (CliConfig::load(&path)?, Some(path)),
                None => (CliConfig::default(), None),
            },
        };

        match &config_path {
            Some(path) => tracing::debug!(path = %path.display(), "Loaded config"),
            None => tracing::debug!("No config file found, using defaults"),
        }

        Ok(Self {
            config: config.with_env_overrides(),
            config_path,
            output,
            cwd,
        })
    }

    /// Find a config file in the directory tree.
    fn find_config(start: &Path) -> Option<PathBuf> {
        start.ancestors().find_map(|dir| {
            CONFIG_FILE_NAMES
                .iter()
                .map(|name| dir.join(name))
                .find(|path| path.is_file())
        })
    }

    /// Directory for persisted settings.
    pub fn state_dir(&self) -> PathBuf {
        match &self.config.state_dir {
            Some(dir) => self.resolve_path(dir),
            None => data_dir().join("pigeon"),
        }
    }

    /// HTTP client configured from the config file.
    pub fn http(&self) -> Result<FetchClient> {
        let transport = ReqwestTransport::with_timeout(Duration::from_secs(self.config.timeout_secs))
            .context("Failed to create HTTP client")?;
        Ok(FetchClient::with_transport(Arc::new(transport))
            .with_base_url(self.config.base_url.clone())
            .with_default_header("Accept", "application/json")
            .with_retry_config(self.config.retry.clone()))
    }

    /// Optimistic cart over the configured API.
    pub fn cart(&self) -> Result<OptimisticCart<CartClient>> {
        Ok(OptimisticCart::new(Arc::new(CartClient::new(self.http()?))))
    }

    /// Product catalogue over the configured API.
    pub fn products(&self) -> Result<ProductClient> {
        Ok(ProductClient::new(self.http()?))
    }

    /// Persisted user settings.
    pub fn settings(&self) -> Result<Settings> {
        let dir = self.state_dir();
        let store = Store::open(&dir)
            .with_context(|| format!("Failed to open state directory: {}", dir.display()))?;
        Ok(Settings::load(Arc::new(store)))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }
}

/// Get the platform-specific data directory.
fn data_dir() -> PathBuf {
    if let Some(home) = std::env::var_os("HOME") {
        PathBuf::from(home).join(".local").join("share")
    } else {
        std::env::temp_dir()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_config_walks_up() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.path().join("pigeon.toml"), "delivery = 5\n").unwrap();

        let found = Context::find_config(&nested).unwrap();
        assert_eq!(found, root.path().join("pigeon.toml"));
        assert_eq!(CliConfig::load(&found).unwrap().delivery, 5);
    }
}

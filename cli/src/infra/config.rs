//! Infrastructure implementation of the `ConfigStore` port.

use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::application::ports::ConfigStore;
use crate::domain::config::ShiftCiConfig;

/// Environment variable that points at an alternative config file.
pub const CONFIG_ENV: &str = "SHIFTCI_CONFIG";

/// Production implementation of `ConfigStore` that uses a YAML file on disk.
pub struct YamlConfigStore {
    path: Option<PathBuf>,
}

impl YamlConfigStore {
    /// Store resolved from `SHIFTCI_CONFIG` or `~/.shiftci/config.yaml`.
    #[must_use]
    pub fn new() -> Self {
        Self { path: None }
    }

    /// Store reading an explicit file (for testing).
    #[must_use]
    pub fn with_path(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    fn path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        if let Ok(val) = std::env::var(CONFIG_ENV) {
            return Ok(PathBuf::from(val));
        }
        let home =
            dirs::home_dir().ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?;
        Ok(home.join(".shiftci").join("config.yaml"))
    }
}

impl Default for YamlConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for YamlConfigStore {
    fn load(&self) -> Result<ShiftCiConfig> {
        let path = self.path()?;
        if !path.exists() {
            return Ok(ShiftCiConfig::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        if content.trim().is_empty() {
            return Ok(ShiftCiConfig::default());
        }
        serde_yaml::from_str(&content).with_context(|| format!("cannot parse {}", path.display()))
    }
}

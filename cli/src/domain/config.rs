//! Domain types for enable-ci configuration.
//!
//! Pure data and functions. No I/O, no async.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::platform::{DEFAULT_BUILDER_NAME, DEFAULT_DOMAIN_NAME};

// ── Constants ────────────────────────────────────────────────────────────────

/// Broker host used when neither the config file nor `LIBRA_SERVER` name one.
pub const DEFAULT_SERVER: &str = "openshift.redhat.com";

/// Environment variable that overrides `server`.
pub const SERVER_ENV: &str = "LIBRA_SERVER";

// ── Config schema ────────────────────────────────────────────────────────────

/// Top-level configuration stored in `~/.shiftci/config.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftCiConfig {
    /// Broker host, e.g. `openshift.redhat.com`.
    pub server: String,
    /// Domain created when the account has none.
    pub domain: String,
    /// Name of the CI server application created when none exists.
    pub builder_name: String,
    /// Upper bound for each readiness probe.
    pub readiness_timeout_secs: u64,
    pub ssh: SshConfig,
    pub deploy: DeployConfig,
}

impl Default for ShiftCiConfig {
    fn default() -> Self {
        Self {
            server: DEFAULT_SERVER.to_string(),
            domain: DEFAULT_DOMAIN_NAME.to_string(),
            builder_name: DEFAULT_BUILDER_NAME.to_string(),
            readiness_timeout_secs: 180,
            ssh: SshConfig::default(),
            deploy: DeployConfig::default(),
        }
    }
}

impl ShiftCiConfig {
    #[must_use]
    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_secs(self.readiness_timeout_secs)
    }

    /// Apply environment overrides, looked up through `lookup`.
    #[must_use]
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(server) = lookup(SERVER_ENV).filter(|s| !s.trim().is_empty()) {
            self.server = server.trim().to_string();
        }
        self
    }
}

/// Account key registration settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SshConfig {
    /// Register the local public key before creating the first domain.
    pub register_key: bool,
    /// Public key file; `~/.ssh/id_rsa.pub` when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<PathBuf>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            register_key: true,
            public_key: None,
        }
    }
}

/// Deployment settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeployConfig {
    /// Kill a git command that runs longer than this.
    pub command_timeout_secs: u64,
}

impl Default for DeployConfig {
    fn default() -> Self {
        Self {
            command_timeout_secs: 600,
        }
    }
}

impl DeployConfig {
    #[must_use]
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

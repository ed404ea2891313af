//! Remote resource hierarchy as plain data.
//!
//! Account → Domain → Applications → Embedded capabilities. These values are
//! snapshots returned by the platform port; they carry no connection and do
//! not refresh themselves.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Constants ────────────────────────────────────────────────────────────────

/// Client identifier sent with every platform session.
pub const CLIENT_ID: &str = "enable-openshift-ci";

/// Name used when the account has no domain yet.
pub const DEFAULT_DOMAIN_NAME: &str = "openshiftci";

/// Name used when the domain has no CI server application yet.
pub const DEFAULT_BUILDER_NAME: &str = "jenkins";

/// Name of the git remote that points at the platform application.
pub const GIT_REMOTE: &str = "openshift";

/// Applications a domain may hold before the builder no longer fits.
pub const APPLICATION_QUOTA: usize = 3;

// ── Cartridges ───────────────────────────────────────────────────────────────

/// Runtime type an application is created from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Cartridge {
    /// `jbossas-7` web application server.
    JbossAs7,
    /// `jenkins-1.4` CI server.
    Jenkins14,
    /// Any other label the platform reports.
    Other(String),
}

impl Cartridge {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::JbossAs7 => "jbossas-7",
            Self::Jenkins14 => "jenkins-1.4",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for Cartridge {
    fn from(value: String) -> Self {
        match value.as_str() {
            "jbossas-7" => Self::JbossAs7,
            "jenkins-1.4" => Self::Jenkins14,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Cartridge {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<Cartridge> for String {
    fn from(value: Cartridge) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for Cartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Add-on type that can be embedded into an existing application.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EmbeddableCartridge {
    /// `jenkins-client-1.4`, the agent that lets the builder build the app.
    JenkinsClient14,
    Other(String),
}

impl EmbeddableCartridge {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::JenkinsClient14 => "jenkins-client-1.4",
            Self::Other(name) => name,
        }
    }
}

impl From<String> for EmbeddableCartridge {
    fn from(value: String) -> Self {
        if value == "jenkins-client-1.4" {
            Self::JenkinsClient14
        } else {
            Self::Other(value)
        }
    }
}

impl From<&str> for EmbeddableCartridge {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<EmbeddableCartridge> for String {
    fn from(value: EmbeddableCartridge) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for EmbeddableCartridge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Resources ────────────────────────────────────────────────────────────────

/// Login and secret used to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The authenticated platform identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// Namespace owned by an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    pub name: String,
}

/// Named application within a domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Application {
    pub name: String,
    pub cartridge: Cartridge,
    /// Repository the platform builds from.
    pub git_url: String,
    /// Public endpoint of the running application.
    pub app_url: String,
    /// Messages the platform returned when the application was created.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_log: Option<String>,
}

/// Add-on attached to an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddedCapability {
    pub cartridge: EmbeddableCartridge,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_log: Option<String>,
}

/// Public key registered with the account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredKey {
    pub name: String,
    pub key_type: String,
    pub content: String,
}

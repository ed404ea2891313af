//! Project domain type and pure validation functions.
//!
//! This module is intentionally free of I/O, async, and external layer imports.
//! The filesystem probing lives in `application::services::project`.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::domain::error::EnableCiError;

/// Build descriptor a project must carry to be recognized.
pub const BUILD_DESCRIPTOR: &str = "pom.xml";

/// Version-control metadata directory a project must carry.
pub const VCS_DIR: &str = ".git";

/// Platform rule for application and domain names.
pub static RESOURCE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    // Constant pattern.
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-zA-Z0-9]{1,32}$").expect("valid regex")
});

/// Local project being onboarded. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    path: PathBuf,
    name: String,
}

impl Project {
    /// Build a project from an already validated directory.
    ///
    /// # Errors
    ///
    /// Returns a `Validation` error if the directory has no usable final
    /// component or that component is not a legal application name.
    pub fn new(path: PathBuf) -> Result<Self> {
        let name = project_name(&path)?;
        validate_resource_name(&name)?;
        Ok(Self { path, name })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Name of the platform application created for this project.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

fn project_name(path: &Path) -> Result<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_owned)
        .ok_or_else(|| {
            EnableCiError::Validation(format!(
                "Could not derive a project name from {}",
                path.display()
            ))
            .into()
        })
}

/// Validates an application or domain name against the platform rule.
///
/// # Errors
///
/// Returns a `Validation` error if the name is empty, longer than 32
/// characters, or contains anything other than ASCII letters and digits.
pub fn validate_resource_name(name: &str) -> Result<()> {
    if !RESOURCE_NAME_RE.is_match(name) {
        return Err(EnableCiError::Validation(format!(
            "'{name}' is not a valid OpenShift name: use 1-32 letters or digits"
        ))
        .into());
    }
    Ok(())
}

//! Filesystem infrastructure: implements `LocalFs` and key path resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Production filesystem implementation of `LocalFs`.
pub struct LocalFs;

impl crate::application::ports::LocalFs for LocalFs {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_to_string(&self, path: &Path) -> Result<String> {
        std::fs::read_to_string(path).with_context(|| format!("reading file {}", path.display()))
    }
}

/// Returns the conventional public key location, `~/.ssh/id_rsa.pub`.
///
/// # Errors
///
/// Returns an error if the home directory cannot be determined.
pub fn default_public_key() -> Result<PathBuf> {
    Ok(dirs::home_dir()
        .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?
        .join(".ssh")
        .join("id_rsa.pub"))
}

/// Expands a leading `~/` against the home directory.
#[must_use]
pub fn expand_home(path: &Path, home: Option<&Path>) -> PathBuf {
    match (path.strip_prefix("~"), home) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

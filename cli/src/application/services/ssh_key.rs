//! Application service: make sure the local public key is known to the account.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{LocalFs, PlatformSession, ProgressReporter};
use crate::domain::EnableCiError;
use crate::domain::platform::RegisteredKey;
use crate::domain::ssh::{parse_public_key, unique_key_name};

/// Register the public key at `key_path` unless the account already has it.
///
/// # Errors
///
/// Returns a `Precondition` error if the key file is missing or malformed,
/// or any platform error.
pub async fn ensure_public_key(
    session: &impl PlatformSession,
    fs: &impl LocalFs,
    key_path: &Path,
    reporter: &impl ProgressReporter,
) -> Result<RegisteredKey> {
    reporter.step("Registering ssh key...");
    if !fs.exists(key_path) {
        return Err(EnableCiError::Precondition(format!(
            "Could not find public key {}. Create one with: ssh-keygen -t rsa",
            key_path.display()
        ))
        .into());
    }
    let text = fs.read_to_string(key_path)?;
    let key = parse_public_key(&text)
        .with_context(|| format!("reading public key {}", key_path.display()))?;

    let registered = session.ssh_keys().await.context("listing account keys")?;
    if let Some(existing) = registered.iter().find(|k| k.content == key.content) {
        reporter.success(&format!("ssh key already registered as {}", existing.name));
        return Ok(existing.clone());
    }

    let taken: Vec<&str> = registered.iter().map(|k| k.name.as_str()).collect();
    let name = unique_key_name(&taken);
    let added = session
        .add_ssh_key(&name, &key)
        .await
        .with_context(|| format!("registering ssh key {name}"))?;
    reporter.success(&format!("ssh key registered as {}", added.name));
    Ok(added)
}

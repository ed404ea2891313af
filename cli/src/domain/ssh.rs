use anyhow::Result;

use crate::domain::error::EnableCiError;

/// Key algorithms the platform accepts for account keys.
pub const SUPPORTED_KEY_TYPES: &[&str] = &[
    "ssh-rsa",
    "ssh-dss",
    "ssh-ed25519",
    "ecdsa-sha2-nistp256",
    "ecdsa-sha2-nistp384",
    "ecdsa-sha2-nistp521",
];

/// Name under which the local key is registered with the account.
pub const KEY_NAME: &str = "enableci";

/// A parsed OpenSSH public key line: `<type> <base64> [comment]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshPublicKey {
    pub key_type: String,
    pub content: String,
    pub comment: Option<String>,
}

/// Parses the first key line of an OpenSSH `.pub` file.
///
/// Blank lines and `#` comment lines are skipped.
///
/// # Errors
///
/// Returns a `Precondition` error if there is no key line, the key type is
/// unsupported, or the key material is missing or not base64.
pub fn parse_public_key(text: &str) -> Result<SshPublicKey> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty() && !l.starts_with('#'))
        .ok_or_else(|| EnableCiError::Precondition("public key file is empty".to_string()))?;

    let mut parts = line.split_whitespace();
    let key_type = parts.next().unwrap_or_default();
    if !SUPPORTED_KEY_TYPES.contains(&key_type) {
        return Err(EnableCiError::Precondition(format!(
            "unsupported public key type {key_type:?}"
        ))
        .into());
    }
    let content = parts
        .next()
        .filter(|m| is_base64(m))
        .ok_or_else(|| EnableCiError::Precondition("public key has no key material".to_string()))?;
    let comment = parts.collect::<Vec<_>>().join(" ");

    Ok(SshPublicKey {
        key_type: key_type.to_string(),
        content: content.to_string(),
        comment: (!comment.is_empty()).then_some(comment),
    })
}

fn is_base64(material: &str) -> bool {
    !material.is_empty()
        && material
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'+' | b'/' | b'='))
}

/// Picks a key name that does not collide with `taken`.
///
/// Returns `enableci`, then `enableci2`, `enableci3`, and so on.
#[must_use]
pub fn unique_key_name(taken: &[&str]) -> String {
    if !taken.contains(&KEY_NAME) {
        return KEY_NAME.to_string();
    }
    (2u32..)
        .map(|n| format!("{KEY_NAME}{n}"))
        .find(|candidate| !taken.contains(&candidate.as_str()))
        .unwrap_or_else(|| KEY_NAME.to_string())
}

//! SSH credentials, resolved once per run.
//!
//! The authentication mode is fixed when the `Credential` is built; code
//! downstream never branches on the panel label again.

use std::path::{Path, PathBuf};

use provcheck_common::ConnectionType;

/// A private key file whose contents passed the PEM format check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrivateKeyFile {
    path: PathBuf,
}

impl PrivateKeyFile {
    /// Wrap a path after its contents were checked with [`validate_pem_private_key`].
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// How to authenticate the admin user.
#[derive(Clone, PartialEq, Eq)]
pub enum Credential {
    PrivateKey(PrivateKeyFile),
    Password(String),
}

impl Credential {
    #[must_use]
    pub fn connection_type(&self) -> ConnectionType {
        match self {
            Self::PrivateKey(_) => ConnectionType::SshKey,
            Self::Password(_) => ConnectionType::Password,
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PrivateKey(key) => f.debug_tuple("PrivateKey").field(&key.path).finish(),
            Self::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

/// Check that `contents` holds one PEM private key block.
///
/// Accepts PKCS#1 (`RSA PRIVATE KEY`), PKCS#8 and OpenSSH armour.
///
/// # Errors
///
/// Returns a human-readable reason when the armour is missing or unbalanced.
pub fn validate_pem_private_key(contents: &str) -> Result<(), String> {
    let mut lines = contents.lines().map(str::trim).filter(|l| !l.is_empty());
    let Some(begin) = lines.next() else {
        return Err("key file is empty".to_string());
    };
    let label = begin
        .strip_prefix("-----BEGIN ")
        .and_then(|rest| rest.strip_suffix("-----"))
        .filter(|label| label.ends_with("PRIVATE KEY"))
        .ok_or_else(|| "missing PEM private key header".to_string())?;
    let end = format!("-----END {label}-----");
    let body: Vec<&str> = lines.collect();
    match body.split_last() {
        Some((last, material)) if *last == end && !material.is_empty() => Ok(()),
        Some((last, _)) if *last == end => Err("PEM block has no key material".to_string()),
        _ => Err(format!("missing `{end}` footer")),
    }
}

//! Key infrastructure: implements `KeyLoader` against the local filesystem.

use std::path::Path;

use crate::application::ports::KeyLoader;
use crate::domain::credential::validate_pem_private_key;
use crate::domain::{ConnectError, Credential, PrivateKeyFile};

/// Reads the key file and checks its PEM armour before any network traffic.
pub struct FileKeyLoader;

impl KeyLoader for FileKeyLoader {
    fn load_private_key(&self, path: &Path) -> Result<Credential, ConnectError> {
        let key_load = |reason: String| ConnectError::KeyLoad {
            path: path.display().to_string(),
            reason,
        };
        let contents = std::fs::read_to_string(path).map_err(|e| key_load(e.to_string()))?;
        validate_pem_private_key(&contents).map_err(key_load)?;
        tracing::debug!("loaded private key from {}", path.display());
        Ok(Credential::PrivateKey(PrivateKeyFile::new(path.to_path_buf())))
    }
}

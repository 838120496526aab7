//! Application service: configuration use-cases.

use anyhow::Result;

use crate::application::ports::ConfigStore;
use crate::domain::config::{ProvcheckConfig, set_config_value};

/// Load configuration.
pub fn load_config(store: &impl ConfigStore) -> Result<ProvcheckConfig> {
    store.load()
}

/// Save configuration.
pub fn save_config(store: &impl ConfigStore, config: &ProvcheckConfig) -> Result<()> {
    store.save(config)
}

/// Validate and persist a single `key = value` setting.
pub fn update_config(store: &impl ConfigStore, key: &str, value: &str) -> Result<ProvcheckConfig> {
    let mut config = store.load()?;
    set_config_value(&mut config, key, value)?;
    store.save(&config)?;
    Ok(config)
}

use std::path::Path;
use std::sync::Arc;

use crate::config::BrokerConfig;
use crate::domain::resource_manager::ResourceManager;
use crate::domain::store::json_site_store::JsonSiteStore;
use crate::error::Result;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Creates a resource manager reading its inventory from an exported JSON file.
///
/// The graph is left empty (gateway only); call `construct()` on the manager or
/// the broker to load the inventory.
pub fn build_resource_manager(inventory_path: impl AsRef<Path>, config_path: Option<&Path>) -> Result<ResourceManager> {
    let config = BrokerConfig::load(config_path)?;
    log::info!("Configuration loaded.");

    let store = JsonSiteStore::from_file(inventory_path, config.dtn_expiry_ms)?;
    log::info!("Site store opened.");

    Ok(ResourceManager::new(Arc::new(store), config))
}

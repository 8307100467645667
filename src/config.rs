use serde::Deserialize;
use std::path::Path;

use crate::error::Result;
use crate::loader::parser::parse_optional_json_file;

/// Tunables of the resource manager.
///
/// Every field has a default, so an empty JSON object (or no config file at all)
/// yields the behaviour the service has always had.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Residual path rate below which a DTN path is treated as unusable (bandwidth units).
    pub admission_floor: f64,

    /// Capacity assigned to storage -> DTN edges, both from the inventory map and
    /// from DTN registration messages.
    pub storage_dtn_link_rate: f64,

    /// Capacity of a storage node created by a `LocalStorage` registration.
    pub registered_storage_capacity: f64,

    /// Number of eviction rounds after which `query_path_dtns` starts warning.
    pub eviction_warn_threshold: usize,

    /// DTN inventory records whose `expire_at` heartbeat is older than this are ignored.
    pub dtn_expiry_ms: i64,

    /// Fragment remainders at or below this are considered fully consumed.
    pub match_tolerance: f64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            admission_floor: 1000.0,
            storage_dtn_link_rate: 4e10,
            registered_storage_capacity: 1e6,
            eviction_warn_threshold: 100,
            dtn_expiry_ms: 10 * 60 * 1000,
            match_tolerance: 1.0,
        }
    }
}

impl BrokerConfig {
    pub fn load(file_path: Option<&Path>) -> Result<Self> {
        let config: BrokerConfig = parse_optional_json_file(file_path)?;
        log::debug!("Broker configuration: {:?}", config);
        Ok(config)
    }
}

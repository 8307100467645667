use serde::{Deserialize, Serialize};

/// Snapshot of the site inventory the resource graph is rebuilt from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryDto {
    #[serde(default)]
    pub storages: Vec<StorageDto>,
    #[serde(default)]
    pub dtns: Vec<DtnDto>,
    #[serde(default)]
    pub storage_dtn_map: Vec<StorageDtnMapDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageDto {
    pub id: String,
    pub name: String,
    pub io_capacity: f64,
    #[serde(default)]
    pub queue_name: String,
    #[serde(default = "default_root_folder")]
    pub root_folder: String,

    /// Everything else in the record, kept for the node's property bag.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DtnDto {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub queue_name: String,
    #[serde(default)]
    pub ctrl_interface: CtrlInterfaceDto,
    #[serde(default)]
    pub data_interfaces: Vec<DataInterfaceDto>,

    /// Heartbeat deadline (ms since epoch). Records without one never expire.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<i64>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl DtnDto {
    /// Rate of the first data interface, which sizes the DTN -> gateway edge.
    pub fn link_rate(&self) -> f64 {
        self.data_interfaces.first().map(|interface| interface.rate).unwrap_or(0.0)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CtrlInterfaceDto {
    #[serde(default)]
    pub ip: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataInterfaceDto {
    #[serde(default)]
    pub rate: f64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageDtnMapDto {
    pub storage: String,
    pub dtn: String,
}

fn default_root_folder() -> String {
    "/".to_string()
}

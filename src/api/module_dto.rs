use serde::{Deserialize, Serialize};

use crate::api::inventory_dto::{CtrlInterfaceDto, DataInterfaceDto};

/// Module type announced by an agent on registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ModuleType {
    #[serde(rename = "DTN")]
    Dtn,
    LocalStorage,
    Launcher,
    #[serde(rename = "SDN")]
    Sdn,
    /// Any other type string, kept as announced.
    #[serde(untagged)]
    Unknown(String),
}

/// One module description from an agent's join or leave message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDto {
    pub id: String,
    #[serde(rename = "type")]
    pub typ: ModuleType,
    #[serde(default)]
    pub name: String,

    // DTN
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctrl_interface: Option<CtrlInterfaceDto>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data_interfaces: Vec<DataInterfaceDto>,
    /// Storages the DTN reports it can reach.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub storages: Vec<ModuleStorageDto>,

    // LocalStorage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub root_folder: Option<String>,

    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ModuleDto {
    pub fn new(id: impl Into<String>, typ: ModuleType, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            typ,
            name: name.into(),
            ctrl_interface: None,
            data_interfaces: Vec::new(),
            storages: Vec::new(),
            root_folder: None,
            extra: serde_json::Map::new(),
        }
    }

    pub fn link_rate(&self) -> f64 {
        self.data_interfaces.first().map(|interface| interface.rate).unwrap_or(0.0)
    }

    pub fn ctrl_ip(&self) -> &str {
        self.ctrl_interface.as_ref().map(|interface| interface.ip.as_str()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleStorageDto {
    pub id: String,
    #[serde(default, rename = "type")]
    pub typ: String,
    #[serde(default)]
    pub name: String,
}

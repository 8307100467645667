use serde::{Deserialize, Serialize};

/// DTNs with the storages reachable through them, as shown to operators.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DtnTopologyDto {
    pub dtns: Vec<DtnTopologyEntryDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DtnTopologyEntryDto {
    pub id: String,
    pub label: String,
    /// Local storages wired to this DTN.
    pub ls: Vec<AttachedStorageDto>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AttachedStorageDto {
    pub device: String,
    pub roots: serde_json::Value,
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DtnSummaryDto {
    pub id: String,
    pub name: String,
    pub ctrl_ip: String,
    pub queue: String,
}

use serde_json::{Value, json};

use crate::api::topology_dto::{AttachedStorageDto, DtnSummaryDto, DtnTopologyDto, DtnTopologyEntryDto};
use crate::domain::graph::resource_graph::GraphSummary;
use crate::domain::resource::node::Node;
use crate::domain::resource_manager::ResourceManager;
use crate::domain::utils::id::NodeId;
use crate::error::Result;

impl ResourceManager {
    /// Storages wired to at least one DTN, each tagged with the control IP of its
    /// first DTN under `"dtn"`.
    pub fn active_storage_list(&self) -> Vec<Value> {
        let mut storages = Vec::new();

        for storage in self.graph.storage_nodes().filter(|n| n.has_out_edges()) {
            let mut properties = properties_object(storage);

            let first_dtn = storage
                .out_edges()
                .first()
                .and_then(|key| self.graph.edge_by_key(*key).ok())
                .and_then(|edge| self.graph.node(edge.target()));

            if let (Value::Object(map), Some(dtn)) = (&mut properties, first_dtn) {
                map.insert("dtn".to_string(), json!(dtn.ctrl_ip().unwrap_or_default()));
            }

            storages.push(properties);
        }

        storages
    }

    /// DTNs wired to the gateway.
    pub fn active_dtn_list(&self) -> Vec<Value> {
        self.graph.dtn_nodes().filter(|n| n.has_out_edges()).map(properties_object).collect()
    }

    pub fn active_dtn_topology(&self) -> DtnTopologyDto {
        let mut dtns = Vec::new();

        for dtn in self.graph.dtn_nodes().filter(|n| n.has_out_edges()) {
            let ls = dtn
                .in_edges()
                .iter()
                .filter_map(|key| self.graph.edge_by_key(*key).ok())
                .filter_map(|edge| self.graph.node(edge.source()))
                .map(|storage| AttachedStorageDto {
                    device: storage.base.name.clone(),
                    roots: storage.base.properties.get("root_folders").cloned().unwrap_or_else(|| json!([storage.root_folder().unwrap_or("/")])),
                    id: storage.id.to_string(),
                })
                .collect();

            dtns.push(DtnTopologyEntryDto { id: dtn.id.to_string(), label: dtn.base.name.clone(), ls });
        }

        DtnTopologyDto { dtns }
    }

    /// DTNs reachable from a storage, in edge order.
    pub fn storage_connected_dtns(&self, storage_id: &str) -> Result<Vec<DtnSummaryDto>> {
        let storage = self.graph.storage_node(storage_id)?;
        let mut dtns = Vec::new();

        for key in storage.out_edges() {
            let edge = self.graph.edge_by_key(*key)?;
            if let Some(dtn) = self.graph.node(edge.target()) {
                dtns.push(DtnSummaryDto {
                    id: dtn.id.to_string(),
                    name: dtn.base.name.clone(),
                    ctrl_ip: dtn.ctrl_ip().unwrap_or_default().to_string(),
                    queue: dtn.base.queue.clone(),
                });
            }
        }

        Ok(dtns)
    }

    /// Queue of the agent owning a node.
    pub fn node_queue_name(&self, node_id: &str) -> Result<String> {
        Ok(self.graph.get_node(node_id)?.base.queue.clone())
    }

    pub fn primary_dtn(&self, storage_id: &str) -> Result<Option<NodeId>> {
        Ok(self.graph.storage_node(storage_id)?.primary_dtn().cloned())
    }

    pub fn summary(&self) -> GraphSummary {
        self.graph.summary()
    }
}

fn properties_object(node: &Node) -> Value {
    match &node.base.properties {
        Value::Object(map) => Value::Object(map.clone()),
        _ => json!({ "id": node.id.to_string(), "name": node.base.name }),
    }
}

use slotmap::new_key_type;

use crate::domain::resource::node::NodeSlot;
use crate::domain::resource::resource_base::ResourceBase;
use crate::domain::utils::id::EdgeId;

new_key_type! {
    pub struct EdgeKey;
}

/// Directed capacity-bearing link between two nodes. Endpoints never change after creation.
#[derive(Debug, Clone)]
pub struct Edge {
    pub id: EdgeId,
    pub base: ResourceBase,
    source: NodeSlot,
    target: NodeSlot,
}

impl Edge {
    pub fn new(source: NodeSlot, target: NodeSlot, capacity: f64) -> Self {
        let mut base = ResourceBase::new("", capacity);
        base.connected = true;

        Self { id: EdgeId::generate(), base, source, target }
    }

    pub fn source(&self) -> &NodeSlot {
        &self.source
    }

    pub fn target(&self) -> &NodeSlot {
        &self.target
    }

    pub fn connects(&self, source: &NodeSlot, target: &NodeSlot) -> bool {
        &self.source == source && &self.target == target
    }
}

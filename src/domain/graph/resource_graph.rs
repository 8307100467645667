use serde::Serialize;
use slotmap::SlotMap;
use std::collections::BTreeMap;
use std::fmt;

use crate::domain::resource::edge::{Edge, EdgeKey};
use crate::domain::resource::node::{Node, NodeSlot, Role};
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

/// Identifier under which the gateway is addressed by callers.
pub const GATEWAY_ID: &str = "gateway";

/// Node/edge counts, logged after every topology change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GraphSummary {
    pub general_nodes: usize,
    pub dtns: usize,
    pub storages: usize,
    pub edges: usize,
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "general nodes = {}, dtns = {}, storages = {}, edges = {}", self.general_nodes, self.dtns, self.storages, self.edges)
    }
}

/// Typed directed graph of the physical transfer topology.
///
/// * **Nodes**: storages and DTNs keyed by their module id, plus three named
///   singleton slots (gateway, launcher agent, SDN agent).
/// * **Edges**: an arena of directed links. Nodes refer to edges by `EdgeKey`,
///   edges refer to nodes by `NodeSlot`; nothing holds a direct reference.
///
/// Removing a node always removes every edge touching it first, so an edge can
/// never point at a node that is gone.
#[derive(Debug, Default)]
pub struct ResourceGraph {
    storage_nodes: BTreeMap<NodeId, Node>,
    dtn_nodes: BTreeMap<NodeId, Node>,

    gateway: Option<Node>,
    launcher: Option<Node>,
    sdn: Option<Node>,

    edges: SlotMap<EdgeKey, Edge>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    //----------------
    // --- Testers ---
    //----------------
    pub fn has_node(&self, id: &str) -> bool {
        self.locate(id).is_some()
    }

    pub fn has_storage_node(&self, id: &str) -> bool {
        self.storage_nodes.contains_key(&NodeId::new(id))
    }

    pub fn has_dtn_node(&self, id: &str) -> bool {
        self.dtn_nodes.contains_key(&NodeId::new(id))
    }

    /// True if `id` is the external id of one of the singleton roles.
    pub fn has_general_node(&self, id: &str) -> bool {
        [&self.gateway, &self.launcher, &self.sdn].into_iter().flatten().any(|node| node.id.as_str() == id)
    }

    pub fn has_gateway(&self) -> bool {
        self.gateway.is_some()
    }

    pub fn has_launcher(&self) -> bool {
        self.launcher.is_some()
    }

    pub fn has_sdn(&self) -> bool {
        self.sdn.is_some()
    }

    pub fn has_edge(&self, src_node_id: &str, dst_node_id: &str) -> bool {
        self.find_edge(src_node_id, dst_node_id).is_some()
    }

    //----------------
    // --- Lookups ---
    //----------------

    /// Resolves an external id to the slot of its node. Storages win over DTNs,
    /// DTNs over the singleton roles.
    pub fn locate(&self, id: &str) -> Option<NodeSlot> {
        let node_id = NodeId::new(id);

        if self.storage_nodes.contains_key(&node_id) {
            return Some(NodeSlot::Storage(node_id));
        }
        if self.dtn_nodes.contains_key(&node_id) {
            return Some(NodeSlot::Dtn(node_id));
        }

        [(&self.gateway, Role::Gateway), (&self.launcher, Role::Launcher), (&self.sdn, Role::Sdn)]
            .into_iter()
            .find(|(slot, _)| slot.as_ref().is_some_and(|node| node.id == node_id))
            .map(|(_, role)| NodeSlot::General(role))
    }

    pub fn node(&self, slot: &NodeSlot) -> Option<&Node> {
        match slot {
            NodeSlot::Storage(id) => self.storage_nodes.get(id),
            NodeSlot::Dtn(id) => self.dtn_nodes.get(id),
            NodeSlot::General(role) => self.role_slot(*role).as_ref(),
        }
    }

    pub fn node_mut(&mut self, slot: &NodeSlot) -> Option<&mut Node> {
        match slot {
            NodeSlot::Storage(id) => self.storage_nodes.get_mut(id),
            NodeSlot::Dtn(id) => self.dtn_nodes.get_mut(id),
            NodeSlot::General(role) => self.role_slot_mut(*role).as_mut(),
        }
    }

    pub fn get_node(&self, id: &str) -> Result<&Node> {
        self.locate(id).and_then(|slot| self.node(&slot)).ok_or_else(|| Error::not_found("node", id))
    }

    pub fn storage_node(&self, id: &str) -> Result<&Node> {
        self.storage_nodes.get(&NodeId::new(id)).ok_or_else(|| Error::not_found("storage node", id))
    }

    pub fn storage_node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.storage_nodes.get_mut(&NodeId::new(id)).ok_or_else(|| Error::not_found("storage node", id))
    }

    pub fn dtn_node(&self, id: &str) -> Result<&Node> {
        self.dtn_nodes.get(&NodeId::new(id)).ok_or_else(|| Error::not_found("dtn node", id))
    }

    pub fn dtn_node_mut(&mut self, id: &str) -> Result<&mut Node> {
        self.dtn_nodes.get_mut(&NodeId::new(id)).ok_or_else(|| Error::not_found("dtn node", id))
    }

    pub fn gateway(&self) -> Result<&Node> {
        self.gateway.as_ref().ok_or_else(|| Error::not_found("gateway node", GATEWAY_ID))
    }

    pub fn gateway_mut(&mut self) -> Result<&mut Node> {
        self.gateway.as_mut().ok_or_else(|| Error::not_found("gateway node", GATEWAY_ID))
    }

    pub fn launcher(&self) -> Result<&Node> {
        self.launcher.as_ref().ok_or_else(|| Error::not_found("launcher node", "launcher"))
    }

    pub fn sdn(&self) -> Result<&Node> {
        self.sdn.as_ref().ok_or_else(|| Error::not_found("sdn node", "sdn"))
    }

    pub fn storage_nodes(&self) -> impl Iterator<Item = &Node> {
        self.storage_nodes.values()
    }

    pub fn dtn_nodes(&self) -> impl Iterator<Item = &Node> {
        self.dtn_nodes.values()
    }

    pub fn find_edge(&self, src_node_id: &str, dst_node_id: &str) -> Option<EdgeKey> {
        let source = self.locate(src_node_id)?;
        let target = self.locate(dst_node_id)?;
        self.find_edge_between(&source, &target)
    }

    fn find_edge_between(&self, source: &NodeSlot, target: &NodeSlot) -> Option<EdgeKey> {
        let node = self.node(source)?;
        node.out_edges().iter().copied().find(|key| self.edges.get(*key).is_some_and(|edge| edge.connects(source, target)))
    }

    pub fn edge(&self, src_node_id: &str, dst_node_id: &str) -> Result<&Edge> {
        self.find_edge(src_node_id, dst_node_id)
            .and_then(|key| self.edges.get(key))
            .ok_or_else(|| Error::not_found("edge", format!("{} -> {}", src_node_id, dst_node_id)))
    }

    pub fn edge_by_key(&self, key: EdgeKey) -> Result<&Edge> {
        self.edges.get(key).ok_or_else(|| Error::not_found("edge", format!("{:?}", key)))
    }

    pub fn edge_by_key_mut(&mut self, key: EdgeKey) -> Result<&mut Edge> {
        self.edges.get_mut(key).ok_or_else(|| Error::not_found("edge", format!("{:?}", key)))
    }

    pub fn edges(&self) -> impl Iterator<Item = (EdgeKey, &Edge)> {
        self.edges.iter()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// The single DTN -> gateway edge of a DTN.
    ///
    /// A DTN with zero or several outgoing edges means the topology was built
    /// wrongly; this is reported as an invariant violation.
    pub fn dtn_gateway_edge(&self, dtn: &Node) -> Result<EdgeKey> {
        match dtn.out_edges() {
            [edge] => Ok(*edge),
            edges => Err(Error::InvariantViolation(format!("dtn {} has {} outgoing edges, expected exactly 1 (to the gateway)", dtn.id, edges.len()))),
        }
    }

    //----------------
    // --- Setters ---
    //----------------

    /// Inserts a storage node, or returns the existing one with that id.
    pub fn add_storage_node(&mut self, id: &str, name: &str, capacity: f64) -> &mut Node {
        let node_id = NodeId::new(id);
        self.storage_nodes.entry(node_id.clone()).or_insert_with(|| Node::storage(node_id, name, capacity))
    }

    /// Inserts a DTN node, or returns the existing one with that id.
    pub fn add_dtn_node(&mut self, id: &str, name: &str, capacity: f64) -> &mut Node {
        let node_id = NodeId::new(id);
        self.dtn_nodes.entry(node_id.clone()).or_insert_with(|| Node::dtn(node_id, name, capacity))
    }

    pub fn add_gateway(&mut self) -> &mut Node {
        self.gateway.get_or_insert_with(|| Node::general(NodeId::new(GATEWAY_ID), Role::Gateway))
    }

    pub fn add_launcher(&mut self, rid: &str, queue: &str) -> &mut Node {
        self.add_agent(Role::Launcher, rid, queue)
    }

    pub fn add_sdn(&mut self, rid: &str, queue: &str) -> &mut Node {
        self.add_agent(Role::Sdn, rid, queue)
    }

    fn add_agent(&mut self, role: Role, rid: &str, queue: &str) -> &mut Node {
        let node = self.role_slot_mut(role).get_or_insert_with(|| Node::general(NodeId::new(rid), role));
        node.base.queue = queue.to_string();
        node
    }

    /// Adds the directed edge `src -> dst`.
    ///
    /// Both endpoints have to exist. An already existing edge for the same ordered
    /// pair is returned as is instead of creating a duplicate.
    pub fn add_edge(&mut self, src_node_id: &str, dst_node_id: &str, capacity: f64) -> Result<EdgeKey> {
        let source = self.locate(src_node_id).ok_or_else(|| Error::not_found("node", src_node_id))?;
        let target = self.locate(dst_node_id).ok_or_else(|| Error::not_found("node", dst_node_id))?;

        Ok(self.add_edge_between(source, target, capacity))
    }

    /// Adds the edge from a DTN to the gateway.
    pub fn add_edge_to_gateway(&mut self, src_node_id: &str, capacity: f64) -> Result<EdgeKey> {
        if !self.has_dtn_node(src_node_id) {
            return Err(Error::not_found("dtn node", src_node_id));
        }
        if !self.has_gateway() {
            return Err(Error::not_found("gateway node", GATEWAY_ID));
        }

        Ok(self.add_edge_between(NodeSlot::Dtn(NodeId::new(src_node_id)), NodeSlot::General(Role::Gateway), capacity))
    }

    fn add_edge_between(&mut self, source: NodeSlot, target: NodeSlot, capacity: f64) -> EdgeKey {
        if let Some(existing) = self.find_edge_between(&source, &target) {
            log::warn!("Adding an already existing edge, from {:?} to {:?}", source, target);
            return existing;
        }

        let key = self.edges.insert(Edge::new(source.clone(), target.clone(), capacity));

        if let Some(node) = self.node_mut(&source) {
            node.add_out_edge(key);
        }
        if let Some(node) = self.node_mut(&target) {
            node.add_in_edge(key);
        }

        key
    }

    //----------------
    // --- Removal ---
    //----------------

    /// Removes a node and every edge touching it.
    ///
    /// Launcher and SDN agents are found by their module id. Unknown ids are
    /// logged and ignored; the gateway can never be removed.
    pub fn del_node(&mut self, id: &str) -> Result<()> {
        if id == GATEWAY_ID {
            return Err(Error::GatewayRemoval);
        }

        match self.locate(id) {
            Some(NodeSlot::General(Role::Gateway)) => Err(Error::GatewayRemoval),
            Some(slot) => {
                self.remove_slot(&slot);
                Ok(())
            }
            None => {
                log::info!("del_node: cannot find node id {}", id);
                Ok(())
            }
        }
    }

    pub fn del_launcher(&mut self) {
        if !self.has_launcher() {
            log::warn!("del_launcher: no launcher available.");
            return;
        }
        self.remove_slot(&NodeSlot::General(Role::Launcher));
    }

    pub fn del_sdn(&mut self) {
        if !self.has_sdn() {
            log::warn!("del_sdn: no SDN agent available.");
            return;
        }
        self.remove_slot(&NodeSlot::General(Role::Sdn));
    }

    fn remove_slot(&mut self, slot: &NodeSlot) {
        let Some(node) = self.node(slot) else {
            return;
        };
        let in_edges = node.in_edges().to_vec();
        let out_edges = node.out_edges().to_vec();
        let sources: Vec<NodeSlot> = in_edges.iter().filter_map(|key| self.edges.get(*key)).map(|edge| edge.source().clone()).collect();

        for key in in_edges {
            if let Some(edge) = self.edges.remove(key) {
                if let Some(source) = self.node_mut(edge.source()) {
                    source.del_out_edge(key);
                }
            }
        }

        for key in out_edges {
            if let Some(edge) = self.edges.remove(key) {
                if let Some(target) = self.node_mut(edge.target()) {
                    target.del_in_edge(key);
                }
            }
        }

        match slot {
            NodeSlot::Storage(id) => {
                self.storage_nodes.remove(id);
            }
            NodeSlot::Dtn(id) => {
                self.dtn_nodes.remove(id);
                for source in &sources {
                    self.repoint_primary_dtn(source, id);
                }
            }
            NodeSlot::General(role) => {
                self.role_slot_mut(*role).take();
            }
        }
    }

    /// A storage whose primary DTN was `removed` falls back to the DTN it was
    /// most recently wired to among the remaining ones, or to none.
    fn repoint_primary_dtn(&mut self, storage: &NodeSlot, removed: &NodeId) {
        let Some(node) = self.node(storage) else {
            return;
        };
        if node.primary_dtn() != Some(removed) {
            return;
        }

        let fallback = node.out_edges().iter().rev().filter_map(|key| self.edges.get(*key)).find_map(|edge| match edge.target() {
            NodeSlot::Dtn(id) => Some(id.clone()),
            _ => None,
        });

        if let Some(node) = self.node_mut(storage) {
            node.replace_primary_dtn(fallback);
        }
    }

    /// Drops every node and edge, the gateway included.
    pub fn reset(&mut self) {
        self.storage_nodes.clear();
        self.dtn_nodes.clear();
        self.gateway = None;
        self.launcher = None;
        self.sdn = None;
        self.edges.clear();
    }

    pub fn summary(&self) -> GraphSummary {
        GraphSummary {
            general_nodes: [&self.gateway, &self.launcher, &self.sdn].into_iter().flatten().count(),
            dtns: self.dtn_nodes.len(),
            storages: self.storage_nodes.len(),
            edges: self.edges.len(),
        }
    }

    fn role_slot(&self, role: Role) -> &Option<Node> {
        match role {
            Role::Gateway => &self.gateway,
            Role::Launcher => &self.launcher,
            Role::Sdn => &self.sdn,
        }
    }

    fn role_slot_mut(&mut self, role: Role) -> &mut Option<Node> {
        match role {
            Role::Gateway => &mut self.gateway,
            Role::Launcher => &mut self.launcher,
            Role::Sdn => &mut self.sdn,
        }
    }
}

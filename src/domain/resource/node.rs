use crate::domain::resource::edge::EdgeKey;
use crate::domain::resource::resource_base::ResourceBase;
use crate::domain::utils::id::NodeId;

/// Control-plane roles that exist at most once in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Gateway,
    Launcher,
    Sdn,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Gateway => "Gateway",
            Role::Launcher => "Launcher Agent",
            Role::Sdn => "SDN Agent",
        }
    }
}

/// Where a node lives inside the graph. Edges store their endpoints this way,
/// which keeps the gateway distinct from any module that happens to share its id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeSlot {
    Storage(NodeId),
    Dtn(NodeId),
    General(Role),
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    Storage {
        root_folder: String,
        /// DTN most recently wired to this storage.
        primary_dtn: Option<NodeId>,
    },
    Dtn {
        ctrl_ip: String,
    },
    General(Role),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub base: ResourceBase,
    pub kind: NodeKind,
    in_edges: Vec<EdgeKey>,
    out_edges: Vec<EdgeKey>,
}

impl Node {
    pub fn new(id: NodeId, name: impl Into<String>, capacity: f64, kind: NodeKind) -> Self {
        Self { id, base: ResourceBase::new(name, capacity), kind, in_edges: Vec::new(), out_edges: Vec::new() }
    }

    pub fn storage(id: NodeId, name: impl Into<String>, capacity: f64) -> Self {
        Self::new(id, name, capacity, NodeKind::Storage { root_folder: "/".to_string(), primary_dtn: None })
    }

    pub fn dtn(id: NodeId, name: impl Into<String>, capacity: f64) -> Self {
        Self::new(id, name, capacity, NodeKind::Dtn { ctrl_ip: String::new() })
    }

    pub fn general(id: NodeId, role: Role) -> Self {
        Self::new(id, role.display_name(), 0.0, NodeKind::General(role))
    }

    pub fn slot(&self) -> NodeSlot {
        match &self.kind {
            NodeKind::Storage { .. } => NodeSlot::Storage(self.id.clone()),
            NodeKind::Dtn { .. } => NodeSlot::Dtn(self.id.clone()),
            NodeKind::General(role) => NodeSlot::General(*role),
        }
    }

    pub fn add_in_edge(&mut self, edge: EdgeKey) {
        self.in_edges.push(edge);
        self.base.connected = true;
    }

    pub fn add_out_edge(&mut self, edge: EdgeKey) {
        self.out_edges.push(edge);
        self.base.connected = true;
    }

    pub fn del_in_edge(&mut self, edge: EdgeKey) {
        self.in_edges.retain(|e| *e != edge);
    }

    pub fn del_out_edge(&mut self, edge: EdgeKey) {
        self.out_edges.retain(|e| *e != edge);
    }

    pub fn in_edges(&self) -> &[EdgeKey] {
        &self.in_edges
    }

    pub fn out_edges(&self) -> &[EdgeKey] {
        &self.out_edges
    }

    pub fn has_in_edges(&self) -> bool {
        !self.in_edges.is_empty()
    }

    pub fn has_out_edges(&self) -> bool {
        !self.out_edges.is_empty()
    }

    pub fn root_folder(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Storage { root_folder, .. } => Some(root_folder),
            _ => None,
        }
    }

    pub fn set_root_folder(&mut self, folder: impl Into<String>) {
        if let NodeKind::Storage { root_folder, .. } = &mut self.kind {
            *root_folder = folder.into();
        }
    }

    pub fn primary_dtn(&self) -> Option<&NodeId> {
        match &self.kind {
            NodeKind::Storage { primary_dtn, .. } => primary_dtn.as_ref(),
            _ => None,
        }
    }

    pub fn set_primary_dtn(&mut self, dtn: NodeId) {
        if let NodeKind::Storage { primary_dtn, .. } = &mut self.kind {
            *primary_dtn = Some(dtn);
        }
    }

    pub fn replace_primary_dtn(&mut self, dtn: Option<NodeId>) {
        if let NodeKind::Storage { primary_dtn, .. } = &mut self.kind {
            *primary_dtn = dtn;
        }
    }

    pub fn ctrl_ip(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Dtn { ctrl_ip } => Some(ctrl_ip),
            _ => None,
        }
    }

    pub fn set_ctrl_ip(&mut self, ip: impl Into<String>) {
        if let NodeKind::Dtn { ctrl_ip } = &mut self.kind {
            *ctrl_ip = ip.into();
        }
    }
}

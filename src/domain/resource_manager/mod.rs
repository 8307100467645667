use std::sync::Arc;

use crate::config::BrokerConfig;
use crate::domain::graph::resource_graph::ResourceGraph;
use crate::domain::job::job_ledger::JobLedger;
use crate::domain::resource::node::Node;
use crate::domain::store::site_store::SiteStore;
use crate::error::Result;

pub mod admission;
pub mod construction;
pub mod job_materialization;
pub mod path_selection;
pub mod topology_queries;

#[cfg(test)]
mod test_resource_manager;

/// Target of the structured admission events.
pub const ADMISSION_TARGET: &str = "dtn_broker::admission";

/// Orchestrates the resource graph and the job ledger.
///
/// All operations take `&self`/`&mut self` and do no locking of their own: the
/// manager is meant to be owned by a single writer (see
/// [`ResourceBroker`](crate::domain::broker::ResourceBroker)), which makes a probe
/// and the allocation that follows it one atomic step for every caller.
#[derive(Debug)]
pub struct ResourceManager {
    graph: ResourceGraph,
    ledger: JobLedger,
    store: Arc<dyn SiteStore>,
    config: BrokerConfig,
}

impl ResourceManager {
    /// Creates a manager with an empty topology (gateway only).
    pub fn new(store: Arc<dyn SiteStore>, config: BrokerConfig) -> Self {
        let mut graph = ResourceGraph::new();
        graph.add_gateway();

        Self { graph, ledger: JobLedger::new(), store, config }
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// Direct topology access for callers that wire nodes by hand.
    pub fn graph_mut(&mut self) -> &mut ResourceGraph {
        &mut self.graph
    }

    pub fn ledger(&self) -> &JobLedger {
        &self.ledger
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }

    pub fn has_launcher(&self) -> bool {
        self.graph.has_launcher()
    }

    pub fn has_sdn(&self) -> bool {
        self.graph.has_sdn()
    }

    pub fn launcher(&self) -> Result<&Node> {
        self.graph.launcher()
    }

    pub fn sdn(&self) -> Result<&Node> {
        self.graph.sdn()
    }
}

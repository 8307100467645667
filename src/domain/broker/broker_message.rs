use actix::prelude::Message;
use serde::Serialize;

use crate::api::module_dto::ModuleDto;
use crate::api::topology_dto::DtnTopologyDto;
use crate::domain::graph::resource_graph::GraphSummary;
use crate::domain::job::job::JobState;
use crate::domain::resource_manager::admission::AdmissionStatus;
use crate::domain::resource_manager::job_materialization::{FlowAssignment, JobRequest, TransferRequest};
use crate::domain::resource_manager::path_selection::{DtnFragment, FragmentMatch};
use crate::domain::utils::id::JobId;
use crate::error::Result;

/// Rebuild the graph from the site store.
#[derive(Message)]
#[rtype(result = "Result<GraphSummary>")]
pub struct Construct;

/// An agent joined with these modules.
#[derive(Message)]
#[rtype(result = "Result<GraphSummary>")]
pub struct AddModules {
    pub queue: String,
    pub modules: Vec<ModuleDto>,
}

/// An agent left.
#[derive(Message)]
#[rtype(result = "Result<GraphSummary>")]
pub struct DelModules {
    pub modules: Vec<ModuleDto>,
}

#[derive(Message)]
#[rtype(result = "Result<AdmissionStatus>")]
pub struct ProbePathRate {
    pub storage: String,
    pub rate: f64,
}

#[derive(Message)]
#[rtype(result = "Result<Vec<DtnFragment>>")]
pub struct QueryPathDtns {
    pub storage: String,
    pub rate: f64,
}

#[derive(Message)]
#[rtype(result = "Result<Vec<FragmentMatch>>")]
pub struct MatchPathDtns {
    pub src: Vec<DtnFragment>,
    pub dst: Vec<DtnFragment>,
}

#[derive(Message)]
#[rtype(result = "Result<JobId>")]
pub struct CreateJob(pub JobRequest);

#[derive(Message)]
#[rtype(result = "Result<Vec<FlowAssignment>>")]
pub struct AllocateTransfer(pub TransferRequest);

#[derive(Message)]
#[rtype(result = "Result<()>")]
pub struct UpdateJobState {
    pub job_id: JobId,
    pub state: JobState,
}

#[derive(Message)]
#[rtype(result = "Result<TopologySnapshot>")]
pub struct GetTopology;

/// Read-only view of the topology, taken between two mutations.
#[derive(Debug, Clone, Serialize)]
pub struct TopologySnapshot {
    pub summary: GraphSummary,
    pub storages: Vec<serde_json::Value>,
    pub dtns: Vec<serde_json::Value>,
    pub topology: DtnTopologyDto,
    pub launcher_queue: Option<String>,
    pub sdn_queue: Option<String>,
}

use actix::dev::ToEnvelope;
use actix::prelude::{Actor, Addr, Handler, Message};

use crate::api::module_dto::ModuleDto;
use crate::domain::broker::ResourceBroker;
use crate::domain::broker::broker_message::{
    AddModules, AllocateTransfer, Construct, CreateJob, DelModules, GetTopology, MatchPathDtns, ProbePathRate, QueryPathDtns, TopologySnapshot, UpdateJobState,
};
use crate::domain::graph::resource_graph::GraphSummary;
use crate::domain::job::job::JobState;
use crate::domain::resource_manager::ResourceManager;
use crate::domain::resource_manager::admission::AdmissionStatus;
use crate::domain::resource_manager::job_materialization::{FlowAssignment, JobRequest, TransferRequest};
use crate::domain::resource_manager::path_selection::{DtnFragment, FragmentMatch};
use crate::domain::utils::id::JobId;
use crate::error::Result;

/// Cloneable front of a running [`ResourceBroker`].
///
/// Must be started inside an actix system.
#[derive(Clone)]
pub struct BrokerHandle {
    addr: Addr<ResourceBroker>,
}

impl BrokerHandle {
    pub fn start(manager: ResourceManager) -> Self {
        Self { addr: ResourceBroker::new(manager).start() }
    }

    pub fn addr(&self) -> &Addr<ResourceBroker> {
        &self.addr
    }

    async fn request<M, T>(&self, msg: M) -> Result<T>
    where
        M: Message<Result = Result<T>> + Send + 'static,
        T: Send + 'static,
        ResourceBroker: Handler<M>,
        <ResourceBroker as Actor>::Context: ToEnvelope<ResourceBroker, M>,
    {
        self.addr.send(msg).await?
    }

    pub async fn construct(&self) -> Result<GraphSummary> {
        self.request(Construct).await
    }

    pub async fn add_modules(&self, queue: impl Into<String>, modules: Vec<ModuleDto>) -> Result<GraphSummary> {
        self.request(AddModules { queue: queue.into(), modules }).await
    }

    pub async fn del_modules(&self, modules: Vec<ModuleDto>) -> Result<GraphSummary> {
        self.request(DelModules { modules }).await
    }

    pub async fn probe_path_rate(&self, storage: impl Into<String>, rate: f64) -> Result<AdmissionStatus> {
        self.request(ProbePathRate { storage: storage.into(), rate }).await
    }

    pub async fn query_path_dtns(&self, storage: impl Into<String>, rate: f64) -> Result<Vec<DtnFragment>> {
        self.request(QueryPathDtns { storage: storage.into(), rate }).await
    }

    pub async fn match_path_dtns(&self, src: Vec<DtnFragment>, dst: Vec<DtnFragment>) -> Result<Vec<FragmentMatch>> {
        self.request(MatchPathDtns { src, dst }).await
    }

    pub async fn create_job(&self, request: JobRequest) -> Result<JobId> {
        self.request(CreateJob(request)).await
    }

    pub async fn allocate_transfer(&self, request: TransferRequest) -> Result<Vec<FlowAssignment>> {
        self.request(AllocateTransfer(request)).await
    }

    pub async fn update_job_state(&self, job_id: JobId, state: JobState) -> Result<()> {
        self.request(UpdateJobState { job_id, state }).await
    }

    pub async fn topology(&self) -> Result<TopologySnapshot> {
        self.request(GetTopology).await
    }
}

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::api::reservation_dto::ReservationRecord;
use crate::domain::job::job::{JobGroup, JobState};
use crate::domain::resource_manager::ResourceManager;
use crate::domain::resource_manager::path_selection::DtnFragment;
use crate::domain::utils::id::{JobId, NodeId, RawJobId};
use crate::error::{Error, Result};

/// One stream to reserve on a storage -> DTN -> gateway path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRequest {
    pub src_storage: NodeId,
    pub src_dtn: NodeId,
    pub rate: f64,
    pub is_extra: bool,
    #[serde(default)]
    pub raw_job: Option<RawJobId>,
    #[serde(default)]
    pub dst_storage: Option<NodeId>,
    #[serde(default)]
    pub dst_dtn: Option<NodeId>,
}

impl JobRequest {
    pub fn new(src_storage: impl Into<NodeId>, src_dtn: impl Into<NodeId>, rate: f64, is_extra: bool) -> Self {
        Self { src_storage: src_storage.into(), src_dtn: src_dtn.into(), rate, is_extra, raw_job: None, dst_storage: None, dst_dtn: None }
    }

    pub fn with_raw_job(mut self, raw_job: impl Into<RawJobId>) -> Self {
        self.raw_job = Some(raw_job.into());
        self
    }

    pub fn with_destination(mut self, dst_storage: impl Into<NodeId>, dst_dtn: impl Into<NodeId>) -> Self {
        self.dst_storage = Some(dst_storage.into());
        self.dst_dtn = Some(dst_dtn.into());
        self
    }
}

/// A whole user transfer: the rate to read from `src_storage`, and how the
/// receiving site split it over its DTNs (empty for a local-only transfer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(default)]
    pub raw_job: Option<RawJobId>,
    pub src_storage: NodeId,
    #[serde(default)]
    pub dst_storage: Option<NodeId>,
    pub rate: f64,
    pub is_extra: bool,
    #[serde(default)]
    pub dst_fragments: Vec<DtnFragment>,
}

/// A stream created for a transfer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowAssignment {
    pub job_id: JobId,
    pub src_dtn: NodeId,
    pub dst_dtn: Option<NodeId>,
    pub rate: f64,
}

impl ResourceManager {
    /// Reserves `request.rate` on the storage, its DTN, the gateway and both
    /// edges of the path, then persists the stream record.
    ///
    /// Every element of the path is resolved before the job is created, so a
    /// failing request leaves nothing behind. A failing persist is logged only.
    pub fn create_job(&mut self, request: &JobRequest) -> Result<JobId> {
        let storage_id = request.src_storage.as_str();
        let dtn_id = request.src_dtn.as_str();

        self.graph.storage_node(storage_id)?;
        self.graph.gateway()?;
        let sd_edge = self.graph.find_edge(storage_id, dtn_id).ok_or_else(|| Error::not_found("edge", format!("{} -> {}", storage_id, dtn_id)))?;
        let dg_edge = self.graph.dtn_gateway_edge(self.graph.dtn_node(dtn_id)?)?;

        let group = JobGroup::from_extra_flag(request.is_extra);
        let job_key = self.ledger.create(group, JobState::Running, request.rate);
        let job_id = self.ledger.get_by_key(job_key)?.id.clone();

        self.graph.storage_node_mut(storage_id)?.base.add_job(job_key);
        self.graph.dtn_node_mut(dtn_id)?.base.add_job(job_key);
        self.graph.gateway_mut()?.base.add_job(job_key);
        self.graph.edge_by_key_mut(sd_edge)?.base.add_job(job_key);
        self.graph.edge_by_key_mut(dg_edge)?.base.add_job(job_key);

        let record = ReservationRecord {
            job_id: job_id.to_string(),
            raw_job: request.raw_job.as_ref().map(|id| id.to_string()),
            src_storage: storage_id.to_string(),
            dst_storage: request.dst_storage.as_ref().map(|id| id.to_string()),
            src_dtn: dtn_id.to_string(),
            dst_dtn: request.dst_dtn.as_ref().map(|id| id.to_string()),
            rate: request.rate,
            group,
            state: JobState::Running,
            created_at: Utc::now(),
        };

        if let Err(e) = self.store.persist_reservation(&record) {
            log::error!("Failed to persist reservation of job {}: {}", job_id, e);
        }
        log::info!("Job {} created: {} via {} at {} ({:?})", job_id, storage_id, dtn_id, request.rate, group);

        Ok(job_id)
    }

    /// Runs a whole transfer through path selection, matching and job creation.
    ///
    /// Returns no flows when the source side rejected the request.
    pub fn allocate_transfer(&mut self, request: &TransferRequest) -> Result<Vec<FlowAssignment>> {
        let src_storage = request.src_storage.as_str();
        let src_fragments = self.query_path_dtns(src_storage, request.rate)?;

        if src_fragments.is_empty() {
            return Ok(Vec::new());
        }

        let pairs: Vec<(NodeId, Option<NodeId>, f64)> = if request.dst_fragments.is_empty() {
            src_fragments.into_iter().map(|f| (f.dtn, None, f.rate)).collect()
        } else {
            self.match_path_dtns(&src_fragments, &request.dst_fragments)?
                .into_iter()
                .map(|m| (m.src_dtn, Some(m.dst_dtn), m.rate))
                .collect()
        };

        let mut flows = Vec::with_capacity(pairs.len());
        for (src_dtn, dst_dtn, rate) in pairs {
            let job_request = JobRequest {
                src_storage: request.src_storage.clone(),
                src_dtn: src_dtn.clone(),
                rate,
                is_extra: request.is_extra,
                raw_job: request.raw_job.clone(),
                dst_storage: request.dst_storage.clone(),
                dst_dtn: dst_dtn.clone(),
            };

            let job_id = self.create_job(&job_request)?;
            flows.push(FlowAssignment { job_id, src_dtn, dst_dtn, rate });
        }

        log::info!("Transfer from {} at {} allocated as {} flows", src_storage, request.rate, flows.len());
        Ok(flows)
    }

    /// Applies a state change reported for a job and persists it.
    pub fn update_job_state(&mut self, job_id: &JobId, state: JobState) -> Result<()> {
        self.ledger.set_state_by_id(job_id, state)?;

        if let Err(e) = self.store.persist_job_state(job_id, state) {
            log::error!("Failed to persist state of job {}: {}", job_id, e);
        }
        Ok(())
    }
}

use crate::domain::broker::ResourceBroker;
use crate::domain::broker::broker_message::{
    AddModules, AllocateTransfer, Construct, CreateJob, DelModules, GetTopology, MatchPathDtns, ProbePathRate, QueryPathDtns, TopologySnapshot, UpdateJobState,
};
use crate::domain::graph::resource_graph::GraphSummary;
use crate::domain::resource_manager::admission::AdmissionStatus;
use crate::domain::resource_manager::job_materialization::FlowAssignment;
use crate::domain::resource_manager::path_selection::{DtnFragment, FragmentMatch};
use crate::domain::utils::id::JobId;
use crate::error::Result;

use actix::prelude::Handler;

impl Handler<Construct> for ResourceBroker {
    type Result = Result<GraphSummary>;
    fn handle(&mut self, _msg: Construct, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.construct()
    }
}

impl Handler<AddModules> for ResourceBroker {
    type Result = Result<GraphSummary>;
    fn handle(&mut self, msg: AddModules, _ctx: &mut Self::Context) -> Self::Result {
        Ok(self.manager.add_modules(&msg.queue, &msg.modules))
    }
}

impl Handler<DelModules> for ResourceBroker {
    type Result = Result<GraphSummary>;
    fn handle(&mut self, msg: DelModules, _ctx: &mut Self::Context) -> Self::Result {
        Ok(self.manager.del_modules(&msg.modules))
    }
}

impl Handler<ProbePathRate> for ResourceBroker {
    type Result = Result<AdmissionStatus>;
    fn handle(&mut self, msg: ProbePathRate, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.probe_path_rate(&msg.storage, msg.rate, true)
    }
}

impl Handler<QueryPathDtns> for ResourceBroker {
    type Result = Result<Vec<DtnFragment>>;
    fn handle(&mut self, msg: QueryPathDtns, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.query_path_dtns(&msg.storage, msg.rate)
    }
}

impl Handler<MatchPathDtns> for ResourceBroker {
    type Result = Result<Vec<FragmentMatch>>;
    fn handle(&mut self, msg: MatchPathDtns, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.match_path_dtns(&msg.src, &msg.dst)
    }
}

impl Handler<CreateJob> for ResourceBroker {
    type Result = Result<JobId>;
    fn handle(&mut self, msg: CreateJob, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.create_job(&msg.0)
    }
}

impl Handler<AllocateTransfer> for ResourceBroker {
    type Result = Result<Vec<FlowAssignment>>;
    fn handle(&mut self, msg: AllocateTransfer, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.allocate_transfer(&msg.0)
    }
}

impl Handler<UpdateJobState> for ResourceBroker {
    type Result = Result<()>;
    fn handle(&mut self, msg: UpdateJobState, _ctx: &mut Self::Context) -> Self::Result {
        self.manager.update_job_state(&msg.job_id, msg.state)
    }
}

impl Handler<GetTopology> for ResourceBroker {
    type Result = Result<TopologySnapshot>;
    fn handle(&mut self, _msg: GetTopology, _ctx: &mut Self::Context) -> Self::Result {
        Ok(TopologySnapshot {
            summary: self.manager.summary(),
            storages: self.manager.active_storage_list(),
            dtns: self.manager.active_dtn_list(),
            topology: self.manager.active_dtn_topology(),
            launcher_queue: self.manager.launcher().ok().map(|node| node.base.queue.clone()),
            sdn_queue: self.manager.sdn().ok().map(|node| node.base.queue.clone()),
        })
    }
}

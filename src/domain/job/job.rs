use serde::{Deserialize, Serialize};

use crate::domain::utils::id::JobId;

/// Lifecycle state of a rate reservation.
///
/// Only `Running` jobs count towards the load of the nodes and edges they are
/// attached to. Terminal states (`Finished`, `Stopped`) are reported by the
/// staging layer; the engine itself only ever moves a job to `MarkedForPrealloc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobState {
    Running,
    Stopped,
    Finished,
    Reserved,
    /// Selected for preemption to free capacity for a higher-priority request.
    MarkedForPrealloc,
}

impl JobState {
    /// Numeric code used by the external stream records.
    pub fn code(self) -> i32 {
        match self {
            JobState::Running => 0,
            JobState::Stopped => 1,
            JobState::Finished => 2,
            JobState::Reserved => 3,
            JobState::MarkedForPrealloc => 4,
        }
    }
}

/// Priority class of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobGroup {
    /// Guaranteed rate, never preempted.
    Base,
    /// Best effort, may be preempted to admit other requests.
    Extra,
}

impl JobGroup {
    pub fn from_extra_flag(is_extra: bool) -> Self {
        if is_extra { JobGroup::Extra } else { JobGroup::Base }
    }

    pub fn code(self) -> i32 {
        match self {
            JobGroup::Base => 0,
            JobGroup::Extra => 1,
        }
    }
}

/// A reservation of `rate` on one storage -> DTN -> gateway path.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub group: JobGroup,
    pub state: JobState,
    pub rate: f64,
}

impl Job {
    pub fn new(id: JobId, group: JobGroup, state: JobState, rate: f64) -> Self {
        Self { id, group, state, rate }
    }

    pub fn is_running(&self) -> bool {
        self.state == JobState::Running
    }

    pub fn is_running_in(&self, group: JobGroup) -> bool {
        self.is_running() && self.group == group
    }
}

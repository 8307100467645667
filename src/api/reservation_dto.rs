use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::job::job::{JobGroup, JobState};

/// Stream record persisted when a job is materialized on a path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub job_id: String,
    /// The user transfer request this stream belongs to, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_job: Option<String>,
    pub src_storage: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_storage: Option<String>,
    pub src_dtn: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_dtn: Option<String>,
    pub rate: f64,
    pub group: JobGroup,
    pub state: JobState,
    pub created_at: DateTime<Utc>,
}

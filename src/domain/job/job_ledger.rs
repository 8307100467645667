use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

use crate::domain::job::job::{Job, JobGroup, JobState};
use crate::domain::utils::id::JobId;
use crate::error::{Error, Result};

new_key_type! {
    /// Internal handle of a job. Nodes and edges keep these, never the job itself.
    pub struct JobKey;
}

/// Sole owner of every in-flight job.
///
/// There is no removal: jobs live as long as the process, the external store
/// keeps the durable record and retires finished streams on its own.
#[derive(Debug, Default)]
pub struct JobLedger {
    /// Job storage.
    slots: SlotMap<JobKey, Job>,

    /// Lookup of the internal key by the external job id.
    id_index: HashMap<JobId, JobKey>,
}

impl JobLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a job with a freshly generated id.
    ///
    /// # Returns
    /// The internal key of the new job.
    pub fn create(&mut self, group: JobGroup, state: JobState, rate: f64) -> JobKey {
        let id = JobId::generate();
        let key = self.slots.insert(Job::new(id.clone(), group, state, rate));
        self.id_index.insert(id, key);
        key
    }

    pub fn get(&self, id: &JobId) -> Result<&Job> {
        let key = self.key_of(id)?;
        self.get_by_key(key)
    }

    pub fn get_by_key(&self, key: JobKey) -> Result<&Job> {
        self.slots.get(key).ok_or_else(|| Error::not_found("job", format!("{:?}", key)))
    }

    pub fn key_of(&self, id: &JobId) -> Result<JobKey> {
        self.id_index.get(id).copied().ok_or_else(|| Error::not_found("job", id.as_str()))
    }

    pub fn set_state(&mut self, key: JobKey, state: JobState) -> Result<()> {
        let job = self.slots.get_mut(key).ok_or_else(|| Error::not_found("job", format!("{:?}", key)))?;
        log::debug!("Job {} state {:?} -> {:?}", job.id, job.state, state);
        job.state = state;
        Ok(())
    }

    pub fn set_state_by_id(&mut self, id: &JobId, state: JobState) -> Result<()> {
        let key = self.key_of(id)?;
        self.set_state(key, state)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (JobKey, &Job)> {
        self.slots.iter()
    }
}

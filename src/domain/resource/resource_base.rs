use std::collections::BTreeSet;

use crate::domain::job::job::JobGroup;
use crate::domain::job::job_ledger::{JobKey, JobLedger};
use crate::error::{Error, Result};

/// State shared by every node and edge of the resource graph.
///
/// The jobs set only holds ledger keys. Load figures are always derived on demand
/// from the ledger, so a job changing state is reflected everywhere it is attached.
#[derive(Debug, Clone)]
pub struct ResourceBase {
    pub name: String,

    /// Metadata mirrored from the inventory or the registration message.
    pub properties: serde_json::Value,

    /// Rate capacity in bandwidth units.
    pub capacity: f64,

    pub connected: bool,

    /// Message queue the owning agent listens on (empty for edges).
    pub queue: String,

    jobs: BTreeSet<JobKey>,
}

impl ResourceBase {
    pub fn new(name: impl Into<String>, capacity: f64) -> Self {
        Self { name: name.into(), properties: serde_json::Value::Null, capacity, connected: false, queue: String::new(), jobs: BTreeSet::new() }
    }

    pub fn add_job(&mut self, job: JobKey) {
        self.jobs.insert(job);
    }

    pub fn del_job(&mut self, job: JobKey) {
        self.jobs.remove(&job);
    }

    pub fn jobs(&self) -> impl Iterator<Item = JobKey> + '_ {
        self.jobs.iter().copied()
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    fn sum_running(&self, ledger: &JobLedger, group: JobGroup) -> f64 {
        self.jobs.iter().filter_map(|key| ledger.get_by_key(*key).ok()).filter(|job| job.is_running_in(group)).map(|job| job.rate).sum()
    }

    /// Rate of running best-effort jobs.
    pub fn sum_extra(&self, ledger: &JobLedger) -> f64 {
        self.sum_running(ledger, JobGroup::Extra)
    }

    /// Rate of running guaranteed jobs.
    pub fn sum_base(&self, ledger: &JobLedger) -> f64 {
        self.sum_running(ledger, JobGroup::Base)
    }

    pub fn available_rate(&self, ledger: &JobLedger) -> f64 {
        self.capacity - self.sum_extra(ledger) - self.sum_base(ledger)
    }

    /// Rate left once every running extra job is gone.
    pub fn rate_without_extra(&self, ledger: &JobLedger) -> f64 {
        self.capacity - self.sum_base(ledger)
    }

    /// Running extra job with the greatest rate. Ties go to the first job in key order.
    pub fn find_largest_running_extra_job(&self, ledger: &JobLedger, owner: &str) -> Result<JobKey> {
        let mut largest: Option<(JobKey, f64)> = None;

        for key in &self.jobs {
            let Ok(job) = ledger.get_by_key(*key) else {
                continue;
            };

            if !job.is_running_in(JobGroup::Extra) {
                continue;
            }

            match largest {
                Some((_, rate)) if rate >= job.rate => {}
                _ => largest = Some((*key, job.rate)),
            }
        }

        largest.map(|(key, _)| key).ok_or_else(|| Error::NoEvictableJob(owner.to_string()))
    }
}

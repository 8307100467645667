use serde::{Deserialize, Serialize};

use crate::domain::job::job::JobState;
use crate::domain::resource_manager::ResourceManager;
use crate::domain::resource_manager::admission::AdmissionStatus;
use crate::domain::utils::id::NodeId;
use crate::error::{Error, Result};

/// Share of a transfer carried by one DTN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DtnFragment {
    pub dtn: NodeId,
    pub rate: f64,
}

impl DtnFragment {
    pub fn new(dtn: impl Into<NodeId>, rate: f64) -> Self {
        Self { dtn: dtn.into(), rate }
    }
}

/// One source DTN -> destination DTN stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentMatch {
    pub src_dtn: NodeId,
    pub dst_dtn: NodeId,
    pub rate: f64,
}

impl ResourceManager {
    /// Chooses the DTNs that carry `rate` out of `storage_id`.
    ///
    /// While the probe only admits with eviction, the largest running extra job
    /// on the storage is marked for preallocation, one job per pass. Once the
    /// probe admits cleanly the rate is split greedily over the storage's DTNs in
    /// the order the edges were added; paths below the admission floor are
    /// skipped. An empty result means the request was rejected.
    ///
    /// A rate of zero or less that is admitted comes back as a single zero-share
    /// fragment on the first usable DTN.
    pub fn query_path_dtns(&mut self, storage_id: &str, rate: f64) -> Result<Vec<DtnFragment>> {
        self.graph.storage_node(storage_id)?;

        let mut evicted = 0;
        loop {
            match self.probe_path_rate(storage_id, rate, false)? {
                AdmissionStatus::Admitted => break,
                AdmissionStatus::AdmittedWithEviction => {}
                status => {
                    log::info!("Request of {} from storage {} rejected: {}", rate, storage_id, status);
                    return Ok(Vec::new());
                }
            }

            if evicted == 0 {
                log::info!("Not enough bandwidth on storage {}, suspending its largest extra jobs", storage_id);
            }

            let storage = self.graph.storage_node(storage_id)?;
            let job_key = match storage.base.find_largest_running_extra_job(&self.ledger, storage_id) {
                Ok(key) => key,
                Err(e) => {
                    log::warn!("{}; the contention is not on storage {}", e, storage_id);
                    return Ok(Vec::new());
                }
            };

            self.ledger.set_state(job_key, JobState::MarkedForPrealloc)?;
            let job_id = self.ledger.get_by_key(job_key)?.id.clone();

            if let Err(e) = self.store.persist_job_state(&job_id, JobState::MarkedForPrealloc) {
                log::error!("Failed to persist state of job {}: {}", job_id, e);
            }
            log::info!("Job {} has been marked for preallocation", job_id);

            evicted += 1;
            if evicted > self.config.eviction_warn_threshold {
                log::warn!("Something is not right in making space on storage {}: {} jobs suspended", storage_id, evicted);
            }
        }

        let storage = self.graph.storage_node(storage_id)?;
        let floor = self.config.admission_floor;
        let mut remaining = rate;
        let mut fragments = Vec::new();

        // a request of rate <= 0 still gets the first usable DTN, with a zero share
        for edge_key in storage.out_edges() {
            if remaining <= 0.0 && !fragments.is_empty() {
                break;
            }

            let (dtn, rates) = self.path_rates(*edge_key)?;
            if rates.clean < floor {
                log::debug!("DTN {} is fully occupied ({} free)", dtn.id, rates.clean);
                continue;
            }

            let share = rates.clean.min(remaining).max(0.0);
            fragments.push(DtnFragment { dtn: dtn.id.clone(), rate: share });
            remaining -= share;
        }

        if remaining > 0.0 {
            log::warn!("Storage {}: {} of {} could not be placed on any DTN", storage_id, remaining, rate);
        }
        log::info!("Storage {}: {} split over {} DTNs", storage_id, rate, fragments.len());

        Ok(fragments)
    }

    /// Pairs source fragments with destination fragments, see [`match_fragments`].
    pub fn match_path_dtns(&self, src: &[DtnFragment], dst: &[DtnFragment]) -> Result<Vec<FragmentMatch>> {
        match_fragments(src, dst, self.config.match_tolerance)
    }
}

/// Two-pointer matching of two fragment lists describing the same total rate.
///
/// Each step pairs the current heads with the smaller of their residual rates and
/// advances whichever side is used up. Residues at or below `tolerance` count as
/// used up. Rate left over on one side once the other is exhausted is an
/// invariant violation.
pub fn match_fragments(src: &[DtnFragment], dst: &[DtnFragment], tolerance: f64) -> Result<Vec<FragmentMatch>> {
    let mut src_left: Vec<f64> = src.iter().map(|f| f.rate).collect();
    let mut dst_left: Vec<f64> = dst.iter().map(|f| f.rate).collect();
    let (mut i, mut j) = (0, 0);
    let mut matches = Vec::new();

    while i < src.len() && j < dst.len() {
        if src_left[i] <= tolerance {
            i += 1;
            continue;
        }
        if dst_left[j] <= tolerance {
            j += 1;
            continue;
        }

        let rate = src_left[i].min(dst_left[j]);
        src_left[i] -= rate;
        dst_left[j] -= rate;

        matches.push(FragmentMatch { src_dtn: src[i].dtn.clone(), dst_dtn: dst[j].dtn.clone(), rate });
    }

    let src_rest: f64 = src_left.iter().skip(i).filter(|r| **r > tolerance).sum();
    let dst_rest: f64 = dst_left.iter().skip(j).filter(|r| **r > tolerance).sum();

    if src_rest > 0.0 || dst_rest > 0.0 {
        return Err(Error::InvariantViolation(format!(
            "fragment lists do not sum to the same rate: {} left at the source, {} left at the destination",
            src_rest, dst_rest
        )));
    }

    Ok(matches)
}

use serde::Serialize;
use std::fmt;

use crate::domain::resource::edge::EdgeKey;
use crate::domain::resource::node::Node;
use crate::domain::resource_manager::{ADMISSION_TARGET, ResourceManager};
use crate::error::{Error, Result};

/// Outcome of an admission probe. The numeric codes are part of the wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AdmissionStatus {
    /// Fits without touching anybody.
    Admitted = 1,
    /// Fits once running extra jobs are preempted.
    AdmittedWithEviction = 2,
    /// Storage or DTN paths are short even with every extra job gone.
    InsufficientBandwidth = 3,
    /// The storage's raw capacity is below the requested rate.
    InsufficientCapacity = 4,
}

impl AdmissionStatus {
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_admitted(self) -> bool {
        matches!(self, AdmissionStatus::Admitted | AdmissionStatus::AdmittedWithEviction)
    }
}

impl fmt::Display for AdmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Clean,
    Conditional,
    Short,
}

/// Rates one storage -> DTN -> gateway path can take.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PathRates {
    /// Free right now.
    pub clean: f64,
    /// Free once the path's running extra jobs are gone.
    pub conditional: f64,
}

impl ResourceManager {
    /// Checks whether `rate` can be read from `storage_id` and pushed out through
    /// its DTNs.
    ///
    /// Read-only. With `logging` set the per-tier figures are logged at info level
    /// and the decision is recorded on the admission event target.
    pub fn probe_path_rate(&self, storage_id: &str, rate: f64, logging: bool) -> Result<AdmissionStatus> {
        let storage = self.graph.storage_node(storage_id)?;

        let capacity = storage.base.capacity;
        let sum_extra = storage.base.sum_extra(&self.ledger);
        let sum_base = storage.base.sum_base(&self.ledger);

        if logging {
            log::info!(
                "Storage: {}, io cap: {}, taken by extra: {}, taken by base: {}, requesting: {}",
                storage_id,
                capacity,
                sum_extra,
                sum_base,
                rate
            );
        }

        if capacity < rate {
            if logging {
                log::info!("Not enough capacity! Storage: {}, requesting: {}, io cap: {}", storage_id, rate, capacity);
            }
            return Ok(self.record_decision(storage_id, rate, AdmissionStatus::InsufficientCapacity, logging));
        }

        let storage_tier = if capacity - sum_extra - sum_base > rate {
            Tier::Clean
        } else if capacity - sum_base > rate {
            Tier::Conditional
        } else {
            Tier::Short
        };

        if storage_tier == Tier::Short {
            if logging {
                log::info!("Not enough bandwidth at storage {}", storage_id);
            }
            return Ok(self.record_decision(storage_id, rate, AdmissionStatus::InsufficientBandwidth, logging));
        }

        let floor = self.config.admission_floor;
        let mut clean_sum = 0.0;
        let mut conditional_sum = 0.0;

        for edge_key in storage.out_edges() {
            let (dtn, rates) = self.path_rates(*edge_key)?;

            if logging {
                log::info!("Via DTN {}: clean rate {}, conditional rate {}", dtn.id, rates.clean, rates.conditional);
            }

            if rates.clean >= floor {
                clean_sum += rates.clean;
            }
            if rates.conditional >= floor {
                conditional_sum += rates.conditional;
            }
        }

        if logging {
            log::info!("Edge totals of storage {}: clean {}, conditional {}", storage_id, clean_sum, conditional_sum);
        }

        let edge_tier = if clean_sum > rate {
            Tier::Clean
        } else if conditional_sum > rate {
            Tier::Conditional
        } else {
            Tier::Short
        };

        let status = match (storage_tier, edge_tier) {
            (_, Tier::Short) => {
                if logging {
                    log::info!("Not enough bandwidth at DTN/gateway edges of storage {}", storage_id);
                }
                AdmissionStatus::InsufficientBandwidth
            }
            (Tier::Clean, Tier::Clean) => AdmissionStatus::Admitted,
            _ => AdmissionStatus::AdmittedWithEviction,
        };

        Ok(self.record_decision(storage_id, rate, status, logging))
    }

    /// Free figures of the path starting with the storage -> DTN edge `edge_key`.
    ///
    /// A path is only as wide as the narrower of its two edges.
    pub(crate) fn path_rates(&self, edge_key: EdgeKey) -> Result<(&Node, PathRates)> {
        let sd_edge = self.graph.edge_by_key(edge_key)?;
        let dtn = self.graph.node(sd_edge.target()).ok_or_else(|| Error::InvariantViolation(format!("edge {} points at a missing node", sd_edge.id)))?;
        let dg_edge = self.graph.edge_by_key(self.graph.dtn_gateway_edge(dtn)?)?;

        let rates = PathRates {
            clean: sd_edge.base.available_rate(&self.ledger).min(dg_edge.base.available_rate(&self.ledger)),
            conditional: sd_edge.base.rate_without_extra(&self.ledger).min(dg_edge.base.rate_without_extra(&self.ledger)),
        };

        Ok((dtn, rates))
    }

    fn record_decision(&self, storage_id: &str, rate: f64, status: AdmissionStatus, logging: bool) -> AdmissionStatus {
        if logging {
            tracing::info!(target: ADMISSION_TARGET, storage = %storage_id, rate, status = status.code(), "admission decision");
        } else {
            tracing::debug!(target: ADMISSION_TARGET, storage = %storage_id, rate, status = status.code(), "admission decision");
        }
        status
    }
}

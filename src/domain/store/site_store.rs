use crate::api::inventory_dto::{DtnDto, StorageDtnMapDto, StorageDto};
use crate::api::reservation_dto::ReservationRecord;
use crate::domain::job::job::JobState;
use crate::domain::utils::id::JobId;
use crate::error::Result;

/// Inventory source and persistence sink of the resource manager.
///
/// Reads feed `construct()`. Writes are best effort from the engine's point of
/// view: a failing write is logged and the in-memory decision stands.
pub trait SiteStore: std::fmt::Debug + Send + Sync {
    fn list_storages(&self) -> Result<Vec<StorageDto>>;

    /// DTNs currently considered alive.
    fn list_dtns(&self) -> Result<Vec<DtnDto>>;

    fn list_storage_dtn_map(&self) -> Result<Vec<StorageDtnMapDto>>;

    fn persist_job_state(&self, job_id: &JobId, state: JobState) -> Result<()>;

    fn persist_reservation(&self, record: &ReservationRecord) -> Result<()>;
}

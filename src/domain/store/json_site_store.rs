use std::path::Path;
use std::sync::RwLock;

use crate::api::inventory_dto::{DtnDto, InventoryDto, StorageDtnMapDto, StorageDto};
use crate::api::reservation_dto::ReservationRecord;
use crate::domain::job::job::JobState;
use crate::domain::store::site_store::SiteStore;
use crate::domain::utils::id::JobId;
use crate::error::{Error, Result};
use crate::loader::parser::parse_json_file;

/// Site store backed by an inventory snapshot, journaling writes in memory.
///
/// Used by the CLI (inventory exported to a JSON file) and by tests, which read
/// the journal back to check what the engine persisted.
#[derive(Debug)]
pub struct JsonSiteStore {
    inventory: RwLock<InventoryDto>,
    dtn_expiry_ms: i64,

    /// Fixed "now" for expiry checks; wall clock when `None`.
    now_ms: Option<i64>,

    job_states: RwLock<Vec<(JobId, JobState)>>,
    reservations: RwLock<Vec<ReservationRecord>>,
}

impl JsonSiteStore {
    pub fn new(inventory: InventoryDto, dtn_expiry_ms: i64) -> Self {
        Self { inventory: RwLock::new(inventory), dtn_expiry_ms, now_ms: None, job_states: RwLock::new(Vec::new()), reservations: RwLock::new(Vec::new()) }
    }

    pub fn from_file(file_path: impl AsRef<Path>, dtn_expiry_ms: i64) -> Result<Self> {
        let inventory: InventoryDto = parse_json_file(file_path.as_ref())?;
        log::info!(
            "Inventory loaded from '{}': {} storages, {} dtns, {} storage-dtn maps",
            file_path.as_ref().display(),
            inventory.storages.len(),
            inventory.dtns.len(),
            inventory.storage_dtn_map.len()
        );
        Ok(Self::new(inventory, dtn_expiry_ms))
    }

    pub fn with_fixed_time(mut self, now_ms: i64) -> Self {
        self.now_ms = Some(now_ms);
        self
    }

    /// Replaces the snapshot returned by the next `list_*` calls.
    pub fn set_inventory(&self, inventory: InventoryDto) -> Result<()> {
        let mut guard = self.inventory.write().map_err(|_| lock_poisoned("inventory"))?;
        *guard = inventory;
        Ok(())
    }

    pub fn job_states(&self) -> Vec<(JobId, JobState)> {
        self.job_states.read().map(|guard| guard.clone()).unwrap_or_default()
    }

    pub fn reservations(&self) -> Vec<ReservationRecord> {
        self.reservations.read().map(|guard| guard.clone()).unwrap_or_default()
    }

    fn now_ms(&self) -> i64 {
        self.now_ms.unwrap_or_else(|| chrono::Utc::now().timestamp_millis())
    }

    fn is_alive(&self, dtn: &DtnDto, now_ms: i64) -> bool {
        dtn.expire_at.is_none_or(|expire_at| expire_at > now_ms - self.dtn_expiry_ms)
    }
}

impl SiteStore for JsonSiteStore {
    fn list_storages(&self) -> Result<Vec<StorageDto>> {
        let guard = self.inventory.read().map_err(|_| lock_poisoned("inventory"))?;
        Ok(guard.storages.clone())
    }

    fn list_dtns(&self) -> Result<Vec<DtnDto>> {
        let guard = self.inventory.read().map_err(|_| lock_poisoned("inventory"))?;
        let now_ms = self.now_ms();

        let (alive, expired): (Vec<DtnDto>, Vec<DtnDto>) = guard.dtns.iter().cloned().partition(|dtn| self.is_alive(dtn, now_ms));

        for dtn in &expired {
            log::debug!("Skipping dtn {} ({}): heartbeat expired", dtn.id, dtn.name);
        }

        Ok(alive)
    }

    fn list_storage_dtn_map(&self) -> Result<Vec<StorageDtnMapDto>> {
        let guard = self.inventory.read().map_err(|_| lock_poisoned("inventory"))?;
        Ok(guard.storage_dtn_map.clone())
    }

    fn persist_job_state(&self, job_id: &JobId, state: JobState) -> Result<()> {
        let mut guard = self.job_states.write().map_err(|_| lock_poisoned("job state journal"))?;
        guard.push((job_id.clone(), state));
        Ok(())
    }

    fn persist_reservation(&self, record: &ReservationRecord) -> Result<()> {
        let mut guard = self.reservations.write().map_err(|_| lock_poisoned("reservation journal"))?;
        guard.push(record.clone());
        Ok(())
    }
}

fn lock_poisoned(what: &str) -> Error {
    Error::PersistenceError(format!("{} lock poisoned", what))
}

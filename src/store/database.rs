//! redb-backed [`ScheduleRepository`].
//!
//! Values are JSON-serialized into redb's `&[u8]` value columns. The store
//! supports on-disk and in-memory backends (the latter for tests).

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable};
use tracing::{debug, info, warn};

use super::tables::{item_key, items_prefix, schedule_key, ITEMS, SCHEDULES};
use super::{ScheduleRepository, StoreError, StoreResult};
use crate::models::{ScheduleItem, ScheduleStatus, SolvedSchedule};

/// Convert any `Display` error into a `StoreError` variant via a closure factory.
macro_rules! map_err {
    ($variant:ident) => {
        |e| StoreError::$variant(e.to_string())
    };
}

/// Thread-safe schedule store backed by redb.
#[derive(Clone)]
pub struct ScheduleStore {
    db: Arc<Database>,
}

impl ScheduleStore {
    /// Open (or create) a persistent store at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let db = Database::create(path).map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!(?path, "schedule store opened");
        Ok(store)
    }

    /// Create an ephemeral in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let backend = redb::backends::InMemoryBackend::new();
        let db = Database::builder()
            .create_with_backend(backend)
            .map_err(map_err!(Open))?;
        let store = Self { db: Arc::new(db) };
        store.ensure_tables()?;
        debug!("in-memory schedule store opened");
        Ok(store)
    }

    fn ensure_tables(&self) -> StoreResult<()> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
        txn.open_table(ITEMS).map_err(map_err!(Table))?;
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(())
    }

    fn encode(schedule: &SolvedSchedule) -> StoreResult<(String, Vec<u8>)> {
        let key = schedule_key(&schedule.organization_id, &schedule.id);
        let value = serde_json::to_vec(schedule).map_err(map_err!(Serialize))?;
        Ok((key, value))
    }

    fn load(
        table: &impl ReadableTable<&'static str, &'static [u8]>,
        organization_id: &str,
        schedule_id: &str,
    ) -> StoreResult<Option<SolvedSchedule>> {
        let key = schedule_key(organization_id, schedule_id);
        match table.get(key.as_str()).map_err(map_err!(Read))? {
            Some(guard) => {
                let schedule: SolvedSchedule =
                    serde_json::from_slice(guard.value()).map_err(map_err!(Deserialize))?;
                Ok((schedule.organization_id == organization_id).then_some(schedule))
            }
            None => Ok(None),
        }
    }

    /// Rows under `{org}/{schedule}/`, keyed, that decode as owned by that
    /// organization and schedule. Organization IDs may contain `/`, so the
    /// key prefix alone does not prove ownership.
    fn owned_items(
        table: &impl ReadableTable<&'static str, &'static [u8]>,
        organization_id: &str,
        schedule_id: &str,
    ) -> StoreResult<Vec<(String, ScheduleItem)>> {
        let prefix = items_prefix(organization_id, schedule_id);
        let mut rows = Vec::new();
        for entry in table.range(prefix.as_str()..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if !key.value().starts_with(&prefix) {
                break;
            }
            let item: ScheduleItem =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if item.organization_id == organization_id && item.solved_schedule_id == schedule_id {
                rows.push((key.value().to_string(), item));
            }
        }
        Ok(rows)
    }
}

impl ScheduleRepository for ScheduleStore {
    fn create_schedule(&self, organization_id: &str) -> StoreResult<SolvedSchedule> {
        let schedule = SolvedSchedule::pending(uuid::Uuid::new_v4().to_string(), organization_id);
        let (key, value) = Self::encode(&schedule)?;
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        {
            let mut table = txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(organization = organization_id, schedule = %schedule.id, "schedule created");
        Ok(schedule)
    }

    fn get_schedule(
        &self,
        organization_id: &str,
        schedule_id: &str,
    ) -> StoreResult<Option<SolvedSchedule>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
        Self::load(&table, organization_id, schedule_id)
    }

    fn list_schedules(&self, organization_id: &str) -> StoreResult<Vec<SolvedSchedule>> {
        let prefix = format!("{organization_id}/");
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
        let mut results = Vec::new();
        for entry in table.range(prefix.as_str()..).map_err(map_err!(Read))? {
            let (key, value) = entry.map_err(map_err!(Read))?;
            if !key.value().starts_with(&prefix) {
                break;
            }
            let schedule: SolvedSchedule =
                serde_json::from_slice(value.value()).map_err(map_err!(Deserialize))?;
            if schedule.organization_id == organization_id {
                results.push(schedule);
            }
        }
        results.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(results)
    }

    fn mark_running(
        &self,
        organization_id: &str,
        schedule_id: &str,
    ) -> StoreResult<SolvedSchedule> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let schedule = {
            let mut table = txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
            let mut schedule = Self::load(&table, organization_id, schedule_id)?
                .ok_or_else(|| StoreError::NotFound(schedule_key(organization_id, schedule_id)))?;
            if schedule.status == ScheduleStatus::Running {
                warn!(
                    organization = organization_id,
                    schedule = schedule_id,
                    "schedule already running, taking it over"
                );
            }
            schedule.status = ScheduleStatus::Running;
            let (key, value) = Self::encode(&schedule)?;
            table
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            schedule
        };
        txn.commit().map_err(map_err!(Transaction))?;
        Ok(schedule)
    }

    fn commit_outcome(
        &self,
        organization_id: &str,
        schedule_id: &str,
        items: &[ScheduleItem],
        status: ScheduleStatus,
        objective: Option<f64>,
    ) -> StoreResult<SolvedSchedule> {
        if !status.is_finished() {
            return Err(StoreError::InvalidState(format!(
                "cannot commit non-terminal status '{}'",
                status.label()
            )));
        }
        let encoded = items
            .iter()
            .map(|item| serde_json::to_vec(item).map_err(map_err!(Serialize)))
            .collect::<StoreResult<Vec<_>>>()?;
        let label = status.label();

        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let schedule = {
            let mut schedules = txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
            let mut schedule = Self::load(&schedules, organization_id, schedule_id)?
                .ok_or_else(|| StoreError::NotFound(schedule_key(organization_id, schedule_id)))?;

            let mut table = txn.open_table(ITEMS).map_err(map_err!(Table))?;
            let stale = Self::owned_items(&table, organization_id, schedule_id)?;
            for (key, _) in &stale {
                table.remove(key.as_str()).map_err(map_err!(Write))?;
            }
            for (i, value) in encoded.iter().enumerate() {
                let key = item_key(organization_id, schedule_id, i);
                table
                    .insert(key.as_str(), value.as_slice())
                    .map_err(map_err!(Write))?;
            }
            debug!(replaced = stale.len(), inserted = encoded.len(), "schedule rows swapped");

            schedule.status = status;
            schedule.finished_at = Some(Utc::now());
            schedule.objective = objective;
            let (key, value) = Self::encode(&schedule)?;
            schedules
                .insert(key.as_str(), value.as_slice())
                .map_err(map_err!(Write))?;
            schedule
        };
        txn.commit().map_err(map_err!(Transaction))?;
        info!(
            organization = organization_id,
            schedule = schedule_id,
            status = label,
            rows = items.len(),
            "schedule outcome committed"
        );
        Ok(schedule)
    }

    fn list_items(
        &self,
        organization_id: &str,
        schedule_id: &str,
    ) -> StoreResult<Vec<ScheduleItem>> {
        let txn = self.db.begin_read().map_err(map_err!(Transaction))?;
        let table = txn.open_table(ITEMS).map_err(map_err!(Table))?;
        Ok(Self::owned_items(&table, organization_id, schedule_id)?
            .into_iter()
            .map(|(_, item)| item)
            .collect())
    }

    fn delete_schedule(&self, organization_id: &str, schedule_id: &str) -> StoreResult<bool> {
        let txn = self.db.begin_write().map_err(map_err!(Transaction))?;
        let removed;
        {
            let mut schedules = txn.open_table(SCHEDULES).map_err(map_err!(Table))?;
            let Some(schedule) = Self::load(&schedules, organization_id, schedule_id)? else {
                return Ok(false);
            };
            if !schedule.finished() {
                return Err(StoreError::InvalidState(format!(
                    "schedule {schedule_id} is {} and cannot be deleted",
                    schedule.status.label()
                )));
            }
            let mut items = txn.open_table(ITEMS).map_err(map_err!(Table))?;
            let keys = Self::owned_items(&items, organization_id, schedule_id)?;
            for (key, _) in &keys {
                items.remove(key.as_str()).map_err(map_err!(Write))?;
            }
            removed = keys.len();
            schedules
                .remove(schedule_key(organization_id, schedule_id).as_str())
                .map_err(map_err!(Write))?;
        }
        txn.commit().map_err(map_err!(Transaction))?;
        debug!(
            organization = organization_id,
            schedule = schedule_id,
            rows = removed,
            "schedule deleted"
        );
        Ok(true)
    }
}

//! Schedule persistence.
//!
//! [`ScheduleRepository`] is the persisted-schedule contract: solve
//! attempts ([`SolvedSchedule`]) and their rows ([`ScheduleItem`]), both
//! partitioned by organization ID. [`ScheduleStore`] implements it on redb.
//!
//! The only write that touches rows is [`ScheduleRepository::commit_outcome`],
//! which deletes old rows, inserts the new batch, and sets the terminal
//! status in one transaction. A reader sees either the previous run or the
//! new one, never a mix.

mod database;
mod tables;

pub use database::ScheduleStore;

use thiserror::Error;

use crate::models::{ScheduleItem, ScheduleStatus, SolvedSchedule};

/// Result type alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open database: {0}")]
    Open(String),

    #[error("transaction error: {0}")]
    Transaction(String),

    #[error("table error: {0}")]
    Table(String),

    #[error("read error: {0}")]
    Read(String),

    #[error("write error: {0}")]
    Write(String),

    #[error("serialization error: {0}")]
    Serialize(String),

    #[error("deserialization error: {0}")]
    Deserialize(String),

    #[error("schedule not found: {0}")]
    NotFound(String),

    #[error("invalid schedule state: {0}")]
    InvalidState(String),
}

/// Storage for solve attempts and their rows.
pub trait ScheduleRepository: Send + Sync {
    /// Creates a pending schedule with a fresh ID.
    fn create_schedule(&self, organization_id: &str) -> StoreResult<SolvedSchedule>;

    /// Gets a schedule, `None` if absent or owned by another organization.
    fn get_schedule(
        &self,
        organization_id: &str,
        schedule_id: &str,
    ) -> StoreResult<Option<SolvedSchedule>>;

    /// Lists an organization's schedules, oldest first.
    fn list_schedules(&self, organization_id: &str) -> StoreResult<Vec<SolvedSchedule>>;

    /// Moves a schedule to `running`.
    fn mark_running(&self, organization_id: &str, schedule_id: &str)
        -> StoreResult<SolvedSchedule>;

    /// Atomically replaces a schedule's rows and sets its terminal status.
    ///
    /// # Errors
    /// `InvalidState` when `status` is not terminal; `NotFound` when the
    /// schedule does not exist.
    fn commit_outcome(
        &self,
        organization_id: &str,
        schedule_id: &str,
        items: &[ScheduleItem],
        status: ScheduleStatus,
        objective: Option<f64>,
    ) -> StoreResult<SolvedSchedule>;

    /// Rows of a schedule, in insertion order.
    fn list_items(&self, organization_id: &str, schedule_id: &str)
        -> StoreResult<Vec<ScheduleItem>>;

    /// Deletes a finished schedule and its rows. Returns false if absent.
    ///
    /// # Errors
    /// `InvalidState` while the schedule is pending or running.
    fn delete_schedule(&self, organization_id: &str, schedule_id: &str) -> StoreResult<bool>;
}

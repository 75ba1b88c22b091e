//! Solve attempt and schedule row models.
//!
//! A [`SolvedSchedule`] records one solve attempt and its lifecycle.
//! [`ScheduleItem`] rows are the persisted output: denormalized copies of
//! the period, room, teacher, and course display fields taken at solve
//! time, so later catalog renames do not rewrite history.
//!
//! # Lifecycle
//!
//! ```text
//! pending → running → { solved | unsolved | errored }
//! ```
//!
//! `solved` implies `finished`. Rows for a schedule are only ever replaced
//! wholesale, together with the terminal status.

use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of a solve attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduleStatus {
    /// Created, not yet picked up by a worker.
    Pending,
    /// A worker is building or solving the model.
    Running,
    /// Finished with an optimal schedule.
    Solved,
    /// Finished; the optimizer proved no schedule satisfies the hard rules.
    Unsolved,
    /// Finished; the run failed (backend failure or invalid catalog at run time).
    Errored {
        /// Captured failure message.
        message: String,
    },
}

impl ScheduleStatus {
    /// Whether the run reached a terminal state.
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Solved | Self::Unsolved | Self::Errored { .. })
    }

    /// Whether the run produced an optimal schedule.
    pub fn is_solved(&self) -> bool {
        matches!(self, Self::Solved)
    }

    /// Short lowercase label for display.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Solved => "solved",
            Self::Unsolved => "unsolved",
            Self::Errored { .. } => "errored",
        }
    }
}

/// One solve attempt for an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolvedSchedule {
    /// Unique schedule identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Lifecycle state.
    pub status: ScheduleStatus,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time the last run reached a terminal state.
    pub finished_at: Option<DateTime<Utc>>,
    /// Objective value (placements in avoided periods) of the last optimal run.
    pub objective: Option<f64>,
}

impl SolvedSchedule {
    /// Creates a pending schedule.
    pub fn pending(id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            status: ScheduleStatus::Pending,
            created_at: Utc::now(),
            finished_at: None,
            objective: None,
        }
    }

    /// `finished` flag.
    pub fn finished(&self) -> bool {
        self.status.is_finished()
    }

    /// `solved` flag.
    pub fn solved(&self) -> bool {
        self.status.is_solved()
    }

    /// Failure message of an errored run.
    pub fn error_message(&self) -> Option<&str> {
        match &self.status {
            ScheduleStatus::Errored { message } => Some(message),
            _ => None,
        }
    }
}

/// A denormalized schedule row.
///
/// This is the stable contract a viewer renders against: one course taught
/// by one teacher in one room during one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleItem {
    /// Owning organization.
    pub organization_id: String,
    /// Owning solve attempt.
    pub solved_schedule_id: String,
    /// Period ordinal number.
    pub period_number: u32,
    /// Period start time.
    pub period_start: NaiveTime,
    /// Period end time.
    pub period_end: NaiveTime,
    /// Room label at solve time.
    pub room: String,
    /// Teacher display name at solve time.
    pub teacher: String,
    /// Course name at solve time.
    pub course: String,
    /// Source period ID.
    pub period_id: String,
    /// Source room ID.
    pub room_id: String,
    /// Source teacher ID.
    pub teacher_id: String,
    /// Source course ID.
    pub course_id: String,
}

impl ScheduleItem {
    /// Sort key: period number, then room label, then teacher.
    pub fn display_order(&self) -> (u32, &str, &str) {
        (self.period_number, &self.room, &self.teacher)
    }
}

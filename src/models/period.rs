//! Period model.
//!
//! A period is one time slot of the teaching day. Periods are ordered by
//! their `number`; `start`/`end` are wall-clock times copied verbatim into
//! schedule rows. An `avoid` period is soft-demoted: the optimizer is
//! charged one unit per placement in it, but it stays usable.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// A teaching period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Period {
    /// Unique period identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Ordinal number (1 = first period of the day).
    pub number: u32,
    /// Start time.
    pub start: NaiveTime,
    /// End time.
    pub end: NaiveTime,
    /// Soft-undesirable flag.
    #[serde(default)]
    pub avoid: bool,
}

impl Period {
    /// Creates a period with the given ordinal number.
    ///
    /// Start and end default to midnight; set them with [`Period::with_times`].
    pub fn new(id: impl Into<String>, organization_id: impl Into<String>, number: u32) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            number,
            start: NaiveTime::MIN,
            end: NaiveTime::MIN,
            avoid: false,
        }
    }

    /// Sets start and end times.
    pub fn with_times(mut self, start: NaiveTime, end: NaiveTime) -> Self {
        self.start = start;
        self.end = end;
        self
    }

    /// Marks the period as one to avoid.
    pub fn avoided(mut self) -> Self {
        self.avoid = true;
        self
    }

    /// Display label, e.g. `"Period 3"`.
    pub fn label(&self) -> String {
        format!("Period {}", self.number)
    }
}

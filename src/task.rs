//! Task submission.
//!
//! The engine never owns a queue. Callers pass a [`TaskSubmitter`] to
//! [`TimetableEngine::request_solve`](crate::engine::TimetableEngine::request_solve),
//! and whatever sits behind it eventually calls
//! [`TimetableEngine::run`](crate::engine::TimetableEngine::run) with the job.
//! [`ChannelSubmitter`] is the in-process implementation, drained by
//! [`TimetableEngine::serve`](crate::engine::TimetableEngine::serve).

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One request to solve one schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveJob {
    /// Organization whose catalog is solved.
    pub organization_id: String,
    /// Schedule the outcome is written to.
    pub solved_schedule_id: String,
}

impl SolveJob {
    /// Creates a job.
    pub fn new(organization_id: impl Into<String>, solved_schedule_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            solved_schedule_id: solved_schedule_id.into(),
        }
    }
}

/// Submission failures.
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("task queue closed")]
    Closed,

    #[error("task submission failed: {0}")]
    Rejected(String),
}

/// Hands solve jobs to an executor.
///
/// Delivery is at least once; there is no ordering guarantee across
/// organizations.
pub trait TaskSubmitter {
    /// Submits a job.
    fn submit(&self, job: SolveJob) -> Result<(), SubmitError>;
}

/// Submitter backed by a `std::sync::mpsc` channel.
pub struct ChannelSubmitter {
    sender: Mutex<Sender<SolveJob>>,
}

impl ChannelSubmitter {
    /// Creates a submitter and the receiving end its worker drains.
    pub fn channel() -> (Self, Receiver<SolveJob>) {
        let (sender, receiver) = mpsc::channel();
        (
            Self {
                sender: Mutex::new(sender),
            },
            receiver,
        )
    }
}

impl TaskSubmitter for ChannelSubmitter {
    fn submit(&self, job: SolveJob) -> Result<(), SubmitError> {
        let sender = self
            .sender
            .lock()
            .map_err(|e| SubmitError::Rejected(e.to_string()))?;
        sender.send(job).map_err(|_| SubmitError::Closed)
    }
}

/// Records jobs instead of running them.
#[derive(Debug, Default)]
pub struct RecordingSubmitter {
    jobs: Mutex<Vec<SolveJob>>,
}

impl RecordingSubmitter {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Jobs submitted so far.
    pub fn jobs(&self) -> Vec<SolveJob> {
        self.jobs.lock().map(|j| j.clone()).unwrap_or_default()
    }
}

impl TaskSubmitter for RecordingSubmitter {
    fn submit(&self, job: SolveJob) -> Result<(), SubmitError> {
        self.jobs
            .lock()
            .map_err(|e| SubmitError::Rejected(e.to_string()))?
            .push(job);
        Ok(())
    }
}

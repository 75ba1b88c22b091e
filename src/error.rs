//! Engine error type.

use thiserror::Error;

use crate::catalog::CatalogError;
use crate::solver::InvariantViolation;
use crate::store::StoreError;
use crate::task::SubmitError;
use crate::validation::ValidationError;

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by [`TimetableEngine`](crate::engine::TimetableEngine).
///
/// Infeasible models and backend failures are not errors; they are recorded
/// on the schedule.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("catalog failed validation: {}", join(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Submit(#[from] SubmitError),

    #[error("solver result violates a hard constraint: {0}")]
    InvariantViolation(#[from] InvariantViolation),

    #[error("schedule {schedule} not found for organization {organization}")]
    NotFound {
        organization: String,
        schedule: String,
    },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<Vec<ValidationError>> for EngineError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Validation(errors)
    }
}

impl EngineError {
    /// Validation failures, if this is one.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

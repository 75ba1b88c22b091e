//! Solve orchestration.
//!
//! An [`OptimizerBackend`] turns an [`AssignmentModel`] into a three-way
//! [`SolveOutcome`]. Expected outcomes (optimal, infeasible) and backend
//! failures are all values of that enum; nothing here signals an outcome
//! through `Err`. An optimal assignment is then re-checked by
//! [`verify_assignment`] before anything is persisted.
//!
//! # Backends
//! - [`GoodLpBackend`]: MILP through `good_lp` (pure-Rust `microlp`),
//!   with disjunctions reformulated as big-M constraints.

mod milp;
mod verify;

pub use milp::GoodLpBackend;
pub use verify::{verify_assignment, InvariantViolation};

use crate::config::EngineConfig;
use crate::model::{Assignment, AssignmentModel};

/// Result of handing a model to a backend.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    /// A minimum-objective assignment.
    Optimal {
        assignment: Assignment,
        objective: f64,
    },
    /// No assignment satisfies the hard constraints.
    Infeasible,
    /// The backend failed (runtime, transport, licensing).
    Error(String),
}

impl SolveOutcome {
    /// Short status label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            SolveOutcome::Optimal { .. } => "optimal",
            SolveOutcome::Infeasible => "infeasible",
            SolveOutcome::Error(_) => "error",
        }
    }
}

/// A pluggable optimizer.
///
/// Implementations must honor variable bounds, every linear constraint,
/// and every disjunction of the model, and return one value per model
/// variable on [`SolveOutcome::Optimal`].
pub trait OptimizerBackend: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Solves a model to optimality.
    ///
    /// Solver values strictly above `config.assignment_threshold` are read
    /// as true.
    fn solve(&self, model: &AssignmentModel, config: &EngineConfig) -> SolveOutcome;
}

impl<B: OptimizerBackend + ?Sized> OptimizerBackend for Box<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn solve(&self, model: &AssignmentModel, config: &EngineConfig) -> SolveOutcome {
        (**self).solve(model, config)
    }
}

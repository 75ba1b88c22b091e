//! Course timetabling engine.
//!
//! Given an organization's catalog of periods, teachers, rooms, and courses,
//! assigns every course instance a `(period, teacher, room)` triple so that
//! no teacher or room is double-booked, every course is placed exactly as
//! often as it is offered, anchored placements are kept, and each mandatory
//! group of courses can be attended without clashes. Among all such
//! timetables, the engine picks one that places the fewest instances in
//! periods marked as avoided.
//!
//! # Modules
//!
//! - **`models`**: Catalog entities and persisted solve records
//! - **`catalog`**: Read-only, organization-scoped catalog access and snapshots
//! - **`validation`**: Catalog integrity checks run before any solve
//! - **`feasibility`**: Dense tuple index with eligibility and anchor masks
//! - **`combinator`**: Mandatory-group placement enumeration
//! - **`model`**: Binary assignment model (variables, rows, disjunctions)
//! - **`solver`**: Optimizer backend seam, MILP backend, result verification
//! - **`materialize`**: Assignment → display rows
//! - **`store`**: Schedule persistence on redb
//! - **`task`**: Solve-job submission
//! - **`engine`**: `request_solve` / `run` / `serve`
//!
//! # References
//!
//! - Schaerf (1999), "A Survey of Automated Timetabling"
//! - Burke & Petrovic (2002), "Recent Research Directions in Automated Timetabling"
//! - Williams (2013), "Model Building in Mathematical Programming", ch. 9

pub mod catalog;
pub mod combinator;
pub mod config;
pub mod engine;
pub mod error;
pub mod feasibility;
pub mod materialize;
pub mod model;
pub mod models;
pub mod solver;
pub mod store;
pub mod task;
pub mod validation;

pub use catalog::{CatalogRepository, CatalogSnapshot, InMemoryCatalog};
pub use config::EngineConfig;
pub use engine::{SolveReport, TimetableEngine};
pub use error::{EngineError, EngineResult};
pub use solver::{GoodLpBackend, OptimizerBackend, SolveOutcome};
pub use store::{ScheduleRepository, ScheduleStore};
pub use task::{ChannelSubmitter, SolveJob, TaskSubmitter};

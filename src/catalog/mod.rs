//! Read-only catalog access.
//!
//! The catalog (periods, teachers, rooms, courses, anchored placements,
//! mandatory groups) is owned by an external collaborator. The engine sees
//! it only through [`CatalogRepository`], whose every method is scoped to
//! one organization, and freezes it into a [`CatalogSnapshot`] at the start
//! of each solve.
//!
//! No locking is taken: an edit that lands while a long solve runs is not
//! seen by that solve (last snapshot wins).

mod memory;
mod snapshot;

pub use memory::InMemoryCatalog;
pub use snapshot::CatalogSnapshot;

use thiserror::Error;

use crate::models::{AnchoredCourse, Building, Course, MandatorySchedule, Period, Room, Teacher};

/// Result type alias for catalog reads.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by a catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog unavailable: {0}")]
    Unavailable(String),

    #[error("catalog decode error: {0}")]
    Decode(String),
}

/// Read-only catalog interface, parameterized by organization.
///
/// Implementations must return only rows whose `organization_id` equals
/// the argument.
pub trait CatalogRepository {
    /// Periods of an organization.
    fn periods(&self, organization_id: &str) -> CatalogResult<Vec<Period>>;

    /// Teachers of an organization.
    fn teachers(&self, organization_id: &str) -> CatalogResult<Vec<Teacher>>;

    /// Buildings of an organization.
    fn buildings(&self, organization_id: &str) -> CatalogResult<Vec<Building>>;

    /// Rooms of an organization.
    fn rooms(&self, organization_id: &str) -> CatalogResult<Vec<Room>>;

    /// Courses of an organization.
    fn courses(&self, organization_id: &str) -> CatalogResult<Vec<Course>>;

    /// Anchored placements of an organization.
    fn anchored_courses(&self, organization_id: &str) -> CatalogResult<Vec<AnchoredCourse>>;

    /// Mandatory groups of an organization.
    fn mandatory_schedules(&self, organization_id: &str)
        -> CatalogResult<Vec<MandatorySchedule>>;
}

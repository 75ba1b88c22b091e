//! Timetabling domain models.
//!
//! Catalog entities (owned by the external catalog collaborator and only
//! read by the engine) and the solve-side records the engine writes.
//! Every entity belongs to exactly one organization; the organization id
//! is the tenant boundary used by every read.
//!
//! # Domain Mappings
//!
//! | u-timetable | School | Clinic | Conference |
//! |-------------|--------|--------|------------|
//! | Period | Class period | Appointment block | Session slot |
//! | Teacher | Teacher | Practitioner | Speaker |
//! | Room | Classroom | Exam room | Hall |
//! | Course | Course section | Procedure | Talk |
//! | MandatorySchedule | Required course set | Care pathway | Track |

mod course;
mod organization;
mod period;
mod room;
mod schedule;
mod staff;

pub use course::{AnchoredCourse, Course, MandatorySchedule};
pub use organization::Organization;
pub use period::Period;
pub use room::{Building, Room};
pub use schedule::{ScheduleItem, ScheduleStatus, SolvedSchedule};
pub use staff::Teacher;

//! Result materialization.
//!
//! Turns verified tuples into [`ScheduleItem`] rows, copying display fields
//! from the snapshot the run was solved against.

use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::feasibility::Slot;
use crate::models::ScheduleItem;

/// Builds one row per tuple, ordered by period number, room label, then teacher.
///
/// `slots` must index into `snapshot` (as produced by a
/// [`FeasibilityIndex`](crate::feasibility::FeasibilityIndex) built from it).
pub fn materialize(
    snapshot: &CatalogSnapshot,
    solved_schedule_id: &str,
    slots: &[Slot],
) -> Vec<ScheduleItem> {
    let mut items: Vec<ScheduleItem> = slots
        .iter()
        .map(|s| {
            let period = &snapshot.periods[s.period];
            let teacher = &snapshot.teachers[s.teacher];
            let room = &snapshot.rooms[s.room];
            let course = &snapshot.courses[s.course];
            ScheduleItem {
                organization_id: snapshot.organization_id.clone(),
                solved_schedule_id: solved_schedule_id.to_string(),
                period_number: period.number,
                period_start: period.start,
                period_end: period.end,
                room: snapshot.room_label(room),
                teacher: teacher.display_name(),
                course: course.name.clone(),
                period_id: period.id.clone(),
                room_id: room.id.clone(),
                teacher_id: teacher.id.clone(),
                course_id: course.id.clone(),
            }
        })
        .collect();
    items.sort_by(|a, b| a.display_order().cmp(&b.display_order()));
    debug!(
        organization = %snapshot.organization_id,
        schedule = solved_schedule_id,
        rows = items.len(),
        "schedule rows materialized"
    );
    items
}

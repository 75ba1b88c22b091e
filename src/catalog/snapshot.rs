//! Immutable catalog snapshot.
//!
//! Taken once per solve. Rows are sorted deterministically (periods by
//! ordinal number, everything else by ID) so that index positions, model
//! variable order, and mandatory-group candidate order are stable across
//! runs of the same catalog.

use tracing::{debug, warn};

use super::{CatalogRepository, CatalogResult};
use crate::models::{AnchoredCourse, Building, Course, MandatorySchedule, Period, Room, Teacher};

/// One organization's catalog, frozen at the start of a solve.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Organization the snapshot was read for.
    pub organization_id: String,
    /// Periods, ordered by number.
    pub periods: Vec<Period>,
    /// Teachers, ordered by ID.
    pub teachers: Vec<Teacher>,
    /// Buildings, ordered by ID.
    pub buildings: Vec<Building>,
    /// Rooms, ordered by ID.
    pub rooms: Vec<Room>,
    /// Courses, ordered by ID.
    pub courses: Vec<Course>,
    /// Anchored placements, ordered by ID.
    pub anchored: Vec<AnchoredCourse>,
    /// Mandatory groups, ordered by ID.
    pub mandatory: Vec<MandatorySchedule>,
}

/// Drops rows a misbehaving repository returned for another tenant.
fn retain_tenant<T>(rows: &mut Vec<T>, organization_id: &str, kind: &str, org_of: fn(&T) -> &str) {
    let before = rows.len();
    rows.retain(|row| org_of(row) == organization_id);
    let leaked = before - rows.len();
    if leaked > 0 {
        warn!(
            organization = organization_id,
            kind, leaked, "catalog returned rows of another organization; discarded"
        );
    }
}

impl CatalogSnapshot {
    /// Reads every catalog collection for one organization.
    pub fn load<R>(repository: &R, organization_id: &str) -> CatalogResult<Self>
    where
        R: CatalogRepository + ?Sized,
    {
        let mut periods = repository.periods(organization_id)?;
        let mut teachers = repository.teachers(organization_id)?;
        let mut buildings = repository.buildings(organization_id)?;
        let mut rooms = repository.rooms(organization_id)?;
        let mut courses = repository.courses(organization_id)?;
        let mut anchored = repository.anchored_courses(organization_id)?;
        let mut mandatory = repository.mandatory_schedules(organization_id)?;

        retain_tenant(&mut periods, organization_id, "period", |r| r.organization_id.as_str());
        retain_tenant(&mut teachers, organization_id, "teacher", |r| r.organization_id.as_str());
        retain_tenant(&mut buildings, organization_id, "building", |r| r.organization_id.as_str());
        retain_tenant(&mut rooms, organization_id, "room", |r| r.organization_id.as_str());
        retain_tenant(&mut courses, organization_id, "course", |r| r.organization_id.as_str());
        retain_tenant(&mut anchored, organization_id, "anchored", |r| r.organization_id.as_str());
        retain_tenant(&mut mandatory, organization_id, "mandatory", |r| r.organization_id.as_str());

        periods.sort_by(|a, b| a.number.cmp(&b.number).then_with(|| a.id.cmp(&b.id)));
        teachers.sort_by(|a, b| a.id.cmp(&b.id));
        buildings.sort_by(|a, b| a.id.cmp(&b.id));
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        courses.sort_by(|a, b| a.id.cmp(&b.id));
        anchored.sort_by(|a, b| a.id.cmp(&b.id));
        mandatory.sort_by(|a, b| a.id.cmp(&b.id));

        let snapshot = Self {
            organization_id: organization_id.to_string(),
            periods,
            teachers,
            buildings,
            rooms,
            courses,
            anchored,
            mandatory,
        };
        debug!(
            organization = organization_id,
            periods = snapshot.periods.len(),
            teachers = snapshot.teachers.len(),
            rooms = snapshot.rooms.len(),
            courses = snapshot.courses.len(),
            anchored = snapshot.anchored.len(),
            mandatory = snapshot.mandatory.len(),
            "catalog snapshot loaded"
        );
        Ok(snapshot)
    }

    /// Size of the full period×teacher×room×course space.
    ///
    /// `None` on `usize` overflow.
    pub fn space_size(&self) -> Option<usize> {
        self.periods
            .len()
            .checked_mul(self.teachers.len())?
            .checked_mul(self.rooms.len())?
            .checked_mul(self.courses.len())
    }

    /// Finds a building by ID.
    pub fn building(&self, id: &str) -> Option<&Building> {
        self.buildings.iter().find(|b| b.id == id)
    }

    /// Display label of a room, resolved against this snapshot's buildings.
    pub fn room_label(&self, room: &Room) -> String {
        room.label(self.building(&room.building_id))
    }
}

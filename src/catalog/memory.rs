//! In-memory catalog.
//!
//! Holds rows for any number of organizations and filters every read by
//! organization id. Used by tests and by the CLI, which loads it from a
//! JSON document.

use serde::{Deserialize, Serialize};

use super::{CatalogError, CatalogRepository, CatalogResult};
use crate::models::{
    AnchoredCourse, Building, Course, MandatorySchedule, Organization, Period, Room, Teacher,
};

/// A multi-tenant catalog held in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InMemoryCatalog {
    pub organizations: Vec<Organization>,
    pub periods: Vec<Period>,
    pub teachers: Vec<Teacher>,
    pub buildings: Vec<Building>,
    pub rooms: Vec<Room>,
    pub courses: Vec<Course>,
    pub anchored_courses: Vec<AnchoredCourse>,
    pub mandatory_schedules: Vec<MandatorySchedule>,
}

fn owned_by<T: Clone>(rows: &[T], organization_id: &str, org_of: impl Fn(&T) -> &str) -> Vec<T> {
    rows.iter()
        .filter(|row| org_of(row) == organization_id)
        .cloned()
        .collect()
}

impl InMemoryCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a catalog from JSON.
    pub fn from_json_str(source: &str) -> CatalogResult<Self> {
        serde_json::from_str(source).map_err(|e| CatalogError::Decode(e.to_string()))
    }

    /// Adds an organization.
    pub fn with_organization(mut self, org: Organization) -> Self {
        self.organizations.push(org);
        self
    }

    /// Adds a period.
    pub fn with_period(mut self, period: Period) -> Self {
        self.periods.push(period);
        self
    }

    /// Adds a teacher.
    pub fn with_teacher(mut self, teacher: Teacher) -> Self {
        self.teachers.push(teacher);
        self
    }

    /// Adds a building.
    pub fn with_building(mut self, building: Building) -> Self {
        self.buildings.push(building);
        self
    }

    /// Adds a room.
    pub fn with_room(mut self, room: Room) -> Self {
        self.rooms.push(room);
        self
    }

    /// Adds a course.
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.push(course);
        self
    }

    /// Adds an anchored placement.
    pub fn with_anchored(mut self, anchored: AnchoredCourse) -> Self {
        self.anchored_courses.push(anchored);
        self
    }

    /// Adds a mandatory group.
    pub fn with_mandatory(mut self, group: MandatorySchedule) -> Self {
        self.mandatory_schedules.push(group);
        self
    }
}

impl CatalogRepository for InMemoryCatalog {
    fn periods(&self, organization_id: &str) -> CatalogResult<Vec<Period>> {
        Ok(owned_by(&self.periods, organization_id, |p| p.organization_id.as_str()))
    }

    fn teachers(&self, organization_id: &str) -> CatalogResult<Vec<Teacher>> {
        Ok(owned_by(&self.teachers, organization_id, |t| t.organization_id.as_str()))
    }

    fn buildings(&self, organization_id: &str) -> CatalogResult<Vec<Building>> {
        Ok(owned_by(&self.buildings, organization_id, |b| b.organization_id.as_str()))
    }

    fn rooms(&self, organization_id: &str) -> CatalogResult<Vec<Room>> {
        Ok(owned_by(&self.rooms, organization_id, |r| r.organization_id.as_str()))
    }

    fn courses(&self, organization_id: &str) -> CatalogResult<Vec<Course>> {
        Ok(owned_by(&self.courses, organization_id, |c| c.organization_id.as_str()))
    }

    fn anchored_courses(&self, organization_id: &str) -> CatalogResult<Vec<AnchoredCourse>> {
        Ok(owned_by(&self.anchored_courses, organization_id, |a| {
            a.organization_id.as_str()
        }))
    }

    fn mandatory_schedules(
        &self,
        organization_id: &str,
    ) -> CatalogResult<Vec<MandatorySchedule>> {
        Ok(owned_by(&self.mandatory_schedules, organization_id, |m| {
            m.organization_id.as_str()
        }))
    }
}

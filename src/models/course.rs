//! Course, anchored placement, and mandatory group models.
//!
//! A course lists which teachers may teach it, which rooms may host it,
//! and which periods it may never occupy. It must be placed exactly
//! `offered` times in an optimal schedule.
//!
//! # Reference
//! Schaerf (1999), "A Survey of Automated Timetabling", §2 (class-teacher
//! timetabling with availability and pre-assignment)

use serde::{Deserialize, Serialize};

/// A course to be placed into (period, room, teacher) slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique course identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Display name.
    pub name: String,
    /// Number of instances that must be placed (≥ 1).
    pub offered: u32,
    /// Teachers eligible to teach this course.
    #[serde(default)]
    pub teacher_ids: Vec<String>,
    /// Rooms eligible to host this course.
    #[serde(default)]
    pub room_ids: Vec<String>,
    /// Periods this course may never occupy.
    #[serde(default)]
    pub barred_period_ids: Vec<String>,
}

/// A pinned (course, period, room, teacher) placement.
///
/// Must appear verbatim in every valid schedule. At most one anchored
/// placement may occupy a given (room, period) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchoredCourse {
    /// Unique identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Pinned course.
    pub course_id: String,
    /// Pinned period.
    pub period_id: String,
    /// Pinned room.
    pub room_id: String,
    /// Pinned teacher.
    pub teacher_id: String,
}

/// A set of courses that must all be placed, each in a distinct period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MandatorySchedule {
    /// Unique identifier.
    pub id: String,
    /// Owning organization.
    pub organization_id: String,
    /// Optional display name.
    #[serde(default)]
    pub name: String,
    /// Member courses.
    pub course_ids: Vec<String>,
}

impl Course {
    /// Creates a course offered once with no eligible teachers or rooms.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            name: name.into(),
            offered: 1,
            teacher_ids: Vec::new(),
            room_ids: Vec::new(),
            barred_period_ids: Vec::new(),
        }
    }

    /// Sets the number of instances to place.
    pub fn with_offered(mut self, offered: u32) -> Self {
        self.offered = offered;
        self
    }

    /// Adds an eligible teacher.
    pub fn with_teacher(mut self, teacher_id: impl Into<String>) -> Self {
        self.teacher_ids.push(teacher_id.into());
        self
    }

    /// Adds an eligible room.
    pub fn with_room(mut self, room_id: impl Into<String>) -> Self {
        self.room_ids.push(room_id.into());
        self
    }

    /// Bars a period.
    pub fn with_barred_period(mut self, period_id: impl Into<String>) -> Self {
        self.barred_period_ids.push(period_id.into());
        self
    }

    /// Whether a teacher may teach this course.
    pub fn allows_teacher(&self, teacher_id: &str) -> bool {
        self.teacher_ids.iter().any(|t| t == teacher_id)
    }

    /// Whether a room may host this course.
    pub fn allows_room(&self, room_id: &str) -> bool {
        self.room_ids.iter().any(|r| r == room_id)
    }

    /// Whether a period is barred for this course.
    pub fn is_barred(&self, period_id: &str) -> bool {
        self.barred_period_ids.iter().any(|p| p == period_id)
    }
}

impl AnchoredCourse {
    /// Creates an anchored placement.
    pub fn new(
        id: impl Into<String>,
        organization_id: impl Into<String>,
        course_id: impl Into<String>,
        period_id: impl Into<String>,
        room_id: impl Into<String>,
        teacher_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            course_id: course_id.into(),
            period_id: period_id.into(),
            room_id: room_id.into(),
            teacher_id: teacher_id.into(),
        }
    }
}

impl MandatorySchedule {
    /// Creates an empty mandatory group.
    pub fn new(id: impl Into<String>, organization_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            organization_id: organization_id.into(),
            name: String::new(),
            course_ids: Vec::new(),
        }
    }

    /// Sets the display name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a member course.
    pub fn with_course(mut self, course_id: impl Into<String>) -> Self {
        self.course_ids.push(course_id.into());
        self
    }

    /// Member courses with duplicates removed, first occurrence kept.
    pub fn distinct_courses(&self) -> Vec<&str> {
        let mut seen = Vec::with_capacity(self.course_ids.len());
        for id in &self.course_ids {
            if !seen.contains(&id.as_str()) {
                seen.push(id.as_str());
            }
        }
        seen
    }
}

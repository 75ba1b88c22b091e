//! Catalog validation.
//!
//! Checks the structural integrity of a catalog snapshot before any model
//! is built. Detects:
//! - Duplicate IDs and dangling references
//! - Courses offered zero times
//! - Mandatory groups with more courses than the organization has periods
//! - Anchored placements that contradict their course (barred period,
//!   ineligible room or teacher), exceed its offered count, or collide
//!   with another anchor on the same room or teacher in the same period
//!
//! Failures here are rejected immediately and never reach the optimizer.
//! Size bounds (variable space, candidate placements) are enforced by
//! [`crate::feasibility`] and [`crate::combinator`] using the same error type.

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::catalog::CatalogSnapshot;

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities of the same type share an ID.
    DuplicateId,
    /// An entity references an ID that does not exist in the organization.
    InvalidReference,
    /// A course is offered zero times.
    InvalidOffered,
    /// A mandatory group has more courses than there are periods.
    MandatoryGroupTooLarge,
    /// An anchored placement sits in one of its course's barred periods.
    AnchorInBarredPeriod,
    /// An anchored placement uses a room its course does not allow.
    AnchorIneligibleRoom,
    /// An anchored placement uses a teacher its course does not allow.
    AnchorIneligibleTeacher,
    /// A course has more anchored placements than its offered count.
    AnchorExceedsOffered,
    /// Two anchored placements share a (room, period) or (teacher, period).
    AnchorSlotConflict,
    /// The period×teacher×room×course space exceeds the configured bound.
    ModelTooLarge,
    /// A mandatory group has more candidate placements than the configured bound.
    TooManyCandidates,
}

impl ValidationError {
    pub(crate) fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

fn check_unique<'a>(
    kind: &str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) -> HashSet<&'a str> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            errors.push(ValidationError::new(
                ValidationErrorKind::DuplicateId,
                format!("Duplicate {kind} ID: {id}"),
            ));
        }
    }
    seen
}

/// Validates a catalog snapshot.
///
/// Checks:
/// 1. No duplicate IDs within each entity type
/// 2. Rooms reference existing buildings
/// 3. Courses reference existing teachers, rooms, and periods, and are offered at least once
/// 4. Mandatory groups reference existing courses and fit in the period count
/// 5. Anchored placements reference existing entities and agree with their course
/// 6. Anchored placements do not exceed offered counts or share a room or teacher in one period
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_snapshot(snapshot: &CatalogSnapshot) -> ValidationResult {
    let mut errors = Vec::new();

    let period_ids = check_unique("period", snapshot.periods.iter().map(|p| p.id.as_str()), &mut errors);
    let teacher_ids = check_unique("teacher", snapshot.teachers.iter().map(|t| t.id.as_str()), &mut errors);
    let building_ids = check_unique("building", snapshot.buildings.iter().map(|b| b.id.as_str()), &mut errors);
    let room_ids = check_unique("room", snapshot.rooms.iter().map(|r| r.id.as_str()), &mut errors);
    let course_ids = check_unique("course", snapshot.courses.iter().map(|c| c.id.as_str()), &mut errors);
    check_unique("anchored course", snapshot.anchored.iter().map(|a| a.id.as_str()), &mut errors);
    check_unique("mandatory schedule", snapshot.mandatory.iter().map(|m| m.id.as_str()), &mut errors);

    for room in &snapshot.rooms {
        if !building_ids.contains(room.building_id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!("Room '{}' references unknown building '{}'", room.id, room.building_id),
            ));
        }
    }

    for course in &snapshot.courses {
        if course.offered == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidOffered,
                format!("Course '{}' must be offered at least once", course.id),
            ));
        }
        for t in &course.teacher_ids {
            if !teacher_ids.contains(t.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Course '{}' references unknown teacher '{t}'", course.id),
                ));
            }
        }
        for r in &course.room_ids {
            if !room_ids.contains(r.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Course '{}' references unknown room '{r}'", course.id),
                ));
            }
        }
        for p in &course.barred_period_ids {
            if !period_ids.contains(p.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Course '{}' bars unknown period '{p}'", course.id),
                ));
            }
        }
    }

    let period_count = snapshot.periods.len();
    for group in &snapshot.mandatory {
        let members = group.distinct_courses();
        for c in &members {
            if !course_ids.contains(c) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Mandatory schedule '{}' references unknown course '{c}'", group.id),
                ));
            }
        }
        if members.len() > period_count {
            errors.push(ValidationError::new(
                ValidationErrorKind::MandatoryGroupTooLarge,
                format!(
                    "Mandatory schedule '{}' has {} courses but the organization has only {} periods",
                    group.id,
                    members.len(),
                    period_count
                ),
            ));
        }
    }

    validate_anchors(snapshot, &period_ids, &teacher_ids, &room_ids, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_anchors(
    snapshot: &CatalogSnapshot,
    period_ids: &HashSet<&str>,
    teacher_ids: &HashSet<&str>,
    room_ids: &HashSet<&str>,
    errors: &mut Vec<ValidationError>,
) {
    let courses: HashMap<&str, _> = snapshot
        .courses
        .iter()
        .map(|c| (c.id.as_str(), c))
        .collect();
    let mut per_course: HashMap<&str, u32> = HashMap::new();
    let mut room_slots: HashMap<(&str, &str), &str> = HashMap::new();
    let mut teacher_slots: HashMap<(&str, &str), &str> = HashMap::new();

    for anchor in &snapshot.anchored {
        let refs = [
            ("period", anchor.period_id.as_str(), period_ids.contains(anchor.period_id.as_str())),
            ("teacher", anchor.teacher_id.as_str(), teacher_ids.contains(anchor.teacher_id.as_str())),
            ("room", anchor.room_id.as_str(), room_ids.contains(anchor.room_id.as_str())),
        ];
        for (kind, id, exists) in refs {
            if !exists {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("Anchored course '{}' references unknown {kind} '{id}'", anchor.id),
                ));
            }
        }

        match courses.get(anchor.course_id.as_str()) {
            None => errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                format!(
                    "Anchored course '{}' references unknown course '{}'",
                    anchor.id, anchor.course_id
                ),
            )),
            Some(course) => {
                if course.is_barred(&anchor.period_id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AnchorInBarredPeriod,
                        format!(
                            "Anchored course '{}' cannot be placed in period '{}', which course '{}' bars",
                            anchor.id, anchor.period_id, course.id
                        ),
                    ));
                }
                if !course.allows_room(&anchor.room_id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AnchorIneligibleRoom,
                        format!(
                            "Anchored course '{}' uses room '{}', which course '{}' does not allow",
                            anchor.id, anchor.room_id, course.id
                        ),
                    ));
                }
                if !course.allows_teacher(&anchor.teacher_id) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AnchorIneligibleTeacher,
                        format!(
                            "Anchored course '{}' uses teacher '{}', who cannot teach course '{}'",
                            anchor.id, anchor.teacher_id, course.id
                        ),
                    ));
                }
                let count = per_course.entry(course.id.as_str()).or_insert(0);
                *count += 1;
                if *count == course.offered + 1 {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::AnchorExceedsOffered,
                        format!(
                            "Course '{}' has more anchored placements than its offered count ({})",
                            course.id, course.offered
                        ),
                    ));
                }
            }
        }

        let room_key = (anchor.room_id.as_str(), anchor.period_id.as_str());
        if let Some(other) = room_slots.insert(room_key, anchor.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::AnchorSlotConflict,
                format!(
                    "Anchored courses '{other}' and '{}' both occupy room '{}' in period '{}'",
                    anchor.id, anchor.room_id, anchor.period_id
                ),
            ));
        }
        let teacher_key = (anchor.teacher_id.as_str(), anchor.period_id.as_str());
        if let Some(other) = teacher_slots.insert(teacher_key, anchor.id.as_str()) {
            errors.push(ValidationError::new(
                ValidationErrorKind::AnchorSlotConflict,
                format!(
                    "Anchored courses '{other}' and '{}' both need teacher '{}' in period '{}'",
                    anchor.id, anchor.teacher_id, anchor.period_id
                ),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::models::{AnchoredCourse, Building, Course, MandatorySchedule, Period, Room, Teacher};

    fn base_catalog() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_period(Period::new("p1", "o", 1))
            .with_period(Period::new("p2", "o", 2))
            .with_teacher(Teacher::new("t1", "o", "Noether", "Emmy"))
            .with_teacher(Teacher::new("t2", "o", "Euler", "Leonhard"))
            .with_building(Building::new("b1", "o", "Main"))
            .with_room(Room::new("r1", "o", 101, "b1"))
            .with_room(Room::new("r2", "o", 102, "b1"))
            .with_course(
                Course::new("c1", "o", "Algebra")
                    .with_teacher("t1")
                    .with_room("r1")
                    .with_barred_period("p2"),
            )
            .with_course(Course::new("c2", "o", "Geometry").with_teacher("t2").with_room("r2"))
    }

    fn snapshot(cat: &InMemoryCatalog) -> CatalogSnapshot {
        CatalogSnapshot::load(cat, "o").unwrap()
    }

    fn kinds(result: ValidationResult) -> Vec<ValidationErrorKind> {
        result.unwrap_err().into_iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_valid_catalog() {
        let cat = base_catalog()
            .with_anchored(AnchoredCourse::new("a1", "o", "c1", "p1", "r1", "t1"))
            .with_mandatory(
                MandatorySchedule::new("m1", "o")
                    .with_course("c1")
                    .with_course("c2"),
            );
        assert!(validate_snapshot(&snapshot(&cat)).is_ok());
    }

    #[test]
    fn test_duplicate_course_id() {
        let cat = base_catalog().with_course(Course::new("c1", "o", "Dup"));
        let errors = validate_snapshot(&snapshot(&cat)).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::DuplicateId && e.message.contains("course")));
    }

    #[test]
    fn test_unknown_references() {
        let cat = base_catalog()
            .with_room(Room::new("r9", "o", 9, "nowhere"))
            .with_course(Course::new("c9", "o", "Ghost").with_teacher("t9").with_barred_period("p9"));
        let found = kinds(validate_snapshot(&snapshot(&cat)));
        assert_eq!(
            found
                .iter()
                .filter(|k| **k == ValidationErrorKind::InvalidReference)
                .count(),
            3
        );
    }

    #[test]
    fn test_zero_offered() {
        let cat = base_catalog().with_course(Course::new("c3", "o", "Empty").with_offered(0));
        assert!(kinds(validate_snapshot(&snapshot(&cat))).contains(&ValidationErrorKind::InvalidOffered));
    }

    #[test]
    fn test_mandatory_group_exceeds_periods() {
        // Two courses, one period.
        let cat = InMemoryCatalog::new()
            .with_period(Period::new("p1", "o", 1))
            .with_course(Course::new("c1", "o", "A"))
            .with_course(Course::new("c2", "o", "B"))
            .with_mandatory(MandatorySchedule::new("m1", "o").with_course("c1").with_course("c2"));
        let errors = validate_snapshot(&snapshot(&cat)).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::MandatoryGroupTooLarge);
    }

    #[test]
    fn test_mandatory_duplicate_members_counted_once() {
        let cat = InMemoryCatalog::new()
            .with_period(Period::new("p1", "o", 1))
            .with_course(Course::new("c1", "o", "A"))
            .with_mandatory(MandatorySchedule::new("m1", "o").with_course("c1").with_course("c1"));
        assert!(validate_snapshot(&snapshot(&cat)).is_ok());
    }

    #[test]
    fn test_anchor_in_barred_period() {
        let cat = base_catalog().with_anchored(AnchoredCourse::new("a1", "o", "c1", "p2", "r1", "t1"));
        assert_eq!(
            kinds(validate_snapshot(&snapshot(&cat))),
            vec![ValidationErrorKind::AnchorInBarredPeriod]
        );
    }

    #[test]
    fn test_anchor_ineligible_room_and_teacher() {
        let cat = base_catalog().with_anchored(AnchoredCourse::new("a1", "o", "c1", "p1", "r2", "t2"));
        let found = kinds(validate_snapshot(&snapshot(&cat)));
        assert!(found.contains(&ValidationErrorKind::AnchorIneligibleRoom));
        assert!(found.contains(&ValidationErrorKind::AnchorIneligibleTeacher));
    }

    #[test]
    fn test_anchor_exceeds_offered() {
        let cat = base_catalog()
            .with_anchored(AnchoredCourse::new("a1", "o", "c2", "p1", "r2", "t2"))
            .with_anchored(AnchoredCourse::new("a2", "o", "c2", "p2", "r2", "t2"));
        assert_eq!(
            kinds(validate_snapshot(&snapshot(&cat))),
            vec![ValidationErrorKind::AnchorExceedsOffered]
        );
    }

    #[test]
    fn test_anchor_room_period_conflict() {
        let cat = base_catalog()
            .with_course(
                Course::new("c3", "o", "Physics")
                    .with_teacher("t2")
                    .with_room("r1"),
            )
            .with_anchored(AnchoredCourse::new("a1", "o", "c1", "p1", "r1", "t1"))
            .with_anchored(AnchoredCourse::new("a2", "o", "c3", "p1", "r1", "t2"));
        assert_eq!(
            kinds(validate_snapshot(&snapshot(&cat))),
            vec![ValidationErrorKind::AnchorSlotConflict]
        );
    }

    #[test]
    fn test_multiple_errors() {
        let cat = base_catalog()
            .with_course(Course::new("c3", "o", "Bad").with_offered(0).with_room("r404"))
            .with_anchored(AnchoredCourse::new("a1", "o", "c404", "p1", "r1", "t1"));
        let errors = validate_snapshot(&snapshot(&cat)).unwrap_err();
        assert!(errors.len() >= 3);
    }
}

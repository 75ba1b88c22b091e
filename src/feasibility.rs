//! Feasibility index.
//!
//! Precomputes, per course, the barred periods and the eligible teachers
//! and rooms, and derives two predicates over the full
//! period×teacher×room×course space:
//!
//! - `possible(p,t,r,c) = p ∉ barred(c) ∧ t ∈ teachers(c) ∧ r ∈ rooms(c)`
//! - `anchored(p,t,r,c)` iff an anchored placement matches the tuple exactly
//!
//! Both are answered in O(1) from dense per-course tables. The full space
//! is O(P·T·R·C); [`FeasibilityIndex::build`] refuses catalogs whose space
//! exceeds [`EngineConfig::max_variables`], and [`FeasibilityIndex::possible_slots`]
//! walks only the compatible tuples, course by course, so callers never
//! materialize the cross product to find them.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::config::EngineConfig;
use crate::validation::{ValidationError, ValidationErrorKind};

/// A (period, teacher, room, course) tuple, by snapshot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot {
    pub period: usize,
    pub teacher: usize,
    pub room: usize,
    pub course: usize,
}

impl Slot {
    /// Creates a slot.
    pub fn new(period: usize, teacher: usize, room: usize, course: usize) -> Self {
        Self {
            period,
            teacher,
            room,
            course,
        }
    }
}

/// Extents of the four index dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub periods: usize,
    pub teachers: usize,
    pub rooms: usize,
    pub courses: usize,
}

impl Dimensions {
    /// Number of tuples in the full cross product.
    pub fn len(&self) -> usize {
        self.periods * self.teachers * self.rooms * self.courses
    }

    /// Whether any dimension is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dense row-major position of a slot (period outermost, course innermost).
    #[inline]
    pub fn flatten(&self, slot: Slot) -> usize {
        ((slot.period * self.teachers + slot.teacher) * self.rooms + slot.room) * self.courses
            + slot.course
    }

    /// Inverse of [`Dimensions::flatten`].
    #[inline]
    pub fn unflatten(&self, mut index: usize) -> Slot {
        let course = index % self.courses;
        index /= self.courses;
        let room = index % self.rooms;
        index /= self.rooms;
        let teacher = index % self.teachers;
        let period = index / self.teachers;
        Slot::new(period, teacher, room, course)
    }
}

/// Per-course compatibility tables and the anchoring set.
#[derive(Debug, Clone)]
pub struct FeasibilityIndex {
    dims: Dimensions,
    /// `[course][period]`
    barred: Vec<Vec<bool>>,
    /// `[course]` → eligible teacher positions, ascending.
    teachers: Vec<Vec<usize>>,
    /// `[course]` → eligible room positions, ascending.
    rooms: Vec<Vec<usize>>,
    /// `[course][teacher]`
    teacher_ok: Vec<Vec<bool>>,
    /// `[course][room]`
    room_ok: Vec<Vec<bool>>,
    offered: Vec<u32>,
    avoided: Vec<bool>,
    anchored: BTreeSet<Slot>,
    course_pos: HashMap<String, usize>,
}

fn positions<'a>(ids: impl Iterator<Item = &'a str>) -> HashMap<&'a str, usize> {
    ids.enumerate().map(|(i, id)| (id, i)).collect()
}

impl FeasibilityIndex {
    /// Builds the index from a validated snapshot.
    ///
    /// Unknown IDs in eligibility lists are ignored; validation reports them.
    ///
    /// # Errors
    /// `ModelTooLarge` when P·T·R·C exceeds `config.max_variables`.
    pub fn build(
        snapshot: &CatalogSnapshot,
        config: &EngineConfig,
    ) -> Result<Self, Vec<ValidationError>> {
        let dims = Dimensions {
            periods: snapshot.periods.len(),
            teachers: snapshot.teachers.len(),
            rooms: snapshot.rooms.len(),
            courses: snapshot.courses.len(),
        };
        match snapshot.space_size() {
            Some(n) if n <= config.max_variables => {}
            size => {
                let described = size.map_or_else(|| "overflowing".to_string(), |n| n.to_string());
                return Err(vec![ValidationError::new(
                    ValidationErrorKind::ModelTooLarge,
                    format!(
                        "{} periods × {} teachers × {} rooms × {} courses = {described} variables exceeds the limit of {}",
                        dims.periods, dims.teachers, dims.rooms, dims.courses, config.max_variables
                    ),
                )]);
            }
        }

        let period_pos = positions(snapshot.periods.iter().map(|p| p.id.as_str()));
        let teacher_pos = positions(snapshot.teachers.iter().map(|t| t.id.as_str()));
        let room_pos = positions(snapshot.rooms.iter().map(|r| r.id.as_str()));

        let mut barred = Vec::with_capacity(dims.courses);
        let mut teachers = Vec::with_capacity(dims.courses);
        let mut rooms = Vec::with_capacity(dims.courses);
        let mut teacher_ok = Vec::with_capacity(dims.courses);
        let mut room_ok = Vec::with_capacity(dims.courses);

        for course in &snapshot.courses {
            let mut b = vec![false; dims.periods];
            for p in course.barred_period_ids.iter().filter_map(|id| period_pos.get(id.as_str())) {
                b[*p] = true;
            }
            let mut t_ok = vec![false; dims.teachers];
            for t in course.teacher_ids.iter().filter_map(|id| teacher_pos.get(id.as_str())) {
                t_ok[*t] = true;
            }
            let mut r_ok = vec![false; dims.rooms];
            for r in course.room_ids.iter().filter_map(|id| room_pos.get(id.as_str())) {
                r_ok[*r] = true;
            }
            teachers.push((0..dims.teachers).filter(|&t| t_ok[t]).collect());
            rooms.push((0..dims.rooms).filter(|&r| r_ok[r]).collect());
            barred.push(b);
            teacher_ok.push(t_ok);
            room_ok.push(r_ok);
        }

        let course_pos: HashMap<String, usize> = snapshot
            .courses
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.clone(), i))
            .collect();

        let anchored = snapshot
            .anchored
            .iter()
            .filter_map(|a| {
                Some(Slot::new(
                    *period_pos.get(a.period_id.as_str())?,
                    *teacher_pos.get(a.teacher_id.as_str())?,
                    *room_pos.get(a.room_id.as_str())?,
                    *course_pos.get(a.course_id.as_str())?,
                ))
            })
            .collect();

        let index = Self {
            dims,
            barred,
            teachers,
            rooms,
            teacher_ok,
            room_ok,
            offered: snapshot.courses.iter().map(|c| c.offered).collect(),
            avoided: snapshot.periods.iter().map(|p| p.avoid).collect(),
            anchored,
            course_pos,
        };
        debug!(
            organization = %snapshot.organization_id,
            space = dims.len(),
            possible = index.possible_count(),
            anchored = index.anchored.len(),
            "feasibility index built"
        );
        Ok(index)
    }

    /// Index extents.
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Whether a tuple may legally be assigned.
    #[inline]
    pub fn possible(&self, slot: Slot) -> bool {
        !self.barred[slot.course][slot.period]
            && self.teacher_ok[slot.course][slot.teacher]
            && self.room_ok[slot.course][slot.room]
    }

    /// Whether a tuple is pinned by an anchored placement.
    #[inline]
    pub fn anchored(&self, slot: Slot) -> bool {
        self.anchored.contains(&slot)
    }

    /// Anchored tuples in ascending order.
    pub fn anchored_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.anchored.iter().copied()
    }

    /// Whether a course can occupy a period with at least one teacher and room.
    pub fn placeable(&self, period: usize, course: usize) -> bool {
        !self.barred[course][period]
            && !self.teachers[course].is_empty()
            && !self.rooms[course].is_empty()
    }

    /// Required placement count of a course.
    pub fn offered(&self, course: usize) -> u32 {
        self.offered[course]
    }

    /// Whether a period is flagged avoid.
    pub fn is_avoided(&self, period: usize) -> bool {
        self.avoided[period]
    }

    /// Snapshot position of a course ID.
    pub fn course_position(&self, id: &str) -> Option<usize> {
        self.course_pos.get(id).copied()
    }

    /// Every tuple where `possible` holds, course by course.
    pub fn possible_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.dims.courses).flat_map(move |c| self.possible_slots_for(c))
    }

    /// Tuples where `possible` holds for one course.
    pub fn possible_slots_for(&self, course: usize) -> impl Iterator<Item = Slot> + '_ {
        (0..self.dims.periods)
            .filter(move |&p| !self.barred[course][p])
            .flat_map(move |p| {
                self.teachers[course].iter().flat_map(move |&t| {
                    self.rooms[course]
                        .iter()
                        .map(move |&r| Slot::new(p, t, r, course))
                })
            })
    }

    /// Number of tuples where `possible` holds.
    pub fn possible_count(&self) -> usize {
        (0..self.dims.courses)
            .map(|c| {
                let periods = self.barred[c].iter().filter(|b| !**b).count();
                periods * self.teachers[c].len() * self.rooms[c].len()
            })
            .sum()
    }
}

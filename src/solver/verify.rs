//! Post-solve invariant check.
//!
//! Re-derives every hard rule from the feasibility index (not from the
//! model) and checks an optimal assignment against it. A failure here means
//! the model or the backend is wrong; callers abort without persisting.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::combinator::GroupCandidates;
use crate::feasibility::{FeasibilityIndex, Slot};
use crate::model::{Assignment, VarId};

/// A hard rule broken by an "optimal" assignment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("assignment has {actual} values for {expected} variables")]
    WrongLength { expected: usize, actual: usize },

    #[error("tuple {slot:?} is assigned but not possible")]
    ImpossibleTuple { slot: Slot },

    #[error("anchored tuple {slot:?} is not assigned")]
    AnchorDropped { slot: Slot },

    #[error("teacher {teacher} is assigned twice in period {period}")]
    TeacherDoubleBooked { period: usize, teacher: usize },

    #[error("room {room} is assigned twice in period {period}")]
    RoomDoubleBooked { period: usize, room: usize },

    #[error("course {course} is placed {actual} times, expected {expected}")]
    OfferedMismatch {
        course: usize,
        expected: u32,
        actual: u32,
    },

    #[error("mandatory schedule '{group_id}' has no fully realized candidate placement")]
    MandatoryUnsatisfied { group_id: String },
}

/// Checks an assignment and returns its true tuples in index order.
///
/// # Errors
/// The first broken rule, checked in the order: length, possible,
/// anchored, teacher per period, room per period, offered, mandatory.
pub fn verify_assignment(
    index: &FeasibilityIndex,
    groups: &[GroupCandidates],
    assignment: &Assignment,
) -> Result<Vec<Slot>, InvariantViolation> {
    let dims = index.dimensions();
    if assignment.len() != dims.len() {
        return Err(InvariantViolation::WrongLength {
            expected: dims.len(),
            actual: assignment.len(),
        });
    }

    let slots: Vec<Slot> = assignment.true_vars().map(|v| dims.unflatten(v.0)).collect();

    if let Some(&slot) = slots.iter().find(|s| !index.possible(**s)) {
        return Err(InvariantViolation::ImpossibleTuple { slot });
    }
    if let Some(slot) = index
        .anchored_slots()
        .find(|s| !assignment.is_true(VarId(dims.flatten(*s))))
    {
        return Err(InvariantViolation::AnchorDropped { slot });
    }

    let mut teacher_busy = HashSet::new();
    let mut room_busy = HashSet::new();
    let mut placed: HashMap<usize, u32> = HashMap::new();
    for s in &slots {
        if !teacher_busy.insert((s.period, s.teacher)) {
            return Err(InvariantViolation::TeacherDoubleBooked {
                period: s.period,
                teacher: s.teacher,
            });
        }
        if !room_busy.insert((s.period, s.room)) {
            return Err(InvariantViolation::RoomDoubleBooked {
                period: s.period,
                room: s.room,
            });
        }
        *placed.entry(s.course).or_insert(0) += 1;
    }
    for course in 0..dims.courses {
        let actual = placed.get(&course).copied().unwrap_or(0);
        let expected = index.offered(course);
        if actual != expected {
            return Err(InvariantViolation::OfferedMismatch {
                course,
                expected,
                actual,
            });
        }
    }

    let occupied: HashSet<(usize, usize)> = slots.iter().map(|s| (s.period, s.course)).collect();
    for group in groups.iter().filter(|g| !g.courses.is_empty()) {
        let realized = group
            .candidates
            .iter()
            .any(|cand| cand.pairs.iter().all(|pair| occupied.contains(pair)));
        if !realized {
            return Err(InvariantViolation::MandatoryUnsatisfied {
                group_id: group.group_id.clone(),
            });
        }
    }

    Ok(slots)
}

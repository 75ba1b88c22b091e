//! Mandatory-group candidate enumeration.
//!
//! A mandatory group of k courses must occupy k distinct periods. A
//! *candidate placement* is one injective mapping of the group's courses
//! (in membership order) onto periods; the group is satisfied when at
//! least one candidate is fully realized.
//!
//! # Complexity
//!
//! There are P!/(P−k)! candidates for P periods, exponential in k. This
//! is the engine's only combinatorial-explosion point, so enumeration:
//! - prunes (period, course) pairs that can never be realized (barred
//!   period, or a course with no eligible teacher or room), and
//! - stops with `TooManyCandidates` once a group yields more realizable
//!   candidates than [`EngineConfig::max_group_candidates`].
//!
//! # Reference
//! Knuth (2011), "The Art of Computer Programming", Vol. 4A, §7.2.1.2
//! (generating all permutations)

use tracing::debug;

use crate::catalog::CatalogSnapshot;
use crate::config::EngineConfig;
use crate::feasibility::FeasibilityIndex;
use crate::validation::{ValidationError, ValidationErrorKind};

/// One injective course→period mapping for a mandatory group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePlacement {
    /// `(period, course)` positions, one per group member, in membership order.
    pub pairs: Vec<(usize, usize)>,
}

/// Enumerated candidates of one mandatory group.
#[derive(Debug, Clone)]
pub struct GroupCandidates {
    /// Mandatory schedule ID.
    pub group_id: String,
    /// Member course positions, duplicates removed.
    pub courses: Vec<usize>,
    /// Realizable candidate placements, in lexicographic period order.
    pub candidates: Vec<CandidatePlacement>,
    /// Unpruned candidate count P!/(P−k)!, `None` on overflow.
    pub theoretical: Option<u128>,
}

impl GroupCandidates {
    /// Whether no candidate can be realized, making the group unsatisfiable.
    pub fn is_unsatisfiable(&self) -> bool {
        !self.courses.is_empty() && self.candidates.is_empty()
    }
}

/// Number of k-permutations of n items, n!/(n−k)!.
///
/// Zero when k > n; `None` on `u128` overflow.
pub fn permutation_count(n: usize, k: usize) -> Option<u128> {
    if k > n {
        return Some(0);
    }
    ((n - k + 1)..=n).try_fold(1u128, |acc, f| acc.checked_mul(f as u128))
}

/// Enumerates realizable candidate placements.
///
/// `placeable(period, course)` filters pairs that can never be assigned.
///
/// # Errors
/// Returns the cap when more than `cap` candidates exist.
pub fn enumerate_placements<F>(
    period_count: usize,
    courses: &[usize],
    placeable: F,
    cap: usize,
) -> Result<Vec<CandidatePlacement>, usize>
where
    F: Fn(usize, usize) -> bool,
{
    let mut out = Vec::new();
    if courses.len() > period_count {
        return Ok(out);
    }
    let mut used = vec![false; period_count];
    let mut current = Vec::with_capacity(courses.len());
    extend(period_count, courses, &placeable, cap, &mut used, &mut current, &mut out)?;
    Ok(out)
}

fn extend<F>(
    period_count: usize,
    courses: &[usize],
    placeable: &F,
    cap: usize,
    used: &mut [bool],
    current: &mut Vec<(usize, usize)>,
    out: &mut Vec<CandidatePlacement>,
) -> Result<(), usize>
where
    F: Fn(usize, usize) -> bool,
{
    let depth = current.len();
    if depth == courses.len() {
        if out.len() == cap {
            return Err(cap);
        }
        out.push(CandidatePlacement {
            pairs: current.clone(),
        });
        return Ok(());
    }
    let course = courses[depth];
    for period in 0..period_count {
        if used[period] || !placeable(period, course) {
            continue;
        }
        used[period] = true;
        current.push((period, course));
        let result = extend(period_count, courses, placeable, cap, used, current, out);
        current.pop();
        used[period] = false;
        result?;
    }
    Ok(())
}

/// Enumerates candidates for every mandatory group of a snapshot.
///
/// Groups with no members impose nothing and are skipped. Unknown course
/// IDs are ignored; validation reports them.
pub fn enumerate_groups(
    snapshot: &CatalogSnapshot,
    index: &FeasibilityIndex,
    config: &EngineConfig,
) -> Result<Vec<GroupCandidates>, Vec<ValidationError>> {
    let period_count = index.dimensions().periods;
    let mut groups = Vec::with_capacity(snapshot.mandatory.len());
    let mut errors = Vec::new();

    for group in &snapshot.mandatory {
        let courses: Vec<usize> = group
            .distinct_courses()
            .into_iter()
            .filter_map(|id| index.course_position(id))
            .collect();
        if courses.is_empty() {
            continue;
        }
        let theoretical = permutation_count(period_count, courses.len());
        match enumerate_placements(
            period_count,
            &courses,
            |p, c| index.placeable(p, c),
            config.max_group_candidates,
        ) {
            Ok(candidates) => {
                debug!(
                    group = %group.id,
                    members = courses.len(),
                    theoretical = ?theoretical,
                    realizable = candidates.len(),
                    "mandatory group enumerated"
                );
                groups.push(GroupCandidates {
                    group_id: group.id.clone(),
                    courses,
                    candidates,
                    theoretical,
                });
            }
            Err(cap) => errors.push(ValidationError::new(
                ValidationErrorKind::TooManyCandidates,
                format!(
                    "Mandatory schedule '{}' has more than {cap} candidate placements ({} courses over {period_count} periods)",
                    group.id,
                    courses.len()
                ),
            )),
        }
    }

    if errors.is_empty() {
        Ok(groups)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;
    use crate::models::{Building, Course, MandatorySchedule, Period, Room, Teacher};

    #[test]
    fn test_permutation_count() {
        assert_eq!(permutation_count(5, 0), Some(1));
        assert_eq!(permutation_count(5, 2), Some(20));
        assert_eq!(permutation_count(5, 5), Some(120));
        assert_eq!(permutation_count(2, 3), Some(0));
        assert_eq!(permutation_count(200, 100), None);
    }

    #[test]
    fn test_enumerate_all_when_unpruned() {
        let out = enumerate_placements(3, &[7, 9], |_, _| true, 100).unwrap();
        assert_eq!(out.len(), 6);
        assert_eq!(out[0].pairs, vec![(0, 7), (1, 9)]);
        assert_eq!(out[1].pairs, vec![(0, 7), (2, 9)]);
        assert_eq!(out[5].pairs, vec![(2, 7), (1, 9)]);
        for cand in &out {
            assert_ne!(cand.pairs[0].0, cand.pairs[1].0);
        }
    }

    #[test]
    fn test_enumerate_prunes_unplaceable() {
        // Course 0 cannot use period 0.
        let out = enumerate_placements(3, &[0, 1], |p, c| !(c == 0 && p == 0), 100).unwrap();
        assert_eq!(out.len(), 4);
        assert!(out.iter().all(|cand| cand.pairs[0].0 != 0));
    }

    #[test]
    fn test_enumerate_cap() {
        assert_eq!(enumerate_placements(4, &[0, 1], |_, _| true, 12).unwrap().len(), 12);
        assert_eq!(enumerate_placements(4, &[0, 1], |_, _| true, 11), Err(11));
    }

    #[test]
    fn test_enumerate_more_courses_than_periods() {
        assert!(enumerate_placements(1, &[0, 1], |_, _| true, 10).unwrap().is_empty());
    }

    fn group_catalog(barred_everywhere: bool) -> CatalogSnapshot {
        let mut c2 = Course::new("c2", "o", "B").with_teacher("t1").with_room("r1");
        if barred_everywhere {
            c2 = c2.with_barred_period("p1").with_barred_period("p2");
        }
        let cat = InMemoryCatalog::new()
            .with_period(Period::new("p1", "o", 1))
            .with_period(Period::new("p2", "o", 2))
            .with_teacher(Teacher::new("t1", "o", "T", "T"))
            .with_building(Building::new("b1", "o", "Main"))
            .with_room(Room::new("r1", "o", 1, "b1"))
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"))
            .with_course(c2)
            .with_mandatory(MandatorySchedule::new("m1", "o").with_course("c1").with_course("c2"))
            .with_mandatory(MandatorySchedule::new("m-empty", "o"));
        CatalogSnapshot::load(&cat, "o").unwrap()
    }

    #[test]
    fn test_enumerate_groups() {
        let snap = group_catalog(false);
        let idx = FeasibilityIndex::build(&snap, &EngineConfig::default()).unwrap();
        let groups = enumerate_groups(&snap, &idx, &EngineConfig::default()).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_id, "m1");
        assert_eq!(groups[0].courses, vec![0, 1]);
        assert_eq!(groups[0].candidates.len(), 2);
        assert_eq!(groups[0].theoretical, Some(2));
        assert!(!groups[0].is_unsatisfiable());
    }

    #[test]
    fn test_enumerate_groups_unsatisfiable() {
        let snap = group_catalog(true);
        let idx = FeasibilityIndex::build(&snap, &EngineConfig::default()).unwrap();
        let groups = enumerate_groups(&snap, &idx, &EngineConfig::default()).unwrap();
        assert!(groups[0].is_unsatisfiable());
    }

    #[test]
    fn test_enumerate_groups_cap_is_validation_error() {
        let snap = group_catalog(false);
        let config = EngineConfig::default().with_max_group_candidates(1);
        let idx = FeasibilityIndex::build(&snap, &config).unwrap();
        let errors = enumerate_groups(&snap, &idx, &config).unwrap_err();
        assert_eq!(errors[0].kind, ValidationErrorKind::TooManyCandidates);
    }
}

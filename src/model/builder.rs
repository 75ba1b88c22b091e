//! Model builder.
//!
//! Translates a feasibility index and mandatory-group candidates into an
//! [`AssignmentModel`]. Construction is deterministic: variables follow
//! [`Dimensions::flatten`](crate::feasibility::Dimensions::flatten) order,
//! constraints are emitted (c), (d), (e) in index order, and disjunctions
//! are keyed by group identity.

use std::collections::BTreeMap;

use tracing::info;

use super::{
    AssignmentModel, BoolVar, ConstraintKind, Disjunction, LinearConstraint, LinearExpr, Relation,
    VarId,
};
use crate::combinator::GroupCandidates;
use crate::feasibility::{FeasibilityIndex, Slot};

/// Builds an assignment model from scheduling domain objects.
///
/// # Example
/// ```no_run
/// use u_timetable::catalog::{CatalogSnapshot, InMemoryCatalog};
/// use u_timetable::combinator::enumerate_groups;
/// use u_timetable::config::EngineConfig;
/// use u_timetable::feasibility::FeasibilityIndex;
/// use u_timetable::model::ModelBuilder;
///
/// let catalog = InMemoryCatalog::new();
/// let config = EngineConfig::default();
/// let snapshot = CatalogSnapshot::load(&catalog, "org1").unwrap();
/// let index = FeasibilityIndex::build(&snapshot, &config).unwrap();
/// let groups = enumerate_groups(&snapshot, &index, &config).unwrap();
/// let model = ModelBuilder::new(&index).with_mandatory_groups(&groups).build();
/// ```
pub struct ModelBuilder<'a> {
    index: &'a FeasibilityIndex,
    groups: &'a [GroupCandidates],
}

impl<'a> ModelBuilder<'a> {
    /// Creates a builder with no mandatory groups.
    pub fn new(index: &'a FeasibilityIndex) -> Self {
        Self { index, groups: &[] }
    }

    /// Sets enumerated mandatory-group candidates.
    pub fn with_mandatory_groups(mut self, groups: &'a [GroupCandidates]) -> Self {
        self.groups = groups;
        self
    }

    /// Builds the model.
    ///
    /// Creates:
    /// - One bounded boolean per tuple, bounds from `possible` and `anchored`
    /// - A teacher-per-period and a room-per-period capacity row per pair
    ///   that has at least one assignable tuple
    /// - An offered-count row per course
    /// - A disjunction per non-empty mandatory group
    /// - The avoided-period objective
    pub fn build(&self) -> AssignmentModel {
        let dims = self.index.dimensions();
        let variables: Vec<BoolVar> = (0..dims.len())
            .map(|i| {
                let slot = dims.unflatten(i);
                BoolVar {
                    slot,
                    lower: self.index.anchored(slot),
                    upper: self.index.possible(slot),
                }
            })
            .collect();
        let live = |slot: Slot| -> Option<VarId> {
            let id = VarId(dims.flatten(slot));
            variables[id.0].upper.then_some(id)
        };

        let mut constraints = Vec::new();

        for p in 0..dims.periods {
            for t in 0..dims.teachers {
                let expr = LinearExpr::sum(
                    (0..dims.rooms)
                        .flat_map(|r| (0..dims.courses).map(move |c| Slot::new(p, t, r, c)))
                        .filter_map(live),
                );
                if !expr.is_empty() {
                    constraints.push(LinearConstraint {
                        kind: ConstraintKind::TeacherPerPeriod,
                        name: format!("teacher[p{p},t{t}]"),
                        expr,
                        relation: Relation::LessEq,
                        rhs: 1,
                    });
                }
            }
        }

        for p in 0..dims.periods {
            for r in 0..dims.rooms {
                let expr = LinearExpr::sum(
                    (0..dims.teachers)
                        .flat_map(|t| (0..dims.courses).map(move |c| Slot::new(p, t, r, c)))
                        .filter_map(live),
                );
                if !expr.is_empty() {
                    constraints.push(LinearConstraint {
                        kind: ConstraintKind::RoomPerPeriod,
                        name: format!("room[p{p},r{r}]"),
                        expr,
                        relation: Relation::LessEq,
                        rhs: 1,
                    });
                }
            }
        }

        // Kept even when empty: an unplaceable course must make the model infeasible.
        for c in 0..dims.courses {
            let expr = LinearExpr::sum(
                self.index
                    .possible_slots_for(c)
                    .map(|slot| VarId(dims.flatten(slot))),
            );
            constraints.push(LinearConstraint {
                kind: ConstraintKind::OfferedCount,
                name: format!("offered[c{c}]"),
                expr,
                relation: Relation::Equal,
                rhs: i64::from(self.index.offered(c)),
            });
        }

        let mut disjunctions = BTreeMap::new();
        for group in self.groups {
            let disjuncts = group
                .candidates
                .iter()
                .map(|candidate| {
                    candidate
                        .pairs
                        .iter()
                        .map(|&(p, c)| LinearConstraint {
                            kind: ConstraintKind::Placement,
                            name: format!("placed[p{p},c{c}]"),
                            expr: LinearExpr::sum(
                                (0..dims.teachers)
                                    .flat_map(|t| {
                                        (0..dims.rooms).map(move |r| Slot::new(p, t, r, c))
                                    })
                                    .filter_map(live),
                            ),
                            relation: Relation::GreaterEq,
                            rhs: 1,
                        })
                        .collect()
                })
                .collect();
            disjunctions.insert(
                format!("mandatory[{}]", group.group_id),
                Disjunction {
                    group_id: group.group_id.clone(),
                    disjuncts,
                },
            );
        }

        let objective = LinearExpr::sum(
            self.index
                .possible_slots()
                .filter(|slot| self.index.is_avoided(slot.period))
                .map(|slot| VarId(dims.flatten(slot))),
        );

        let model = AssignmentModel {
            dims,
            variables,
            constraints,
            disjunctions,
            objective,
        };
        info!(
            variables = model.variable_count(),
            constraints = model.constraint_count(),
            disjunctions = model.disjunctions.len(),
            avoided_terms = model.objective.terms.len(),
            "assignment model built"
        );
        model
    }
}

//! Backend-agnostic assignment model.
//!
//! The model is expressed only in terms any MILP backend accepts: bounded
//! boolean variables, linear (in)equalities, one linear minimization
//! objective, and disjunctive groups ("at least one of these constraint
//! sets holds"). [`ModelBuilder`] derives it from a feasibility index and
//! enumerated mandatory-group candidates; an
//! [`OptimizerBackend`](crate::solver::OptimizerBackend) solves it.
//!
//! # Formulation
//!
//! One boolean `x[p,t,r,c]` per period×teacher×room×course tuple:
//!
//! | Rule | Encoding |
//! |------|----------|
//! | (a) `x ≤ possible` | variable upper bound |
//! | (b) `x ≥ anchored` | variable lower bound |
//! | (c) teacher once per period | `Σ_{r,c} x[p,t,r,c] ≤ 1` per (p,t) |
//! | (d) room once per period | `Σ_{t,c} x[p,t,r,c] ≤ 1` per (p,r) |
//! | (e) offered count | `Σ_{p,t,r} x[p,t,r,c] = offered(c)` per c |
//! | (f) mandatory group | disjunction over candidates of `Σ_{t,r} x[p,t,r,c] ≥ 1` per pair |
//!
//! Objective: minimize the number of placements in avoided periods, each
//! avoided period weighted equally.
//!
//! Variables whose upper bound is zero are identically zero; they are kept
//! in the variable table but omitted from constraint and objective terms.
//!
//! # Reference
//! - Wolsey (1998), "Integer Programming", Ch. 1 (formulations)
//! - Balas (1979), "Disjunctive Programming"

mod builder;

pub use builder::ModelBuilder;

use std::collections::BTreeMap;

use crate::feasibility::{Dimensions, Slot};

/// Position of a variable in [`AssignmentModel::variables`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// A bounded boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoolVar {
    /// Tuple this variable decides.
    pub slot: Slot,
    /// Forced on (anchored).
    pub lower: bool,
    /// Allowed on (possible).
    pub upper: bool,
}

impl BoolVar {
    /// Whether the variable can only be zero.
    pub fn is_fixed_off(&self) -> bool {
        !self.upper
    }
}

/// Comparison of a linear constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    LessEq,
    GreaterEq,
    Equal,
}

/// Which rule a constraint encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// (c) a teacher teaches at most one course per period.
    TeacherPerPeriod,
    /// (d) a room hosts at most one course per period.
    RoomPerPeriod,
    /// (e) a course is placed exactly its offered count.
    OfferedCount,
    /// (f) one (period, course) pair of a mandatory-group candidate.
    Placement,
}

/// A linear expression `Σ coefficient·x`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, i64)>,
}

impl LinearExpr {
    /// Creates an empty (zero) expression.
    pub fn new() -> Self {
        Self::default()
    }

    /// Unit-coefficient sum of variables.
    pub fn sum(vars: impl IntoIterator<Item = VarId>) -> Self {
        Self {
            terms: vars.into_iter().map(|v| (v, 1)).collect(),
        }
    }

    /// Value under an assignment.
    pub fn evaluate(&self, assignment: &Assignment) -> i64 {
        self.terms
            .iter()
            .filter(|(v, _)| assignment.is_true(*v))
            .map(|(_, coef)| coef)
            .sum()
    }

    /// Smallest and largest values reachable within variable bounds.
    pub fn bounds(&self, variables: &[BoolVar]) -> (i64, i64) {
        self.terms.iter().fold((0, 0), |(lo, hi), (v, coef)| {
            let var = &variables[v.0];
            let at_lower = if var.lower { *coef } else { 0 };
            let at_upper = if var.upper { *coef } else { 0 };
            (lo + at_lower.min(at_upper), hi + at_lower.max(at_upper))
        })
    }

    /// Whether the expression has no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

/// `expr relation rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    /// Rule this constraint encodes.
    pub kind: ConstraintKind,
    /// Deterministic name, e.g. `teacher[p0,t2]`.
    pub name: String,
    /// Left-hand side.
    pub expr: LinearExpr,
    /// Comparison.
    pub relation: Relation,
    /// Right-hand side.
    pub rhs: i64,
}

impl LinearConstraint {
    /// Whether an assignment satisfies the constraint.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        let lhs = self.expr.evaluate(assignment);
        match self.relation {
            Relation::LessEq => lhs <= self.rhs,
            Relation::GreaterEq => lhs >= self.rhs,
            Relation::Equal => lhs == self.rhs,
        }
    }
}

/// At least one disjunct (a conjunction of constraints) must hold.
#[derive(Debug, Clone, PartialEq)]
pub struct Disjunction {
    /// Mandatory schedule this disjunction encodes.
    pub group_id: String,
    /// Alternatives; each is a conjunction.
    pub disjuncts: Vec<Vec<LinearConstraint>>,
}

impl Disjunction {
    /// Whether some disjunct is fully satisfied.
    pub fn is_satisfied(&self, assignment: &Assignment) -> bool {
        self.disjuncts
            .iter()
            .any(|d| d.iter().all(|c| c.is_satisfied(assignment)))
    }
}

/// Boolean values for every model variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    values: Vec<bool>,
}

impl Assignment {
    /// Wraps per-variable values, indexed by [`VarId`].
    pub fn from_values(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Value of one variable; out-of-range reads as `false`.
    pub fn is_true(&self, var: VarId) -> bool {
        self.values.get(var.0).copied().unwrap_or(false)
    }

    /// Variables set to `true`, ascending.
    pub fn true_vars(&self) -> impl Iterator<Item = VarId> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|(_, v)| **v)
            .map(|(i, _)| VarId(i))
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A complete assignment model.
#[derive(Debug, Clone)]
pub struct AssignmentModel {
    pub(crate) dims: Dimensions,
    pub(crate) variables: Vec<BoolVar>,
    pub(crate) constraints: Vec<LinearConstraint>,
    pub(crate) disjunctions: BTreeMap<String, Disjunction>,
    pub(crate) objective: LinearExpr,
}

impl AssignmentModel {
    /// Index extents the variables were laid out with.
    pub fn dimensions(&self) -> Dimensions {
        self.dims
    }

    /// Variable deciding a tuple.
    pub fn var(&self, slot: Slot) -> VarId {
        VarId(self.dims.flatten(slot))
    }

    /// All variables, indexed by [`VarId`].
    pub fn variables(&self) -> &[BoolVar] {
        &self.variables
    }

    /// Linear constraints (c), (d), (e).
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Disjunctive groups (f), keyed by `mandatory[{group_id}]`.
    pub fn disjunctions(&self) -> &BTreeMap<String, Disjunction> {
        &self.disjunctions
    }

    /// Minimization objective.
    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    /// Number of variables.
    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    /// Number of linear constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Number of linear constraints of one kind.
    pub fn count_of(&self, kind: ConstraintKind) -> usize {
        self.constraints.iter().filter(|c| c.kind == kind).count()
    }

    /// Whether an assignment respects every bound, constraint, and disjunction.
    pub fn is_feasible(&self, assignment: &Assignment) -> bool {
        self.variables.iter().enumerate().all(|(i, v)| {
            let on = assignment.is_true(VarId(i));
            (!v.lower || on) && (v.upper || !on)
        }) && self.constraints.iter().all(|c| c.is_satisfied(assignment))
            && self
                .disjunctions
                .values()
                .all(|d| d.is_satisfied(assignment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(n: usize) -> Vec<BoolVar> {
        (0..n)
            .map(|i| BoolVar {
                slot: Slot::new(i, 0, 0, 0),
                lower: false,
                upper: true,
            })
            .collect()
    }

    #[test]
    fn test_expr_evaluate() {
        let e = LinearExpr::sum([VarId(0), VarId(2)]);
        let a = Assignment::from_values(vec![true, true, false]);
        assert_eq!(e.evaluate(&a), 1);
        assert!(!e.is_empty());
    }

    #[test]
    fn test_expr_bounds() {
        let mut vs = vars(3);
        vs[0].lower = true;
        vs[2].upper = false;
        let e = LinearExpr {
            terms: vec![(VarId(0), 1), (VarId(1), 2), (VarId(2), 5)],
        };
        assert_eq!(e.bounds(&vs), (1, 3));

        let neg = LinearExpr {
            terms: vec![(VarId(1), -4)],
        };
        assert_eq!(neg.bounds(&vs), (-4, 0));
    }

    #[test]
    fn test_constraint_relations() {
        let a = Assignment::from_values(vec![true, true]);
        let mk = |relation, rhs| LinearConstraint {
            kind: ConstraintKind::OfferedCount,
            name: "c".into(),
            expr: LinearExpr::sum([VarId(0), VarId(1)]),
            relation,
            rhs,
        };
        assert!(mk(Relation::Equal, 2).is_satisfied(&a));
        assert!(!mk(Relation::LessEq, 1).is_satisfied(&a));
        assert!(mk(Relation::GreaterEq, 1).is_satisfied(&a));
    }

    #[test]
    fn test_disjunction() {
        let pick = |v| LinearConstraint {
            kind: ConstraintKind::Placement,
            name: "p".into(),
            expr: LinearExpr::sum([VarId(v)]),
            relation: Relation::GreaterEq,
            rhs: 1,
        };
        let d = Disjunction {
            group_id: "m".into(),
            disjuncts: vec![vec![pick(0), pick(1)], vec![pick(2)]],
        };
        assert!(d.is_satisfied(&Assignment::from_values(vec![false, false, true])));
        assert!(d.is_satisfied(&Assignment::from_values(vec![true, true, false])));
        assert!(!d.is_satisfied(&Assignment::from_values(vec![true, false, false])));

        let empty = Disjunction {
            group_id: "m".into(),
            disjuncts: vec![],
        };
        assert!(!empty.is_satisfied(&Assignment::from_values(vec![true])));
    }

    #[test]
    fn test_assignment_true_vars() {
        let a = Assignment::from_values(vec![false, true, false, true]);
        let on: Vec<_> = a.true_vars().collect();
        assert_eq!(on, vec![VarId(1), VarId(3)]);
        assert!(!a.is_true(VarId(99)));
        assert_eq!(a.len(), 4);
    }
}

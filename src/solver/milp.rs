//! `good_lp` backend.
//!
//! Solves the assignment model as a 0-1 integer program with the pure-Rust
//! `microlp` solver. Bounds become variable bounds (fixed-off variables
//! are never created), linear constraints are added as rows, and each
//! disjunction gets one binary selector per disjunct:
//!
//! ```text
//! Σ_k y_k ≥ 1
//! expr ≥ rhs − M·(1 − y_k)   with M = rhs − min(expr)
//! expr ≤ rhs + M·(1 − y_k)   with M = max(expr) − rhs
//! ```
//!
//! `M` is taken from the variable bounds, so it is the smallest constant
//! that deactivates the row when `y_k = 0`.
//!
//! # Reference
//! Williams (2013), "Model Building in Mathematical Programming", §9.1.3

use std::time::Instant;

use good_lp::{
    constraint, default_solver, variable, Constraint, Expression, ProblemVariables,
    ResolutionError, Solution, SolverModel, Variable,
};
use tracing::{debug, info};

use super::{OptimizerBackend, SolveOutcome};
use crate::config::EngineConfig;
use crate::model::{Assignment, AssignmentModel, BoolVar, LinearConstraint, LinearExpr, Relation};

/// MILP backend over `good_lp`.
#[derive(Debug, Clone, Default)]
pub struct GoodLpBackend;

impl GoodLpBackend {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

fn reachable(c: &LinearConstraint, variables: &[BoolVar]) -> bool {
    let (lo, hi) = c.expr.bounds(variables);
    match c.relation {
        Relation::LessEq => lo <= c.rhs,
        Relation::GreaterEq => hi >= c.rhs,
        Relation::Equal => lo <= c.rhs && c.rhs <= hi,
    }
}

/// Bound-level infeasibility that needs no search.
fn presolve(model: &AssignmentModel) -> Option<String> {
    let variables = model.variables();
    if let Some(v) = variables.iter().find(|v| v.lower && !v.upper) {
        return Some(format!("tuple {:?} is forced on but not allowed", v.slot));
    }
    if let Some(c) = model
        .constraints()
        .iter()
        .find(|c| !reachable(c, variables))
    {
        return Some(format!("constraint {} cannot hold within bounds", c.name));
    }
    model
        .disjunctions()
        .iter()
        .find(|(_, d)| {
            !d.disjuncts
                .iter()
                .any(|conj| conj.iter().all(|c| reachable(c, variables)))
        })
        .map(|(key, _)| format!("disjunction {key} has no realizable alternative"))
}

fn linear(expr: &LinearExpr, handles: &[Option<Variable>]) -> Expression {
    let mut out = Expression::from(0.0);
    for (v, coef) in &expr.terms {
        if let Some(var) = handles[v.0] {
            out += *coef as f64 * var;
        }
    }
    out
}

fn row(lhs: Expression, relation: Relation, rhs: f64) -> Constraint {
    match relation {
        Relation::LessEq => constraint!(lhs <= rhs),
        Relation::GreaterEq => constraint!(lhs >= rhs),
        Relation::Equal => constraint!(lhs == rhs),
    }
}

/// Big-M rows making `c` hold whenever `selector` is 1.
fn guarded(
    c: &LinearConstraint,
    selector: Variable,
    handles: &[Option<Variable>],
    variables: &[BoolVar],
) -> Vec<Constraint> {
    let (lo, hi) = c.expr.bounds(variables);
    let mut rows = Vec::with_capacity(2);
    if matches!(c.relation, Relation::GreaterEq | Relation::Equal) {
        let m = (c.rhs - lo).max(0) as f64;
        if m > 0.0 {
            let lhs = linear(&c.expr, handles) - m * selector;
            let bound = c.rhs as f64 - m;
            rows.push(constraint!(lhs >= bound));
        }
    }
    if matches!(c.relation, Relation::LessEq | Relation::Equal) {
        let m = (hi - c.rhs).max(0) as f64;
        if m > 0.0 {
            let lhs = linear(&c.expr, handles) + m * selector;
            let bound = c.rhs as f64 + m;
            rows.push(constraint!(lhs <= bound));
        }
    }
    rows
}

impl OptimizerBackend for GoodLpBackend {
    fn name(&self) -> &str {
        "good_lp/microlp"
    }

    fn solve(&self, model: &AssignmentModel, config: &EngineConfig) -> SolveOutcome {
        if let Some(reason) = presolve(model) {
            debug!(%reason, "model infeasible before search");
            return SolveOutcome::Infeasible;
        }
        let variables = model.variables();
        if variables.iter().all(|v| !v.upper) {
            // Every row was checked reachable with all variables at zero.
            return SolveOutcome::Optimal {
                assignment: Assignment::from_values(vec![false; variables.len()]),
                objective: 0.0,
            };
        }

        let start = Instant::now();
        let mut problem = ProblemVariables::new();
        let mut handles: Vec<Option<Variable>> = Vec::with_capacity(variables.len());
        for v in variables {
            handles.push(if v.upper {
                let def = variable().binary();
                Some(problem.add(if v.lower { def.min(1) } else { def }))
            } else {
                None
            });
        }
        let selectors: Vec<(&str, Vec<Variable>)> = model
            .disjunctions()
            .iter()
            .map(|(key, d)| {
                let ys = d
                    .disjuncts
                    .iter()
                    .map(|_| problem.add(variable().binary()))
                    .collect();
                (key.as_str(), ys)
            })
            .collect();

        let mut solver = problem
            .minimise(linear(model.objective(), &handles))
            .using(default_solver);

        for c in model.constraints() {
            solver.add_constraint(row(linear(&c.expr, &handles), c.relation, c.rhs as f64));
        }
        let mut guarded_rows = 0usize;
        for ((_, ys), d) in selectors.iter().zip(model.disjunctions().values()) {
            let any: Expression = ys.iter().copied().sum();
            solver.add_constraint(constraint!(any >= 1));
            for (conj, y) in d.disjuncts.iter().zip(ys) {
                for c in conj {
                    for r in guarded(c, *y, &handles, variables) {
                        solver.add_constraint(r);
                        guarded_rows += 1;
                    }
                }
            }
        }
        debug!(
            selectors = selectors.iter().map(|(_, ys)| ys.len()).sum::<usize>(),
            guarded_rows,
            "disjunctions reformulated"
        );

        match solver.solve() {
            Ok(solution) => {
                let threshold = config.assignment_threshold;
                let values = handles
                    .iter()
                    .map(|h| h.is_some_and(|var| solution.value(var) > threshold))
                    .collect();
                let assignment = Assignment::from_values(values);
                let objective = model.objective().evaluate(&assignment) as f64;
                info!(
                    elapsed = ?start.elapsed(),
                    objective,
                    "solver found optimal assignment"
                );
                SolveOutcome::Optimal {
                    assignment,
                    objective,
                }
            }
            Err(ResolutionError::Infeasible) => {
                info!(elapsed = ?start.elapsed(), "solver proved model infeasible");
                SolveOutcome::Infeasible
            }
            Err(e) => SolveOutcome::Error(e.to_string()),
        }
    }
}

//! Solve entry points.
//!
//! [`TimetableEngine`] wires the pipeline together:
//!
//! ```text
//! CatalogSnapshot → validate → FeasibilityIndex → enumerate_groups
//!     → ModelBuilder → OptimizerBackend → verify_assignment
//!     → materialize → ScheduleRepository::commit_outcome
//! ```
//!
//! [`request_solve`](TimetableEngine::request_solve) runs everything up to
//! candidate enumeration synchronously, so validation failures reach the
//! caller before any job exists. [`run`](TimetableEngine::run) is the job
//! body: it re-reads the catalog, solves, and records the outcome on the
//! schedule. Infeasibility, backend failures, and catalogs that went bad
//! between request and run are recorded, not returned.

use std::sync::mpsc::Receiver;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::{CatalogRepository, CatalogSnapshot};
use crate::combinator::{enumerate_groups, GroupCandidates};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::feasibility::FeasibilityIndex;
use crate::materialize::materialize;
use crate::model::ModelBuilder;
use crate::models::{ScheduleItem, ScheduleStatus};
use crate::solver::{verify_assignment, OptimizerBackend, SolveOutcome};
use crate::store::ScheduleRepository;
use crate::task::{SolveJob, TaskSubmitter};
use crate::validation::validate_snapshot;

/// Outcome of one run, as recorded on the schedule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolveReport {
    /// Schedule the outcome was written to.
    pub schedule_id: String,
    /// Terminal status.
    pub status: ScheduleStatus,
    /// Rows written.
    pub item_count: usize,
    /// Placements in avoided periods, for solved runs.
    pub objective: Option<f64>,
}

/// A validated catalog, ready for model building.
struct Prepared {
    snapshot: CatalogSnapshot,
    index: FeasibilityIndex,
    groups: Vec<GroupCandidates>,
}

/// Course timetabling engine.
pub struct TimetableEngine<C, S, B> {
    catalog: C,
    store: S,
    backend: B,
    config: EngineConfig,
}

impl<C, S, B> TimetableEngine<C, S, B>
where
    C: CatalogRepository,
    S: ScheduleRepository,
    B: OptimizerBackend,
{
    /// Creates an engine with default configuration.
    pub fn new(catalog: C, store: S, backend: B) -> Self {
        Self {
            catalog,
            store,
            backend,
            config: EngineConfig::default(),
        }
    }

    /// Sets the configuration.
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Catalog collaborator.
    pub fn catalog(&self) -> &C {
        &self.catalog
    }

    /// Schedule store.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn prepare(&self, organization_id: &str) -> EngineResult<Prepared> {
        let snapshot = CatalogSnapshot::load(&self.catalog, organization_id)?;
        validate_snapshot(&snapshot)?;
        let index = FeasibilityIndex::build(&snapshot, &self.config)?;
        let groups = enumerate_groups(&snapshot, &index, &self.config)?;
        Ok(Prepared {
            snapshot,
            index,
            groups,
        })
    }

    /// Validates an organization's catalog and submits a solve job.
    ///
    /// Returns the new schedule's ID. The schedule stays `pending` until a
    /// worker calls [`run`](Self::run).
    ///
    /// # Errors
    /// - `Validation` with every problem found; no schedule is created
    /// - `Catalog` or `Store` on collaborator failures
    /// - `Submit` when the job could not be handed off; the schedule is
    ///   recorded as errored
    pub fn request_solve<T>(&self, organization_id: &str, submitter: &T) -> EngineResult<String>
    where
        T: TaskSubmitter + ?Sized,
    {
        let prepared = match self.prepare(organization_id) {
            Ok(p) => p,
            Err(e) => {
                if let Some(errors) = e.validation_errors() {
                    warn!(
                        organization = organization_id,
                        errors = errors.len(),
                        "solve request rejected"
                    );
                }
                return Err(e);
            }
        };
        let schedule = self.store.create_schedule(organization_id)?;
        info!(
            organization = organization_id,
            schedule = %schedule.id,
            variables = prepared.index.dimensions().len(),
            groups = prepared.groups.len(),
            "solve requested"
        );

        if let Err(e) = submitter.submit(SolveJob::new(organization_id, &schedule.id)) {
            self.store.commit_outcome(
                organization_id,
                &schedule.id,
                &[],
                ScheduleStatus::Errored {
                    message: e.to_string(),
                },
                None,
            )?;
            return Err(e.into());
        }
        Ok(schedule.id)
    }

    /// Solves one schedule and records the outcome.
    ///
    /// Re-running a finished schedule replaces its rows wholesale.
    ///
    /// # Errors
    /// - `NotFound` when the schedule does not exist for the organization
    /// - `InvariantViolation` when the backend returns an assignment that
    ///   breaks a hard rule; no rows are persisted and the schedule is
    ///   recorded as errored, so it can be deleted
    /// - `Store` on persistence failures
    pub fn run(&self, organization_id: &str, schedule_id: &str) -> EngineResult<SolveReport> {
        if self
            .store
            .get_schedule(organization_id, schedule_id)?
            .is_none()
        {
            return Err(EngineError::NotFound {
                organization: organization_id.to_string(),
                schedule: schedule_id.to_string(),
            });
        }
        self.store.mark_running(organization_id, schedule_id)?;

        let prepared = match self.prepare(organization_id) {
            Ok(p) => p,
            Err(e @ (EngineError::Validation(_) | EngineError::Catalog(_))) => {
                warn!(
                    organization = organization_id,
                    schedule = schedule_id,
                    error = %e,
                    "catalog unusable at run time"
                );
                return self.record(
                    organization_id,
                    schedule_id,
                    Vec::new(),
                    ScheduleStatus::Errored {
                        message: e.to_string(),
                    },
                    None,
                );
            }
            Err(e) => return Err(e),
        };

        let outcome = match prepared.groups.iter().find(|g| g.is_unsatisfiable()) {
            Some(group) => {
                info!(
                    organization = organization_id,
                    schedule = schedule_id,
                    group = %group.group_id,
                    "mandatory group has no realizable placement"
                );
                SolveOutcome::Infeasible
            }
            None => {
                let model = ModelBuilder::new(&prepared.index)
                    .with_mandatory_groups(&prepared.groups)
                    .build();
                self.backend.solve(&model, &self.config)
            }
        };
        info!(
            organization = organization_id,
            schedule = schedule_id,
            backend = self.backend.name(),
            outcome = outcome.label(),
            "solver finished"
        );

        match outcome {
            SolveOutcome::Optimal {
                assignment,
                objective,
            } => {
                let slots = match verify_assignment(&prepared.index, &prepared.groups, &assignment)
                {
                    Ok(slots) => slots,
                    Err(violation) => {
                        error!(
                            organization = organization_id,
                            schedule = schedule_id,
                            backend = self.backend.name(),
                            %violation,
                            "solver result violates a hard constraint; no rows persisted"
                        );
                        let err = EngineError::from(violation);
                        self.store.commit_outcome(
                            organization_id,
                            schedule_id,
                            &[],
                            ScheduleStatus::Errored {
                                message: err.to_string(),
                            },
                            None,
                        )?;
                        return Err(err);
                    }
                };
                let items = materialize(&prepared.snapshot, schedule_id, &slots);
                self.record(
                    organization_id,
                    schedule_id,
                    items,
                    ScheduleStatus::Solved,
                    Some(objective),
                )
            }
            SolveOutcome::Infeasible => self.record(
                organization_id,
                schedule_id,
                Vec::new(),
                ScheduleStatus::Unsolved,
                None,
            ),
            SolveOutcome::Error(message) => {
                warn!(
                    organization = organization_id,
                    schedule = schedule_id,
                    %message,
                    "optimizer backend failed"
                );
                self.record(
                    organization_id,
                    schedule_id,
                    Vec::new(),
                    ScheduleStatus::Errored { message },
                    None,
                )
            }
        }
    }

    fn record(
        &self,
        organization_id: &str,
        schedule_id: &str,
        items: Vec<ScheduleItem>,
        status: ScheduleStatus,
        objective: Option<f64>,
    ) -> EngineResult<SolveReport> {
        let schedule =
            self.store
                .commit_outcome(organization_id, schedule_id, &items, status, objective)?;
        Ok(SolveReport {
            schedule_id: schedule.id,
            status: schedule.status,
            item_count: items.len(),
            objective: schedule.objective,
        })
    }

    /// Runs jobs until every sender is dropped. Returns the number run.
    ///
    /// Failed runs are logged and skipped; they are not retried.
    pub fn serve(&self, jobs: Receiver<SolveJob>) -> usize {
        let mut count = 0;
        for job in jobs {
            count += 1;
            match self.run(&job.organization_id, &job.solved_schedule_id) {
                Ok(report) => info!(
                    organization = %job.organization_id,
                    schedule = %report.schedule_id,
                    status = report.status.label(),
                    rows = report.item_count,
                    "job done"
                ),
                Err(e) => error!(
                    organization = %job.organization_id,
                    schedule = %job.solved_schedule_id,
                    error = %e,
                    "job failed"
                ),
            }
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::RwLock;

    use rand::rngs::SmallRng;
    use rand::{Rng, SeedableRng};

    use crate::catalog::{CatalogResult, InMemoryCatalog};
    use crate::model::{Assignment, AssignmentModel};
    use crate::models::{
        AnchoredCourse, Building, Course, MandatorySchedule, Organization, Period, Room, Teacher,
    };
    use crate::solver::{GoodLpBackend, InvariantViolation};
    use crate::store::ScheduleStore;
    use crate::task::{ChannelSubmitter, RecordingSubmitter};
    use crate::validation::ValidationErrorKind;

    /// Catalog that tests can edit between request and run.
    struct SharedCatalog(RwLock<InMemoryCatalog>);

    impl SharedCatalog {
        fn new(cat: InMemoryCatalog) -> Self {
            Self(RwLock::new(cat))
        }

        fn edit(&self, f: impl FnOnce(&mut InMemoryCatalog)) {
            f(&mut self.0.write().unwrap());
        }
    }

    impl CatalogRepository for SharedCatalog {
        fn periods(&self, org: &str) -> CatalogResult<Vec<Period>> {
            self.0.read().unwrap().periods(org)
        }
        fn teachers(&self, org: &str) -> CatalogResult<Vec<Teacher>> {
            self.0.read().unwrap().teachers(org)
        }
        fn buildings(&self, org: &str) -> CatalogResult<Vec<Building>> {
            self.0.read().unwrap().buildings(org)
        }
        fn rooms(&self, org: &str) -> CatalogResult<Vec<Room>> {
            self.0.read().unwrap().rooms(org)
        }
        fn courses(&self, org: &str) -> CatalogResult<Vec<Course>> {
            self.0.read().unwrap().courses(org)
        }
        fn anchored_courses(&self, org: &str) -> CatalogResult<Vec<AnchoredCourse>> {
            self.0.read().unwrap().anchored_courses(org)
        }
        fn mandatory_schedules(&self, org: &str) -> CatalogResult<Vec<MandatorySchedule>> {
            self.0.read().unwrap().mandatory_schedules(org)
        }
    }

    /// Backend that always fails.
    struct FailingBackend;

    impl OptimizerBackend for FailingBackend {
        fn name(&self) -> &str {
            "failing"
        }
        fn solve(&self, _model: &AssignmentModel, _config: &EngineConfig) -> SolveOutcome {
            SolveOutcome::Error("license expired".into())
        }
    }

    /// Backend that claims every allowed tuple is on.
    struct GreedyBackend;

    impl OptimizerBackend for GreedyBackend {
        fn name(&self) -> &str {
            "greedy"
        }
        fn solve(&self, model: &AssignmentModel, _config: &EngineConfig) -> SolveOutcome {
            SolveOutcome::Optimal {
                assignment: Assignment::from_values(
                    model.variables().iter().map(|v| v.upper).collect(),
                ),
                objective: 0.0,
            }
        }
    }

    fn engine<C: CatalogRepository>(
        catalog: C,
    ) -> TimetableEngine<C, ScheduleStore, GoodLpBackend> {
        TimetableEngine::new(
            catalog,
            ScheduleStore::open_in_memory().unwrap(),
            GoodLpBackend::new(),
        )
    }

    fn solve<C: CatalogRepository, B: OptimizerBackend>(
        engine: &TimetableEngine<C, ScheduleStore, B>,
        org: &str,
    ) -> EngineResult<SolveReport> {
        let submitter = RecordingSubmitter::new();
        let id = engine.request_solve(org, &submitter)?;
        assert_eq!(submitter.jobs(), vec![SolveJob::new(org, &id)]);
        engine.run(org, &id)
    }

    fn one_of_each() -> InMemoryCatalog {
        InMemoryCatalog::new()
            .with_organization(Organization::new("o").with_name("Springfield High"))
            .with_period(Period::new("p1", "o", 1))
            .with_teacher(Teacher::new("t1", "o", "Krabappel", "Edna"))
            .with_building(Building::new("b1", "o", "Main"))
            .with_room(Room::new("r1", "o", 101, "b1"))
    }

    #[test]
    fn test_single_course_solved() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "Reading").with_teacher("t1").with_room("r1"));
        let engine = engine(cat);
        let report = solve(&engine, "o").unwrap();
        assert_eq!(report.status, ScheduleStatus::Solved);
        assert_eq!(report.item_count, 1);
        assert_eq!(report.objective, Some(0.0));

        let rows = engine.store().list_items("o", &report.schedule_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course, "Reading");
        assert_eq!(rows[0].teacher, "Krabappel, Edna");
        assert_eq!(rows[0].room, "Main, Room 101");
        let schedule = engine
            .store()
            .get_schedule("o", &report.schedule_id)
            .unwrap()
            .unwrap();
        assert!(schedule.finished() && schedule.solved());
    }

    #[test]
    fn test_competing_courses_unsolved() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "Reading").with_teacher("t1").with_room("r1"))
            .with_course(Course::new("c2", "o", "Writing").with_teacher("t1").with_room("r1"));
        let engine = engine(cat);
        let report = solve(&engine, "o").unwrap();
        assert_eq!(report.status, ScheduleStatus::Unsolved);
        assert_eq!(report.item_count, 0);
        assert!(engine
            .store()
            .list_items("o", &report.schedule_id)
            .unwrap()
            .is_empty());
        let schedule = engine
            .store()
            .get_schedule("o", &report.schedule_id)
            .unwrap()
            .unwrap();
        assert!(schedule.finished() && !schedule.solved());
    }

    #[test]
    fn test_oversized_group_rejected_before_solve() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"))
            .with_course(Course::new("c2", "o", "B").with_teacher("t1").with_room("r1"))
            .with_mandatory(MandatorySchedule::new("m1", "o").with_course("c1").with_course("c2"));
        let engine = engine(cat);
        let submitter = RecordingSubmitter::new();
        let err = engine.request_solve("o", &submitter).unwrap_err();
        let kinds: Vec<_> = err
            .validation_errors()
            .unwrap()
            .iter()
            .map(|e| e.kind.clone())
            .collect();
        assert_eq!(kinds, vec![ValidationErrorKind::MandatoryGroupTooLarge]);
        assert!(submitter.jobs().is_empty());
        assert!(engine.store().list_schedules("o").unwrap().is_empty());
    }

    #[test]
    fn test_anchor_in_barred_period_rejected() {
        let cat = one_of_each()
            .with_course(
                Course::new("c1", "o", "A")
                    .with_teacher("t1")
                    .with_room("r1")
                    .with_barred_period("p1"),
            )
            .with_anchored(AnchoredCourse::new("a1", "o", "c1", "p1", "r1", "t1"));
        let engine = engine(cat);
        let err = engine
            .request_solve("o", &RecordingSubmitter::new())
            .unwrap_err();
        assert_eq!(
            err.validation_errors().unwrap()[0].kind,
            ValidationErrorKind::AnchorInBarredPeriod
        );
    }

    #[test]
    fn test_anchor_respected() {
        let cat = one_of_each()
            .with_period(Period::new("p2", "o", 2))
            .with_period(Period::new("p3", "o", 3))
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"))
            .with_anchored(AnchoredCourse::new("a1", "o", "c1", "p3", "r1", "t1"));
        let engine = engine(cat);
        let report = solve(&engine, "o").unwrap();
        let rows = engine.store().list_items("o", &report.schedule_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].period_id, "p3");
    }

    #[test]
    fn test_resolve_replaces_rows() {
        let shared = SharedCatalog::new(
            one_of_each()
                .with_period(Period::new("p2", "o", 2))
                .with_course(
                    Course::new("c1", "o", "Algebra")
                        .with_offered(2)
                        .with_teacher("t1")
                        .with_room("r1"),
                ),
        );
        let engine = engine(shared);
        let first = solve(&engine, "o").unwrap();
        assert_eq!(first.item_count, 2);

        engine.catalog().edit(|cat| {
            cat.courses[0].name = "Algebra II".into();
            cat.courses[0].offered = 1;
        });
        // Rows keep the names copied at solve time until the next run.
        let rows = engine.store().list_items("o", &first.schedule_id).unwrap();
        assert!(rows.iter().all(|r| r.course == "Algebra"));

        let second = engine.run("o", &first.schedule_id).unwrap();
        assert_eq!(second.schedule_id, first.schedule_id);
        let rows = engine.store().list_items("o", &first.schedule_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course, "Algebra II");
    }

    #[test]
    fn test_catalog_broken_after_request_is_recorded() {
        let shared = SharedCatalog::new(
            one_of_each()
                .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1")),
        );
        let engine = engine(shared);
        let id = engine
            .request_solve("o", &RecordingSubmitter::new())
            .unwrap();
        engine.catalog().edit(|cat| cat.courses[0].offered = 0);

        let report = engine.run("o", &id).unwrap();
        match report.status {
            ScheduleStatus::Errored { message } => assert!(message.contains("offered")),
            other => panic!("expected errored, got {other:?}"),
        }
    }

    #[test]
    fn test_backend_error_recorded() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"));
        let engine = TimetableEngine::new(cat, ScheduleStore::open_in_memory().unwrap(), FailingBackend);
        let report = solve(&engine, "o").unwrap();
        assert_eq!(
            report.status,
            ScheduleStatus::Errored {
                message: "license expired".into()
            }
        );
        let schedule = engine
            .store()
            .get_schedule("o", &report.schedule_id)
            .unwrap()
            .unwrap();
        assert_eq!(schedule.error_message(), Some("license expired"));
    }

    #[test]
    fn test_invariant_violation_aborts_without_persisting() {
        // Two courses share the only teacher; claiming both breaks the teacher rule.
        let cat = one_of_each()
            .with_period(Period::new("p2", "o", 2))
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"))
            .with_course(Course::new("c2", "o", "B").with_teacher("t1").with_room("r1"));
        let engine = TimetableEngine::new(cat, ScheduleStore::open_in_memory().unwrap(), GreedyBackend);
        let id = engine
            .request_solve("o", &RecordingSubmitter::new())
            .unwrap();
        let err = engine.run("o", &id).unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));

        let schedule = engine.store().get_schedule("o", &id).unwrap().unwrap();
        assert!(schedule.finished() && !schedule.solved());
        assert!(schedule.error_message().unwrap().contains("teacher 0"));
        assert!(engine.store().list_items("o", &id).unwrap().is_empty());
        assert!(engine.store().delete_schedule("o", &id).unwrap());
    }

    #[test]
    fn test_unsatisfiable_group_skips_backend() {
        // Both members only fit p1, so no placement puts them in distinct periods.
        let cat = one_of_each()
            .with_period(Period::new("p2", "o", 2))
            .with_teacher(Teacher::new("t2", "o", "Hoover", "Elizabeth"))
            .with_room(Room::new("r2", "o", 102, "b1"))
            .with_course(
                Course::new("c1", "o", "A")
                    .with_teacher("t1")
                    .with_room("r1")
                    .with_barred_period("p2"),
            )
            .with_course(
                Course::new("c2", "o", "B")
                    .with_teacher("t2")
                    .with_room("r2")
                    .with_barred_period("p2"),
            )
            .with_mandatory(MandatorySchedule::new("m1", "o").with_course("c1").with_course("c2"));
        let engine = TimetableEngine::new(cat, ScheduleStore::open_in_memory().unwrap(), FailingBackend);
        let report = solve(&engine, "o").unwrap();
        assert_eq!(report.status, ScheduleStatus::Unsolved);
        assert_eq!(report.item_count, 0);
    }

    #[test]
    fn test_assignment_threshold_reaches_backend() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"));
        let engine = engine(cat)
            .with_config(EngineConfig::default().with_assignment_threshold(1.5));
        let id = engine
            .request_solve("o", &RecordingSubmitter::new())
            .unwrap();
        // Nothing reads as placed, so the offered count cannot hold.
        let err = engine.run("o", &id).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvariantViolation(InvariantViolation::OfferedMismatch {
                course: 0,
                expected: 1,
                actual: 0,
            })
        ));
        assert!(engine.store().list_items("o", &id).unwrap().is_empty());
    }

    #[test]
    fn test_run_unknown_schedule() {
        let engine = engine(one_of_each());
        assert!(matches!(
            engine.run("o", "nope"),
            Err(EngineError::NotFound { .. })
        ));
    }

    #[test]
    fn test_tenant_isolation() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "Ours").with_teacher("t1").with_room("r1"))
            .with_period(Period::new("x-p1", "other", 1))
            .with_teacher(Teacher::new("x-t1", "other", "X", "Y"))
            .with_building(Building::new("x-b1", "other", "Annex"))
            .with_room(Room::new("x-r1", "other", 1, "x-b1"))
            .with_course(
                Course::new("x-c1", "other", "Theirs")
                    .with_teacher("x-t1")
                    .with_room("x-r1"),
            );
        let engine = engine(cat);
        let report = solve(&engine, "o").unwrap();
        let rows = engine.store().list_items("o", &report.schedule_id).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].course, "Ours");
        assert!(engine.store().list_schedules("other").unwrap().is_empty());
        assert!(engine
            .store()
            .get_schedule("other", &report.schedule_id)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_serve_drains_channel() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"));
        let engine = engine(cat);
        let (submitter, jobs) = ChannelSubmitter::channel();
        let a = engine.request_solve("o", &submitter).unwrap();
        let b = engine.request_solve("o", &submitter).unwrap();
        drop(submitter);

        assert_eq!(engine.serve(jobs), 2);
        for id in [a, b] {
            let s = engine.store().get_schedule("o", &id).unwrap().unwrap();
            assert!(s.solved());
        }
    }

    #[test]
    fn test_closed_queue_marks_schedule_errored() {
        let cat = one_of_each()
            .with_course(Course::new("c1", "o", "A").with_teacher("t1").with_room("r1"));
        let engine = engine(cat);
        let (submitter, jobs) = ChannelSubmitter::channel();
        drop(jobs);
        let err = engine.request_solve("o", &submitter).unwrap_err();
        assert!(matches!(err, EngineError::Submit(_)));
        let schedules = engine.store().list_schedules("o").unwrap();
        assert_eq!(schedules.len(), 1);
        assert!(schedules[0].error_message().is_some());
    }

    fn random_catalog(rng: &mut SmallRng) -> InMemoryCatalog {
        let periods = rng.random_range(1..=3);
        let teachers = rng.random_range(1..=2);
        let rooms = rng.random_range(1..=2);
        let courses = rng.random_range(1..=3);

        let mut cat = InMemoryCatalog::new().with_building(Building::new("b", "o", "Main"));
        for p in 0..periods {
            let mut period = Period::new(format!("p{p}"), "o", p + 1);
            if rng.random_bool(0.3) {
                period = period.avoided();
            }
            cat = cat.with_period(period);
        }
        for t in 0..teachers {
            cat = cat.with_teacher(Teacher::new(format!("t{t}"), "o", "T", format!("{t}")));
        }
        for r in 0..rooms {
            cat = cat.with_room(Room::new(format!("r{r}"), "o", r as i32, "b"));
        }
        for c in 0..courses {
            let mut course = Course::new(format!("c{c}"), "o", format!("Course {c}"))
                .with_offered(rng.random_range(1..=2));
            for t in 0..teachers {
                if rng.random_bool(0.7) {
                    course = course.with_teacher(format!("t{t}"));
                }
            }
            for r in 0..rooms {
                if rng.random_bool(0.7) {
                    course = course.with_room(format!("r{r}"));
                }
            }
            for p in 0..periods {
                if rng.random_bool(0.2) {
                    course = course.with_barred_period(format!("p{p}"));
                }
            }
            cat = cat.with_course(course);
        }
        if courses >= 2 && periods >= 2 && rng.random_bool(0.5) {
            cat = cat.with_mandatory(
                MandatorySchedule::new("m", "o")
                    .with_course("c0")
                    .with_course("c1"),
            );
        }
        cat
    }

    #[test]
    fn test_random_catalogs_respect_hard_rules() {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut solved = 0;
        for _ in 0..40 {
            let cat = random_catalog(&mut rng);
            let courses: HashMap<String, Course> = cat
                .courses
                .iter()
                .map(|c| (c.id.clone(), c.clone()))
                .collect();
            let mandatory = cat.mandatory_schedules.first().cloned();
            let engine = engine(cat);
            let report = solve(&engine, "o").unwrap();
            match report.status {
                ScheduleStatus::Solved => solved += 1,
                ScheduleStatus::Unsolved => continue,
                other => panic!("unexpected status {other:?}"),
            }
            let rows = engine.store().list_items("o", &report.schedule_id).unwrap();

            let mut rooms = HashSet::new();
            let mut teachers = HashSet::new();
            let mut placed: HashMap<&str, u32> = HashMap::new();
            for row in &rows {
                assert!(rooms.insert((row.period_id.clone(), row.room_id.clone())));
                assert!(teachers.insert((row.period_id.clone(), row.teacher_id.clone())));
                let course = &courses[&row.course_id];
                assert!(course.allows_teacher(&row.teacher_id));
                assert!(course.allows_room(&row.room_id));
                assert!(!course.is_barred(&row.period_id));
                *placed.entry(row.course_id.as_str()).or_insert(0) += 1;
            }
            for (id, course) in &courses {
                assert_eq!(placed.get(id.as_str()).copied().unwrap_or(0), course.offered);
            }
            if let Some(group) = mandatory {
                let periods_of = |c: &String| {
                    rows.iter()
                        .filter(|r| &r.course_id == c)
                        .map(|r| r.period_id.as_str())
                        .collect::<HashSet<_>>()
                };
                let a = periods_of(&group.course_ids[0]);
                let b = periods_of(&group.course_ids[1]);
                // Some choice of one period each must differ.
                assert!(a.iter().any(|pa| b.iter().any(|pb| pa != pb)));
            }
        }
        assert!(solved > 0);
    }
}

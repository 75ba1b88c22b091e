use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use u_timetable::task::RecordingSubmitter;
use u_timetable::{
    EngineConfig, GoodLpBackend, InMemoryCatalog, ScheduleRepository, ScheduleStore,
    TimetableEngine,
};

#[derive(Parser)]
#[command(
    name = "u-timetable",
    about = "Course timetabling engine",
    version,
    propagate_version = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a catalog and solve one organization's timetable
    Solve {
        /// Catalog JSON document
        #[arg(short, long)]
        catalog: PathBuf,
        /// Organization to solve
        #[arg(short, long)]
        organization: String,
        /// Schedule database file
        #[arg(short, long)]
        db: PathBuf,
        /// Engine limits (TOML)
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Print a schedule's rows
    Show {
        #[arg(short, long)]
        db: PathBuf,
        #[arg(short, long)]
        organization: String,
        #[arg(short, long)]
        schedule: String,
    },
    /// List an organization's schedules
    List {
        #[arg(short, long)]
        db: PathBuf,
        #[arg(short, long)]
        organization: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("u_timetable=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            catalog,
            organization,
            db,
            config,
        } => solve(&catalog, &organization, &db, config.as_deref()),
        Commands::Show {
            db,
            organization,
            schedule,
        } => show(&db, &organization, &schedule),
        Commands::List { db, organization } => list(&db, &organization),
    }
}

fn solve(
    catalog: &Path,
    organization: &str,
    db: &Path,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let source = std::fs::read_to_string(catalog)
        .with_context(|| format!("reading catalog {}", catalog.display()))?;
    let catalog = InMemoryCatalog::from_json_str(&source)?;
    let config = match config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            EngineConfig::from_toml_str(&text)?
        }
        None => EngineConfig::default(),
    };
    let engine = TimetableEngine::new(catalog, ScheduleStore::open(db)?, GoodLpBackend::new())
        .with_config(config);

    let submitter = RecordingSubmitter::new();
    engine.request_solve(organization, &submitter)?;
    for job in submitter.jobs() {
        let report = engine.run(&job.organization_id, &job.solved_schedule_id)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

fn show(db: &Path, organization: &str, schedule: &str) -> anyhow::Result<()> {
    let store = ScheduleStore::open(db)?;
    let Some(solved) = store.get_schedule(organization, schedule)? else {
        bail!("schedule {schedule} not found for organization {organization}");
    };
    println!("{} [{}]", solved.id, solved.status.label());
    if let Some(message) = solved.error_message() {
        println!("error: {message}");
    }

    let mut rows = store.list_items(organization, schedule)?;
    rows.sort_by(|a, b| {
        a.period_number
            .cmp(&b.period_number)
            .then_with(|| a.room.cmp(&b.room))
    });
    println!(
        "{:>6}  {:<13}  {:<24}  {:<24}  {}",
        "period", "time", "room", "teacher", "course"
    );
    for row in rows {
        println!(
            "{:>6}  {:<13}  {:<24}  {:<24}  {}",
            row.period_number,
            format!(
                "{}-{}",
                row.period_start.format("%H:%M"),
                row.period_end.format("%H:%M")
            ),
            row.room,
            row.teacher,
            row.course
        );
    }
    Ok(())
}

fn list(db: &Path, organization: &str) -> anyhow::Result<()> {
    let store = ScheduleStore::open(db)?;
    for s in store.list_schedules(organization)? {
        let objective = s
            .objective
            .map(|o| format!("{o}"))
            .unwrap_or_else(|| "-".into());
        println!(
            "{}  {:<8}  created {}  objective {}",
            s.id,
            s.status.label(),
            s.created_at.to_rfc3339(),
            objective
        );
    }
    Ok(())
}

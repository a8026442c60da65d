//! Shipwright CLI: run project pipelines from the command line.
//!
//! Stands in for the service layer that would normally own job CRUD: it
//! loads a project definition from JSON, creates a job, and drives the
//! engine with a filesystem job store and a stdout event sink.

use anyhow::{Context, bail};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use shipwright_core::{Error, EventSink, Job, JobEvent, JobStatus, JobStore, Project, Variable};
use shipwright_engine::{BuildEngine, EngineConfig, SerialQueue};
use shipwright_executor::ShellExecutor;

#[derive(Parser)]
#[command(name = "shipwright")]
#[command(about = "Shipwright build runner", long_about = None)]
struct Cli {
    /// Directory where job records are written
    #[arg(long, env = "SHIPWRIGHT_DATA_DIR", default_value = "shipwright-data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a project's pipeline
    Run {
        /// Path to the project definition (JSON)
        project: PathBuf,
        /// Override a project variable (repeatable)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
    /// Print a stored job record
    ShowJob {
        /// Job id
        id: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run { project, set } => run(cli.data_dir, project, set).await,
        Commands::ShowJob { id } => show_job(cli.data_dir, id).await,
    }
}

async fn run(data_dir: PathBuf, project_path: PathBuf, set: Vec<String>) -> anyhow::Result<()> {
    let raw = tokio::fs::read_to_string(&project_path)
        .await
        .with_context(|| format!("reading {}", project_path.display()))?;
    let project: Project =
        serde_json::from_str(&raw).with_context(|| format!("parsing {}", project_path.display()))?;

    let overrides = parse_overrides(&set)?;

    let engine = BuildEngine::new(
        EngineConfig::default(),
        Arc::new(ShellExecutor::new()),
        Arc::new(FsJobStore { dir: data_dir }),
        Arc::new(StdoutSink),
        SerialQueue::new("jobs"),
    );

    let job = Job::new(&project.name);
    info!(job_id = %job.id, project = %project.name, "starting job");

    let Some(job) = engine.start(job, Some(project), overrides).await else {
        bail!("engine dropped the job: no project definition");
    };

    info!(job_id = %job.id, status = ?job.status, "job finished");
    if job.status == JobStatus::Fail {
        bail!("job {} failed", job.id);
    }
    Ok(())
}

async fn show_job(data_dir: PathBuf, id: String) -> anyhow::Result<()> {
    let path = data_dir.join(format!("{id}.json"));
    let raw = tokio::fs::read_to_string(&path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    println!("{raw}");
    Ok(())
}

fn parse_overrides(set: &[String]) -> anyhow::Result<Option<Vec<Variable>>> {
    if set.is_empty() {
        return Ok(None);
    }
    let mut vars = Vec::with_capacity(set.len());
    for entry in set {
        let Some((key, value)) = entry.split_once('=') else {
            bail!("invalid --set value {entry:?}, expected KEY=VALUE");
        };
        vars.push(Variable::new(key, value));
    }
    Ok(Some(vars))
}

/// Writes each job revision to `<data_dir>/<job-id>.json`.
struct FsJobStore {
    dir: PathBuf,
}

#[async_trait]
impl JobStore for FsJobStore {
    async fn update(&self, job: &Job) -> shipwright_core::Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body =
            serde_json::to_vec_pretty(job).map_err(|e| Error::Internal(e.to_string()))?;
        tokio::fs::write(self.dir.join(format!("{}.json", job.id)), body).await?;
        Ok(())
    }
}

/// Prints every event as one JSON line on stdout.
struct StdoutSink;

#[async_trait]
impl EventSink for StdoutSink {
    async fn publish(&self, channel: &str, event: JobEvent) {
        if let Ok(line) =
            serde_json::to_string(&serde_json::json!({ "channel": channel, "event": event }))
        {
            println!("{line}");
        }
    }
}

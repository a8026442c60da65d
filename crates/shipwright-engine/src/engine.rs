//! The build engine: admission, workspace init, pipeline execution.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use shipwright_core::{
    EventSink, Job, JobEvent, JobStatus, JobStore, Pipe, ProcessExecutor, Project, Variable,
};

use crate::pipe::PipeRunner;
use crate::queue::SerialQueue;
use crate::{vars, workspace};

/// Engine settings.
///
/// The workspace root holds one subdirectory per repository plus the
/// credentials directory.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub workspace_root: PathBuf,
    /// Channel name handed to the event sink with every publish.
    pub event_channel: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let workspace_root = std::env::var("SHIPWRIGHT_WORK_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                std::env::current_dir()
                    .unwrap_or_else(|_| PathBuf::from("."))
                    .join("shipwright-workspace")
            });
        Self {
            workspace_root,
            event_channel: "jobs".to_string(),
        }
    }
}

/// Orchestrates a full job run: queue admission, workspace provisioning,
/// pipeline steps, status finalization.
pub struct BuildEngine {
    config: EngineConfig,
    queue: SerialQueue,
    store: Arc<dyn JobStore>,
    events: Arc<dyn EventSink>,
    runner: PipeRunner,
}

impl BuildEngine {
    pub fn new(
        config: EngineConfig,
        executor: Arc<dyn ProcessExecutor>,
        store: Arc<dyn JobStore>,
        events: Arc<dyn EventSink>,
        queue: SerialQueue,
    ) -> Self {
        let runner = PipeRunner::new(executor, events.clone(), config.event_channel.clone());
        Self {
            config,
            queue,
            store,
            events,
            runner,
        }
    }

    /// Run `job` through the project's full pipeline.
    ///
    /// Never returns an error: every failure is folded into the persisted
    /// job record and the emitted events. The one exception is a missing
    /// project, which is logged and dropped without touching the job at all;
    /// callers are expected to validate project existence beforehand.
    ///
    /// Nothing guards against starting the same job twice; the queue only
    /// serializes distinct invocations.
    pub async fn start(
        &self,
        mut job: Job,
        project: Option<Project>,
        overrides: Option<Vec<Variable>>,
    ) -> Option<Job> {
        let Some(mut project) = project else {
            error!(job_id = %job.id, project = %job.project, "project does not exist, dropping job");
            return None;
        };

        if let Some(overrides) = overrides {
            vars::merge_overrides(&mut project.vars, overrides);
        }
        // Injected unconditionally after the merge; nothing is deduplicated,
        // so a project-declared `cwd` stays in the table ahead of this one.
        let cwd = std::env::current_dir()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        project.vars.push(Variable::new("cwd", cwd));

        let id = job.id.to_string();
        self.queue
            .admit(&id, async {
                self.run_admitted(&mut job, &project).await;
            })
            .await;
        Some(job)
    }

    async fn run_admitted(&self, job: &mut Job, project: &Project) {
        job.in_queue_for = (Utc::now() - job.created_at).num_milliseconds();
        job.status = JobStatus::Running;
        job.running = true;
        self.persist(job).await;
        self.events
            .publish(
                &self.config.event_channel,
                JobEvent::JobStarted {
                    job_id: job.id,
                    in_queue_for: job.in_queue_for,
                },
            )
            .await;
        info!(job_id = %job.id, project = %project.name, in_queue_for = job.in_queue_for, "job started");

        match workspace::initialize(&self.runner, &self.config.workspace_root, job, project).await
        {
            Ok(true) => self.run_steps(job, project).await,
            Ok(false) => {
                // Failing git step already recorded and the job marked Fail.
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "workspace setup failed");
                job.status = JobStatus::Fail;
            }
        }

        job.finished_at = Some(Utc::now());
        job.running = false;
        if job.status != JobStatus::Fail {
            job.status = JobStatus::Success;
        }
        self.persist(job).await;
        self.events
            .publish(
                &self.config.event_channel,
                JobEvent::Done { job_id: job.id },
            )
            .await;
        info!(job_id = %job.id, status = ?job.status, "job done");
    }

    async fn run_steps(&self, job: &mut Job, project: &Project) {
        let repo_dir = self.config.workspace_root.join(&project.repo.name);
        for (index, step) in project.run.iter().enumerate() {
            let command = vars::resolve(&step.command, &project.vars);
            let title = step
                .title
                .clone()
                .unwrap_or_else(|| format!("Job pipe {}", index + 1));
            let cmd = format!("cd {} && {}", workspace::quoted(&repo_dir), command);
            let pipe = Pipe::new(title, cmd, step.ignore_if_fail);
            let status = self.runner.run(pipe, job).await;
            if status == JobStatus::Fail && !step.ignore_if_fail {
                job.status = JobStatus::Fail;
                break;
            }
        }
    }

    async fn persist(&self, job: &Job) {
        // A failed update is logged, not raised; the run carries on so the
        // job still reaches a terminal state.
        if let Err(e) = self.store.update(job).await {
            error!(job_id = %job.id, error = %e, "failed to persist job");
        }
    }
}

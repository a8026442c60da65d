//! Job and pipeline-step records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Id;

/// Status shared by jobs and individual pipes.
///
/// There is no queued state: a job keeps its initial `Running` value until
/// the scheduler actually admits it, and only the engine moves it to a
/// terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobStatus {
    Running,
    Success,
    Fail,
}

/// One shell-command execution unit within a job.
///
/// Created at execution time and appended to the owning job's pipe list in
/// execution order; output fields only ever grow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipe {
    pub id: Id,
    pub title: String,
    /// Workspace-qualified command after variable resolution.
    pub cmd: String,
    pub created_at: DateTime<Utc>,
    pub stdout: String,
    pub stderr: String,
    /// When true, a failing pipe does not fail the overall job.
    pub ignore_if_fail: bool,
    pub status: JobStatus,
    /// Milliseconds from creation to completion, including bookkeeping
    /// after the process exits; -1 while in flight.
    pub time_to_exec: i64,
}

impl Pipe {
    pub fn new(title: impl Into<String>, cmd: impl Into<String>, ignore_if_fail: bool) -> Self {
        Self {
            id: Id::new(),
            title: title.into(),
            cmd: cmd.into(),
            created_at: Utc::now(),
            stdout: String::new(),
            stderr: String::new(),
            ignore_if_fail,
            status: JobStatus::Running,
            time_to_exec: -1,
        }
    }
}

/// One execution attempt of a project's full pipeline.
///
/// Created by the caller before the engine runs, mutated exclusively by the
/// engine while in flight, and persisted through [`crate::JobStore`] after
/// every state transition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: Id,
    /// Name of the project this job targets.
    pub project: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    /// Milliseconds spent waiting for queue admission.
    pub in_queue_for: i64,
    pub running: bool,
    /// Steps in execution order, truncated at the first non-ignorable
    /// failure.
    pub pipes: Vec<Pipe>,
}

impl Job {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            id: Id::new(),
            project: project.into(),
            status: JobStatus::Running,
            created_at: Utc::now(),
            finished_at: None,
            in_queue_for: -1,
            running: false,
            pipes: Vec::new(),
        }
    }
}

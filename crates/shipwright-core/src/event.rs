//! Event payloads published while a job runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Id, Pipe};

/// Lifecycle events for a single job.
///
/// Events for one job are published in the order its pipeline executes;
/// across jobs, order follows queue admission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum JobEvent {
    /// The scheduler admitted the job and it started running.
    JobStarted { job_id: Id, in_queue_for: i64 },
    /// A pipe is about to execute.
    NewPipe { job_id: Id, pipe: Pipe },
    /// A chunk of stdout arrived from the running pipe.
    PipeUpdateOut {
        job_id: Id,
        pipe_id: Id,
        pipe_created_at: DateTime<Utc>,
        pipe_title: String,
        chunk: String,
    },
    /// A chunk of stderr arrived from the running pipe.
    PipeUpdateErr {
        job_id: Id,
        pipe_id: Id,
        pipe_created_at: DateTime<Utc>,
        pipe_title: String,
        chunk: String,
    },
    /// The pipe finished and was appended to the job record.
    PipeDone { job_id: Id, pipe: Pipe },
    /// The job reached a terminal status.
    Done { job_id: Id },
}

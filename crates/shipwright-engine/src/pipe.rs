//! Runs one pipe and folds its outcome into the job record.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

use shipwright_core::{
    EventSink, Job, JobEvent, JobStatus, Pipe, ProcessExecutor, StreamKind,
};

/// Executes pipes one at a time, streaming their output as events.
pub struct PipeRunner {
    executor: Arc<dyn ProcessExecutor>,
    events: Arc<dyn EventSink>,
    channel: String,
}

impl PipeRunner {
    pub fn new(
        executor: Arc<dyn ProcessExecutor>,
        events: Arc<dyn EventSink>,
        channel: impl Into<String>,
    ) -> Self {
        Self {
            executor,
            events,
            channel: channel.into(),
        }
    }

    /// Execute `pipe`, append it to `job.pipes`, and return its final
    /// status.
    ///
    /// Emits, in order: `new-pipe`, zero or more `pipe-update-out` /
    /// `pipe-update-err` as chunks arrive, and `pipe-done` once finalized.
    /// A spawn failure counts as a failed pipe; nothing escapes as an error.
    pub async fn run(&self, mut pipe: Pipe, job: &mut Job) -> JobStatus {
        self.events
            .publish(
                &self.channel,
                JobEvent::NewPipe {
                    job_id: job.id,
                    pipe: pipe.clone(),
                },
            )
            .await;

        match self.executor.execute(&pipe.cmd).await {
            Ok(mut exec) => {
                while let Some(chunk) = exec.chunks.recv().await {
                    let event = match chunk.stream {
                        StreamKind::Stdout => {
                            pipe.stdout.push_str(&chunk.text);
                            JobEvent::PipeUpdateOut {
                                job_id: job.id,
                                pipe_id: pipe.id,
                                pipe_created_at: pipe.created_at,
                                pipe_title: pipe.title.clone(),
                                chunk: chunk.text,
                            }
                        }
                        StreamKind::Stderr => {
                            pipe.stderr.push_str(&chunk.text);
                            JobEvent::PipeUpdateErr {
                                job_id: job.id,
                                pipe_id: pipe.id,
                                pipe_created_at: pipe.created_at,
                                pipe_title: pipe.title.clone(),
                                chunk: chunk.text,
                            }
                        }
                    };
                    self.events.publish(&self.channel, event).await;
                }
                match exec.wait().await {
                    Ok(()) => pipe.status = JobStatus::Success,
                    Err(e) => {
                        debug!(pipe = %pipe.title, error = %e, "pipe command failed");
                        pipe.status = JobStatus::Fail;
                    }
                }
            }
            Err(e) => {
                warn!(pipe = %pipe.title, error = %e, "could not spawn pipe command");
                pipe.status = JobStatus::Fail;
            }
        }

        // Wall clock since creation, measured after bookkeeping.
        pipe.time_to_exec = (Utc::now() - pipe.created_at).num_milliseconds();
        let status = pipe.status;
        job.pipes.push(pipe.clone());
        self.events
            .publish(
                &self.channel,
                JobEvent::PipeDone {
                    job_id: job.id,
                    pipe,
                },
            )
            .await;
        status
    }
}

//! Collaborator traits: persistence and event publication.

use async_trait::async_trait;

use crate::{Job, JobEvent, Result};

/// Persistence collaborator.
///
/// `update` is awaited to completion before any consumer is told about the
/// new state; it is never fire-and-forget.
#[async_trait]
pub trait JobStore: Send + Sync {
    async fn update(&self, job: &Job) -> Result<()>;
}

/// Best-effort event publication. Failures stay inside the sink.
#[async_trait]
pub trait EventSink: Send + Sync {
    async fn publish(&self, channel: &str, event: JobEvent);
}

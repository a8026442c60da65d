//! Process executor trait and streamed-output types.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::{Error, Result};

/// Which stream a chunk of output came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Stdout,
    Stderr,
}

/// A piece of subprocess output, delivered as it arrives.
#[derive(Debug, Clone)]
pub struct OutputChunk {
    pub stream: StreamKind,
    pub text: String,
}

/// A running command: live output plus a completion handle.
///
/// The channel closes once both streams reach end of file; chunks still
/// queued when [`ExecStream::wait`] is called are discarded.
pub struct ExecStream {
    /// Output chunks in per-stream arrival order.
    pub chunks: mpsc::Receiver<OutputChunk>,
    completion: JoinHandle<Result<()>>,
}

impl ExecStream {
    pub fn new(chunks: mpsc::Receiver<OutputChunk>, completion: JoinHandle<Result<()>>) -> Self {
        Self { chunks, completion }
    }

    /// Wait for the command to exit. Resolves `Ok` only on exit code 0.
    pub async fn wait(self) -> Result<()> {
        let ExecStream { chunks, completion } = self;
        // Unread chunks must not hold the channel open; a caller that never
        // drained would otherwise deadlock against a full buffer.
        drop(chunks);
        match completion.await {
            Ok(outcome) => outcome,
            Err(e) => Err(Error::Internal(format!("executor task panicked: {e}"))),
        }
    }
}

/// Spawns one shell command per call and streams its output.
///
/// Each call owns exactly one child process whose lifetime equals the
/// command's own; there is no timeout and no cancellation.
#[async_trait]
pub trait ProcessExecutor: Send + Sync {
    /// Start `command`. Fails only when the process cannot be spawned.
    async fn execute(&self, command: &str) -> Result<ExecStream>;
}

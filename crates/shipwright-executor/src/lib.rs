//! Shell executor for the Shipwright build runner.
//!
//! Spawns one `sh -c` child per call and streams stdout/stderr chunks
//! through a bounded channel as they arrive, with no buffering beyond what
//! the operating system provides.

use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::debug;

use shipwright_core::{Error, ExecStream, OutputChunk, ProcessExecutor, Result, StreamKind};

/// Channel capacity for in-flight output chunks.
const CHUNK_BUFFER: usize = 64;

/// Runs commands through the system shell.
#[derive(Debug, Clone, Default)]
pub struct ShellExecutor;

impl ShellExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessExecutor for ShellExecutor {
    async fn execute(&self, command: &str) -> Result<ExecStream> {
        let mut child = Command::new("sh")
            .arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::Internal("child stdout was not captured".into()))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| Error::Internal("child stderr was not captured".into()))?;

        let (tx, rx) = mpsc::channel(CHUNK_BUFFER);
        let out_pump = tokio::spawn(pump(stdout, StreamKind::Stdout, tx.clone()));
        let err_pump = tokio::spawn(pump(stderr, StreamKind::Stderr, tx));

        let command = command.to_string();
        let completion = tokio::spawn(async move {
            let status = child.wait().await?;
            // Readers finish on EOF; join them so no chunk is lost.
            let _ = out_pump.await;
            let _ = err_pump.await;
            if status.success() {
                Ok(())
            } else {
                debug!(code = ?status.code(), "command exited with failure");
                Err(Error::ExecutionFailed {
                    command,
                    code: status.code(),
                })
            }
        });

        Ok(ExecStream::new(rx, completion))
    }
}

/// Forward raw reads from one child stream into the chunk channel,
/// preserving per-stream order.
async fn pump<R>(mut reader: R, stream: StreamKind, tx: mpsc::Sender<OutputChunk>)
where
    R: AsyncRead + Unpin + Send,
{
    let mut buf = [0u8; 8192];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                let text = String::from_utf8_lossy(&buf[..n]).into_owned();
                if tx.send(OutputChunk { stream, text }).await.is_err() {
                    // Receiver is gone; keep reading to EOF so the child
                    // never blocks on a full OS pipe.
                    while let Ok(n) = reader.read(&mut buf).await {
                        if n == 0 {
                            break;
                        }
                    }
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, ?stream, "read from child stream failed");
                break;
            }
        }
    }
}

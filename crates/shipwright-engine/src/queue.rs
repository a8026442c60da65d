//! Global serialized admission queue.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

/// Admits one task body at a time, in FIFO order across every caller.
///
/// Each project has exactly one workspace directory and one credential file
/// reused across runs, so concurrent runs of the same project would corrupt
/// shared filesystem state. A single global slot serializes all projects
/// instead of locking per project.
#[derive(Clone)]
pub struct SerialQueue {
    name: String,
    slot: Arc<Mutex<()>>,
}

impl SerialQueue {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: Arc::new(Mutex::new(())),
        }
    }

    /// Wait for the slot, then run `task` to completion while holding it.
    ///
    /// tokio's mutex hands the slot out in request order, so admission is
    /// strictly FIFO.
    pub async fn admit<F, T>(&self, id: &str, task: F) -> T
    where
        F: Future<Output = T>,
    {
        debug!(queue = %self.name, id, "waiting for slot");
        let _slot = self.slot.lock().await;
        debug!(queue = %self.name, id, "admitted");
        task.await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn bodies_never_overlap() {
        let queue = SerialQueue::new("test");
        let active = Arc::new(Mutex::new(0u32));
        let peak = Arc::new(Mutex::new(0u32));

        let mut handles = Vec::new();
        for i in 0..4 {
            let queue = queue.clone();
            let active = active.clone();
            let peak = peak.clone();
            handles.push(tokio::spawn(async move {
                queue
                    .admit(&i.to_string(), async {
                        {
                            let mut a = active.lock().await;
                            *a += 1;
                            let mut p = peak.lock().await;
                            *p = (*p).max(*a);
                        }
                        tokio::time::sleep(Duration::from_millis(10)).await;
                        *active.lock().await -= 1;
                    })
                    .await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(*peak.lock().await, 1);
    }

    #[tokio::test]
    async fn admit_returns_task_output() {
        let queue = SerialQueue::new("test");
        let out = queue.admit("id", async { 7 }).await;
        assert_eq!(out, 7);
    }
}

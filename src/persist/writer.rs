use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{Result, SidenotesError};
use crate::storage::StorageGateway;
use crate::store::NotesSnapshot;

/// How hard the writer tries before giving up on a snapshot.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Extra attempts after the first failure.
    pub retries: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            backoff: Duration::from_millis(50),
        }
    }
}

enum WriteRequest {
    Persist(NotesSnapshot),
    Sync(oneshot::Sender<()>),
}

/// Revisions seen by the writer, shared between the queue and the task.
#[derive(Debug, Default)]
struct Progress {
    submitted: Option<u64>,
    applied: Option<u64>,
    last_failure: Option<String>,
}

impl Progress {
    fn newer_submitted(&self, revision: u64) -> bool {
        self.submitted.is_some_and(|latest| latest > revision)
    }

    /// The newest submitted snapshot that never reached the gateway, if any.
    fn unapplied(&self) -> Option<u64> {
        let submitted = self.submitted?;
        match self.applied {
            Some(applied) if applied >= submitted => None,
            _ => Some(submitted),
        }
    }
}

type SharedProgress = Arc<Mutex<Progress>>;

fn lock(progress: &Mutex<Progress>) -> MutexGuard<'_, Progress> {
    progress.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Cloneable handle for submitting snapshots to the writer task.
#[derive(Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<WriteRequest>,
    progress: SharedProgress,
}

impl WriteQueue {
    /// Queue a snapshot. Never blocks; the write happens in the background.
    pub fn submit(&self, snapshot: NotesSnapshot) {
        let revision = snapshot.revision;
        {
            let mut progress = lock(&self.progress);
            progress.submitted = Some(progress.submitted.map_or(revision, |r| r.max(revision)));
        }
        if self.tx.send(WriteRequest::Persist(snapshot)).is_err() {
            warn!(revision, "Note writer has stopped, dropping snapshot");
        }
    }
}

/// Background task that applies snapshots to a gateway one at a time, in
/// submission order.
///
/// A snapshot older than the last one applied is skipped, so a late
/// debounced write can never roll durable state back. A rejected write is
/// retried until it succeeds, the retry budget runs out, or a newer snapshot
/// has been submitted.
pub struct PersistenceWriter {
    queue: WriteQueue,
    task: JoinHandle<()>,
}

impl PersistenceWriter {
    pub fn spawn(gateway: Arc<dyn StorageGateway>, policy: RetryPolicy) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let progress = SharedProgress::default();

        let task = tokio::spawn(run(gateway, policy, rx, Arc::clone(&progress)));

        Self {
            queue: WriteQueue { tx, progress },
            task,
        }
    }

    pub fn queue(&self) -> WriteQueue {
        self.queue.clone()
    }

    pub fn submit(&self, snapshot: NotesSnapshot) {
        self.queue.submit(snapshot);
    }

    /// Wait until everything submitted so far has been handled.
    ///
    /// Fails with [`SidenotesError::Storage`] when the newest submitted
    /// snapshot was not written, so durable state is behind memory.
    pub async fn sync(&self) -> Result<()> {
        let (done_tx, done_rx) = oneshot::channel();
        if self.queue.tx.send(WriteRequest::Sync(done_tx)).is_ok() {
            let _ = done_rx.await;
        }

        let progress = lock(&self.queue.progress);
        match progress.unapplied() {
            None => Ok(()),
            Some(revision) => Err(SidenotesError::Storage(format!(
                "notes revision {revision} was not saved: {}",
                progress.last_failure.as_deref().unwrap_or("writer stopped")
            ))),
        }
    }

    /// Drain the queue, then stop the task.
    pub async fn shutdown(self) -> Result<()> {
        let drained = self.sync().await;
        self.task.abort();
        drained
    }
}

async fn run(
    gateway: Arc<dyn StorageGateway>,
    policy: RetryPolicy,
    mut rx: mpsc::UnboundedReceiver<WriteRequest>,
    progress: SharedProgress,
) {
    let mut applied: Option<u64> = None;

    while let Some(request) = rx.recv().await {
        match request {
            WriteRequest::Sync(done) => {
                let _ = done.send(());
            }
            WriteRequest::Persist(snapshot) => {
                if applied.is_some_and(|revision| snapshot.revision <= revision) {
                    debug!(revision = snapshot.revision, "Skipping stale snapshot");
                    continue;
                }
                match write_with_retry(gateway.as_ref(), policy, &snapshot, &progress).await {
                    Ok(()) => {
                        applied = Some(snapshot.revision);
                        let mut progress = lock(&progress);
                        progress.applied = applied;
                        progress.last_failure = None;
                    }
                    Err(e) => {
                        lock(&progress).last_failure = Some(e.to_string());
                    }
                }
            }
        }
    }
}

async fn write_with_retry(
    gateway: &dyn StorageGateway,
    policy: RetryPolicy,
    snapshot: &NotesSnapshot,
    progress: &Mutex<Progress>,
) -> Result<()> {
    let revision = snapshot.revision;
    let entries = match snapshot.to_entries() {
        Ok(entries) => entries,
        Err(e) => {
            error!(revision, error = %e, "Failed to encode notes");
            return Err(e);
        }
    };

    let mut attempt = 0;
    loop {
        let e = match gateway.set(entries.clone()).await {
            Ok(()) => {
                debug!(revision, notes = snapshot.notes.len(), "Persisted notes");
                return Ok(());
            }
            Err(e) => e,
        };
        let superseded = lock(progress).newer_submitted(revision);
        if superseded {
            warn!(revision, error = %e, "Note write failed, newer snapshot pending");
            return Err(e);
        }
        if attempt >= policy.retries {
            error!(revision, error = %e, "Giving up on note write");
            return Err(e);
        }
        attempt += 1;
        warn!(revision, attempt, error = %e, "Note write failed, retrying");
        tokio::time::sleep(policy.backoff).await;
    }
}

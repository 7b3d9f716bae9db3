//! Batch job registry.
//!
//! Every batch job gets a [`JobContext`] and a job id. Progress is polled by
//! id while the job runs. At most one job of each [`JobKind`] may run at a
//! time; starting a second one is rejected and leaves the running job alone.

use crate::models::job::{DuplicateGroup, JobFailure, JobId, JobKind, JobProgress};
use crate::Result;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// A job started on a background task.
#[derive(Debug)]
pub struct StartedJob<T> {
    pub context: JobContext,
    pub handle: JoinHandle<T>,
}

impl<T> StartedJob<T> {
    pub fn id(&self) -> JobId {
        self.context.id()
    }
}

/// Shared state of one job.
#[derive(Debug)]
struct JobSlot {
    progress: Mutex<JobProgress>,
    cancelled: AtomicBool,
}

impl JobSlot {
    fn lock(&self) -> MutexGuard<'_, JobProgress> {
        // A panicking job must not make its progress unreadable
        self.progress.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Handle a running job uses to report progress.
#[derive(Debug, Clone)]
pub struct JobContext {
    slot: Arc<JobSlot>,
    id: JobId,
}

impl JobContext {
    pub fn id(&self) -> JobId {
        self.id
    }

    pub fn set_total(&self, total: usize) {
        self.slot.lock().total = total;
    }

    /// Jump to an item count directly, for jobs that process in bulk.
    pub fn set_current(&self, current: usize) {
        self.slot.lock().current = current;
    }

    /// Move to the next item.
    pub fn advance<S: Into<String>>(&self, status: S) {
        let mut progress = self.slot.lock();
        progress.current += 1;
        progress.status = status.into();
    }

    pub fn set_status<S: Into<String>>(&self, status: S) {
        self.slot.lock().status = status.into();
    }

    pub fn record_failure(&self, failure: JobFailure) {
        self.slot.lock().failures.push(failure);
    }

    pub fn add_pending_ai(&self) {
        self.slot.lock().pending_ai_count += 1;
    }

    pub fn set_duplicates(&self, groups: Vec<DuplicateGroup>) {
        self.slot.lock().duplicates = groups;
    }

    pub fn snapshot(&self) -> JobProgress {
        self.slot.lock().clone()
    }

    /// Whether cancellation was requested. Checked between items.
    pub fn is_cancelled(&self) -> bool {
        self.slot.cancelled.load(Ordering::SeqCst)
    }

    /// Mark the job as finished, releasing its kind for a new job.
    pub fn finish<S: Into<String>>(&self, status: S) {
        let mut progress = self.slot.lock();
        progress.running = false;
        progress.status = status.into();
    }

    /// Guard that finishes the job as aborted if it is dropped while the
    /// job is still running, e.g. when the job task panics.
    pub fn abort_guard(&self) -> JobGuard {
        JobGuard { ctx: self.clone() }
    }
}

/// See [`JobContext::abort_guard`].
#[derive(Debug)]
pub struct JobGuard {
    ctx: JobContext,
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        let mut progress = self.ctx.slot.lock();
        if progress.running {
            tracing::error!("{} job {} aborted", progress.kind, self.ctx.id);
            progress.running = false;
            progress.status = "Error: job aborted".to_string();
        }
    }
}

/// Run a job future on a background task.
///
/// The job's kind is released even if the future panics or the task is
/// aborted.
pub fn spawn_job<F>(context: JobContext, job: F) -> StartedJob<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let guard = context.abort_guard();
    let handle = tokio::spawn(async move {
        let _guard = guard;
        job.await
    });
    StartedJob { context, handle }
}

/// Registry of batch jobs, keyed by job id.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: Mutex<HashMap<JobId, Arc<JobSlot>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn jobs(&self) -> MutexGuard<'_, HashMap<JobId, Arc<JobSlot>>> {
        self.jobs.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Register a new running job.
    ///
    /// Fails with [`crate::Error::JobAlreadyRunning`] when a job of the same
    /// kind is still running.
    pub fn begin(&self, kind: JobKind, status: &str) -> Result<JobContext> {
        let mut jobs = self.jobs();
        let busy = jobs.values().any(|slot| {
            let progress = slot.lock();
            progress.kind == kind && progress.running
        });
        if busy {
            tracing::warn!("Rejected new {} job: one is already running", kind);
            return Err(crate::Error::JobAlreadyRunning(kind));
        }

        let id = Uuid::new_v4();
        let slot = Arc::new(JobSlot {
            progress: Mutex::new(JobProgress::new(id, kind, status)),
            cancelled: AtomicBool::new(false),
        });
        jobs.insert(id, slot.clone());
        tracing::info!("Started {} job {}", kind, id);
        Ok(JobContext { slot, id })
    }

    /// Progress of a job.
    pub fn progress(&self, id: JobId) -> Result<JobProgress> {
        self.jobs()
            .get(&id)
            .map(|slot| slot.lock().clone())
            .ok_or_else(|| crate::Error::JobNotFound(id.to_string()))
    }

    /// Request cooperative cancellation of a job.
    pub fn cancel(&self, id: JobId) -> Result<()> {
        let jobs = self.jobs();
        let slot = jobs
            .get(&id)
            .ok_or_else(|| crate::Error::JobNotFound(id.to_string()))?;
        slot.cancelled.store(true, Ordering::SeqCst);
        tracing::info!("Cancellation requested for job {}", id);
        Ok(())
    }

    /// Whether a job of this kind is running.
    pub fn is_running(&self, kind: JobKind) -> bool {
        self.jobs().values().any(|slot| {
            let progress = slot.lock();
            progress.kind == kind && progress.running
        })
    }

    /// All known jobs, running or finished.
    pub fn list(&self) -> Vec<JobProgress> {
        self.jobs().values().map(|slot| slot.lock().clone()).collect()
    }
}

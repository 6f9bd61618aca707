//! Per-job context passed through every stage
//!
//! A [`JobContext`] replaces shared progress and cancellation state: it owns
//! the task id, a [`CancellationToken`] and the sink that receives
//! milestones. Stages call [`JobContext::ensure_active`] between units of
//! work; nothing is interrupted mid-record.

use super::progress::{ProgressSink, TracingProgressSink};
use crate::domain::{BpaError, Result};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub struct JobContext {
    task_id: Uuid,
    job: &'static str,
    cancellation: CancellationToken,
    sink: Arc<dyn ProgressSink>,
    last_percent: AtomicU8,
}

impl JobContext {
    /// Creates the context and emits the start event
    pub fn start(
        job: &'static str,
        cancellation: CancellationToken,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        let context = Self {
            task_id: Uuid::new_v4(),
            job,
            cancellation,
            sink,
            last_percent: AtomicU8::new(0),
        };
        context.sink.start(context.task_id, job);
        context.sink.progress(context.task_id, 0, None);
        context
    }

    /// Context reporting to the tracing sink with a fresh token
    pub fn detached(job: &'static str) -> Self {
        Self::start(job, CancellationToken::new(), Arc::new(TracingProgressSink))
    }

    pub fn task_id(&self) -> Uuid {
        self.task_id
    }

    pub fn job(&self) -> &'static str {
        self.job
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancellation
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// # Errors
    ///
    /// Returns [`BpaError::Cancelled`] once the token has been cancelled
    pub fn ensure_active(&self) -> Result<()> {
        if self.is_cancelled() {
            tracing::warn!(task_id = %self.task_id, job = self.job, "Job cancelled");
            return Err(BpaError::Cancelled);
        }
        Ok(())
    }

    /// Reports a milestone; values above 100 are clamped
    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        self.last_percent.store(percent, Ordering::Relaxed);
        self.sink.progress(self.task_id, percent, None);
    }

    /// Reports the error at the last milestone reached and closes the job
    pub fn fail(&self, error: &BpaError) {
        let percent = self.last_percent.load(Ordering::Relaxed);
        self.sink
            .progress(self.task_id, percent, Some(&error.to_string()));
        self.sink.end(self.task_id);
    }

    /// Reports 100% and closes the job
    pub fn finish(&self) {
        self.report(100);
        self.sink.end(self.task_id);
    }
}

impl std::fmt::Debug for JobContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobContext")
            .field("task_id", &self.task_id)
            .field("job", &self.job)
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

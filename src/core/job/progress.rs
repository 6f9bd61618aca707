//! Progress sinks

use crate::{log_job_failure, log_job_start};
use tokio::sync::mpsc;
use uuid::Uuid;

/// Receives coarse job milestones
pub trait ProgressSink: Send + Sync {
    fn start(&self, task_id: Uuid, job: &str);

    /// `percent` is in 0..=100; `error` is set when the job failed
    fn progress(&self, task_id: Uuid, percent: u8, error: Option<&str>);

    fn end(&self, task_id: Uuid);
}

/// Writes every event to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgressSink;

impl ProgressSink for TracingProgressSink {
    fn start(&self, task_id: Uuid, job: &str) {
        log_job_start!(task_id, job);
    }

    fn progress(&self, task_id: Uuid, percent: u8, error: Option<&str>) {
        match error {
            Some(error) => log_job_failure!(task_id, error),
            None => tracing::info!(task_id = %task_id, percent, "Job progress"),
        }
    }

    fn end(&self, task_id: Uuid) {
        tracing::info!(task_id = %task_id, "Job ended");
    }
}

/// Event forwarded by [`ChannelProgressSink`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Started {
        task_id: Uuid,
        job: String,
    },
    Progress {
        task_id: Uuid,
        percent: u8,
        error: Option<String>,
    },
    Ended {
        task_id: Uuid,
    },
}

/// Forwards events to an unbounded channel, e.g. for a push transport
#[derive(Debug, Clone)]
pub struct ChannelProgressSink {
    sender: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelProgressSink {
    pub fn new(sender: mpsc::UnboundedSender<ProgressEvent>) -> Self {
        Self { sender }
    }

    /// Sink plus the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self::new(sender), receiver)
    }

    fn send(&self, event: ProgressEvent) {
        // A dropped receiver only means nobody is listening anymore
        if self.sender.send(event).is_err() {
            tracing::trace!("Progress receiver dropped");
        }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn start(&self, task_id: Uuid, job: &str) {
        self.send(ProgressEvent::Started {
            task_id,
            job: job.to_string(),
        });
    }

    fn progress(&self, task_id: Uuid, percent: u8, error: Option<&str>) {
        self.send(ProgressEvent::Progress {
            task_id,
            percent,
            error: error.map(str::to_string),
        });
    }

    fn end(&self, task_id: Uuid) {
        self.send(ProgressEvent::Ended { task_id });
    }
}

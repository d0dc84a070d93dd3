//! Progress events published by the coordinator
//!
//! Publishing never blocks: events go through a bounded channel with
//! `try_send`, and an event that does not fit is dropped.

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::debug;

use crate::app::aggregator::RunStats;
use crate::app::models::ProviderKind;

/// Observational signal about a running session
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The work list is known and scheduling begins
    Started {
        total: usize,
        provider: ProviderKind,
        workers: usize,
    },
    /// Periodic counters snapshot
    Progress(RunStats),
    /// All items processed
    Finished(RunStats),
}

/// Non-blocking sender for [`ProgressEvent`]s
#[derive(Debug, Clone, Default)]
pub struct ProgressReporter {
    tx: Option<mpsc::Sender<ProgressEvent>>,
}

impl ProgressReporter {
    /// Reporter that discards every event
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// Create a reporter plus the receiving end of its channel
    pub fn channel(buffer_size: usize) -> (Self, mpsc::Receiver<ProgressEvent>) {
        let (tx, rx) = mpsc::channel(buffer_size.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Publish an event without waiting
    pub fn emit(&self, event: ProgressEvent) {
        let Some(tx) = &self.tx else {
            return;
        };

        match tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!("Progress channel full, dropping {:?}", event);
            }
            Err(TrySendError::Closed(_)) => {
                debug!("Progress receiver gone");
            }
        }
    }

    /// Publish a snapshot if one is due
    pub fn emit_snapshot(&self, snapshot: Option<RunStats>) {
        if let Some(stats) = snapshot {
            self.emit(ProgressEvent::Progress(stats));
        }
    }
}

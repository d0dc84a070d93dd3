//! Core geocoding worker
//!
//! A worker repeatedly claims an item from the shared queue, resolves it
//! through the run's resolver and hands the outcome to the coordinator. It
//! never touches the cache or the output; those have a single writer.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::types::TaskOutcome;
use crate::app::queue::WorkQueue;
use crate::app::resolver::Resolver;

/// Individual geocoding worker
#[derive(Clone)]
pub struct GeocodeWorker {
    id: u32,
    queue: Arc<WorkQueue>,
    resolver: Resolver,
    outcome_tx: mpsc::Sender<TaskOutcome>,
}

impl GeocodeWorker {
    pub fn new(
        id: u32,
        queue: Arc<WorkQueue>,
        resolver: Resolver,
        outcome_tx: mpsc::Sender<TaskOutcome>,
    ) -> Self {
        Self {
            id,
            queue,
            resolver,
            outcome_tx,
        }
    }

    /// Drain the queue, returning how many items this worker handled
    pub async fn run(self) -> usize {
        debug!("Worker {} starting", self.id);
        let mut handled = 0;

        while let Some(item) = self.queue.next().await {
            debug!("Worker {} resolving {}", self.id, item.key);
            let resolution = self.resolver.resolve(&item).await;

            let outcome = TaskOutcome {
                worker_id: self.id,
                item,
                resolution,
            };
            if self.outcome_tx.send(outcome).await.is_err() {
                warn!("Worker {} stopping: outcome receiver closed", self.id);
                break;
            }
            handled += 1;
        }

        debug!("Worker {} finished after {} items", self.id, handled);
        handled
    }
}

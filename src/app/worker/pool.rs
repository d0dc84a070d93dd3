//! Worker pool management
//!
//! The pool size is the limit on simultaneously outstanding provider calls:
//! each worker has at most one lookup in flight.

use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::core::GeocodeWorker;
use super::types::{PoolState, TaskOutcome};
use crate::app::queue::WorkQueue;
use crate::app::resolver::Resolver;

/// Fixed-size pool of geocoding workers
#[derive(Debug)]
pub struct WorkerPool {
    worker_count: usize,
    handles: Vec<JoinHandle<usize>>,
    state: PoolState,
}

impl WorkerPool {
    /// Create a pool of `worker_count` workers (at least one)
    pub fn new(worker_count: usize) -> Self {
        Self {
            worker_count: worker_count.max(1),
            handles: Vec::new(),
            state: PoolState::Created,
        }
    }

    /// Spawn every worker against the shared queue
    ///
    /// Workers hold clones of `outcome_tx`; the channel closes once all of
    /// them have exited and the caller has dropped its own sender.
    pub fn start(
        &mut self,
        queue: Arc<WorkQueue>,
        resolver: Resolver,
        outcome_tx: mpsc::Sender<TaskOutcome>,
    ) {
        if self.state != PoolState::Created {
            warn!("Worker pool already started");
            return;
        }

        info!("Starting {} geocoding workers", self.worker_count);
        for worker_id in 0..self.worker_count {
            let worker = GeocodeWorker::new(
                worker_id as u32,
                queue.clone(),
                resolver.clone(),
                outcome_tx.clone(),
            );
            self.handles.push(tokio::spawn(worker.run()));
        }
        self.state = PoolState::Running;
    }

    /// Wait for all workers to exit, returning the number of items they handled
    pub async fn join(&mut self) -> usize {
        let mut handled = 0;
        let mut failures = 0;

        for joined in join_all(self.handles.drain(..)).await {
            match joined {
                Ok(count) => handled += count,
                Err(e) => {
                    debug!("Worker task failed: {}", e);
                    failures += 1;
                }
            }
        }

        if failures > 0 {
            warn!("{} workers terminated abnormally", failures);
        }
        self.state = PoolState::Finished;
        handled
    }

    pub fn worker_count(&self) -> usize {
        self.worker_count
    }

    pub fn state(&self) -> PoolState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::GeocodeProvider;
    use crate::app::models::{GeocodeResult, ProviderKind, WorkItem};
    use crate::app::retry::RetryPolicy;
    use crate::errors::ProviderResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Tracks the peak number of concurrent calls
    #[derive(Default)]
    struct GaugeProvider {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeProvider for GaugeProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Keyed
        }

        async fn resolve(
            &self,
            _query: &str,
            _country_hint: Option<&str>,
        ) -> ProviderResult<Option<GeocodeResult>> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Some(GeocodeResult::new(0.0, 0.0, ProviderKind::Keyed)))
        }
    }

    async fn run_pool(workers: usize, items: usize) -> (usize, usize) {
        let provider = Arc::new(GaugeProvider::default());
        let resolver = Resolver::new(provider.clone(), RetryPolicy::no_retry());
        let queue = Arc::new(WorkQueue::new(
            (0..items).map(|i| WorkItem::new("C", format!("city{}", i), i)),
        ));
        let (tx, mut rx) = mpsc::channel(4);

        let mut pool = WorkerPool::new(workers);
        pool.start(queue, resolver, tx);
        assert_eq!(pool.state(), PoolState::Running);

        let mut received = 0;
        while rx.recv().await.is_some() {
            received += 1;
        }
        assert_eq!(pool.join().await, items);
        assert_eq!(pool.state(), PoolState::Finished);
        (received, provider.peak.load(Ordering::SeqCst))
    }

    #[tokio::test]
    async fn test_pool_bounds_concurrency() {
        let (received, peak) = run_pool(3, 20).await;
        assert_eq!(received, 20);
        assert!(peak <= 3, "peak concurrency {} exceeded pool size", peak);
        assert!(peak >= 2, "workers never overlapped");
    }

    #[tokio::test]
    async fn test_single_worker_is_sequential() {
        let (received, peak) = run_pool(1, 5).await;
        assert_eq!(received, 5);
        assert_eq!(peak, 1);
    }

    #[test]
    fn test_zero_workers_clamped() {
        assert_eq!(WorkerPool::new(0).worker_count(), 1);
    }
}

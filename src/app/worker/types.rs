//! Messages exchanged between workers and the coordinator

use crate::app::models::WorkItem;
use crate::app::resolver::Resolution;

/// Result of resolving one work item, sent back to the single writer
#[derive(Debug, Clone)]
pub struct TaskOutcome {
    /// Worker that handled the item
    pub worker_id: u32,
    pub item: WorkItem,
    pub resolution: Resolution,
}

/// Lifecycle of a [`super::WorkerPool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolState {
    /// Created but not started
    Created,
    /// Workers are draining the queue
    Running,
    /// All workers have exited
    Finished,
}

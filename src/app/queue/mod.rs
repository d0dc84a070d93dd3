//! Work queue shared by geocoding workers
//!
//! Workers claim items one at a time until the queue is drained. Every item is
//! handed out exactly once, so no two workers ever resolve the same key.
//!
//! # Basic Usage
//!
//! ```rust
//! use city_geocoder::app::models::WorkItem;
//! use city_geocoder::app::queue::WorkQueue;
//!
//! # async fn example() {
//! let queue = WorkQueue::new(vec![WorkItem::new("Germany", "Berlin", 0)]);
//!
//! while let Some(item) = queue.next().await {
//!     println!("resolving {}", item.key);
//! }
//! assert_eq!(queue.remaining().await, 0);
//! # }
//! ```

use std::collections::VecDeque;

use tokio::sync::Mutex;
use tracing::debug;

use crate::app::models::WorkItem;

/// FIFO queue of pending work items
#[derive(Debug)]
pub struct WorkQueue {
    items: Mutex<VecDeque<WorkItem>>,
    total: usize,
}

impl WorkQueue {
    /// Create a queue holding `items` in order
    pub fn new(items: impl IntoIterator<Item = WorkItem>) -> Self {
        let items: VecDeque<WorkItem> = items.into_iter().collect();
        let total = items.len();
        debug!("Work queue created with {} items", total);
        Self {
            items: Mutex::new(items),
            total,
        }
    }

    /// Claim the next item, or `None` once the queue is drained
    pub async fn next(&self) -> Option<WorkItem> {
        self.items.lock().await.pop_front()
    }

    /// Items not yet claimed
    pub async fn remaining(&self) -> usize {
        self.items.lock().await.len()
    }

    /// Items the queue was created with
    pub fn total(&self) -> usize {
        self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn items(n: usize) -> Vec<WorkItem> {
        (0..n)
            .map(|i| WorkItem::new("Country", format!("City {}", i), i))
            .collect()
    }

    #[tokio::test]
    async fn test_queue_is_fifo() {
        let queue = WorkQueue::new(items(3));
        assert_eq!(queue.total(), 3);

        assert_eq!(queue.next().await.map(|i| i.ordinal), Some(0));
        assert_eq!(queue.next().await.map(|i| i.ordinal), Some(1));
        assert_eq!(queue.remaining().await, 1);
        assert_eq!(queue.next().await.map(|i| i.ordinal), Some(2));
        assert!(queue.next().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_claims_are_unique() {
        let queue = Arc::new(WorkQueue::new(items(100)));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let queue = queue.clone();
            handles.push(tokio::spawn(async move {
                let mut claimed = Vec::new();
                while let Some(item) = queue.next().await {
                    claimed.push(item.ordinal);
                    tokio::task::yield_now().await;
                }
                claimed
            }));
        }

        let mut seen = HashSet::new();
        for handle in handles {
            for ordinal in handle.await.unwrap() {
                assert!(seen.insert(ordinal), "item {} claimed twice", ordinal);
            }
        }
        assert_eq!(seen.len(), 100);
    }
}

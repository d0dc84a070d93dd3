//! Geocoding worker system
//!
//! A fixed-size pool of workers drains a shared [`WorkQueue`](crate::app::queue::WorkQueue),
//! resolving each item through a [`Resolver`](crate::app::resolver::Resolver) and sending
//! a [`TaskOutcome`] back over a channel. The receiver of that channel is the only
//! place where cache and output state change.
//!
//! - [`types`] - Outcome messages and pool state
//! - [`core`] - Individual worker loop
//! - [`pool`] - Pool lifecycle
//!
//! # Basic Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use city_geocoder::app::client::{select_provider, ClientConfig, ProvidersConfig};
//! use city_geocoder::app::queue::WorkQueue;
//! use city_geocoder::app::resolver::Resolver;
//! use city_geocoder::app::retry::RetryPolicy;
//! use city_geocoder::app::worker::WorkerPool;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = select_provider(&ClientConfig::default(), &ProvidersConfig::default(), None)?;
//! let resolver = Resolver::new(provider, RetryPolicy::default());
//! let queue = Arc::new(WorkQueue::new(Vec::new()));
//!
//! let (outcome_tx, mut outcome_rx) = tokio::sync::mpsc::channel(64);
//! let mut pool = WorkerPool::new(1);
//! pool.start(queue, resolver, outcome_tx);
//!
//! while let Some(outcome) = outcome_rx.recv().await {
//!     println!("{} resolved: {}", outcome.item.key, outcome.resolution.is_resolved());
//! }
//! pool.join().await;
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod pool;
pub mod types;

pub use self::core::GeocodeWorker;
pub use pool::WorkerPool;
pub use types::{PoolState, TaskOutcome};

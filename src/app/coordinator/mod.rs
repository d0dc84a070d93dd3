//! Geocoding orchestration
//!
//! The coordinator turns a work list into a geocoded catalog:
//!
//! 1. Items whose key is already cached are answered immediately and never
//!    reach a provider.
//! 2. The remaining items go into a [`WorkQueue`] drained by a [`WorkerPool`]
//!    whose size is the provider's concurrency limit.
//! 3. Worker outcomes come back over a channel to this single writer, which
//!    updates the [`CacheStore`] and the [`ResultAggregator`], checkpoints the
//!    cache periodically and publishes progress.
//!
//! - [`config`] - Concurrency, progress and checkpoint settings
//! - [`progress`] - Non-blocking progress events
//! - [`stats`] - Session results and dry-run plans
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use city_geocoder::app::client::{select_provider, ClientConfig, ProvidersConfig};
//! use city_geocoder::app::coordinator::{Coordinator, CoordinatorConfig};
//! use city_geocoder::app::resolver::Resolver;
//! use city_geocoder::app::retry::RetryPolicy;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let provider = select_provider(&ClientConfig::default(), &ProvidersConfig::default(), None)?;
//! let coordinator = Coordinator::new(
//!     CoordinatorConfig::default(),
//!     Resolver::new(provider, RetryPolicy::default()),
//! );
//!
//! let result = coordinator
//!     .run_pipeline(
//!         Path::new("data/cities.json"),
//!         Path::new("data/geocode-cache.json"),
//!         Path::new("data/cities-geocoded.json"),
//!     )
//!     .await?;
//! println!("{}", result.stats.summary_line());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod progress;
pub mod stats;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::aggregator::{write_output, ResultAggregator};
use crate::app::cache::CacheStore;
use crate::app::catalog::{load_catalog, WorkList};
use crate::app::models::WorkItem;
use crate::app::queue::WorkQueue;
use crate::app::resolver::{QueryStage, Resolution, Resolver};
use crate::app::worker::{TaskOutcome, WorkerPool};
use crate::constants::workers;
use crate::errors::{AppError, Result};

pub use config::CoordinatorConfig;
pub use progress::{ProgressEvent, ProgressReporter};
pub use stats::{RunPlan, SessionResult};

/// Scheduler and single writer for a geocoding session
pub struct Coordinator {
    config: CoordinatorConfig,
    resolver: Resolver,
    reporter: ProgressReporter,
}

impl Coordinator {
    pub fn new(config: CoordinatorConfig, resolver: Resolver) -> Self {
        Self {
            config,
            resolver,
            reporter: ProgressReporter::disabled(),
        }
    }

    /// Publish progress events through `reporter`
    pub fn with_reporter(mut self, reporter: ProgressReporter) -> Self {
        self.reporter = reporter;
        self
    }

    /// Compute cache hits versus pending lookups without touching the network
    pub fn plan(work_list: &WorkList, cache: &CacheStore) -> RunPlan {
        let cache_hits = work_list
            .items
            .iter()
            .filter(|item| cache.contains(&item.key))
            .count();

        RunPlan {
            total: work_list.len(),
            countries: work_list.countries.len(),
            cache_hits,
            pending: work_list.len() - cache_hits,
            duplicates: work_list.duplicates,
            skipped_empty: work_list.skipped_empty,
        }
    }

    /// Load inputs, geocode, persist the cache and write the output catalog
    ///
    /// # Errors
    ///
    /// Returns `AppError` if the configuration is invalid or the output
    /// catalog cannot be written. Provider failures and cache persistence
    /// problems never fail the run.
    pub async fn run_pipeline(
        &self,
        input_path: &Path,
        cache_path: &Path,
        output_path: &Path,
    ) -> Result<SessionResult> {
        let catalog = load_catalog(input_path).await;
        let work_list = WorkList::build(&catalog);
        let mut cache = CacheStore::load(cache_path).await;

        let result = self.run(&work_list, &mut cache).await?;
        write_output(output_path, &result.catalog).await?;
        Ok(result)
    }

    /// Resolve every item in `work_list`, updating `cache` in place
    ///
    /// The cache is checkpointed every `checkpoint_every` new entries and
    /// persisted once more at the end if anything changed.
    ///
    /// # Errors
    ///
    /// Returns `AppError` only for an invalid coordinator configuration
    pub async fn run(&self, work_list: &WorkList, cache: &mut CacheStore) -> Result<SessionResult> {
        self.config.validate().map_err(AppError::generic)?;

        let session_start = chrono::Utc::now();
        let started = Instant::now();
        let provider = self.resolver.provider_kind();
        let total = work_list.len();
        let entries_before = cache.len();

        let mut aggregator =
            ResultAggregator::new(&work_list.countries, total, self.config.progress_every);
        let mut errors = Vec::new();

        let pending = self.short_circuit_hits(work_list, cache, &mut aggregator);
        let workers = if pending.is_empty() {
            0
        } else {
            self.config.concurrency_for(provider).min(pending.len())
        };

        info!(
            "Geocoding {} places with {} provider: {} cached, {} to look up with {} workers",
            total,
            provider,
            total - pending.len(),
            pending.len(),
            workers
        );
        self.reporter.emit(ProgressEvent::Started {
            total,
            provider,
            workers,
        });

        let mut checkpoints = 0;
        if !pending.is_empty() {
            checkpoints = self
                .dispatch(pending, workers, cache, &mut aggregator, &mut errors)
                .await;
        }

        match cache.persist_if_dirty().await {
            Ok(true) => debug!("Final cache persist complete"),
            Ok(false) => debug!("Cache unchanged, nothing to persist"),
            Err(e) => {
                warn!("Failed to persist cache: {}", e);
                errors.push(format!("Cache persist failed: {}", e));
            }
        }

        let (catalog, stats) = aggregator.finish();
        self.reporter.emit(ProgressEvent::Finished(stats));
        info!("Session complete: {}", stats);

        Ok(SessionResult {
            stats,
            catalog,
            provider,
            workers,
            checkpoints,
            new_cache_entries: cache.len().saturating_sub(entries_before),
            session_start,
            total_duration: started.elapsed(),
            errors,
        })
    }

    /// Record cache hits and return the items that need a provider
    fn short_circuit_hits(
        &self,
        work_list: &WorkList,
        cache: &CacheStore,
        aggregator: &mut ResultAggregator,
    ) -> Vec<WorkItem> {
        let mut pending = Vec::new();
        for item in &work_list.items {
            match cache.get(&item.key) {
                Some(coordinate) => {
                    debug!("Cache hit: {}", item.key);
                    let snapshot = aggregator.record_hit(item, coordinate);
                    self.reporter.emit_snapshot(snapshot);
                }
                None => pending.push(item.clone()),
            }
        }
        pending
    }

    /// Run the worker pool over `pending`, applying outcomes as they arrive
    ///
    /// Returns the number of successful checkpoints.
    async fn dispatch(
        &self,
        pending: Vec<WorkItem>,
        workers: usize,
        cache: &mut CacheStore,
        aggregator: &mut ResultAggregator,
        errors: &mut Vec<String>,
    ) -> usize {
        let queue = Arc::new(WorkQueue::new(pending));
        let (outcome_tx, mut outcome_rx) = mpsc::channel(workers::OUTCOME_BUFFER_SIZE);

        let mut pool = WorkerPool::new(workers);
        pool.start(queue, self.resolver.clone(), outcome_tx);

        let mut checkpoints = 0;
        let mut since_checkpoint = 0;

        while let Some(outcome) = outcome_rx.recv().await {
            if self.apply_outcome(outcome, cache, aggregator) {
                since_checkpoint += 1;
            }

            if self.config.checkpoint_every > 0 && since_checkpoint >= self.config.checkpoint_every
            {
                since_checkpoint = 0;
                match cache.persist().await {
                    Ok(()) => {
                        checkpoints += 1;
                        debug!("Cache checkpoint {} written ({} entries)", checkpoints, cache.len());
                    }
                    Err(e) => {
                        warn!("Cache checkpoint failed, continuing: {}", e);
                        errors.push(format!("Cache checkpoint failed: {}", e));
                    }
                }
            }
        }

        let handled = pool.join().await;
        debug!(
            "Workers handled {} lookups; {}",
            handled,
            aggregator.stats()
        );
        checkpoints
    }

    /// Apply one worker outcome; returns true if the cache gained an entry
    fn apply_outcome(
        &self,
        outcome: TaskOutcome,
        cache: &mut CacheStore,
        aggregator: &mut ResultAggregator,
    ) -> bool {
        let TaskOutcome {
            worker_id,
            item,
            resolution,
        } = outcome;

        let (added, snapshot) = match resolution {
            Resolution::Resolved { result, stage } => {
                debug!(
                    "Worker {} resolved {} via {} query: {}",
                    worker_id, item.key, stage, result.coordinate
                );
                let added = cache.put(item.key.clone(), result.coordinate);
                let snapshot = aggregator.record_resolved(
                    &item,
                    result.coordinate,
                    stage == QueryStage::Fallback,
                );
                (added, snapshot)
            }
            Resolution::Unresolved { provider_errors } => {
                if provider_errors > 0 {
                    warn!(
                        "Could not resolve {} ({} provider errors)",
                        item.key, provider_errors
                    );
                } else {
                    debug!("No match for {}", item.key);
                }
                (false, aggregator.record_miss(&item))
            }
        };

        self.reporter.emit_snapshot(snapshot);
        added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::client::GeocodeProvider;
    use crate::app::models::{Coordinate, GeocodeResult, PlaceCatalog, PlaceKey, ProviderKind};
    use crate::app::retry::RetryPolicy;
    use crate::errors::ProviderResult;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Resolves every primary query except those for "Nowhere"
    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodeProvider for CountingProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::Keyed
        }

        async fn resolve(
            &self,
            query: &str,
            _country_hint: Option<&str>,
        ) -> ProviderResult<Option<GeocodeResult>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok((!query.starts_with("Nowhere"))
                .then(|| GeocodeResult::new(10.0, 20.0, ProviderKind::Keyed)))
        }
    }

    fn work_list(cities: &[&str]) -> WorkList {
        let mut catalog = PlaceCatalog::new();
        catalog.insert(
            "Germany".to_string(),
            cities.iter().map(|c| c.to_string()).collect(),
        );
        catalog.insert("Atlantis".to_string(), Vec::new());
        WorkList::build(&catalog)
    }

    fn coordinator(provider: Arc<CountingProvider>, config: CoordinatorConfig) -> Coordinator {
        Coordinator::new(config, Resolver::new(provider, RetryPolicy::no_retry()))
    }

    #[tokio::test]
    async fn test_cache_hits_skip_provider() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = CacheStore::new(temp_dir.path().join("cache.json"));
        cache.put(PlaceKey::new("Germany", "Berlin"), Coordinate::new(52.52, 13.405));

        let provider = Arc::new(CountingProvider::default());
        let result = coordinator(provider.clone(), CoordinatorConfig::default())
            .run(&work_list(&["Berlin", "Bonn", "Nowhere"]), &mut cache)
            .await
            .unwrap();

        assert_eq!(result.stats.cache_hits, 1);
        assert_eq!(result.stats.resolved, 1);
        assert_eq!(result.stats.misses, 1);
        // Bonn once, Nowhere twice (primary + fallback)
        assert_eq!(provider.calls.load(Ordering::SeqCst), 3);

        assert_eq!(result.catalog["Germany"].len(), 2);
        assert!(result.catalog["Atlantis"].is_empty());
        assert_eq!(result.new_cache_entries, 1);
        assert!(cache.contains(&PlaceKey::new("Germany", "Bonn")));
        assert!(!cache.contains(&PlaceKey::new("Germany", "Nowhere")));
        assert!(cache.path().exists());
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_checkpoints_during_run() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = CacheStore::new(temp_dir.path().join("cache.json"));
        let cities: Vec<String> = (0..7).map(|i| format!("City {}", i)).collect();
        let cities: Vec<&str> = cities.iter().map(String::as_str).collect();

        let provider = Arc::new(CountingProvider::default());
        let result = coordinator(
            provider,
            CoordinatorConfig::default()
                .with_checkpoint_every(3)
                .with_keyed_concurrency(2),
        )
        .run(&work_list(&cities), &mut cache)
        .await
        .unwrap();

        assert_eq!(result.checkpoints, 2);
        assert_eq!(result.workers, 2);
        assert_eq!(cache.len(), 7);
        assert!(!cache.is_dirty());
    }

    #[tokio::test]
    async fn test_progress_events_published() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = CacheStore::new(temp_dir.path().join("cache.json"));
        let (reporter, mut rx) = ProgressReporter::channel(64);

        coordinator(Arc::new(CountingProvider::default()), CoordinatorConfig::default())
            .with_reporter(reporter)
            .run(&work_list(&["Berlin", "Bonn"]), &mut cache)
            .await
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }

        assert!(matches!(
            events.first(),
            Some(ProgressEvent::Started { total: 2, .. })
        ));
        assert!(matches!(events.last(), Some(ProgressEvent::Finished(stats)) if stats.processed == 2));
        // Final task always produces a snapshot
        assert!(events
            .iter()
            .any(|e| matches!(e, ProgressEvent::Progress(stats) if stats.processed == 2)));
    }

    #[tokio::test]
    async fn test_unwritable_cache_does_not_fail_run() {
        let temp_dir = TempDir::new().unwrap();
        let input = temp_dir.path().join("cities.json");
        tokio::fs::write(&input, r#"{"Germany": ["Berlin", "Bonn", "Nowhere"]}"#)
            .await
            .unwrap();

        // The cache's parent is a regular file, so every persist fails
        let blocker = temp_dir.path().join("blocker");
        tokio::fs::write(&blocker, "not a directory").await.unwrap();
        let cache_path = blocker.join("cache.json");
        let output = temp_dir.path().join("out").join("cities-geocoded.json");

        let result = coordinator(
            Arc::new(CountingProvider::default()),
            CoordinatorConfig::default().with_checkpoint_every(1),
        )
        .run_pipeline(&input, &cache_path, &output)
        .await
        .unwrap();

        assert!(result.stats.is_complete());
        assert_eq!(result.stats.resolved, 2);
        assert_eq!(result.stats.misses, 1);
        assert_eq!(result.checkpoints, 0);
        assert!(result
            .errors
            .iter()
            .any(|e| e.starts_with("Cache checkpoint failed")));
        assert!(result
            .errors
            .iter()
            .any(|e| e.starts_with("Cache persist failed")));
        assert!(!result.is_success());

        let written: serde_json::Value =
            serde_json::from_slice(&tokio::fs::read(&output).await.unwrap()).unwrap();
        assert_eq!(written["Germany"].as_array().unwrap().len(), 2);
        assert!(!cache_path.exists());
    }

    #[tokio::test]
    async fn test_plan_counts_hits() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = CacheStore::new(temp_dir.path().join("cache.json"));
        cache.put(PlaceKey::new("Germany", "Berlin"), Coordinate::new(52.52, 13.405));

        let plan = Coordinator::plan(&work_list(&["Berlin", "Bonn", "Berlin (virtual)"]), &cache);
        assert_eq!(plan.total, 2);
        assert_eq!(plan.cache_hits, 1);
        assert_eq!(plan.pending, 1);
        assert_eq!(plan.duplicates, 1);
        assert_eq!(plan.countries, 2);
    }

    #[tokio::test]
    async fn test_empty_work_list() {
        let temp_dir = TempDir::new().unwrap();
        let mut cache = CacheStore::new(temp_dir.path().join("cache.json"));

        let result = coordinator(Arc::new(CountingProvider::default()), CoordinatorConfig::default())
            .run(&WorkList::default(), &mut cache)
            .await
            .unwrap();

        assert_eq!(result.stats.processed, 0);
        assert_eq!(result.workers, 0);
        assert!(result.catalog.is_empty());
        // Nothing changed, so nothing is written
        assert!(!cache.path().exists());
    }
}

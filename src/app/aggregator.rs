//! Progress and result aggregation
//!
//! The [`ResultAggregator`] is owned by the coordinator and is the only place
//! where run counters and the output catalog change. Every country from the
//! work list gets an output entry up front, so countries whose cities all
//! miss still appear with an empty list.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::app::models::{Coordinate, GeocodedCatalog, ResolvedCity, WorkItem};
use crate::app::persist::{to_json_bytes, write_atomic};
use crate::errors::{OutputError, OutputResult};

/// Counters for one run
///
/// `processed == cache_hits + resolved + misses` holds at all times.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Work items in the run
    pub total: usize,
    /// Items completed so far
    pub processed: usize,
    /// Items answered from the cache without a provider call
    pub cache_hits: usize,
    /// Items resolved by the provider
    pub resolved: usize,
    /// Subset of `resolved` that needed the bare city query
    pub resolved_via_fallback: usize,
    /// Items that could not be resolved
    pub misses: usize,
}

impl RunStats {
    /// Percentage of items processed
    pub fn completion_percentage(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        (self.processed as f64 / self.total as f64) * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.processed >= self.total
    }

    /// Final summary line printed by the CLI
    pub fn summary_line(&self) -> String {
        format!(
            "Processed {} cities: {} cache hits, {} resolved, {} misses",
            self.processed, self.cache_hits, self.resolved, self.misses
        )
    }
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} processed ({} hits, {} resolved, {} misses)",
            self.processed, self.total, self.cache_hits, self.resolved, self.misses
        )
    }
}

/// Accumulates per-country results and decides when to report progress
#[derive(Debug)]
pub struct ResultAggregator {
    stats: RunStats,
    progress_every: usize,
    entries: BTreeMap<String, Vec<(usize, ResolvedCity)>>,
}

impl ResultAggregator {
    /// Create an aggregator for `total` items with an entry per country
    pub fn new<'a>(
        countries: impl IntoIterator<Item = &'a String>,
        total: usize,
        progress_every: usize,
    ) -> Self {
        let entries = countries
            .into_iter()
            .map(|country| (country.clone(), Vec::new()))
            .collect();

        Self {
            stats: RunStats {
                total,
                ..Default::default()
            },
            progress_every: progress_every.max(1),
            entries,
        }
    }

    /// Record a cache hit
    ///
    /// Returns a snapshot when a progress signal is due.
    pub fn record_hit(&mut self, item: &WorkItem, coordinate: Coordinate) -> Option<RunStats> {
        self.stats.cache_hits += 1;
        self.push_city(item, coordinate);
        self.complete()
    }

    /// Record a provider resolution
    pub fn record_resolved(
        &mut self,
        item: &WorkItem,
        coordinate: Coordinate,
        via_fallback: bool,
    ) -> Option<RunStats> {
        self.stats.resolved += 1;
        if via_fallback {
            self.stats.resolved_via_fallback += 1;
        }
        self.push_city(item, coordinate);
        self.complete()
    }

    /// Record an item that could not be resolved; nothing is added to the output
    pub fn record_miss(&mut self, _item: &WorkItem) -> Option<RunStats> {
        self.stats.misses += 1;
        self.complete()
    }

    /// Current counters
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    /// Consume the aggregator, producing the output catalog in work-list order
    pub fn finish(self) -> (GeocodedCatalog, RunStats) {
        let catalog = self
            .entries
            .into_iter()
            .map(|(country, mut cities)| {
                cities.sort_by_key(|(ordinal, _)| *ordinal);
                (country, cities.into_iter().map(|(_, city)| city).collect())
            })
            .collect();
        (catalog, self.stats)
    }

    fn push_city(&mut self, item: &WorkItem, coordinate: Coordinate) {
        self.entries
            .entry(item.country.clone())
            .or_default()
            .push((item.ordinal, ResolvedCity::new(item.city.clone(), coordinate)));
    }

    fn complete(&mut self) -> Option<RunStats> {
        self.stats.processed += 1;
        let due = self.stats.processed % self.progress_every == 0
            || self.stats.processed == self.stats.total;
        if due {
            info!(
                "Progress: {} ({:.0}%)",
                self.stats,
                self.stats.completion_percentage()
            );
            Some(self.stats)
        } else {
            None
        }
    }
}

/// Write the output catalog atomically as pretty JSON
///
/// # Errors
///
/// Returns `OutputError` if serialization or the file write fails
pub async fn write_output(path: &Path, catalog: &GeocodedCatalog) -> OutputResult<()> {
    let bytes = to_json_bytes(catalog)?;
    write_atomic(path, &bytes)
        .await
        .map_err(|source| OutputError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    let cities: usize = catalog.values().map(Vec::len).sum();
    info!(
        "Wrote {} cities across {} countries to {}",
        cities,
        catalog.len(),
        path.display()
    );
    Ok(())
}

//! Session results and dry-run plans

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::aggregator::RunStats;
use crate::app::models::{GeocodedCatalog, ProviderKind};

/// Final result of a geocoding session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionResult {
    /// Final counters
    pub stats: RunStats,
    /// Resolved cities per country
    pub catalog: GeocodedCatalog,
    /// Provider used for every lookup in the session
    pub provider: ProviderKind,
    /// Workers spawned for pending lookups
    pub workers: usize,
    /// Intermediate cache checkpoints written
    pub checkpoints: usize,
    /// Places added to the cache by this session
    pub new_cache_entries: usize,
    /// Wall clock start of the session
    pub session_start: DateTime<Utc>,
    pub total_duration: Duration,
    /// Non-fatal persistence problems
    pub errors: Vec<String>,
}

impl SessionResult {
    /// True when every item was processed and the cache was saved
    pub fn is_success(&self) -> bool {
        self.stats.is_complete() && self.errors.is_empty()
    }

    /// Provider lookups per second over the session
    pub fn lookup_rate(&self) -> f64 {
        let seconds = self.total_duration.as_secs_f64();
        if seconds <= 0.0 {
            return 0.0;
        }
        (self.stats.resolved + self.stats.misses) as f64 / seconds
    }
}

/// What a run would do, computed without any network calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPlan {
    /// Unique places in the work list
    pub total: usize,
    /// Countries in the output
    pub countries: usize,
    /// Places already in the cache
    pub cache_hits: usize,
    /// Places that would be sent to a provider
    pub pending: usize,
    /// Input cities dropped as duplicates
    pub duplicates: usize,
    /// Input cities dropped as empty
    pub skipped_empty: usize,
}

//! Application constants for City Geocoder
//!
//! This module centralizes all constants used throughout the application,
//! organized by functional domain for maintainability and clarity.

use std::time::Duration;

/// Environment variable names
pub mod env {
    /// Credential that selects the keyed provider when present and non-empty
    pub const API_KEY: &str = "OPENCAGE_API_KEY";
}

/// Place naming and key formation
pub mod places {
    /// Separator joining normalized country and city into a cache key
    pub const KEY_SEPARATOR: &str = "::";

    /// Trailing qualifier stripped from country and city names
    pub const VIRTUAL_QUALIFIER: &str = "(virtual)";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = "City-Geocoder/0.1.0 (map catalog enrichment)";

    /// Default HTTP request timeout
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

    /// Connection pool idle timeout
    pub const POOL_IDLE_TIMEOUT: Duration = Duration::from_secs(90);
}

/// Geocoding provider endpoints
pub mod providers {
    /// Keyed provider forward-geocoding endpoint
    pub const KEYED_BASE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

    /// Unkeyed public provider search endpoint
    pub const UNKEYED_BASE_URL: &str = "https://nominatim.openstreetmap.org/search";

    /// Only the best match is ever used
    pub const RESULT_LIMIT: &str = "1";
}

/// Rate limiting and retry configuration
pub mod limits {
    use super::Duration;

    /// Enforced pause after every unkeyed provider call, success or failure
    pub const UNKEYED_MIN_INTERVAL: Duration = Duration::from_millis(1100);

    /// Maximum retry attempts per query (1 = no retry)
    pub const MAX_ATTEMPTS: u32 = 2;

    /// Base delay for exponential backoff (milliseconds)
    pub const RETRY_BASE_DELAY_MS: u64 = 500;

    /// Maximum backoff delay (milliseconds)
    pub const RETRY_MAX_DELAY_MS: u64 = 5_000;

    /// Multiplier applied to the delay after each failed attempt
    pub const RETRY_MULTIPLIER: f64 = 2.0;

    /// Jitter factor for randomizing delays (0.0-1.0)
    pub const BACKOFF_JITTER_FACTOR: f64 = 0.1;
}

/// Worker and concurrency configuration
pub mod workers {
    /// Concurrent provider calls when using the keyed provider
    pub const KEYED_CONCURRENCY: usize = 6;

    /// Concurrent provider calls when using the unkeyed provider
    pub const UNKEYED_CONCURRENCY: usize = 1;

    /// Maximum recommended keyed concurrency
    pub const MAX_KEYED_CONCURRENCY: usize = 32;

    /// Channel buffer size for worker outcomes
    pub const OUTCOME_BUFFER_SIZE: usize = 64;
}

/// Progress reporting
pub mod progress {
    /// Emit a progress signal every this many completed tasks
    pub const PROGRESS_EVERY: usize = 10;

    /// Buffer size of the progress event channel
    pub const PROGRESS_BUFFER_SIZE: usize = 256;

    /// Persist the cache after this many new provider resolutions
    pub const CHECKPOINT_EVERY: usize = 25;
}

/// File operation constants
pub mod files {
    /// Temporary file suffix for atomic operations
    pub const TEMP_FILE_SUFFIX: &str = ".tmp";

    /// Default input catalog path
    pub const DEFAULT_INPUT: &str = "data/cities.json";

    /// Default cache file path
    pub const DEFAULT_CACHE: &str = "data/geocode-cache.json";

    /// Default output catalog path
    pub const DEFAULT_OUTPUT: &str = "data/cities-geocoded.json";

    /// Project-local configuration file name
    pub const LOCAL_CONFIG_FILE: &str = "city-geocoder.toml";

    /// Directory under the user config dir
    pub const CONFIG_DIR_NAME: &str = "city-geocoder";
}

/// Logging constants
pub mod logging {
    /// Default log level
    pub const DEFAULT_LOG_LEVEL: &str = "info";

    /// Crate name used for the log filter directive
    pub const CRATE_TARGET: &str = "city_geocoder";
}

// Re-export commonly used constants for convenience
pub use env::API_KEY as ENV_API_KEY;
pub use http::{DEFAULT_TIMEOUT as HTTP_TIMEOUT, USER_AGENT};
pub use limits::UNKEYED_MIN_INTERVAL;
pub use places::KEY_SEPARATOR;
pub use workers::{KEYED_CONCURRENCY, UNKEYED_CONCURRENCY};

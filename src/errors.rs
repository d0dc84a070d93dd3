//! Error types for City Geocoder
//!
//! Errors are split by component. Provider, cache and catalog failures are
//! mostly recovered close to where they happen; only configuration problems and
//! failures to write the final artifacts reach the top-level [`AppError`].

use std::path::PathBuf;

use thiserror::Error;

/// Geocoding provider errors
///
/// "No result found" is not an error: providers return `Ok(None)` for it.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// Network or HTTP transport failure
    #[error("Provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Request did not complete in time
    #[error("Provider request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// Provider answered with a non-success status
    #[error("Provider error: HTTP {status}")]
    Status { status: u16 },

    /// Provider throttled the request
    #[error("Provider rate limit exceeded. Server responded with HTTP 429")]
    RateLimited,

    /// Response body could not be understood
    #[error("Could not decode provider response: {reason}")]
    Decode { reason: String },

    /// Request URL could not be built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// Provider could not be set up from the given settings
    #[error("Invalid provider configuration: {reason}")]
    Configuration { reason: String },

    /// Keyed provider requested without a credential
    #[error("Keyed provider requires an API key. Set OPENCAGE_API_KEY or providers.api_key")]
    MissingCredential,
}

impl ProviderError {
    /// Whether a later attempt at the same query could succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderError::Transport(_)
            | ProviderError::Timeout { .. }
            | ProviderError::RateLimited => true,
            ProviderError::Status { status } => *status >= 500,
            ProviderError::Decode { .. }
            | ProviderError::InvalidUrl { .. }
            | ProviderError::Configuration { .. }
            | ProviderError::MissingCredential => false,
        }
    }
}

/// Cache store errors
#[derive(Error, Debug)]
pub enum CacheError {
    /// Reading or writing the cache file failed
    #[error("Cache file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache could not be serialized
    #[error("Cache serialization failed")]
    Serialize(#[from] serde_json::Error),

    /// Persisted cache is not a valid key/coordinate mapping
    #[error("Cache file {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Input catalog errors
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Reading the catalog file failed
    #[error("Catalog file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Catalog is not a mapping of country to city names
    #[error("Catalog file {path} is malformed: {reason}")]
    Malformed { path: PathBuf, reason: String },
}

/// Output catalog errors
#[derive(Error, Debug)]
pub enum OutputError {
    /// Writing the output file failed
    #[error("Output file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Output could not be serialized
    #[error("Output serialization failed")]
    Serialize(#[from] serde_json::Error),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Invalid configuration format
    #[error("Invalid configuration format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    /// Configuration could not be rendered
    #[error("Configuration serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// Configuration file could not be read or written
    #[error("Configuration file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No per-user configuration directory on this platform
    #[error("Could not determine user config directory")]
    NoConfigDir,
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Provider error
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// Cache error
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// Catalog error
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// Output error
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Generic application error with context
    #[error("Application error: {message}")]
    Generic { message: String },
}

impl AppError {
    /// Create a generic application error with a message
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
        }
    }

    /// Check if the error is recoverable (transient)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AppError::Provider(e) => e.is_retryable(),
            AppError::Cache(CacheError::Malformed { .. })
            | AppError::Catalog(CatalogError::Malformed { .. }) => true,
            _ => false,
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Provider(_) => "provider",
            AppError::Cache(_) => "cache",
            AppError::Catalog(_) => "catalog",
            AppError::Output(_) => "output",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
            AppError::Generic { .. } => "generic",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Provider result type alias
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// Cache result type alias
pub type CacheResult<T> = std::result::Result<T, CacheError>;

/// Catalog result type alias
pub type CatalogResult<T> = std::result::Result<T, CatalogError>;

/// Output result type alias
pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

//! Configuration management for City Geocoder
//!
//! Settings come from a single TOML file found in the standard locations,
//! with every field defaulted so partial files are valid. The API key may
//! also come from the environment, which takes precedence over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::app::client::{ClientConfig, ProvidersConfig};
use crate::app::coordinator::CoordinatorConfig;
use crate::app::retry::RetryPolicy;
use crate::auth::mask_secret;
use crate::constants::{files, limits, logging, progress, providers, workers};
use crate::errors::{ConfigError, ConfigResult};

/// Unified application configuration for TOML serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Input, cache and output locations
    pub paths: PathsConfig,
    /// HTTP client and pacing settings
    pub client: ClientConfig,
    /// Provider endpoints and credential
    pub providers: ProvidersConfig,
    /// Scheduling settings
    pub coordinator: CoordinatorConfig,
    /// Retry policy for provider lookups
    pub retry: RetryPolicy,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// File locations used by the pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Country to cities catalog
    pub input: PathBuf,
    /// Persistent geocode cache
    pub cache: PathBuf,
    /// Geocoded catalog
    pub output: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from(files::DEFAULT_INPUT),
            cache: PathBuf::from(files::DEFAULT_CACHE),
            output: PathBuf::from(files::DEFAULT_OUTPUT),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default log level: error, warn, info, debug or trace
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: logging::DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, returning it with the file it came from
    ///
    /// Precedence: explicit `config_file_override` (must exist), then
    /// `./city-geocoder.toml`, then the user config directory. With no file
    /// the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an explicit file is missing, or if the file
    /// found cannot be read, parsed or validated
    pub async fn load_with_source(
        config_file_override: Option<PathBuf>,
    ) -> ConfigResult<(Self, Option<PathBuf>)> {
        let config_path = match config_file_override {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound { path });
                }
                Some(path)
            }
            None => Self::find_config_file().await,
        };

        let config = match &config_path {
            Some(path) => Self::load_from_file(path).await?,
            None => {
                debug!("No config file found, using defaults");
                Self::default()
            }
        };

        config.validate()?;
        Ok((config, config_path))
    }

    /// Load configuration from the standard locations
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load_with_source`]
    pub async fn load(config_file_override: Option<PathBuf>) -> ConfigResult<Self> {
        Ok(Self::load_with_source(config_file_override).await?.0)
    }

    /// Write a commented default config file to the user config directory
    ///
    /// Returns the path and whether a new file was created. An existing file
    /// is left untouched.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the directory cannot be determined or written
    pub async fn initialize() -> ConfigResult<(PathBuf, bool)> {
        let config_path = Self::default_config_path()?;
        let created = Self::initialize_at(&config_path).await?;
        Ok((config_path, created))
    }

    /// Write the default config file at `config_path` unless it exists
    ///
    /// Returns true if a new file was written.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Io` if the file or its directory cannot be written
    pub async fn initialize_at(config_path: &Path) -> ConfigResult<bool> {
        if config_path.exists() {
            debug!("Config file already exists: {}", config_path.display());
            return Ok(false);
        }

        if let Some(parent) = config_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| ConfigError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        tokio::fs::write(config_path, Self::generate_default_config_content())
            .await
            .map_err(|source| ConfigError::Io {
                path: config_path.to_path_buf(),
                source,
            })?;

        info!("Created default configuration file: {}", config_path.display());
        Ok(true)
    }

    /// Render the effective configuration as TOML
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Serialize` if rendering fails
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Render as TOML with the API key masked, for display
    pub fn to_redacted_toml(&self) -> ConfigResult<String> {
        let mut redacted = self.clone();
        redacted.providers.api_key = redacted.providers.api_key.as_deref().map(mask_secret);
        redacted.to_toml()
    }

    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending section
    pub fn validate(&self) -> ConfigResult<()> {
        let invalid = |field: &str, value: String, reason: String| ConfigError::InvalidValue {
            field: field.to_string(),
            value,
            reason,
        };

        self.client
            .validate()
            .map_err(|reason| invalid("client", format!("{:?}", self.client), reason))?;
        self.coordinator
            .validate()
            .map_err(|reason| invalid("coordinator", format!("{:?}", self.coordinator), reason))?;
        self.retry
            .validate()
            .map_err(|reason| invalid("retry", format!("{:?}", self.retry), reason))?;

        let level = self.logging.level.to_ascii_lowercase();
        if !["error", "warn", "info", "debug", "trace"].contains(&level.as_str()) {
            return Err(invalid(
                "logging.level",
                self.logging.level.clone(),
                "Expected one of error, warn, info, debug, trace".to_string(),
            ));
        }
        Ok(())
    }

    /// Find configuration file in standard locations
    async fn find_config_file() -> Option<PathBuf> {
        let mut search_paths = vec![PathBuf::from(".").join(files::LOCAL_CONFIG_FILE)];
        if let Ok(user_path) = Self::default_config_path() {
            search_paths.push(user_path);
        }

        for path in search_paths {
            if tokio::fs::try_exists(&path).await.unwrap_or(false) {
                debug!("Found config file: {}", path.display());
                return Some(path);
            }
        }
        None
    }

    /// Default config file path for the current user
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoConfigDir` on platforms without one
    pub fn default_config_path() -> ConfigResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join(files::CONFIG_DIR_NAME).join("config.toml"))
    }

    /// Load configuration from a TOML file
    async fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;

        let config: AppConfig = toml::from_str(&content)?;
        info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// Default configuration content with comments
    fn generate_default_config_content() -> String {
        format!(
            r#"# City Geocoder Configuration
# Every setting is optional; remove a line to fall back to its default.

[paths]
input = "{input}"
cache = "{cache}"
output = "{output}"

[client]
request_timeout = "{request_timeout}s"
connect_timeout = "10s"
pool_idle_timeout = "90s"
# Pause after every unkeyed provider call (public usage policy: 1 req/s)
unkeyed_min_interval = "{unkeyed_ms}ms"
# Optional client-side cap for the keyed provider
# keyed_rate_limit_rps = 10

[providers]
keyed_base_url = "{keyed_url}"
unkeyed_base_url = "{unkeyed_url}"
# The {env_var} environment variable takes precedence
# api_key = "your-api-key"

[coordinator]
# Concurrent lookups with the keyed provider (the unkeyed provider always uses 1)
keyed_concurrency = {keyed_concurrency}
progress_every = {progress_every}
# Persist the cache after this many new lookups (0 = only at the end)
checkpoint_every = {checkpoint_every}
progress_buffer_size = {progress_buffer}

[retry]
# Attempts per query, including the first
max_attempts = {max_attempts}
initial_delay = "{initial_delay_ms}ms"
max_delay = "{max_delay_ms}ms"
multiplier = {multiplier:.1}
jitter = {jitter:.1}

[logging]
level = "{level}"  # error, warn, info, debug, trace
"#,
            input = files::DEFAULT_INPUT,
            cache = files::DEFAULT_CACHE,
            output = files::DEFAULT_OUTPUT,
            request_timeout = crate::constants::HTTP_TIMEOUT.as_secs(),
            unkeyed_ms = limits::UNKEYED_MIN_INTERVAL.as_millis(),
            keyed_url = providers::KEYED_BASE_URL,
            unkeyed_url = providers::UNKEYED_BASE_URL,
            env_var = crate::constants::ENV_API_KEY,
            keyed_concurrency = workers::KEYED_CONCURRENCY,
            progress_every = progress::PROGRESS_EVERY,
            checkpoint_every = progress::CHECKPOINT_EVERY,
            progress_buffer = progress::PROGRESS_BUFFER_SIZE,
            max_attempts = limits::MAX_ATTEMPTS,
            initial_delay_ms = limits::RETRY_BASE_DELAY_MS,
            max_delay_ms = limits::RETRY_MAX_DELAY_MS,
            multiplier = limits::RETRY_MULTIPLIER,
            jitter = limits::BACKOFF_JITTER_FACTOR,
            level = logging::DEFAULT_LOG_LEVEL,
        )
    }
}

//! Command-line argument parsing for City Geocoder
//!
//! This module defines the CLI structure using clap derive macros: the
//! geocoding run itself plus cache inspection, configuration and credential
//! status commands.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// City Geocoder - add coordinates to a country/city catalog
#[derive(Parser, Debug)]
#[command(
    name = "city_geocoder",
    version,
    about = "Resolve a country/city catalog to coordinates with a resumable cache",
    long_about = "Resolves every city in a country-to-cities catalog to latitude/longitude.
Results are cached on disk so repeated runs only look up places that are still missing.
Uses the keyed provider when an API key is configured, otherwise the rate-limited public provider."
)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all subcommands
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Very verbose logging (trace level, with level names)
    #[arg(long, global = true)]
    pub very_verbose: bool,

    /// Quiet mode - only warnings and errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file path
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Geocode the input catalog
    Geocode(GeocodeArgs),

    /// Inspect the geocode cache
    Cache(CacheArgs),

    /// Manage the configuration file
    Config(ConfigArgs),

    /// Show which provider and credential would be used
    Auth(AuthArgs),
}

/// Arguments for the geocode command
#[derive(Args, Debug, Clone, Default)]
pub struct GeocodeArgs {
    /// Input catalog (country -> [city])
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Geocode cache file
    #[arg(short, long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    /// Output catalog file
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// API key for the keyed provider (overrides OPENCAGE_API_KEY)
    #[arg(long, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Concurrent lookups with the keyed provider
    #[arg(short = 'w', long)]
    pub workers: Option<usize>,

    /// Report cache hits and pending lookups without calling any provider
    #[arg(long)]
    pub dry_run: bool,

    /// Disable the progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for cache inspection
#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Geocode cache file
    #[arg(short, long, value_name = "FILE")]
    pub cache: Option<PathBuf>,

    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache inspection actions
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// Show cache statistics and location
    Info,

    /// Look up a single place
    Lookup {
        /// Country name
        country: String,

        /// City name
        city: String,
    },
}

/// Arguments for configuration management
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Write a default config file to the user config directory
    Init,

    /// Print the effective configuration
    Show,
}

/// Arguments for credential status
#[derive(Args, Debug)]
pub struct AuthArgs {
    #[command(subcommand)]
    pub action: AuthAction,
}

/// Credential actions
#[derive(Subcommand, Debug)]
pub enum AuthAction {
    /// Show credential source and selected provider
    Status {
        /// API key to evaluate instead of the environment
        #[arg(long, value_name = "KEY")]
        api_key: Option<String>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Logging level from the global flags, falling back to `default`
    pub fn log_level(&self, default: tracing::Level) -> tracing::Level {
        if self.global.quiet {
            tracing::Level::WARN
        } else if self.global.very_verbose {
            tracing::Level::TRACE
        } else if self.global.verbose {
            tracing::Level::DEBUG
        } else {
            default
        }
    }

    /// Whether `--quiet` lowers a more verbose configured level
    pub fn quiet_overrides(&self, configured: tracing::Level) -> bool {
        self.global.quiet && configured > tracing::Level::WARN
    }
}

impl GeocodeArgs {
    /// Validate argument combinations
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == Some(0) {
            return Err("Number of workers must be greater than 0".to_string());
        }
        Ok(())
    }
}

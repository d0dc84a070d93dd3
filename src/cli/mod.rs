//! Command-line interface components
//!
//! This module contains CLI-specific code for the City Geocoder application,
//! including argument parsing, command handlers and progress display.

pub mod args;
pub mod commands;
pub mod progress;

pub use args::{
    AuthAction, AuthArgs, CacheAction, CacheArgs, Cli, Commands, ConfigAction, ConfigArgs,
    GeocodeArgs, GlobalArgs,
};
pub use commands::{handle_auth, handle_cache, handle_config, handle_geocode};
pub use progress::ProgressDisplay;

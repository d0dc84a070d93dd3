//! City Geocoder Library
//!
//! Enriches a catalog of country and city names with coordinates. Lookups go
//! through a keyed or a rate-limited unkeyed provider with bounded
//! concurrency, and every resolution is cached on disk so interrupted or
//! repeated runs never redo completed work.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod errors;
pub mod prelude;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

//! Configuration for the geocoding coordinator

use serde::{Deserialize, Serialize};

use crate::app::models::ProviderKind;
use crate::constants::{progress, workers};

/// Scheduling, progress and checkpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// Concurrent lookups when the keyed provider is in use
    pub keyed_concurrency: usize,
    /// Emit a progress signal every this many completed items
    pub progress_every: usize,
    /// Persist the cache after this many new resolutions (0 disables)
    pub checkpoint_every: usize,
    /// Capacity of the progress event channel
    pub progress_buffer_size: usize,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            keyed_concurrency: workers::KEYED_CONCURRENCY,
            progress_every: progress::PROGRESS_EVERY,
            checkpoint_every: progress::CHECKPOINT_EVERY,
            progress_buffer_size: progress::PROGRESS_BUFFER_SIZE,
        }
    }
}

impl CoordinatorConfig {
    /// Set the keyed provider concurrency
    pub fn with_keyed_concurrency(mut self, count: usize) -> Self {
        self.keyed_concurrency = count;
        self
    }

    /// Set the progress cadence
    pub fn with_progress_every(mut self, every: usize) -> Self {
        self.progress_every = every;
        self
    }

    /// Set the checkpoint cadence
    pub fn with_checkpoint_every(mut self, every: usize) -> Self {
        self.checkpoint_every = every;
        self
    }

    /// Concurrency limit for a provider
    ///
    /// The unkeyed provider is always limited to a single outstanding call.
    pub fn concurrency_for(&self, kind: ProviderKind) -> usize {
        match kind {
            ProviderKind::Keyed => self.keyed_concurrency.max(1),
            ProviderKind::Unkeyed => workers::UNKEYED_CONCURRENCY,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.keyed_concurrency == 0 {
            return Err("Keyed concurrency must be at least 1".to_string());
        }
        if self.keyed_concurrency > workers::MAX_KEYED_CONCURRENCY {
            return Err(format!(
                "Keyed concurrency cannot exceed {}",
                workers::MAX_KEYED_CONCURRENCY
            ));
        }
        if self.progress_every == 0 {
            return Err("Progress cadence must be at least 1".to_string());
        }
        if self.progress_buffer_size == 0 {
            return Err("Progress buffer size must be at least 1".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = CoordinatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.keyed_concurrency, 6);
        assert_eq!(config.progress_every, 10);
    }

    #[test]
    fn test_unkeyed_concurrency_is_pinned() {
        let config = CoordinatorConfig::default().with_keyed_concurrency(12);
        assert_eq!(config.concurrency_for(ProviderKind::Keyed), 12);
        assert_eq!(config.concurrency_for(ProviderKind::Unkeyed), 1);
    }

    #[test]
    fn test_validation_rejects_zero_values() {
        assert!(CoordinatorConfig::default()
            .with_keyed_concurrency(0)
            .validate()
            .is_err());
        assert!(CoordinatorConfig::default()
            .with_progress_every(0)
            .validate()
            .is_err());
        assert!(CoordinatorConfig::default()
            .with_keyed_concurrency(workers::MAX_KEYED_CONCURRENCY + 1)
            .validate()
            .is_err());
        // Disabling checkpoints is allowed
        assert!(CoordinatorConfig::default()
            .with_checkpoint_every(0)
            .validate()
            .is_ok());
    }
}

//! Store configuration

use std::time::Duration;

use crate::error::{Error, Result};

/// Default interval between reclaimer sweeps
pub const DEFAULT_RECLAIM_INTERVAL: Duration = Duration::from_secs(10);

/// Configuration for a [`Store`](crate::Store) and its reclaimer
///
/// ```rust
/// use ttlkv::StoreConfig;
/// use std::time::Duration;
///
/// let config = StoreConfig::default()
///     .with_reclaim_interval(Duration::from_secs(30));
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Interval between background sweeps of expired entries (default: 10 seconds)
    pub reclaim_interval: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reclaim_interval: DEFAULT_RECLAIM_INTERVAL,
        }
    }
}

impl StoreConfig {
    /// Creates a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the reclaim interval
    pub fn with_reclaim_interval(mut self, interval: Duration) -> Self {
        self.reclaim_interval = interval;
        self
    }

    /// Reject settings the reclaimer cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.reclaim_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "reclaim interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

//! # Relayer Configuration
//!
//! Loaded by the embedding process and handed to the relayer immutable.

use crate::domain::{
    RelayerError, DEFAULT_CONFIRMATION_DEPTH, DEFAULT_MAX_HEADERS_PER_SUBMISSION,
    MIN_BTC_CACHE_SIZE,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relayer configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RelayerConfig {
    /// Cache capacity while catching up a backlog.
    pub btc_cache_size: usize,

    /// Reorg-safety window (k); steady-state cache size.
    pub confirmation_depth: u64,

    /// Maximum headers per light client submission.
    pub max_headers_per_submission: usize,

    /// First retry sleep in milliseconds.
    pub retry_initial_sleep_ms: u64,

    /// Retry gives up once the next sleep would exceed this, in milliseconds.
    pub retry_max_sleep_ms: u64,

    /// Bootstrap attempts before the relayer gives up.
    pub bootstrap_max_attempts: u32,

    /// Delay between bootstrap attempts in milliseconds.
    pub bootstrap_attempt_fixed_delay_ms: u64,

    /// Node sync poll interval in milliseconds.
    pub node_sync_poll_interval_ms: u64,
}

impl Default for RelayerConfig {
    fn default() -> Self {
        Self {
            btc_cache_size: MIN_BTC_CACHE_SIZE,
            confirmation_depth: DEFAULT_CONFIRMATION_DEPTH,
            max_headers_per_submission: DEFAULT_MAX_HEADERS_PER_SUBMISSION,
            retry_initial_sleep_ms: 1_000,
            retry_max_sleep_ms: 300_000,
            bootstrap_max_attempts: 60,
            bootstrap_attempt_fixed_delay_ms: 5_000,
            node_sync_poll_interval_ms: 10_000,
        }
    }
}

impl RelayerConfig {
    /// Create a config for testing (short sleeps, small windows).
    pub fn for_testing() -> Self {
        Self {
            btc_cache_size: MIN_BTC_CACHE_SIZE,
            confirmation_depth: 3,
            max_headers_per_submission: 2,
            retry_initial_sleep_ms: 10,
            retry_max_sleep_ms: 40,
            bootstrap_max_attempts: 3,
            bootstrap_attempt_fixed_delay_ms: 10,
            node_sync_poll_interval_ms: 10,
        }
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> Result<(), RelayerError> {
        if self.btc_cache_size < MIN_BTC_CACHE_SIZE {
            return Err(RelayerError::InvalidConfig(format!(
                "btc_cache_size {} is below the minimum {}",
                self.btc_cache_size, MIN_BTC_CACHE_SIZE
            )));
        }
        if self.confirmation_depth == 0 {
            return Err(RelayerError::InvalidConfig(
                "confirmation_depth must be at least 1".to_string(),
            ));
        }
        if self.confirmation_depth > self.btc_cache_size as u64 {
            return Err(RelayerError::InvalidConfig(format!(
                "confirmation_depth {} exceeds btc_cache_size {}",
                self.confirmation_depth, self.btc_cache_size
            )));
        }
        if self.max_headers_per_submission == 0 {
            return Err(RelayerError::InvalidConfig(
                "max_headers_per_submission must be at least 1".to_string(),
            ));
        }
        if self.retry_initial_sleep_ms == 0 || self.retry_initial_sleep_ms > self.retry_max_sleep_ms {
            return Err(RelayerError::InvalidConfig(format!(
                "retry sleeps must satisfy 0 < initial ({}) <= max ({})",
                self.retry_initial_sleep_ms, self.retry_max_sleep_ms
            )));
        }
        if self.bootstrap_max_attempts == 0 {
            return Err(RelayerError::InvalidConfig(
                "bootstrap_max_attempts must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Steady-state cache size.
    pub fn steady_cache_size(&self) -> usize {
        self.confirmation_depth as usize
    }

    /// First retry sleep.
    pub fn retry_initial_sleep(&self) -> Duration {
        Duration::from_millis(self.retry_initial_sleep_ms)
    }

    /// Retry sleep ceiling.
    pub fn retry_max_sleep(&self) -> Duration {
        Duration::from_millis(self.retry_max_sleep_ms)
    }

    /// Delay between bootstrap attempts.
    pub fn bootstrap_attempt_fixed_delay(&self) -> Duration {
        Duration::from_millis(self.bootstrap_attempt_fixed_delay_ms)
    }

    /// Node sync poll interval.
    pub fn node_sync_poll_interval(&self) -> Duration {
        Duration::from_millis(self.node_sync_poll_interval_ms)
    }
}

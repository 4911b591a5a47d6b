//! # Retry Executor
//!
//! Single chokepoint for every network call of the relayer. Failures are
//! classified by error identity:
//!
//! | Class | Examples | Handling |
//! |-------|----------|----------|
//! | Unrecoverable | header invalid, parent not found | returned after one call |
//! | Expected | header already submitted | treated as success |
//! | Transient | anything else | exponential backoff, then `Timeout` |

use crate::config::RelayerConfig;
use crate::domain::{ErrorClass, ErrorKind, RelayerError};
use crate::shutdown::ShutdownListener;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Errors that are never retried.
pub const UNRECOVERABLE_ERRORS: &[ErrorKind] = &[
    ErrorKind::HeaderInvalid,
    ErrorKind::ParentNotFound,
    ErrorKind::MalformedHeader,
];

/// Errors meaning the desired end state already holds.
pub const EXPECTED_ERRORS: &[ErrorKind] = &[ErrorKind::HeaderAlreadySubmitted];

/// Static classification of errors into [`ErrorClass`]es.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    unrecoverable: &'static [ErrorKind],
    expected: &'static [ErrorKind],
}

impl RetryPolicy {
    /// Policy from explicit error sets.
    pub const fn new(unrecoverable: &'static [ErrorKind], expected: &'static [ErrorKind]) -> Self {
        Self {
            unrecoverable,
            expected,
        }
    }

    /// Class of `err` under this policy.
    pub fn classify(&self, err: &RelayerError) -> ErrorClass {
        let kind = err.kind();
        if self.unrecoverable.contains(&kind) {
            ErrorClass::Unrecoverable
        } else if self.expected.contains(&kind) {
            ErrorClass::Expected
        } else {
            ErrorClass::Transient
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(UNRECOVERABLE_ERRORS, EXPECTED_ERRORS)
    }
}

/// Retry-with-backoff wrapper around async operations.
#[derive(Clone, Debug)]
pub struct RetryExecutor {
    initial_sleep: Duration,
    max_sleep: Duration,
    policy: RetryPolicy,
    shutdown: ShutdownListener,
}

impl RetryExecutor {
    /// Executor with the default policy.
    pub fn new(initial_sleep: Duration, max_sleep: Duration, shutdown: ShutdownListener) -> Self {
        Self {
            initial_sleep,
            max_sleep,
            policy: RetryPolicy::default(),
            shutdown,
        }
    }

    /// Executor using the configured retry sleeps.
    pub fn from_config(config: &RelayerConfig, shutdown: ShutdownListener) -> Self {
        Self::new(config.retry_initial_sleep(), config.retry_max_sleep(), shutdown)
    }

    /// Replace the classification policy.
    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Shutdown listener observed by the sleeps.
    pub fn shutdown(&self) -> &ShutdownListener {
        &self.shutdown
    }

    /// Run `op` until it succeeds, fails unrecoverably or exhausts the backoff.
    ///
    /// Returns `Some(value)` on success and `None` when the failure was an
    /// expected one. Each retry sleeps the current backoff plus a jitter in
    /// `[0, backoff / 2]`, then doubles the backoff; once the backoff exceeds
    /// the maximum sleep the last error is returned wrapped in `Timeout`.
    ///
    /// # Errors
    /// - the op's error if it is unrecoverable
    /// - `Timeout` when the backoff ceiling is reached
    /// - `Shutdown` if shutdown is signalled while waiting
    pub async fn retry_do<T, F, Fut>(&self, mut op: F) -> Result<Option<T>, RelayerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RelayerError>>,
    {
        let mut sleep = self.initial_sleep;
        let mut attempts: u32 = 0;

        loop {
            if self.shutdown.is_shutdown() {
                return Err(RelayerError::Shutdown);
            }

            attempts += 1;
            let err = match op().await {
                Ok(value) => return Ok(Some(value)),
                Err(RelayerError::Shutdown) => return Err(RelayerError::Shutdown),
                Err(err) => err,
            };

            match self.policy.classify(&err) {
                ErrorClass::Unrecoverable => {
                    debug!(error = %err, "[relayer] Unrecoverable failure, not retrying");
                    return Err(err);
                }
                ErrorClass::Expected => {
                    debug!(error = %err, "[relayer] Expected failure, treating as success");
                    return Ok(None);
                }
                ErrorClass::Transient => {}
            }

            if sleep > self.max_sleep {
                warn!(attempts, error = %err, "[relayer] Retry budget exhausted");
                return Err(RelayerError::Timeout {
                    attempts,
                    source: Box::new(err),
                });
            }

            let delay = sleep + jitter(sleep);
            warn!(
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "[relayer] Transient failure, retrying"
            );
            self.shutdown.sleep(delay).await?;
            sleep = sleep.saturating_mul(2);
        }
    }

    /// [`RetryExecutor::retry_do`] for operations that must produce a value.
    ///
    /// An expected failure carries no value here, so it surfaces as `Network`.
    pub async fn retry_value<T, F, Fut>(&self, what: &str, op: F) -> Result<T, RelayerError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, RelayerError>>,
    {
        self.retry_do(op).await?.ok_or_else(|| {
            RelayerError::Network(format!("{} returned no value", what))
        })
    }
}

/// Uniform jitter in `[0, base / 2]`.
fn jitter(base: Duration) -> Duration {
    let half = base.as_millis() as u64 / 2;
    if half == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=half))
}

//! Cooperative retry: wait as long as the server says, then try again.
//!
//! Unlike exponential backoff there is no schedule. Each failed attempt
//! either asks for a wait (optionally carrying the server's estimate) or
//! aborts. One suspension per retry.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Default upper bound on a single wait.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(120);

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt
    pub max_retries: u32,
    /// Wait used when the server gives no estimate
    pub fallback_wait: Duration,
    /// Upper bound on any single wait, whatever the server estimates
    pub max_wait: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, fallback_wait: Duration) -> Self {
        Self {
            max_retries,
            fallback_wait,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }

    /// Set the upper bound on a single wait
    pub fn with_max_wait(mut self, max_wait: Duration) -> Self {
        self.max_wait = max_wait;
        self
    }

    /// Resolve how long to wait for a given server estimate.
    fn wait_for(&self, estimate: Option<Duration>) -> Duration {
        estimate.unwrap_or(self.fallback_wait).min(self.max_wait)
    }
}

/// Outcome of a failed attempt.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Transient: wait (for the estimate, if any) and retry.
    Wait { estimate: Option<Duration>, error: E },
    /// Permanent: give up now.
    Abort(E),
}

/// Why a retried operation finally failed.
#[derive(Debug, PartialEq, Eq)]
pub enum RetryError<E> {
    /// Every attempt asked to wait; the budget ran out.
    Exhausted { attempts: u32, last: E },
    /// An attempt aborted.
    Aborted(E),
}

/// Execute an async operation, honoring server-provided waits between attempts
///
/// # Arguments
/// * `policy` - Retry budget and wait bounds
/// * `operation_name` - Name of the operation for logging
/// * `operation` - Async closure returning `Result<T, Attempt<E>>`
///
/// # Returns
/// The result of the operation, or why it failed: an abort from any attempt,
/// or exhaustion after `max_retries + 1` attempts.
pub async fn with_server_wait<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, Attempt<E>>>,
    E: Display,
{
    let max_attempts = policy.max_retries + 1;
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        "{}: Succeeded on attempt {}/{}",
                        operation_name, attempt, max_attempts
                    );
                }
                return Ok(result);
            }
            Err(Attempt::Abort(e)) => {
                debug!(
                    "{}: Error is not retryable, failing immediately: {}",
                    operation_name, e
                );
                return Err(RetryError::Aborted(e));
            }
            Err(Attempt::Wait { estimate, error }) => {
                if attempt >= max_attempts {
                    warn!(
                        "{}: All {} attempts failed. Last error: {}",
                        operation_name, max_attempts, error
                    );
                    return Err(RetryError::Exhausted {
                        attempts: attempt,
                        last: error,
                    });
                }

                let wait = policy.wait_for(estimate);
                warn!(
                    "{}: Attempt {}/{} failed ({}), waiting {:?} before retrying",
                    operation_name, attempt, max_attempts, error, wait
                );
                sleep(wait).await;
                attempt += 1;
            }
        }
    }
}

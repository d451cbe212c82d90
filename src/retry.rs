// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Retry Logic
 * Fixed-interval retries for transient source failures
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::{FinderError, FinderResult};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Retry configuration: `times` extra attempts, `interval` apart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RetryPolicy {
    pub times: u32,
    pub interval: Duration,
}

impl RetryPolicy {
    /// Build a policy, rejecting retries without a positive interval
    pub fn new(times: u32, interval: Duration) -> FinderResult<Self> {
        if times > 0 && interval.is_zero() {
            return Err(FinderError::Config(
                "retries interval should > 0 when retries > 0".to_string(),
            ));
        }
        Ok(Self { times, interval })
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self::default()
    }

    /// Total number of attempts this policy allows
    pub fn max_attempts(&self) -> u32 {
        self.times.saturating_add(1)
    }
}

/// Run `operation` until it succeeds, fails with a non-retryable error, or
/// attempts are exhausted. Returns the last error on exhaustion.
pub async fn retry_with_policy<F, Fut, T>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> FinderResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = FinderResult<T>>,
{
    let max_attempts = policy.max_attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!(
                        attempt = attempt,
                        operation = operation_name,
                        "Operation succeeded after retry"
                    );
                }
                return Ok(result);
            }
            Err(err) => {
                if !err.is_retryable() {
                    debug!(
                        operation = operation_name,
                        error = %err,
                        "Error is not retryable, aborting"
                    );
                    return Err(err);
                }

                if attempt >= max_attempts {
                    if max_attempts > 1 {
                        warn!(
                            operation = operation_name,
                            attempts = attempt,
                            error = %err,
                            "Max retry attempts reached"
                        );
                    }
                    return Err(err);
                }

                debug!(
                    attempt = attempt,
                    max_attempts = max_attempts,
                    operation = operation_name,
                    error = %err,
                    backoff_ms = policy.interval.as_millis() as u64,
                    "Operation failed, retrying"
                );
                tokio::time::sleep(policy.interval).await;
            }
        }
    }
}

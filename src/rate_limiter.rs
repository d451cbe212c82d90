// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Source Rate Limiter
 * Token bucket limiter (burst 1) with cancellable waits
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::{FinderError, FinderResult};
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter as GovernorRateLimiter,
};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default queries per second for a source
pub const DEFAULT_QPS: f64 = 1.0;

/// Per-source limiter allowing `qps` queries per second with a burst of one
#[derive(Clone)]
pub struct QpsLimiter {
    qps: f64,
    limiter: Arc<GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl std::fmt::Debug for QpsLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QpsLimiter").field("qps", &self.qps).finish()
    }
}

impl QpsLimiter {
    /// Create a limiter, rejecting non-positive or non-finite rates
    pub fn new(qps: f64) -> FinderResult<Self> {
        if qps <= 0.0 || !qps.is_finite() {
            return Err(FinderError::Config("qps should be positive".to_string()));
        }

        let period = Duration::try_from_secs_f64(1.0 / qps)
            .map_err(|_| FinderError::Config(format!("qps {} is too small", qps)))?;
        let quota = Quota::with_period(period)
            .ok_or_else(|| FinderError::Config(format!("qps {} is too large", qps)))?;

        Ok(Self {
            qps,
            limiter: Arc::new(GovernorRateLimiter::direct(quota)),
        })
    }

    pub fn qps(&self) -> f64 {
        self.qps
    }

    /// Wait until a token is available, or fail as soon as `ctx` is cancelled
    pub async fn wait(&self, ctx: &CancellationToken) -> FinderResult<()> {
        if ctx.is_cancelled() {
            return Err(FinderError::RateLimitWait);
        }

        tokio::select! {
            biased;
            _ = ctx.cancelled() => {
                debug!(qps = self.qps, "Rate limiter wait cancelled");
                Err(FinderError::RateLimitWait)
            }
            _ = self.limiter.until_ready() => Ok(()),
        }
    }
}

impl Default for QpsLimiter {
    fn default() -> Self {
        let quota = Quota::with_period(Duration::from_secs(1))
            .unwrap_or_else(|| Quota::per_second(nonzero_ext::nonzero!(1u32)));
        Self {
            qps: DEFAULT_QPS,
            limiter: Arc::new(GovernorRateLimiter::direct(quota)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_rejects_non_positive_qps() {
        assert!(matches!(QpsLimiter::new(0.0), Err(FinderError::Config(_))));
        assert!(matches!(QpsLimiter::new(-2.0), Err(FinderError::Config(_))));
        assert!(matches!(QpsLimiter::new(f64::NAN), Err(FinderError::Config(_))));
        // period would overflow a Duration
        assert!(matches!(QpsLimiter::new(1e-20), Err(FinderError::Config(_))));
        assert!(QpsLimiter::new(0.5).is_ok());
    }

    #[tokio::test]
    async fn test_first_token_is_immediate() {
        let limiter = QpsLimiter::new(1.0).unwrap();
        let ctx = CancellationToken::new();

        let start = Instant::now();
        assert!(limiter.wait(&ctx).await.is_ok());
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_second_token_waits_for_period() {
        let limiter = QpsLimiter::new(5.0).unwrap();
        let ctx = CancellationToken::new();

        limiter.wait(&ctx).await.unwrap();
        let start = Instant::now();
        limiter.wait(&ctx).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(150));
    }

    #[tokio::test]
    async fn test_cancelled_wait_fails_immediately() {
        let limiter = QpsLimiter::new(0.01).unwrap();
        let ctx = CancellationToken::new();

        // drain the single burst token
        limiter.wait(&ctx).await.unwrap();

        let waiter = {
            let limiter = limiter.clone();
            let ctx = ctx.clone();
            tokio::spawn(async move { limiter.wait(&ctx).await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        ctx.cancel();

        let result = waiter.await.unwrap();
        assert_eq!(result, Err(FinderError::RateLimitWait));
    }
}

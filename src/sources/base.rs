// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Generic Source Client
 * Rate-limited, retrying http client that specific providers compose
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::{dedup_lowercase, FinderOption, ResponseParser, Stat, TargetBuilder};
use crate::errors::{FinderError, FinderResult};
use crate::http_client::{HttpClient, DEFAULT_TIMEOUT};
use crate::rate_limiter::QpsLimiter;
use crate::retry::{retry_with_policy, RetryPolicy};

/// Default worker count for a source
pub const DEFAULT_WORKERS: usize = 1;

/// Default-behaviour adapter for [`SubdomainFinder`](super::SubdomainFinder)
pub struct BaseFinder {
    limiter: QpsLimiter,
    client: Option<HttpClient>,
    timeout: Duration,
    headers: Vec<(String, String)>,
    target_builder: Option<TargetBuilder>,
    parser: Option<ResponseParser>,
    not_after: Option<DateTime<Utc>>,
    retry: RetryPolicy,
    workers: usize,
    stat: Stat,
}

impl Default for BaseFinder {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for BaseFinder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaseFinder")
            .field("qps", &self.limiter.qps())
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("workers", &self.workers)
            .finish()
    }
}

impl BaseFinder {
    pub fn new() -> Self {
        Self {
            limiter: QpsLimiter::default(),
            client: None,
            timeout: DEFAULT_TIMEOUT,
            headers: Vec::new(),
            target_builder: None,
            parser: None,
            not_after: None,
            retry: RetryPolicy::none(),
            workers: DEFAULT_WORKERS,
            stat: Stat::new(),
        }
    }

    pub fn with_target_builder<F>(mut self, builder: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        self.target_builder = Some(Arc::new(builder));
        self
    }

    pub fn with_parser<F>(mut self, parser: F) -> Self
    where
        F: Fn(&[u8]) -> anyhow::Result<Vec<String>> + Send + Sync + 'static,
    {
        self.parser = Some(Arc::new(parser));
        self
    }

    /// Replace the parser after options are known
    pub fn set_parser(&mut self, parser: ResponseParser) {
        self.parser = Some(parser);
    }

    /// Apply options in order, then rebuild the http client
    pub fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()> {
        for option in options {
            self.apply(option)?;
        }
        self.client = Some(HttpClient::new(self.timeout, &self.headers)?);
        Ok(())
    }

    fn apply(&mut self, option: FinderOption) -> FinderResult<()> {
        match option {
            FinderOption::Timeout(timeout) => {
                if timeout.is_zero() {
                    return Err(FinderError::Config("timeout should > 0s".to_string()));
                }
                self.timeout = timeout;
            }
            FinderOption::Qps(qps) => {
                self.limiter = QpsLimiter::new(qps)?;
            }
            FinderOption::Header(key, value) => {
                self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&key));
                self.headers.push((key, value));
            }
            FinderOption::NotAfter(cutoff) => {
                self.not_after = Some(cutoff);
            }
            FinderOption::Retries { times, interval } => {
                self.retry = RetryPolicy::new(times, interval)?;
            }
            FinderOption::Workers(workers) => {
                if workers == 0 {
                    return Err(FinderError::Config("worker should > 0".to_string()));
                }
                self.workers = workers;
            }
            FinderOption::TargetBuilder(builder) => {
                self.target_builder = Some(builder);
            }
            FinderOption::Parser(parser) => {
                self.parser = Some(parser);
            }
        }
        Ok(())
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn not_after(&self) -> Option<DateTime<Utc>> {
        self.not_after
    }

    pub fn stat(&self) -> &Stat {
        &self.stat
    }

    /// Shared limiter, for providers that replace the http transport
    pub fn limiter(&self) -> &QpsLimiter {
        &self.limiter
    }

    /// Query `target` and record the outcome in this source's stat
    pub async fn get(&self, ctx: &CancellationToken, target: &str) -> FinderResult<Vec<String>> {
        let outcome = self.fetch_names(ctx, target).await;
        self.stat.record(&outcome);
        outcome
    }

    async fn fetch_names(&self, ctx: &CancellationToken, target: &str) -> FinderResult<Vec<String>> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| FinderError::Config("finder used before init".to_string()))?;
        let builder = self
            .target_builder
            .as_ref()
            .ok_or_else(|| FinderError::Config("empty url builder function".to_string()))?;
        let parser = self
            .parser
            .as_ref()
            .ok_or_else(|| FinderError::Config("empty parse function".to_string()))?;

        let url = builder(target);
        let url = url.as_str();
        let limiter = &self.limiter;

        let names = retry_with_policy(&self.retry, url, move || async move {
            limiter.wait(ctx).await?;
            let body = client.fetch(ctx, url).await?;
            parser(body.as_slice()).map_err(|e| FinderError::Parse {
                target: url.to_string(),
                reason: format!("{:#}", e),
            })
        })
        .await?;

        debug!(url = url, found = names.len(), "Source responded");
        Ok(dedup_lowercase(names))
    }
}

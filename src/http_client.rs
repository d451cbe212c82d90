// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::errors::{FinderError, FinderResult};

/// Default request timeout for a source
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Browser User-Agent sent by sources that scrape html pages
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_10_5) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/55.0.2883.95 Safari/537.36";

/// Maximum response body size (10MB) to prevent memory exhaustion
const MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Thin GET-only client used by the generic http source
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Arc<Client>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(timeout: Duration, headers: &[(String, String)]) -> FinderResult<Self> {
        if timeout.is_zero() {
            return Err(FinderError::Config("timeout should > 0s".to_string()));
        }

        let mut default_headers = HeaderMap::new();
        for (key, value) in headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| FinderError::Config(format!("invalid header name {}: {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| FinderError::Config(format!("invalid header value for {}: {}", key, e)))?;
            default_headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .default_headers(default_headers)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FinderError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client: Arc::new(client),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET `url` and return the body; anything but 200 is an error
    pub async fn fetch(&self, ctx: &CancellationToken, url: &str) -> FinderResult<Vec<u8>> {
        tokio::select! {
            biased;
            _ = ctx.cancelled() => Err(FinderError::Cancelled),
            result = self.fetch_inner(url) => result,
        }
    }

    async fn fetch_inner(&self, url: &str) -> FinderResult<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FinderError::from_reqwest(e, url, self.timeout))?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!(url = url, status = status.as_u16(), "Unexpected response status");
            return Err(FinderError::Status {
                target: url.to_string(),
                status_code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FinderError::from_reqwest(e, url, self.timeout))?;

        if body.len() > MAX_BODY_SIZE {
            return Err(FinderError::Transport {
                target: url.to_string(),
                reason: format!("response body too large ({} bytes)", body.len()),
            });
        }

        Ok(body.to_vec())
    }
}

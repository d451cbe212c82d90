// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Finder Error Types
 * Error taxonomy shared by every source, pool and the executor
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::time::Duration;
use thiserror::Error;

/// Errors raised while configuring sources or querying them
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FinderError {
    /// Invalid per-source settings, raised at init
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure other than a deadline
    #[error("Transport error for {target}: {reason}")]
    Transport { target: String, reason: String },

    /// Upstream answered with something other than 200
    #[error("get rsp code: {status_code} from {target}")]
    Status { target: String, status_code: u16 },

    /// Request deadline exceeded
    #[error("Request to {target} timed out after {timeout:?}")]
    Timeout { target: String, timeout: Duration },

    /// Malformed upstream response
    #[error("Failed to parse response from {target}: {reason}")]
    Parse { target: String, reason: String },

    /// Context cancelled while waiting for a rate-limit token
    #[error("Cancelled while waiting for rate limiter")]
    RateLimitWait,

    /// Context cancelled while a request was in flight
    #[error("Query cancelled")]
    Cancelled,

    #[error("Unknown subdomain finder: {0}")]
    UnknownSource(String),

    #[error("{0} has been registered")]
    DuplicateSource(String),

    #[error("no sources init success")]
    NoSourcesInitialized,

    #[error("Invalid executor state: {0}")]
    InvalidState(String),
}

impl FinderError {
    /// Whether this error counts as a timeout in source statistics
    pub fn is_timeout(&self) -> bool {
        matches!(self, FinderError::Timeout { .. })
    }

    /// Check if a failed attempt may be retried
    pub fn is_retryable(&self) -> bool {
        match self {
            FinderError::Transport { .. } => true,
            FinderError::Status { .. } => true,
            FinderError::Timeout { .. } => true,
            FinderError::Parse { .. } => false,
            FinderError::RateLimitWait => false,
            FinderError::Cancelled => false,
            _ => false,
        }
    }

    /// Classify a reqwest failure against the request target
    pub fn from_reqwest(err: reqwest::Error, target: &str, timeout: Duration) -> Self {
        if err.is_timeout() {
            FinderError::Timeout {
                target: target.to_string(),
                timeout,
            }
        } else if let Some(status) = err.status() {
            FinderError::Status {
                target: target.to_string(),
                status_code: status.as_u16(),
            }
        } else {
            FinderError::Transport {
                target: target.to_string(),
                reason: err.to_string(),
            }
        }
    }
}

impl FinderError {
    /// Classify a gRPC status against the service endpoint
    pub fn from_grpc(status: tonic::Status, target: &str, timeout: Duration) -> Self {
        match status.code() {
            tonic::Code::DeadlineExceeded => FinderError::Timeout {
                target: target.to_string(),
                timeout,
            },
            tonic::Code::Cancelled => FinderError::Cancelled,
            _ => FinderError::Transport {
                target: target.to_string(),
                reason: format!("{:?}: {}", status.code(), status.message()),
            },
        }
    }
}

/// Result type for finder operations
pub type FinderResult<T> = Result<T, FinderError>;

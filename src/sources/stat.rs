// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::errors::FinderResult;

/// Per-source counters, shared by that source's workers
#[derive(Debug, Default)]
pub struct Stat {
    domains: AtomicU64,
    success: AtomicU64,
    found: AtomicU64,
    not_found: AtomicU64,
    timeout: AtomicU64,
    error: AtomicU64,
    related: AtomicU64,
}

/// Point-in-time copy of a [`Stat`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatSnapshot {
    #[serde(rename = "domain")]
    pub domains_cnt: u64,
    #[serde(rename = "success", default, skip_serializing_if = "is_zero")]
    pub success_cnt: u64,
    #[serde(rename = "found", default, skip_serializing_if = "is_zero")]
    pub found_cnt: u64,
    #[serde(rename = "notfound", default, skip_serializing_if = "is_zero")]
    pub not_found_cnt: u64,
    #[serde(rename = "timeout", default, skip_serializing_if = "is_zero")]
    pub timeout_cnt: u64,
    #[serde(rename = "error", default, skip_serializing_if = "is_zero")]
    pub err_cnt: u64,
    /// Total names returned by successful calls
    #[serde(rename = "related")]
    pub related_domain_cnt: u64,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

impl Stat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Account for exactly one finished call
    pub fn record(&self, outcome: &FinderResult<Vec<String>>) {
        self.domains.fetch_add(1, Ordering::Relaxed);
        match outcome {
            Err(err) if err.is_timeout() => {
                self.timeout.fetch_add(1, Ordering::Relaxed);
            }
            Err(_) => {
                self.error.fetch_add(1, Ordering::Relaxed);
            }
            Ok(names) => {
                self.success.fetch_add(1, Ordering::Relaxed);
                if names.is_empty() {
                    self.not_found.fetch_add(1, Ordering::Relaxed);
                } else {
                    self.found.fetch_add(1, Ordering::Relaxed);
                }
                self.related.fetch_add(names.len() as u64, Ordering::Relaxed);
            }
        }
    }

    pub fn snapshot(&self) -> StatSnapshot {
        StatSnapshot {
            domains_cnt: self.domains.load(Ordering::Relaxed),
            success_cnt: self.success.load(Ordering::Relaxed),
            found_cnt: self.found.load(Ordering::Relaxed),
            not_found_cnt: self.not_found.load(Ordering::Relaxed),
            timeout_cnt: self.timeout.load(Ordering::Relaxed),
            err_cnt: self.error.load(Ordering::Relaxed),
            related_domain_cnt: self.related.load(Ordering::Relaxed),
        }
    }
}

impl StatSnapshot {
    /// `domains == success + timeout + error` and `success == found + notfound`
    pub fn is_consistent(&self) -> bool {
        self.domains_cnt == self.success_cnt + self.timeout_cnt + self.err_cnt
            && self.success_cnt == self.found_cnt + self.not_found_cnt
    }
}

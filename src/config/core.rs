// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use validator::Validate;

use crate::http_client::{DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};
use crate::rate_limiter::DEFAULT_QPS;
use crate::registry::FinderRegistry;
use crate::sources::{FinderOption, SubdomainFinder, DEFAULT_WORKERS};

/// Which sources run, and how each one is tuned
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourcesConfig {
    #[serde(default)]
    pub enabled: Vec<String>,

    #[serde(default)]
    pub sources: BTreeMap<String, FinderConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq)]
pub struct FinderConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_timeout", with = "duration_str")]
    pub timeout: Duration,

    #[validate(range(exclusive_min = 0.0))]
    #[serde(default = "default_qps")]
    pub qps: f64,

    #[serde(default)]
    pub retries: RetriesConfig,

    #[validate(range(min = 1))]
    #[serde(default = "default_worker")]
    pub worker: usize,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct RetriesConfig {
    #[serde(default)]
    pub times: u32,

    #[serde(default, with = "duration_str")]
    pub interval: Duration,
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout: default_timeout(),
            qps: default_qps(),
            retries: RetriesConfig::default(),
            worker: default_worker(),
        }
    }
}

impl SourcesConfig {
    /// Default tuning for `enabled`, or for every registered source when empty
    pub fn with_defaults(enabled: &[String], worker: usize, registry: &FinderRegistry) -> Self {
        let enabled = if enabled.is_empty() {
            registry.names()
        } else {
            enabled.to_vec()
        };

        let sources = enabled
            .iter()
            .map(|name| {
                let config = FinderConfig {
                    worker,
                    ..FinderConfig::default()
                };
                (name.clone(), config)
            })
            .collect();

        Self { enabled, sources }
    }

    pub fn get(&self, name: &str) -> Option<&FinderConfig> {
        self.sources.get(name)
    }

    /// Options for `name`; empty when no block exists for it
    pub fn options(&self, name: &str) -> Vec<FinderOption> {
        let Some(config) = self.get(name) else {
            return Vec::new();
        };

        let mut options = vec![
            FinderOption::Timeout(config.timeout),
            FinderOption::Qps(config.qps),
            FinderOption::Workers(config.worker),
        ];
        if config.retries.times > 0 {
            options.push(FinderOption::Retries {
                times: config.retries.times,
                interval: config.retries.interval,
            });
        }
        if !config.user_agent.is_empty() {
            options.push(FinderOption::Header(
                "User-Agent".to_string(),
                config.user_agent.clone(),
            ));
        }
        options
    }

    /// Instantiate and initialize every enabled source in order.
    /// Sources that are unknown or reject their options are logged and left out.
    pub fn init(&self, registry: &FinderRegistry) -> Vec<(String, Arc<dyn SubdomainFinder>)> {
        let mut seen = BTreeSet::new();
        let mut finders = Vec::new();

        for name in &self.enabled {
            if !seen.insert(name.as_str()) {
                warn!(source = %name, "Source enabled twice, ignoring duplicate");
                continue;
            }

            let mut finder = match registry.instantiate(name) {
                Ok(finder) => finder,
                Err(e) => {
                    warn!(source = %name, error = %e, "Failed to create source");
                    continue;
                }
            };

            if let Err(e) = finder.init(self.options(name)) {
                warn!(source = %name, error = %e, "Failed to init source");
                continue;
            }

            info!(source = %name, workers = finder.workers(), "Source initialized");
            finders.push((name.clone(), Arc::from(finder)));
        }

        finders
    }
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_qps() -> f64 {
    DEFAULT_QPS
}

fn default_worker() -> usize {
    DEFAULT_WORKERS
}

/// Durations as human-readable strings ("5s", "1m 30s")
mod duration_str {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

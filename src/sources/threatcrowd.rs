// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

// https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=<domain>
// Rate limit: 1 req / 10s

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;

use super::{BaseFinder, FinderOption, Stat, SubdomainFinder};
use crate::errors::FinderResult;

pub const NAME: &str = "threatcrowd";

#[derive(Debug, Deserialize)]
struct ThreatCrowdResponse {
    #[serde(default)]
    #[allow(dead_code)]
    response_code: Option<String>,
    #[serde(default)]
    subdomains: Vec<String>,
}

#[derive(Debug)]
pub struct ThreatCrowd {
    base: BaseFinder,
}

impl Default for ThreatCrowd {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreatCrowd {
    pub fn new() -> Self {
        Self::with_endpoint("https://www.threatcrowd.org/searchApi/v2/domain/report/?domain=")
    }

    pub fn with_endpoint(prefix: &str) -> Self {
        let prefix = prefix.to_string();
        let base = BaseFinder::new()
            .with_target_builder(move |domain| format!("{}{}", prefix, domain))
            .with_parser(parse);
        Self { base }
    }
}

fn parse(body: &[u8]) -> anyhow::Result<Vec<String>> {
    let response: ThreatCrowdResponse =
        serde_json::from_slice(body).context("Failed to parse threatcrowd report")?;
    Ok(response.subdomains)
}

#[async_trait]
impl SubdomainFinder for ThreatCrowd {
    fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()> {
        self.base.init(options)
    }

    async fn get(&self, ctx: &CancellationToken, domain: &str) -> FinderResult<Vec<String>> {
        self.base.get(ctx, domain).await
    }

    fn name(&self) -> &str {
        NAME
    }

    fn workers(&self) -> usize {
        self.base.workers()
    }

    fn stat(&self) -> &Stat {
        self.base.stat()
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

// https://api.hackertarget.com/hostsearch/?q=<domain>
// Free tier: 50 calls per day per source IP, roughly 2 req/s.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{BaseFinder, FinderOption, Stat, SubdomainFinder};
use crate::errors::FinderResult;

pub const NAME: &str = "hackertarget";

#[derive(Debug)]
pub struct HackerTarget {
    base: BaseFinder,
}

impl Default for HackerTarget {
    fn default() -> Self {
        Self::new()
    }
}

impl HackerTarget {
    pub fn new() -> Self {
        Self::with_endpoint("https://api.hackertarget.com/hostsearch/?q=")
    }

    /// Point the source at another host, e.g. a mock server
    pub fn with_endpoint(prefix: &str) -> Self {
        let prefix = prefix.to_string();
        let base = BaseFinder::new()
            .with_target_builder(move |domain| format!("{}{}", prefix, domain))
            .with_parser(|body| Ok(parse(body)));
        Self { base }
    }
}

/// Body is `host,ip` per line; lines without a comma are ignored
fn parse(body: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(body)
        .lines()
        .filter_map(|line| line.split_once(',').map(|(host, _)| host.to_string()))
        .collect()
}

#[async_trait]
impl SubdomainFinder for HackerTarget {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_host_search() {
        let body = b"abc.google.com,1.2.3.4\nmail.google.com,5.6.7.8\nAPI count exceeded";
        assert_eq!(parse(body), vec!["abc.google.com", "mail.google.com"]);
    }

    #[test]
    fn test_parse_empty_body() {
        assert!(parse(b"").is_empty());
    }
}

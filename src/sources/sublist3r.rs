// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

// https://api.sublist3r.com/search.php?domain=<domain>

use anyhow::Context;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use super::{BaseFinder, FinderOption, Stat, SubdomainFinder};
use crate::errors::FinderResult;

pub const NAME: &str = "sublist3r";

#[derive(Debug)]
pub struct Sublist3r {
    base: BaseFinder,
}

impl Default for Sublist3r {
    fn default() -> Self {
        Self::new()
    }
}

impl Sublist3r {
    pub fn new() -> Self {
        Self::with_endpoint("https://api.sublist3r.com/search.php?domain=")
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
    serde_json::from_slice(body).context("sublist3r response is not a json string array")
}

#[async_trait]
impl SubdomainFinder for Sublist3r {
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
    fn test_parse_string_array() {
        let body = br#"["www.abc.com","mail.abc.com"]"#;
        assert_eq!(parse(body).unwrap(), vec!["www.abc.com", "mail.abc.com"]);
    }

    #[test]
    fn test_parse_rejects_object() {
        assert!(parse(br#"{"error":"rate limited"}"#).is_err());
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Certificate Transparency Source
 * Names from crt.sh certificate logs, skipping expired certificates
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::trace;

use super::{BaseFinder, FinderOption, Stat, SubdomainFinder};
use crate::errors::FinderResult;
use crate::types::RelationMethod;

pub const NAME: &str = "crtsh";

/// Layout of crt.sh `not_after` values, always UTC
const NOT_AFTER_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Deserialize)]
struct CertEntry {
    #[serde(default)]
    common_name: String,
    #[serde(default)]
    name_value: String,
    #[serde(default)]
    not_after: String,
}

#[derive(Debug)]
pub struct Crtsh {
    base: BaseFinder,
}

impl Default for Crtsh {
    fn default() -> Self {
        Self::new()
    }
}

impl Crtsh {
    pub fn new() -> Self {
        Self::with_endpoint("https://crt.sh/?output=json&q=")
    }

    pub fn with_endpoint(prefix: &str) -> Self {
        let prefix = prefix.to_string();
        let base = BaseFinder::new()
            .with_target_builder(move |domain| format!("{}{}", prefix, domain));
        Self { base }
    }
}

fn parse_not_after(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value, NOT_AFTER_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

fn parse(body: &[u8], cutoff: DateTime<Utc>) -> anyhow::Result<Vec<String>> {
    let entries: Vec<CertEntry> =
        serde_json::from_slice(body).context("Failed to parse crt.sh certificate list")?;

    let mut names = Vec::new();
    for entry in entries {
        match parse_not_after(&entry.not_after) {
            Some(expires) if expires >= cutoff => {}
            _ => {
                trace!(not_after = %entry.not_after, "Skipping expired or undated certificate");
                continue;
            }
        }
        names.extend(
            entry
                .name_value
                .split('\n')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        );
        if !entry.common_name.is_empty() {
            names.push(entry.common_name);
        }
    }
    Ok(names)
}

#[async_trait]
impl SubdomainFinder for Crtsh {
    fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()> {
        self.base.init(options)?;
        let cutoff = self.base.not_after().unwrap_or_else(Utc::now);
        self.base
            .set_parser(Arc::new(move |body: &[u8]| parse(body, cutoff)));
        Ok(())
    }

    async fn get(&self, ctx: &CancellationToken, domain: &str) -> FinderResult<Vec<String>> {
        self.base.get(ctx, domain).await
    }

    fn name(&self) -> &str {
        NAME
    }

    fn related_method(&self) -> RelationMethod {
        RelationMethod::Cert
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
    use chrono::TimeZone;

    const BODY: &str = r#"[
        {"common_name":"www.abc.com","name_value":"abc.com\nmail.abc.com","not_after":"2030-01-01T00:00:00"},
        {"common_name":"old.abc.com","name_value":"old.abc.com","not_after":"2019-06-01T12:00:00"},
        {"common_name":"bad.abc.com","name_value":"bad.abc.com","not_after":"soon"}
    ]"#;

    fn cutoff() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_skips_expired_and_unparseable() {
        let names = parse(BODY.as_bytes(), cutoff()).unwrap();
        assert_eq!(names, vec!["abc.com", "mail.abc.com", "www.abc.com"]);
    }

    #[test]
    fn test_parse_with_old_cutoff_keeps_everything_dated() {
        let early = Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap();
        let names = parse(BODY.as_bytes(), early).unwrap();
        assert!(names.contains(&"old.abc.com".to_string()));
        assert!(!names.contains(&"bad.abc.com".to_string()));
    }

    #[test]
    fn test_not_after_format() {
        let parsed = parse_not_after("2030-01-01T00:00:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
        assert!(parse_not_after("2030-01-01").is_none());
    }

    #[test]
    fn test_init_installs_parser() {
        let mut finder = Crtsh::new();
        finder
            .init(vec![FinderOption::NotAfter(cutoff())])
            .unwrap();
        assert_eq!(finder.base.not_after(), Some(cutoff()));
        assert_eq!(finder.related_method(), RelationMethod::Cert);
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Subdomain Sources
 * Capability interface every provider implements, plus the providers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::errors::FinderResult;
use crate::types::{InputKind, RelationMethod, RelationType};

pub mod abuseipdb;
pub mod base;
pub mod crtsh;
pub mod hackertarget;
pub mod sonarsearch;
pub mod stat;
pub mod sublist3r;
pub mod threatcrowd;

pub use abuseipdb::AbuseIpDb;
pub use base::{BaseFinder, DEFAULT_WORKERS};
pub use crtsh::Crtsh;
pub use hackertarget::HackerTarget;
pub use sonarsearch::{
    CrobatTransport, SonarSearchReverse, SonarSearchSubdomains, StreamRpc, StreamTransport,
};
pub use stat::{Stat, StatSnapshot};
pub use sublist3r::Sublist3r;
pub use threatcrowd::ThreatCrowd;

/// Builds the request target (usually a URL) for one queried domain or IP
pub type TargetBuilder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Extracts names from a raw response body
pub type ResponseParser = Arc<dyn Fn(&[u8]) -> anyhow::Result<Vec<String>> + Send + Sync>;

/// Settings applied by [`SubdomainFinder::init`]
#[derive(Clone)]
pub enum FinderOption {
    Timeout(Duration),
    Qps(f64),
    Header(String, String),
    /// Skip certificates that expire before this instant
    NotAfter(DateTime<Utc>),
    Retries { times: u32, interval: Duration },
    Workers(usize),
    TargetBuilder(TargetBuilder),
    Parser(ResponseParser),
}

impl fmt::Debug for FinderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinderOption::Timeout(t) => f.debug_tuple("Timeout").field(t).finish(),
            FinderOption::Qps(q) => f.debug_tuple("Qps").field(q).finish(),
            FinderOption::Header(k, v) => f.debug_tuple("Header").field(k).field(v).finish(),
            FinderOption::NotAfter(t) => f.debug_tuple("NotAfter").field(t).finish(),
            FinderOption::Retries { times, interval } => f
                .debug_struct("Retries")
                .field("times", times)
                .field("interval", interval)
                .finish(),
            FinderOption::Workers(n) => f.debug_tuple("Workers").field(n).finish(),
            FinderOption::TargetBuilder(_) => f.write_str("TargetBuilder(..)"),
            FinderOption::Parser(_) => f.write_str("Parser(..)"),
        }
    }
}

/// A pluggable client for one external subdomain-enumeration service.
///
/// Providers normally compose a [`BaseFinder`], which supplies rate limiting,
/// retries, case-insensitive dedup and statistics, and only contribute a target
/// builder and a parser. Non-http providers replace [`get`](Self::get) wholesale
/// but must still record exactly one [`Stat`] entry per call and return
/// lower-cased, de-duplicated names.
#[async_trait]
pub trait SubdomainFinder: Send + Sync {
    /// Apply configuration; fails with `FinderError::Config` on invalid settings
    fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()>;

    /// Query the source for one domain (or IP, see [`serve_type`](Self::serve_type))
    async fn get(&self, ctx: &CancellationToken, target: &str) -> FinderResult<Vec<String>>;

    fn name(&self) -> &str;

    fn serve_type(&self) -> InputKind {
        InputKind::Domain
    }

    fn related_method(&self) -> RelationMethod {
        RelationMethod::Api
    }

    fn related_type(&self) -> RelationType {
        RelationType::Subdomain
    }

    fn workers(&self) -> usize;

    fn stat(&self) -> &Stat;
}

/// Lower-case and de-duplicate names; applying it twice is the same as once
pub fn dedup_lowercase<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names
        .into_iter()
        .map(|name| name.as_ref().to_lowercase())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dedup_is_case_insensitive() {
        let names = dedup_lowercase(["Mail.ABC.com", "mail.abc.com", "www.abc.com"]);
        assert_eq!(names, vec!["mail.abc.com", "www.abc.com"]);
    }

    #[test]
    fn test_dedup_is_idempotent() {
        let input = vec!["B.x.com", "a.x.com", "b.X.com", "A.x.com", "c.x.com"];
        let once = dedup_lowercase(&input);
        let twice = dedup_lowercase(&once);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 3);
    }

    #[test]
    fn test_option_debug_hides_closures() {
        let opt = FinderOption::Parser(Arc::new(|_| Ok(vec![])));
        assert_eq!(format!("{:?}", opt), "Parser(..)");
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Input Reader
 * Reads domains from a file or a comma separated list and feeds queries
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use anyhow::{Context, Result};
use async_trait::async_trait;
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::TokioResolver;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::types::Query;

/// Where input domains come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    /// One domain per line
    File(PathBuf),
    /// Comma separated domains
    List(String),
}

/// IPv4 lookup used when queries should also carry addresses
#[async_trait]
pub trait Ipv4Resolver: Send + Sync {
    async fn resolve(&self, domain: &str) -> Vec<Ipv4Addr>;
}

/// System resolver; lookup failures yield no addresses
pub struct DnsResolver {
    resolver: TokioResolver,
}

impl DnsResolver {
    pub fn new() -> Result<Self> {
        let resolver = TokioResolver::builder(TokioConnectionProvider::default())
            .context("Failed to read system DNS configuration")?
            .build();
        Ok(Self { resolver })
    }
}

#[async_trait]
impl Ipv4Resolver for DnsResolver {
    async fn resolve(&self, domain: &str) -> Vec<Ipv4Addr> {
        match self.resolver.lookup_ip(domain).await {
            Ok(lookup) => lookup
                .iter()
                .filter_map(|ip| match ip {
                    IpAddr::V4(v4) => Some(v4),
                    IpAddr::V6(_) => None,
                })
                .collect(),
            Err(e) => {
                debug!(domain = domain, error = %e, "IP lookup failed");
                Vec::new()
            }
        }
    }
}

/// Send one query per input domain, then drop `tx` to end the input
pub async fn feed_queries(source: InputSource, resolve_ip: bool, tx: mpsc::Sender<Query>) -> Result<u64> {
    if resolve_ip {
        let resolver = DnsResolver::new()?;
        feed_queries_with(source, Some(&resolver), tx).await
    } else {
        feed_queries_with::<DnsResolver>(source, None, tx).await
    }
}

/// Like [`feed_queries`], with an explicit resolver.
/// A domain that resolves to nothing is still sent without an IP.
pub async fn feed_queries_with<R: Ipv4Resolver + ?Sized>(
    source: InputSource,
    resolver: Option<&R>,
    tx: mpsc::Sender<Query>,
) -> Result<u64> {
    let mut sent = 0u64;

    match source {
        InputSource::File(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .with_context(|| format!("Failed to open input file: {:?}", path))?;
            let mut lines = BufReader::new(file).lines();
            while let Some(line) = lines
                .next_line()
                .await
                .with_context(|| format!("Failed to read input file: {:?}", path))?
            {
                for query in queries_for(line.trim(), resolver).await {
                    tx.send(query).await.context("Query receiver closed")?;
                    sent += 1;
                }
            }
        }
        InputSource::List(list) => {
            for item in list.split(',') {
                for query in queries_for(item.trim(), resolver).await {
                    tx.send(query).await.context("Query receiver closed")?;
                    sent += 1;
                }
            }
        }
    }

    info!(queries = sent, "Input exhausted");
    Ok(sent)
}

async fn queries_for<R: Ipv4Resolver + ?Sized>(domain: &str, resolver: Option<&R>) -> Vec<Query> {
    if domain.is_empty() {
        return Vec::new();
    }
    let Some(resolver) = resolver else {
        return vec![Query::domain(domain)];
    };

    let ips = resolver.resolve(domain).await;
    if ips.is_empty() {
        return vec![Query::domain(domain)];
    }
    ips.into_iter()
        .map(|ip| Query::with_ip(domain, ip.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    struct StaticResolver(HashMap<&'static str, Vec<Ipv4Addr>>);

    #[async_trait]
    impl Ipv4Resolver for StaticResolver {
        async fn resolve(&self, domain: &str) -> Vec<Ipv4Addr> {
            self.0.get(domain).cloned().unwrap_or_default()
        }
    }

    async fn collect(source: InputSource, resolver: Option<&StaticResolver>) -> (u64, Vec<Query>) {
        let (tx, mut rx) = mpsc::channel(16);
        let sent = feed_queries_with(source, resolver, tx).await.unwrap();
        let mut queries = Vec::new();
        while let Some(q) = rx.recv().await {
            queries.push(q);
        }
        (sent, queries)
    }

    #[tokio::test]
    async fn test_list_skips_blank_items() {
        let (sent, queries) = collect(InputSource::List(" abc.com,, xyz.com ,".to_string()), None).await;
        assert_eq!(sent, 2);
        assert_eq!(queries, vec![Query::domain("abc.com"), Query::domain("xyz.com")]);
    }

    #[tokio::test]
    async fn test_file_one_domain_per_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "abc.com\n\n  xyz.com  \nabc.com").unwrap();

        let (_, queries) = collect(InputSource::File(file.path().to_path_buf()), None).await;
        let domains: Vec<_> = queries.iter().map(|q| q.domain.clone().unwrap()).collect();
        assert_eq!(domains, vec!["abc.com", "xyz.com", "abc.com"]);
    }

    #[tokio::test]
    async fn test_resolved_ips_expand_queries() {
        let resolver = StaticResolver(HashMap::from([(
            "abc.com",
            vec![Ipv4Addr::new(1, 2, 1, 2), Ipv4Addr::new(1, 2, 1, 3)],
        )]));

        let (_, queries) =
            collect(InputSource::List("abc.com,nxdomain.com".to_string()), Some(&resolver)).await;
        assert_eq!(
            queries,
            vec![
                Query::with_ip("abc.com", "1.2.1.2"),
                Query::with_ip("abc.com", "1.2.1.3"),
                Query::domain("nxdomain.com"),
            ]
        );
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (tx, _rx) = mpsc::channel(1);
        let result = feed_queries(InputSource::File("/nonexistent/domains.txt".into()), false, tx).await;
        assert!(result.is_err());
    }
}

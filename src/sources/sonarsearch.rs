// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - SonarSearch Sources
 * Project Sonar forward/reverse DNS data over the crobat gRPC service
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OnceCell, RwLock};
use tokio_util::sync::CancellationToken;
use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tracing::{debug, info};

use super::{dedup_lowercase, BaseFinder, FinderOption, Stat, SubdomainFinder};
use crate::errors::{FinderError, FinderResult};
use crate::retry::retry_with_policy;
use crate::types::{InputKind, RelationType};

pub const NAME_SUBDOMAINS: &str = "sonarsearch/subdomains";
pub const NAME_REVERSE: &str = "sonarsearch/reverse";

/// Public crobat endpoint
pub const CROBAT_ENDPOINT: &str = "https://crobat-rpc.omnisint.io:443";

/// Server-streaming methods of the crobat service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRpc {
    Subdomains,
    ReverseDns,
}

impl StreamRpc {
    fn path(self) -> PathAndQuery {
        match self {
            StreamRpc::Subdomains => PathAndQuery::from_static("/crobat.Crobat/GetSubdomains"),
            StreamRpc::ReverseDns => PathAndQuery::from_static("/crobat.Crobat/ReverseDNS"),
        }
    }
}

/// Source of streamed names, swapped out in tests
#[async_trait]
pub trait StreamTransport: Send + Sync {
    /// Open one server stream; `timeout` is the deadline the caller enforces
    async fn fetch(
        &self,
        rpc: StreamRpc,
        query: &str,
        timeout: Duration,
    ) -> FinderResult<BoxStream<'static, FinderResult<String>>>;
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryRequest {
    #[prost(string, tag = "1")]
    pub query: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Domain {
    #[prost(string, tag = "1")]
    pub domain: String,
}

/// gRPC client for the crobat service; connects on first use
pub struct CrobatTransport {
    endpoint: String,
    channel: OnceCell<Channel>,
}

impl std::fmt::Debug for CrobatTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrobatTransport")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl Default for CrobatTransport {
    fn default() -> Self {
        Self::new(CROBAT_ENDPOINT)
    }
}

impl CrobatTransport {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            channel: OnceCell::new(),
        }
    }

    async fn channel(&self) -> FinderResult<Channel> {
        let channel = self
            .channel
            .get_or_try_init(|| async {
                let mut endpoint = Endpoint::from_shared(self.endpoint.clone())
                    .map_err(|e| FinderError::Config(format!("invalid endpoint {}: {}", self.endpoint, e)))?;
                if self.endpoint.starts_with("https://") {
                    endpoint = endpoint
                        .tls_config(ClientTlsConfig::new().with_native_roots())
                        .map_err(|e| FinderError::Config(format!("tls setup failed: {}", e)))?;
                }
                info!(endpoint = %self.endpoint, "Connecting to crobat");
                Ok::<_, FinderError>(endpoint.connect_lazy())
            })
            .await?;
        Ok(channel.clone())
    }
}

#[async_trait]
impl StreamTransport for CrobatTransport {
    async fn fetch(
        &self,
        rpc: StreamRpc,
        query: &str,
        timeout: Duration,
    ) -> FinderResult<BoxStream<'static, FinderResult<String>>> {
        let mut grpc = tonic::client::Grpc::new(self.channel().await?);
        grpc.ready().await.map_err(|e| FinderError::Transport {
            target: self.endpoint.clone(),
            reason: format!("service was not ready: {}", e),
        })?;

        let mut request = tonic::Request::new(QueryRequest {
            query: query.to_string(),
        });
        request.set_timeout(timeout);
        let codec: ProstCodec<QueryRequest, Domain> = ProstCodec::default();
        let response = grpc
            .server_streaming(request, rpc.path(), codec)
            .await
            .map_err(|status| FinderError::from_grpc(status, &self.endpoint, timeout))?;

        let target = self.endpoint.clone();
        Ok(response
            .into_inner()
            .map(move |item| {
                item.map(|d| d.domain)
                    .map_err(|status| FinderError::from_grpc(status, &target, timeout))
            })
            .boxed())
    }
}

/// Shared plumbing of both crobat sources
struct SonarCore {
    base: BaseFinder,
    transport: Arc<dyn StreamTransport>,
}

impl SonarCore {
    fn new(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            base: BaseFinder::new(),
            transport,
        }
    }

    /// Drain one stream, bounded by the source timeout and the run context
    async fn query(
        &self,
        ctx: &CancellationToken,
        rpc: StreamRpc,
        query: &str,
    ) -> FinderResult<Vec<String>> {
        let timeout = self.base.timeout();
        let limiter = self.base.limiter();
        let transport = &self.transport;

        retry_with_policy(&self.base.retry_policy(), query, move || async move {
            limiter.wait(ctx).await?;
            let collect = async {
                let mut stream = transport.fetch(rpc, query, timeout).await?;
                let mut names = Vec::new();
                while let Some(name) = stream.next().await {
                    names.push(name?);
                }
                Ok::<_, FinderError>(names)
            };
            tokio::select! {
                biased;
                _ = ctx.cancelled() => Err(FinderError::Cancelled),
                result = tokio::time::timeout(timeout, collect) => match result {
                    Ok(names) => names,
                    Err(_) => Err(FinderError::Timeout {
                        target: query.to_string(),
                        timeout,
                    }),
                },
            }
        })
        .await
        .map(dedup_lowercase)
    }
}

/// Forward lookup. Crobat answers for the registrable domain, so one
/// upstream call serves every requested apex under it.
pub struct SonarSearchSubdomains {
    core: SonarCore,
    cache: RwLock<HashMap<String, Vec<String>>>,
}

impl std::fmt::Debug for SonarSearchSubdomains {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonarSearchSubdomains")
            .field("base", &self.core.base)
            .finish()
    }
}

impl Default for SonarSearchSubdomains {
    fn default() -> Self {
        Self::new()
    }
}

impl SonarSearchSubdomains {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(CrobatTransport::default()))
    }

    pub fn with_transport(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            core: SonarCore::new(transport),
            cache: RwLock::new(HashMap::new()),
        }
    }

    async fn lookup(&self, ctx: &CancellationToken, domain: &str) -> FinderResult<Vec<String>> {
        let domain = domain.to_lowercase();
        let key = registrable_domain(&domain);

        let cached = self.cache.read().await.get(&key).cloned();
        let names = match cached {
            Some(names) => names,
            None => {
                let names = self.core.query(ctx, StreamRpc::Subdomains, &key).await?;
                debug!(key = %key, count = names.len(), "Caching crobat response");
                self.cache.write().await.insert(key, names.clone());
                names
            }
        };

        let suffix = format!(".{}", domain);
        Ok(names
            .into_iter()
            .filter(|name| name.ends_with(&suffix))
            .collect())
    }
}

/// eTLD+1 of `domain`, or the domain itself when it has none
fn registrable_domain(domain: &str) -> String {
    psl::domain_str(domain).unwrap_or(domain).to_string()
}

#[async_trait]
impl SubdomainFinder for SonarSearchSubdomains {
    fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()> {
        self.core.base.init(options)
    }

    async fn get(&self, ctx: &CancellationToken, domain: &str) -> FinderResult<Vec<String>> {
        let outcome = self.lookup(ctx, domain).await;
        self.core.base.stat().record(&outcome);
        outcome
    }

    fn name(&self) -> &str {
        NAME_SUBDOMAINS
    }

    fn workers(&self) -> usize {
        self.core.base.workers()
    }

    fn stat(&self) -> &Stat {
        self.core.base.stat()
    }
}

/// Reverse DNS lookup by IP
pub struct SonarSearchReverse {
    core: SonarCore,
}

impl std::fmt::Debug for SonarSearchReverse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SonarSearchReverse")
            .field("base", &self.core.base)
            .finish()
    }
}

impl Default for SonarSearchReverse {
    fn default() -> Self {
        Self::new()
    }
}

impl SonarSearchReverse {
    pub fn new() -> Self {
        Self::with_transport(Arc::new(CrobatTransport::default()))
    }

    pub fn with_transport(transport: Arc<dyn StreamTransport>) -> Self {
        Self {
            core: SonarCore::new(transport),
        }
    }
}

#[async_trait]
impl SubdomainFinder for SonarSearchReverse {
    fn init(&mut self, options: Vec<FinderOption>) -> FinderResult<()> {
        self.core.base.init(options)
    }

    async fn get(&self, ctx: &CancellationToken, ip: &str) -> FinderResult<Vec<String>> {
        let outcome = self.core.query(ctx, StreamRpc::ReverseDns, ip).await;
        self.core.base.stat().record(&outcome);
        outcome
    }

    fn name(&self) -> &str {
        NAME_REVERSE
    }

    fn serve_type(&self) -> InputKind {
        InputKind::Ip
    }

    fn related_type(&self) -> RelationType {
        RelationType::Reverse
    }

    fn workers(&self) -> usize {
        self.core.base.workers()
    }

    fn stat(&self) -> &Stat {
        self.core.base.stat()
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Discovery Executor
 * Dedups input, fans it out to every source pool, merges results and
 * flattens them into one output row per discovered name
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::SourcesConfig;
use crate::errors::{FinderError, FinderResult};
use crate::queriers::{Queriers, QuerierHandle};
use crate::registry::FinderRegistry;
use crate::sources::{StatSnapshot, SubdomainFinder};
use crate::types::{InputKind, OutputRecord, Query, QueryResult, RelationType};

const RESULT_QUEUE_CAPACITY: usize = 1;
const RECORD_QUEUE_CAPACITY: usize = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Idle,
    /// Input is still being fanned out
    Running,
    /// Input ended; pools and flatten are finishing
    Draining,
    Done,
}

/// Run-wide statistics, complete once the stats task resolves
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalStat {
    #[serde(rename = "domain", default, skip_serializing_if = "is_zero")]
    pub domains_cnt: u64,
    #[serde(rename = "ip", default, skip_serializing_if = "is_zero")]
    pub ips_cnt: u64,
    #[serde(rename = "subdomain", default, skip_serializing_if = "is_zero")]
    pub sub_domains_cnt: u64,
    #[serde(rename = "out_rows", default, skip_serializing_if = "is_zero")]
    pub total_output_row: u64,
    #[serde(rename = "detail", default, skip_serializing_if = "BTreeMap::is_empty")]
    pub finder: BTreeMap<String, StatSnapshot>,
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// State owned by the flatten stage
#[derive(Debug, Default)]
pub struct FlattenState {
    seen_subdomains: HashSet<String>,
    pub sub_domains_cnt: u64,
    pub total_output_row: u64,
}

impl FlattenState {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Turn one query result into output rows.
///
/// Failed results produce nothing. A name that is not a strict subdomain of
/// the queried domain is reported as `related-domain` whatever the source says.
pub fn flatten_result(state: &mut FlattenState, result: QueryResult) -> Vec<OutputRecord> {
    let QueryResult {
        domain,
        ip,
        outcome,
        relation_method,
        relation_type,
        input_kind,
    } = result;

    let Ok(names) = outcome else {
        return Vec::new();
    };

    let suffix = format!(".{}", domain);
    let extra_info = match (input_kind, ip) {
        (InputKind::Ip, Some(ip)) => Some(BTreeMap::from([("ip".to_string(), ip)])),
        _ => None,
    };

    let mut records = Vec::with_capacity(names.len());
    for name in names {
        if state.seen_subdomains.insert(name.clone()) {
            state.sub_domains_cnt += 1;
        }
        let relation_type = if name.ends_with(&suffix) {
            relation_type
        } else {
            RelationType::RelatedDomain
        };
        state.total_output_row += 1;
        records.push(OutputRecord {
            root_domain: domain.clone(),
            domain: name,
            method: relation_method.clone(),
            relation_type,
            extra_info: extra_info.clone(),
        });
    }
    records
}

/// Output of [`Executor::run`]
#[derive(Debug)]
pub struct ExecutionHandle {
    /// Flattened rows; closes once every pool has drained
    pub records: mpsc::Receiver<OutputRecord>,
    /// Resolves after `records` closes
    pub stats: JoinHandle<GlobalStat>,
}

impl ExecutionHandle {
    /// Drain every record, then wait for the final stats
    pub async fn collect(mut self) -> FinderResult<(Vec<OutputRecord>, GlobalStat)> {
        let mut records = Vec::new();
        while let Some(record) = self.records.recv().await {
            records.push(record);
        }
        let stat = self
            .stats
            .await
            .map_err(|e| FinderError::InvalidState(format!("stat task failed: {}", e)))?;
        Ok((records, stat))
    }
}

pub struct Executor {
    queriers: Queriers,
    state: Arc<watch::Sender<ExecutorState>>,
}

impl std::fmt::Debug for Executor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Executor")
            .field("queriers", &self.queriers.names(None))
            .field("state", &self.state())
            .finish()
    }
}

impl Executor {
    /// Build from initialized sources; at least one is required
    pub fn new(finders: Vec<(String, Arc<dyn SubdomainFinder>)>) -> FinderResult<Self> {
        if finders.is_empty() {
            return Err(FinderError::NoSourcesInitialized);
        }
        let queriers = Queriers::new(finders);
        info!(queriers = ?queriers.names(None), "Init queriers");

        let (state, _) = watch::channel(ExecutorState::Idle);
        Ok(Self {
            queriers,
            state: Arc::new(state),
        })
    }

    pub fn from_config(config: &SourcesConfig, registry: &FinderRegistry) -> FinderResult<Self> {
        Self::new(config.init(registry))
    }

    /// Default tuning for `names` (all registered sources when empty)
    pub fn with_sources(names: &[String], worker: usize, registry: &FinderRegistry) -> FinderResult<Self> {
        Self::from_config(&SourcesConfig::with_defaults(names, worker, registry), registry)
    }

    pub fn state(&self) -> ExecutorState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<ExecutorState> {
        self.state.subscribe()
    }

    pub fn queriers(&self) -> &Queriers {
        &self.queriers
    }

    /// Start every pool and the fan-out, fan-in and flatten stages.
    ///
    /// `input` is consumed until its senders are dropped. Cancelling `ctx`
    /// aborts in-flight queries; each one still yields a (failed) result.
    pub fn run(
        &self,
        ctx: &CancellationToken,
        input: mpsc::Receiver<Query>,
    ) -> FinderResult<ExecutionHandle> {
        let started = self.state.send_if_modified(|state| {
            if *state == ExecutorState::Idle {
                *state = ExecutorState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(FinderError::InvalidState(format!(
                "executor already ran (state {:?})",
                self.state()
            )));
        }

        let mut domain_inputs = Vec::new();
        let mut ip_inputs = Vec::new();
        let mut outputs = Vec::new();
        for querier in self.queriers.iter() {
            let QuerierHandle {
                name,
                serve_type,
                input,
                results,
            } = querier.start(ctx);
            match serve_type {
                InputKind::Domain => domain_inputs.push(input),
                InputKind::Ip => ip_inputs.push(input),
            }
            outputs.push((name, results));
        }

        let fan_out = tokio::spawn(fan_out(
            input,
            domain_inputs,
            ip_inputs,
            Arc::clone(&self.state),
        ));
        let results = fan_in(outputs);

        let (records_tx, records_rx) = mpsc::channel(RECORD_QUEUE_CAPACITY);
        let queriers = self.queriers.clone();
        let state = Arc::clone(&self.state);
        let stats = tokio::spawn(async move {
            let flatten = flatten(results, records_tx).await;
            let (domains_cnt, ips_cnt) = match fan_out.await {
                Ok(counts) => counts,
                Err(e) => {
                    error!(error = %e, "Fan-out task failed");
                    (0, 0)
                }
            };

            let stat = GlobalStat {
                domains_cnt,
                ips_cnt,
                sub_domains_cnt: flatten.sub_domains_cnt,
                total_output_row: flatten.total_output_row,
                finder: queriers.collect_stat(),
            };
            state.send_replace(ExecutorState::Done);
            stat
        });

        Ok(ExecutionHandle {
            records: records_rx,
            stats,
        })
    }
}

/// Forward each unseen domain to domain pools and each unseen IP to IP pools.
/// Returns the unique domain and IP counts once input ends.
async fn fan_out(
    mut input: mpsc::Receiver<Query>,
    domain_inputs: Vec<mpsc::Sender<Query>>,
    ip_inputs: Vec<mpsc::Sender<Query>>,
    state: Arc<watch::Sender<ExecutorState>>,
) -> (u64, u64) {
    let mut seen_domains: HashSet<String> = HashSet::new();
    // Most runs never enable an IP source
    let mut seen_ips: Option<HashSet<String>> = (!ip_inputs.is_empty()).then(HashSet::new);
    let mut domains_cnt = 0u64;
    let mut ips_cnt = 0u64;

    while let Some(query) = input.recv().await {
        if !domain_inputs.is_empty() {
            if let Some(domain) = query.domain.as_deref() {
                if seen_domains.insert(domain.to_string()) {
                    domains_cnt += 1;
                    send_all(&domain_inputs, &query).await;
                }
            }
        }
        if let Some(seen) = seen_ips.as_mut() {
            if let Some(ip) = query.ip.as_deref() {
                if seen.insert(ip.to_string()) {
                    ips_cnt += 1;
                    send_all(&ip_inputs, &query).await;
                }
            }
        }
    }

    debug!(domains = domains_cnt, ips = ips_cnt, "Input exhausted, closing querier inputs");
    state.send_replace(ExecutorState::Draining);
    drop(domain_inputs);
    drop(ip_inputs);
    (domains_cnt, ips_cnt)
}

async fn send_all(inputs: &[mpsc::Sender<Query>], query: &Query) {
    for input in inputs {
        if input.send(query.clone()).await.is_err() {
            warn!("Querier input closed before end of input");
        }
    }
}

/// Merge every pool's results into one queue that closes after all pools close
fn fan_in(outputs: Vec<(String, mpsc::Receiver<QueryResult>)>) -> mpsc::Receiver<QueryResult> {
    let (tx, rx) = mpsc::channel(RESULT_QUEUE_CAPACITY);
    for (name, mut results) in outputs {
        let tx = tx.clone();
        tokio::spawn(async move {
            while let Some(result) = results.recv().await {
                if tx.send(result).await.is_err() {
                    break;
                }
            }
            debug!(source = %name, "Querier results drained");
        });
    }
    rx
}

async fn flatten(
    mut results: mpsc::Receiver<QueryResult>,
    records: mpsc::Sender<OutputRecord>,
) -> FlattenState {
    let mut state = FlattenState::new();
    let mut sink_open = true;

    while let Some(result) = results.recv().await {
        if let Err(e) = &result.outcome {
            match result.input_kind {
                InputKind::Domain => {
                    warn!(method = %result.relation_method, domain = %result.domain, error = %e, "query")
                }
                InputKind::Ip => {
                    warn!(method = %result.relation_method, ip = result.ip.as_deref().unwrap_or_default(), error = %e, "query")
                }
            }
        }

        for record in flatten_result(&mut state, result) {
            if sink_open && records.send(record).await.is_err() {
                warn!("Record receiver dropped, discarding remaining rows");
                sink_open = false;
            }
        }
    }
    state
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Querier Pools
 * Runs one source under N concurrent workers with hand-off queues
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

use crate::sources::{StatSnapshot, SubdomainFinder};
use crate::types::{InputKind, Query, QueryResult};

/// Capacity of the per-pool queues; one slot is the closest tokio gets to a rendezvous
const QUEUE_CAPACITY: usize = 1;

/// One initialized source, ready to be started as a worker pool
#[derive(Clone)]
pub struct Querier {
    name: String,
    finder: Arc<dyn SubdomainFinder>,
}

impl std::fmt::Debug for Querier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Querier")
            .field("name", &self.name)
            .field("serve_type", &self.finder.serve_type())
            .field("workers", &self.finder.workers())
            .finish()
    }
}

/// Handles of a started pool
#[derive(Debug)]
pub struct QuerierHandle {
    pub name: String,
    pub serve_type: InputKind,
    /// Dropping this closes the pool's inbound queue
    pub input: mpsc::Sender<Query>,
    /// Closed once every worker of the pool has exited
    pub results: mpsc::Receiver<QueryResult>,
}

impl Querier {
    pub fn new(name: impl Into<String>, finder: Arc<dyn SubdomainFinder>) -> Self {
        Self {
            name: name.into(),
            finder,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn serve_type(&self) -> InputKind {
        self.finder.serve_type()
    }

    /// `"{method}/{name}"`, e.g. `cert/crtsh`
    pub fn relation_method(&self) -> String {
        format!("{}/{}", self.finder.related_method(), self.finder.name())
    }

    pub fn stat(&self) -> StatSnapshot {
        self.finder.stat().snapshot()
    }

    /// Spawn `workers()` workers sharing one inbound queue.
    ///
    /// Every worker owns a clone of the outbound sender and no other clone
    /// survives this call, so the outbound queue closes exactly when the last
    /// worker exits.
    pub fn start(&self, ctx: &CancellationToken) -> QuerierHandle {
        let (input_tx, input_rx) = mpsc::channel::<Query>(QUEUE_CAPACITY);
        let (result_tx, result_rx) = mpsc::channel::<QueryResult>(QUEUE_CAPACITY);
        let input_rx = Arc::new(Mutex::new(input_rx));

        let workers = self.finder.workers().max(1);
        let method = Arc::new(self.relation_method());
        let mut set = JoinSet::new();

        for worker_id in 0..workers {
            let finder = Arc::clone(&self.finder);
            let input = Arc::clone(&input_rx);
            let output = result_tx.clone();
            let method = Arc::clone(&method);
            let ctx = ctx.clone();
            set.spawn(async move {
                run_worker(worker_id, finder, input, output, method, ctx).await;
            });
        }
        drop(result_tx);

        let name = self.name.clone();
        tokio::spawn(async move {
            while let Some(joined) = set.join_next().await {
                if let Err(e) = joined {
                    error!(source = %name, error = %e, "Querier worker aborted");
                }
            }
            debug!(source = %name, "All querier workers exited");
        });

        QuerierHandle {
            name: self.name.clone(),
            serve_type: self.serve_type(),
            input: input_tx,
            results: result_rx,
        }
    }
}

async fn run_worker(
    worker_id: usize,
    finder: Arc<dyn SubdomainFinder>,
    input: Arc<Mutex<mpsc::Receiver<Query>>>,
    output: mpsc::Sender<QueryResult>,
    method: Arc<String>,
    ctx: CancellationToken,
) {
    let kind = finder.serve_type();
    loop {
        let next = input.lock().await.recv().await;
        let Some(query) = next else {
            break;
        };
        let Some(target) = query.target(kind) else {
            continue;
        };

        let outcome = finder.get(&ctx, target).await;
        let result = QueryResult {
            domain: query.domain.clone().unwrap_or_default(),
            ip: query.ip.clone(),
            outcome,
            relation_method: method.as_str().to_string(),
            relation_type: finder.related_type(),
            input_kind: kind,
        };

        if output.send(result).await.is_err() {
            debug!(source = finder.name(), worker_id, "Result receiver dropped, stopping worker");
            break;
        }
    }
}

/// Ordered collection of pools, fixed before a run starts
#[derive(Debug, Clone, Default)]
pub struct Queriers {
    items: Vec<Querier>,
}

impl Queriers {
    pub fn new(finders: Vec<(String, Arc<dyn SubdomainFinder>)>) -> Self {
        Self {
            items: finders
                .into_iter()
                .map(|(name, finder)| Querier::new(name, finder))
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Querier> {
        self.items.iter()
    }

    /// Names in registration order, optionally restricted to one input kind
    pub fn names(&self, kind: Option<InputKind>) -> Vec<String> {
        self.items
            .iter()
            .filter(|q| kind.map_or(true, |k| q.serve_type() == k))
            .map(|q| q.name.clone())
            .collect()
    }

    pub fn serves(&self, kind: InputKind) -> bool {
        self.items.iter().any(|q| q.serve_type() == kind)
    }

    /// Snapshot of every pool's stat, keyed by source name
    pub fn collect_stat(&self) -> std::collections::BTreeMap<String, StatSnapshot> {
        self.items
            .iter()
            .map(|q| (q.name.clone(), q.stat()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FinderResult;
    use crate::sources::{FinderOption, Stat};
    use crate::types::{RelationMethod, RelationType};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Echo {
        workers: usize,
        active: AtomicUsize,
        peak: AtomicUsize,
        stat: Stat,
    }

    impl Echo {
        fn new(workers: usize) -> Self {
            Self {
                workers,
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                stat: Stat::new(),
            }
        }
    }

    #[async_trait]
    impl SubdomainFinder for Echo {
        fn init(&mut self, _options: Vec<FinderOption>) -> FinderResult<()> {
            Ok(())
        }

        async fn get(&self, _ctx: &CancellationToken, target: &str) -> FinderResult<Vec<String>> {
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(20)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            let outcome = Ok(vec![format!("www.{}", target)]);
            self.stat.record(&outcome);
            outcome
        }

        fn name(&self) -> &str {
            "echo"
        }

        fn related_method(&self) -> RelationMethod {
            RelationMethod::Crawl
        }

        fn workers(&self) -> usize {
            self.workers
        }

        fn stat(&self) -> &Stat {
            &self.stat
        }
    }

    #[tokio::test]
    async fn test_pool_drains_and_closes() {
        let echo = Arc::new(Echo::new(3));
        let querier = Querier::new("echo", echo.clone());
        let mut handle = querier.start(&CancellationToken::new());

        let input = handle.input.clone();
        drop(handle.input);
        tokio::spawn(async move {
            for i in 0..9 {
                input.send(Query::domain(format!("d{}.com", i))).await.unwrap();
            }
        });

        let mut results = Vec::new();
        while let Some(result) = handle.results.recv().await {
            results.push(result);
        }

        assert_eq!(results.len(), 9);
        assert!(results.iter().all(|r| r.relation_method == "crawl/echo"));
        assert!(results.iter().all(|r| r.relation_type == RelationType::Subdomain));
        assert!(echo.peak.load(Ordering::SeqCst) > 1);
        assert!(echo.peak.load(Ordering::SeqCst) <= 3);
        assert_eq!(querier.stat().domains_cnt, 9);
    }

    #[tokio::test]
    async fn test_query_without_target_is_skipped() {
        let querier = Querier::new("echo", Arc::new(Echo::new(1)));
        let QuerierHandle {
            input, mut results, ..
        } = querier.start(&CancellationToken::new());

        input
            .send(Query {
                domain: None,
                ip: Some("1.2.3.4".to_string()),
            })
            .await
            .unwrap();
        input.send(Query::domain("abc.com")).await.unwrap();
        drop(input);

        let result = results.recv().await.unwrap();
        assert_eq!(result.domain, "abc.com");
        assert_eq!(result.outcome, Ok(vec!["www.abc.com".to_string()]));
        assert!(results.recv().await.is_none());
    }

    #[test]
    fn test_names_by_kind() {
        let queriers = Queriers::new(vec![
            ("a".to_string(), Arc::new(Echo::new(1)) as Arc<dyn SubdomainFinder>),
            ("b".to_string(), Arc::new(Echo::new(1)) as Arc<dyn SubdomainFinder>),
        ]);
        assert_eq!(queriers.names(None), vec!["a", "b"]);
        assert_eq!(queriers.names(Some(InputKind::Domain)), vec!["a", "b"]);
        assert!(queriers.names(Some(InputKind::Ip)).is_empty());
        assert!(!queriers.serves(InputKind::Ip));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

#![allow(dead_code)]

use async_trait::async_trait;
use sdfinder::sources::{dedup_lowercase, FinderOption, Stat, SubdomainFinder};
use sdfinder::{FinderError, FinderResult, InputKind, RelationType};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// In-memory source answering every target with the same names
pub struct FakeFinder {
    name: String,
    names: Vec<String>,
    serve_type: InputKind,
    related_type: RelationType,
    failure: Option<FinderError>,
    delay: Option<Duration>,
    workers: usize,
    stat: Stat,
    targets: Mutex<Vec<String>>,
}

impl FakeFinder {
    pub fn new(name: &str, names: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            serve_type: InputKind::Domain,
            related_type: RelationType::Subdomain,
            failure: None,
            delay: None,
            workers: 1,
            stat: Stat::new(),
            targets: Mutex::new(Vec::new()),
        }
    }

    /// Reverse lookup by IP
    pub fn reverse(mut self) -> Self {
        self.serve_type = InputKind::Ip;
        self.related_type = RelationType::Reverse;
        self
    }

    pub fn failing(mut self, err: FinderError) -> Self {
        self.failure = Some(err);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Every target this source was asked for, in call order
    pub fn targets(&self) -> Vec<String> {
        self.targets.lock().unwrap().clone()
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    async fn answer(&self, ctx: &CancellationToken) -> FinderResult<Vec<String>> {
        if let Some(delay) = self.delay {
            tokio::select! {
                _ = ctx.cancelled() => return Err(FinderError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(dedup_lowercase(&self.names)),
        }
    }
}

#[async_trait]
impl SubdomainFinder for FakeFinder {
    fn init(&mut self, _options: Vec<FinderOption>) -> FinderResult<()> {
        Ok(())
    }

    async fn get(&self, ctx: &CancellationToken, target: &str) -> FinderResult<Vec<String>> {
        self.targets.lock().unwrap().push(target.to_string());
        let outcome = self.answer(ctx).await;
        self.stat.record(&outcome);
        outcome
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn serve_type(&self) -> InputKind {
        self.serve_type
    }

    fn related_type(&self) -> RelationType {
        self.related_type
    }

    fn workers(&self) -> usize {
        self.workers
    }

    fn stat(&self) -> &Stat {
        &self.stat
    }
}

/// `(name, finder)` pair as the executor expects it
pub fn entry(finder: &Arc<FakeFinder>) -> (String, Arc<dyn SubdomainFinder>) {
    (finder.name().to_string(), finder.clone() as Arc<dyn SubdomainFinder>)
}

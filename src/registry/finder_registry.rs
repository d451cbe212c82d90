// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Finder Registry
 * Central registry of every available source, keyed by its unique name
 * © 2026 Bountyy Oy
 */

use once_cell::sync::Lazy;
use std::collections::BTreeMap;

use crate::errors::{FinderError, FinderResult};
use crate::sources::{
    abuseipdb, crtsh, hackertarget, sonarsearch, sublist3r, threatcrowd, AbuseIpDb, Crtsh,
    HackerTarget, SonarSearchReverse, SonarSearchSubdomains, Sublist3r, SubdomainFinder,
    ThreatCrowd,
};

/// Produces a fresh, uninitialized source
pub type FinderFactory = Box<dyn Fn() -> Box<dyn SubdomainFinder> + Send + Sync>;

/// Finder Registry
pub struct FinderRegistry {
    factories: BTreeMap<String, FinderFactory>,
}

impl Default for FinderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for FinderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderRegistry")
            .field("sources", &self.names())
            .finish()
    }
}

impl FinderRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding every built-in source
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_builtin();
        registry
    }

    /// Register a source factory; names are unique
    pub fn register<F>(&mut self, name: &str, factory: F) -> FinderResult<()>
    where
        F: Fn() -> Box<dyn SubdomainFinder> + Send + Sync + 'static,
    {
        if self.factories.contains_key(name) {
            return Err(FinderError::DuplicateSource(name.to_string()));
        }
        self.factories.insert(name.to_string(), Box::new(factory));
        Ok(())
    }

    /// Build a new, uninitialized instance of `name`
    pub fn instantiate(&self, name: &str) -> FinderResult<Box<dyn SubdomainFinder>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| FinderError::UnknownSource(name.to_string()))
    }

    /// Check if a source exists
    pub fn exists(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted
    pub fn names(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.factories.len()
    }

    fn register_builtin(&mut self) {
        let builtin: Vec<(&str, fn() -> Box<dyn SubdomainFinder>)> = vec![
            (hackertarget::NAME, || Box::new(HackerTarget::new()) as Box<dyn SubdomainFinder>),
            (threatcrowd::NAME, || Box::new(ThreatCrowd::new()) as Box<dyn SubdomainFinder>),
            (sublist3r::NAME, || Box::new(Sublist3r::new()) as Box<dyn SubdomainFinder>),
            (crtsh::NAME, || Box::new(Crtsh::new()) as Box<dyn SubdomainFinder>),
            (abuseipdb::NAME, || Box::new(AbuseIpDb::new()) as Box<dyn SubdomainFinder>),
            (sonarsearch::NAME_SUBDOMAINS, || Box::new(SonarSearchSubdomains::new()) as Box<dyn SubdomainFinder>),
            (sonarsearch::NAME_REVERSE, || Box::new(SonarSearchReverse::new()) as Box<dyn SubdomainFinder>),
        ];
        for (name, factory) in builtin {
            // Built-in names are distinct constants
            self.factories.insert(name.to_string(), Box::new(factory));
        }
    }
}

// Global finder registry instance
pub static FINDER_REGISTRY: Lazy<FinderRegistry> = Lazy::new(FinderRegistry::with_builtin);

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Subdomain Discovery Library
 * Concurrent fan-out of domains and IPs to public subdomain sources
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

pub mod config;
pub mod errors;
pub mod executor;
pub mod http_client;
pub mod input;
pub mod output;
pub mod queriers;
pub mod rate_limiter;
pub mod registry;
pub mod retry;
pub mod sources;
pub mod types;

pub use errors::{FinderError, FinderResult};
pub use executor::{ExecutionHandle, Executor, ExecutorState, GlobalStat};
pub use sources::{dedup_lowercase, SubdomainFinder};
pub use types::{InputKind, OutputRecord, Query, QueryResult, RelationMethod, RelationType};

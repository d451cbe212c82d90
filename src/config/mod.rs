// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

pub mod core;
pub mod loader;
pub mod validation;

pub use self::core::{FinderConfig, RetriesConfig, SourcesConfig};
pub use self::loader::{load_config, parse_config};
pub use self::validation::ConfigValidator;

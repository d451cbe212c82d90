// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use std::path::Path;

use super::core::{FinderConfig, SourcesConfig};
use super::validation::ConfigValidator;

/// Read and validate a YAML sources config
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<SourcesConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;
    parse_config(&content).with_context(|| format!("Invalid config file: {:?}", path))
}

/// Parse and validate; enabled sources without a block get default tuning
pub fn parse_config(content: &str) -> Result<SourcesConfig> {
    let mut config: SourcesConfig =
        serde_yaml::from_str(content).context("Failed to parse YAML config")?;

    ConfigValidator::validate_sources_config(&config)?;

    for name in &config.enabled {
        config
            .sources
            .entry(name.clone())
            .or_insert_with(FinderConfig::default);
    }

    Ok(config)
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

use anyhow::{Context, Result};
use validator::Validate;

use super::core::{FinderConfig, SourcesConfig};

pub struct ConfigValidator;

impl ConfigValidator {
    /// Every given source block is checked, enabled or not
    pub fn validate_sources_config(config: &SourcesConfig) -> Result<()> {
        if config.enabled.is_empty() {
            return Err(anyhow::anyhow!("No enabled sources defined"));
        }

        for (name, finder) in &config.sources {
            Self::validate_finder_config(name, finder)?;
        }

        Ok(())
    }

    pub fn validate_finder_config(name: &str, config: &FinderConfig) -> Result<()> {
        config
            .validate()
            .with_context(|| format!("Invalid config for {}", name))?;

        if config.timeout.is_zero() {
            return Err(anyhow::anyhow!("Invalid timeout for {}", name));
        }

        if config.retries.times > 0 && config.retries.interval.is_zero() {
            return Err(anyhow::anyhow!(
                "Invalid retries interval for {} when retries times is given",
                name
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_default_block_is_valid() {
        assert!(ConfigValidator::validate_finder_config("x", &FinderConfig::default()).is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let cases = vec![
            FinderConfig { qps: 0.0, ..Default::default() },
            FinderConfig { qps: -1.0, ..Default::default() },
            FinderConfig { worker: 0, ..Default::default() },
            FinderConfig { timeout: Duration::ZERO, ..Default::default() },
        ];
        for case in cases {
            assert!(ConfigValidator::validate_finder_config("x", &case).is_err(), "{:?}", case);
        }
    }

    #[test]
    fn test_retries_need_interval() {
        let mut config = FinderConfig::default();
        config.retries.times = 3;
        assert!(ConfigValidator::validate_finder_config("x", &config).is_err());
        config.retries.interval = Duration::from_secs(1);
        assert!(ConfigValidator::validate_finder_config("x", &config).is_ok());
    }
}

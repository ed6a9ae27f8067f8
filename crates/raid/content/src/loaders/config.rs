//! Raid configuration loader.

use std::path::Path;

use raid_core::RaidConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for raid configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate config data from a TOML file.
    ///
    /// Missing fields take their defaults; unknown tiers and zero multipliers are
    /// rejected.
    pub fn load(path: &Path) -> LoadResult<RaidConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<RaidConfig> {
        let config: RaidConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse raid config TOML: {}", e))?;
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid raid config: {}", e))?;

        Ok(config)
    }

    /// Loads `path` when given, otherwise returns the defaults. Environment
    /// overrides are applied either way.
    pub fn load_or_default(path: Option<&Path>) -> LoadResult<RaidConfig> {
        let config = match path {
            Some(path) => Self::load(path)?,
            None => RaidConfig::default(),
        };
        Ok(config.with_env_overrides())
    }
}

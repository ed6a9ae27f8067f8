//! Console configuration read from the environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use raid_content::{BossCatalog, BossLoader, ConfigLoader};
use raid_core::RaidConfig;

/// Boss catalog shipped with the console.
const BUNDLED_BOSSES: &str = include_str!("../../raid/content/data/bosses.ron");

#[derive(Clone, Debug, Default)]
pub struct ConsoleConfig {
    pub config_path: Option<PathBuf>,
    pub bosses_path: Option<PathBuf>,
    pub tick_interval: Option<Duration>,
}

impl ConsoleConfig {
    /// Construct console configuration from environment variables.
    ///
    /// Environment variables:
    /// - `RAID_CONFIG_PATH` - Raid configuration TOML (default: built-in defaults)
    /// - `RAID_BOSSES_PATH` - Boss catalog RON (default: bundled catalog)
    /// - `RAID_TICK_MS` - Tick length in milliseconds (default: 50)
    pub fn from_env() -> Self {
        Self {
            config_path: env::var_os("RAID_CONFIG_PATH").map(PathBuf::from),
            bosses_path: env::var_os("RAID_BOSSES_PATH").map(PathBuf::from),
            tick_interval: read_env::<u64>("RAID_TICK_MS")
                .filter(|ms| *ms > 0)
                .map(Duration::from_millis),
        }
    }

    pub fn load_raid_config(&self) -> Result<RaidConfig> {
        ConfigLoader::load_or_default(self.config_path.as_deref())
    }

    pub fn load_bosses(&self) -> Result<BossCatalog> {
        match &self.bosses_path {
            Some(path) => BossLoader::load_strict(path),
            None => {
                let catalog = BossLoader::parse(BUNDLED_BOSSES)?;
                BossLoader::validate(&catalog)?;
                Ok(catalog)
            }
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

//! Content factory for loading raid data from one directory.

use std::path::{Path, PathBuf};

use raid_core::RaidConfig;

use crate::loaders::{BossCatalog, BossLoader, ConfigLoader, LoadResult};

/// Content factory that loads all raid content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── raid.toml
/// └── bosses.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load raid configuration from `raid.toml`, with environment overrides.
    pub fn load_config(&self) -> LoadResult<RaidConfig> {
        let path = self.data_dir.join("raid.toml");
        ConfigLoader::load_or_default(Some(&path))
    }

    /// Load and validate the boss catalog from `bosses.ron`.
    pub fn load_bosses(&self) -> LoadResult<BossCatalog> {
        let path = self.data_dir.join("bosses.ron");
        BossLoader::load_strict(&path)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

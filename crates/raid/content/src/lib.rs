//! Data-driven raid content and loaders.
//!
//! This crate reads the files a deployment ships with:
//! - Raid configuration (data-driven via TOML)
//! - Boss catalogs with their scripts (data-driven via RON)
//!
//! All loaders use raid-core types directly with serde for RON/TOML deserialization.

pub mod boss;

#[cfg(feature = "loaders")]
pub mod loaders;

pub use boss::BossDefinition;

#[cfg(feature = "loaders")]
pub use loaders::{BossCatalog, BossLoader, ConfigLoader, ContentFactory, LoadResult};

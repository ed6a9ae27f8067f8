//! Boss catalog loader.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::boss::BossDefinition;
use crate::loaders::{LoadResult, read_file};

/// Boss catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BossCatalog {
    pub bosses: Vec<BossDefinition>,
}

impl BossCatalog {
    pub fn find(&self, species: &str) -> Option<&BossDefinition> {
        self.bosses
            .iter()
            .find(|boss| boss.species.eq_ignore_ascii_case(species))
    }
}

/// Loader for boss catalogs from RON files.
pub struct BossLoader;

impl BossLoader {
    /// Load a boss catalog from a RON file.
    ///
    /// Scripts are not checked here; sessions skip malformed entries.
    pub fn load(path: &Path) -> LoadResult<BossCatalog> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<BossCatalog> {
        ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse boss catalog RON: {}", e))
    }

    /// Rejects any catalog whose scripts contain malformed keys or unknown effects.
    pub fn validate(catalog: &BossCatalog) -> LoadResult<()> {
        for boss in &catalog.bosses {
            boss.strict_script_table().map_err(|e| {
                anyhow::anyhow!("Boss `{}` has an invalid script: {}", boss.species, e)
            })?;
        }
        Ok(())
    }

    /// Load and strictly validate a boss catalog.
    pub fn load_strict(path: &Path) -> LoadResult<BossCatalog> {
        let catalog = Self::load(path)?;
        Self::validate(&catalog)?;
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use raid_core::Gender;

    use super::*;

    const CATALOG: &str = r#"(
    bosses: [
        (
            species: "lapras",
            tier: "TIER_FOUR",
            health: 180,
            max_catches: 2,
            script: {
                "turn:0": "SET_RAIN",
                "hp:0.5": "BOSS_DEF_2",
            },
            traits: (shiny: true, ability: "shell_armor", gender: Female, nature: "calm"),
        ),
        (
            species: "snorlax",
            health: 300,
        ),
    ],
)"#;

    #[test]
    fn loads_catalog_with_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(CATALOG.as_bytes()).expect("write catalog");

        let catalog = BossLoader::load_strict(file.path()).expect("catalog loads");
        assert_eq!(catalog.bosses.len(), 2);

        let lapras = catalog.find("LAPRAS").expect("lapras present");
        assert_eq!(lapras.max_catches, 2);
        assert_eq!(lapras.traits.gender, Gender::Female);
        assert_eq!(lapras.strict_script_table().map(|t| t.threshold_entries()), Ok(1));

        let snorlax = catalog.find("snorlax").expect("snorlax present");
        assert_eq!(snorlax.tier, "TIER_ONE");
        assert_eq!(snorlax.max_catches, -1);
        assert!(snorlax.script.is_empty());
    }

    #[test]
    fn strict_validation_rejects_unknown_effects() {
        let catalog = BossLoader::parse(
            r#"(bosses: [(species: "ditto", health: 10, script: {"turn:1": "TRANSFORM"})])"#,
        )
        .expect("catalog parses");

        let error = BossLoader::validate(&catalog).expect_err("unknown effect rejected");
        assert!(error.to_string().contains("ditto"));
    }
}

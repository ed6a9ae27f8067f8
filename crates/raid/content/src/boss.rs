//! Boss definitions.

use std::collections::BTreeMap;

use raid_core::{RaidConfig, RaidSettings, ScriptError, ScriptTable, SpecimenTraits};

/// One raid boss as authored in content files.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BossDefinition {
    pub species: String,
    #[cfg_attr(feature = "serde", serde(default = "default_tier"))]
    pub tier: String,
    /// Unscaled maximum health of one private copy.
    pub health: u32,
    /// Winning rewards handed out; negative means everyone wins.
    #[cfg_attr(feature = "serde", serde(default = "unlimited_catches"))]
    pub max_catches: i32,
    /// `turn:N` / `hp:R` keys mapped to effect names.
    #[cfg_attr(feature = "serde", serde(default))]
    pub script: BTreeMap<String, String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub traits: SpecimenTraits,
}

impl BossDefinition {
    pub fn new(species: impl Into<String>, health: u32) -> Self {
        Self {
            species: species.into(),
            tier: default_tier(),
            health,
            max_catches: unlimited_catches(),
            script: BTreeMap::new(),
            traits: SpecimenTraits::default(),
        }
    }

    pub fn with_tier(mut self, tier: impl Into<String>) -> Self {
        self.tier = tier.into();
        self
    }

    pub fn with_max_catches(mut self, max_catches: i32) -> Self {
        self.max_catches = max_catches;
        self
    }

    pub fn with_script(mut self, key: impl Into<String>, effect: impl Into<String>) -> Self {
        self.script.insert(key.into(), effect.into());
        self
    }

    /// Script table with malformed entries skipped.
    pub fn script_table(&self) -> (ScriptTable, Vec<ScriptError>) {
        ScriptTable::parse_lenient(self.script_entries())
    }

    /// Script table, failing on the first malformed entry.
    pub fn strict_script_table(&self) -> Result<ScriptTable, ScriptError> {
        ScriptTable::parse(self.script_entries())
    }

    pub fn settings(&self, config: &RaidConfig) -> RaidSettings {
        config.raid_settings(&self.tier, self.species.clone(), self.max_catches)
    }

    fn script_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.script
            .iter()
            .map(|(key, effect)| (key.as_str(), effect.as_str()))
    }
}

fn default_tier() -> String {
    raid_core::Tier::default().to_string()
}

fn unlimited_catches() -> i32 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_follow_tier_and_catches() {
        let mut boss = BossDefinition::new("mewtwo", 250);
        boss.tier = "tier_seven".into();
        boss.max_catches = 2;

        let config = RaidConfig::new().with_tier(
            raid_core::Tier::TierSeven,
            raid_core::TierConfig {
                coop_health_multiplier: 20,
                ..Default::default()
            },
        );
        let settings = boss.settings(&config);
        assert_eq!(settings.title, "mewtwo");
        assert_eq!(settings.pool_multiplier, 20);
        assert_eq!(settings.catch_limit, raid_core::CatchLimit::Limited(2));
    }

    #[test]
    fn lenient_table_reports_skipped_entries() {
        let mut boss = BossDefinition::new("mewtwo", 250);
        boss.script.insert("turn:1".into(), "BOSS_SPE_1".into());
        boss.script.insert("hp:abc".into(), "BOSS_SPE_1".into());

        let (table, skipped) = boss.script_table();
        assert_eq!(table.turn_entries(), 1);
        assert_eq!(skipped.len(), 1);
        assert!(boss.strict_script_table().is_err());
    }
}

//! Encounter configuration and the per-session settings derived from it.
use std::collections::BTreeMap;
use std::str::FromStr;

use crate::state::Ticks;

/// Difficulty tier of a boss.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Tier {
    #[default]
    TierOne,
    TierTwo,
    TierThree,
    TierFour,
    TierFive,
    TierSix,
    TierSeven,
}

/// How private-battle damage reaches the shared pool.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum DamageAccounting {
    /// Every health reading is applied as it arrives.
    PerTurn,
    /// Damage is tracked privately and applied when the battle ends.
    #[default]
    OnBattleEnd,
}

/// Tunables for one tier.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TierConfig {
    /// Pool size as a multiple of the boss's unscaled health.
    pub coop_health_multiplier: u32,
    /// Extra pool per participant; 1.0 disables rescaling.
    pub multiplayer_health_multiplier: f32,
    pub max_cheers: u32,
    pub accounting: DamageAccounting,
}

impl TierConfig {
    pub const DEFAULT_COOP_HEALTH_MULTIPLIER: u32 = 8;
    pub const DEFAULT_MULTIPLAYER_HEALTH_MULTIPLIER: f32 = 1.0;
    pub const DEFAULT_MAX_CHEERS: u32 = 3;

    pub fn new() -> Self {
        Self {
            coop_health_multiplier: Self::DEFAULT_COOP_HEALTH_MULTIPLIER,
            multiplayer_health_multiplier: Self::DEFAULT_MULTIPLAYER_HEALTH_MULTIPLIER,
            max_cheers: Self::DEFAULT_MAX_CHEERS,
            accounting: DamageAccounting::default(),
        }
    }

    /// Replaces out-of-range values with defaults.
    pub fn sanitized(mut self) -> Self {
        if self.coop_health_multiplier == 0 {
            self.coop_health_multiplier = Self::DEFAULT_COOP_HEALTH_MULTIPLIER;
        }
        let scaling = self.multiplayer_health_multiplier;
        if !scaling.is_finite() || scaling < 1.0 {
            self.multiplayer_health_multiplier = Self::DEFAULT_MULTIPLAYER_HEALTH_MULTIPLIER;
        }
        self
    }
}

impl Default for TierConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors reported by [`RaidConfig::validate`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown tier `{key}`")]
    UnknownTier { key: String },

    #[error("tier `{tier}` has a zero health multiplier")]
    ZeroMultiplier { tier: String },

    #[error("tier `{tier}` has per-participant scaling {value} (must be finite and >= 1.0)")]
    InvalidScaling { tier: String, value: f32 },

    #[error("raid duration must be at least one second")]
    ZeroDuration,

    #[error("default multiplier must be at least 1")]
    ZeroDefaultMultiplier,
}

/// Encounter-wide configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RaidConfig {
    pub duration_seconds: u32,
    /// Copy the boss's traits onto the reward specimen.
    pub sync_rewards: bool,
    /// Multiplier used by simple-mode sessions started without one.
    pub default_multiplier: u32,
    /// Delay between timer expiry and failure settlement.
    pub timeout_grace_ticks: u32,
    pub tiers: BTreeMap<String, TierConfig>,
}

impl RaidConfig {
    pub const DEFAULT_DURATION_SECONDS: u32 = 600;
    pub const DEFAULT_MULTIPLIER: u32 = 8;
    pub const DEFAULT_TIMEOUT_GRACE_TICKS: u32 = 0;

    /// Ticks between pool exhaustion and success settlement.
    pub const SUCCESS_GRACE_TICKS: u32 = 60;
    /// Ticks between a pool change and the progress refresh.
    pub const REFRESH_DELAY_TICKS: u32 = 20;
    /// Ticks between checks that bound participants are still near the boss.
    pub const PRESENCE_CHECK_TICKS: u32 = 20;

    pub fn new() -> Self {
        Self {
            duration_seconds: Self::DEFAULT_DURATION_SECONDS,
            sync_rewards: true,
            default_multiplier: Self::DEFAULT_MULTIPLIER,
            timeout_grace_ticks: Self::DEFAULT_TIMEOUT_GRACE_TICKS,
            tiers: BTreeMap::new(),
        }
    }

    pub fn with_duration_seconds(mut self, seconds: u32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_tier(mut self, tier: Tier, config: TierConfig) -> Self {
        self.tiers.insert(tier.to_string(), config);
        self
    }

    /// Applies `RAID_DURATION_SECONDS` and `RAID_SYNC_REWARDS` from the process
    /// environment. Unparseable values are ignored.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(seconds) = read_value(&lookup, "RAID_DURATION_SECONDS") {
            self.duration_seconds = seconds;
        }
        if let Some(sync) = read_value(&lookup, "RAID_SYNC_REWARDS") {
            self.sync_rewards = sync;
        }
        self
    }

    pub fn duration(&self) -> Ticks {
        let seconds = if self.duration_seconds == 0 {
            Self::DEFAULT_DURATION_SECONDS
        } else {
            self.duration_seconds
        };
        Ticks::from_seconds(seconds)
    }

    /// Tier settings for `key`, falling back to defaults for unknown tiers.
    pub fn tier(&self, key: &str) -> TierConfig {
        let Ok(tier) = Tier::from_str(key.trim()) else {
            return TierConfig::default();
        };
        self.tiers
            .iter()
            .find(|(name, _)| Tier::from_str(name.trim()).ok() == Some(tier))
            .map(|(_, config)| config.sanitized())
            .unwrap_or_default()
    }

    /// Strict validation used when configuration is loaded from disk.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.duration_seconds == 0 {
            return Err(ConfigError::ZeroDuration);
        }
        if self.default_multiplier == 0 {
            return Err(ConfigError::ZeroDefaultMultiplier);
        }
        for (key, tier) in &self.tiers {
            if Tier::from_str(key.trim()).is_err() {
                return Err(ConfigError::UnknownTier { key: key.clone() });
            }
            if tier.coop_health_multiplier == 0 {
                return Err(ConfigError::ZeroMultiplier { tier: key.clone() });
            }
            let scaling = tier.multiplayer_health_multiplier;
            if !scaling.is_finite() || scaling < 1.0 {
                return Err(ConfigError::InvalidScaling {
                    tier: key.clone(),
                    value: scaling,
                });
            }
        }
        Ok(())
    }

    /// Resolves the settings of a scripted session.
    pub fn raid_settings(
        &self,
        tier: &str,
        title: impl Into<String>,
        max_catches: i32,
    ) -> RaidSettings {
        let tier = self.tier(tier);
        RaidSettings {
            title: title.into(),
            pool_multiplier: tier.coop_health_multiplier,
            per_participant_scaling: tier.multiplayer_health_multiplier,
            max_cheers: tier.max_cheers,
            accounting: tier.accounting,
            catch_limit: CatchLimit::from_raw(max_catches),
            duration: self.duration(),
            sync_rewards: self.sync_rewards,
            timeout_grace: Ticks(self.timeout_grace_ticks),
        }
    }

    /// Resolves the settings of a simple-mode session.
    pub fn coop_settings(
        &self,
        title: impl Into<String>,
        multiplier: Option<u32>,
        duration: Option<Ticks>,
    ) -> CoopSettings {
        CoopSettings {
            title: title.into(),
            multiplier: multiplier.unwrap_or(self.default_multiplier),
            duration: duration
                .filter(|ticks| ticks.0 > 0)
                .unwrap_or_else(|| self.duration()),
            sync_rewards: self.sync_rewards,
            timeout_grace: Ticks(self.timeout_grace_ticks),
        }
    }
}

impl Default for RaidConfig {
    fn default() -> Self {
        Self::new()
    }
}

fn read_value<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

/// How many participants may receive a winning reward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CatchLimit {
    #[default]
    Unlimited,
    Limited(u32),
}

impl CatchLimit {
    /// Negative values mean unlimited.
    pub fn from_raw(raw: i32) -> Self {
        u32::try_from(raw)
            .map(CatchLimit::Limited)
            .unwrap_or(CatchLimit::Unlimited)
    }
}

/// Resolved settings of a scripted session.
#[derive(Clone, Debug, PartialEq)]
pub struct RaidSettings {
    pub title: String,
    pub pool_multiplier: u32,
    pub per_participant_scaling: f32,
    pub max_cheers: u32,
    pub accounting: DamageAccounting,
    pub catch_limit: CatchLimit,
    pub duration: Ticks,
    pub sync_rewards: bool,
    pub timeout_grace: Ticks,
}

impl RaidSettings {
    pub fn new(title: impl Into<String>) -> Self {
        RaidConfig::default().raid_settings(&Tier::default().to_string(), title, -1)
    }

    pub fn with_pool_multiplier(mut self, multiplier: u32) -> Self {
        self.pool_multiplier = multiplier;
        self
    }

    pub fn with_scaling(mut self, scaling: f32) -> Self {
        self.per_participant_scaling = scaling;
        self
    }

    pub fn with_accounting(mut self, accounting: DamageAccounting) -> Self {
        self.accounting = accounting;
        self
    }

    pub fn with_catch_limit(mut self, limit: CatchLimit) -> Self {
        self.catch_limit = limit;
        self
    }

    /// A zero duration keeps the current one.
    pub fn with_duration(mut self, duration: Ticks) -> Self {
        if duration.0 > 0 {
            self.duration = duration;
        }
        self
    }

    pub fn with_max_cheers(mut self, cheers: u32) -> Self {
        self.max_cheers = cheers;
        self
    }

    pub fn with_sync_rewards(mut self, sync: bool) -> Self {
        self.sync_rewards = sync;
        self
    }
}

/// Resolved settings of a simple-mode session.
#[derive(Clone, Debug, PartialEq)]
pub struct CoopSettings {
    pub title: String,
    pub multiplier: u32,
    pub duration: Ticks,
    pub sync_rewards: bool,
    pub timeout_grace: Ticks,
}

impl CoopSettings {
    pub fn new(title: impl Into<String>, multiplier: u32, duration: Ticks) -> Self {
        RaidConfig::default().coop_settings(title, Some(multiplier), Some(duration))
    }
}

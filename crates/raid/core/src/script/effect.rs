use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use strum::IntoEnumIterator;

/// Battle stat targeted by a stage change.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(ascii_case_insensitive)]
pub enum Stat {
    #[strum(serialize = "ATK")]
    Attack,
    #[strum(serialize = "DEF")]
    Defence,
    #[strum(serialize = "SPA")]
    SpecialAttack,
    #[strum(serialize = "SPD")]
    SpecialDefence,
    #[strum(serialize = "SPE")]
    Speed,
    #[strum(serialize = "ACC")]
    Accuracy,
    #[strum(serialize = "EVA")]
    Evasion,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Weather {
    Rain,
    Sandstorm,
    Snow,
    Sun,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE", ascii_case_insensitive)]
pub enum Terrain {
    Electric,
    Grassy,
    Misty,
    Psychic,
}

/// Which side of a private battle an effect lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Side {
    Boss,
    Player,
}

/// An action the boss performs inside a participant's battle.
///
/// Boss stat changes raise the boss; player stat changes lower the participant's
/// active combatant. Stage magnitudes are one or two.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScriptEffect {
    ResetStats(Side),
    BossStat { stat: Stat, stages: i8 },
    PlayerStat { stat: Stat, stages: i8 },
    SetWeather(Weather),
    SetTerrain(Terrain),
}

impl ScriptEffect {
    pub const MAX_STAGES: i8 = 2;

    /// Every effect a script may reference, in catalog order.
    pub fn catalog() -> Vec<ScriptEffect> {
        let mut effects = vec![
            ScriptEffect::ResetStats(Side::Boss),
            ScriptEffect::ResetStats(Side::Player),
        ];
        for stat in Stat::iter() {
            for stages in 1..=Self::MAX_STAGES {
                effects.push(ScriptEffect::BossStat { stat, stages });
            }
        }
        for stat in Stat::iter() {
            for stages in 1..=Self::MAX_STAGES {
                effects.push(ScriptEffect::PlayerStat {
                    stat,
                    stages: -stages,
                });
            }
        }
        effects.extend(Weather::iter().map(ScriptEffect::SetWeather));
        effects.extend(Terrain::iter().map(ScriptEffect::SetTerrain));
        effects
    }

    /// Resolves a symbolic name such as `BOSS_ATK_2` or `SET_GRASSY_TERRAIN`.
    pub fn lookup(name: &str) -> Option<ScriptEffect> {
        static CATALOG: OnceLock<HashMap<String, ScriptEffect>> = OnceLock::new();
        let catalog = CATALOG.get_or_init(|| {
            Self::catalog()
                .into_iter()
                .map(|effect| (effect.to_string(), effect))
                .collect()
        });
        catalog.get(&name.trim().to_ascii_uppercase()).copied()
    }

    pub fn side(&self) -> Option<Side> {
        match self {
            ScriptEffect::ResetStats(side) => Some(*side),
            ScriptEffect::BossStat { .. } => Some(Side::Boss),
            ScriptEffect::PlayerStat { .. } => Some(Side::Player),
            ScriptEffect::SetWeather(_) | ScriptEffect::SetTerrain(_) => None,
        }
    }
}

impl fmt::Display for ScriptEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScriptEffect::ResetStats(side) => write!(f, "RESET_{side}"),
            ScriptEffect::BossStat { stat, stages } => write!(f, "BOSS_{stat}_{stages}"),
            ScriptEffect::PlayerStat { stat, stages } => {
                write!(f, "PLAYER_{stat}_{}", stages.unsigned_abs())
            }
            ScriptEffect::SetWeather(weather) => write!(f, "SET_{weather}"),
            ScriptEffect::SetTerrain(terrain) => write!(f, "SET_{terrain}_TERRAIN"),
        }
    }
}

impl FromStr for ScriptEffect {
    type Err = UnknownEffect;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScriptEffect::lookup(s).ok_or_else(|| UnknownEffect(s.to_owned()))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown script effect `{0}`")]
pub struct UnknownEffect(pub String);

/// Assist a participant can trigger with one of their cheers.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Cheer {
    Attack,
    Defense,
    Heal,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_names_round_trip_through_lookup() {
        let catalog = ScriptEffect::catalog();
        assert_eq!(catalog.len(), 2 + 14 + 14 + 4 + 4);
        for effect in catalog {
            assert_eq!(ScriptEffect::lookup(&effect.to_string()), Some(effect));
        }
    }

    #[test]
    fn well_known_names_resolve() {
        assert_eq!(
            ScriptEffect::lookup("BOSS_ATK_2"),
            Some(ScriptEffect::BossStat {
                stat: Stat::Attack,
                stages: 2
            })
        );
        assert_eq!(
            ScriptEffect::lookup("player_spe_1"),
            Some(ScriptEffect::PlayerStat {
                stat: Stat::Speed,
                stages: -1
            })
        );
        assert_eq!(
            ScriptEffect::lookup("SET_GRASSY_TERRAIN"),
            Some(ScriptEffect::SetTerrain(Terrain::Grassy))
        );
        assert_eq!(
            ScriptEffect::lookup("SET_SANDSTORM"),
            Some(ScriptEffect::SetWeather(Weather::Sandstorm))
        );
        assert_eq!(
            ScriptEffect::lookup("RESET_PLAYER"),
            Some(ScriptEffect::ResetStats(Side::Player))
        );
    }

    #[test]
    fn unknown_names_are_rejected() {
        assert!(ScriptEffect::lookup("BOSS_ATK_3").is_none());
        assert!("SET_HAIL".parse::<ScriptEffect>().is_err());
    }
}

use std::collections::BTreeMap;
use std::str::FromStr;

use super::ScriptEffect;

/// Errors produced while parsing script entries.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ScriptError {
    #[error("malformed script key `{key}` (expected `turn:N` or `hp:R`)")]
    MalformedKey { key: String },

    #[error("script key `{key}` has a threshold outside [0, 1]")]
    ThresholdOutOfRange { key: String },

    #[error("script key `{key}` names unknown effect `{effect}`")]
    UnknownEffect { key: String, effect: String },
}

/// When a script entry fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScriptTrigger {
    Turn(u32),
    Threshold(f64),
}

impl FromStr for ScriptTrigger {
    type Err = ScriptError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let malformed = || ScriptError::MalformedKey {
            key: key.to_owned(),
        };
        let (kind, value) = key.trim().split_once(':').ok_or_else(malformed)?;
        let value = value.trim();

        match kind.trim().to_ascii_lowercase().as_str() {
            "turn" => value
                .parse::<u32>()
                .map(ScriptTrigger::Turn)
                .map_err(|_| malformed()),
            "hp" => {
                let ratio = value.parse::<f64>().map_err(|_| malformed())?;
                if !(0.0..=1.0).contains(&ratio) {
                    return Err(ScriptError::ThresholdOutOfRange {
                        key: key.to_owned(),
                    });
                }
                Ok(ScriptTrigger::Threshold(ratio))
            }
            _ => Err(malformed()),
        }
    }
}

/// Turn-indexed and threshold-indexed script entries of one session.
///
/// Turn entries are consumed when fired, except turn 0 which every joining
/// battle receives. Threshold entries are kept sorted from highest to lowest and
/// removed as the shared pool crosses them.
#[derive(Clone, Debug, Default)]
pub struct ScriptTable {
    by_turn: BTreeMap<u32, ScriptEffect>,
    by_threshold: Vec<(f64, ScriptEffect)>,
}

impl ScriptTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every entry, failing on the first bad key or effect name.
    pub fn parse<'a, I>(entries: I) -> Result<Self, ScriptError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self::new();
        for (key, name) in entries {
            let (trigger, effect) = parse_entry(key, name)?;
            table.insert(trigger, effect);
        }
        Ok(table)
    }

    /// Parses what it can and hands back the entries it had to skip.
    pub fn parse_lenient<'a, I>(entries: I) -> (Self, Vec<ScriptError>)
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut table = Self::new();
        let mut skipped = Vec::new();
        for (key, name) in entries {
            match parse_entry(key, name) {
                Ok((trigger, effect)) => table.insert(trigger, effect),
                Err(error) => skipped.push(error),
            }
        }
        (table, skipped)
    }

    pub fn insert(&mut self, trigger: ScriptTrigger, effect: ScriptEffect) {
        match trigger {
            ScriptTrigger::Turn(turn) => {
                self.by_turn.insert(turn, effect);
            }
            ScriptTrigger::Threshold(ratio) => {
                self.by_threshold.retain(|(existing, _)| *existing != ratio);
                let at = self
                    .by_threshold
                    .iter()
                    .position(|(existing, _)| *existing < ratio)
                    .unwrap_or(self.by_threshold.len());
                self.by_threshold.insert(at, (ratio, effect));
            }
        }
    }

    /// Drops thresholds the pool already sits below, so they never fire.
    pub fn discard_thresholds_above(&mut self, ratio: f64) {
        self.by_threshold.retain(|(threshold, _)| ratio >= *threshold);
    }

    /// Effect every new battle receives on entry. Not consumed.
    pub fn opening(&self) -> Option<ScriptEffect> {
        self.by_turn.get(&0).copied()
    }

    /// Consumes the entry for `turn`. Turn 0 is never consumed.
    pub fn take_turn(&mut self, turn: u32) -> Option<ScriptEffect> {
        if turn == 0 {
            return self.opening();
        }
        self.by_turn.remove(&turn)
    }

    /// Removes and returns every threshold at or above `ratio`, highest first.
    pub fn take_crossed(&mut self, ratio: f64) -> Vec<ScriptEffect> {
        let split = self
            .by_threshold
            .iter()
            .position(|(threshold, _)| *threshold < ratio)
            .unwrap_or(self.by_threshold.len());
        self.by_threshold
            .drain(..split)
            .map(|(_, effect)| effect)
            .collect()
    }

    pub fn turn_entries(&self) -> usize {
        self.by_turn.len()
    }

    pub fn threshold_entries(&self) -> usize {
        self.by_threshold.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_turn.is_empty() && self.by_threshold.is_empty()
    }
}

fn parse_entry(key: &str, name: &str) -> Result<(ScriptTrigger, ScriptEffect), ScriptError> {
    let trigger = key.parse::<ScriptTrigger>()?;
    let effect = ScriptEffect::lookup(name).ok_or_else(|| ScriptError::UnknownEffect {
        key: key.to_owned(),
        effect: name.to_owned(),
    })?;
    Ok((trigger, effect))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::{Stat, Weather};

    fn sample() -> ScriptTable {
        ScriptTable::parse([
            ("turn:0", "SET_RAIN"),
            ("turn:3", "BOSS_ATK_1"),
            ("hp:0.5", "BOSS_DEF_2"),
            ("hp:0.75", "PLAYER_SPE_1"),
            ("hp:0.25", "RESET_PLAYER"),
        ])
        .expect("sample script parses")
    }

    #[test]
    fn parses_keys() {
        assert_eq!("turn:4".parse(), Ok(ScriptTrigger::Turn(4)));
        assert_eq!("hp:0.5".parse(), Ok(ScriptTrigger::Threshold(0.5)));
        assert!(matches!(
            "hp:1.5".parse::<ScriptTrigger>(),
            Err(ScriptError::ThresholdOutOfRange { .. })
        ));
        assert!(matches!(
            "round:1".parse::<ScriptTrigger>(),
            Err(ScriptError::MalformedKey { .. })
        ));
        assert!(matches!(
            "turn:-1".parse::<ScriptTrigger>(),
            Err(ScriptError::MalformedKey { .. })
        ));
    }

    #[test]
    fn turn_entries_fire_once_and_only_on_their_turn() {
        let mut table = sample();
        assert_eq!(table.take_turn(2), None);
        assert_eq!(
            table.take_turn(3),
            Some(ScriptEffect::BossStat {
                stat: Stat::Attack,
                stages: 1
            })
        );
        assert_eq!(table.take_turn(3), None);
    }

    #[test]
    fn opening_entry_is_never_consumed() {
        let mut table = sample();
        let rain = Some(ScriptEffect::SetWeather(Weather::Rain));
        assert_eq!(table.take_turn(0), rain);
        assert_eq!(table.take_turn(0), rain);
        assert_eq!(table.opening(), rain);
    }

    #[test]
    fn thresholds_fire_once_when_crossed() {
        let mut table = sample();
        assert!(table.take_crossed(0.8).is_empty());

        let crossed = table.take_crossed(0.5);
        assert_eq!(crossed.len(), 2);
        assert_eq!(crossed[0].to_string(), "PLAYER_SPE_1");
        assert_eq!(crossed[1].to_string(), "BOSS_DEF_2");

        assert!(table.take_crossed(0.4).is_empty());
        assert_eq!(table.take_crossed(0.0).len(), 1);
        assert_eq!(table.threshold_entries(), 0);
    }

    #[test]
    fn lenient_parse_skips_bad_entries() {
        let (table, skipped) = ScriptTable::parse_lenient([
            ("turn:1", "BOSS_SPA_1"),
            ("turn:x", "BOSS_SPA_1"),
            ("hp:0.3", "SUMMON_MINIONS"),
        ]);
        assert_eq!(table.turn_entries(), 1);
        assert_eq!(skipped.len(), 2);
        assert!(matches!(skipped[1], ScriptError::UnknownEffect { .. }));
    }

    #[test]
    fn strict_parse_rejects_unknown_effects() {
        let result = ScriptTable::parse([("turn:1", "BOSS_ATK_9")]);
        assert!(matches!(result, Err(ScriptError::UnknownEffect { .. })));
    }

    #[test]
    fn thresholds_above_start_ratio_are_discarded() {
        let mut table = sample();
        table.discard_thresholds_above(0.6);
        assert_eq!(table.threshold_entries(), 2);
        assert_eq!(table.take_crossed(0.5).len(), 1);
    }
}

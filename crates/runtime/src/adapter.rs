//! Translation of combat-engine health reports into session calls.
//!
//! The engine reports every health change of a private boss copy as text. The
//! director parses it here and decides whether a faint may stand.

use raid_core::{ActorId, BattleId, ParticipantId};

/// Whether a health report lowers or raises the boss copy's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum CombatEventKind {
    Damage,
    Heal,
}

/// One health report from a private battle.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatEvent {
    pub participant: ParticipantId,
    pub battle: BattleId,
    /// The boss actor the battle is fought against.
    pub opponent: ActorId,
    /// `"h"` or `"h/max"`.
    pub health_text: String,
    pub kind: CombatEventKind,
}

impl CombatEvent {
    pub fn damage(
        participant: ParticipantId,
        battle: BattleId,
        opponent: ActorId,
        health_text: impl Into<String>,
    ) -> Self {
        Self {
            participant,
            battle,
            opponent,
            health_text: health_text.into(),
            kind: CombatEventKind::Damage,
        }
    }

    pub fn heal(
        participant: ParticipantId,
        battle: BattleId,
        opponent: ActorId,
        health_text: impl Into<String>,
    ) -> Self {
        Self {
            kind: CombatEventKind::Heal,
            ..Self::damage(participant, battle, opponent, health_text)
        }
    }

    pub fn health(&self) -> Option<f32> {
        parse_health(&self.health_text)
    }
}

/// What the combat engine must do with a fainted boss copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FaintVerdict {
    /// Keep the copy alive at `restore_to`; the shared pool still has health.
    Suppress { restore_to: f32 },
    /// The pool is exhausted; the faint may stand.
    Allow,
}

impl FaintVerdict {
    pub fn is_allowed(&self) -> bool {
        matches!(self, FaintVerdict::Allow)
    }
}

/// Parses `"h"` or `"h/max"`. Negative or non-numeric health yields `None`.
pub fn parse_health(text: &str) -> Option<f32> {
    let mut parts = text.trim().splitn(2, '/');
    let health: f32 = parts.next()?.trim().parse().ok()?;
    if let Some(max) = parts.next() {
        max.trim().parse::<f32>().ok()?;
    }
    (health.is_finite() && health >= 0.0).then_some(health)
}

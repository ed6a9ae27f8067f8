//! The opponent actor as seen by a session.
//!
//! The actor lives in the host world; sessions only hold its [`ActorId`](crate::ActorId)
//! and borrow it through [`BossActor`] while ticking or settling.

use crate::state::ParticipantId;

/// Health at or below which the actor counts as suppressed (kept alive by the gate).
pub const SUPPRESSED_HEALTH: f32 = 1.0;

#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display, strum::EnumString,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Gender {
    Male,
    Female,
    #[default]
    Genderless,
}

/// Cosmetic and genetic traits copied from the boss onto a reward specimen.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SpecimenTraits {
    pub species: String,
    pub shiny: bool,
    pub ability: String,
    pub gender: Gender,
    pub nature: String,
}

/// Host-world view of the opponent actor.
pub trait BossActor {
    fn health(&self) -> f32;

    fn set_health(&mut self, health: f32);

    /// Lifts the death gate so the world may let the actor die.
    fn allow_death(&mut self);

    fn traits(&self) -> SpecimenTraits;

    /// Whether `participant` is in the same world as the actor.
    fn shares_world_with(&self, _participant: ParticipantId) -> bool {
        true
    }
}

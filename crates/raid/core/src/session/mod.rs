//! Session coordinators.
//!
//! [`RaidSession`] runs the scripted, scaling encounter bound to one boss actor.
//! [`CoopSession`] runs the simplified encounter where each private victory removes
//! one flat share of the pool. Both report through the same [`Encounter`] surface
//! so the runtime can tick and settle them uniformly.
mod scripted;
mod settlement;
mod simple;

pub use scripted::RaidSession;
pub use settlement::{Settlement, SettlementOutcome, split_by_catch_limit};
pub use simple::CoopSession;

use crate::actor::BossActor;
use crate::event::Outbox;
use crate::state::{ActorId, ParticipantId, SessionId};

/// Which coordinator runs a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SessionMode {
    Scripted,
    Simple,
}

/// How a private battle ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum BattleOutcome {
    Victory,
    Fled,
    Lost,
}

/// Snapshot answered to status queries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SessionStatus {
    pub id: SessionId,
    pub mode: SessionMode,
    pub boss: ActorId,
    pub title: String,
    pub current: f32,
    pub max: f32,
    pub init_max: f32,
    pub multiplier: u32,
    pub remaining_seconds: u32,
    pub participants: usize,
    pub active: bool,
}

impl SessionStatus {
    pub fn ratio(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }
}

/// `active` and `ended` flags of a session. Ending is permanent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lifecycle {
    active: bool,
    ended: bool,
}

impl Lifecycle {
    pub fn started() -> Self {
        Self {
            active: true,
            ended: false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Returns false if the lifecycle had already ended.
    pub fn end(&mut self) -> bool {
        let first = !self.ended;
        self.active = false;
        self.ended = true;
        first
    }
}

/// Operations shared by both coordinators.
pub trait Encounter {
    fn id(&self) -> SessionId;

    fn mode(&self) -> SessionMode;

    fn boss(&self) -> ActorId;

    fn roster(&self) -> &[ParticipantId];

    fn status(&self) -> SessionStatus;

    /// One server tick.
    fn tick(&mut self, boss: &mut dyn BossActor, out: &mut Outbox);

    /// Ends the session. Returns false when it had already ended.
    fn settle(
        &mut self,
        outcome: SettlementOutcome,
        boss: &mut dyn BossActor,
        out: &mut Outbox,
    ) -> bool;

    fn has_ended(&self) -> bool;
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::actor::{BossActor, Gender, SpecimenTraits};
    use crate::state::ParticipantId;

    /// Boss actor double recording what sessions did to it.
    #[derive(Debug)]
    pub struct TestBoss {
        pub health: f32,
        pub death_allowed: bool,
        pub traits: SpecimenTraits,
        /// Participants outside the boss's world.
        pub away: Vec<ParticipantId>,
    }

    impl TestBoss {
        pub fn new(health: f32) -> Self {
            Self {
                health,
                death_allowed: false,
                traits: SpecimenTraits {
                    species: "lapras".into(),
                    shiny: true,
                    ability: "shell_armor".into(),
                    gender: Gender::Female,
                    nature: "modest".into(),
                },
                away: Vec::new(),
            }
        }
    }

    impl BossActor for TestBoss {
        fn health(&self) -> f32 {
            self.health
        }

        fn set_health(&mut self, health: f32) {
            self.health = health;
        }

        fn allow_death(&mut self) {
            self.death_allowed = true;
        }

        fn traits(&self) -> SpecimenTraits {
            self.traits.clone()
        }

        fn shares_world_with(&self, participant: ParticipantId) -> bool {
            !self.away.contains(&participant)
        }
    }
}

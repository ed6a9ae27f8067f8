//! Interfaces to the systems a raid drives but does not own.
//!
//! Sessions describe what should happen as [`RaidEvent`](raid_core::RaidEvent)s; the
//! [`Dispatcher`] hands each one to the matching collaborator. A failing call is
//! handled according to the collaborator's [`DispatchCriticality`] and never stops
//! the rest of the outbox.

mod dispatch;
mod logging;
mod memory;

pub use dispatch::Dispatcher;
pub use logging::LogSink;
pub use memory::{InMemoryWorld, Location, MemoryBoss};

use raid_core::{
    ActorId, BattleCommand, BattleId, BossActor, Notice, ParticipantId, SessionId, SpecimenTraits,
};
use raid_content::BossDefinition;

use crate::api::CollaboratorError;

pub type CollaboratorResult = std::result::Result<(), CollaboratorError>;

/// Defines how a collaborator failure is handled during dispatch.
///
/// - Critical failures are logged as errors and returned to the caller
/// - Important failures are logged as errors
/// - Optional failures are logged at debug level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchCriticality {
    /// Failure is reported back to whoever triggered the dispatch.
    ///
    /// Use for side effects players would lose (rewards).
    Critical,

    /// Failure is logged but dispatch continues.
    Important,

    /// Failure is expected now and then and only logged at debug level.
    ///
    /// Use for cosmetic updates (progress bars, titles).
    Optional,
}

impl DispatchCriticality {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::Important => "important",
            Self::Optional => "optional",
        }
    }
}

/// Progress bar, chat and per-participant boss health display.
pub trait DisplaySink: Send {
    fn name(&self) -> &'static str {
        "display"
    }

    fn criticality(&self) -> DispatchCriticality {
        DispatchCriticality::Optional
    }

    fn sync_health(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        ratio: f32,
    ) -> CollaboratorResult;

    fn progress(&mut self, session: SessionId, ratio: f32) -> CollaboratorResult;

    fn title(&mut self, session: SessionId, text: &str) -> CollaboratorResult;

    fn bind(&mut self, session: SessionId, participant: ParticipantId) -> CollaboratorResult;

    fn unbind(&mut self, session: SessionId, participant: ParticipantId) -> CollaboratorResult;

    fn hide(&mut self, session: SessionId) -> CollaboratorResult;

    fn notify(&mut self, participant: ParticipantId, notice: &Notice) -> CollaboratorResult;
}

/// The turn-based combat engine hosting private battles.
pub trait BattleGateway: Send {
    fn name(&self) -> &'static str {
        "battles"
    }

    fn criticality(&self) -> DispatchCriticality {
        DispatchCriticality::Important
    }

    fn enqueue(&mut self, battle: BattleId, command: &BattleCommand) -> CollaboratorResult;

    fn stop(&mut self, battle: BattleId) -> CollaboratorResult;
}

/// Reward generation and delivery.
pub trait RewardGranter: Send {
    fn name(&self) -> &'static str {
        "rewards"
    }

    fn criticality(&self) -> DispatchCriticality {
        DispatchCriticality::Critical
    }

    fn grant_reward(
        &mut self,
        participant: ParticipantId,
        won: bool,
        specimen: Option<&SpecimenTraits>,
    ) -> CollaboratorResult;
}

/// The entity world hosting boss actors.
pub trait ActorWorld: Send {
    /// Spawns the visual boss actor for `boss` at `location`.
    fn spawn_boss(
        &mut self,
        boss: &BossDefinition,
        location: &Location,
    ) -> std::result::Result<ActorId, CollaboratorError>;

    fn boss(&self, actor: ActorId) -> Option<&dyn BossActor>;

    fn boss_mut(&mut self, actor: ActorId) -> Option<&mut dyn BossActor>;

    fn contains(&self, actor: ActorId) -> bool {
        self.boss(actor).is_some()
    }
}

/// Everything a director needs from the host.
pub struct Collaborators {
    pub display: Box<dyn DisplaySink>,
    pub battles: Box<dyn BattleGateway>,
    pub rewards: Box<dyn RewardGranter>,
    pub world: Box<dyn ActorWorld>,
}

impl Collaborators {
    pub fn new(
        display: impl DisplaySink + 'static,
        battles: impl BattleGateway + 'static,
        rewards: impl RewardGranter + 'static,
        world: impl ActorWorld + 'static,
    ) -> Self {
        Self {
            display: Box::new(display),
            battles: Box::new(battles),
            rewards: Box::new(rewards),
            world: Box::new(world),
        }
    }

    /// Logs every display, battle and reward call and keeps bosses in memory.
    pub fn logging() -> Self {
        Self::new(LogSink, LogSink, LogSink, InMemoryWorld::new())
    }
}

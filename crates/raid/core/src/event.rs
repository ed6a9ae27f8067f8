//! Everything a session asks its collaborators to do.
//!
//! Sessions never call the display, the combat engine or the reward system
//! directly; each operation appends [`RaidEvent`]s to an outbox the caller
//! dispatches afterwards.
use crate::actor::SpecimenTraits;
use crate::script::{Cheer, ScriptEffect};
use crate::session::{Settlement, SessionStatus};
use crate::state::{BattleId, ParticipantId};
use crate::timer::TimeWarning;

/// Outbox filled by session operations.
pub type Outbox = Vec<RaidEvent>;

#[derive(Clone, Debug, PartialEq)]
pub enum RaidEvent {
    /// Push the shared ratio to one participant's view of the boss.
    SyncHealth {
        participant: ParticipantId,
        ratio: f32,
    },
    /// Refresh the shared progress bar.
    Progress { ratio: f32 },
    /// Replace the progress bar title.
    Title { text: String },
    DisplayBound { participant: ParticipantId },
    DisplayUnbound { participant: ParticipantId },
    DisplayHidden,
    Notice {
        participant: ParticipantId,
        notice: Notice,
    },
    /// Queue a command into one private battle.
    Battle {
        battle: BattleId,
        command: BattleCommand,
    },
    StopBattle { battle: BattleId },
    Reward {
        participant: ParticipantId,
        won: bool,
        specimen: Option<SpecimenTraits>,
    },
    /// Emitted once, after every other settlement event.
    Settled(Settlement),
}

/// Command injected into a private battle.
#[derive(Clone, Debug, PartialEq)]
pub enum BattleCommand {
    Script(ScriptEffect),
    Cheer {
        cheer: Cheer,
        /// The boss skips its next action in battles receiving a shared cheer.
        skip_enemy_action: bool,
    },
    PlayerJoined {
        newcomer: ParticipantId,
        shared_health: u32,
    },
}

/// Message addressed to a single participant.
#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    Joined,
    Left,
    Status(SessionStatus),
    DamageDealt {
        by: ParticipantId,
        damage: u32,
        current: u32,
        max: u32,
    },
    TimeWarning(TimeWarning),
    Victory { elapsed_seconds: u32 },
    Contributions(Vec<Contribution>),
    /// Time ran out with the pool at `current / max`.
    Defeat { current: u32, max: u32 },
    RaidFailed,
}

/// One line of the simple-mode contribution report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Contribution {
    pub participant: ParticipantId,
    pub defeats: u32,
    pub damage: u32,
}

//! Encounter rules for shared boss raids.
//!
//! `raid-core` holds the coordinators that let many participants fight private
//! copies of one boss while draining a single shared health pool. It never
//! performs I/O: session operations append [`RaidEvent`]s to an [`Outbox`] and the
//! runtime dispatches them to the display, the combat engine and the reward system.
pub mod actor;
pub mod config;
pub mod event;
pub mod health;
pub mod queue;
pub mod script;
pub mod session;
pub mod state;
pub mod timer;

pub use actor::{BossActor, Gender, SUPPRESSED_HEALTH, SpecimenTraits};
pub use config::{
    CatchLimit, ConfigError, CoopSettings, DamageAccounting, RaidConfig, RaidSettings, Tier,
    TierConfig,
};
pub use event::{BattleCommand, Contribution, Notice, Outbox, RaidEvent};
pub use health::{BattleHealthCache, SharedHealthPool};
pub use queue::{ActionQueue, DelayedAction};
pub use script::{
    Cheer, ScriptEffect, ScriptError, ScriptTable, ScriptTrigger, Side, Stat, Terrain, Weather,
};
pub use session::{
    BattleOutcome, CoopSession, Encounter, Lifecycle, RaidSession, SessionMode, SessionStatus,
    Settlement, SettlementOutcome,
};
pub use state::{ActorId, BattleId, ParticipantId, SessionId, Ticks};
pub use timer::{Countdown, TimeWarning, format_clock};

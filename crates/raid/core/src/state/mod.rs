//! Identifiers and time units shared by every encounter type.
mod types;

pub use types::{ActorId, BattleId, ParticipantId, SessionId, Ticks};

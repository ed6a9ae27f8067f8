//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from worker coordination, admin validation, and collaborator
//! calls so clients can bubble them up with consistent context.
use thiserror::Error;
use tokio::sync::oneshot;

use raid_core::{ActorId, BattleId, ConfigError, ParticipantId, SessionId};

use crate::admin::{MAX_DURATION_SECONDS, MAX_MULTIPLIER, MIN_DURATION_SECONDS, MIN_MULTIPLIER};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("tick worker command channel closed")]
    CommandChannelClosed,

    #[error("tick worker reply channel closed")]
    ReplyChannelClosed(#[source] oneshot::error::RecvError),

    #[error("tick worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),

    #[error("a raid is already active ({0})")]
    RaidAlreadyActive(SessionId),

    #[error("no active raid")]
    NoActiveRaid,

    #[error("unknown session {0}")]
    UnknownSession(SessionId),

    #[error("unknown boss actor {0}")]
    UnknownActor(ActorId),

    #[error("{participant} is already in {session}")]
    AlreadyJoined {
        participant: ParticipantId,
        session: SessionId,
    },

    #[error("{0} is not in a raid")]
    NotJoined(ParticipantId),

    #[error("{battle} already belongs to {session}")]
    BattleTaken { battle: BattleId, session: SessionId },

    #[error("scripted raids need a battle to join")]
    BattleRequired,

    #[error(
        "multiplier {0} out of range ({min}..={max})",
        min = MIN_MULTIPLIER,
        max = MAX_MULTIPLIER
    )]
    InvalidMultiplier(u32),

    #[error(
        "duration {0}s out of range ({min}..={max}s)",
        min = MIN_DURATION_SECONDS,
        max = MAX_DURATION_SECONDS
    )]
    InvalidDuration(u32),

    #[error("invalid raid configuration")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

/// Failure reported by the display, combat engine, reward system or world.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("{0} is unavailable")]
    Unavailable(&'static str),

    #[error("{collaborator} rejected the request: {reason}")]
    Rejected {
        collaborator: &'static str,
        reason: String,
    },
}

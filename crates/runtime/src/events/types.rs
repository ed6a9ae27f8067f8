//! Event types that do not come from a session outbox.

use raid_core::{ActorId, SessionId, SessionMode};

/// Session creation and removal.
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Started {
        session: SessionId,
        mode: SessionMode,
        boss: ActorId,
    },
    /// The session left the registry. Published exactly once per session.
    Removed { session: SessionId },
}

impl LifecycleEvent {
    pub fn session(&self) -> SessionId {
        match self {
            LifecycleEvent::Started { session, .. } | LifecycleEvent::Removed { session } => {
                *session
            }
        }
    }
}

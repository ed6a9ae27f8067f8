//! Routes session outboxes to collaborators and the event bus.

use raid_core::{RaidEvent, SessionId};
use tracing::{debug, error};

use super::{CollaboratorResult, Collaborators, DispatchCriticality};
use crate::api::CollaboratorError;
use crate::events::{Event, EventBus};

/// Hands every outbox entry to its collaborator, then publishes it.
pub struct Dispatcher<'a> {
    collaborators: &'a mut Collaborators,
    bus: &'a EventBus,
}

impl<'a> Dispatcher<'a> {
    pub fn new(collaborators: &'a mut Collaborators, bus: &'a EventBus) -> Self {
        Self { collaborators, bus }
    }

    /// Dispatches `events` in order.
    ///
    /// # Error Handling
    ///
    /// Failures are handled based on the collaborator's criticality:
    /// - `Critical`: Logged as error; the first one is returned after the whole
    ///   outbox has been dispatched
    /// - `Important`: Logged as error
    /// - `Optional`: Logged at debug level
    pub fn dispatch(
        &mut self,
        session: SessionId,
        events: Vec<RaidEvent>,
    ) -> Result<(), CollaboratorError> {
        let mut critical = None;

        for event in events {
            let (name, criticality, result) = self.deliver(session, &event);
            if let Err(error) = result
                && let Err(error) = handle_failure(session, name, criticality, error)
            {
                critical.get_or_insert(error);
            }
            self.bus.publish(Event::Session { session, event });
        }

        critical.map_or(Ok(()), Err)
    }

    fn deliver(
        &mut self,
        session: SessionId,
        event: &RaidEvent,
    ) -> (&'static str, DispatchCriticality, CollaboratorResult) {
        let display = &mut self.collaborators.display;
        let battles = &mut self.collaborators.battles;
        let rewards = &mut self.collaborators.rewards;

        match event {
            RaidEvent::SyncHealth { participant, ratio } => (
                display.name(),
                display.criticality(),
                display.sync_health(session, *participant, *ratio),
            ),
            RaidEvent::Progress { ratio } => (
                display.name(),
                display.criticality(),
                display.progress(session, *ratio),
            ),
            RaidEvent::Title { text } => (
                display.name(),
                display.criticality(),
                display.title(session, text),
            ),
            RaidEvent::DisplayBound { participant } => (
                display.name(),
                display.criticality(),
                display.bind(session, *participant),
            ),
            RaidEvent::DisplayUnbound { participant } => (
                display.name(),
                display.criticality(),
                display.unbind(session, *participant),
            ),
            RaidEvent::DisplayHidden => (
                display.name(),
                display.criticality(),
                display.hide(session),
            ),
            RaidEvent::Notice {
                participant,
                notice,
            } => (
                display.name(),
                display.criticality(),
                display.notify(*participant, notice),
            ),
            RaidEvent::Battle { battle, command } => (
                battles.name(),
                battles.criticality(),
                battles.enqueue(*battle, command),
            ),
            RaidEvent::StopBattle { battle } => (
                battles.name(),
                battles.criticality(),
                battles.stop(*battle),
            ),
            RaidEvent::Reward {
                participant,
                won,
                specimen,
            } => (
                rewards.name(),
                rewards.criticality(),
                rewards.grant_reward(*participant, *won, specimen.as_ref()),
            ),
            RaidEvent::Settled(_) => ("bus", DispatchCriticality::Optional, Ok(())),
        }
    }
}

/// Returns Ok(()) for Important/Optional collaborators, Err for Critical ones.
fn handle_failure(
    session: SessionId,
    collaborator: &'static str,
    criticality: DispatchCriticality,
    error: CollaboratorError,
) -> Result<(), CollaboratorError> {
    match criticality {
        DispatchCriticality::Critical => {
            error!(
                target: "raid::dispatch",
                %session,
                collaborator,
                criticality = criticality.as_str(),
                error = %error,
                "Critical collaborator call failed"
            );
            Err(error)
        }
        DispatchCriticality::Important => {
            error!(
                target: "raid::dispatch",
                %session,
                collaborator,
                criticality = criticality.as_str(),
                error = %error,
                "Collaborator call failed, continuing"
            );
            Ok(())
        }
        DispatchCriticality::Optional => {
            debug!(
                target: "raid::dispatch",
                %session,
                collaborator,
                criticality = criticality.as_str(),
                error = %error,
                "Optional collaborator call failed"
            );
            Ok(())
        }
    }
}

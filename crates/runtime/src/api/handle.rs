//! Cloneable façade for issuing commands to the runtime.
//!
//! [`RaidHandle`] hides channel plumbing and offers async helpers for the admin
//! surface, combat-engine callbacks and event streaming.
use std::collections::HashMap;

use tokio::sync::{broadcast, mpsc, oneshot};

use raid_content::BossDefinition;
use raid_core::{BattleId, BattleOutcome, Cheer, ParticipantId, SessionId, SessionStatus};

use super::errors::{Result, RuntimeError};
use crate::adapter::{CombatEvent, FaintVerdict};
use crate::admin::StartRequest;
use crate::collaborators::Location;
use crate::events::{Event, EventBus, Topic};
use crate::workers::Command;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RaidHandle {
    command_tx: mpsc::Sender<Command>,
    event_bus: EventBus,
}

impl RaidHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>, event_bus: EventBus) -> Self {
        Self {
            command_tx,
            event_bus,
        }
    }

    /// Spawn `boss` at `location` and start a scripted raid
    pub async fn spawn_raid(&self, boss: BossDefinition, location: Location) -> Result<SessionId> {
        self.request(|reply| Command::SpawnRaid {
            boss,
            location,
            reply,
        })
        .await?
    }

    /// Admin `start`; refused while another raid is active
    pub async fn start(&self, request: StartRequest) -> Result<SessionId> {
        self.request(|reply| Command::AdminStart { request, reply }).await?
    }

    /// Join a session; scripted sessions need the participant's battle
    pub async fn join(
        &self,
        session: SessionId,
        participant: ParticipantId,
        battle: Option<BattleId>,
    ) -> Result<()> {
        self.request(|reply| Command::Join {
            session,
            participant,
            battle,
            reply,
        })
        .await?
    }

    /// Bulk-add participants; returns how many joined
    pub async fn add_players(
        &self,
        session: SessionId,
        participants: Vec<ParticipantId>,
    ) -> Result<usize> {
        self.request(|reply| Command::AddPlayers {
            session,
            participants,
            reply,
        })
        .await?
    }

    pub async fn leave(&self, participant: ParticipantId) -> Result<SessionId> {
        self.request(|reply| Command::Leave { participant, reply }).await?
    }

    /// Forward a combat-engine health report
    ///
    /// Faints of a raid boss return a [`FaintVerdict`] the engine must honor.
    pub async fn report(&self, event: CombatEvent) -> Result<Option<FaintVerdict>> {
        self.request(|reply| Command::Combat { event, reply }).await
    }

    pub async fn end_battle(
        &self,
        participant: ParticipantId,
        battle: BattleId,
        outcome: BattleOutcome,
    ) -> Result<()> {
        self.request(|reply| Command::EndBattle {
            participant,
            battle,
            outcome,
            reply,
        })
        .await?
    }

    pub async fn run_turn(&self, battle: BattleId, turn: u32) -> Result<()> {
        self.request(|reply| Command::RunTurn {
            battle,
            turn,
            reply,
        })
        .await?
    }

    /// Spend a cheer; `false` when the participant has none left
    pub async fn cheer(
        &self,
        participant: ParticipantId,
        battle: BattleId,
        cheer: Cheer,
    ) -> Result<bool> {
        self.request(|reply| Command::Cheer {
            participant,
            battle,
            cheer,
            reply,
        })
        .await?
    }

    pub async fn status(&self, session: SessionId) -> Result<SessionStatus> {
        self.request(|reply| Command::Status { session, reply }).await?
    }

    pub async fn statuses(&self) -> Result<Vec<SessionStatus>> {
        self.request(|reply| Command::Statuses { reply }).await
    }

    pub async fn session_for(&self, participant: ParticipantId) -> Result<Option<SessionId>> {
        self.request(|reply| Command::SessionFor { participant, reply }).await
    }

    /// Force-stop a session as a failure
    pub async fn stop(&self, session: SessionId) -> Result<()> {
        self.request(|reply| Command::Stop { session, reply }).await?
    }

    pub async fn stop_all(&self) -> Result<usize> {
        self.request(|reply| Command::StopAll { reply }).await
    }

    /// Run `ticks` ticks immediately
    pub async fn advance(&self, ticks: u32) -> Result<()> {
        self.request(|reply| Command::Advance { ticks, reply }).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Display` - Health sync, progress, titles and notices
    /// - `Topic::Battle` - Commands queued into private battles
    /// - `Topic::Reward` - Granted rewards
    /// - `Topic::Lifecycle` - Session start, settlement and removal
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    pub fn subscribe_multiple(
        &self,
        topics: &[Topic],
    ) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    async fn request<T>(&self, command: impl FnOnce(oneshot::Sender<T>) -> Command) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();

        self.command_tx
            .send(command(reply_tx))
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)?;

        reply_rx.await.map_err(RuntimeError::ReplyChannelClosed)
    }
}

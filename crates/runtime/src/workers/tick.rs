//! Tick worker that owns every raid.
//!
//! Receives commands from [`RaidHandle`](crate::api::RaidHandle), runs them against
//! the [`RaidDirector`], and advances all sessions on a fixed interval.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

use raid_content::BossDefinition;
use raid_core::{BattleId, BattleOutcome, Cheer, ParticipantId, SessionId, SessionStatus};

use crate::adapter::{CombatEvent, FaintVerdict};
use crate::admin::StartRequest;
use crate::api::Result;
use crate::collaborators::Location;
use crate::director::RaidDirector;

/// Commands that can be sent to the tick worker
pub enum Command {
    /// Spawn a boss and start a scripted raid around it.
    SpawnRaid {
        boss: BossDefinition,
        location: Location,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    /// Admin `start`, subject to the single-raid rule.
    AdminStart {
        request: StartRequest,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    Join {
        session: SessionId,
        participant: ParticipantId,
        battle: Option<BattleId>,
        reply: oneshot::Sender<Result<()>>,
    },
    AddPlayers {
        session: SessionId,
        participants: Vec<ParticipantId>,
        reply: oneshot::Sender<Result<usize>>,
    },
    Leave {
        participant: ParticipantId,
        reply: oneshot::Sender<Result<SessionId>>,
    },
    /// Health report from the combat engine.
    Combat {
        event: CombatEvent,
        reply: oneshot::Sender<Option<FaintVerdict>>,
    },
    EndBattle {
        participant: ParticipantId,
        battle: BattleId,
        outcome: BattleOutcome,
        reply: oneshot::Sender<Result<()>>,
    },
    RunTurn {
        battle: BattleId,
        turn: u32,
        reply: oneshot::Sender<Result<()>>,
    },
    Cheer {
        participant: ParticipantId,
        battle: BattleId,
        cheer: Cheer,
        reply: oneshot::Sender<Result<bool>>,
    },
    Status {
        session: SessionId,
        reply: oneshot::Sender<Result<SessionStatus>>,
    },
    Statuses {
        reply: oneshot::Sender<Vec<SessionStatus>>,
    },
    SessionFor {
        participant: ParticipantId,
        reply: oneshot::Sender<Option<SessionId>>,
    },
    Stop {
        session: SessionId,
        reply: oneshot::Sender<Result<()>>,
    },
    StopAll {
        reply: oneshot::Sender<usize>,
    },
    /// Run `ticks` ticks right away, independent of the interval.
    Advance {
        ticks: u32,
        reply: oneshot::Sender<()>,
    },
}

/// Background task that processes raid commands and ticks.
pub struct TickWorker {
    director: RaidDirector,
    command_rx: mpsc::Receiver<Command>,
    tick_interval: Option<Duration>,
}

impl TickWorker {
    /// Creates a new tick worker. `tick_interval` of `None` leaves ticking to
    /// [`Command::Advance`].
    pub fn new(
        director: RaidDirector,
        command_rx: mpsc::Receiver<Command>,
        tick_interval: Option<Duration>,
    ) -> Self {
        Self {
            director,
            command_rx,
            tick_interval,
        }
    }

    /// Main worker loop. Ends once every handle is dropped; remaining raids are
    /// stopped as failures.
    pub async fn run(mut self) {
        let mut interval = self.tick_interval.map(|period| {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            interval
        });

        loop {
            tokio::select! {
                command = self.command_rx.recv() => match command {
                    Some(command) => self.handle_command(command),
                    None => break,
                },
                _ = next_tick(&mut interval) => self.director.tick_all(),
            }
        }

        let stopped = self.director.stop_all();
        info!(target: "raid::director", stopped, "Tick worker stopped");
    }

    fn handle_command(&mut self, command: Command) {
        let director = &mut self.director;
        match command {
            Command::SpawnRaid {
                boss,
                location,
                reply,
            } => {
                let _ = reply.send(director.spawn_raid(&boss, &location));
            }
            Command::AdminStart { request, reply } => {
                let _ = reply.send(director.admin_start(request));
            }
            Command::Join {
                session,
                participant,
                battle,
                reply,
            } => {
                let _ = reply.send(director.join(session, participant, battle));
            }
            Command::AddPlayers {
                session,
                participants,
                reply,
            } => {
                let _ = reply.send(director.add_players(session, &participants));
            }
            Command::Leave { participant, reply } => {
                let _ = reply.send(director.leave(participant));
            }
            Command::Combat { event, reply } => {
                let _ = reply.send(director.handle_combat_event(event));
            }
            Command::EndBattle {
                participant,
                battle,
                outcome,
                reply,
            } => {
                let _ = reply.send(director.end_battle(participant, battle, outcome));
            }
            Command::RunTurn {
                battle,
                turn,
                reply,
            } => {
                let _ = reply.send(director.run_turn(battle, turn));
            }
            Command::Cheer {
                participant,
                battle,
                cheer,
                reply,
            } => {
                let _ = reply.send(director.cheer(participant, battle, cheer));
            }
            Command::Status { session, reply } => {
                let _ = reply.send(director.status(session));
            }
            Command::Statuses { reply } => {
                let _ = reply.send(director.statuses());
            }
            Command::SessionFor { participant, reply } => {
                let _ = reply.send(director.session_for(participant));
            }
            Command::Stop { session, reply } => {
                let _ = reply.send(director.stop(session));
            }
            Command::StopAll { reply } => {
                let _ = reply.send(director.stop_all());
            }
            Command::Advance { ticks, reply } => {
                debug!(target: "raid::director", ticks, "Advancing manually");
                director.advance(ticks);
                let _ = reply.send(());
            }
        }
    }
}

async fn next_tick(interval: &mut Option<Interval>) {
    match interval {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

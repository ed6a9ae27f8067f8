//! Admin commands, one per stdin line.
use anyhow::{Result, anyhow};
use clap::{Parser, Subcommand};

use raid_content::{BossCatalog, BossDefinition};
use raid_core::{
    ActorId, BattleId, BattleOutcome, Cheer, ParticipantId, SessionId, SessionStatus, format_clock,
};
use raid_runtime::{CombatEvent, Location, RaidHandle, RuntimeError, StartRequest};

/// One console line.
#[derive(Parser, Debug)]
#[command(name = "raid", no_binary_name = true)]
pub struct ConsoleLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start a simple-mode raid at the spawn point
    Start {
        species: String,
        #[arg(long)]
        multiplier: Option<u32>,
        /// Duration in seconds
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Start a simple-mode raid at a location
    Startat {
        species: String,
        world: String,
        #[arg(allow_negative_numbers = true)]
        x: f64,
        #[arg(allow_negative_numbers = true)]
        y: f64,
        #[arg(allow_negative_numbers = true)]
        z: f64,
        #[arg(long)]
        multiplier: Option<u32>,
        #[arg(long)]
        duration: Option<u32>,
    },

    /// Start a scripted raid at the spawn point
    Raid { species: String },

    /// Join the active raid, or `--session`
    Join {
        participant: u64,
        /// Private battle; required by scripted raids
        #[arg(long)]
        battle: Option<u64>,
        #[arg(long)]
        session: Option<u64>,
    },

    /// Leave whatever raid the participant is in
    Leave { participant: u64 },

    /// Show one raid, or all of them
    Status { session: Option<u64> },

    /// Stop one raid, or all of them
    Stop { session: Option<u64> },

    /// Add several participants to the active raid
    Addplayers {
        #[arg(required = true)]
        participants: Vec<u64>,
    },

    /// Report the boss copy's health in a private battle (`h` or `h/max`)
    Hit {
        participant: u64,
        battle: u64,
        health: String,
        #[arg(long)]
        heal: bool,
    },

    /// Report that the boss copy fainted
    Faint { participant: u64, battle: u64 },

    /// End a private battle: victory, fled or lost
    End {
        participant: u64,
        battle: u64,
        #[arg(value_parser = parse_outcome)]
        outcome: BattleOutcome,
    },

    /// Run the turn-keyed script entries of a battle
    Turn { battle: u64, turn: u32 },

    /// Spend a cheer: attack, defense or heal
    Cheer {
        participant: u64,
        battle: u64,
        #[arg(value_parser = parse_cheer)]
        cheer: Cheer,
    },

    /// Advance every raid by some ticks
    Tick {
        #[arg(default_value_t = 1)]
        ticks: u32,
    },

    /// List the loaded bosses
    Bosses,

    Quit,
}

pub enum Flow {
    Continue,
    Quit,
}

pub struct Console {
    handle: RaidHandle,
    bosses: BossCatalog,
    spawn: Location,
}

impl Console {
    pub fn new(handle: RaidHandle, bosses: BossCatalog) -> Self {
        Self {
            handle,
            bosses,
            spawn: Location::new("overworld", 0.0, 64.0, 0.0),
        }
    }

    pub async fn execute(&self, command: Command) -> Result<Flow> {
        match command {
            Command::Start {
                species,
                multiplier,
                duration,
            } => {
                let request = StartRequest::coop(self.boss(&species)?, self.spawn.clone());
                self.start(request, multiplier, duration).await?;
            }
            Command::Startat {
                species,
                world,
                x,
                y,
                z,
                multiplier,
                duration,
            } => {
                let location = Location::new(world, x, y, z);
                let request = StartRequest::coop(self.boss(&species)?, location);
                self.start(request, multiplier, duration).await?;
            }
            Command::Raid { species } => {
                let request = StartRequest::scripted(self.boss(&species)?, self.spawn.clone());
                self.start(request, None, None).await?;
            }
            Command::Join {
                participant,
                battle,
                session,
            } => {
                let session = self.resolve(session).await?;
                self.handle
                    .join(session, ParticipantId(participant), battle.map(BattleId))
                    .await?;
                println!("p{participant} joined {session}");
            }
            Command::Leave { participant } => {
                let session = self.handle.leave(ParticipantId(participant)).await?;
                println!("p{participant} left {session}");
            }
            Command::Status { session } => {
                let statuses = match session {
                    Some(id) => vec![self.handle.status(SessionId(id)).await?],
                    None => self.handle.statuses().await?,
                };
                if statuses.is_empty() {
                    println!("no raids");
                }
                for status in &statuses {
                    print_status(status);
                }
            }
            Command::Stop { session } => match session {
                Some(id) => {
                    self.handle.stop(SessionId(id)).await?;
                    println!("stopped raid#{id}");
                }
                None => {
                    let stopped = self.handle.stop_all().await?;
                    println!("stopped {stopped} raid(s)");
                }
            },
            Command::Addplayers { participants } => {
                let session = self.resolve(None).await?;
                let joined = self
                    .handle
                    .add_players(session, participants.into_iter().map(ParticipantId).collect())
                    .await?;
                println!("{joined} participant(s) joined {session}");
            }
            Command::Hit {
                participant,
                battle,
                health,
                heal,
            } => {
                let participant = ParticipantId(participant);
                let boss = self.opponent(participant).await?;
                let event = if heal {
                    CombatEvent::heal(participant, BattleId(battle), boss, health)
                } else {
                    CombatEvent::damage(participant, BattleId(battle), boss, health)
                };
                self.handle.report(event).await?;
            }
            Command::Faint {
                participant,
                battle,
            } => {
                let participant = ParticipantId(participant);
                let boss = self.opponent(participant).await?;
                let event = CombatEvent::damage(participant, BattleId(battle), boss, "0");
                match self.handle.report(event).await? {
                    Some(verdict) => println!("{verdict:?}"),
                    None => println!("ignored"),
                }
            }
            Command::End {
                participant,
                battle,
                outcome,
            } => {
                self.handle
                    .end_battle(ParticipantId(participant), BattleId(battle), outcome)
                    .await?;
            }
            Command::Turn { battle, turn } => {
                self.handle.run_turn(BattleId(battle), turn).await?;
            }
            Command::Cheer {
                participant,
                battle,
                cheer,
            } => {
                let spent = self
                    .handle
                    .cheer(ParticipantId(participant), BattleId(battle), cheer)
                    .await?;
                if !spent {
                    println!("p{participant} has no cheers left");
                }
            }
            Command::Tick { ticks } => self.handle.advance(ticks).await?,
            Command::Bosses => {
                for boss in &self.bosses.bosses {
                    println!("{} ({}, {} hp)", boss.species, boss.tier, boss.health);
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    async fn start(
        &self,
        mut request: StartRequest,
        multiplier: Option<u32>,
        duration: Option<u32>,
    ) -> Result<()> {
        request.multiplier = multiplier;
        request.duration_seconds = duration;
        let session = self.handle.start(request).await?;
        print_status(&self.handle.status(session).await?);
        Ok(())
    }

    fn boss(&self, species: &str) -> Result<BossDefinition> {
        self.bosses
            .find(species)
            .cloned()
            .ok_or_else(|| anyhow!("unknown boss `{species}`"))
    }

    /// `explicit`, or the first raid still running.
    async fn resolve(&self, explicit: Option<u64>) -> Result<SessionId> {
        if let Some(id) = explicit {
            return Ok(SessionId(id));
        }
        self.handle
            .statuses()
            .await?
            .into_iter()
            .find(|status| status.active)
            .map(|status| status.id)
            .ok_or_else(|| RuntimeError::NoActiveRaid.into())
    }

    /// Boss of the participant's raid, or of the active raid.
    async fn opponent(&self, participant: ParticipantId) -> Result<ActorId> {
        let session = match self.handle.session_for(participant).await? {
            Some(session) => session,
            None => self.resolve(None).await?,
        };
        Ok(self.handle.status(session).await?.boss)
    }
}

fn parse_outcome(value: &str) -> std::result::Result<BattleOutcome, String> {
    value
        .parse()
        .map_err(|_| format!("`{value}` is not one of victory, fled, lost"))
}

fn parse_cheer(value: &str) -> std::result::Result<Cheer, String> {
    value
        .parse()
        .map_err(|_| format!("`{value}` is not one of attack, defense, heal"))
}

fn print_status(status: &SessionStatus) {
    println!(
        "{} [{}] {}: {:.0}/{:.0} ({:.0}%), x{}, {} left, {} participant(s)",
        status.id,
        status.mode,
        status.title,
        status.current,
        status.max,
        status.ratio() * 100.0,
        status.multiplier,
        format_clock(status.remaining_seconds),
        status.participants,
    );
}

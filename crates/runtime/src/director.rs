//! Top-level owner of every raid.
//!
//! [`RaidDirector`] holds the session registry, the collaborators and the event
//! bus. Every entry point runs one session operation, dispatches the resulting
//! outbox and removes the session if it ended.

use raid_content::BossDefinition;
use raid_core::{
    ActorId, BattleId, BattleOutcome, BossActor, Cheer, CoopSession, DamageAccounting, Encounter,
    Outbox, ParticipantId, RaidConfig, RaidSession, SessionId, SessionMode, SessionStatus,
    SettlementOutcome, SpecimenTraits, Ticks,
};
use tracing::{debug, info, warn};

use crate::adapter::{CombatEvent, CombatEventKind, FaintVerdict};
use crate::admin::StartRequest;
use crate::api::{Result, RuntimeError};
use crate::collaborators::{Collaborators, Dispatcher, Location};
use crate::events::{Event, EventBus, LifecycleEvent};
use crate::registry::{SessionEntry, SessionRegistry};

/// Stands in for a boss actor that left the world.
#[derive(Debug, Default)]
struct DetachedBoss;

impl BossActor for DetachedBoss {
    fn health(&self) -> f32 {
        0.0
    }

    fn set_health(&mut self, _health: f32) {}

    fn allow_death(&mut self) {}

    fn traits(&self) -> SpecimenTraits {
        SpecimenTraits::default()
    }
}

pub struct RaidDirector {
    config: RaidConfig,
    registry: SessionRegistry,
    collaborators: Collaborators,
    bus: EventBus,
}

impl RaidDirector {
    pub fn new(config: RaidConfig, collaborators: Collaborators, bus: EventBus) -> Self {
        Self {
            config,
            registry: SessionRegistry::new(),
            collaborators,
            bus,
        }
    }

    pub fn config(&self) -> &RaidConfig {
        &self.config
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    /// Current health of a session's boss actor.
    pub fn boss_health(&self, session: SessionId) -> Option<f32> {
        let actor = self.registry.get(session)?.boss();
        self.collaborators
            .world
            .boss(actor)
            .map(|boss| boss.health())
    }

    /// First session that has not ended yet.
    pub fn active_session(&self) -> Option<SessionId> {
        self.registry
            .iter()
            .find(|entry| !entry.has_ended())
            .map(SessionEntry::id)
    }

    pub fn session_for(&self, participant: ParticipantId) -> Option<SessionId> {
        self.registry.session_of_participant(participant)
    }

    /// Starts a scripted raid around an already spawned boss actor.
    pub fn start_raid(&mut self, actor: ActorId, boss: &BossDefinition) -> Result<SessionId> {
        if !self.collaborators.world.contains(actor) {
            return Err(RuntimeError::UnknownActor(actor));
        }
        let (scripts, skipped) = boss.script_table();
        for error in &skipped {
            warn!(
                target: "raid::director",
                species = %boss.species,
                error = %error,
                "Skipping script entry"
            );
        }

        let id = self.registry.allocate_id();
        let session = RaidSession::new(
            id,
            actor,
            boss.health as f32,
            boss.settings(&self.config),
            scripts,
        );
        info!(
            target: "raid::director",
            session = %id,
            %actor,
            species = %boss.species,
            max = session.pool().max(),
            "Scripted raid started"
        );
        self.registry.insert(SessionEntry::Scripted(session));
        self.announce_start(id, SessionMode::Scripted, actor);
        Ok(id)
    }

    /// Spawns the boss actor at `location` and starts a scripted raid around it.
    pub fn spawn_raid(&mut self, boss: &BossDefinition, location: &Location) -> Result<SessionId> {
        let actor = self.collaborators.world.spawn_boss(boss, location)?;
        self.start_raid(actor, boss)
    }

    /// Spawns the boss actor and starts a simple-mode raid.
    pub fn start_coop(
        &mut self,
        boss: &BossDefinition,
        location: &Location,
        multiplier: Option<u32>,
        duration: Option<Ticks>,
    ) -> Result<SessionId> {
        let actor = self.collaborators.world.spawn_boss(boss, location)?;
        let settings = self
            .config
            .coop_settings(boss.species.clone(), multiplier, duration);

        let id = self.registry.allocate_id();
        let session = CoopSession::new(id, actor, boss.health, settings);
        info!(
            target: "raid::director",
            session = %id,
            %actor,
            species = %boss.species,
            %location,
            max = session.pool().max(),
            "Co-op raid started"
        );
        self.registry.insert(SessionEntry::Coop(session));
        self.announce_start(id, SessionMode::Simple, actor);
        Ok(id)
    }

    /// Admin `start`: validates the request and refuses while a raid is running.
    pub fn admin_start(&mut self, request: StartRequest) -> Result<SessionId> {
        request.validate()?;
        if let Some(active) = self.active_session() {
            return Err(RuntimeError::RaidAlreadyActive(active));
        }
        match request.mode {
            SessionMode::Scripted => self.spawn_raid(&request.boss, &request.location),
            SessionMode::Simple => self.start_coop(
                &request.boss,
                &request.location,
                request.multiplier,
                request.duration(),
            ),
        }
    }

    pub fn join(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        battle: Option<BattleId>,
    ) -> Result<()> {
        if let Some(current) = self.registry.session_of_participant(participant)
            && current != session
        {
            return Err(RuntimeError::AlreadyJoined {
                participant,
                session: current,
            });
        }
        if let Some(battle) = battle
            && let Some(owner) = self.registry.session_of_battle(battle)
            && owner != session
        {
            return Err(RuntimeError::BattleTaken {
                battle,
                session: owner,
            });
        }

        let mut out = Outbox::new();
        let entry = self
            .registry
            .get_mut(session)
            .ok_or(RuntimeError::UnknownSession(session))?;
        match entry {
            SessionEntry::Scripted(raid) => {
                let battle = battle.ok_or(RuntimeError::BattleRequired)?;
                raid.join(participant, battle, &mut out);
                self.registry.bind_battle(battle, session);
            }
            SessionEntry::Coop(coop) => {
                if coop.roster().contains(&participant) {
                    return Err(RuntimeError::AlreadyJoined {
                        participant,
                        session,
                    });
                }
                coop.join(participant, &mut out);
            }
        }
        self.registry.bind_participant(participant, session);
        debug!(
            target: "raid::director",
            %session,
            %participant,
            "Participant joined"
        );
        self.flush(session, out)
    }

    /// Admin bulk-add. Returns how many participants joined.
    pub fn add_players(
        &mut self,
        session: SessionId,
        participants: &[ParticipantId],
    ) -> Result<usize> {
        if self.registry.get(session).is_none() {
            return Err(RuntimeError::UnknownSession(session));
        }
        let mut joined = 0;
        for &participant in participants {
            match self.join(session, participant, None) {
                Ok(()) => joined += 1,
                Err(RuntimeError::Collaborator(error)) => {
                    joined += 1;
                    warn!(
                        target: "raid::director",
                        %session,
                        %participant,
                        error = %error,
                        "Participant joined with failed notifications"
                    );
                }
                Err(error) => debug!(
                    target: "raid::director",
                    %session,
                    %participant,
                    error = %error,
                    "Skipping participant"
                ),
            }
        }
        Ok(joined)
    }

    /// Removes the participant's bindings. Their roster place is kept.
    pub fn leave(&mut self, participant: ParticipantId) -> Result<SessionId> {
        let session = self
            .registry
            .session_of_participant(participant)
            .ok_or(RuntimeError::NotJoined(participant))?;

        let mut out = Outbox::new();
        let mut released = Vec::new();
        match self.registry.get_mut(session) {
            Some(SessionEntry::Scripted(raid)) => {
                for battle in raid.battles_of(participant) {
                    raid.leave(participant, battle, &mut out);
                    released.push(battle);
                }
            }
            Some(SessionEntry::Coop(coop)) => coop.leave(participant, &mut out),
            None => return Err(RuntimeError::UnknownSession(session)),
        }
        for battle in released {
            self.registry.unbind_battle(battle);
        }
        self.registry.unbind_participant(participant);
        debug!(
            target: "raid::director",
            %session,
            %participant,
            "Participant left"
        );
        self.flush(session, out)?;
        Ok(session)
    }

    /// Feeds one combat-engine health report into its session.
    ///
    /// Returns a verdict only for faints of the session's boss; the engine must
    /// consult it before finalizing the copy's death.
    pub fn handle_combat_event(&mut self, event: CombatEvent) -> Option<FaintVerdict> {
        let Some(session) = self
            .registry
            .session_of_battle(event.battle)
            .or_else(|| self.registry.session_of_participant(event.participant))
        else {
            debug!(
                target: "raid::adapter",
                battle = %event.battle,
                participant = %event.participant,
                "Ignoring event from unbound battle"
            );
            return None;
        };
        let Some(health) = event.health() else {
            debug!(
                target: "raid::adapter",
                %session,
                text = %event.health_text,
                "Dropping unparseable health report"
            );
            return None;
        };

        let mut out = Outbox::new();
        let verdict = {
            let Self {
                registry,
                collaborators,
                ..
            } = self;
            let entry = registry.get_mut(session)?;
            if entry.boss() != event.opponent {
                debug!(
                    target: "raid::adapter",
                    %session,
                    opponent = %event.opponent,
                    "Ignoring event against another opponent"
                );
                return None;
            }

            match entry {
                SessionEntry::Scripted(raid) => {
                    if health == 0.0 {
                        raid.on_boss_fainted(event.participant, event.battle, &mut out);
                        Some(verdict_for(raid.pool().is_depleted(), raid.pool().init_max()))
                    } else {
                        match (event.kind, raid.settings().accounting) {
                            (CombatEventKind::Damage, DamageAccounting::PerTurn) => raid
                                .ingest_damage(event.participant, event.battle, health, &mut out),
                            _ => raid.track_battle_hp(event.participant, health),
                        }
                        None
                    }
                }
                SessionEntry::Coop(coop) => {
                    if health > 0.0 {
                        return None;
                    }
                    let mut detached = DetachedBoss;
                    let boss: &mut dyn BossActor =
                        match collaborators.world.boss_mut(coop.boss()) {
                            Some(boss) => boss,
                            None => &mut detached,
                        };
                    coop.on_boss_fainted(event.participant, event.battle, boss, &mut out);
                    Some(verdict_for(coop.pool().is_depleted(), coop.pool().init_max()))
                }
            }
        };
        debug!(
            target: "raid::adapter",
            %session,
            participant = %event.participant,
            health,
            ?verdict,
            "Health report applied"
        );
        self.track_binding(session, event.battle, event.participant);

        if let Err(error) = self.flush(session, out) {
            debug!(
                target: "raid::adapter",
                %session,
                error = %error,
                "Combat event dispatch reported a failure"
            );
        }
        verdict
    }

    /// Settles a finished private battle.
    pub fn end_battle(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        outcome: BattleOutcome,
    ) -> Result<()> {
        let session = self
            .registry
            .session_of_battle(battle)
            .or_else(|| self.registry.session_of_participant(participant))
            .ok_or(RuntimeError::NotJoined(participant))?;

        let mut out = Outbox::new();
        {
            let Self {
                registry,
                collaborators,
                ..
            } = self;
            match registry.get_mut(session) {
                Some(SessionEntry::Scripted(raid)) => {
                    raid.end_battle(participant, battle, outcome, &mut out)
                }
                Some(SessionEntry::Coop(coop)) => {
                    let mut detached = DetachedBoss;
                    let boss: &mut dyn BossActor =
                        match collaborators.world.boss_mut(coop.boss()) {
                            Some(boss) => boss,
                            None => &mut detached,
                        };
                    coop.end_battle(participant, battle, outcome, boss, &mut out);
                }
                None => return Err(RuntimeError::UnknownSession(session)),
            }
        }
        self.flush(session, out)
    }

    /// Turn-keyed script entries for one battle. Simple-mode sessions have none.
    pub fn run_turn(&mut self, battle: BattleId, turn: u32) -> Result<()> {
        let Some(session) = self.registry.session_of_battle(battle) else {
            return Ok(());
        };
        let mut out = Outbox::new();
        if let Some(SessionEntry::Scripted(raid)) = self.registry.get_mut(session) {
            raid.run_script_by_turn(battle, turn, &mut out);
        }
        self.flush(session, out)
    }

    /// Spends one of the participant's cheers. Returns false when none are left.
    pub fn cheer(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        cheer: Cheer,
    ) -> Result<bool> {
        let session = self
            .registry
            .session_of_battle(battle)
            .ok_or(RuntimeError::NotJoined(participant))?;
        let mut out = Outbox::new();
        let spent = match self.registry.get_mut(session) {
            Some(SessionEntry::Scripted(raid)) => {
                raid.run_cheer(participant, battle, cheer, &mut out)
            }
            Some(SessionEntry::Coop(_)) => false,
            None => return Err(RuntimeError::UnknownSession(session)),
        };
        self.flush(session, out)?;
        Ok(spent)
    }

    pub fn status(&self, session: SessionId) -> Result<SessionStatus> {
        self.registry
            .get(session)
            .map(SessionEntry::status)
            .ok_or(RuntimeError::UnknownSession(session))
    }

    pub fn statuses(&self) -> Vec<SessionStatus> {
        self.registry.iter().map(SessionEntry::status).collect()
    }

    /// Force-stops a session as a failure.
    pub fn stop(&mut self, session: SessionId) -> Result<()> {
        if self.registry.get(session).is_none() {
            return Err(RuntimeError::UnknownSession(session));
        }
        info!(target: "raid::director", %session, "Stopping raid");
        let out = self.settle(session, SettlementOutcome::Failure);
        self.flush(session, out)
    }

    /// Stops every session. Returns how many were stopped.
    pub fn stop_all(&mut self) -> usize {
        let ids = self.registry.ids();
        for &session in &ids {
            if let Err(error) = self.stop(session) {
                warn!(
                    target: "raid::director",
                    %session,
                    error = %error,
                    "Stop reported a failure"
                );
            }
        }
        ids.len()
    }

    /// Advances every session by one tick.
    pub fn tick_all(&mut self) {
        for session in self.registry.ids() {
            let mut out = Outbox::new();
            {
                let Self {
                    registry,
                    collaborators,
                    ..
                } = self;
                let Some(entry) = registry.get_mut(session) else {
                    continue;
                };
                match collaborators.world.boss_mut(entry.boss()) {
                    Some(boss) => entry.tick(boss, &mut out),
                    None => {
                        warn!(
                            target: "raid::director",
                            %session,
                            actor = %entry.boss(),
                            "Boss actor is gone, failing raid"
                        );
                        entry.settle(SettlementOutcome::Failure, &mut DetachedBoss, &mut out);
                    }
                }
            }
            self.prune_battles(session);
            if let Err(error) = self.flush(session, out) {
                debug!(
                    target: "raid::director",
                    %session,
                    error = %error,
                    "Tick dispatch reported a failure"
                );
            }
        }
    }

    /// Advances every session by `ticks` ticks.
    pub fn advance(&mut self, ticks: u32) {
        for _ in 0..ticks {
            self.tick_all();
        }
    }

    fn settle(&mut self, session: SessionId, outcome: SettlementOutcome) -> Outbox {
        let mut out = Outbox::new();
        let Self {
            registry,
            collaborators,
            ..
        } = self;
        if let Some(entry) = registry.get_mut(session) {
            let mut detached = DetachedBoss;
            let boss: &mut dyn BossActor = match collaborators.world.boss_mut(entry.boss()) {
                Some(boss) => boss,
                None => &mut detached,
            };
            entry.settle(outcome, boss, &mut out);
        }
        out
    }

    /// Dispatches `out`, then removes the session if it ended.
    fn flush(&mut self, session: SessionId, out: Outbox) -> Result<()> {
        let result = if out.is_empty() {
            Ok(())
        } else {
            Dispatcher::new(&mut self.collaborators, &self.bus).dispatch(session, out)
        };
        self.reap(session);
        result.map_err(RuntimeError::from)
    }

    fn reap(&mut self, session: SessionId) {
        let ended = self
            .registry
            .get(session)
            .is_some_and(SessionEntry::has_ended);
        if ended && self.registry.remove(session).is_some() {
            info!(target: "raid::director", %session, "Raid removed");
            self.bus
                .publish(Event::Lifecycle(LifecycleEvent::Removed { session }));
        }
    }

    /// Drops index entries for battles a scripted session unbound on its own.
    fn prune_battles(&mut self, session: SessionId) {
        let Some(SessionEntry::Scripted(raid)) = self.registry.get(session) else {
            return;
        };
        let stale: Vec<BattleId> = self
            .registry
            .battles_of(session)
            .into_iter()
            .filter(|battle| !raid.is_bound(*battle))
            .collect();
        for battle in stale {
            self.registry.unbind_battle(battle);
        }
    }

    /// Indexes a battle the session bound on its own, through an implicit join.
    fn track_binding(&mut self, session: SessionId, battle: BattleId, participant: ParticipantId) {
        if let Some(SessionEntry::Scripted(raid)) = self.registry.get(session)
            && raid.is_bound(battle)
        {
            self.registry.bind_battle(battle, session);
            self.registry.bind_participant(participant, session);
        }
    }

    fn announce_start(&self, session: SessionId, mode: SessionMode, boss: ActorId) {
        self.bus.publish(Event::Lifecycle(LifecycleEvent::Started {
            session,
            mode,
            boss,
        }));
    }
}

fn verdict_for(depleted: bool, init_max: f32) -> FaintVerdict {
    if depleted {
        FaintVerdict::Allow
    } else {
        FaintVerdict::Suppress {
            restore_to: init_max,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verdict_allows_only_exhausted_pools() {
        assert_eq!(verdict_for(true, 100.0), FaintVerdict::Allow);
        assert_eq!(
            verdict_for(false, 100.0),
            FaintVerdict::Suppress { restore_to: 100.0 }
        );
    }

    #[test]
    fn detached_boss_reports_no_health() {
        let mut boss = DetachedBoss;
        boss.set_health(50.0);
        assert_eq!(boss.health(), 0.0);
        assert_eq!(boss.traits(), SpecimenTraits::default());
    }
}

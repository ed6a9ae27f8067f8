//! Session registry: id → session, participant → session, battle → session.
//!
//! Only the director mutates the registry, and only on join, leave, bind and
//! settlement. A session is removed exactly once, right after it ends.

use std::collections::{BTreeMap, HashMap};

use raid_core::{
    ActorId, BattleId, BossActor, CoopSession, Encounter, Outbox, ParticipantId, RaidSession,
    SessionId, SessionMode, SessionStatus, SettlementOutcome,
};

/// Either coordinator, stored side by side.
#[derive(Debug)]
pub enum SessionEntry {
    Scripted(RaidSession),
    Coop(CoopSession),
}

impl SessionEntry {
    pub fn encounter(&self) -> &dyn Encounter {
        match self {
            SessionEntry::Scripted(session) => session,
            SessionEntry::Coop(session) => session,
        }
    }

    pub fn encounter_mut(&mut self) -> &mut dyn Encounter {
        match self {
            SessionEntry::Scripted(session) => session,
            SessionEntry::Coop(session) => session,
        }
    }

    pub fn id(&self) -> SessionId {
        self.encounter().id()
    }

    pub fn boss(&self) -> ActorId {
        self.encounter().boss()
    }

    pub fn mode(&self) -> SessionMode {
        self.encounter().mode()
    }

    pub fn status(&self) -> SessionStatus {
        self.encounter().status()
    }

    pub fn has_ended(&self) -> bool {
        self.encounter().has_ended()
    }

    pub fn tick(&mut self, boss: &mut dyn BossActor, out: &mut Outbox) {
        self.encounter_mut().tick(boss, out);
    }

    pub fn settle(
        &mut self,
        outcome: SettlementOutcome,
        boss: &mut dyn BossActor,
        out: &mut Outbox,
    ) -> bool {
        self.encounter_mut().settle(outcome, boss, out)
    }
}

#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: BTreeMap<SessionId, SessionEntry>,
    by_participant: HashMap<ParticipantId, SessionId>,
    by_battle: HashMap<BattleId, SessionId>,
    next_id: u64,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate_id(&mut self) -> SessionId {
        self.next_id += 1;
        SessionId(self.next_id)
    }

    pub fn insert(&mut self, entry: SessionEntry) {
        self.sessions.insert(entry.id(), entry);
    }

    pub fn get(&self, id: SessionId) -> Option<&SessionEntry> {
        self.sessions.get(&id)
    }

    pub fn get_mut(&mut self, id: SessionId) -> Option<&mut SessionEntry> {
        self.sessions.get_mut(&id)
    }

    /// Removes the session and every index entry pointing at it.
    pub fn remove(&mut self, id: SessionId) -> Option<SessionEntry> {
        let entry = self.sessions.remove(&id)?;
        self.by_participant.retain(|_, session| *session != id);
        self.by_battle.retain(|_, session| *session != id);
        Some(entry)
    }

    pub fn session_of_participant(&self, participant: ParticipantId) -> Option<SessionId> {
        self.by_participant.get(&participant).copied()
    }

    pub fn session_of_battle(&self, battle: BattleId) -> Option<SessionId> {
        self.by_battle.get(&battle).copied()
    }

    pub fn bind_participant(&mut self, participant: ParticipantId, session: SessionId) {
        self.by_participant.insert(participant, session);
    }

    pub fn unbind_participant(&mut self, participant: ParticipantId) -> Option<SessionId> {
        self.by_participant.remove(&participant)
    }

    pub fn bind_battle(&mut self, battle: BattleId, session: SessionId) {
        self.by_battle.insert(battle, session);
    }

    pub fn unbind_battle(&mut self, battle: BattleId) -> Option<SessionId> {
        self.by_battle.remove(&battle)
    }

    /// Battles indexed under `id`.
    pub fn battles_of(&self, id: SessionId) -> Vec<BattleId> {
        self.by_battle
            .iter()
            .filter(|(_, session)| **session == id)
            .map(|(battle, _)| *battle)
            .collect()
    }

    pub fn ids(&self) -> Vec<SessionId> {
        self.sessions.keys().copied().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SessionEntry> {
        self.sessions.values()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

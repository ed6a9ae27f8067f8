use std::collections::HashMap;

use crate::state::ParticipantId;

/// Last-known opponent health inside each participant's private battle.
///
/// Every private battle starts the opponent at `baseline` (the unscaled maximum),
/// so an unknown participant reads as untouched.
#[derive(Clone, Debug)]
pub struct BattleHealthCache {
    baseline: f32,
    entries: HashMap<ParticipantId, f32>,
}

impl BattleHealthCache {
    pub fn new(baseline: f32) -> Self {
        Self {
            baseline,
            entries: HashMap::new(),
        }
    }

    pub fn last_known(&self, participant: ParticipantId) -> f32 {
        self.entries
            .get(&participant)
            .copied()
            .unwrap_or(self.baseline)
    }

    pub fn reset(&mut self, participant: ParticipantId) {
        self.entries.insert(participant, self.baseline);
    }

    /// Stores `health` and returns the drop since the previous reading.
    ///
    /// A rise (healing) comes back negative.
    pub fn record(&mut self, participant: ParticipantId, health: f32) -> f32 {
        let previous = self.last_known(participant);
        self.entries.insert(participant, health);
        previous - health
    }

    /// Damage dealt in the current private battle.
    pub fn dealt(&self, participant: ParticipantId) -> f32 {
        self.baseline - self.last_known(participant)
    }

    pub fn remove(&mut self, participant: ParticipantId) {
        self.entries.remove(&participant);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

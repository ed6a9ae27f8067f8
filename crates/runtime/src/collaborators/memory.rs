//! In-process world used by the admin console and tests.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use raid_core::{ActorId, BossActor, ParticipantId, SpecimenTraits};
use raid_content::BossDefinition;

use super::ActorWorld;
use crate::api::CollaboratorError;

/// Where a boss is spawned.
#[derive(Debug, Clone, PartialEq)]
pub struct Location {
    pub world: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: f64, y: f64, z: f64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.1}, {:.1}, {:.1})", self.world, self.x, self.y, self.z)
    }
}

/// Boss actor held by [`InMemoryWorld`].
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryBoss {
    pub health: f32,
    pub max_health: f32,
    pub death_allowed: bool,
    pub location: Location,
    pub traits: SpecimenTraits,
    /// Participants currently in another world.
    pub away: BTreeSet<ParticipantId>,
}

impl BossActor for MemoryBoss {
    fn health(&self) -> f32 {
        self.health
    }

    fn set_health(&mut self, health: f32) {
        self.health = health.clamp(0.0, self.max_health);
    }

    fn allow_death(&mut self) {
        self.death_allowed = true;
    }

    fn traits(&self) -> SpecimenTraits {
        self.traits.clone()
    }

    fn shares_world_with(&self, participant: ParticipantId) -> bool {
        !self.away.contains(&participant)
    }
}

/// Actor world kept in a map.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    actors: BTreeMap<ActorId, MemoryBoss>,
    next_id: u64,
}

impl InMemoryWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, actor: ActorId) -> Option<&MemoryBoss> {
        self.actors.get(&actor)
    }

    /// Moves `participant` into `world`, as seen by every boss.
    pub fn move_participant(&mut self, participant: ParticipantId, world: &str) {
        for boss in self.actors.values_mut() {
            if boss.location.world == world {
                boss.away.remove(&participant);
            } else {
                boss.away.insert(participant);
            }
        }
    }

    pub fn despawn(&mut self, actor: ActorId) -> Option<MemoryBoss> {
        self.actors.remove(&actor)
    }

    pub fn len(&self) -> usize {
        self.actors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actors.is_empty()
    }
}

impl ActorWorld for InMemoryWorld {
    fn spawn_boss(
        &mut self,
        boss: &BossDefinition,
        location: &Location,
    ) -> Result<ActorId, CollaboratorError> {
        if boss.health == 0 {
            return Err(CollaboratorError::Rejected {
                collaborator: "world",
                reason: format!("boss `{}` has no health", boss.species),
            });
        }
        self.next_id += 1;
        let id = ActorId(self.next_id);
        let max_health = boss.health as f32;
        let mut traits = boss.traits.clone();
        if traits.species.is_empty() {
            traits.species = boss.species.clone();
        }
        self.actors.insert(
            id,
            MemoryBoss {
                health: max_health,
                max_health,
                death_allowed: false,
                location: location.clone(),
                traits,
                away: BTreeSet::new(),
            },
        );
        Ok(id)
    }

    fn boss(&self, actor: ActorId) -> Option<&dyn BossActor> {
        self.actors.get(&actor).map(|boss| boss as &dyn BossActor)
    }

    fn boss_mut(&mut self, actor: ActorId) -> Option<&mut dyn BossActor> {
        self.actors
            .get_mut(&actor)
            .map(|boss| boss as &mut dyn BossActor)
    }

    fn contains(&self, actor: ActorId) -> bool {
        self.actors.contains_key(&actor)
    }
}

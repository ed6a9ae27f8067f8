//! Recording collaborators shared by the runtime integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use raid_core::{BattleCommand, BattleId, Notice, ParticipantId, SessionId, SpecimenTraits};
use raid_runtime::{
    BattleGateway, CollaboratorError, CollaboratorResult, Collaborators, DisplaySink,
    InMemoryWorld, RewardGranter,
};

#[derive(Debug, Default)]
pub struct Log {
    pub progress: Vec<f32>,
    pub titles: Vec<String>,
    pub notices: Vec<(ParticipantId, Notice)>,
    pub commands: Vec<(BattleId, BattleCommand)>,
    pub stopped: Vec<BattleId>,
    pub rewards: Vec<(ParticipantId, bool, Option<SpecimenTraits>)>,
    pub hidden: usize,
    pub fail_rewards: bool,
}

/// Display, battle and reward collaborator writing into a shared [`Log`].
#[derive(Debug, Clone, Default)]
pub struct Recorder(pub Arc<Mutex<Log>>);

impl Recorder {
    pub fn collaborators(&self) -> Collaborators {
        Collaborators::new(self.clone(), self.clone(), self.clone(), InMemoryWorld::new())
    }

    pub fn log(&self) -> std::sync::MutexGuard<'_, Log> {
        self.0.lock().unwrap()
    }

    pub fn notices_for(&self, participant: ParticipantId) -> Vec<Notice> {
        self.log()
            .notices
            .iter()
            .filter(|(p, _)| *p == participant)
            .map(|(_, notice)| notice.clone())
            .collect()
    }
}

impl DisplaySink for Recorder {
    fn sync_health(&mut self, _: SessionId, _: ParticipantId, _: f32) -> CollaboratorResult {
        Ok(())
    }

    fn progress(&mut self, _: SessionId, ratio: f32) -> CollaboratorResult {
        self.log().progress.push(ratio);
        Ok(())
    }

    fn title(&mut self, _: SessionId, text: &str) -> CollaboratorResult {
        self.log().titles.push(text.to_string());
        Ok(())
    }

    fn bind(&mut self, _: SessionId, _: ParticipantId) -> CollaboratorResult {
        Ok(())
    }

    fn unbind(&mut self, _: SessionId, _: ParticipantId) -> CollaboratorResult {
        Ok(())
    }

    fn hide(&mut self, _: SessionId) -> CollaboratorResult {
        self.log().hidden += 1;
        Ok(())
    }

    fn notify(&mut self, participant: ParticipantId, notice: &Notice) -> CollaboratorResult {
        self.log().notices.push((participant, notice.clone()));
        Ok(())
    }
}

impl BattleGateway for Recorder {
    fn enqueue(&mut self, battle: BattleId, command: &BattleCommand) -> CollaboratorResult {
        self.log().commands.push((battle, command.clone()));
        Ok(())
    }

    fn stop(&mut self, battle: BattleId) -> CollaboratorResult {
        self.log().stopped.push(battle);
        Ok(())
    }
}

impl RewardGranter for Recorder {
    fn grant_reward(
        &mut self,
        participant: ParticipantId,
        won: bool,
        specimen: Option<&SpecimenTraits>,
    ) -> CollaboratorResult {
        let mut log = self.log();
        if log.fail_rewards {
            return Err(CollaboratorError::Unavailable("rewards"));
        }
        log.rewards.push((participant, won, specimen.cloned()));
        Ok(())
    }
}

//! Collaborator that only writes what it is asked to do to the log.

use raid_core::{BattleCommand, BattleId, Notice, ParticipantId, SessionId, SpecimenTraits};
use tracing::info;

use super::{BattleGateway, CollaboratorResult, DisplaySink, RewardGranter};

/// Display, battle and reward sink backed by `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DisplaySink for LogSink {
    fn sync_health(
        &mut self,
        session: SessionId,
        participant: ParticipantId,
        ratio: f32,
    ) -> CollaboratorResult {
        info!(target: "raid::display", %session, %participant, ratio, "sync health");
        Ok(())
    }

    fn progress(&mut self, session: SessionId, ratio: f32) -> CollaboratorResult {
        info!(target: "raid::display", %session, ratio, "progress");
        Ok(())
    }

    fn title(&mut self, session: SessionId, text: &str) -> CollaboratorResult {
        info!(target: "raid::display", %session, title = text, "title");
        Ok(())
    }

    fn bind(&mut self, session: SessionId, participant: ParticipantId) -> CollaboratorResult {
        info!(target: "raid::display", %session, %participant, "bar shown");
        Ok(())
    }

    fn unbind(&mut self, session: SessionId, participant: ParticipantId) -> CollaboratorResult {
        info!(target: "raid::display", %session, %participant, "bar removed");
        Ok(())
    }

    fn hide(&mut self, session: SessionId) -> CollaboratorResult {
        info!(target: "raid::display", %session, "bar hidden");
        Ok(())
    }

    fn notify(&mut self, participant: ParticipantId, notice: &Notice) -> CollaboratorResult {
        info!(target: "raid::display", %participant, ?notice, "notice");
        Ok(())
    }
}

impl BattleGateway for LogSink {
    fn enqueue(&mut self, battle: BattleId, command: &BattleCommand) -> CollaboratorResult {
        info!(target: "raid::battle", %battle, ?command, "queued");
        Ok(())
    }

    fn stop(&mut self, battle: BattleId) -> CollaboratorResult {
        info!(target: "raid::battle", %battle, "stopped");
        Ok(())
    }
}

impl RewardGranter for LogSink {
    fn grant_reward(
        &mut self,
        participant: ParticipantId,
        won: bool,
        specimen: Option<&SpecimenTraits>,
    ) -> CollaboratorResult {
        info!(
            target: "raid::reward",
            %participant,
            won,
            species = specimen.map(|s| s.species.as_str()),
            shiny = specimen.map(|s| s.shiny),
            "reward granted"
        );
        Ok(())
    }
}

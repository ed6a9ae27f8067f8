use std::collections::HashSet;

use super::{BattleOutcome, Encounter, Lifecycle, SessionMode, SessionStatus, Settlement, SettlementOutcome};
use crate::actor::BossActor;
use crate::config::CoopSettings;
use crate::event::{Contribution, Notice, Outbox, RaidEvent};
use crate::health::SharedHealthPool;
use crate::queue::ActionQueue;
use crate::state::{ActorId, BattleId, ParticipantId, SessionId};
use crate::timer::{Countdown, TimeWarning, format_clock};

/// Simplified encounter: every private victory removes one unscaled health bar.
#[derive(Debug)]
pub struct CoopSession {
    id: SessionId,
    boss: ActorId,
    settings: CoopSettings,
    unscaled: f32,
    pool: SharedHealthPool,
    roster: Vec<ParticipantId>,
    /// Victory counters in order of first join. Leaving keeps the entry.
    defeats: Vec<(ParticipantId, u32)>,
    /// Battles whose victory was already counted from a reported faint.
    faint_counted: HashSet<BattleId>,
    queue: ActionQueue<SettlementOutcome>,
    countdown: Countdown,
    lifecycle: Lifecycle,
    settlement_queued: bool,
}

impl CoopSession {
    pub fn new(id: SessionId, boss: ActorId, unscaled_health: u32, settings: CoopSettings) -> Self {
        let unscaled = unscaled_health as f32;
        Self {
            id,
            boss,
            pool: SharedHealthPool::new(unscaled, settings.multiplier as f32),
            countdown: Countdown::new(settings.duration),
            settings,
            unscaled,
            roster: Vec::new(),
            defeats: Vec::new(),
            faint_counted: HashSet::new(),
            queue: ActionQueue::new(),
            lifecycle: Lifecycle::started(),
            settlement_queued: false,
        }
    }

    pub fn pool(&self) -> &SharedHealthPool {
        &self.pool
    }

    pub fn settings(&self) -> &CoopSettings {
        &self.settings
    }

    pub fn is_active(&self) -> bool {
        self.lifecycle.is_active()
    }

    pub fn defeats(&self, participant: ParticipantId) -> u32 {
        self.defeats
            .iter()
            .find(|(p, _)| *p == participant)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Report lines for everyone who ever joined, in first-join order.
    pub fn contributions(&self) -> Vec<Contribution> {
        self.defeats
            .iter()
            .map(|&(participant, defeats)| Contribution {
                participant,
                defeats,
                damage: (defeats as f32 * self.unscaled) as u32,
            })
            .collect()
    }

    pub fn join(&mut self, participant: ParticipantId, out: &mut Outbox) {
        if self.lifecycle.is_ended() || self.roster.contains(&participant) {
            return;
        }
        self.roster.push(participant);
        if !self.defeats.iter().any(|(p, _)| *p == participant) {
            self.defeats.push((participant, 0));
        }
        out.push(RaidEvent::DisplayBound { participant });
        out.push(RaidEvent::SyncHealth {
            participant,
            ratio: self.pool.ratio(),
        });
        out.push(RaidEvent::Notice {
            participant,
            notice: Notice::Joined,
        });
        out.push(RaidEvent::Notice {
            participant,
            notice: Notice::Status(self.status()),
        });
    }

    pub fn leave(&mut self, participant: ParticipantId, out: &mut Outbox) {
        if self.lifecycle.is_ended() || !self.roster.contains(&participant) {
            return;
        }
        self.roster.retain(|p| *p != participant);
        out.push(RaidEvent::DisplayUnbound { participant });
        out.push(RaidEvent::Notice {
            participant,
            notice: Notice::Left,
        });
    }

    /// Counts the victory of a boss-copy faint reported by the engine.
    pub fn on_boss_fainted(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        boss: &mut dyn BossActor,
        out: &mut Outbox,
    ) {
        if self.lifecycle.is_ended() || !self.roster.contains(&participant) {
            return;
        }
        self.faint_counted.insert(battle);
        self.on_victory(participant, boss, out);
    }

    /// Settles a finished private battle. A victory already counted from a
    /// faint is not counted again.
    pub fn end_battle(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        outcome: BattleOutcome,
        boss: &mut dyn BossActor,
        out: &mut Outbox,
    ) {
        if self.faint_counted.remove(&battle) {
            return;
        }
        if outcome == BattleOutcome::Victory {
            self.on_victory(participant, boss, out);
        }
    }

    /// Counts one private victory and settles as soon as the pool is empty.
    pub fn on_victory(
        &mut self,
        participant: ParticipantId,
        boss: &mut dyn BossActor,
        out: &mut Outbox,
    ) {
        if self.lifecycle.is_ended() || !self.roster.contains(&participant) {
            return;
        }
        if let Some((_, count)) = self.defeats.iter_mut().find(|(p, _)| *p == participant) {
            *count += 1;
        }
        let damage = self.pool.drain(self.unscaled);

        let ratio = self.pool.ratio();
        let (current, max) = (self.pool.current() as u32, self.pool.max() as u32);
        out.push(RaidEvent::Progress { ratio });
        for &member in &self.roster {
            out.push(RaidEvent::SyncHealth {
                participant: member,
                ratio,
            });
            out.push(RaidEvent::Notice {
                participant: member,
                notice: Notice::DamageDealt {
                    by: participant,
                    damage: damage as u32,
                    current,
                    max,
                },
            });
        }

        if self.pool.is_depleted() {
            self.settle(SettlementOutcome::Success, boss, out);
        }
    }
}

impl Encounter for CoopSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn mode(&self) -> SessionMode {
        SessionMode::Simple
    }

    fn boss(&self) -> ActorId {
        self.boss
    }

    fn roster(&self) -> &[ParticipantId] {
        &self.roster
    }

    fn status(&self) -> SessionStatus {
        SessionStatus {
            id: self.id,
            mode: SessionMode::Simple,
            boss: self.boss,
            title: self.settings.title.clone(),
            current: self.pool.current(),
            max: self.pool.max(),
            init_max: self.pool.init_max(),
            multiplier: self.settings.multiplier,
            remaining_seconds: self.countdown.remaining_seconds(),
            participants: self.roster.len(),
            active: self.lifecycle.is_active(),
        }
    }

    fn tick(&mut self, boss: &mut dyn BossActor, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        if let Some(outcome) = self.queue.advance().into_iter().next() {
            self.settle(outcome, boss, out);
            return;
        }
        if self.pool.is_depleted() {
            self.settle(SettlementOutcome::Success, boss, out);
            return;
        }

        let step = self.countdown.advance();
        if let Some(second) = step.second {
            out.push(RaidEvent::Title {
                text: format!("{} - {}", self.settings.title, format_clock(second)),
            });
            if let Some(warning) = TimeWarning::at(second) {
                for &participant in &self.roster {
                    out.push(RaidEvent::Notice {
                        participant,
                        notice: Notice::TimeWarning(warning),
                    });
                }
            }
        }
        if step.expired && !self.settlement_queued {
            self.settlement_queued = true;
            let (current, max) = (self.pool.current() as u32, self.pool.max() as u32);
            for &participant in &self.roster {
                out.push(RaidEvent::Notice {
                    participant,
                    notice: Notice::Defeat { current, max },
                });
            }
            match self.settings.timeout_grace.0 {
                0 => {
                    self.settle(SettlementOutcome::Failure, boss, out);
                }
                grace => self.queue.schedule(SettlementOutcome::Failure, grace),
            }
        }
    }

    fn settle(
        &mut self,
        outcome: SettlementOutcome,
        boss: &mut dyn BossActor,
        out: &mut Outbox,
    ) -> bool {
        if !self.lifecycle.end() {
            return false;
        }
        self.settlement_queued = true;
        self.queue.clear();
        self.faint_counted.clear();
        out.push(RaidEvent::DisplayHidden);

        let contributions = self.contributions();
        let mut settlement = Settlement {
            session: self.id,
            outcome,
            winners: Vec::new(),
            others: Vec::new(),
            specimen: None,
            contributions: contributions.clone(),
            elapsed: self.countdown.elapsed(),
        };

        match outcome {
            SettlementOutcome::Success => {
                boss.allow_death();
                boss.set_health(0.0);
                let specimen = self.settings.sync_rewards.then(|| boss.traits());
                let elapsed_seconds = settlement.elapsed.as_seconds_ceil();
                for &participant in &self.roster {
                    out.push(RaidEvent::Notice {
                        participant,
                        notice: Notice::Victory { elapsed_seconds },
                    });
                    out.push(RaidEvent::Notice {
                        participant,
                        notice: Notice::Contributions(contributions.clone()),
                    });
                    out.push(RaidEvent::Reward {
                        participant,
                        won: true,
                        specimen: specimen.clone(),
                    });
                }
                settlement.winners = self.roster.clone();
                settlement.specimen = specimen;
            }
            SettlementOutcome::Failure => {
                for &participant in &self.roster {
                    out.push(RaidEvent::Notice {
                        participant,
                        notice: Notice::RaidFailed,
                    });
                }
            }
        }

        out.push(RaidEvent::Settled(settlement));
        true
    }

    fn has_ended(&self) -> bool {
        self.lifecycle.is_ended()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::TestBoss;
    use crate::state::Ticks;

    const P1: ParticipantId = ParticipantId(1);
    const P2: ParticipantId = ParticipantId(2);
    const B1: BattleId = BattleId(11);

    fn coop(unscaled: u32, multiplier: u32) -> CoopSession {
        CoopSession::new(
            SessionId(5),
            ActorId(50),
            unscaled,
            CoopSettings::new("Snorlax", multiplier, Ticks::from_seconds(600)),
        )
    }

    #[test]
    fn victories_drain_flat_shares_and_report_contributions() {
        let mut session = coop(50, 4);
        let mut boss = TestBoss::new(50.0);
        let mut out = Outbox::new();
        session.join(P1, &mut out);
        session.join(P2, &mut out);
        assert_eq!(session.pool().max(), 200.0);

        session.on_victory(P1, &mut boss, &mut out);
        session.on_victory(P1, &mut boss, &mut out);
        session.on_victory(P2, &mut boss, &mut out);
        assert_eq!(session.pool().current(), 50.0);
        assert!(!session.has_ended());

        assert_eq!(
            session.contributions(),
            vec![
                Contribution {
                    participant: P1,
                    defeats: 2,
                    damage: 100
                },
                Contribution {
                    participant: P2,
                    defeats: 1,
                    damage: 50
                },
            ]
        );
    }

    #[test]
    fn reported_faint_is_not_counted_again_at_battle_end() {
        let mut session = coop(50, 4);
        let mut boss = TestBoss::new(50.0);
        let mut out = Outbox::new();
        session.join(P1, &mut out);

        session.on_boss_fainted(P1, B1, &mut boss, &mut out);
        session.end_battle(P1, B1, BattleOutcome::Victory, &mut boss, &mut out);
        assert_eq!(session.defeats(P1), 1);
        assert_eq!(session.pool().current(), 150.0);

        session.end_battle(P1, B1, BattleOutcome::Victory, &mut boss, &mut out);
        assert_eq!(session.defeats(P1), 2);
    }

    #[test]
    fn final_victory_settles_immediately() {
        let mut session = coop(50, 2);
        let mut boss = TestBoss::new(50.0);
        let mut out = Outbox::new();
        session.join(P1, &mut out);
        session.join(P2, &mut out);

        session.on_victory(P1, &mut boss, &mut out);
        out.clear();
        session.on_victory(P2, &mut boss, &mut out);

        assert!(session.has_ended());
        assert!(boss.death_allowed);
        let rewards = out
            .iter()
            .filter(|e| matches!(e, RaidEvent::Reward { won: true, .. }))
            .count();
        assert_eq!(rewards, 2);
        assert!(matches!(
            out.last(),
            Some(RaidEvent::Settled(settlement)) if settlement.is_success()
        ));
    }

    #[test]
    fn zero_multiplier_wins_on_first_tick() {
        let mut session = coop(50, 0);
        let mut boss = TestBoss::new(50.0);
        let mut out = Outbox::new();
        assert!(session.pool().is_depleted());

        session.tick(&mut boss, &mut out);
        assert!(session.has_ended());
        assert!(matches!(
            out.last(),
            Some(RaidEvent::Settled(settlement)) if settlement.is_success()
        ));
    }

    #[test]
    fn leaving_keeps_contributions() {
        let mut session = coop(10, 10);
        let mut boss = TestBoss::new(10.0);
        let mut out = Outbox::new();
        session.join(P1, &mut out);
        session.join(P2, &mut out);
        session.on_victory(P1, &mut boss, &mut out);
        session.leave(P1, &mut out);

        session.on_victory(P1, &mut boss, &mut out);
        assert_eq!(session.defeats(P1), 1);
        assert_eq!(session.roster(), &[P2]);

        session.join(P1, &mut out);
        assert_eq!(session.roster(), &[P2, P1]);
        assert_eq!(session.contributions()[0].participant, P1);
        assert_eq!(session.contributions()[0].defeats, 1);
    }

    #[test]
    fn timeout_fails_without_rewards() {
        let mut session = CoopSession::new(
            SessionId(5),
            ActorId(50),
            50,
            CoopSettings::new("Snorlax", 4, Ticks(1200)),
        );
        let mut boss = TestBoss::new(50.0);
        let mut out = Outbox::new();
        session.join(P1, &mut out);

        for _ in 0..1200 {
            session.tick(&mut boss, &mut out);
        }
        assert!(session.has_ended());
        assert!(!out.iter().any(|e| matches!(e, RaidEvent::Reward { .. })));
        assert!(out.contains(&RaidEvent::Notice {
            participant: P1,
            notice: Notice::RaidFailed
        }));
    }
}

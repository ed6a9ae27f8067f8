use std::collections::{HashMap, HashSet};

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::{
    BattleOutcome, Encounter, Lifecycle, SessionMode, SessionStatus, Settlement,
    SettlementOutcome, split_by_catch_limit,
};
use crate::actor::{BossActor, SUPPRESSED_HEALTH};
use crate::config::{DamageAccounting, RaidConfig, RaidSettings};
use crate::event::{BattleCommand, Notice, Outbox, RaidEvent};
use crate::health::{BattleHealthCache, SharedHealthPool};
use crate::queue::ActionQueue;
use crate::script::{Cheer, ScriptTable};
use crate::state::{ActorId, BattleId, ParticipantId, SessionId};
use crate::timer::{Countdown, TimeWarning, format_clock};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    RefreshProgress,
    CheckPresence,
    Settle(SettlementOutcome),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Binding {
    battle: BattleId,
    participant: ParticipantId,
}

/// Scripted, scaling encounter against one boss actor.
///
/// Participants fight private copies of the boss. Damage observed in those battles
/// drains the shared pool; scripted effects fire by turn and by pool threshold.
/// The boss actor is borrowed on [`tick`](Encounter::tick) and
/// [`settle`](Encounter::settle) only.
#[derive(Debug)]
pub struct RaidSession {
    id: SessionId,
    boss: ActorId,
    settings: RaidSettings,
    pool: SharedHealthPool,
    base_max: f32,
    cache: BattleHealthCache,
    bindings: Vec<Binding>,
    roster: Vec<ParticipantId>,
    cheers: HashMap<ParticipantId, u32>,
    scripts: ScriptTable,
    /// Battles that already received the turn-0 script.
    opened: HashSet<BattleId>,
    /// Battles whose last victory was counted from a reported faint.
    faint_counted: HashSet<BattleId>,
    queue: ActionQueue<Deferred>,
    countdown: Countdown,
    lifecycle: Lifecycle,
    settlement_queued: bool,
    rng: StdRng,
}

impl RaidSession {
    pub fn new(
        id: SessionId,
        boss: ActorId,
        boss_max_health: f32,
        settings: RaidSettings,
        mut scripts: ScriptTable,
    ) -> Self {
        let pool = SharedHealthPool::new(boss_max_health, settings.pool_multiplier.max(1) as f32);
        scripts.discard_thresholds_above(f64::from(pool.ratio()));
        let mut queue = ActionQueue::new();
        queue.schedule_repeating(Deferred::CheckPresence, RaidConfig::PRESENCE_CHECK_TICKS);

        Self {
            id,
            boss,
            base_max: pool.max(),
            cache: BattleHealthCache::new(pool.init_max()),
            countdown: Countdown::new(settings.duration),
            settings,
            pool,
            bindings: Vec::new(),
            roster: Vec::new(),
            cheers: HashMap::new(),
            scripts,
            opened: HashSet::new(),
            faint_counted: HashSet::new(),
            queue,
            lifecycle: Lifecycle::started(),
            settlement_queued: false,
            rng: StdRng::from_entropy(),
        }
    }

    /// Replaces the lottery source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    pub fn pool(&self) -> &SharedHealthPool {
        &self.pool
    }

    pub fn settings(&self) -> &RaidSettings {
        &self.settings
    }

    pub fn scripts(&self) -> &ScriptTable {
        &self.scripts
    }

    pub fn cached_health(&self, participant: ParticipantId) -> f32 {
        self.cache.last_known(participant)
    }

    pub fn remaining_cheers(&self, participant: ParticipantId) -> u32 {
        self.cheers.get(&participant).copied().unwrap_or(0)
    }

    pub fn is_bound(&self, battle: BattleId) -> bool {
        self.bindings.iter().any(|binding| binding.battle == battle)
    }

    pub fn battles(&self) -> impl Iterator<Item = BattleId> + '_ {
        self.bindings.iter().map(|binding| binding.battle)
    }

    /// Battles currently bound for `participant`.
    pub fn battles_of(&self, participant: ParticipantId) -> Vec<BattleId> {
        self.bindings
            .iter()
            .filter(|binding| binding.participant == participant)
            .map(|binding| binding.battle)
            .collect()
    }

    pub fn pending_actions(&self) -> usize {
        self.queue.len()
    }

    /// Binds `battle` and brings `participant` into the encounter.
    pub fn join(&mut self, participant: ParticipantId, battle: BattleId, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        let rejoining = self.roster.contains(&participant);

        if !self.is_bound(battle) {
            self.bindings.push(Binding {
                battle,
                participant,
            });
        }
        out.push(RaidEvent::DisplayBound { participant });
        self.cache.reset(participant);

        if !rejoining {
            if !self.roster.is_empty() && self.settings.per_participant_scaling > 1.0 {
                self.rescale();
            }
            let shared_health = self.pool.current().floor() as u32;
            for other in self.bindings.iter().filter(|b| b.battle != battle) {
                out.push(RaidEvent::Battle {
                    battle: other.battle,
                    command: BattleCommand::PlayerJoined {
                        newcomer: participant,
                        shared_health,
                    },
                });
            }
            self.roster.push(participant);
            self.cheers.insert(participant, self.settings.max_cheers);
        }

        if let Some(effect) = self.scripts.opening()
            && self.opened.insert(battle)
        {
            out.push(RaidEvent::Battle {
                battle,
                command: BattleCommand::Script(effect),
            });
        }
        out.push(RaidEvent::SyncHealth {
            participant,
            ratio: self.pool.ratio(),
        });
        out.push(RaidEvent::Notice {
            participant,
            notice: Notice::Joined,
        });
    }

    /// Unbinds `battle`. The participant keeps their roster place and rewards.
    pub fn leave(&mut self, participant: ParticipantId, battle: BattleId, out: &mut Outbox) {
        if self.lifecycle.is_ended() || !self.roster.contains(&participant) {
            return;
        }
        self.bindings.retain(|binding| binding.battle != battle);
        self.opened.remove(&battle);
        self.faint_counted.remove(&battle);
        self.cache.remove(participant);
        out.push(RaidEvent::DisplayUnbound { participant });
        out.push(RaidEvent::Notice {
            participant,
            notice: Notice::Left,
        });
    }

    /// Applies the drop between the last known and the reported private health.
    pub fn ingest_damage(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        health: f32,
        out: &mut Outbox,
    ) {
        if self.lifecycle.is_ended() || !health.is_finite() {
            return;
        }
        if !self.is_bound(battle) {
            self.join(participant, battle, out);
        }
        let delta = self.cache.record(participant, health.max(0.0));
        self.drain_pool(delta, out);
    }

    /// Records private health without touching the pool.
    pub fn track_battle_hp(&mut self, participant: ParticipantId, health: f32) {
        if self.lifecycle.is_ended() || !health.is_finite() {
            return;
        }
        self.cache.record(participant, health.max(0.0));
    }

    pub fn on_private_victory(&mut self, participant: ParticipantId) {
        self.cache.reset(participant);
    }

    /// Removes one full unscaled health bar from the pool.
    pub fn apply_full_damage(&mut self, participant: ParticipantId, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        self.cache.reset(participant);
        self.drain_pool(self.pool.init_max(), out);
    }

    /// Removes whatever the participant dealt in their current battle.
    pub fn apply_partial_damage(&mut self, participant: ParticipantId, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        let dealt = self.cache.dealt(participant);
        self.cache.reset(participant);
        if dealt > 0.0 {
            self.drain_pool(dealt, out);
        }
    }

    /// Counts the victory of a boss-copy faint reported by the engine.
    ///
    /// The battle's own end report then only resets the cache.
    pub fn on_boss_fainted(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        out: &mut Outbox,
    ) {
        if self.lifecycle.is_ended() {
            return;
        }
        self.account_battle(participant, battle, BattleOutcome::Victory, out);
        self.faint_counted.insert(battle);
    }

    /// Settles a finished private battle according to the tier's accounting mode.
    pub fn end_battle(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        outcome: BattleOutcome,
        out: &mut Outbox,
    ) {
        if self.faint_counted.remove(&battle) {
            self.on_private_victory(participant);
            return;
        }
        self.account_battle(participant, battle, outcome, out);
    }

    fn account_battle(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        outcome: BattleOutcome,
        out: &mut Outbox,
    ) {
        match (self.settings.accounting, outcome) {
            (DamageAccounting::PerTurn, BattleOutcome::Victory) => {
                self.ingest_damage(participant, battle, 0.0, out);
                self.on_private_victory(participant);
            }
            (DamageAccounting::PerTurn, _) => self.on_private_victory(participant),
            (DamageAccounting::OnBattleEnd, BattleOutcome::Victory) => {
                self.apply_full_damage(participant, out)
            }
            (DamageAccounting::OnBattleEnd, _) => self.apply_partial_damage(participant, out),
        }
    }

    /// Fires the entry for `turn` into `battle`. The turn-0 entry reaches each
    /// battle once, counting the copy sent on join.
    pub fn run_script_by_turn(&mut self, battle: BattleId, turn: u32, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        let effect = if turn == 0 {
            self.scripts.opening().filter(|_| self.opened.insert(battle))
        } else {
            self.scripts.take_turn(turn)
        };
        if let Some(effect) = effect {
            out.push(RaidEvent::Battle {
                battle,
                command: BattleCommand::Script(effect),
            });
        }
    }

    pub fn run_script_by_threshold(&mut self, ratio: f64, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        for effect in self.scripts.take_crossed(ratio) {
            for binding in &self.bindings {
                out.push(RaidEvent::Battle {
                    battle: binding.battle,
                    command: BattleCommand::Script(effect),
                });
            }
        }
    }

    /// Spends one cheer. The caller's battle gets it immediately; every other
    /// battle gets it with the boss's next action skipped.
    pub fn run_cheer(
        &mut self,
        participant: ParticipantId,
        battle: BattleId,
        cheer: Cheer,
        out: &mut Outbox,
    ) -> bool {
        if self.lifecycle.is_ended() {
            return false;
        }
        match self.cheers.get_mut(&participant) {
            Some(left) if *left > 0 => *left -= 1,
            _ => return false,
        }
        out.push(RaidEvent::Battle {
            battle,
            command: BattleCommand::Cheer {
                cheer,
                skip_enemy_action: false,
            },
        });
        for other in self.bindings.iter().filter(|b| b.battle != battle) {
            out.push(RaidEvent::Battle {
                battle: other.battle,
                command: BattleCommand::Cheer {
                    cheer,
                    skip_enemy_action: true,
                },
            });
        }
        true
    }

    /// Unbinds every battle whose participant left the boss's world.
    fn check_presence(&mut self, boss: &dyn BossActor, out: &mut Outbox) {
        let absent: Vec<Binding> = self
            .bindings
            .iter()
            .filter(|binding| !boss.shares_world_with(binding.participant))
            .copied()
            .collect();
        for binding in absent {
            self.leave(binding.participant, binding.battle, out);
        }
    }

    fn rescale(&mut self) {
        let bonus = self.pool.init_max()
            * (self.settings.per_participant_scaling - 1.0)
            * self.roster.len() as f32;
        self.pool.rescale(self.base_max + bonus);
    }

    fn drain_pool(&mut self, amount: f32, out: &mut Outbox) {
        if self.pool.drain(amount) > 0.0 {
            let ratio = self.pool.ratio();
            for &participant in &self.roster {
                out.push(RaidEvent::SyncHealth { participant, ratio });
            }
        }
        if self.pool.is_depleted() {
            out.push(RaidEvent::Progress { ratio: 0.0 });
            self.queue_settlement(SettlementOutcome::Success, RaidConfig::SUCCESS_GRACE_TICKS);
        } else {
            self.queue
                .schedule(Deferred::RefreshProgress, RaidConfig::REFRESH_DELAY_TICKS);
        }
    }

    fn queue_settlement(&mut self, outcome: SettlementOutcome, delay: u32) {
        if self.settlement_queued || self.lifecycle.is_ended() {
            return;
        }
        self.settlement_queued = true;
        self.queue.schedule(Deferred::Settle(outcome), delay);
    }

    fn announce_second(&self, second: u32, out: &mut Outbox) {
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
}

impl Encounter for RaidSession {
    fn id(&self) -> SessionId {
        self.id
    }

    fn mode(&self) -> SessionMode {
        SessionMode::Scripted
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
            mode: SessionMode::Scripted,
            boss: self.boss,
            title: self.settings.title.clone(),
            current: self.pool.current(),
            max: self.pool.max(),
            init_max: self.pool.init_max(),
            multiplier: self.settings.pool_multiplier,
            remaining_seconds: self.countdown.remaining_seconds(),
            participants: self.roster.len(),
            active: self.lifecycle.is_active(),
        }
    }

    fn tick(&mut self, boss: &mut dyn BossActor, out: &mut Outbox) {
        if self.lifecycle.is_ended() {
            return;
        }
        for action in self.queue.advance() {
            match action {
                Deferred::RefreshProgress => {
                    let ratio = self.pool.ratio();
                    out.push(RaidEvent::Progress { ratio });
                    self.run_script_by_threshold(f64::from(ratio), out);
                }
                Deferred::CheckPresence => self.check_presence(&*boss, out),
                Deferred::Settle(outcome) => {
                    self.settle(outcome, boss, out);
                }
            }
            if self.lifecycle.is_ended() {
                return;
            }
        }

        if self.pool.is_depleted() {
            self.queue_settlement(SettlementOutcome::Success, RaidConfig::SUCCESS_GRACE_TICKS);
        } else if boss.health() <= SUPPRESSED_HEALTH {
            boss.set_health(self.pool.init_max());
        }

        if self.roster.is_empty() {
            return;
        }
        let step = self.countdown.advance();
        if let Some(second) = step.second {
            self.announce_second(second, out);
        }
        if step.expired && !self.settlement_queued {
            let (current, max) = (self.pool.current() as u32, self.pool.max() as u32);
            for &participant in &self.roster {
                out.push(RaidEvent::Notice {
                    participant,
                    notice: Notice::Defeat { current, max },
                });
            }
            if self.settings.timeout_grace.0 == 0 {
                self.settle(SettlementOutcome::Failure, boss, out);
            } else {
                self.queue_settlement(SettlementOutcome::Failure, self.settings.timeout_grace.0);
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
        out.push(RaidEvent::DisplayHidden);

        if outcome == SettlementOutcome::Success {
            boss.allow_death();
            boss.set_health(0.0);
        }
        for binding in self.bindings.drain(..) {
            out.push(RaidEvent::StopBattle {
                battle: binding.battle,
            });
        }
        self.cache.clear();
        self.opened.clear();
        self.faint_counted.clear();

        let elapsed = self.countdown.elapsed();
        let mut settlement = Settlement {
            session: self.id,
            outcome,
            winners: Vec::new(),
            others: Vec::new(),
            specimen: None,
            contributions: Vec::new(),
            elapsed,
        };

        match outcome {
            SettlementOutcome::Success => {
                let (winners, others) =
                    split_by_catch_limit(&self.roster, self.settings.catch_limit, &mut self.rng);
                let specimen = self.settings.sync_rewards.then(|| boss.traits());
                let elapsed_seconds = elapsed.as_seconds_ceil();

                for &participant in &self.roster {
                    out.push(RaidEvent::Notice {
                        participant,
                        notice: Notice::Victory { elapsed_seconds },
                    });
                }
                for &participant in &winners {
                    out.push(RaidEvent::Reward {
                        participant,
                        won: true,
                        specimen: specimen.clone(),
                    });
                }
                for &participant in &others {
                    out.push(RaidEvent::Reward {
                        participant,
                        won: false,
                        specimen: None,
                    });
                }
                settlement.winners = winners;
                settlement.others = others;
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

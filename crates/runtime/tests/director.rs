mod common;

use common::Recorder;
use raid_content::BossDefinition;
use raid_core::{
    ActorId, BattleCommand, BattleId, BattleOutcome, Cheer, Contribution, DamageAccounting,
    Notice, ParticipantId, RaidConfig, RaidEvent, ScriptEffect, SessionId, SettlementOutcome,
    Tier, TierConfig, Ticks,
};
use raid_runtime::{
    CollaboratorError, CombatEvent, Event, EventBus, FaintVerdict, LifecycleEvent, Location,
    RaidDirector, RuntimeError, StartRequest, Topic,
};

const P1: ParticipantId = ParticipantId(1);
const P2: ParticipantId = ParticipantId(2);
const B1: BattleId = BattleId(11);
const B2: BattleId = BattleId(12);

fn location() -> Location {
    Location::new("overworld", 10.0, 64.0, -20.0)
}

fn director(recorder: &Recorder, config: RaidConfig) -> RaidDirector {
    RaidDirector::new(config, recorder.collaborators(), EventBus::new())
}

fn boss_of(director: &RaidDirector, session: SessionId) -> ActorId {
    director.registry().get(session).unwrap().boss()
}

fn tier_one(config: TierConfig) -> RaidConfig {
    RaidConfig::new().with_tier(Tier::TierOne, config)
}

#[test]
fn three_private_faints_drain_three_bars() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, Some(B1)).unwrap();

    for _ in 0..3 {
        let verdict = director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0/100"));
        assert_eq!(verdict, Some(FaintVerdict::Suppress { restore_to: 100.0 }));
    }

    let status = director.status(session).unwrap();
    assert_eq!(status.max, 800.0);
    assert_eq!(status.current, 500.0);
    assert!((status.ratio() - 0.625).abs() < 1e-6);
}

#[test]
fn partial_damage_then_flee_drains_what_was_dealt() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, Some(B1)).unwrap();

    let verdict = director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "60/100"));
    assert_eq!(verdict, None);
    assert_eq!(director.status(session).unwrap().current, 800.0);

    director.end_battle(P1, B1, BattleOutcome::Fled).unwrap();
    assert_eq!(director.status(session).unwrap().current, 760.0);
}

#[test]
fn per_turn_accounting_ignores_heals() {
    let recorder = Recorder::default();
    let config = tier_one(TierConfig {
        accounting: DamageAccounting::PerTurn,
        ..TierConfig::new()
    });
    let mut director = director(&recorder, config);
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, Some(B1)).unwrap();

    director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "70/100"));
    assert_eq!(director.status(session).unwrap().current, 770.0);

    director.handle_combat_event(CombatEvent::heal(P1, B1, boss, "90/100"));
    assert_eq!(director.status(session).unwrap().current, 770.0);

    director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "50/100"));
    assert_eq!(director.status(session).unwrap().current, 730.0);
}

#[test]
fn irrelevant_reports_are_ignored() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, Some(B1)).unwrap();

    let foreign = CombatEvent::damage(P1, B1, ActorId(999), "0/100");
    assert_eq!(director.handle_combat_event(foreign), None);

    let malformed = CombatEvent::damage(P1, B1, boss, "lots");
    assert_eq!(director.handle_combat_event(malformed), None);

    let unbound = CombatEvent::damage(ParticipantId(9), BattleId(77), boss, "0/100");
    assert_eq!(director.handle_combat_event(unbound), None);

    assert_eq!(director.status(session).unwrap().current, 800.0);
}

#[test]
fn exhausted_pool_allows_the_faint_and_settles_after_grace() {
    let recorder = Recorder::default();
    let config = tier_one(TierConfig {
        coop_health_multiplier: 2,
        ..TierConfig::new()
    });
    let mut director = director(&recorder, config);
    let mut lifecycle = director.bus().subscribe(Topic::Lifecycle);

    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 10), &location())
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, Some(B1)).unwrap();

    let first = director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0/10"));
    assert_eq!(first, Some(FaintVerdict::Suppress { restore_to: 10.0 }));
    let second = director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0/10"));
    assert_eq!(second, Some(FaintVerdict::Allow));

    director.advance(RaidConfig::SUCCESS_GRACE_TICKS - 1);
    assert_eq!(director.registry().len(), 1);
    assert!(recorder.log().rewards.is_empty());

    director.advance(1);
    assert!(director.registry().is_empty());
    assert_eq!(director.session_for(P1), None);

    {
        let log = recorder.log();
        assert_eq!(log.rewards.len(), 1);
        let (winner, won, specimen) = &log.rewards[0];
        assert_eq!(*winner, P1);
        assert!(*won);
        assert_eq!(specimen.as_ref().map(|s| s.species.as_str()), Some("lapras"));
        assert_eq!(log.stopped, vec![B1]);
        assert_eq!(log.hidden, 1);
    }

    assert!(matches!(
        lifecycle.try_recv(),
        Ok(Event::Lifecycle(LifecycleEvent::Started { .. }))
    ));
    match lifecycle.try_recv() {
        Ok(Event::Session {
            event: RaidEvent::Settled(settlement),
            ..
        }) => {
            assert_eq!(settlement.outcome, SettlementOutcome::Success);
            assert_eq!(settlement.winners, vec![P1]);
        }
        other => panic!("expected settlement, got {other:?}"),
    }
    assert!(matches!(
        lifecycle.try_recv(),
        Ok(Event::Lifecycle(LifecycleEvent::Removed { session: removed })) if removed == session
    ));
    assert!(lifecycle.try_recv().is_err());
}

#[test]
fn expired_timer_fails_without_rewards() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new().with_duration_seconds(60));
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    director.join(session, P1, Some(B1)).unwrap();

    director.advance(1199);
    assert_eq!(director.registry().len(), 1);
    assert_eq!(director.status(session).unwrap().remaining_seconds, 1);

    director.advance(1);
    assert!(director.registry().is_empty());
    assert!(recorder.log().rewards.is_empty());
    assert_eq!(recorder.log().stopped, vec![B1]);

    let notices = recorder.notices_for(P1);
    assert!(notices.contains(&Notice::Defeat {
        current: 800,
        max: 800
    }));
    assert_eq!(notices.last(), Some(&Notice::RaidFailed));
    assert_eq!(
        recorder.log().titles.first().map(String::as_str),
        Some("lapras - 0:59")
    );
}

#[test]
fn coop_victories_share_one_pool() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .start_coop(&BossDefinition::new("eevee", 50), &location(), Some(4), None)
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, None).unwrap();
    director.join(session, P2, None).unwrap();
    assert_eq!(director.status(session).unwrap().max, 200.0);

    let suppress = Some(FaintVerdict::Suppress { restore_to: 50.0 });
    assert_eq!(director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0")), suppress);
    assert_eq!(director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0")), suppress);
    assert_eq!(director.handle_combat_event(CombatEvent::damage(P2, B2, boss, "0")), suppress);
    assert_eq!(director.status(session).unwrap().current, 50.0);

    let last = director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0"));
    assert_eq!(last, Some(FaintVerdict::Allow));
    assert!(director.registry().is_empty());

    let winners: Vec<_> = recorder
        .log()
        .rewards
        .iter()
        .map(|(participant, won, _)| (*participant, *won))
        .collect();
    assert_eq!(winners, vec![(P1, true), (P2, true)]);

    let report = vec![
        Contribution {
            participant: P1,
            defeats: 3,
            damage: 150,
        },
        Contribution {
            participant: P2,
            defeats: 1,
            damage: 50,
        },
    ];
    assert!(recorder.notices_for(P2).contains(&Notice::Contributions(report)));
}

#[test]
fn battle_end_after_a_reported_faint_counts_once() {
    for accounting in [DamageAccounting::OnBattleEnd, DamageAccounting::PerTurn] {
        let recorder = Recorder::default();
        let config = tier_one(TierConfig {
            accounting,
            ..TierConfig::new()
        });
        let mut director = director(&recorder, config);
        let session = director
            .spawn_raid(&BossDefinition::new("lapras", 100), &location())
            .unwrap();
        let boss = boss_of(&director, session);
        director.join(session, P1, Some(B1)).unwrap();

        director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0/100"));
        director.end_battle(P1, B1, BattleOutcome::Victory).unwrap();
        assert_eq!(director.status(session).unwrap().current, 700.0, "{accounting:?}");
    }

    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .start_coop(&BossDefinition::new("eevee", 50), &location(), Some(4), None)
        .unwrap();
    let boss = boss_of(&director, session);
    director.join(session, P1, None).unwrap();

    director.handle_combat_event(CombatEvent::damage(P1, B1, boss, "0"));
    director.end_battle(P1, B1, BattleOutcome::Victory).unwrap();
    assert_eq!(director.status(session).unwrap().current, 150.0);
}

#[test]
fn zero_coop_duration_uses_the_configured_one() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new().with_duration_seconds(60));
    let session = director
        .start_coop(
            &BossDefinition::new("eevee", 50),
            &location(),
            Some(4),
            Some(Ticks::ZERO),
        )
        .unwrap();
    assert_eq!(director.status(session).unwrap().remaining_seconds, 60);

    director.advance(1200);
    assert!(matches!(
        director.status(session),
        Err(RuntimeError::UnknownSession(_))
    ));
}

#[test]
fn admin_start_allows_one_raid_at_a_time() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let boss = BossDefinition::new("eevee", 50);

    assert!(matches!(
        director.admin_start(StartRequest::coop(boss.clone(), location()).with_multiplier(0)),
        Err(RuntimeError::InvalidMultiplier(0))
    ));

    let first = director
        .admin_start(StartRequest::coop(boss.clone(), location()).with_duration_seconds(120))
        .unwrap();
    assert_eq!(director.status(first).unwrap().remaining_seconds, 120);

    assert!(matches!(
        director.admin_start(StartRequest::coop(boss.clone(), location())),
        Err(RuntimeError::RaidAlreadyActive(active)) if active == first
    ));

    director.stop(first).unwrap();
    assert!(director.registry().is_empty());
    assert!(director.admin_start(StartRequest::scripted(boss, location())).is_ok());
}

#[test]
fn join_rejects_conflicts() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let first = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    let second = director
        .spawn_raid(&BossDefinition::new("tyranitar", 100), &location())
        .unwrap();

    assert!(matches!(
        director.join(first, P1, None),
        Err(RuntimeError::BattleRequired)
    ));
    director.join(first, P1, Some(B1)).unwrap();

    assert!(matches!(
        director.join(second, P1, Some(B2)),
        Err(RuntimeError::AlreadyJoined { session, .. }) if session == first
    ));
    assert!(matches!(
        director.join(second, P2, Some(B1)),
        Err(RuntimeError::BattleTaken { session, .. }) if session == first
    ));
    assert!(matches!(
        director.join(SessionId(99), P2, None),
        Err(RuntimeError::UnknownSession(_))
    ));
}

#[test]
fn leaving_keeps_the_roster_place() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    director.join(session, P1, Some(B1)).unwrap();

    assert_eq!(director.leave(P1).unwrap(), session);
    assert_eq!(director.session_for(P1), None);
    assert_eq!(director.status(session).unwrap().participants, 1);
    assert!(matches!(director.leave(P1), Err(RuntimeError::NotJoined(_))));

    director.join(session, P1, Some(B2)).unwrap();
    assert_eq!(director.session_for(P1), Some(session));
    assert_eq!(director.status(session).unwrap().participants, 1);
}

#[test]
fn cheers_reach_every_battle() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .spawn_raid(&BossDefinition::new("lapras", 100), &location())
        .unwrap();
    director.join(session, P1, Some(B1)).unwrap();
    director.join(session, P2, Some(B2)).unwrap();

    assert!(recorder.log().commands.iter().any(|(battle, command)| {
        *battle == B1 && matches!(command, BattleCommand::PlayerJoined { newcomer, .. } if *newcomer == P2)
    }));

    for _ in 0..3 {
        assert!(director.cheer(P1, B1, Cheer::Attack).unwrap());
    }
    assert!(!director.cheer(P1, B1, Cheer::Attack).unwrap());

    let shared = recorder
        .log()
        .commands
        .iter()
        .filter(|(battle, command)| {
            *battle == B2
                && *command
                    == BattleCommand::Cheer {
                        cheer: Cheer::Attack,
                        skip_enemy_action: true,
                    }
        })
        .count();
    assert_eq!(shared, 3);
}

#[test]
fn turn_scripts_target_the_reporting_battle() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    let boss = BossDefinition::new("lapras", 100).with_script("turn:2", "BOSS_ATK_1");
    let session = director.spawn_raid(&boss, &location()).unwrap();
    director.join(session, P1, Some(B1)).unwrap();

    director.run_turn(B1, 1).unwrap();
    director.run_turn(B1, 2).unwrap();
    director.run_turn(B1, 2).unwrap();

    let effect = ScriptEffect::lookup("BOSS_ATK_1").unwrap();
    let scripted: Vec<_> = recorder
        .log()
        .commands
        .iter()
        .filter(|(_, command)| matches!(command, BattleCommand::Script(_)))
        .cloned()
        .collect();
    assert_eq!(scripted, vec![(B1, BattleCommand::Script(effect))]);
}

#[test]
fn reward_failures_reach_the_caller() {
    let recorder = Recorder::default();
    recorder.log().fail_rewards = true;
    let mut director = director(&recorder, RaidConfig::new());
    let session = director
        .start_coop(&BossDefinition::new("eevee", 10), &location(), Some(1), None)
        .unwrap();
    director.join(session, P1, None).unwrap();

    let result = director.end_battle(P1, B1, BattleOutcome::Victory);
    assert!(matches!(
        result,
        Err(RuntimeError::Collaborator(CollaboratorError::Unavailable("rewards")))
    ));
    assert!(director.registry().is_empty());
}

#[test]
fn stop_all_fails_every_raid() {
    let recorder = Recorder::default();
    let mut director = director(&recorder, RaidConfig::new());
    for species in ["lapras", "tyranitar"] {
        let session = director
            .spawn_raid(&BossDefinition::new(species, 100), &location())
            .unwrap();
        director.join(session, ParticipantId(session.0), Some(BattleId(session.0))).unwrap();
    }

    assert_eq!(director.stop_all(), 2);
    assert!(director.registry().is_empty());
    assert!(director.statuses().is_empty());
    assert!(recorder.log().rewards.is_empty());
    assert_eq!(recorder.log().stopped.len(), 2);
}

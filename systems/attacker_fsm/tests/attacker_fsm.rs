use std::time::Duration;

use lane_defence_core::{
    ArmorDefinition, AttackerDefinition, AttackerKind, AttackerState, DamageKind, DeathCause,
    EffectCue, EntityId, LaneId, ProjectileKind, RangedProfile, SpecialAbility, SpecialEffect,
    Vec2,
};
use lane_defence_pool::Poolable;
use lane_defence_system_attacker_fsm::{Attacker, AttackerIntent, AttackerSpawn, Perception};

const TICK: Duration = Duration::from_millis(100);

fn definition() -> AttackerDefinition {
    AttackerDefinition {
        name: "grunt".to_owned(),
        max_health: 10.0,
        speed: 1.0,
        melee_damage: 3.0,
        melee_kind: DamageKind::Physical,
        melee_range: 0.6,
        attack_interval: Duration::from_millis(500),
        reward: 5,
        objective_damage: 2,
        death_delay: Duration::from_millis(300),
        priority: 1,
        radius: 0.4,
        death_cue: EffectCue::new(Some("poof".to_owned()), None),
        ..AttackerDefinition::default()
    }
}

fn spawn(definition: AttackerDefinition, x: f32) -> Attacker {
    let mut attacker = Attacker::create(AttackerKind::new(0));
    attacker.initialize(&AttackerSpawn {
        id: EntityId::new(7),
        definition,
        lane: LaneId::new(1),
        position: Vec2::new(x, 1.5),
        objective_x: 0.0,
    });
    attacker
}

fn run(attacker: &mut Attacker, perception: Perception, ticks: usize) -> Vec<AttackerIntent> {
    let mut out = Vec::new();
    for _ in 0..ticks {
        attacker.update(&perception, TICK, &mut out);
    }
    out
}

fn count(intents: &[AttackerIntent], wanted: fn(&AttackerIntent) -> bool) -> usize {
    intents.iter().filter(|intent| wanted(intent)).count()
}

#[test]
fn reaching_objective_dies_without_reward_and_releases_once() {
    let mut attacker = spawn(definition(), 0.25);

    let intents = run(&mut attacker, Perception::default(), 20);

    assert_eq!(attacker.state(), AttackerState::Dying);
    assert_eq!(attacker.death_cause(), Some(DeathCause::ReachedObjective));
    let objective = intents
        .iter()
        .position(|intent| matches!(intent, AttackerIntent::ObjectiveReached { damage: 2 }))
        .expect("objective intent");
    let changed = intents
        .iter()
        .position(|intent| {
            matches!(
                intent,
                AttackerIntent::StateChanged {
                    from: AttackerState::Moving,
                    to: AttackerState::Dying,
                }
            )
        })
        .expect("state change intent");
    assert!(objective < changed, "objective is reported before dying");
    assert_eq!(
        count(&intents, |intent| matches!(intent, AttackerIntent::RewardDropped { .. })),
        0
    );
    assert_eq!(
        count(&intents, |intent| matches!(intent, AttackerIntent::RequestRelease)),
        1
    );
}

#[test]
fn killed_attacker_drops_reward_and_plays_cue() {
    let mut attacker = spawn(definition(), 8.0);
    let report = attacker.take_damage(50.0, DamageKind::Fire);
    assert!(report.depleted);

    let intents = run(&mut attacker, Perception::default(), 10);

    assert_eq!(attacker.death_cause(), Some(DeathCause::Killed));
    assert!(intents.contains(&AttackerIntent::Died {
        cause: DeathCause::Killed
    }));
    assert!(intents.contains(&AttackerIntent::RewardDropped {
        amount: 5,
        position: Vec2::new(8.0, 1.5),
    }));
    assert_eq!(
        count(&intents, |intent| matches!(intent, AttackerIntent::Cue { .. })),
        1
    );
    assert_eq!(
        count(&intents, |intent| matches!(intent, AttackerIntent::RequestRelease)),
        1
    );
    assert_eq!(attacker.position(), Vec2::new(8.0, 1.5), "dying attackers stay put");
}

#[test]
fn dying_is_terminal_and_ignores_damage() {
    let mut attacker = spawn(definition(), 8.0);
    let _ = attacker.take_damage(10.0, DamageKind::Physical);
    let _ = run(&mut attacker, Perception::default(), 1);
    assert_eq!(attacker.state(), AttackerState::Dying);

    let mut out = Vec::new();
    attacker.change_state(AttackerState::Moving, DeathCause::Killed, &mut out);
    attacker.change_state(AttackerState::Dying, DeathCause::Killed, &mut out);
    let report = attacker.take_damage(10.0, DamageKind::Physical);

    assert!(out.is_empty());
    assert_eq!(attacker.state(), AttackerState::Dying);
    assert_eq!(report.to_health, 0.0);
    assert!(!attacker.record().targetable);
}

#[test]
fn adjacent_defender_is_struck_at_attack_interval() {
    let mut attacker = spawn(definition(), 8.0);
    let defender = EntityId::new(2);
    let perception = Perception {
        melee_target: Some(defender),
        ranged_target: None,
    };

    let intents = run(&mut attacker, perception, 10);

    assert_eq!(attacker.state(), AttackerState::Engaging);
    assert_eq!(attacker.target(), Some(defender));
    assert_eq!(attacker.position().x, 8.0, "engaged attackers hold position");
    assert_eq!(
        count(&intents, |intent| matches!(
            intent,
            AttackerIntent::MeleeStrike { damage, .. } if *damage == 3.0
        )),
        2
    );

    let intents = run(&mut attacker, Perception::default(), 1);
    assert_eq!(attacker.state(), AttackerState::Moving);
    assert!(intents.contains(&AttackerIntent::StateChanged {
        from: AttackerState::Engaging,
        to: AttackerState::Moving,
    }));
}

#[test]
fn ranged_attacker_fires_until_melee_contact() {
    let mut definition = definition();
    definition.ranged = Some(RangedProfile {
        projectile: ProjectileKind::new(3),
        range: 5.0,
        interval: Duration::from_millis(200),
    });
    let mut attacker = spawn(definition, 8.0);
    let defender = EntityId::new(4);
    let ranged = Perception {
        melee_target: None,
        ranged_target: Some((defender, Vec2::new(4.0, 1.5))),
    };

    let intents = run(&mut attacker, ranged, 4);

    assert_eq!(attacker.state(), AttackerState::RangedAttacking);
    assert_eq!(
        count(&intents, |intent| matches!(
            intent,
            AttackerIntent::FireProjectile { projectile, .. }
                if *projectile == ProjectileKind::new(3)
        )),
        2
    );

    let adjacent = Perception {
        melee_target: Some(defender),
        ranged_target: Some((defender, Vec2::new(4.0, 1.5))),
    };
    let _ = run(&mut attacker, adjacent, 1);
    assert_eq!(attacker.state(), AttackerState::Engaging);
}

#[test]
fn perception_without_ranged_profile_keeps_walking() {
    let mut attacker = spawn(definition(), 8.0);
    let perception = Perception {
        melee_target: None,
        ranged_target: Some((EntityId::new(1), Vec2::new(5.0, 1.5))),
    };

    let _ = run(&mut attacker, perception, 2);

    assert_eq!(attacker.state(), AttackerState::Moving);
    assert!(attacker.position().x < 8.0);
}

#[test]
fn charge_triggers_once_below_threshold() {
    let mut definition = definition();
    definition.special = Some(SpecialAbility {
        trigger_health_fraction: 0.5,
        duration: Duration::from_millis(300),
        effect: SpecialEffect::Charge {
            speed_multiplier: 3.0,
        },
        cue: EffectCue::new(None, Some("roar".to_owned())),
    });
    let mut attacker = spawn(definition, 9.0);
    let _ = attacker.take_damage(6.0, DamageKind::Physical);

    let intents = run(&mut attacker, Perception::default(), 1);
    assert_eq!(attacker.state(), AttackerState::Special);
    assert!((attacker.position().x - 8.7).abs() < 1e-4);
    let roared = intents.iter().any(|intent| match intent {
        AttackerIntent::Cue { cue, .. } => cue.sound.as_deref() == Some("roar"),
        _ => false,
    });
    assert!(roared);

    let intents = run(&mut attacker, Perception::default(), 4);
    assert_eq!(attacker.state(), AttackerState::Moving);
    assert_eq!(
        count(&intents, |intent| matches!(
            intent,
            AttackerIntent::StateChanged {
                to: AttackerState::Special,
                ..
            }
        )),
        0,
        "the special ability runs once per life"
    );
}

#[test]
fn regeneration_heals_while_special_runs() {
    let mut definition = definition();
    definition.special = Some(SpecialAbility {
        trigger_health_fraction: 0.5,
        duration: Duration::from_secs(1),
        effect: SpecialEffect::Regenerate { per_second: 10.0 },
        cue: EffectCue::default(),
    });
    let mut attacker = spawn(definition, 9.0);
    let _ = attacker.take_damage(8.0, DamageKind::Physical);

    let _ = run(&mut attacker, Perception::default(), 3);

    assert_eq!(attacker.state(), AttackerState::Special);
    assert!((attacker.health().current() - 5.0).abs() < 1e-4);
}

#[test]
fn record_combines_health_and_armor() {
    let mut definition = definition();
    definition.armor = Some(ArmorDefinition {
        durability: 4.0,
        damage_reduction: 0.5,
        ..ArmorDefinition::default()
    });
    let mut attacker = spawn(definition, 8.0);
    assert_eq!(attacker.record().health.max(), 14.0);
    assert_eq!(attacker.record().health.current(), 14.0);

    let report = attacker.take_damage(20.0, DamageKind::Physical);

    assert!(report.armor_broken);
    assert!(attacker.armor().is_none());
    assert_eq!(attacker.health().current(), 4.0);
    assert_eq!(attacker.record().health.current(), 4.0);
}

#[test]
fn knock_back_pushes_toward_spawn_edge() {
    let mut attacker = spawn(definition(), 8.0);
    let _ = run(&mut attacker, Perception::default(), 10);
    assert!((attacker.position().x - 7.0).abs() < 1e-4);

    attacker.knock_back(0.5);
    assert!((attacker.position().x - 7.5).abs() < 1e-4);

    attacker.knock_back(5.0);
    assert_eq!(attacker.position().x, 8.0);
}

#[test]
fn reset_instances_stay_silent() {
    let mut attacker = spawn(definition(), 8.0);
    attacker.reset();

    let intents = run(&mut attacker, Perception::default(), 5);

    assert!(intents.is_empty());
    assert!(!attacker.is_active());
}

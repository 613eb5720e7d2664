use std::time::Duration;

use lane_defence_core::{Command, Event, LaneId};
use lane_defence_world::{apply, query, Scenario, World};

const SCENARIO: &str = r#"
[arena]
lanes = 2
lane_height = 1.0
spawn_x = 12.0
objective_x = 0.0

[[projectiles]]
name = "seeker"
damage = 3.0
kind = "lightning"
speed = 6.0
lifetime = 2.0
motion = "homing"
homing_radius = 4.0
turn_rate = 6.0
splash_radius = 0.8
impact_cue = { effect = "zap" }

[[projectiles]]
name = "ricochet"
damage = 2.0
speed = 8.0
lifetime = 1.5
max_bounces = 2
destroy_cue = { sound = "tink" }

[[attackers]]
name = "shield"
max_health = 8.0
speed = 1.5
melee_damage = 2.0
melee_range = 0.5
attack_interval = 0.5
reward = 4
death_delay = 0.3
armor = { durability = 4.0, damage_reduction = 0.5, vulnerable_to = ["lightning"], break_cue = { effect = "shards" } }

[[attackers]]
name = "archer"
max_health = 5.0
speed = 1.0
reward = 2
ranged = { projectile = "ricochet", range = 6.0, interval = 0.8 }
special = { trigger_health_fraction = 0.5, duration = 1.0, effect = { type = "regenerate", per_second = 2.0 } }

[[defenders]]
name = "coil"
max_health = 15.0
projectile = "seeker"
range = 10.0
fire_interval = 0.4

[[placements]]
defender = "coil"
lane = 0
x = 1.0

[[placements]]
defender = "coil"
lane = 1
x = 1.5

[[obstacles]]
center = [6.0, 1.5]
half_extents = [0.2, 0.4]
bounceable = true
"#;

fn replay() -> (Vec<Event>, Vec<(u32, f32)>, u64) {
    let scenario = Scenario::from_toml_str(SCENARIO).expect("valid scenario");
    let mut world = World::from_scenario(&scenario);
    let mut events = Vec::new();
    for placement in scenario.placements() {
        apply(&mut world, placement.command(), &mut events);
    }

    let shield = scenario.definitions().attacker_kind("shield").expect("shield");
    let archer = scenario.definitions().attacker_kind("archer").expect("archer");
    for tick in 0..120u32 {
        if tick % 15 == 0 {
            let kind = if tick % 30 == 0 { shield } else { archer };
            apply(
                &mut world,
                Command::SpawnAttacker {
                    kind,
                    lane: LaneId::new(tick / 15 % 2),
                },
                &mut events,
            );
        }

        let attackers = query::attacker_view(&world);
        for defender in query::defender_view(&world).iter() {
            if !defender.ready_in.is_zero() {
                continue;
            }
            let target = attackers
                .iter()
                .find(|attacker| attacker.lane == defender.lane)
                .map(|attacker| attacker.id);
            if target.is_some() {
                apply(
                    &mut world,
                    Command::FireProjectile {
                        owner: defender.id,
                        target,
                    },
                    &mut events,
                );
            }
        }

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(50),
            },
            &mut events,
        );
    }

    let positions = query::attacker_view(&world)
        .iter()
        .map(|attacker| (attacker.id.get(), attacker.position.x))
        .collect();
    (events, positions, query::objective_damage(&world))
}

#[test]
fn identical_scripts_replay_identically() {
    let first = replay();
    let second = replay();

    assert_eq!(first, second);
}

#[test]
fn replay_exercises_the_combat_pipeline() {
    let (events, _, _) = replay();

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::DamageApplied { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileFired { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::ProjectileTerminated { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::AttackerSpawned { .. })));
}

use std::time::Duration;

use lane_defence_core::{
    AttackerDefinition, AttackerKind, Command, DamageKind, DefenderDefinition, DefenderKind,
    EntityId, LaneId, ProjectileDefinition, ProjectileKind, SpawnFailure, TerminationReason,
};
use lane_defence_pool::PoolSettings;
use lane_defence_system_combat_stats::{CombatReport, CombatStats};
use lane_defence_world::{apply, query, ArenaSettings, Definitions, World};

fn world() -> World {
    let mut definitions = Definitions::new();
    let _ = definitions.add_projectile(
        ProjectileDefinition {
            name: "ember".to_owned(),
            damage: 5.0,
            kind: DamageKind::Fire,
            speed: 5.0,
            lifetime: Duration::from_secs(3),
            radius: 0.1,
            ..ProjectileDefinition::default()
        },
        PoolSettings::default(),
    );
    let _ = definitions.add_attacker(
        AttackerDefinition {
            name: "grunt".to_owned(),
            max_health: 10.0,
            speed: 1.0,
            reward: 3,
            radius: 0.3,
            ..AttackerDefinition::default()
        },
        PoolSettings::new(1, 1, false),
    );
    let _ = definitions.add_defender(DefenderDefinition {
        name: "brazier".to_owned(),
        max_health: 8.0,
        projectile: ProjectileKind::new(0),
        range: 12.0,
        fire_interval: Duration::from_millis(500),
        radius: 0.3,
        ..DefenderDefinition::default()
    });
    World::new(ArenaSettings::new(1, 1.0, 10.0, 0.0), definitions)
}

fn run() -> CombatReport {
    let mut world = world();
    let mut stats = CombatStats::new();
    let mut events = Vec::new();
    for command in [
        Command::PlaceDefender {
            kind: DefenderKind::new(0),
            lane: LaneId::new(0),
            x: 1.0,
        },
        Command::SpawnAttacker {
            kind: AttackerKind::new(0),
            lane: LaneId::new(0),
        },
        Command::SpawnAttacker {
            kind: AttackerKind::new(0),
            lane: LaneId::new(0),
        },
    ] {
        apply(&mut world, command, &mut events);
    }
    stats.handle(&events);

    let grunt = EntityId::new(2);
    for _ in 0..60 {
        events.clear();
        let ready = query::defender_view(&world)
            .iter()
            .any(|defender| defender.ready_in.is_zero());
        if ready && !query::attacker_view(&world).is_empty() {
            apply(
                &mut world,
                Command::FireProjectile {
                    owner: EntityId::new(1),
                    target: Some(grunt),
                },
                &mut events,
            );
        }
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        stats.handle(&events);
    }

    stats.report().clone()
}

#[test]
fn report_tracks_a_defender_kill() {
    let report = run();

    assert_eq!(report.ticks(), 60);
    assert_eq!(report.elapsed(), Duration::from_secs(6));
    assert_eq!(report.spawned(), 1);
    assert_eq!(report.spawn_failures(SpawnFailure::PoolExhausted), 1);
    assert_eq!(report.defenders_placed(), 1);
    assert_eq!(report.killed(), 1);
    assert_eq!(report.leaked(), 0);
    assert_eq!(report.released(), 1);
    assert_eq!(report.rewards(), 3);
    assert!((report.damage(DamageKind::Fire) - 10.0).abs() < 1e-4);
    assert_eq!(report.damage(DamageKind::Physical), 0.0);
    assert_eq!(report.projectiles_fired(), report.total_terminated());
    assert!(report.terminated(TerminationReason::Impact) >= 2);
}

#[test]
fn identical_runs_produce_identical_reports() {
    assert_eq!(run(), run());
}

use std::time::Duration;

use lane_defence_core::{
    AttackerDefinition, AttackerKind, Command, DefenderDefinition, DefenderKind, Event, LaneId,
    ProjectileDefinition, ProjectileKind,
};
use lane_defence_pool::PoolSettings;
use lane_defence_system_defender_combat::DefenderCombat;
use lane_defence_world::{apply, query, ArenaSettings, Definitions, World};

fn world() -> World {
    let mut definitions = Definitions::new();
    let _ = definitions.add_projectile(
        ProjectileDefinition {
            name: "dart".to_owned(),
            damage: 2.0,
            speed: 8.0,
            lifetime: Duration::from_secs(2),
            radius: 0.1,
            ..ProjectileDefinition::default()
        },
        PoolSettings::default(),
    );
    let _ = definitions.add_attacker(
        AttackerDefinition {
            name: "scout".to_owned(),
            max_health: 6.0,
            speed: 0.5,
            reward: 1,
            radius: 0.3,
            ..AttackerDefinition::default()
        },
        PoolSettings::default(),
    );
    let _ = definitions.add_defender(DefenderDefinition {
        name: "post".to_owned(),
        max_health: 10.0,
        projectile: ProjectileKind::new(0),
        range: 8.0,
        fire_interval: Duration::from_millis(300),
        radius: 0.3,
        ..DefenderDefinition::default()
    });
    World::new(ArenaSettings::new(2, 1.0, 8.0, 0.0), definitions)
}

#[test]
fn ready_defenders_shoot_attackers_in_their_lane() {
    let mut world = world();
    let mut system = DefenderCombat::new();
    let mut events = Vec::new();
    for command in [
        Command::PlaceDefender {
            kind: DefenderKind::new(0),
            lane: LaneId::new(0),
            x: 1.0,
        },
        Command::PlaceDefender {
            kind: DefenderKind::new(0),
            lane: LaneId::new(1),
            x: 1.0,
        },
        Command::SpawnAttacker {
            kind: AttackerKind::new(0),
            lane: LaneId::new(0),
        },
    ] {
        apply(&mut world, command, &mut events);
    }

    let mut commands = Vec::new();
    for _ in 0..40 {
        commands.clear();
        system.handle(
            &query::defender_view(&world),
            query::registry(&world),
            &mut commands,
        );
        for command in commands.drain(..) {
            apply(&mut world, command, &mut events);
        }
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
    }

    let shooters: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::ProjectileFired { owner, .. } => Some(owner.get()),
            _ => None,
        })
        .collect();
    assert!(!shooters.is_empty());
    assert!(shooters.iter().all(|owner| *owner == 1), "lane one stays quiet");
    assert!(events.iter().any(|event| matches!(
        event,
        Event::AttackerDied { id, .. } if id.get() == 3
    )));
    assert!(query::attacker_view(&world).is_empty());
}

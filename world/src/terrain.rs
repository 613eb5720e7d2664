//! Broad-phase collision queries answered from the registry and the arena.

use lane_defence_core::{EntityCategory, EntityId, EntityRecord, Faction, Vec2};
use lane_defence_registry::EntityRegistry;
use lane_defence_system_projectiles::{CollisionQuery, Contact};

use crate::arena::Obstacle;

/// Read-only collision view handed to projectiles while they update.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WorldView<'a> {
    registry: &'a EntityRegistry,
    obstacles: &'a [Obstacle],
}

impl<'a> WorldView<'a> {
    pub(crate) fn new(registry: &'a EntityRegistry, obstacles: &'a [Obstacle]) -> Self {
        Self {
            registry,
            obstacles,
        }
    }
}

impl CollisionQuery for WorldView<'_> {
    fn contacts(&self, position: Vec2, radius: f32, out: &mut Vec<Contact>) {
        let bodies = self.registry.find_overlapping(position, radius, |record| {
            record.category != EntityCategory::Projectile
        });
        out.extend(bodies.into_iter().map(Contact::Entity));
        for obstacle in self.obstacles {
            if let Some(normal) = obstacle.contact_normal(position, radius) {
                out.push(Contact::Terrain {
                    bounceable: obstacle.is_bounceable(),
                    normal,
                });
            }
        }
    }

    fn entity(&self, id: EntityId) -> Option<&EntityRecord> {
        self.registry.get(id)
    }

    fn nearest_hostile(&self, origin: Vec2, radius: f32, faction: Faction) -> Option<EntityId> {
        self.registry
            .find_nearest_target(origin, radius, |record| faction.opposes(record.faction))
            .map(|record| record.id)
    }

    fn hostiles_within(
        &self,
        origin: Vec2,
        radius: f32,
        faction: Faction,
        out: &mut Vec<EntityId>,
    ) {
        let hostiles = self
            .registry
            .find_targets_in_range(origin, radius, |record| faction.opposes(record.faction));
        out.extend(hostiles.into_iter().map(|record| record.id));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{Health, LaneId};

    fn record(id: u32, category: EntityCategory, faction: Faction, x: f32) -> EntityRecord {
        EntityRecord {
            id: EntityId::new(id),
            category,
            faction,
            lane: Some(LaneId::new(0)),
            position: Vec2::new(x, 0.5),
            health: Health::new(5.0),
            priority: 0,
            radius: 0.25,
            active: true,
            targetable: true,
        }
    }

    #[test]
    fn contacts_list_bodies_before_terrain() {
        let mut registry = EntityRegistry::default();
        let _ = registry.register(record(1, EntityCategory::Attacker, Faction::Attacking, 3.1));
        let _ = registry.register(record(2, EntityCategory::Defender, Faction::Defending, 2.9));
        let obstacles = [Obstacle::new(Vec2::new(3.2, 0.5), Vec2::splat(0.2), true)];
        let view = WorldView::new(&registry, &obstacles);

        let mut contacts = Vec::new();
        view.contacts(Vec2::new(3.0, 0.5), 0.1, &mut contacts);

        assert_eq!(contacts.len(), 3);
        assert!(matches!(contacts[0], Contact::Entity(_)));
        assert!(matches!(contacts[2], Contact::Terrain { bounceable: true, .. }));
    }

    #[test]
    fn hostility_follows_faction() {
        let mut registry = EntityRegistry::default();
        let _ = registry.register(record(1, EntityCategory::Attacker, Faction::Attacking, 4.0));
        let _ = registry.register(record(2, EntityCategory::Defender, Faction::Defending, 1.0));
        let view = WorldView::new(&registry, &[]);

        assert_eq!(
            view.nearest_hostile(Vec2::new(1.0, 0.5), 5.0, Faction::Defending),
            Some(EntityId::new(1))
        );
        let mut hostiles = Vec::new();
        view.hostiles_within(Vec2::new(4.0, 0.5), 5.0, Faction::Attacking, &mut hostiles);
        assert_eq!(hostiles, vec![EntityId::new(2)]);
    }
}

//! Authoritative defender state management utilities.

use std::{collections::BTreeMap, time::Duration};

use lane_defence_core::{
    DefenderDefinition, DefenderKind, DefenderSnapshot, EntityCategory, EntityId, EntityRecord,
    Faction, Health, LaneId, Vec2,
};

/// Defender stored inside the world.
#[derive(Clone, Debug)]
pub(crate) struct Defender {
    /// Identifier allocated by the world for the defender.
    pub(crate) id: EntityId,
    /// Kind of defender that was placed.
    pub(crate) kind: DefenderKind,
    /// Lane the defender guards.
    pub(crate) lane: LaneId,
    /// World position of the defender.
    pub(crate) position: Vec2,
    /// Remaining hit points.
    pub(crate) health: Health,
    /// Time until the defender may fire again.
    pub(crate) ready_in: Duration,
    /// Statistics the defender was placed with.
    pub(crate) definition: DefenderDefinition,
}

impl Defender {
    pub(crate) fn new(
        id: EntityId,
        kind: DefenderKind,
        lane: LaneId,
        position: Vec2,
        definition: DefenderDefinition,
    ) -> Self {
        Self {
            id,
            kind,
            lane,
            position,
            health: Health::new(definition.max_health),
            ready_in: Duration::ZERO,
            definition,
        }
    }

    /// Registry record describing the defender.
    pub(crate) fn record(&self) -> EntityRecord {
        EntityRecord {
            id: self.id,
            category: EntityCategory::Defender,
            faction: Faction::Defending,
            lane: Some(self.lane),
            position: self.position,
            health: self.health,
            priority: self.definition.priority,
            radius: self.definition.radius,
            active: !self.health.is_depleted(),
            targetable: true,
        }
    }

    pub(crate) fn snapshot(&self) -> DefenderSnapshot {
        DefenderSnapshot {
            id: self.id,
            kind: self.kind,
            lane: self.lane,
            position: self.position,
            health: self.health,
            ready_in: self.ready_in,
            range: self.definition.range,
            targeting: self.definition.targeting,
        }
    }
}

/// Defenders currently standing in the arena, keyed by identifier.
#[derive(Debug, Default)]
pub(crate) struct DefenderRoster {
    entries: BTreeMap<EntityId, Defender>,
}

impl DefenderRoster {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, defender: Defender) {
        let _ = self.entries.insert(defender.id, defender);
    }

    pub(crate) fn get(&self, id: EntityId) -> Option<&Defender> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: EntityId) -> Option<&mut Defender> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn remove(&mut self, id: EntityId) -> Option<Defender> {
        self.entries.remove(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Defender> {
        self.entries.values()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Counts every cooldown down by `dt`.
    pub(crate) fn cool_down(&mut self, dt: Duration) {
        for defender in self.entries.values_mut() {
            defender.ready_in = defender.ready_in.saturating_sub(dt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn archer(id: u32) -> Defender {
        Defender::new(
            EntityId::new(id),
            DefenderKind::new(0),
            LaneId::new(1),
            Vec2::new(2.0, 1.5),
            DefenderDefinition {
                name: "archer".to_owned(),
                max_health: 12.0,
                range: 6.0,
                fire_interval: Duration::from_millis(400),
                radius: 0.4,
                ..DefenderDefinition::default()
            },
        )
    }

    #[test]
    fn roster_starts_empty() {
        let roster = DefenderRoster::new();
        assert_eq!(roster.len(), 0);
        assert!(roster.get(EntityId::new(1)).is_none());
    }

    #[test]
    fn cooldowns_saturate_at_zero() {
        let mut roster = DefenderRoster::new();
        let mut defender = archer(3);
        defender.ready_in = Duration::from_millis(150);
        roster.insert(defender);

        roster.cool_down(Duration::from_millis(100));
        assert_eq!(
            roster.get(EntityId::new(3)).map(|defender| defender.ready_in),
            Some(Duration::from_millis(50))
        );

        roster.cool_down(Duration::from_millis(100));
        assert_eq!(
            roster.get(EntityId::new(3)).map(|defender| defender.ready_in),
            Some(Duration::ZERO)
        );
    }

    #[test]
    fn record_goes_inactive_when_health_is_spent() {
        let mut defender = archer(4);
        assert!(defender.record().active);

        let _ = defender.health.apply_damage(50.0);
        let record = defender.record();

        assert!(!record.active);
        assert_eq!(record.category, EntityCategory::Defender);
        assert_eq!(defender.snapshot().range, 6.0);
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks defender targets and emits firing commands.

use lane_defence_core::{
    Command, DefenderSnapshot, DefenderView, EntityCategory, EntityId, EntityRecord, Faction,
    TargetingMode,
};
use lane_defence_registry::EntityRegistry;

/// Defender combat system that queues firing commands for ready defenders.
#[derive(Debug, Default)]
pub struct DefenderCombat {
    scratch: Vec<Command>,
}

impl DefenderCombat {
    /// Creates a new defender combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::FireProjectile` entries for defenders ready to fire.
    ///
    /// A defender only considers attackers in its own lane that have not yet
    /// walked past it. Commands are ordered by ascending defender id.
    pub fn handle(
        &mut self,
        defenders: &DefenderView,
        registry: &EntityRegistry,
        out: &mut Vec<Command>,
    ) {
        if defenders.is_empty() || registry.count(EntityCategory::Attacker) == 0 {
            return;
        }

        self.scratch.clear();

        for defender in defenders.iter() {
            if !defender.ready_in.is_zero() || defender.health.is_depleted() {
                continue;
            }
            if let Some(target) = select_target(defender, registry) {
                self.scratch.push(Command::FireProjectile {
                    owner: defender.id,
                    target: Some(target),
                });
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

fn select_target(defender: &DefenderSnapshot, registry: &EntityRegistry) -> Option<EntityId> {
    let lane = defender.lane;
    let origin = defender.position;
    let ahead = |record: &EntityRecord| {
        record.category == EntityCategory::Attacker
            && Faction::Defending.opposes(record.faction)
            && record.lane == Some(lane)
            && record.position.x >= origin.x
    };
    let record = match defender.targeting {
        TargetingMode::Nearest => registry.find_nearest_target(origin, defender.range, ahead),
        TargetingMode::HighestPriority => {
            registry.find_highest_priority_target(origin, defender.range, ahead)
        }
    };
    record.map(|record| record.id)
}

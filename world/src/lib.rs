#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative combat simulation state for Lane Defence.
//!
//! The [`World`] owns the entity registry, the attacker and projectile pools
//! and every placed defender. All mutation flows through [`apply`], which
//! consumes a [`Command`] and appends the resulting [`Event`] values; pure
//! systems observe the world through the functions in [`query`].

mod arena;
mod config;
mod defenders;
mod definitions;
mod terrain;

use std::{collections::BTreeMap, time::Duration};

use lane_defence_core::{
    AttackerKind, Command, DamageDealer, DamageKind, DefenderKind, EntityCategory, EntityId,
    EntityRecord, Event, Faction, LaneId, PrewarmTarget, ProjectileKind, SpawnFailure, Vec2,
    WELCOME_BANNER,
};
use lane_defence_pool::{ObjectPool, PoolHandle, PoolSettings};
use lane_defence_registry::EntityRegistry;
use lane_defence_system_attacker_fsm::{Attacker, AttackerIntent, AttackerSpawn, Perception};
use lane_defence_system_damage::apply_damage;
use lane_defence_system_projectiles::{Projectile, ProjectileIntent, ProjectileSpawn};
use log::{debug, error, info, warn};

pub use arena::{ArenaSettings, Obstacle};
pub use config::{ConfigError, Placement, Scenario};
pub use definitions::Definitions;

use defenders::{Defender, DefenderRoster};
use terrain::WorldView;

const ATTACKER_POOL: &str = "attacker";
const PROJECTILE_POOL: &str = "projectile";

/// Represents the authoritative Lane Defence world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    arena: ArenaSettings,
    definitions: Definitions,
    registry: EntityRegistry,
    attackers: ObjectPool<Attacker>,
    projectiles: ObjectPool<Projectile>,
    attacker_handles: BTreeMap<EntityId, PoolHandle>,
    projectile_handles: BTreeMap<EntityId, PoolHandle>,
    defenders: DefenderRoster,
    next_entity: u32,
    tick_index: u64,
    objective_damage: u64,
    attacker_intents: Vec<AttackerIntent>,
    projectile_intents: Vec<ProjectileIntent>,
}

impl World {
    /// Creates a world for the arena, configuring one pool entry per kind.
    #[must_use]
    pub fn new(arena: ArenaSettings, definitions: Definitions) -> Self {
        let mut attackers = ObjectPool::new(ATTACKER_POOL, PoolSettings::default());
        for kind in definitions.attacker_kinds() {
            if let Some(settings) = definitions.attacker_pool(kind) {
                attackers.configure(kind, settings);
            }
        }
        let mut projectiles = ObjectPool::new(PROJECTILE_POOL, PoolSettings::default());
        for kind in definitions.projectile_kinds() {
            if let Some(settings) = definitions.projectile_pool(kind) {
                projectiles.configure(kind, settings);
            }
        }

        Self {
            banner: WELCOME_BANNER,
            registry: EntityRegistry::new(arena.sweep_interval()),
            arena,
            definitions,
            attackers,
            projectiles,
            attacker_handles: BTreeMap::new(),
            projectile_handles: BTreeMap::new(),
            defenders: DefenderRoster::new(),
            next_entity: 1,
            tick_index: 0,
            objective_damage: 0,
            attacker_intents: Vec::new(),
            projectile_intents: Vec::new(),
        }
    }

    /// Creates a world from a validated scenario without placing defenders.
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self::new(scenario.arena().clone(), scenario.definitions().clone())
    }

    fn pending_id(&self) -> EntityId {
        EntityId::new(self.next_entity)
    }

    fn commit_id(&mut self) {
        self.next_entity = self.next_entity.saturating_add(1);
    }

    fn spawn_attacker(&mut self, kind: AttackerKind, lane: LaneId, out_events: &mut Vec<Event>) {
        let Some(y) = self.arena.lane_center(lane) else {
            warn!("spawn of attacker {:?} skipped: unknown lane {}", kind, lane.get());
            out_events.push(Event::SpawnSkipped {
                kind,
                lane,
                reason: SpawnFailure::UnknownLane,
            });
            return;
        };
        let Some(definition) = self.definitions.attacker(kind).cloned() else {
            error!("spawn skipped: no attacker definition for {:?}", kind);
            out_events.push(Event::SpawnSkipped {
                kind,
                lane,
                reason: SpawnFailure::UnknownKind,
            });
            return;
        };

        let id = self.pending_id();
        let position = Vec2::new(self.arena.spawn_x(), y);
        let spawn = AttackerSpawn {
            id,
            definition,
            lane,
            position,
            objective_x: self.arena.objective_x(),
        };
        let handle = match self.attackers.acquire(kind, &spawn) {
            Ok(handle) => handle,
            Err(_) => {
                out_events.push(Event::SpawnSkipped {
                    kind,
                    lane,
                    reason: SpawnFailure::PoolExhausted,
                });
                return;
            }
        };

        self.commit_id();
        if let Some(attacker) = self.attackers.get(handle) {
            let _ = self.registry.register(attacker.record());
        }
        let _ = self.attacker_handles.insert(id, handle);
        debug!("attacker {} spawned in lane {}", id.get(), lane.get());
        out_events.push(Event::AttackerSpawned {
            id,
            kind,
            lane,
            position,
        });
    }

    fn place_defender(
        &mut self,
        kind: DefenderKind,
        lane: LaneId,
        x: f32,
        out_events: &mut Vec<Event>,
    ) {
        let Some(y) = self.arena.lane_center(lane) else {
            warn!("placement of defender {:?} rejected: unknown lane {}", kind, lane.get());
            out_events.push(Event::PlacementRejected {
                kind,
                lane,
                reason: SpawnFailure::UnknownLane,
            });
            return;
        };
        let Some(definition) = self.definitions.defender(kind).cloned() else {
            error!("placement rejected: no defender definition for {:?}", kind);
            out_events.push(Event::PlacementRejected {
                kind,
                lane,
                reason: SpawnFailure::UnknownKind,
            });
            return;
        };

        let id = self.pending_id();
        self.commit_id();
        let position = Vec2::new(x, y);
        let defender = Defender::new(id, kind, lane, position, definition);
        let _ = self.registry.register(defender.record());
        self.defenders.insert(defender);
        out_events.push(Event::DefenderPlaced {
            id,
            kind,
            lane,
            position,
        });
    }

    fn fire_from(
        &mut self,
        owner: EntityId,
        target: Option<EntityId>,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(defender) = self.defenders.get(owner) {
            let projectile = defender.definition.projectile;
            if !defender.ready_in.is_zero() || defender.health.is_depleted() {
                debug!("defender {} is not ready to fire", owner.get());
                out_events.push(Event::ProjectileSkipped {
                    kind: projectile,
                    owner,
                    reason: SpawnFailure::UnknownOwner,
                });
                return;
            }
            let origin = defender.position;
            let interval = defender.definition.fire_interval;
            if self.launch(owner, Faction::Defending, origin, projectile, target, out_events) {
                if let Some(defender) = self.defenders.get_mut(owner) {
                    defender.ready_in = interval;
                }
            }
            return;
        }

        let ranged = self
            .attacker_handles
            .get(&owner)
            .and_then(|handle| self.attackers.get(*handle))
            .filter(|attacker| !attacker.state().is_terminal())
            .and_then(|attacker| {
                attacker
                    .definition()
                    .ranged
                    .map(|ranged| (attacker.position(), ranged.projectile))
            });
        match ranged {
            Some((origin, projectile)) => {
                let _ = self.launch(
                    owner,
                    Faction::Attacking,
                    origin,
                    projectile,
                    target,
                    out_events,
                );
            }
            None => {
                warn!("entity {} cannot fire a projectile", owner.get());
                out_events.push(Event::ProjectileSkipped {
                    kind: ProjectileKind::default(),
                    owner,
                    reason: SpawnFailure::UnknownOwner,
                });
            }
        }
    }

    fn launch(
        &mut self,
        owner: EntityId,
        owner_faction: Faction,
        origin: Vec2,
        kind: ProjectileKind,
        target: Option<EntityId>,
        out_events: &mut Vec<Event>,
    ) -> bool {
        let Some(definition) = self.definitions.projectile(kind).cloned() else {
            error!("launch skipped: no projectile definition for {:?}", kind);
            out_events.push(Event::ProjectileSkipped {
                kind,
                owner,
                reason: SpawnFailure::UnknownKind,
            });
            return false;
        };

        let target = target
            .and_then(|id| self.registry.get(id))
            .filter(|record| record.active)
            .map(|record| (record.id, record.position));
        let direction = target.map_or(Vec2::ZERO, |(_, position)| position - origin);
        let id = self.pending_id();
        let spawn = ProjectileSpawn {
            id,
            definition,
            owner,
            owner_faction,
            origin,
            direction,
            target,
        };
        let handle = match self.projectiles.acquire(kind, &spawn) {
            Ok(handle) => handle,
            Err(_) => {
                out_events.push(Event::ProjectileSkipped {
                    kind,
                    owner,
                    reason: SpawnFailure::PoolExhausted,
                });
                return false;
            }
        };

        self.commit_id();
        if let Some(projectile) = self.projectiles.get(handle) {
            let _ = self.registry.register(projectile.record());
        }
        let _ = self.projectile_handles.insert(id, handle);
        out_events.push(Event::ProjectileFired { id, kind, owner });
        true
    }

    fn prewarm(&mut self, target: PrewarmTarget, count: usize, out_events: &mut Vec<Event>) {
        let created = match target {
            PrewarmTarget::Attackers(kind) if self.definitions.attacker(kind).is_some() => {
                self.attackers.prewarm(kind, count)
            }
            PrewarmTarget::Projectiles(kind) if self.definitions.projectile(kind).is_some() => {
                self.projectiles.prewarm(kind, count)
            }
            _ => {
                error!("prewarm skipped: no definition for {:?}", target);
                0
            }
        };
        out_events.push(Event::PoolsPrewarmed { target, created });
    }

    fn end_level(&mut self, out_events: &mut Vec<Event>) {
        let mut intents = std::mem::take(&mut self.projectile_intents);
        for (&id, &handle) in &self.projectile_handles {
            let Some(projectile) = self.projectiles.get_mut(handle) else {
                continue;
            };
            intents.clear();
            projectile.cancel(&mut intents);
            for intent in intents.drain(..) {
                match intent {
                    ProjectileIntent::Cue { cue, position } => cue.emit(position, out_events),
                    ProjectileIntent::Terminate { reason } => {
                        out_events.push(Event::ProjectileTerminated { id, reason });
                    }
                    ProjectileIntent::Hit { .. }
                    | ProjectileIntent::Splash { .. }
                    | ProjectileIntent::Bounced { .. } => {}
                }
            }
        }
        self.projectile_intents = intents;

        let attackers_released = self.attackers.release_all();
        let projectiles_released = self.projectiles.release_all();
        self.attacker_handles.clear();
        self.projectile_handles.clear();
        self.defenders.clear();
        self.registry.clear();
        info!(
            "level ended: {} attackers and {} projectiles returned",
            attackers_released, projectiles_released
        );
        out_events.push(Event::LevelEnded {
            attackers_released,
            projectiles_released,
        });
    }

    fn clear_pools(&mut self, out_events: &mut Vec<Event>) {
        let pooled: Vec<EntityId> = self
            .attacker_handles
            .keys()
            .chain(self.projectile_handles.keys())
            .copied()
            .collect();
        for id in pooled {
            let _ = self.registry.unregister(id);
        }
        self.attacker_handles.clear();
        self.projectile_handles.clear();
        let destroyed = self.attackers.clear_all() + self.projectiles.clear_all();
        info!("pools cleared: {} instances destroyed", destroyed);
        out_events.push(Event::PoolsCleared { destroyed });
    }

    fn tick(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.tick_index = self.tick_index.saturating_add(1);
        out_events.push(Event::TimeAdvanced { dt });

        let swept = self.registry.advance(dt);
        if swept > 0 {
            debug!("registry sweep removed {} records", swept);
        }
        self.defenders.cool_down(dt);

        let attacker_ids: Vec<EntityId> = self.attacker_handles.keys().copied().collect();
        for id in attacker_ids {
            self.update_attacker(id, dt, out_events);
        }

        let projectile_ids: Vec<EntityId> = self.projectile_handles.keys().copied().collect();
        for id in projectile_ids {
            self.update_projectile(id, dt, out_events);
        }
    }

    fn perceive(&self, attacker: &Attacker) -> Perception {
        let lane = attacker.lane();
        let position = attacker.position();
        let blocking = |record: &EntityRecord| {
            record.category == EntityCategory::Defender
                && Faction::Attacking.opposes(record.faction)
                && record.lane == Some(lane)
                && record.position.x <= position.x
        };
        let melee_target = self
            .registry
            .find_nearest_target(position, attacker.definition().melee_range, blocking)
            .map(|record| record.id);
        let ranged_target = attacker.definition().ranged.and_then(|ranged| {
            self.registry
                .find_nearest_target(position, ranged.range, blocking)
                .map(|record| (record.id, record.position))
        });
        Perception {
            melee_target,
            ranged_target,
        }
    }

    fn update_attacker(&mut self, id: EntityId, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(handle) = self.attacker_handles.get(&id).copied() else {
            return;
        };
        let Some(perception) = self.attackers.get(handle).map(|attacker| self.perceive(attacker))
        else {
            return;
        };

        let mut intents = std::mem::take(&mut self.attacker_intents);
        intents.clear();
        let Some(attacker) = self.attackers.get_mut(handle) else {
            self.attacker_intents = intents;
            return;
        };
        attacker.update(&perception, dt, &mut intents);
        let kind = attacker.kind();
        let position = attacker.position();
        let _ = self.registry.update(attacker.record());

        for intent in intents.drain(..) {
            match intent {
                AttackerIntent::StateChanged { from, to } => {
                    out_events.push(Event::AttackerStateChanged { id, from, to });
                }
                AttackerIntent::MeleeStrike {
                    target,
                    damage,
                    kind,
                } => self.damage_entity(target, Some(id), damage, kind, 0.0, out_events),
                AttackerIntent::FireProjectile { target, projectile } => {
                    let _ = self.launch(
                        id,
                        Faction::Attacking,
                        position,
                        projectile,
                        Some(target),
                        out_events,
                    );
                }
                AttackerIntent::ObjectiveReached { damage } => {
                    self.objective_damage = self.objective_damage.saturating_add(u64::from(damage));
                    out_events.push(Event::ObjectiveReached {
                        attacker: id,
                        damage,
                    });
                }
                AttackerIntent::Died { cause } => {
                    out_events.push(Event::AttackerDied { id, kind, cause });
                }
                AttackerIntent::RewardDropped { amount, position } => {
                    out_events.push(Event::RewardDropped {
                        attacker: id,
                        amount,
                        position,
                    });
                }
                AttackerIntent::Cue { cue, position } => cue.emit(position, out_events),
                AttackerIntent::RequestRelease => self.release_attacker(id, out_events),
            }
        }
        self.attacker_intents = intents;
    }

    fn update_projectile(&mut self, id: EntityId, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(handle) = self.projectile_handles.get(&id).copied() else {
            return;
        };

        let mut intents = std::mem::take(&mut self.projectile_intents);
        intents.clear();
        let updated = {
            let Self {
                registry,
                arena,
                projectiles,
                ..
            } = &mut *self;
            projectiles.get_mut(handle).map(|projectile| {
                let view = WorldView::new(registry, arena.obstacles());
                projectile.update(&view, dt, &mut intents);
                let _ = registry.update(projectile.record());
                projectile.owner()
            })
        };
        let Some(owner) = updated else {
            self.projectile_intents = intents;
            return;
        };

        for intent in intents.drain(..) {
            match intent {
                ProjectileIntent::Hit {
                    target,
                    damage,
                    kind,
                    knockback,
                } => self.damage_entity(target, owner, damage, kind, knockback, out_events),
                ProjectileIntent::Splash {
                    target,
                    damage,
                    kind,
                } => self.damage_entity(target, owner, damage, kind, 0.0, out_events),
                ProjectileIntent::Bounced { bounces } => {
                    out_events.push(Event::ProjectileBounced { id, bounces });
                }
                ProjectileIntent::Cue { cue, position } => cue.emit(position, out_events),
                ProjectileIntent::Terminate { reason } => {
                    out_events.push(Event::ProjectileTerminated { id, reason });
                    self.release_projectile(id);
                }
            }
        }
        self.projectile_intents = intents;
    }

    fn damage_entity(
        &mut self,
        target: EntityId,
        source: Option<EntityId>,
        damage: f32,
        kind: DamageKind,
        knockback: f32,
        out_events: &mut Vec<Event>,
    ) {
        if let Some(handle) = self.attacker_handles.get(&target).copied() {
            let Some(attacker) = self.attackers.get_mut(handle) else {
                return;
            };
            let report = attacker.take_damage(damage, kind);
            attacker.knock_back(knockback);
            let position = attacker.position();
            let break_cue = attacker
                .definition()
                .armor
                .as_ref()
                .map(|armor| armor.break_cue.clone());
            let _ = self.registry.update(attacker.record());

            if report.landed() > 0.0 {
                out_events.push(Event::DamageApplied {
                    target,
                    source,
                    kind,
                    amount: report.landed(),
                    absorbed: report.absorbed,
                    to_health: report.to_health,
                });
            }
            if report.armor_broken {
                out_events.push(Event::ArmorBroken {
                    id: target,
                    position,
                });
                if let Some(cue) = break_cue {
                    cue.emit(position, out_events);
                }
            }
            return;
        }

        if let Some(defender) = self.defenders.get_mut(target) {
            let report = apply_damage(&mut defender.health, &mut None, damage, kind);
            let _ = self.registry.update(defender.record());
            if report.landed() > 0.0 {
                out_events.push(Event::DamageApplied {
                    target,
                    source,
                    kind,
                    amount: report.landed(),
                    absorbed: 0.0,
                    to_health: report.to_health,
                });
            }
            if report.depleted {
                let _ = self.registry.mark_inactive(target);
                let _ = self.defenders.remove(target);
                debug!("defender {} destroyed", target.get());
                out_events.push(Event::DefenderDestroyed { id: target });
            }
            return;
        }

        debug!("damage for {} dropped: target no longer exists", target.get());
    }

    fn release_attacker(&mut self, id: EntityId, out_events: &mut Vec<Event>) {
        let Some(handle) = self.attacker_handles.remove(&id) else {
            return;
        };
        let _ = self.attackers.release(handle);
        let _ = self.registry.unregister(id);
        out_events.push(Event::AttackerReleased { id });
    }

    fn release_projectile(&mut self, id: EntityId) {
        let Some(handle) = self.projectile_handles.remove(&id) else {
            return;
        };
        let _ = self.projectiles.release(handle);
        let _ = self.registry.unregister(id);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.tick(dt, out_events),
        Command::SpawnAttacker { kind, lane } => world.spawn_attacker(kind, lane, out_events),
        Command::PlaceDefender { kind, lane, x } => {
            world.place_defender(kind, lane, x, out_events);
        }
        Command::FireProjectile { owner, target } => world.fire_from(owner, target, out_events),
        Command::Prewarm { target, count } => world.prewarm(target, count, out_events),
        Command::EndLevel => world.end_level(out_events),
        Command::ClearPools => world.clear_pools(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use lane_defence_core::{
        AttackerKind, AttackerState, DefenderView, EntityId, Health, LaneId, ProjectileKind,
        Vec2,
    };
    use lane_defence_pool::{ObjectPool, PoolStats};
    use lane_defence_registry::EntityRegistry;
    use lane_defence_system_attacker_fsm::Attacker;
    use lane_defence_system_projectiles::Projectile;

    use super::{ArenaSettings, Definitions, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the arena layout.
    #[must_use]
    pub fn arena(world: &World) -> &ArenaSettings {
        &world.arena
    }

    /// Provides read-only access to the definition tables.
    #[must_use]
    pub fn definitions(world: &World) -> &Definitions {
        &world.definitions
    }

    /// Provides read-only access to the entity registry.
    #[must_use]
    pub fn registry(world: &World) -> &EntityRegistry {
        &world.registry
    }

    /// Provides read-only access to the attacker pool.
    #[must_use]
    pub fn attacker_pool(world: &World) -> &ObjectPool<Attacker> {
        &world.attackers
    }

    /// Provides read-only access to the projectile pool.
    #[must_use]
    pub fn projectile_pool(world: &World) -> &ObjectPool<Projectile> {
        &world.projectiles
    }

    /// Lifetime counters of the attacker pool entry for the kind.
    #[must_use]
    pub fn attacker_pool_stats(world: &World, kind: AttackerKind) -> PoolStats {
        world.attackers.stats(kind)
    }

    /// Lifetime counters of the projectile pool entry for the kind.
    #[must_use]
    pub fn projectile_pool_stats(world: &World, kind: ProjectileKind) -> PoolStats {
        world.projectiles.stats(kind)
    }

    /// Identifiers of every lane in ascending order.
    #[must_use]
    pub fn lanes(world: &World) -> Vec<LaneId> {
        world.arena.lane_ids().collect()
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Total damage suffered by the objective.
    #[must_use]
    pub fn objective_damage(world: &World) -> u64 {
        world.objective_damage
    }

    /// Number of defenders still standing.
    #[must_use]
    pub fn defender_count(world: &World) -> usize {
        world.defenders.len()
    }

    /// Captures a read-only view of every placed defender.
    #[must_use]
    pub fn defender_view(world: &World) -> DefenderView {
        let snapshots = world
            .defenders
            .iter()
            .map(|defender| defender.snapshot())
            .collect();
        DefenderView::from_snapshots(snapshots)
    }

    /// Captures a read-only view of the attackers in play.
    #[must_use]
    pub fn attacker_view(world: &World) -> AttackerView {
        let snapshots = world
            .attacker_handles
            .values()
            .filter_map(|handle| world.attackers.get(*handle))
            .map(|attacker| AttackerSnapshot {
                id: attacker.id(),
                kind: attacker.kind(),
                lane: attacker.lane(),
                position: attacker.position(),
                state: attacker.state(),
                health: attacker.health(),
                armor: attacker.armor().map(|armor| armor.durability()),
            })
            .collect();
        AttackerView { snapshots }
    }

    /// Captures a read-only view of the projectiles in flight.
    #[must_use]
    pub fn projectile_view(world: &World) -> ProjectileView {
        let snapshots = world
            .projectile_handles
            .values()
            .filter_map(|handle| world.projectiles.get(*handle))
            .map(|projectile| ProjectileSnapshot {
                id: projectile.id(),
                kind: projectile.kind(),
                position: projectile.position(),
                velocity: projectile.velocity(),
                height: projectile.height(),
                elapsed: projectile.elapsed(),
                bounces: projectile.bounces(),
                hits: projectile.hit_targets().len(),
            })
            .collect();
        ProjectileView { snapshots }
    }

    /// Read-only snapshot describing all attackers in play.
    #[derive(Clone, Debug)]
    pub struct AttackerView {
        snapshots: Vec<AttackerSnapshot>,
    }

    impl AttackerView {
        /// Iterator over the captured attacker snapshots in ascending id order.
        pub fn iter(&self) -> impl Iterator<Item = &AttackerSnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured attackers.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no attackers were captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<AttackerSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single attacker used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct AttackerSnapshot {
        /// Identifier assigned for the current life.
        pub id: EntityId,
        /// Type of attacker.
        pub kind: AttackerKind,
        /// Lane the attacker walks along.
        pub lane: LaneId,
        /// Current position.
        pub position: Vec2,
        /// Current behavioural state.
        pub state: AttackerState,
        /// Own hit points, excluding armor.
        pub health: Health,
        /// Remaining armor durability, if the armor has not broken.
        pub armor: Option<f32>,
    }

    /// Read-only snapshot describing all projectiles in flight.
    #[derive(Clone, Debug)]
    pub struct ProjectileView {
        snapshots: Vec<ProjectileSnapshot>,
    }

    impl ProjectileView {
        /// Iterator over the captured projectile snapshots in ascending id order.
        pub fn iter(&self) -> impl Iterator<Item = &ProjectileSnapshot> {
            self.snapshots.iter()
        }

        /// Number of captured projectiles.
        #[must_use]
        pub fn len(&self) -> usize {
            self.snapshots.len()
        }

        /// Reports whether no projectiles were captured.
        #[must_use]
        pub fn is_empty(&self) -> bool {
            self.snapshots.is_empty()
        }

        /// Consumes the view, yielding the underlying snapshots.
        pub fn into_vec(self) -> Vec<ProjectileSnapshot> {
            self.snapshots
        }
    }

    /// Immutable representation of a single projectile used for queries.
    #[derive(Clone, Copy, Debug, PartialEq)]
    pub struct ProjectileSnapshot {
        /// Identifier assigned for the current flight.
        pub id: EntityId,
        /// Type of projectile.
        pub kind: ProjectileKind,
        /// Current ground position.
        pub position: Vec2,
        /// Current velocity.
        pub velocity: Vec2,
        /// Height above the ground.
        pub height: f32,
        /// Time spent in flight.
        pub elapsed: Duration,
        /// Terrain bounces performed so far.
        pub bounces: u32,
        /// Entities struck directly so far.
        pub hits: usize,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{AttackerDefinition, DefenderDefinition, ProjectileDefinition};

    fn world() -> World {
        let mut definitions = Definitions::new();
        let bolt = definitions
            .add_projectile(
                ProjectileDefinition {
                    name: "bolt".to_owned(),
                    damage: 4.0,
                    speed: 10.0,
                    lifetime: Duration::from_secs(2),
                    radius: 0.1,
                    ..ProjectileDefinition::default()
                },
                PoolSettings::default(),
            )
            .expect("projectile kind");
        let _ = definitions.add_attacker(
            AttackerDefinition {
                name: "grunt".to_owned(),
                max_health: 10.0,
                speed: 1.0,
                radius: 0.3,
                ..AttackerDefinition::default()
            },
            PoolSettings::new(1, 2, true),
        );
        let _ = definitions.add_defender(DefenderDefinition {
            name: "archer".to_owned(),
            max_health: 5.0,
            projectile: bolt,
            range: 8.0,
            fire_interval: Duration::from_millis(500),
            radius: 0.3,
            ..DefenderDefinition::default()
        });
        World::new(ArenaSettings::new(2, 1.0, 10.0, 0.0), definitions)
    }

    #[test]
    fn new_world_is_empty() {
        let world = world();
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert!(query::registry(&world).is_empty());
        assert_eq!(query::tick_index(&world), 0);
        assert_eq!(query::lanes(&world), vec![LaneId::new(0), LaneId::new(1)]);
    }

    #[test]
    fn identifiers_are_not_consumed_by_skipped_requests() {
        let mut world = world();
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::new(0),
                lane: LaneId::new(9),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::SpawnAttacker {
                kind: AttackerKind::new(0),
                lane: LaneId::new(1),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![
                Event::SpawnSkipped {
                    kind: AttackerKind::new(0),
                    lane: LaneId::new(9),
                    reason: SpawnFailure::UnknownLane,
                },
                Event::AttackerSpawned {
                    id: EntityId::new(1),
                    kind: AttackerKind::new(0),
                    lane: LaneId::new(1),
                    position: Vec2::new(10.0, 1.5),
                },
            ]
        );
    }

    #[test]
    fn defender_cooldown_gates_fire_requests() {
        let mut world = world();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::PlaceDefender {
                kind: DefenderKind::new(0),
                lane: LaneId::new(0),
                x: 1.0,
            },
            &mut events,
        );
        let defender = EntityId::new(1);
        events.clear();

        apply(
            &mut world,
            Command::FireProjectile {
                owner: defender,
                target: None,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::FireProjectile {
                owner: defender,
                target: None,
            },
            &mut events,
        );

        assert!(matches!(events[0], Event::ProjectileFired { .. }));
        assert!(matches!(
            events[1],
            Event::ProjectileSkipped {
                reason: SpawnFailure::UnknownOwner,
                ..
            }
        ));
        assert_eq!(query::projectile_view(&world).len(), 1);
        let ready_in = query::defender_view(&world)
            .iter()
            .map(|snapshot| snapshot.ready_in)
            .next();
        assert_eq!(ready_in, Some(Duration::from_millis(500)));
    }
}

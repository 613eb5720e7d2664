#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pooled projectile entity with motion profiles and collision resolution.
//!
//! Projectiles never mutate other entities. Each update reads the world
//! through a [`CollisionQuery`] and reports hits, splash, bounces, cues and
//! termination as [`ProjectileIntent`] values the world applies in order.

mod motion;

use std::time::Duration;

use lane_defence_core::{
    DamageDealer, DamageKind, EffectCue, EntityCategory, EntityId, EntityRecord, Faction, Health,
    MotionKind, ProjectileDefinition, ProjectileKind, Targetable, TerminationReason, Vec2,
};
use lane_defence_pool::Poolable;
use log::debug;

/// Broad-phase collision contact reported for a projectile's position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Contact {
    /// Body of a registered entity.
    Entity(EntityId),
    /// Static terrain.
    Terrain {
        /// Indicates whether projectiles may bounce off the surface.
        bounceable: bool,
        /// Outward surface normal at the contact.
        normal: Vec2,
    },
}

/// Read-only view of the world used while a projectile updates.
pub trait CollisionQuery {
    /// Appends contacts overlapping a circle, entities nearest first.
    fn contacts(&self, position: Vec2, radius: f32, out: &mut Vec<Contact>);

    /// Registry record of the entity, if registered.
    fn entity(&self, id: EntityId) -> Option<&EntityRecord>;

    /// Nearest valid entity hostile to `faction` within the radius.
    fn nearest_hostile(&self, origin: Vec2, radius: f32, faction: Faction) -> Option<EntityId>;

    /// Appends every valid entity hostile to `faction` within the radius.
    fn hostiles_within(
        &self,
        origin: Vec2,
        radius: f32,
        faction: Faction,
        out: &mut Vec<EntityId>,
    );
}

/// Launch parameters handed to a projectile taken from the pool.
#[derive(Clone, Debug)]
pub struct ProjectileSpawn {
    /// Identifier assigned for this flight.
    pub id: EntityId,
    /// Definition the projectile plays out.
    pub definition: ProjectileDefinition,
    /// Entity that launched the projectile.
    pub owner: EntityId,
    /// Faction of the launching entity.
    pub owner_faction: Faction,
    /// Launch position.
    pub origin: Vec2,
    /// Launch direction; normalised on spawn.
    pub direction: Vec2,
    /// Entity the projectile was aimed at, with its position at launch.
    pub target: Option<(EntityId, Vec2)>,
}

/// Side effects a projectile asks the world to perform.
#[derive(Clone, Debug, PartialEq)]
pub enum ProjectileIntent {
    /// Apply direct damage to a target.
    Hit {
        /// Entity struck by the projectile.
        target: EntityId,
        /// Base damage before armor.
        damage: f32,
        /// Kind of damage dealt.
        kind: DamageKind,
        /// Distance the target is pushed back.
        knockback: f32,
    },
    /// Apply attenuated splash damage around an impact.
    Splash {
        /// Entity caught in the blast.
        target: EntityId,
        /// Attenuated base damage before armor.
        damage: f32,
        /// Kind of damage dealt.
        kind: DamageKind,
    },
    /// The projectile reflected off terrain.
    Bounced {
        /// Number of bounces performed so far.
        bounces: u32,
    },
    /// Play a cue at the provided position.
    Cue {
        /// Effect and sound to play.
        cue: EffectCue,
        /// Position the cue plays at.
        position: Vec2,
    },
    /// Return the projectile to its pool.
    Terminate {
        /// Reason the flight ended.
        reason: TerminationReason,
    },
}

/// Projectile taken from the projectile pool.
#[derive(Clone, Debug)]
pub struct Projectile {
    id: EntityId,
    kind: ProjectileKind,
    definition: ProjectileDefinition,
    owner: EntityId,
    owner_faction: Faction,
    position: Vec2,
    velocity: Vec2,
    height: f32,
    elapsed: Duration,
    flight_time: Duration,
    landing: Option<Vec2>,
    hit_targets: Vec<EntityId>,
    bounces: u32,
    homing_target: Option<EntityId>,
    returning: bool,
    terminated: bool,
    active: bool,
    contacts: Vec<Contact>,
    splash: Vec<EntityId>,
}

impl Poolable for Projectile {
    type Key = ProjectileKind;
    type SpawnData = ProjectileSpawn;

    fn create(kind: ProjectileKind) -> Self {
        Self {
            id: EntityId::new(0),
            kind,
            definition: ProjectileDefinition::default(),
            owner: EntityId::new(0),
            owner_faction: Faction::Defending,
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            height: 0.0,
            elapsed: Duration::ZERO,
            flight_time: Duration::ZERO,
            landing: None,
            hit_targets: Vec::new(),
            bounces: 0,
            homing_target: None,
            returning: false,
            terminated: false,
            active: false,
            contacts: Vec::new(),
            splash: Vec::new(),
        }
    }

    fn initialize(&mut self, spawn: &ProjectileSpawn) {
        let fallback = match spawn.owner_faction {
            Faction::Defending => Vec2::X,
            Faction::Attacking => Vec2::NEG_X,
        };
        let direction = spawn.direction.try_normalize().unwrap_or(fallback);
        self.id = spawn.id;
        self.definition = spawn.definition.clone();
        self.owner = spawn.owner;
        self.owner_faction = spawn.owner_faction;
        self.position = spawn.origin;
        self.velocity = direction * spawn.definition.speed.max(0.0);
        self.height = 0.0;
        self.elapsed = Duration::ZERO;
        self.flight_time = lobbed_flight_time(&spawn.definition, spawn.origin, spawn.target);
        self.landing = spawn.target.map(|(_, position)| position);
        self.hit_targets.clear();
        self.bounces = 0;
        self.homing_target = spawn.target.map(|(id, _)| id);
        self.returning = false;
        self.terminated = false;
        self.active = true;
    }

    fn reset(&mut self) {
        self.hit_targets.clear();
        self.contacts.clear();
        self.splash.clear();
        self.homing_target = None;
        self.velocity = Vec2::ZERO;
        self.active = false;
    }
}

impl DamageDealer for Projectile {
    fn damage_amount(&self) -> f32 {
        self.definition.damage
    }

    fn damage_kind(&self) -> DamageKind {
        self.definition.kind
    }

    fn owner(&self) -> Option<EntityId> {
        Some(self.owner)
    }
}

impl Projectile {
    /// Identifier assigned for the current flight.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Pool key of the projectile.
    #[must_use]
    pub const fn kind(&self) -> ProjectileKind {
        self.kind
    }

    /// Definition the projectile plays out.
    #[must_use]
    pub const fn definition(&self) -> &ProjectileDefinition {
        &self.definition
    }

    /// Faction of the launching entity.
    #[must_use]
    pub const fn owner_faction(&self) -> Faction {
        self.owner_faction
    }

    /// Current ground position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Current velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Height above the ground for arc and lobbed flights.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.height
    }

    /// Time spent in flight.
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Entities struck directly during this flight, in hit order.
    #[must_use]
    pub fn hit_targets(&self) -> &[EntityId] {
        &self.hit_targets
    }

    /// Terrain bounces performed so far.
    #[must_use]
    pub const fn bounces(&self) -> u32 {
        self.bounces
    }

    /// Entity a homing projectile is steering toward.
    #[must_use]
    pub const fn homing_target(&self) -> Option<EntityId> {
        self.homing_target
    }

    /// Reports whether the flight already ended.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Reports whether the projectile is currently in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Registry record describing the projectile.
    #[must_use]
    pub fn record(&self) -> EntityRecord {
        EntityRecord {
            id: self.id,
            category: EntityCategory::Projectile,
            faction: self.owner_faction,
            lane: None,
            position: self.position,
            health: Health::new(1.0),
            priority: 0,
            radius: self.definition.radius,
            active: self.active && !self.terminated,
            targetable: false,
        }
    }

    /// Reports whether the record may be damaged by this projectile.
    ///
    /// Compatible targets are valid, hostile to the owner and never the owner.
    #[must_use]
    pub fn is_compatible(&self, record: &EntityRecord) -> bool {
        record.id != self.owner
            && record.is_valid_target()
            && self.owner_faction.opposes(record.faction)
    }

    /// Advances the flight by `dt`, resolves contacts and reports intents.
    pub fn update<Q: CollisionQuery>(
        &mut self,
        query: &Q,
        dt: Duration,
        out: &mut Vec<ProjectileIntent>,
    ) {
        if !self.active || self.terminated {
            return;
        }

        self.elapsed = self.elapsed.saturating_add(dt);
        self.steer(query, dt);
        self.position += self.velocity * dt.as_secs_f32();
        self.update_height();

        if self.definition.motion == MotionKind::Lobbed {
            if self.elapsed >= self.flight_time {
                self.land(query, out);
            } else if self.expired() {
                self.terminate(TerminationReason::Expired, out);
            }
            return;
        }

        if self.expired() {
            self.terminate(TerminationReason::Expired, out);
            return;
        }

        if self.returning && self.reached_owner(query) {
            self.terminate(TerminationReason::Returned, out);
            return;
        }

        self.resolve_contacts(query, out);
    }

    /// Ends the flight early, emitting the destroy cue.
    pub fn cancel(&mut self, out: &mut Vec<ProjectileIntent>) {
        if self.active && !self.terminated {
            self.terminate(TerminationReason::Cancelled, out);
        }
    }

    fn expired(&self) -> bool {
        self.elapsed >= self.definition.lifetime
    }

    fn steer<Q: CollisionQuery>(&mut self, query: &Q, dt: Duration) {
        let speed = self.definition.speed.max(0.0);
        match self.definition.motion {
            MotionKind::Homing => {
                let current = self
                    .homing_target
                    .and_then(|id| query.entity(id))
                    .filter(|record| self.is_compatible(record))
                    .map(|record| record.id);
                if current.is_none() {
                    self.homing_target = query.nearest_hostile(
                        self.position,
                        self.definition.homing_radius,
                        self.owner_faction,
                    );
                    if let Some(id) = self.homing_target {
                        debug!("projectile {} re-acquired target {}", self.id.get(), id.get());
                    }
                }
                let destination = self
                    .homing_target
                    .and_then(|id| query.entity(id))
                    .map(|record| record.position);
                if let Some(destination) = destination {
                    let blend = self.definition.turn_rate * dt.as_secs_f32();
                    self.velocity =
                        motion::steer(self.velocity, self.position, destination, speed, blend);
                }
            }
            MotionKind::Boomerang => {
                if !self.returning && self.elapsed >= self.definition.lifetime / 2 {
                    self.returning = true;
                    self.velocity = -self.velocity;
                }
                if self.returning {
                    if let Some(owner) = query.entity(self.owner) {
                        self.velocity = motion::steer(
                            self.velocity,
                            self.position,
                            owner.position,
                            speed,
                            1.0,
                        );
                    }
                }
            }
            MotionKind::Straight | MotionKind::Arc | MotionKind::Lobbed => {}
        }
    }

    fn update_height(&mut self) {
        self.height = match self.definition.motion {
            MotionKind::Arc => {
                let progress = progress(self.elapsed, self.definition.lifetime);
                motion::parabola(self.definition.arc_height, progress)
            }
            MotionKind::Lobbed => {
                let progress = progress(self.elapsed, self.flight_time);
                motion::parabola(self.definition.arc_height, progress)
            }
            MotionKind::Straight | MotionKind::Homing | MotionKind::Boomerang => 0.0,
        };
    }

    fn reached_owner<Q: CollisionQuery>(&self, query: &Q) -> bool {
        query.entity(self.owner).is_some_and(|owner| {
            let reach = self.definition.radius + owner.radius;
            owner.position.distance_squared(self.position) <= reach * reach
        })
    }

    fn land<Q: CollisionQuery>(&mut self, query: &Q, out: &mut Vec<ProjectileIntent>) {
        if let Some(point) = self.landing {
            self.position = point;
        }
        self.height = 0.0;
        let mut contacts = std::mem::take(&mut self.contacts);
        contacts.clear();
        query.contacts(self.position, self.definition.radius, &mut contacts);
        for contact in &contacts {
            if let Contact::Entity(id) = contact {
                if self.try_hit(query, *id, out) && self.budget_spent() {
                    break;
                }
            }
        }
        self.contacts = contacts;
        let reason = if self.hit_targets.is_empty() {
            TerminationReason::Landed
        } else {
            TerminationReason::Impact
        };
        self.terminate(reason, out);
    }

    fn resolve_contacts<Q: CollisionQuery>(
        &mut self,
        query: &Q,
        out: &mut Vec<ProjectileIntent>,
    ) {
        let mut contacts = std::mem::take(&mut self.contacts);
        contacts.clear();
        query.contacts(self.position, self.definition.radius, &mut contacts);

        let mut bounced = false;
        for contact in &contacts {
            match *contact {
                Contact::Entity(id) => {
                    if self.try_hit(query, id, out) && self.budget_spent() {
                        self.terminate(TerminationReason::Impact, out);
                        break;
                    }
                }
                Contact::Terrain { .. } if bounced => {}
                Contact::Terrain {
                    bounceable: true,
                    normal,
                } if self.velocity.dot(normal) >= 0.0 => {}
                Contact::Terrain { bounceable, normal } => {
                    if bounceable && self.bounces < self.definition.max_bounces {
                        self.velocity = motion::reflect(self.velocity, normal);
                        self.bounces += 1;
                        bounced = true;
                        out.push(ProjectileIntent::Bounced {
                            bounces: self.bounces,
                        });
                    } else {
                        self.terminate(TerminationReason::Terrain, out);
                        break;
                    }
                }
            }
        }
        self.contacts = contacts;
    }

    fn try_hit<Q: CollisionQuery>(
        &mut self,
        query: &Q,
        id: EntityId,
        out: &mut Vec<ProjectileIntent>,
    ) -> bool {
        if self.budget_spent() || self.hit_targets.contains(&id) {
            return false;
        }
        let Some(record) = query.entity(id) else {
            return false;
        };
        if !self.is_compatible(record) {
            return false;
        }

        self.hit_targets.push(id);
        out.push(ProjectileIntent::Hit {
            target: id,
            damage: self.definition.damage,
            kind: self.definition.kind,
            knockback: self.definition.knockback,
        });
        if !self.definition.impact_cue.is_empty() {
            out.push(ProjectileIntent::Cue {
                cue: self.definition.impact_cue.clone(),
                position: self.position,
            });
        }
        self.splash_around(query, id, out);
        true
    }

    fn splash_around<Q: CollisionQuery>(
        &mut self,
        query: &Q,
        primary: EntityId,
        out: &mut Vec<ProjectileIntent>,
    ) {
        let radius = self.definition.splash_radius;
        if radius <= 0.0 {
            return;
        }
        self.splash.clear();
        query.hostiles_within(self.position, radius, self.owner_faction, &mut self.splash);
        for &id in &self.splash {
            if id == primary || id == self.owner {
                continue;
            }
            let Some(record) = query.entity(id) else {
                continue;
            };
            let distance = record.position.distance(self.position);
            let damage = self.definition.damage * (1.0 - distance / radius).clamp(0.0, 1.0);
            if damage > 0.0 {
                out.push(ProjectileIntent::Splash {
                    target: id,
                    damage,
                    kind: self.definition.kind,
                });
            }
        }
    }

    fn budget_spent(&self) -> bool {
        self.hit_targets.len() >= self.definition.hit_budget()
    }

    fn terminate(&mut self, reason: TerminationReason, out: &mut Vec<ProjectileIntent>) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        if !self.definition.destroy_cue.is_empty() {
            out.push(ProjectileIntent::Cue {
                cue: self.definition.destroy_cue.clone(),
                position: self.position,
            });
        }
        out.push(ProjectileIntent::Terminate { reason });
    }
}

fn progress(elapsed: Duration, total: Duration) -> f32 {
    if total.is_zero() {
        1.0
    } else {
        elapsed.as_secs_f32() / total.as_secs_f32()
    }
}

fn lobbed_flight_time(
    definition: &ProjectileDefinition,
    origin: Vec2,
    target: Option<(EntityId, Vec2)>,
) -> Duration {
    let lifetime = definition.lifetime;
    let Some((_, position)) = target else {
        return lifetime;
    };
    if definition.speed <= 0.0 {
        return lifetime;
    }
    let seconds = origin.distance(position) / definition.speed;
    Duration::try_from_secs_f32(seconds).map_or(lifetime, |time| time.min(lifetime))
}

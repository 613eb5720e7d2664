#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence combat engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. The immutable definition records
//! supplied by configuration and the registry record describing a live entity
//! also live here so every crate agrees on their shape.

use std::time::Duration;

pub use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Canonical banner emitted when the simulation boots.
pub const WELCOME_BANNER: &str = "Welcome to Lane Defence.";

/// Multiplier applied to damage of a kind the armor resists.
pub const RESISTANCE_MULTIPLIER: f32 = 0.5;

/// Multiplier applied to damage of a kind the armor is vulnerable to.
pub const VULNERABILITY_MULTIPLIER: f32 = 2.0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that an attacker of the provided kind enters the given lane.
    SpawnAttacker {
        /// Type of attacker to take from the attacker pool.
        kind: AttackerKind,
        /// Lane the attacker walks along.
        lane: LaneId,
    },
    /// Requests placement of a defender at a horizontal offset within a lane.
    PlaceDefender {
        /// Type of defender to construct.
        kind: DefenderKind,
        /// Lane the defender guards.
        lane: LaneId,
        /// Horizontal world coordinate of the defender.
        x: f32,
    },
    /// Requests that an entity launches its configured projectile.
    FireProjectile {
        /// Entity that owns and launches the projectile.
        owner: EntityId,
        /// Optional entity the projectile is aimed at.
        target: Option<EntityId>,
    },
    /// Requests that a pool prepares free instances ahead of demand.
    Prewarm {
        /// Pool and key that should be prewarmed.
        target: PrewarmTarget,
        /// Total number of instances the key should hold.
        count: usize,
    },
    /// Returns every active pooled instance and clears the registry.
    EndLevel,
    /// Permanently destroys every pooled instance.
    ClearPools,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that an attacker left the pool and entered a lane.
    AttackerSpawned {
        /// Identifier assigned to the attacker for this life.
        id: EntityId,
        /// Type of attacker that was spawned.
        kind: AttackerKind,
        /// Lane the attacker walks along.
        lane: LaneId,
        /// World position the attacker starts from.
        position: Vec2,
    },
    /// Reports that a spawn request was skipped without affecting the tick.
    SpawnSkipped {
        /// Type of attacker that was requested.
        kind: AttackerKind,
        /// Lane provided in the request.
        lane: LaneId,
        /// Reason the spawn could not be honoured.
        reason: SpawnFailure,
    },
    /// Confirms that a defender was placed into a lane.
    DefenderPlaced {
        /// Identifier assigned to the defender.
        id: EntityId,
        /// Type of defender that was placed.
        kind: DefenderKind,
        /// Lane the defender guards.
        lane: LaneId,
        /// World position of the defender.
        position: Vec2,
    },
    /// Reports that a defender placement request was rejected.
    PlacementRejected {
        /// Type of defender requested for placement.
        kind: DefenderKind,
        /// Lane provided in the request.
        lane: LaneId,
        /// Reason the placement failed.
        reason: SpawnFailure,
    },
    /// Confirms that a defender lost all of its health.
    DefenderDestroyed {
        /// Identifier of the destroyed defender.
        id: EntityId,
    },
    /// Announces that an attacker's state machine changed state.
    AttackerStateChanged {
        /// Identifier of the attacker.
        id: EntityId,
        /// State that was exited.
        from: AttackerState,
        /// State that was entered.
        to: AttackerState,
    },
    /// Reports damage that landed on an entity.
    DamageApplied {
        /// Entity that received the damage.
        target: EntityId,
        /// Entity credited with the damage, if still known.
        source: Option<EntityId>,
        /// Kind of damage that was dealt.
        kind: DamageKind,
        /// Damage that landed after multipliers and armor reduction, always
        /// `absorbed + to_health`.
        amount: f32,
        /// Portion absorbed by armor durability.
        absorbed: f32,
        /// Portion subtracted from the entity's own health.
        to_health: f32,
    },
    /// Reports that an attacker's armor broke and was detached.
    ArmorBroken {
        /// Attacker that lost its armor.
        id: EntityId,
        /// Position of the attacker when the armor broke.
        position: Vec2,
    },
    /// Confirms that an attacker entered its terminal dying state.
    AttackerDied {
        /// Identifier of the attacker.
        id: EntityId,
        /// Type of attacker.
        kind: AttackerKind,
        /// Reason the attacker is leaving play.
        cause: DeathCause,
    },
    /// Reports that a killed attacker dropped its reward.
    RewardDropped {
        /// Attacker that dropped the reward.
        attacker: EntityId,
        /// Amount of reward dropped.
        amount: u32,
        /// Position the reward appears at.
        position: Vec2,
    },
    /// Reports that an attacker reached the objective boundary.
    ObjectiveReached {
        /// Attacker that reached the objective.
        attacker: EntityId,
        /// Damage the objective suffers.
        damage: u32,
    },
    /// Confirms that a projectile left the pool.
    ProjectileFired {
        /// Identifier assigned to the projectile.
        id: EntityId,
        /// Type of projectile that was fired.
        kind: ProjectileKind,
        /// Entity that launched the projectile.
        owner: EntityId,
    },
    /// Reports that a projectile could not be launched.
    ProjectileSkipped {
        /// Type of projectile that was requested.
        kind: ProjectileKind,
        /// Entity that attempted to launch it.
        owner: EntityId,
        /// Reason the launch failed.
        reason: SpawnFailure,
    },
    /// Reports that a projectile reflected off terrain.
    ProjectileBounced {
        /// Identifier of the projectile.
        id: EntityId,
        /// Number of bounces performed so far.
        bounces: u32,
    },
    /// Reports that a projectile finished its flight.
    ProjectileTerminated {
        /// Identifier of the projectile.
        id: EntityId,
        /// Reason the flight ended.
        reason: TerminationReason,
    },
    /// Requests a fire-and-forget visual effect.
    EffectRequested {
        /// Name of the effect asset.
        effect: String,
        /// Position the effect plays at.
        position: Vec2,
    },
    /// Requests a fire-and-forget sound.
    SoundRequested {
        /// Name of the sound asset.
        sound: String,
    },
    /// Confirms that an attacker instance returned to its pool.
    AttackerReleased {
        /// Identifier the attacker carried during its life.
        id: EntityId,
    },
    /// Confirms that a pool prewarm request completed.
    PoolsPrewarmed {
        /// Pool and key that were prewarmed.
        target: PrewarmTarget,
        /// Number of instances created by the request.
        created: usize,
    },
    /// Confirms that the level was cancelled and pooled instances returned.
    LevelEnded {
        /// Number of attacker instances returned to the pool.
        attackers_released: usize,
        /// Number of projectile instances returned to the pool.
        projectiles_released: usize,
    },
    /// Confirms that every pooled instance was destroyed.
    PoolsCleared {
        /// Number of instances destroyed across both pools.
        destroyed: usize,
    },
}

/// Pool selector used by prewarm requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrewarmTarget {
    /// Attacker pool entry for the provided kind.
    Attackers(AttackerKind),
    /// Projectile pool entry for the provided kind.
    Projectiles(ProjectileKind),
}

/// Reasons a spawn, launch or placement request may be skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpawnFailure {
    /// The pool for the requested kind reached its instance cap.
    PoolExhausted,
    /// No definition exists for the requested kind.
    UnknownKind,
    /// The requested lane does not exist.
    UnknownLane,
    /// The requesting entity is not registered or cannot fire.
    UnknownOwner,
}

/// Reasons an attacker leaves play.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeathCause {
    /// Health was depleted by damage.
    Killed,
    /// The attacker walked past the objective boundary.
    ReachedObjective,
}

/// Reasons a projectile's flight ends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminationReason {
    /// The projectile spent its hit budget on targets.
    Impact,
    /// The projectile's lifetime elapsed.
    Expired,
    /// The projectile struck terrain it could not bounce off.
    Terrain,
    /// A lobbed projectile touched down.
    Landed,
    /// A boomerang projectile came back to its owner.
    Returned,
    /// The level ended while the projectile was in flight.
    Cancelled,
}

/// Unique identifier assigned to a live simulation entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a horizontal lane within the arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LaneId(u32);

impl LaneId {
    /// Creates a new lane identifier.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the zero-based lane index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Type key of an attacker definition and its pool entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttackerKind(u16);

impl AttackerKind {
    /// Creates a new attacker kind key.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric key.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Type key of a projectile definition and its pool entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ProjectileKind(u16);

impl ProjectileKind {
    /// Creates a new projectile kind key.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric key.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Type key of a defender definition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DefenderKind(u16);

impl DefenderKind {
    /// Creates a new defender kind key.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric key.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Side an entity fights for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// Stationary defenders and the projectiles they fire.
    Defending,
    /// Mobile attackers and the projectiles they fire.
    Attacking,
}

impl Faction {
    /// Reports whether entities of the two factions may damage each other.
    #[must_use]
    pub fn opposes(self, other: Faction) -> bool {
        self != other
    }
}

/// Coarse classification used by the registry's category index.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityCategory {
    /// Mobile attacker taken from the attacker pool.
    Attacker,
    /// Stationary defender placed by the player.
    Defender,
    /// Projectile taken from the projectile pool.
    Projectile,
}

/// Damage kind tag compared against armor resistances and vulnerabilities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageKind {
    /// Blunt or piercing impact.
    #[default]
    Physical,
    /// Burning damage.
    Fire,
    /// Freezing damage.
    Frost,
    /// Toxic damage.
    Poison,
    /// Electrical damage.
    Lightning,
    /// Blast damage typically delivered as splash.
    Explosive,
}

/// Hit points clamped to `[0, max]`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Health {
    current: f32,
    max: f32,
}

impl Health {
    /// Creates full health with the provided maximum.
    #[must_use]
    pub fn new(max: f32) -> Self {
        let max = max.max(0.0);
        Self { current: max, max }
    }

    /// Creates health with an explicit current value clamped into range.
    #[must_use]
    pub fn with_current(current: f32, max: f32) -> Self {
        let max = max.max(0.0);
        Self {
            current: current.clamp(0.0, max),
            max,
        }
    }

    /// Remaining hit points.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Maximum hit points.
    #[must_use]
    pub const fn max(&self) -> f32 {
        self.max
    }

    /// Reports whether no hit points remain.
    #[must_use]
    pub fn is_depleted(&self) -> bool {
        self.current <= 0.0
    }

    /// Fraction of hit points remaining, zero when the maximum is zero.
    #[must_use]
    pub fn fraction(&self) -> f32 {
        if self.max <= 0.0 {
            0.0
        } else {
            self.current / self.max
        }
    }

    /// Subtracts damage and returns the amount actually removed.
    pub fn apply_damage(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 {
            return 0.0;
        }
        let removed = amount.min(self.current);
        self.current -= removed;
        removed
    }

    /// Restores hit points up to the maximum and returns the amount restored.
    pub fn heal(&mut self, amount: f32) -> f32 {
        if amount <= 0.0 || self.is_depleted() {
            return 0.0;
        }
        let restored = amount.min(self.max - self.current);
        self.current += restored;
        restored
    }
}

/// Capability of entities that can be chosen as a target.
pub trait Targetable {
    /// Position other entities aim at.
    fn target_position(&self) -> Vec2;

    /// Reports whether the entity may currently be targeted.
    ///
    /// Must return `false` once the entity is inactive, dead or dying.
    fn is_valid_target(&self) -> bool;

    /// Score used by highest-priority queries; larger wins.
    fn priority(&self) -> i32;
}

/// Capability of entities that deal damage on contact.
pub trait DamageDealer {
    /// Base damage dealt per hit.
    fn damage_amount(&self) -> f32;

    /// Kind of damage dealt.
    fn damage_kind(&self) -> DamageKind;

    /// Entity credited with the damage, excluded from friendly fire.
    fn owner(&self) -> Option<EntityId>;
}

/// Registry-facing snapshot of a live entity.
///
/// Owners publish a fresh record after every mutation so spatial queries never
/// need to reach back into the pools.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityRecord {
    /// Stable identifier of the entity.
    pub id: EntityId,
    /// Coarse classification of the entity.
    pub category: EntityCategory,
    /// Side the entity fights for.
    pub faction: Faction,
    /// Lane the entity occupies, if any.
    pub lane: Option<LaneId>,
    /// Current world position.
    pub position: Vec2,
    /// Combined hit points including any armor durability.
    pub health: Health,
    /// Score used for highest-priority tie-breaking.
    pub priority: i32,
    /// Collision radius used by broad-phase queries.
    pub radius: f32,
    /// Indicates whether the entity still participates in the simulation.
    pub active: bool,
    /// Indicates whether the entity exposes the targetable capability.
    pub targetable: bool,
}

impl EntityRecord {
    /// Squared distance from the record's position to the provided point.
    #[must_use]
    pub fn distance_squared_to(&self, point: Vec2) -> f32 {
        self.position.distance_squared(point)
    }
}

impl Targetable for EntityRecord {
    fn target_position(&self) -> Vec2 {
        self.position
    }

    fn is_valid_target(&self) -> bool {
        self.active && self.targetable && !self.health.is_depleted()
    }

    fn priority(&self) -> i32 {
        self.priority
    }
}

/// Optional visual effect and sound played at a position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EffectCue {
    /// Name of the visual effect asset.
    pub effect: Option<String>,
    /// Name of the sound asset.
    pub sound: Option<String>,
}

impl EffectCue {
    /// Creates a cue from optional effect and sound names.
    #[must_use]
    pub fn new(effect: Option<String>, sound: Option<String>) -> Self {
        Self { effect, sound }
    }

    /// Reports whether the cue plays nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.effect.is_none() && self.sound.is_none()
    }

    /// Appends the events that play this cue at the provided position.
    pub fn emit(&self, position: Vec2, out: &mut Vec<Event>) {
        if let Some(effect) = &self.effect {
            out.push(Event::EffectRequested {
                effect: effect.clone(),
                position,
            });
        }
        if let Some(sound) = &self.sound {
            out.push(Event::SoundRequested {
                sound: sound.clone(),
            });
        }
    }
}

/// Armor attachment carried by some attackers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ArmorDefinition {
    /// Secondary hit points consumed before the attacker's own health.
    pub durability: f32,
    /// Fraction of incoming damage removed before durability absorbs it.
    pub damage_reduction: f32,
    /// Damage kinds dealt at half strength.
    pub resists: Vec<DamageKind>,
    /// Damage kinds dealt at double strength.
    pub vulnerable_to: Vec<DamageKind>,
    /// Cue played when the armor breaks.
    pub break_cue: EffectCue,
}

/// Ranged attack capability of projectile-capable attackers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RangedProfile {
    /// Projectile launched by the attack.
    pub projectile: ProjectileKind,
    /// Maximum distance to a target.
    pub range: f32,
    /// Time between consecutive shots.
    pub interval: Duration,
}

/// Ability applied while an attacker is in its special state.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpecialEffect {
    /// Moves faster and ignores targets.
    Charge {
        /// Factor applied to the walking speed.
        speed_multiplier: f32,
    },
    /// Restores health over time while walking.
    Regenerate {
        /// Hit points restored per second.
        per_second: f32,
    },
}

/// Opt-in special ability that interrupts normal behaviour once per life.
#[derive(Clone, Debug, PartialEq)]
pub struct SpecialAbility {
    /// Health fraction at or below which the ability triggers.
    pub trigger_health_fraction: f32,
    /// Time spent in the special state.
    pub duration: Duration,
    /// Behaviour applied while the ability runs.
    pub effect: SpecialEffect,
    /// Cue played when the ability triggers.
    pub cue: EffectCue,
}

/// Immutable attacker statistics supplied by configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AttackerDefinition {
    /// Human readable name used in diagnostics.
    pub name: String,
    /// Base hit points excluding armor.
    pub max_health: f32,
    /// Walking speed in world units per second.
    pub speed: f32,
    /// Damage dealt per melee strike.
    pub melee_damage: f32,
    /// Kind of melee damage.
    pub melee_kind: DamageKind,
    /// Distance at which a defender counts as adjacent.
    pub melee_range: f32,
    /// Time between consecutive melee strikes.
    pub attack_interval: Duration,
    /// Optional armor attachment.
    pub armor: Option<ArmorDefinition>,
    /// Optional ranged attack capability.
    pub ranged: Option<RangedProfile>,
    /// Optional special ability.
    pub special: Option<SpecialAbility>,
    /// Reward dropped when the attacker is killed.
    pub reward: u32,
    /// Damage dealt to the objective when the attacker reaches it.
    pub objective_damage: u32,
    /// Delay between entering the dying state and returning to the pool.
    pub death_delay: Duration,
    /// Targeting priority exposed to defenders.
    pub priority: i32,
    /// Collision radius.
    pub radius: f32,
    /// Cue played when the attacker starts dying.
    pub death_cue: EffectCue,
}

/// Flight profile of a projectile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionKind {
    /// Constant velocity along the launch direction.
    #[default]
    Straight,
    /// Straight ground track with a cosmetic parabolic height.
    Arc,
    /// Ballistic lob that only strikes where it lands.
    Lobbed,
    /// Bends toward a live target at a configured turn rate.
    Homing,
    /// Turns back toward its owner after half its lifetime.
    Boomerang,
}

/// Immutable projectile statistics supplied by configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ProjectileDefinition {
    /// Human readable name used in diagnostics.
    pub name: String,
    /// Base damage per hit.
    pub damage: f32,
    /// Kind of damage dealt.
    pub kind: DamageKind,
    /// Travel speed in world units per second.
    pub speed: f32,
    /// Flight time after which the projectile is force-terminated.
    pub lifetime: Duration,
    /// Flight profile.
    pub motion: MotionKind,
    /// Peak height of arc and lobbed flights.
    pub arc_height: f32,
    /// Radius searched for homing targets.
    pub homing_radius: f32,
    /// Blend factor per second used when steering toward a homing target.
    pub turn_rate: f32,
    /// Indicates whether the projectile may pass through targets.
    pub piercing: bool,
    /// Maximum number of targets a piercing projectile may hit.
    pub max_pierce: u32,
    /// Radius of splash damage around an impact, zero for none.
    pub splash_radius: f32,
    /// Distance targets are pushed back on a direct hit.
    pub knockback: f32,
    /// Number of terrain bounces allowed before termination.
    pub max_bounces: u32,
    /// Collision radius.
    pub radius: f32,
    /// Cue played on every direct hit.
    pub impact_cue: EffectCue,
    /// Cue played when the projectile terminates.
    pub destroy_cue: EffectCue,
}

impl ProjectileDefinition {
    /// Maximum number of distinct targets the projectile may hit.
    #[must_use]
    pub fn hit_budget(&self) -> usize {
        if self.piercing {
            usize::try_from(self.max_pierce.max(1)).unwrap_or(usize::MAX)
        } else {
            1
        }
    }
}

/// Rule a defender uses to choose among attackers in range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetingMode {
    /// Closest attacker wins.
    #[default]
    Nearest,
    /// Attacker with the greatest priority score wins.
    HighestPriority,
}

/// Immutable defender statistics supplied by configuration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefenderDefinition {
    /// Human readable name used in diagnostics.
    pub name: String,
    /// Hit points of the defender.
    pub max_health: f32,
    /// Projectile launched when firing.
    pub projectile: ProjectileKind,
    /// Maximum distance to a target.
    pub range: f32,
    /// Time between consecutive shots.
    pub fire_interval: Duration,
    /// Rule used to choose a target.
    pub targeting: TargetingMode,
    /// Targeting priority exposed to attackers.
    pub priority: i32,
    /// Collision radius.
    pub radius: f32,
}

/// Behavioural state of an attacker.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AttackerState {
    /// Walking toward the objective.
    #[default]
    Moving,
    /// Striking an adjacent target in melee.
    Engaging,
    /// Firing projectiles at a target in range.
    RangedAttacking,
    /// Terminal state played out before returning to the pool.
    Dying,
    /// Running an opt-in special ability.
    Special,
}

impl AttackerState {
    /// Reports whether no transitions leave this state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Dying)
    }
}

/// Read-only view of every placed defender.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DefenderView {
    snapshots: Vec<DefenderSnapshot>,
}

impl DefenderView {
    /// Creates a new defender view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<DefenderSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured defender snapshots in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &DefenderSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured defenders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no defenders were captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<DefenderSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a single defender used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DefenderSnapshot {
    /// Identifier allocated to the defender by the world.
    pub id: EntityId,
    /// Type of defender.
    pub kind: DefenderKind,
    /// Lane the defender guards.
    pub lane: LaneId,
    /// World position of the defender.
    pub position: Vec2,
    /// Remaining hit points.
    pub health: Health,
    /// Time until the defender may fire again.
    pub ready_in: Duration,
    /// Maximum distance to a target.
    pub range: f32,
    /// Rule used to choose a target.
    pub targeting: TargetingMode,
}

/// Group of identical attackers emitted at a fixed cadence within a wave.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnGroup {
    /// Type of attacker spawned by the group.
    pub kind: AttackerKind,
    /// Number of attackers in the group.
    pub count: u32,
    /// Time between consecutive spawns of the group.
    pub interval: Duration,
    /// Lane every spawn uses; spawns pick a lane when absent.
    pub lane: Option<LaneId>,
}

/// Ordered set of spawn groups released together.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Wave {
    /// Delay between the previous wave finishing and this wave starting.
    pub start_delay: Duration,
    /// Groups spawned concurrently during the wave.
    pub groups: Vec<SpawnGroup>,
}

impl Wave {
    /// Number of attackers the wave spawns.
    #[must_use]
    pub fn total_spawns(&self) -> u32 {
        self.groups
            .iter()
            .fold(0u32, |total, group| total.saturating_add(group.count))
    }
}

/// Complete wave script of a level.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WavePlan {
    waves: Vec<Wave>,
}

impl WavePlan {
    /// Creates a plan from the provided waves in play order.
    #[must_use]
    pub fn new(waves: Vec<Wave>) -> Self {
        Self { waves }
    }

    /// Waves in play order.
    #[must_use]
    pub fn waves(&self) -> &[Wave] {
        &self.waves
    }

    /// Reports whether the plan contains no waves.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }

    /// Number of attackers spawned across all waves.
    #[must_use]
    pub fn total_spawns(&self) -> u32 {
        self.waves
            .iter()
            .fold(0u32, |total, wave| total.saturating_add(wave.total_spawns()))
    }
}

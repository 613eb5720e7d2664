#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pooled attacker entity driven by an explicit finite-state machine.
//!
//! The attacker owns its state, a struct of per-state timers and its armor.
//! Each tick the world hands it a [`Perception`] describing nearby defenders;
//! the attacker evaluates the pure [`transition`] function, runs the
//! behaviour of the resulting state and reports everything the world must act
//! on as [`AttackerIntent`] values.

mod transition;

use std::time::Duration;

use lane_defence_core::{
    AttackerDefinition, AttackerKind, AttackerState, DamageKind, DeathCause, EffectCue,
    EntityCategory, EntityId, EntityRecord, Faction, Health, LaneId, ProjectileKind,
    SpecialEffect, Vec2,
};
use lane_defence_pool::Poolable;
use lane_defence_system_damage::{apply_damage, ArmorLayer, DamageReport};
use log::debug;

pub use transition::{transition, Stimulus};

/// Spawn parameters handed to an attacker taken from the pool.
#[derive(Clone, Debug)]
pub struct AttackerSpawn {
    /// Identifier assigned for this life.
    pub id: EntityId,
    /// Definition the attacker plays out.
    pub definition: AttackerDefinition,
    /// Lane the attacker walks along.
    pub lane: LaneId,
    /// Starting position.
    pub position: Vec2,
    /// Horizontal coordinate of the objective boundary.
    pub objective_x: f32,
}

/// Defenders the world observed around the attacker this tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Perception {
    /// Defender standing within melee range ahead of the attacker.
    pub melee_target: Option<EntityId>,
    /// Defender within ranged attack range, with its position.
    pub ranged_target: Option<(EntityId, Vec2)>,
}

/// Elapsed time tracked per state.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StateTimers {
    /// Time accumulated toward the next melee strike or ranged shot.
    pub attack: Duration,
    /// Time spent dying.
    pub death: Duration,
    /// Time spent running the special ability.
    pub special: Duration,
}

/// Side effects an attacker asks the world to perform.
#[derive(Clone, Debug, PartialEq)]
pub enum AttackerIntent {
    /// The state machine moved between states.
    StateChanged {
        /// State that was exited.
        from: AttackerState,
        /// State that was entered.
        to: AttackerState,
    },
    /// Strike the adjacent defender.
    MeleeStrike {
        /// Defender receiving the strike.
        target: EntityId,
        /// Base damage of the strike.
        damage: f32,
        /// Kind of damage dealt.
        kind: DamageKind,
    },
    /// Launch a projectile toward a defender.
    FireProjectile {
        /// Defender the projectile is aimed at.
        target: EntityId,
        /// Projectile to launch.
        projectile: ProjectileKind,
    },
    /// The attacker crossed the objective boundary.
    ObjectiveReached {
        /// Damage the objective suffers.
        damage: u32,
    },
    /// The attacker entered its terminal state.
    Died {
        /// Reason the attacker is leaving play.
        cause: DeathCause,
    },
    /// A killed attacker dropped its reward.
    RewardDropped {
        /// Amount of reward dropped.
        amount: u32,
        /// Position the reward appears at.
        position: Vec2,
    },
    /// Play a cue at the provided position.
    Cue {
        /// Effect and sound to play.
        cue: EffectCue,
        /// Position the cue plays at.
        position: Vec2,
    },
    /// Return the attacker to its pool.
    RequestRelease,
}

/// Mobile attacker taken from the attacker pool.
#[derive(Clone, Debug)]
pub struct Attacker {
    id: EntityId,
    kind: AttackerKind,
    lane: LaneId,
    definition: AttackerDefinition,
    position: Vec2,
    spawn_x: f32,
    objective_x: f32,
    health: Health,
    armor: Option<ArmorLayer>,
    state: AttackerState,
    timers: StateTimers,
    target: Option<EntityId>,
    special_used: bool,
    death_cause: Option<DeathCause>,
    release_requested: bool,
    active: bool,
}

impl Poolable for Attacker {
    type Key = AttackerKind;
    type SpawnData = AttackerSpawn;

    fn create(kind: AttackerKind) -> Self {
        Self {
            id: EntityId::new(0),
            kind,
            lane: LaneId::new(0),
            definition: AttackerDefinition::default(),
            position: Vec2::ZERO,
            spawn_x: 0.0,
            objective_x: 0.0,
            health: Health::default(),
            armor: None,
            state: AttackerState::Moving,
            timers: StateTimers::default(),
            target: None,
            special_used: false,
            death_cause: None,
            release_requested: false,
            active: false,
        }
    }

    fn initialize(&mut self, spawn: &AttackerSpawn) {
        self.id = spawn.id;
        self.lane = spawn.lane;
        self.definition = spawn.definition.clone();
        self.position = spawn.position;
        self.spawn_x = spawn.position.x;
        self.objective_x = spawn.objective_x;
        self.health = Health::new(spawn.definition.max_health);
        self.armor = spawn
            .definition
            .armor
            .as_ref()
            .map(ArmorLayer::from_definition);
        self.state = AttackerState::Moving;
        self.timers = StateTimers::default();
        self.target = None;
        self.special_used = false;
        self.death_cause = None;
        self.release_requested = false;
        self.active = true;
    }

    fn reset(&mut self) {
        self.armor = None;
        self.target = None;
        self.timers = StateTimers::default();
        self.state = AttackerState::Moving;
        self.death_cause = None;
        self.active = false;
    }
}

impl Attacker {
    /// Identifier assigned for the current life.
    #[must_use]
    pub const fn id(&self) -> EntityId {
        self.id
    }

    /// Pool key of the attacker.
    #[must_use]
    pub const fn kind(&self) -> AttackerKind {
        self.kind
    }

    /// Lane the attacker walks along.
    #[must_use]
    pub const fn lane(&self) -> LaneId {
        self.lane
    }

    /// Definition the attacker plays out.
    #[must_use]
    pub const fn definition(&self) -> &AttackerDefinition {
        &self.definition
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Own hit points, excluding armor.
    #[must_use]
    pub const fn health(&self) -> Health {
        self.health
    }

    /// Attached armor, if it has not broken yet.
    #[must_use]
    pub const fn armor(&self) -> Option<&ArmorLayer> {
        self.armor.as_ref()
    }

    /// Current behavioural state.
    #[must_use]
    pub const fn state(&self) -> AttackerState {
        self.state
    }

    /// Per-state timers.
    #[must_use]
    pub const fn timers(&self) -> StateTimers {
        self.timers
    }

    /// Defender currently engaged, if any.
    #[must_use]
    pub const fn target(&self) -> Option<EntityId> {
        self.target
    }

    /// Reason the attacker is dying, once it is.
    #[must_use]
    pub const fn death_cause(&self) -> Option<DeathCause> {
        self.death_cause
    }

    /// Reports whether the attacker is currently in play.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Combined hit points published to the registry.
    ///
    /// The maximum is the base health plus the armor's initial durability and
    /// the current value adds whatever durability remains.
    #[must_use]
    pub fn combined_health(&self) -> Health {
        let initial_durability = self
            .definition
            .armor
            .as_ref()
            .map_or(0.0, |armor| armor.durability.max(0.0));
        let remaining = if self.health.is_depleted() {
            0.0
        } else {
            self.armor.as_ref().map_or(0.0, ArmorLayer::durability)
        };
        Health::with_current(
            self.health.current() + remaining,
            self.health.max() + initial_durability,
        )
    }

    /// Registry record describing the attacker's current state.
    #[must_use]
    pub fn record(&self) -> EntityRecord {
        EntityRecord {
            id: self.id,
            category: EntityCategory::Attacker,
            faction: Faction::Attacking,
            lane: Some(self.lane),
            position: self.position,
            health: self.combined_health(),
            priority: self.definition.priority,
            radius: self.definition.radius,
            active: self.active,
            targetable: self.state != AttackerState::Dying,
        }
    }

    /// Resolves incoming damage against armor and health.
    ///
    /// Dying or inactive attackers ignore damage.
    pub fn take_damage(&mut self, base: f32, kind: DamageKind) -> DamageReport {
        if !self.active || self.state.is_terminal() {
            return DamageReport::default();
        }
        apply_damage(&mut self.health, &mut self.armor, base, kind)
    }

    /// Pushes the attacker back toward its spawn edge.
    pub fn knock_back(&mut self, distance: f32) {
        if !self.active || self.state.is_terminal() || distance <= 0.0 {
            return;
        }
        self.position.x = (self.position.x + distance).min(self.spawn_x.max(self.position.x));
    }

    /// Advances the state machine by `dt` and reports resulting intents.
    pub fn update(
        &mut self,
        perception: &Perception,
        dt: Duration,
        out: &mut Vec<AttackerIntent>,
    ) {
        if !self.active {
            return;
        }

        let stimulus = self.stimulus(perception);
        let next = transition(self.state, &stimulus);
        if next != self.state {
            let cause = if stimulus.health_depleted {
                DeathCause::Killed
            } else {
                DeathCause::ReachedObjective
            };
            if next == AttackerState::Dying && cause == DeathCause::ReachedObjective {
                out.push(AttackerIntent::ObjectiveReached {
                    damage: self.definition.objective_damage,
                });
            }
            self.change_state(next, cause, out);
        }

        self.target = match self.state {
            AttackerState::Engaging => perception.melee_target,
            AttackerState::RangedAttacking => perception.ranged_target.map(|(id, _)| id),
            _ => None,
        };

        match self.state {
            AttackerState::Moving => self.walk(self.definition.speed, dt, out),
            AttackerState::Engaging => self.strike(dt, out),
            AttackerState::RangedAttacking => self.shoot(dt, out),
            AttackerState::Special => self.run_special(dt, out),
            AttackerState::Dying => self.play_out_death(dt, out),
        }
    }

    /// Moves the state machine to `next`, running exit and enter hooks.
    ///
    /// Re-entering the dying state is a no-op.
    pub fn change_state(
        &mut self,
        next: AttackerState,
        cause: DeathCause,
        out: &mut Vec<AttackerIntent>,
    ) {
        if self.state.is_terminal() || next == self.state {
            return;
        }
        let previous = self.state;
        self.exit_state(previous);
        self.state = next;
        out.push(AttackerIntent::StateChanged {
            from: previous,
            to: next,
        });
        self.enter_state(next, cause, out);
    }

    fn stimulus(&self, perception: &Perception) -> Stimulus {
        let special_triggered = self.definition.special.as_ref().is_some_and(|special| {
            !self.special_used
                && !self.health.is_depleted()
                && self.health.fraction() <= special.trigger_health_fraction
        });
        let special_finished = self.state == AttackerState::Special
            && self
                .definition
                .special
                .as_ref()
                .map_or(true, |special| self.timers.special >= special.duration);
        Stimulus {
            health_depleted: self.health.is_depleted(),
            objective_reached: self.position.x <= self.objective_x,
            special_triggered,
            special_finished,
            melee_target: perception.melee_target.is_some(),
            ranged_target: self.definition.ranged.is_some()
                && perception.ranged_target.is_some(),
        }
    }

    fn exit_state(&mut self, state: AttackerState) {
        match state {
            AttackerState::Engaging | AttackerState::RangedAttacking => {
                self.target = None;
                self.timers.attack = Duration::ZERO;
            }
            AttackerState::Special => self.timers.special = Duration::ZERO,
            AttackerState::Moving | AttackerState::Dying => {}
        }
    }

    fn enter_state(
        &mut self,
        state: AttackerState,
        cause: DeathCause,
        out: &mut Vec<AttackerIntent>,
    ) {
        match state {
            AttackerState::Moving => self.target = None,
            AttackerState::Engaging | AttackerState::RangedAttacking => {
                self.timers.attack = Duration::ZERO;
            }
            AttackerState::Special => {
                self.special_used = true;
                self.timers.special = Duration::ZERO;
                if let Some(special) = &self.definition.special {
                    if !special.cue.is_empty() {
                        out.push(AttackerIntent::Cue {
                            cue: special.cue.clone(),
                            position: self.position,
                        });
                    }
                }
            }
            AttackerState::Dying => {
                self.target = None;
                self.death_cause = Some(cause);
                self.timers.death = Duration::ZERO;
                debug!("attacker {} dying: {:?}", self.id.get(), cause);
                out.push(AttackerIntent::Died { cause });
                if cause == DeathCause::Killed && self.definition.reward > 0 {
                    out.push(AttackerIntent::RewardDropped {
                        amount: self.definition.reward,
                        position: self.position,
                    });
                }
                if !self.definition.death_cue.is_empty() {
                    out.push(AttackerIntent::Cue {
                        cue: self.definition.death_cue.clone(),
                        position: self.position,
                    });
                }
            }
        }
    }

    fn walk(&mut self, speed: f32, dt: Duration, out: &mut Vec<AttackerIntent>) {
        self.position.x -= speed.max(0.0) * dt.as_secs_f32();
        if self.position.x <= self.objective_x {
            self.position.x = self.objective_x;
            out.push(AttackerIntent::ObjectiveReached {
                damage: self.definition.objective_damage,
            });
            let stimulus = Stimulus {
                objective_reached: true,
                ..Stimulus::default()
            };
            let next = transition(self.state, &stimulus);
            self.change_state(next, DeathCause::ReachedObjective, out);
        }
    }

    fn strike(&mut self, dt: Duration, out: &mut Vec<AttackerIntent>) {
        let Some(target) = self.target else {
            return;
        };
        if self.advance_attack_timer(self.definition.attack_interval, dt) {
            out.push(AttackerIntent::MeleeStrike {
                target,
                damage: self.definition.melee_damage,
                kind: self.definition.melee_kind,
            });
        }
    }

    fn shoot(&mut self, dt: Duration, out: &mut Vec<AttackerIntent>) {
        let (Some(target), Some(ranged)) = (self.target, self.definition.ranged) else {
            return;
        };
        if self.advance_attack_timer(ranged.interval, dt) {
            out.push(AttackerIntent::FireProjectile {
                target,
                projectile: ranged.projectile,
            });
        }
    }

    fn run_special(&mut self, dt: Duration, out: &mut Vec<AttackerIntent>) {
        self.timers.special = self.timers.special.saturating_add(dt);
        let Some(effect) = self.definition.special.as_ref().map(|special| special.effect) else {
            return;
        };
        match effect {
            SpecialEffect::Charge { speed_multiplier } => {
                self.walk(self.definition.speed * speed_multiplier.max(0.0), dt, out);
            }
            SpecialEffect::Regenerate { per_second } => {
                let _ = self.health.heal(per_second * dt.as_secs_f32());
                self.walk(self.definition.speed, dt, out);
            }
        }
    }

    fn play_out_death(&mut self, dt: Duration, out: &mut Vec<AttackerIntent>) {
        if self.release_requested {
            return;
        }
        self.timers.death = self.timers.death.saturating_add(dt);
        if self.timers.death >= self.definition.death_delay {
            self.release_requested = true;
            out.push(AttackerIntent::RequestRelease);
        }
    }

    fn advance_attack_timer(&mut self, interval: Duration, dt: Duration) -> bool {
        self.timers.attack = self.timers.attack.saturating_add(dt);
        if self.timers.attack < interval {
            return false;
        }
        self.timers.attack = if interval.is_zero() {
            Duration::ZERO
        } else {
            self.timers.attack - interval
        };
        true
    }
}

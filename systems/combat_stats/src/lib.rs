#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Diagnostic system that folds the world's event stream into combat statistics.

use std::{
    collections::{BTreeMap, HashMap},
    time::Duration,
};

use lane_defence_core::{DamageKind, DeathCause, Event, SpawnFailure, TerminationReason};

/// Immutable summary of everything observed during a run.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CombatReport {
    ticks: u64,
    elapsed: Duration,
    spawned: u32,
    killed: u32,
    leaked: u32,
    released: u32,
    defenders_placed: u32,
    defenders_destroyed: u32,
    damage_by_kind: BTreeMap<DamageKind, f32>,
    absorbed: f32,
    armor_breaks: u32,
    projectiles_fired: u32,
    bounces: u32,
    terminations: HashMap<TerminationReason, u32>,
    spawn_failures: HashMap<SpawnFailure, u32>,
    projectile_failures: HashMap<SpawnFailure, u32>,
    rewards: u64,
    objective_damage: u64,
}

impl CombatReport {
    /// Number of ticks observed.
    #[must_use]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Simulated time covered by the observed ticks.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Attackers that entered the field.
    #[must_use]
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Attackers killed by damage.
    #[must_use]
    pub fn killed(&self) -> u32 {
        self.killed
    }

    /// Attackers that reached the objective.
    #[must_use]
    pub fn leaked(&self) -> u32 {
        self.leaked
    }

    /// Attackers handed back to their pool after dying.
    #[must_use]
    pub fn released(&self) -> u32 {
        self.released
    }

    /// Defenders placed on the field.
    #[must_use]
    pub fn defenders_placed(&self) -> u32 {
        self.defenders_placed
    }

    /// Defenders destroyed by attackers.
    #[must_use]
    pub fn defenders_destroyed(&self) -> u32 {
        self.defenders_destroyed
    }

    /// Health damage dealt with the provided damage kind.
    #[must_use]
    pub fn damage(&self, kind: DamageKind) -> f32 {
        self.damage_by_kind.get(&kind).copied().unwrap_or(0.0)
    }

    /// Health damage dealt per damage kind, ordered by kind.
    pub fn damage_by_kind(&self) -> impl Iterator<Item = (DamageKind, f32)> + '_ {
        self.damage_by_kind
            .iter()
            .map(|(kind, amount)| (*kind, *amount))
    }

    /// Health damage dealt across every damage kind.
    #[must_use]
    pub fn total_damage(&self) -> f32 {
        self.damage_by_kind.values().sum()
    }

    /// Damage soaked up by armor.
    #[must_use]
    pub fn absorbed(&self) -> f32 {
        self.absorbed
    }

    /// Armor layers that broke.
    #[must_use]
    pub fn armor_breaks(&self) -> u32 {
        self.armor_breaks
    }

    /// Projectiles launched.
    #[must_use]
    pub fn projectiles_fired(&self) -> u32 {
        self.projectiles_fired
    }

    /// Terrain ricochets across every projectile.
    #[must_use]
    pub fn bounces(&self) -> u32 {
        self.bounces
    }

    /// Projectiles that ended for the provided reason.
    #[must_use]
    pub fn terminated(&self, reason: TerminationReason) -> u32 {
        self.terminations.get(&reason).copied().unwrap_or(0)
    }

    /// Projectiles that ended for any reason.
    #[must_use]
    pub fn total_terminated(&self) -> u32 {
        self.terminations.values().sum()
    }

    /// Spawn and placement requests rejected for the provided reason.
    #[must_use]
    pub fn spawn_failures(&self, reason: SpawnFailure) -> u32 {
        self.spawn_failures.get(&reason).copied().unwrap_or(0)
    }

    /// Fire requests rejected for the provided reason.
    #[must_use]
    pub fn projectile_failures(&self, reason: SpawnFailure) -> u32 {
        self.projectile_failures.get(&reason).copied().unwrap_or(0)
    }

    /// Rewards dropped by killed attackers.
    #[must_use]
    pub fn rewards(&self) -> u64 {
        self.rewards
    }

    /// Damage dealt to the objective.
    #[must_use]
    pub fn objective_damage(&self) -> u64 {
        self.objective_damage
    }
}

/// Pure statistics system that accumulates a [`CombatReport`].
#[derive(Debug, Default)]
pub struct CombatStats {
    report: CombatReport,
}

impl CombatStats {
    /// Creates a new statistics system with an empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the statistics accumulated so far.
    #[must_use]
    pub fn report(&self) -> &CombatReport {
        &self.report
    }

    /// Consumes world events and folds them into the report.
    pub fn handle(&mut self, events: &[Event]) {
        let report = &mut self.report;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => {
                    report.ticks += 1;
                    report.elapsed = report.elapsed.saturating_add(*dt);
                }
                Event::AttackerSpawned { .. } => report.spawned += 1,
                Event::SpawnSkipped { reason, .. } | Event::PlacementRejected { reason, .. } => {
                    *report.spawn_failures.entry(*reason).or_insert(0) += 1;
                }
                Event::DefenderPlaced { .. } => report.defenders_placed += 1,
                Event::DefenderDestroyed { .. } => report.defenders_destroyed += 1,
                Event::DamageApplied {
                    kind,
                    absorbed,
                    to_health,
                    ..
                } => {
                    *report.damage_by_kind.entry(*kind).or_insert(0.0) += *to_health;
                    report.absorbed += *absorbed;
                }
                Event::ArmorBroken { .. } => report.armor_breaks += 1,
                Event::AttackerDied { cause, .. } => match cause {
                    DeathCause::Killed => report.killed += 1,
                    DeathCause::ReachedObjective => report.leaked += 1,
                },
                Event::RewardDropped { amount, .. } => report.rewards += u64::from(*amount),
                Event::ObjectiveReached { damage, .. } => {
                    report.objective_damage += u64::from(*damage);
                }
                Event::ProjectileFired { .. } => report.projectiles_fired += 1,
                Event::ProjectileSkipped { reason, .. } => {
                    *report.projectile_failures.entry(*reason).or_insert(0) += 1;
                }
                Event::ProjectileBounced { .. } => report.bounces += 1,
                Event::ProjectileTerminated { reason, .. } => {
                    *report.terminations.entry(*reason).or_insert(0) += 1;
                }
                Event::AttackerReleased { .. } => report.released += 1,
                Event::AttackerStateChanged { .. }
                | Event::EffectRequested { .. }
                | Event::SoundRequested { .. }
                | Event::PoolsPrewarmed { .. }
                | Event::LevelEnded { .. }
                | Event::PoolsCleared { .. } => {}
            }
        }
    }
}

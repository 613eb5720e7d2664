//! Scenario files: TOML arena, definitions, placements and waves.
//!
//! Files are parsed into plain serde structures first and then validated into
//! immutable [`Definitions`], an [`ArenaSettings`] and a [`WavePlan`]. Names
//! are resolved to typed kinds in declaration order, so the first
//! `[[attackers]]` table becomes `AttackerKind::new(0)`.

use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use lane_defence_core::{
    ArmorDefinition, AttackerDefinition, Command, DamageKind, DefenderDefinition, DefenderKind,
    EffectCue, LaneId, MotionKind, ProjectileDefinition, RangedProfile, SpawnGroup,
    SpecialAbility, SpecialEffect, TargetingMode, Vec2, Wave, WavePlan,
};
use lane_defence_pool::PoolSettings;
use serde::Deserialize;
use thiserror::Error;

use crate::{ArenaSettings, Definitions, Obstacle};

/// Errors reported while loading a scenario.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// The scenario is not valid TOML or does not match the expected shape.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] toml::de::Error),
    /// Two entries of the same section share a name.
    #[error("duplicate {section} name `{name}`")]
    DuplicateName {
        /// Section containing the duplicate.
        section: &'static str,
        /// Name that appears twice.
        name: String,
    },
    /// An entry names a definition that does not exist.
    #[error("{owner} references unknown {section} `{name}`")]
    UnknownReference {
        /// Entry holding the reference.
        owner: String,
        /// Section the name was looked up in.
        section: &'static str,
        /// Name that could not be resolved.
        name: String,
    },
    /// A value lies outside its permitted range.
    #[error("{field} of {owner} is invalid: {reason}")]
    InvalidValue {
        /// Entry holding the value.
        owner: String,
        /// Field that failed validation.
        field: &'static str,
        /// Constraint that was violated.
        reason: &'static str,
    },
    /// A placement or spawn group names a lane the arena does not have.
    #[error("{owner} uses lane {lane} but the arena has {lanes} lanes")]
    LaneOutOfRange {
        /// Entry holding the lane.
        owner: String,
        /// Requested lane.
        lane: u32,
        /// Number of lanes in the arena.
        lanes: u32,
    },
}

/// Defender placed when a scenario starts.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Type of defender to place.
    pub defender: DefenderKind,
    /// Lane the defender guards.
    pub lane: LaneId,
    /// Horizontal coordinate of the defender.
    pub x: f32,
}

impl Placement {
    /// Command that performs the placement.
    #[must_use]
    pub fn command(&self) -> Command {
        Command::PlaceDefender {
            kind: self.defender,
            lane: self.lane,
            x: self.x,
        }
    }
}

/// Fully validated scenario.
#[derive(Clone, Debug, PartialEq)]
pub struct Scenario {
    arena: ArenaSettings,
    definitions: Definitions,
    placements: Vec<Placement>,
    waves: WavePlan,
    seed: u64,
}

impl Scenario {
    /// Reads and validates a scenario file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parses and validates a scenario from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let raw: RawScenario = toml::from_str(contents)?;
        raw.validate()
    }

    /// Arena layout.
    #[must_use]
    pub fn arena(&self) -> &ArenaSettings {
        &self.arena
    }

    /// Definition tables.
    #[must_use]
    pub fn definitions(&self) -> &Definitions {
        &self.definitions
    }

    /// Defenders placed when the scenario starts.
    #[must_use]
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    /// Wave script.
    #[must_use]
    pub fn waves(&self) -> &WavePlan {
        &self.waves
    }

    /// Seed of the spawning lane generator.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawScenario {
    arena: RawArena,
    #[serde(default)]
    projectiles: Vec<RawProjectile>,
    #[serde(default)]
    attackers: Vec<RawAttacker>,
    #[serde(default)]
    defenders: Vec<RawDefender>,
    #[serde(default)]
    placements: Vec<RawPlacement>,
    #[serde(default)]
    obstacles: Vec<RawObstacle>,
    #[serde(default)]
    waves: Vec<RawWave>,
    #[serde(default)]
    spawning: RawSpawning,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArena {
    lanes: u32,
    lane_height: f32,
    spawn_x: f32,
    objective_x: f32,
    #[serde(default = "default_sweep_interval_ms")]
    sweep_interval_ms: u64,
}

fn default_sweep_interval_ms() -> u64 {
    500
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpawning {
    #[serde(default)]
    seed: u64,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCue {
    effect: Option<String>,
    sound: Option<String>,
}

impl RawCue {
    fn into_cue(self) -> EffectCue {
        EffectCue::new(self.effect, self.sound)
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawPool {
    prewarm: usize,
    max_size: usize,
    allow_expansion: bool,
}

impl Default for RawPool {
    fn default() -> Self {
        let settings = PoolSettings::default();
        Self {
            prewarm: settings.prewarm,
            max_size: settings.max_size,
            allow_expansion: settings.allow_expansion,
        }
    }
}

impl RawPool {
    fn into_settings(self, owner: &str) -> Result<PoolSettings, ConfigError> {
        if self.max_size == 0 {
            return Err(invalid(owner, "pool.max_size", "must be at least 1"));
        }
        Ok(PoolSettings::new(
            self.prewarm.min(self.max_size),
            self.max_size,
            self.allow_expansion,
        ))
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawProjectile {
    name: String,
    damage: f32,
    #[serde(default)]
    kind: DamageKind,
    speed: f32,
    lifetime: f32,
    #[serde(default)]
    motion: MotionKind,
    #[serde(default)]
    arc_height: f32,
    #[serde(default)]
    homing_radius: f32,
    #[serde(default)]
    turn_rate: f32,
    #[serde(default)]
    piercing: bool,
    #[serde(default)]
    max_pierce: u32,
    #[serde(default)]
    splash_radius: f32,
    #[serde(default)]
    knockback: f32,
    #[serde(default)]
    max_bounces: u32,
    #[serde(default = "default_radius")]
    radius: f32,
    #[serde(default)]
    impact_cue: RawCue,
    #[serde(default)]
    destroy_cue: RawCue,
    #[serde(default)]
    pool: RawPool,
}

fn default_radius() -> f32 {
    0.25
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArmor {
    durability: f32,
    #[serde(default)]
    damage_reduction: f32,
    #[serde(default)]
    resists: Vec<DamageKind>,
    #[serde(default)]
    vulnerable_to: Vec<DamageKind>,
    #[serde(default)]
    break_cue: RawCue,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRanged {
    projectile: String,
    range: f32,
    interval: f32,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RawEffect {
    Charge { speed_multiplier: f32 },
    Regenerate { per_second: f32 },
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSpecial {
    trigger_health_fraction: f32,
    duration: f32,
    effect: RawEffect,
    #[serde(default)]
    cue: RawCue,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAttacker {
    name: String,
    max_health: f32,
    speed: f32,
    #[serde(default)]
    melee_damage: f32,
    #[serde(default)]
    melee_kind: DamageKind,
    #[serde(default)]
    melee_range: f32,
    #[serde(default)]
    attack_interval: f32,
    #[serde(default)]
    armor: Option<RawArmor>,
    #[serde(default)]
    ranged: Option<RawRanged>,
    #[serde(default)]
    special: Option<RawSpecial>,
    #[serde(default)]
    reward: u32,
    #[serde(default)]
    objective_damage: u32,
    #[serde(default)]
    death_delay: f32,
    #[serde(default)]
    priority: i32,
    #[serde(default = "default_radius")]
    radius: f32,
    #[serde(default)]
    death_cue: RawCue,
    #[serde(default)]
    pool: RawPool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDefender {
    name: String,
    max_health: f32,
    projectile: String,
    range: f32,
    fire_interval: f32,
    #[serde(default)]
    targeting: TargetingMode,
    #[serde(default)]
    priority: i32,
    #[serde(default = "default_radius")]
    radius: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlacement {
    defender: String,
    lane: u32,
    x: f32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawObstacle {
    center: [f32; 2],
    half_extents: [f32; 2],
    #[serde(default)]
    bounceable: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawWave {
    #[serde(default)]
    start_delay: f32,
    #[serde(default)]
    groups: Vec<RawGroup>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawGroup {
    attacker: String,
    count: u32,
    #[serde(default)]
    interval: f32,
    #[serde(default)]
    lane: Option<u32>,
}

impl RawScenario {
    fn validate(self) -> Result<Scenario, ConfigError> {
        let arena = self.arena.validate(&self.obstacles)?;
        let mut definitions = Definitions::new();

        let mut names = BTreeSet::new();
        for projectile in self.projectiles {
            unique("projectile", &projectile.name, &mut names)?;
            let pool = projectile.pool.into_settings(&owner("projectile", &projectile.name))?;
            let definition = projectile.validate()?;
            let _ = definitions
                .add_projectile(definition, pool)
                .ok_or_else(|| too_many("projectiles"))?;
        }

        names.clear();
        for attacker in self.attackers {
            unique("attacker", &attacker.name, &mut names)?;
            let pool = attacker.pool.into_settings(&owner("attacker", &attacker.name))?;
            let definition = attacker.validate(&definitions)?;
            let _ = definitions
                .add_attacker(definition, pool)
                .ok_or_else(|| too_many("attackers"))?;
        }

        names.clear();
        for defender in self.defenders {
            unique("defender", &defender.name, &mut names)?;
            let definition = defender.validate(&definitions)?;
            let _ = definitions
                .add_defender(definition)
                .ok_or_else(|| too_many("defenders"))?;
        }

        let placements = self
            .placements
            .into_iter()
            .enumerate()
            .map(|(index, placement)| placement.validate(index, &arena, &definitions))
            .collect::<Result<Vec<_>, _>>()?;

        let waves = self
            .waves
            .into_iter()
            .enumerate()
            .map(|(index, wave)| wave.validate(index, &arena, &definitions))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Scenario {
            arena,
            definitions,
            placements,
            waves: WavePlan::new(waves),
            seed: self.spawning.seed,
        })
    }
}

impl RawArena {
    fn validate(&self, obstacles: &[RawObstacle]) -> Result<ArenaSettings, ConfigError> {
        let owner = "arena".to_owned();
        if self.lanes == 0 {
            return Err(invalid(&owner, "lanes", "must be at least 1"));
        }
        if !(self.lane_height.is_finite() && self.lane_height > 0.0) {
            return Err(invalid(&owner, "lane_height", "must be positive"));
        }
        if !(self.spawn_x.is_finite() && self.objective_x.is_finite()) {
            return Err(invalid(&owner, "spawn_x", "must be finite"));
        }
        if self.spawn_x <= self.objective_x {
            return Err(invalid(&owner, "spawn_x", "must lie right of objective_x"));
        }

        let obstacles = obstacles
            .iter()
            .map(|obstacle| {
                Obstacle::new(
                    Vec2::from_array(obstacle.center),
                    Vec2::from_array(obstacle.half_extents),
                    obstacle.bounceable,
                )
            })
            .collect();

        Ok(
            ArenaSettings::new(self.lanes, self.lane_height, self.spawn_x, self.objective_x)
                .with_sweep_interval(Duration::from_millis(self.sweep_interval_ms))
                .with_obstacles(obstacles),
        )
    }
}

impl RawProjectile {
    fn validate(self) -> Result<ProjectileDefinition, ConfigError> {
        let owner = owner("projectile", &self.name);
        non_negative(&owner, "damage", self.damage)?;
        non_negative(&owner, "speed", self.speed)?;
        non_negative(&owner, "splash_radius", self.splash_radius)?;
        non_negative(&owner, "radius", self.radius)?;
        if self.motion == MotionKind::Homing && self.homing_radius <= 0.0 {
            return Err(invalid(&owner, "homing_radius", "homing projectiles need a radius"));
        }
        Ok(ProjectileDefinition {
            damage: self.damage,
            kind: self.kind,
            speed: self.speed,
            lifetime: seconds(&owner, "lifetime", self.lifetime)?,
            motion: self.motion,
            arc_height: self.arc_height,
            homing_radius: self.homing_radius,
            turn_rate: self.turn_rate,
            piercing: self.piercing,
            max_pierce: self.max_pierce,
            splash_radius: self.splash_radius,
            knockback: self.knockback,
            max_bounces: self.max_bounces,
            radius: self.radius,
            impact_cue: self.impact_cue.into_cue(),
            destroy_cue: self.destroy_cue.into_cue(),
            name: self.name,
        })
    }
}

impl RawAttacker {
    fn validate(self, definitions: &Definitions) -> Result<AttackerDefinition, ConfigError> {
        let owner = owner("attacker", &self.name);
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(invalid(&owner, "max_health", "must be positive"));
        }
        non_negative(&owner, "speed", self.speed)?;
        non_negative(&owner, "melee_damage", self.melee_damage)?;
        non_negative(&owner, "melee_range", self.melee_range)?;
        non_negative(&owner, "radius", self.radius)?;

        let armor = self
            .armor
            .map(|armor| armor.validate(&owner))
            .transpose()?;
        let ranged = self
            .ranged
            .map(|ranged| ranged.validate(&owner, definitions))
            .transpose()?;
        let special = self
            .special
            .map(|special| special.validate(&owner))
            .transpose()?;

        Ok(AttackerDefinition {
            max_health: self.max_health,
            speed: self.speed,
            melee_damage: self.melee_damage,
            melee_kind: self.melee_kind,
            melee_range: self.melee_range,
            attack_interval: seconds(&owner, "attack_interval", self.attack_interval)?,
            armor,
            ranged,
            special,
            reward: self.reward,
            objective_damage: self.objective_damage,
            death_delay: seconds(&owner, "death_delay", self.death_delay)?,
            priority: self.priority,
            radius: self.radius,
            death_cue: self.death_cue.into_cue(),
            name: self.name,
        })
    }
}

impl RawArmor {
    fn validate(self, owner: &str) -> Result<ArmorDefinition, ConfigError> {
        non_negative(owner, "armor.durability", self.durability)?;
        if !(0.0..=1.0).contains(&self.damage_reduction) {
            return Err(invalid(owner, "armor.damage_reduction", "must lie in [0, 1]"));
        }
        Ok(ArmorDefinition {
            durability: self.durability,
            damage_reduction: self.damage_reduction,
            resists: self.resists,
            vulnerable_to: self.vulnerable_to,
            break_cue: self.break_cue.into_cue(),
        })
    }
}

impl RawRanged {
    fn validate(
        self,
        owner: &str,
        definitions: &Definitions,
    ) -> Result<RangedProfile, ConfigError> {
        let projectile = definitions
            .projectile_kind(&self.projectile)
            .ok_or_else(|| unknown(owner, "projectile", &self.projectile))?;
        non_negative(owner, "ranged.range", self.range)?;
        Ok(RangedProfile {
            projectile,
            range: self.range,
            interval: seconds(owner, "ranged.interval", self.interval)?,
        })
    }
}

impl RawSpecial {
    fn validate(self, owner: &str) -> Result<SpecialAbility, ConfigError> {
        if !(0.0..=1.0).contains(&self.trigger_health_fraction) {
            return Err(invalid(
                owner,
                "special.trigger_health_fraction",
                "must lie in [0, 1]",
            ));
        }
        let effect = match self.effect {
            RawEffect::Charge { speed_multiplier } => {
                non_negative(owner, "special.effect.speed_multiplier", speed_multiplier)?;
                SpecialEffect::Charge { speed_multiplier }
            }
            RawEffect::Regenerate { per_second } => {
                non_negative(owner, "special.effect.per_second", per_second)?;
                SpecialEffect::Regenerate { per_second }
            }
        };
        Ok(SpecialAbility {
            trigger_health_fraction: self.trigger_health_fraction,
            duration: seconds(owner, "special.duration", self.duration)?,
            effect,
            cue: self.cue.into_cue(),
        })
    }
}

impl RawDefender {
    fn validate(self, definitions: &Definitions) -> Result<DefenderDefinition, ConfigError> {
        let owner = owner("defender", &self.name);
        let projectile = definitions
            .projectile_kind(&self.projectile)
            .ok_or_else(|| unknown(&owner, "projectile", &self.projectile))?;
        if !(self.max_health.is_finite() && self.max_health > 0.0) {
            return Err(invalid(&owner, "max_health", "must be positive"));
        }
        non_negative(&owner, "range", self.range)?;
        non_negative(&owner, "radius", self.radius)?;
        Ok(DefenderDefinition {
            max_health: self.max_health,
            projectile,
            range: self.range,
            fire_interval: seconds(&owner, "fire_interval", self.fire_interval)?,
            targeting: self.targeting,
            priority: self.priority,
            radius: self.radius,
            name: self.name,
        })
    }
}

impl RawPlacement {
    fn validate(
        self,
        index: usize,
        arena: &ArenaSettings,
        definitions: &Definitions,
    ) -> Result<Placement, ConfigError> {
        let owner = format!("placement #{index}");
        let defender = definitions
            .defender_kind(&self.defender)
            .ok_or_else(|| unknown(&owner, "defender", &self.defender))?;
        let lane = lane(&owner, self.lane, arena)?;
        if !self.x.is_finite() {
            return Err(invalid(&owner, "x", "must be finite"));
        }
        Ok(Placement {
            defender,
            lane,
            x: self.x,
        })
    }
}

impl RawWave {
    fn validate(
        self,
        index: usize,
        arena: &ArenaSettings,
        definitions: &Definitions,
    ) -> Result<Wave, ConfigError> {
        let owner = format!("wave #{index}");
        let start_delay = seconds(&owner, "start_delay", self.start_delay)?;
        let groups = self
            .groups
            .into_iter()
            .map(|group| {
                let kind = definitions
                    .attacker_kind(&group.attacker)
                    .ok_or_else(|| unknown(&owner, "attacker", &group.attacker))?;
                let lane = group
                    .lane
                    .map(|value| lane(&owner, value, arena))
                    .transpose()?;
                Ok(SpawnGroup {
                    kind,
                    count: group.count,
                    interval: seconds(&owner, "interval", group.interval)?,
                    lane,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;
        Ok(Wave {
            start_delay,
            groups,
        })
    }
}

fn owner(section: &str, name: &str) -> String {
    format!("{section} `{name}`")
}

fn unique(
    section: &'static str,
    name: &str,
    seen: &mut BTreeSet<String>,
) -> Result<(), ConfigError> {
    if seen.insert(name.to_owned()) {
        Ok(())
    } else {
        Err(ConfigError::DuplicateName {
            section,
            name: name.to_owned(),
        })
    }
}

fn unknown(owner: &str, section: &'static str, name: &str) -> ConfigError {
    ConfigError::UnknownReference {
        owner: owner.to_owned(),
        section,
        name: name.to_owned(),
    }
}

fn invalid(owner: &str, field: &'static str, reason: &'static str) -> ConfigError {
    ConfigError::InvalidValue {
        owner: owner.to_owned(),
        field,
        reason,
    }
}

fn too_many(section: &str) -> ConfigError {
    invalid(&format!("{section} section"), "length", "too many entries")
}

fn non_negative(owner: &str, field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(owner, field, "must be a finite non-negative number"))
    }
}

fn seconds(owner: &str, field: &'static str, value: f32) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f32(value)
        .map_err(|_| invalid(owner, field, "must be a finite non-negative number of seconds"))
}

fn lane(owner: &str, value: u32, arena: &ArenaSettings) -> Result<LaneId, ConfigError> {
    let lane = LaneId::new(value);
    if arena.contains_lane(lane) {
        Ok(lane)
    } else {
        Err(ConfigError::LaneOutOfRange {
            owner: owner.to_owned(),
            lane: value,
            lanes: arena.lanes(),
        })
    }
}

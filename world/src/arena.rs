//! Static arena layout: lanes, boundaries and terrain obstacles.

use std::time::Duration;

use lane_defence_core::{LaneId, Vec2};
use lane_defence_registry::DEFAULT_SWEEP_INTERVAL;

/// Describes the lanes attackers walk along and the terrain between them.
#[derive(Clone, Debug, PartialEq)]
pub struct ArenaSettings {
    lanes: u32,
    lane_height: f32,
    spawn_x: f32,
    objective_x: f32,
    sweep_interval: Duration,
    obstacles: Vec<Obstacle>,
}

impl ArenaSettings {
    /// Creates an arena with `lanes` horizontal lanes of equal height.
    ///
    /// Attackers enter at `spawn_x` and walk toward `objective_x`.
    #[must_use]
    pub fn new(lanes: u32, lane_height: f32, spawn_x: f32, objective_x: f32) -> Self {
        Self {
            lanes,
            lane_height,
            spawn_x,
            objective_x,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            obstacles: Vec::new(),
        }
    }

    /// Replaces the registry sweep interval.
    #[must_use]
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Replaces the terrain obstacles.
    #[must_use]
    pub fn with_obstacles(mut self, obstacles: Vec<Obstacle>) -> Self {
        self.obstacles = obstacles;
        self
    }

    /// Number of lanes in the arena.
    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    /// Height of a single lane in world units.
    #[must_use]
    pub const fn lane_height(&self) -> f32 {
        self.lane_height
    }

    /// Horizontal coordinate attackers spawn at.
    #[must_use]
    pub const fn spawn_x(&self) -> f32 {
        self.spawn_x
    }

    /// Horizontal coordinate of the objective boundary.
    #[must_use]
    pub const fn objective_x(&self) -> f32 {
        self.objective_x
    }

    /// Interval between registry sweeps.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        self.sweep_interval
    }

    /// Terrain obstacles projectiles collide with.
    #[must_use]
    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    /// Reports whether the lane exists.
    #[must_use]
    pub const fn contains_lane(&self, lane: LaneId) -> bool {
        lane.get() < self.lanes
    }

    /// Vertical coordinate of the lane's centre line.
    #[must_use]
    pub fn lane_center(&self, lane: LaneId) -> Option<f32> {
        self.contains_lane(lane)
            .then(|| (lane.get() as f32 + 0.5) * self.lane_height)
    }

    /// Identifiers of every lane in ascending order.
    pub fn lane_ids(&self) -> impl Iterator<Item = LaneId> {
        (0..self.lanes).map(LaneId::new)
    }
}

/// Axis-aligned block of terrain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Obstacle {
    center: Vec2,
    half_extents: Vec2,
    bounceable: bool,
}

impl Obstacle {
    /// Creates an obstacle centred on `center` spanning `half_extents` each way.
    #[must_use]
    pub fn new(center: Vec2, half_extents: Vec2, bounceable: bool) -> Self {
        Self {
            center,
            half_extents: half_extents.abs(),
            bounceable,
        }
    }

    /// Centre of the obstacle.
    #[must_use]
    pub const fn center(&self) -> Vec2 {
        self.center
    }

    /// Half of the obstacle's width and height.
    #[must_use]
    pub const fn half_extents(&self) -> Vec2 {
        self.half_extents
    }

    /// Reports whether projectiles may bounce off the obstacle.
    #[must_use]
    pub const fn is_bounceable(&self) -> bool {
        self.bounceable
    }

    /// Outward surface normal if a circle overlaps the obstacle.
    #[must_use]
    pub fn contact_normal(&self, position: Vec2, radius: f32) -> Option<Vec2> {
        let min = self.center - self.half_extents;
        let max = self.center + self.half_extents;
        let closest = position.clamp(min, max);
        let offset = position - closest;
        let radius = radius.max(0.0);
        if offset.length_squared() > radius * radius {
            return None;
        }
        if let Some(normal) = offset.try_normalize() {
            return Some(normal);
        }

        // Centre inside the block: push out along the shallowest axis.
        let penetrations = [
            (position.x - min.x, Vec2::NEG_X),
            (max.x - position.x, Vec2::X),
            (position.y - min.y, Vec2::NEG_Y),
            (max.y - position.y, Vec2::Y),
        ];
        penetrations
            .into_iter()
            .min_by(|left, right| left.0.total_cmp(&right.0))
            .map(|(_, normal)| normal)
    }
}

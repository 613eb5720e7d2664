#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Entity registry holding the authoritative record of every live entity.
//!
//! Records are indexed by identifier, by the targetable capability and by
//! coarse category. Targeting queries walk the targetable index in ascending
//! identifier order and use strict comparisons, so ties always resolve to the
//! lowest identifier. Inactive records are skipped by every query and purged
//! by a debounced sweep.

use std::{
    collections::{BTreeMap, BTreeSet},
    time::Duration,
};

use lane_defence_core::{EntityCategory, EntityId, EntityRecord, Targetable, Vec2};
use log::debug;

/// Interval between automatic sweeps of inactive records.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_millis(500);

/// Central index of live entities and their capabilities.
#[derive(Debug)]
pub struct EntityRegistry {
    records: BTreeMap<EntityId, EntityRecord>,
    targetable: BTreeSet<EntityId>,
    categories: BTreeMap<EntityCategory, BTreeSet<EntityId>>,
    sweep_interval: Duration,
    since_sweep: Duration,
}

impl Default for EntityRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_SWEEP_INTERVAL)
    }
}

impl EntityRegistry {
    /// Creates an empty registry that sweeps at the provided cadence.
    #[must_use]
    pub fn new(sweep_interval: Duration) -> Self {
        Self {
            records: BTreeMap::new(),
            targetable: BTreeSet::new(),
            categories: BTreeMap::new(),
            sweep_interval,
            since_sweep: Duration::ZERO,
        }
    }

    /// Adds a record and indexes it by capability and category.
    ///
    /// Returns `false` without touching the existing record when the
    /// identifier is already registered.
    pub fn register(&mut self, record: EntityRecord) -> bool {
        if self.records.contains_key(&record.id) {
            return false;
        }
        let id = record.id;
        if record.targetable {
            let _ = self.targetable.insert(id);
        }
        let _ = self.categories.entry(record.category).or_default().insert(id);
        let _ = self.records.insert(id, record);
        true
    }

    /// Removes a record from every index.
    pub fn unregister(&mut self, id: EntityId) -> Option<EntityRecord> {
        let record = self.records.remove(&id)?;
        let _ = self.targetable.remove(&id);
        if let Some(members) = self.categories.get_mut(&record.category) {
            let _ = members.remove(&id);
        }
        Some(record)
    }

    /// Replaces the stored state of a registered record.
    ///
    /// The category of a record is fixed at registration; a refresh carrying
    /// a different category is rejected.
    pub fn update(&mut self, record: EntityRecord) -> bool {
        let Some(existing) = self.records.get_mut(&record.id) else {
            return false;
        };
        if existing.category != record.category {
            return false;
        }
        if record.targetable {
            let _ = self.targetable.insert(record.id);
        } else {
            let _ = self.targetable.remove(&record.id);
        }
        *existing = record;
        true
    }

    /// Flags a record inactive so queries skip it until the next sweep.
    pub fn mark_inactive(&mut self, id: EntityId) -> bool {
        match self.records.get_mut(&id) {
            Some(record) => {
                record.active = false;
                true
            }
            None => false,
        }
    }

    /// Retrieves the record registered under the identifier.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&EntityRecord> {
        self.records.get(&id)
    }

    /// Reports whether the identifier is registered.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.records.contains_key(&id)
    }

    /// Number of registered records, active or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Reports whether no records are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of registered records in the category.
    #[must_use]
    pub fn count(&self, category: EntityCategory) -> usize {
        self.categories.get(&category).map_or(0, BTreeSet::len)
    }

    /// Number of records exposing the targetable capability.
    #[must_use]
    pub fn targetable_count(&self) -> usize {
        self.targetable.len()
    }

    /// Iterates registered records in ascending identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityRecord> + '_ {
        self.records.values()
    }

    /// Iterates identifiers of the category in ascending order.
    pub fn ids_in(&self, category: EntityCategory) -> impl Iterator<Item = EntityId> + '_ {
        self.categories
            .get(&category)
            .into_iter()
            .flat_map(|members| members.iter().copied())
    }

    /// Closest valid target within `max_range` satisfying the predicate.
    #[must_use]
    pub fn find_nearest_target<P>(
        &self,
        origin: Vec2,
        max_range: f32,
        predicate: P,
    ) -> Option<&EntityRecord>
    where
        P: Fn(&EntityRecord) -> bool,
    {
        let mut best: Option<(f32, &EntityRecord)> = None;
        for (distance_sq, record) in self.candidates(origin, max_range, &predicate) {
            match best {
                Some((best_distance, _)) if distance_sq >= best_distance => {}
                _ => best = Some((distance_sq, record)),
            }
        }
        best.map(|(_, record)| record)
    }

    /// Valid target with the greatest priority within `max_range`.
    #[must_use]
    pub fn find_highest_priority_target<P>(
        &self,
        origin: Vec2,
        max_range: f32,
        predicate: P,
    ) -> Option<&EntityRecord>
    where
        P: Fn(&EntityRecord) -> bool,
    {
        let mut best: Option<&EntityRecord> = None;
        for (_, record) in self.candidates(origin, max_range, &predicate) {
            match best {
                Some(existing) if record.priority() <= existing.priority() => {}
                _ => best = Some(record),
            }
        }
        best
    }

    /// Every valid target within `max_range`, in ascending identifier order.
    #[must_use]
    pub fn find_targets_in_range<P>(
        &self,
        origin: Vec2,
        max_range: f32,
        predicate: P,
    ) -> Vec<&EntityRecord>
    where
        P: Fn(&EntityRecord) -> bool,
    {
        self.candidates(origin, max_range, &predicate)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    /// Valid targets whose bodies overlap a circle, nearest first.
    ///
    /// Equal distances keep ascending identifier order.
    #[must_use]
    pub fn find_overlapping<P>(&self, origin: Vec2, radius: f32, predicate: P) -> Vec<EntityId>
    where
        P: Fn(&EntityRecord) -> bool,
    {
        let mut hits: Vec<(f32, EntityId)> = self
            .targetable
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|&record| record.is_valid_target() && predicate(record))
            .filter_map(|record| {
                let reach = radius.max(0.0) + record.radius.max(0.0);
                let distance_sq = record.distance_squared_to(origin);
                (distance_sq <= reach * reach).then_some((distance_sq, record.id))
            })
            .collect();
        hits.sort_by(|left, right| left.0.total_cmp(&right.0).then(left.1.cmp(&right.1)));
        hits.into_iter().map(|(_, id)| id).collect()
    }

    /// Accumulates elapsed time and sweeps once per interval.
    ///
    /// Returns the number of records removed by sweeps triggered by this call.
    pub fn advance(&mut self, dt: Duration) -> usize {
        self.since_sweep = self.since_sweep.saturating_add(dt);
        if self.sweep_interval.is_zero() {
            self.since_sweep = Duration::ZERO;
            return self.sweep();
        }
        if self.since_sweep < self.sweep_interval {
            return 0;
        }
        self.since_sweep = remainder(self.since_sweep, self.sweep_interval);
        self.sweep()
    }

    /// Removes every inactive record from all indices.
    pub fn sweep(&mut self) -> usize {
        let stale: Vec<EntityId> = self
            .records
            .values()
            .filter(|record| !record.active)
            .map(|record| record.id)
            .collect();
        let removed = stale
            .into_iter()
            .filter_map(|id| self.unregister(id))
            .count();
        if removed > 0 {
            debug!("registry sweep removed {removed} inactive records");
        }
        removed
    }

    /// Drops every record and resets the sweep timer.
    pub fn clear(&mut self) {
        self.records.clear();
        self.targetable.clear();
        self.categories.clear();
        self.since_sweep = Duration::ZERO;
    }

    fn candidates<P>(
        &self,
        origin: Vec2,
        max_range: f32,
        predicate: &P,
    ) -> Vec<(f32, &EntityRecord)>
    where
        P: Fn(&EntityRecord) -> bool,
    {
        let max_sq = max_range.max(0.0) * max_range.max(0.0);
        self.targetable
            .iter()
            .filter_map(|id| self.records.get(id))
            .filter(|&record| record.is_valid_target() && predicate(record))
            .filter_map(|record| {
                let distance_sq = record.distance_squared_to(origin);
                (distance_sq <= max_sq).then_some((distance_sq, record))
            })
            .collect()
    }
}

fn remainder(elapsed: Duration, interval: Duration) -> Duration {
    let nanos = elapsed.as_nanos() % interval.as_nanos();
    let secs = u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX);
    // Always below one billion.
    let subsec = (nanos % NANOS_PER_SEC) as u32;
    Duration::new(secs, subsec)
}

const NANOS_PER_SEC: u128 = 1_000_000_000;

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Generic keyed object pool used to recycle attackers and projectiles.
//!
//! Instances live in an arena of slots addressed by `u32` indices. Every type
//! key owns a free queue and an active list of indices, so an instance is
//! always in exactly one of {free, active, not yet created}. Handles carry a
//! generation counter that is bumped whenever an instance is released or
//! destroyed, which turns double releases and late lookups into no-ops.

use std::{
    collections::{BTreeMap, VecDeque},
    fmt::Debug,
};

use log::{debug, warn};
use thiserror::Error;

/// Number of instances created when a key is first touched.
pub const DEFAULT_PREWARM: usize = 1;

/// Upper bound on instances per key when no explicit settings exist.
pub const DEFAULT_MAX_SIZE: usize = 64;

/// Behaviour required from types stored inside an [`ObjectPool`].
pub trait Poolable {
    /// Type key selecting the pool entry an instance belongs to.
    type Key: Copy + Ord + Debug;

    /// Data used to initialise an instance when it is acquired.
    type SpawnData;

    /// Constructs a fresh inactive instance for the provided key.
    fn create(key: Self::Key) -> Self;

    /// Prepares an instance for a new life.
    fn initialize(&mut self, spawn: &Self::SpawnData);

    /// Clears per-life state when the instance returns to its pool.
    fn reset(&mut self);
}

/// Capacity settings applied to a single pool key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Instances created as soon as the key is first touched.
    pub prewarm: usize,
    /// Hard cap on free plus active instances.
    pub max_size: usize,
    /// Allows constructing instances on demand beyond the prewarmed set.
    pub allow_expansion: bool,
}

impl PoolSettings {
    /// Creates settings from explicit values.
    #[must_use]
    pub const fn new(prewarm: usize, max_size: usize, allow_expansion: bool) -> Self {
        Self {
            prewarm,
            max_size,
            allow_expansion,
        }
    }
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self::new(DEFAULT_PREWARM, DEFAULT_MAX_SIZE, true)
    }
}

/// Errors reported by pool acquisition.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The key reached its cap, or expansion is disabled and no instance is free.
    #[error("{pool} pool exhausted for key {key} ({capacity} instances)")]
    Exhausted {
        /// Label of the pool that rejected the request.
        pool: &'static str,
        /// Debug rendering of the requested key.
        key: String,
        /// Number of instances the key currently holds.
        capacity: usize,
    },
}

/// Generation-checked reference to an active pooled instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PoolHandle {
    index: u32,
    generation: u32,
}

impl PoolHandle {
    /// Arena index addressed by the handle.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Generation the handle was issued for.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

/// Lifetime counters collected per key for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances constructed.
    pub created: u64,
    /// Acquisitions served from the free queue.
    ///
    /// The first acquisition of a key takes an instance warmed for it and is
    /// not counted.
    pub reused: u64,
    /// Instances returned through release.
    pub returned: u64,
    /// Instances destroyed by clearing.
    pub destroyed: u64,
    /// Acquisitions rejected because the key was exhausted.
    pub exhausted: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SlotState {
    Free,
    Active,
}

#[derive(Debug)]
struct Slot<T: Poolable> {
    generation: u32,
    key: Option<T::Key>,
    state: SlotState,
    value: Option<T>,
}

#[derive(Debug, Default)]
struct PoolEntry {
    free: VecDeque<u32>,
    active: Vec<u32>,
}

impl PoolEntry {
    fn total(&self) -> usize {
        self.free.len() + self.active.len()
    }
}

/// Keyed pool of reusable instances.
#[derive(Debug)]
pub struct ObjectPool<T: Poolable> {
    label: &'static str,
    default_settings: PoolSettings,
    settings: BTreeMap<T::Key, PoolSettings>,
    entries: BTreeMap<T::Key, PoolEntry>,
    stats: BTreeMap<T::Key, PoolStats>,
    slots: Vec<Slot<T>>,
    vacant: Vec<u32>,
}

impl<T: Poolable> ObjectPool<T> {
    /// Creates an empty pool whose keys use the provided default settings.
    #[must_use]
    pub fn new(label: &'static str, default_settings: PoolSettings) -> Self {
        Self {
            label,
            default_settings,
            settings: BTreeMap::new(),
            entries: BTreeMap::new(),
            stats: BTreeMap::new(),
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }

    /// Label used in diagnostics.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }

    /// Overrides the settings used for a specific key.
    pub fn configure(&mut self, key: T::Key, settings: PoolSettings) {
        let _ = self.settings.insert(key, settings);
    }

    /// Settings applied to the provided key.
    #[must_use]
    pub fn settings(&self, key: T::Key) -> PoolSettings {
        self.settings
            .get(&key)
            .copied()
            .unwrap_or(self.default_settings)
    }

    /// Takes an instance for the provided key and initialises it.
    ///
    /// Free instances are reused before new ones are constructed. When the
    /// key is at its cap, or expansion is disabled with nothing free, the
    /// request is rejected and counted.
    pub fn acquire(
        &mut self,
        key: T::Key,
        spawn: &T::SpawnData,
    ) -> Result<PoolHandle, PoolError> {
        let first_touch = self.ensure_entry(key) > 0;
        let settings = self.settings(key);

        let reused = self.entries.get_mut(&key).and_then(|entry| entry.free.pop_front());
        let index = match reused {
            Some(index) => {
                if !first_touch {
                    self.stats_mut(key).reused += 1;
                }
                index
            }
            None => {
                let total = self.total(key);
                if !settings.allow_expansion || total >= settings.max_size {
                    self.stats_mut(key).exhausted += 1;
                    warn!(
                        "{} pool exhausted for {:?}: {} of {} instances in use",
                        self.label, key, total, settings.max_size
                    );
                    return Err(PoolError::Exhausted {
                        pool: self.label,
                        key: format!("{key:?}"),
                        capacity: total,
                    });
                }
                self.construct(key)
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.state = SlotState::Active;
        let generation = slot.generation;
        if let Some(value) = slot.value.as_mut() {
            value.initialize(spawn);
        }
        if let Some(entry) = self.entries.get_mut(&key) {
            entry.active.push(index);
        }

        Ok(PoolHandle { index, generation })
    }

    /// Returns an active instance to its free queue.
    ///
    /// Stale handles and instances that are already free are ignored and
    /// reported as `false`.
    pub fn release(&mut self, handle: PoolHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation || slot.state != SlotState::Active {
            return false;
        }
        let Some(key) = slot.key else {
            return false;
        };

        if let Some(value) = slot.value.as_mut() {
            value.reset();
        }
        slot.state = SlotState::Free;
        slot.generation = slot.generation.wrapping_add(1);

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.active.retain(|&index| index != handle.index);
            entry.free.push_back(handle.index);
        }
        self.stats_mut(key).returned += 1;
        true
    }

    /// Returns every active instance of every key to its free queue.
    pub fn release_all(&mut self) -> usize {
        let handles: Vec<PoolHandle> = self
            .entries
            .values()
            .flat_map(|entry| entry.active.iter())
            .map(|&index| PoolHandle {
                index,
                generation: self.slots[index as usize].generation,
            })
            .collect();

        let released = handles
            .into_iter()
            .filter(|&handle| self.release(handle))
            .count();
        if released > 0 {
            debug!("{} pool returned {} active instances", self.label, released);
        }
        released
    }

    /// Creates free instances until the key holds `target`, bounded by its cap.
    ///
    /// Returns the number of instances constructed, including the lazy
    /// prewarm performed when the key is first touched.
    pub fn prewarm(&mut self, key: T::Key, target: usize) -> usize {
        let mut created = self.ensure_entry(key);
        let goal = target.min(self.settings(key).max_size);
        while self.total(key) < goal {
            let index = self.construct(key);
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.free.push_back(index);
            }
            created += 1;
        }
        created
    }

    /// Destroys every instance of the key, active or free.
    pub fn clear_pool(&mut self, key: T::Key) -> usize {
        let Some(entry) = self.entries.remove(&key) else {
            return 0;
        };
        let indices: Vec<u32> = entry.active.into_iter().chain(entry.free).collect();
        let destroyed = indices.len();
        for index in indices {
            self.destroy(index);
        }
        self.stats_mut(key).destroyed += destroyed as u64;
        destroyed
    }

    /// Destroys every instance of every key.
    pub fn clear_all(&mut self) -> usize {
        let keys: Vec<T::Key> = self.entries.keys().copied().collect();
        let destroyed = keys.into_iter().map(|key| self.clear_pool(key)).sum();
        if destroyed > 0 {
            debug!("{} pool destroyed {} instances", self.label, destroyed);
        }
        destroyed
    }

    /// Retrieves an active instance.
    #[must_use]
    pub fn get(&self, handle: PoolHandle) -> Option<&T> {
        let slot = self.slots.get(handle.index as usize)?;
        if slot.generation != handle.generation || slot.state != SlotState::Active {
            return None;
        }
        slot.value.as_ref()
    }

    /// Retrieves an active instance mutably.
    #[must_use]
    pub fn get_mut(&mut self, handle: PoolHandle) -> Option<&mut T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        if slot.generation != handle.generation || slot.state != SlotState::Active {
            return None;
        }
        slot.value.as_mut()
    }

    /// Reports whether the handle still refers to an active instance.
    #[must_use]
    pub fn is_active(&self, handle: PoolHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Handles of the key's active instances in acquisition order.
    #[must_use]
    pub fn active_handles(&self, key: T::Key) -> Vec<PoolHandle> {
        self.entries
            .get(&key)
            .map(|entry| {
                entry
                    .active
                    .iter()
                    .map(|&index| PoolHandle {
                        index,
                        generation: self.slots[index as usize].generation,
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Number of active instances for the key.
    #[must_use]
    pub fn active_count(&self, key: T::Key) -> usize {
        self.entries.get(&key).map_or(0, |entry| entry.active.len())
    }

    /// Number of free instances for the key.
    #[must_use]
    pub fn free_count(&self, key: T::Key) -> usize {
        self.entries.get(&key).map_or(0, |entry| entry.free.len())
    }

    /// Number of free plus active instances for the key.
    #[must_use]
    pub fn total(&self, key: T::Key) -> usize {
        self.entries.get(&key).map_or(0, PoolEntry::total)
    }

    /// Number of active instances across every key.
    #[must_use]
    pub fn total_active(&self) -> usize {
        self.entries.values().map(|entry| entry.active.len()).sum()
    }

    /// Lifetime counters for the key.
    #[must_use]
    pub fn stats(&self, key: T::Key) -> PoolStats {
        self.stats.get(&key).copied().unwrap_or_default()
    }

    /// Keys that currently hold instances, in ascending order.
    #[must_use]
    pub fn keys(&self) -> Vec<T::Key> {
        self.entries.keys().copied().collect()
    }

    fn ensure_entry(&mut self, key: T::Key) -> usize {
        if self.entries.contains_key(&key) {
            return 0;
        }
        let _ = self.entries.insert(key, PoolEntry::default());
        let settings = self.settings(key);
        let goal = settings.prewarm.min(settings.max_size);
        for _ in 0..goal {
            let index = self.construct(key);
            if let Some(entry) = self.entries.get_mut(&key) {
                entry.free.push_back(index);
            }
        }
        if goal > 0 {
            debug!("{} pool prewarmed {:?} with {} instances", self.label, key, goal);
        }
        goal
    }

    fn construct(&mut self, key: T::Key) -> u32 {
        self.stats_mut(key).created += 1;
        let value = T::create(key);
        if let Some(index) = self.vacant.pop() {
            let slot = &mut self.slots[index as usize];
            slot.key = Some(key);
            slot.state = SlotState::Free;
            slot.value = Some(value);
            return index;
        }
        let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            key: Some(key),
            state: SlotState::Free,
            value: Some(value),
        });
        index
    }

    fn destroy(&mut self, index: u32) {
        let slot = &mut self.slots[index as usize];
        if slot.state == SlotState::Active {
            if let Some(value) = slot.value.as_mut() {
                value.reset();
            }
        }
        slot.generation = slot.generation.wrapping_add(1);
        slot.state = SlotState::Free;
        slot.key = None;
        slot.value = None;
        self.vacant.push(index);
    }

    fn stats_mut(&mut self, key: T::Key) -> &mut PoolStats {
        self.stats.entry(key).or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Token {
        kind: u8,
        payload: u32,
        lives: u32,
    }

    impl Poolable for Token {
        type Key = u8;
        type SpawnData = u32;

        fn create(key: u8) -> Self {
            Self {
                kind: key,
                payload: 0,
                lives: 0,
            }
        }

        fn initialize(&mut self, spawn: &u32) {
            self.payload = *spawn;
            self.lives += 1;
        }

        fn reset(&mut self) {
            self.payload = 0;
        }
    }

    #[test]
    fn first_touch_prewarms_the_key() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::new(3, 8, true));

        let handle = pool.acquire(1, &5).expect("acquire");

        assert_eq!(pool.total(1), 3);
        assert_eq!(pool.active_count(1), 1);
        assert_eq!(pool.free_count(1), 2);
        assert_eq!(pool.get(handle).map(|token| token.payload), Some(5));
        assert_eq!(pool.stats(1).created, 3);
        assert_eq!(pool.stats(1).reused, 0);

        let _ = pool.acquire(1, &6).expect("acquire");
        assert_eq!(pool.stats(1).reused, 1);
    }

    #[test]
    fn release_is_idempotent() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::default());
        let handle = pool.acquire(0, &9).expect("acquire");

        assert!(pool.release(handle));
        assert!(!pool.release(handle));
        assert!(pool.get(handle).is_none());
        assert_eq!(pool.free_count(0), 1);
        assert_eq!(pool.active_count(0), 0);
        assert_eq!(pool.stats(0).returned, 1);
    }

    #[test]
    fn reacquired_instances_are_reinitialised() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::default());
        let first = pool.acquire(2, &1).expect("acquire");
        assert!(pool.release(first));

        let second = pool.acquire(2, &7).expect("acquire");

        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        let token = pool.get(second).expect("active");
        assert_eq!(token.payload, 7);
        assert_eq!(token.lives, 2);
        assert_eq!(token.kind, 2);
    }

    #[test]
    fn disabled_expansion_serves_only_prewarmed_instances() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::default());
        pool.configure(4, PoolSettings::new(2, 10, false));

        assert!(pool.acquire(4, &0).is_ok());
        assert!(pool.acquire(4, &0).is_ok());
        assert!(matches!(
            pool.acquire(4, &0),
            Err(PoolError::Exhausted { capacity: 2, .. })
        ));
        assert_eq!(pool.stats(4).exhausted, 1);
    }

    #[test]
    fn prewarm_is_bounded_by_cap() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::new(1, 4, true));

        assert_eq!(pool.prewarm(3, 10), 4);
        assert_eq!(pool.total(3), 4);
        assert_eq!(pool.prewarm(3, 2), 0);
    }

    #[test]
    fn clear_pool_makes_handles_stale() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::default());
        let handle = pool.acquire(1, &3).expect("acquire");
        let _ = pool.prewarm(1, 4);

        assert_eq!(pool.clear_pool(1), 4);
        assert!(pool.get(handle).is_none());
        assert!(!pool.release(handle));
        assert_eq!(pool.total(1), 0);
        assert!(pool.keys().is_empty());
        assert_eq!(pool.stats(1).destroyed, 4);
    }

    #[test]
    fn destroyed_slots_are_recycled() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::new(0, 4, true));
        let first = pool.acquire(1, &0).expect("acquire");
        assert_eq!(pool.clear_all(), 1);

        let second = pool.acquire(5, &0).expect("acquire");

        assert_eq!(first.index(), second.index());
        assert!(pool.get(first).is_none());
        assert_eq!(pool.get(second).map(|token| token.kind), Some(5));
    }

    #[test]
    fn release_all_returns_every_active_instance() {
        let mut pool: ObjectPool<Token> = ObjectPool::new("tokens", PoolSettings::default());
        let _ = pool.acquire(0, &0).expect("acquire");
        let _ = pool.acquire(0, &0).expect("acquire");
        let _ = pool.acquire(1, &0).expect("acquire");

        assert_eq!(pool.release_all(), 3);
        assert_eq!(pool.total_active(), 0);
        assert_eq!(pool.free_count(0), 2);
        assert_eq!(pool.free_count(1), 1);
    }
}

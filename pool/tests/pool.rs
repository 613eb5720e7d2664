use lane_defence_pool::{ObjectPool, PoolError, PoolHandle, PoolSettings, Poolable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Debug)]
struct Runner {
    lane: u32,
    active: bool,
}

impl Poolable for Runner {
    type Key = u16;
    type SpawnData = u32;

    fn create(_key: u16) -> Self {
        Self {
            lane: 0,
            active: false,
        }
    }

    fn initialize(&mut self, lane: &u32) {
        self.lane = *lane;
        self.active = true;
    }

    fn reset(&mut self) {
        self.active = false;
    }
}

#[test]
fn first_acquire_from_empty_pool_creates_exactly_one_instance() {
    let mut pool: ObjectPool<Runner> = ObjectPool::new("projectile", PoolSettings::new(1, 5, true));

    let handle = pool.acquire(3, &0).expect("empty pool expands");

    assert_eq!(pool.stats(3).created, 1);
    assert_eq!(pool.stats(3).reused, 0, "the warmed instance was built for this request");
    assert_eq!(pool.active_count(3), 1);
    assert_eq!(pool.free_count(3), 0);

    assert!(pool.release(handle));
    assert_eq!(pool.active_count(3), 0);
    assert_eq!(pool.free_count(3), 1);

    let _ = pool.acquire(3, &1).expect("released instance is free");
    assert_eq!(pool.stats(3).created, 1);
    assert_eq!(pool.stats(3).reused, 1);
}

#[test]
fn capped_pool_rejects_sixth_acquire_then_reuses_released_instance() {
    let mut pool: ObjectPool<Runner> = ObjectPool::new("attacker", PoolSettings::default());
    pool.configure(0, PoolSettings::new(1, 5, true));

    let handles: Vec<PoolHandle> = (0..5)
        .map(|lane| pool.acquire(0, &lane).expect("within cap"))
        .collect();
    assert_eq!(pool.stats(0).created, 5);

    let sixth = pool.acquire(0, &5);
    assert!(matches!(sixth, Err(PoolError::Exhausted { .. })));
    assert_eq!(pool.active_count(0), 5);

    assert!(pool.release(handles[2]));
    let reused = pool.acquire(0, &7).expect("released instance is free");

    assert_eq!(reused.index(), handles[2].index());
    assert_eq!(pool.stats(0).created, 5, "no new instance was constructed");
    assert_eq!(pool.stats(0).reused, 1);
    let runner = pool.get(reused).expect("reused handle is active");
    assert!(runner.active);
    assert_eq!(runner.lane, 7);
}

#[test]
fn random_operation_sequences_keep_instances_partitioned() {
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut pool: ObjectPool<Runner> = ObjectPool::new("projectile", PoolSettings::new(2, 6, true));
    pool.configure(2, PoolSettings::new(0, 3, true));
    let mut held: Vec<(u16, PoolHandle)> = Vec::new();

    for step in 0..2_000u32 {
        let key: u16 = rng.gen_range(0..3);
        match rng.gen_range(0..10) {
            0..=4 => {
                if let Ok(handle) = pool.acquire(key, &step) {
                    held.push((key, handle));
                }
            }
            5..=7 if !held.is_empty() => {
                let index = rng.gen_range(0..held.len());
                let (_, handle) = held.swap_remove(index);
                assert!(pool.release(handle));
                assert!(!pool.release(handle), "second release must be a no-op");
            }
            8 => {
                let _ = pool.prewarm(key, rng.gen_range(0..8));
            }
            _ => {
                if rng.gen_bool(0.05) {
                    let _ = pool.release_all();
                    held.clear();
                }
            }
        }

        for key in 0..3u16 {
            let settings = pool.settings(key);
            let active = pool.active_count(key);
            let free = pool.free_count(key);
            assert!(free + active <= settings.max_size, "key {key} over cap");
            let expected = held.iter().filter(|(held_key, _)| *held_key == key).count();
            assert_eq!(active, expected, "key {key} active list drifted");
        }
    }

    for (_, handle) in &held {
        assert!(pool.get(*handle).is_some_and(|runner| runner.active));
    }
}

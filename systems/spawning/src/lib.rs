#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic wave loop responsible for emitting attacker spawn commands.

use std::{collections::VecDeque, time::Duration};

use lane_defence_core::{AttackerKind, Command, Event, LaneId, WavePlan};
use log::{debug, warn};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug)]
pub struct Config {
    plan: WavePlan,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided wave plan and seed.
    #[must_use]
    pub const fn new(plan: WavePlan, rng_seed: u64) -> Self {
        Self { plan, rng_seed }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ScheduledSpawn {
    at: Duration,
    kind: AttackerKind,
    lane: Option<LaneId>,
}

/// Pure system that walks a wave plan and emits spawn commands on schedule.
#[derive(Debug)]
pub struct Spawning {
    schedule: VecDeque<ScheduledSpawn>,
    clock: Duration,
    rng: ChaCha8Rng,
    stopped: bool,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            schedule: build_schedule(&config.plan),
            clock: Duration::ZERO,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
            stopped: false,
        }
    }

    /// Number of spawns the plan has yet to emit.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.schedule.len()
    }

    /// Reports whether the wave loop has nothing left to emit.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.stopped || self.schedule.is_empty()
    }

    /// Consumes world events and emits the spawns that fell due.
    ///
    /// Groups without a fixed lane draw one from `lanes`. A `LevelEnded`
    /// event stops the loop for good.
    pub fn handle(&mut self, events: &[Event], lanes: &[LaneId], out: &mut Vec<Command>) {
        if self.is_finished() {
            return;
        }

        let mut accumulated = Duration::ZERO;
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => accumulated = accumulated.saturating_add(*dt),
                Event::LevelEnded { .. } => {
                    debug!("wave loop stopped with {} spawns pending", self.schedule.len());
                    self.stopped = true;
                    self.schedule.clear();
                    return;
                }
                _ => {}
            }
        }

        if accumulated.is_zero() {
            return;
        }

        self.clock = self.clock.saturating_add(accumulated);
        while let Some(next) = self.schedule.front().copied() {
            if next.at > self.clock {
                break;
            }
            let _ = self.schedule.pop_front();
            let Some(lane) = next.lane.or_else(|| self.select_lane(lanes)) else {
                warn!("dropping {:?} spawn: arena has no lanes", next.kind);
                continue;
            };
            out.push(Command::SpawnAttacker {
                kind: next.kind,
                lane,
            });
        }
    }

    fn select_lane(&mut self, lanes: &[LaneId]) -> Option<LaneId> {
        if lanes.is_empty() {
            return None;
        }
        let index = self.rng.gen_range(0..lanes.len());
        Some(lanes[index])
    }
}

fn build_schedule(plan: &WavePlan) -> VecDeque<ScheduledSpawn> {
    let mut schedule = Vec::new();
    let mut wave_start = Duration::ZERO;
    for wave in plan.waves() {
        wave_start = wave_start.saturating_add(wave.start_delay);
        let mut wave_end = wave_start;
        for group in &wave.groups {
            for index in 0..group.count {
                let at = wave_start.saturating_add(group.interval.saturating_mul(index));
                wave_end = wave_end.max(at);
                schedule.push(ScheduledSpawn {
                    at,
                    kind: group.kind,
                    lane: group.lane,
                });
            }
        }
        wave_start = wave_end;
    }
    schedule.sort_by_key(|spawn| spawn.at);
    schedule.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{SpawnGroup, Wave};

    #[test]
    fn waves_start_after_previous_wave_finishes() {
        let plan = WavePlan::new(vec![
            Wave {
                start_delay: Duration::from_secs(1),
                groups: vec![group(0, 3, 500, None)],
            },
            Wave {
                start_delay: Duration::from_secs(2),
                groups: vec![group(1, 1, 0, Some(1))],
            },
        ]);

        let times: Vec<_> = build_schedule(&plan)
            .iter()
            .map(|spawn| spawn.at.as_millis())
            .collect();

        assert_eq!(times, vec![1_000, 1_500, 2_000, 4_000]);
    }

    #[test]
    fn concurrent_groups_interleave_by_time() {
        let plan = WavePlan::new(vec![Wave {
            start_delay: Duration::ZERO,
            groups: vec![group(0, 2, 1_000, None), group(1, 2, 400, None)],
        }]);

        let kinds: Vec<_> = build_schedule(&plan)
            .iter()
            .map(|spawn| spawn.kind.get())
            .collect();

        assert_eq!(kinds, vec![0, 1, 1, 0]);
    }

    fn group(kind: u16, count: u32, interval_ms: u64, lane: Option<u32>) -> SpawnGroup {
        SpawnGroup {
            kind: AttackerKind::new(kind),
            count,
            interval: Duration::from_millis(interval_ms),
            lane: lane.map(LaneId::new),
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that runs a lane defence scenario to completion.

use std::{path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use lane_defence_core::{Command, DamageKind, Event, TerminationReason};
use lane_defence_system_combat_stats::{CombatReport, CombatStats};
use lane_defence_system_defender_combat::DefenderCombat;
use lane_defence_system_spawning::{Config as SpawningConfig, Spawning};
use lane_defence_world::{self as world, query, Scenario, World};
use log::{debug, info};

const DEFAULT_SCENARIO: &str = include_str!("../assets/default_scenario.toml");

/// Command-line arguments accepted by the lane defence runner.
#[derive(Debug, Parser)]
#[command(author, version, about = "Runs a lane defence scenario headlessly")]
struct CliArgs {
    /// Scenario TOML file; the bundled scenario runs when omitted.
    #[arg(long, value_name = "PATH")]
    scenario: Option<PathBuf>,
    /// Number of simulation ticks to run.
    #[arg(long, default_value_t = 1200)]
    ticks: u32,
    /// Simulated milliseconds per tick.
    #[arg(long = "tick-ms", default_value_t = 50)]
    tick_ms: u64,
    /// Overrides the scenario's spawning seed.
    #[arg(long)]
    seed: Option<u64>,
}

/// Entry point for the lane defence command-line interface.
fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init()
        .context("failed to install logger")?;

    let args = CliArgs::parse();
    ensure!(args.tick_ms > 0, "--tick-ms must be positive");

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Scenario::from_toml_str(DEFAULT_SCENARIO)
            .context("bundled scenario is invalid")?,
    };
    let seed = args.seed.unwrap_or_else(|| scenario.seed());

    let mut world = World::from_scenario(&scenario);
    println!("{}", query::welcome_banner(&world));

    let report = simulate(
        &mut world,
        &scenario,
        seed,
        args.ticks,
        Duration::from_millis(args.tick_ms),
    );
    print_report(&report, query::objective_damage(&world));
    Ok(())
}

fn simulate(
    world: &mut World,
    scenario: &Scenario,
    seed: u64,
    ticks: u32,
    dt: Duration,
) -> CombatReport {
    let mut spawning = Spawning::new(SpawningConfig::new(scenario.waves().clone(), seed));
    let mut defender_combat = DefenderCombat::new();
    let mut stats = CombatStats::new();
    let lanes = query::lanes(world);

    let mut events = Vec::new();
    for placement in scenario.placements() {
        world::apply(world, placement.command(), &mut events);
    }
    stats.handle(&events);

    let mut commands = Vec::new();
    for tick in 0..ticks {
        events.clear();
        world::apply(world, Command::Tick { dt }, &mut events);

        commands.clear();
        spawning.handle(&events, &lanes, &mut commands);
        defender_combat.handle(
            &query::defender_view(world),
            query::registry(world),
            &mut commands,
        );
        for command in commands.drain(..) {
            world::apply(world, command, &mut events);
        }
        stats.handle(&events);

        if spawning.is_finished() && query::attacker_view(world).is_empty() {
            info!("battlefield clear after {} ticks", tick + 1);
            break;
        }
    }

    events.clear();
    world::apply(world, Command::EndLevel, &mut events);
    for event in &events {
        if let Event::LevelEnded {
            attackers_released,
            projectiles_released,
        } = event
        {
            debug!(
                "level ended: {attackers_released} attackers and {projectiles_released} projectiles released"
            );
        }
    }
    stats.handle(&events);

    stats.report().clone()
}

fn print_report(report: &CombatReport, objective_damage: u64) {
    println!(
        "simulated {:.1}s over {} ticks",
        report.elapsed().as_secs_f32(),
        report.ticks()
    );
    println!(
        "attackers: {} spawned, {} killed, {} leaked",
        report.spawned(),
        report.killed(),
        report.leaked()
    );
    println!(
        "defenders: {} placed, {} destroyed",
        report.defenders_placed(),
        report.defenders_destroyed()
    );
    println!(
        "projectiles: {} fired, {} impacts, {} expired, {} landed, {} hit terrain, {} bounces",
        report.projectiles_fired(),
        report.terminated(TerminationReason::Impact),
        report.terminated(TerminationReason::Expired),
        report.terminated(TerminationReason::Landed),
        report.terminated(TerminationReason::Terrain),
        report.bounces()
    );
    for (kind, amount) in report.damage_by_kind() {
        println!("damage {}: {amount:.1}", damage_label(kind));
    }
    println!(
        "armor: {:.1} absorbed, {} broken",
        report.absorbed(),
        report.armor_breaks()
    );
    println!(
        "rewards: {}, objective damage: {objective_damage}",
        report.rewards()
    );
}

fn damage_label(kind: DamageKind) -> &'static str {
    match kind {
        DamageKind::Physical => "physical",
        DamageKind::Fire => "fire",
        DamageKind::Frost => "frost",
        DamageKind::Poison => "poison",
        DamageKind::Lightning => "lightning",
        DamageKind::Explosive => "explosive",
    }
}

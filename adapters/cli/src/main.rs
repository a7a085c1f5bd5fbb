#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line adapter that runs a scripted panel battle.

mod scenario;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use panel_battle_core::{Command, Event, Health};
use panel_battle_system_battle_loop::{BattleLoop, Outcome};
use panel_battle_world::query;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::scenario::{Scenario, ScriptAction};

const DEFAULT_FILTER: &str = "panel_battle=info";

#[derive(Debug, Parser)]
#[command(name = "panel-battle", about = "Runs a scripted panel battle without rendering")]
struct CliArgs {
    /// Scenario file describing the grid, combatants and script.
    #[arg(long, default_value = "adapters/cli/scenarios/duel.toml")]
    scenario: PathBuf,
    /// Overrides the number of ticks to simulate.
    #[arg(long)]
    ticks: Option<u64>,
    /// Overrides the random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Prints every event broadcast by the world.
    #[arg(long)]
    events: bool,
}

/// Entry point for the panel battle command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        )
        .init();

    let args = CliArgs::parse();
    let mut scenario = Scenario::load(&args.scenario)?;
    if let Some(seed) = args.seed {
        scenario.seed = seed;
    }
    let ticks = args.ticks.unwrap_or(scenario.ticks);

    let outcome = run(&scenario, ticks, args.events)?;
    println!("{outcome:?}");
    Ok(())
}

fn run(scenario: &Scenario, ticks: u64, print_events: bool) -> Result<Outcome> {
    let definitions = scenario.definitions()?;
    let layout = scenario.layout(&definitions)?;
    let mut battle = BattleLoop::new(scenario.config(), definitions, &layout)
        .context("failed to build the battle")?;

    let mut events = Vec::new();
    let navi = battle
        .spawn_navi(scenario.navi.cell, Health::new(scenario.navi.health), &mut events)
        .context("failed to place the navi")?;
    for spawn in &scenario.spawns {
        let _ = battle
            .spawn_enemy(&spawn.enemy, spawn.cell, &mut events)
            .with_context(|| format!("failed to spawn `{}`", spawn.enemy))?;
    }
    report(&events, print_events);

    let mut outcome = battle.outcome();
    for tick in 0..ticks {
        events.clear();
        for entry in scenario.script.iter().filter(|entry| entry.tick == tick) {
            match entry.action {
                ScriptAction::Move { cell } => {
                    battle.submit(Command::MoveEntity { entity: navi, to: cell }, &mut events)
                }
                ScriptAction::Pause => battle.set_paused(true, &mut events),
                ScriptAction::Resume => battle.set_paused(false, &mut events),
            }
        }
        battle.step(&mut events);
        report(&events, print_events);

        outcome = battle.outcome();
        if outcome != Outcome::InProgress {
            break;
        }
    }

    let health = query::entity(battle.world(), navi).map_or(0, |navi| navi.health.get());
    info!(?outcome, navi_health = health, tick = query::tick_index(battle.world()), "battle finished");
    Ok(outcome)
}

fn report(events: &[Event], print_events: bool) {
    for event in events {
        if print_events {
            println!("{event:?}");
        }
        match event {
            Event::CellFlashRequested { cell, material, .. } => {
                info!(?cell, material = material.as_str(), "flash requested");
            }
            Event::AnimationRequested { entity, action } => {
                info!(entity = entity.get(), ?action, "animation requested");
            }
            Event::EntityDestroyed { entity, cell } => {
                info!(entity = entity.get(), ?cell, "entity destroyed");
            }
            Event::MoveRejected { entity, to, reason } => {
                warn!(entity = entity.get(), ?to, ?reason, "move rejected");
            }
            _ => {}
        }
    }
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Outpost Defence session.

mod report;
mod scenario;

use std::{path::PathBuf, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use outpost_defence_simulation::Simulation;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::{report::Summary, scenario::ScenarioFile};

/// Command-line arguments for the headless runner.
#[derive(Parser, Debug)]
#[command(
    name = "outpost-defence",
    about = "Runs an Outpost Defence session without a display"
)]
struct Args {
    /// Scenario file to load; the stock scenario runs when omitted.
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Number of ticks to simulate, overriding the scenario file.
    #[arg(long)]
    ticks: Option<u32>,

    /// Length of one tick in milliseconds, overriding the scenario file.
    #[arg(long)]
    tick_ms: Option<u64>,
}

/// Entry point for the Outpost Defence command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let file = match &args.scenario {
        Some(path) => ScenarioFile::load(path)?,
        None => ScenarioFile::default(),
    };
    let ticks = args.ticks.unwrap_or(file.run.ticks);
    let dt = args
        .tick_ms
        .map_or_else(|| file.run.tick(), Duration::from_millis);

    let mut simulation =
        Simulation::new(file.scenario).context("failed to set up the session")?;
    println!("{}", simulation.welcome_banner());

    for planned in &file.build {
        if let Err(error) = simulation.place_tower(planned.kind, planned.cell()) {
            warn!(kind = ?planned.kind, cell = ?planned.cell(), %error, "opening tower skipped");
        }
    }

    let mut summary = Summary::default();
    let mut elapsed: u32 = 0;
    for _ in 0..ticks {
        simulation.tick(dt, false).context("simulation tick failed")?;
        for event in simulation.drain_events() {
            summary.record(&event);
        }
        elapsed += 1;
        if simulation.is_defeated() {
            break;
        }
    }

    let wave = simulation.wave_state();
    info!(
        ticks = elapsed,
        wave = wave.wave,
        phase = ?wave.phase,
        balance = simulation.balance(),
        integrity = simulation.base_integrity(),
        "run finished"
    );
    println!("{summary}");
    Ok(())
}

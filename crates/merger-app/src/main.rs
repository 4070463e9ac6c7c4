use std::path::PathBuf;
use std::thread;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use merger_app::autoplay::{run_headless, Autopilot, RunReport};
use merger_app::game_loop::tick_duration;
use merger_app::state::AppState;
use merger_core::config::GameConfig;
use merger_core::data::{load_waves, BuiltinFixture, ComposedSource, JsonFileSource, WaveSource};
use merger_core::state::GameStateSnapshot;
use merger_sim::SimConfig;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless data-migration defense runner", long_about = None)]
struct Args {
    /// Game config JSON (defaults to $MERGER_CONFIG_PATH, then built-in values)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Wave data JSON file (`{ "waves": [...] }`)
    #[arg(long, conflicts_with = "composed")]
    waves: Option<PathBuf>,

    /// Generate this many synthetic records instead of loading a file
    #[arg(long)]
    composed: Option<usize>,

    /// Number of waves for generated records
    #[arg(long, default_value_t = 5)]
    wave_count: usize,

    /// Seed for generated records
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Stop after this many ticks even if the game is still running
    #[arg(long, default_value_t = 60 * 60 * 15)]
    max_ticks: u64,

    /// Run on the game loop thread at wall-clock speed
    #[arg(long)]
    realtime: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let game = match &args.config {
        Some(path) => GameConfig::from_path(path)
            .with_context(|| format!("Failed to load config at {}", path.display()))?,
        None => GameConfig::load_from_env(),
    };

    let source: Box<dyn WaveSource> = match (&args.waves, args.composed) {
        (_, Some(record_count)) => Box::new(ComposedSource {
            seed: args.seed,
            record_count,
            wave_count: args.wave_count,
            lane_count: game.lane_count,
        }),
        (Some(path), None) => Box::new(JsonFileSource::new(path)),
        (None, None) => Box::new(BuiltinFixture),
    };
    let waves = load_waves(source.as_ref());
    info!(
        target: "merger::app",
        source = %source.label(),
        waves = waves.len(),
        records = waves.iter().map(|w| w.rows.len()).sum::<usize>(),
        "waves.loaded"
    );

    let config = SimConfig { game, waves };
    let snapshot = if args.realtime {
        run_realtime(config, args.max_ticks)?
    } else {
        let report = run_headless(config, args.max_ticks);
        log_report(&report);
        report.snapshot
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }
    Ok(())
}

fn log_report(report: &RunReport) {
    let snap = &report.snapshot;
    info!(
        target: "merger::app",
        ticks = report.ticks,
        finished = report.finished,
        phase = ?snap.phase,
        readiness = snap.readiness,
        core_hp = snap.core_hp,
        funds = snap.funds,
        issues_fixed = snap.issues_fixed,
        flags_resolved = report.flags_resolved,
        "run.complete"
    );
}

/// Drive the threaded game loop with the autopilot, polling once per tick.
fn run_realtime(config: SimConfig, max_ticks: u64) -> Result<GameStateSnapshot> {
    let game = config.game.clone();
    let tick = tick_duration(game.tick_rate);
    let state = AppState::new();
    state.start(config)?;

    let mut pilot = Autopilot::new();
    let mut latest = None;
    for _ in 0..max_ticks {
        thread::sleep(tick);
        let Some(snap) = state.snapshot()? else {
            continue;
        };
        // Repeats that race the loop are rejected by the engine.
        for command in pilot.decide(&game, &snap) {
            state.send(command)?;
        }
        let over = snap.phase.is_over();
        latest = Some(snap);
        if over {
            break;
        }
    }
    state.shutdown()?;

    let snap = latest.context("game loop never published a snapshot")?;
    info!(
        target: "merger::app",
        phase = ?snap.phase,
        readiness = snap.readiness,
        core_hp = snap.core_hp,
        issues_fixed = snap.issues_fixed,
        "run.complete"
    );
    Ok(snap)
}

//! Scripted player for headless runs.
//!
//! The autopilot looks only at the last snapshot, so a run is a pure
//! function of the config and wave data.

use serde::Serialize;

use merger_core::commands::PlayerCommand;
use merger_core::config::GameConfig;
use merger_core::enums::{GamePhase, TowerKind, WavePhase};
use merger_core::events::GameEvent;
use merger_core::state::GameStateSnapshot;
use merger_sim::{SimConfig, SimulationEngine};

/// Horizontal position of the opening towers.
const BUILD_X: f32 = 200.0;
/// Vertical offset of the opening towers from their lane.
const BUILD_OFFSET_Y: f32 = 40.0;

#[derive(Debug, Default)]
pub struct Autopilot {
    built: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands to queue before the next tick.
    pub fn decide(&mut self, config: &GameConfig, snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
        match snap.phase {
            GamePhase::MainMenu => vec![PlayerCommand::StartGame],
            GamePhase::Active if !self.built => {
                self.built = true;
                opening_build(config)
            }
            GamePhase::Active => between_waves(snap),
            _ => Vec::new(),
        }
    }
}

/// One tower per lane, cycling through the variants, just above the lane.
pub fn opening_build(config: &GameConfig) -> Vec<PlayerCommand> {
    (0..config.lane_count)
        .flat_map(|lane| {
            let kind = TowerKind::ALL[lane % TowerKind::ALL.len()];
            let y = config.lane_start_y + lane as f32 * config.lane_spacing - BUILD_OFFSET_Y;
            [
                PlayerCommand::SelectTower { kind },
                PlayerCommand::PlaceTower { x: BUILD_X, y },
            ]
        })
        .collect()
}

/// Upgrade what we can afford, then start the next wave.
fn between_waves(snap: &GameStateSnapshot) -> Vec<PlayerCommand> {
    let idle = matches!(snap.wave_phase, WavePhase::Idle | WavePhase::Complete);
    if !idle || snap.current_wave >= snap.total_waves {
        return Vec::new();
    }

    let mut funds = snap.funds;
    let mut commands: Vec<PlayerCommand> = snap
        .towers
        .iter()
        .filter_map(|tower| {
            let cost = tower.upgrade_cost?;
            (cost <= funds).then(|| {
                funds -= cost;
                PlayerCommand::UpgradeTower {
                    x: tower.position.x(),
                    y: tower.position.y(),
                }
            })
        })
        .collect();
    commands.push(PlayerCommand::StartWave);
    commands
}

/// Outcome of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub ticks: u64,
    pub finished: bool,
    pub flags_resolved: usize,
    pub snapshot: GameStateSnapshot,
}

/// Play a whole game with the autopilot, up to `max_ticks`.
pub fn run_headless(config: SimConfig, max_ticks: u64) -> RunReport {
    let game = config.game.clone();
    let mut engine = SimulationEngine::new(config);
    let mut pilot = Autopilot::new();
    let mut snapshot = engine.snapshot();
    let mut flags_resolved = 0;
    let mut ticks = 0;

    while ticks < max_ticks && !snapshot.phase.is_over() {
        engine.queue_commands(pilot.decide(&game, &snapshot));
        snapshot = engine.tick();
        ticks += 1;

        for event in &snapshot.events {
            match event {
                GameEvent::FlagResolved { .. } => flags_resolved += 1,
                GameEvent::WaveStarted { .. }
                | GameEvent::WaveCompleted { .. }
                | GameEvent::GameOver { .. } => {
                    tracing::info!(target: "merger::app", tick = ticks, "{}", event.message());
                }
                GameEvent::CommandRejected { reason } => {
                    tracing::warn!(target: "merger::app", tick = ticks, reason = ?reason, "autopilot.rejected");
                }
                _ => {}
            }
        }
    }

    RunReport {
        ticks,
        finished: snapshot.phase.is_over(),
        flags_resolved,
        snapshot,
    }
}

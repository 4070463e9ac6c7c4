//! Wave spawning system: drives the sequencer and spawns dequeued rows.

use glam::Vec2;
use hecs::World;

use merger_core::components::Enemy;
use merger_core::config::GameConfig;
use merger_core::events::GameEvent;

use crate::wave::{lane_for_id, WaveSequencer};
use crate::world_setup;

/// Advance the sequencer by `dt` and spawn whatever it releases.
pub fn run(
    world: &mut World,
    config: &GameConfig,
    sequencer: &mut WaveSequencer,
    lane_paths: &[Vec<Vec2>],
    dt: f64,
    next_serial: &mut u64,
    events: &mut Vec<GameEvent>,
) {
    let live = world.query::<&Enemy>().iter().count();
    let tick = sequencer.advance(dt, live);

    if let Some(row) = tick.spawn {
        let lane = lane_for_id(&row.id, lane_paths.len());
        let path = lane_paths.get(lane).cloned().unwrap_or_default();
        world_setup::spawn_enemy(world, config, &row, lane, path, *next_serial);
        *next_serial += 1;
        tracing::debug!(
            target: "merger::sim",
            id = %row.id,
            lane,
            severity = row.severity,
            "enemy.spawned"
        );
        events.push(GameEvent::EnemySpawned { id: row.id, lane });
    }

    if let Some(wave) = tick.completed {
        tracing::info!(target: "merger::sim", wave = wave + 1, "wave.completed");
        events.push(GameEvent::WaveCompleted { wave });
    }
}

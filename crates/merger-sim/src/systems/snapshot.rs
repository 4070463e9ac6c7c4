//! Snapshot system: queries the ECS world and builds a complete GameStateSnapshot.
//!
//! This system is read-only. It never modifies the world.

use hecs::World;

use merger_core::components::*;
use merger_core::enums::*;
use merger_core::events::GameEvent;
use merger_core::state::*;
use merger_core::types::{Position, SimTime};

use crate::economy::Economy;
use crate::wave::WaveSequencer;

/// Build a complete GameStateSnapshot from the current world state.
#[allow(clippy::too_many_arguments)]
pub fn build_snapshot(
    world: &World,
    time: &SimTime,
    phase: GamePhase,
    economy: &Economy,
    sequencer: &WaveSequencer,
    waves_started: usize,
    selected_tower: TowerKind,
    events: Vec<GameEvent>,
) -> GameStateSnapshot {
    let enemies = build_enemies(world);
    GameStateSnapshot {
        time: *time,
        phase,
        funds: economy.funds,
        core_hp: economy.core_hp,
        max_core_hp: economy.max_core_hp,
        readiness: economy.readiness,
        current_wave: waves_started,
        total_waves: sequencer.total_waves(),
        wave_phase: sequencer.phase(),
        enemies_remaining: enemies.len(),
        enemies_arrived: economy.enemies_arrived,
        issues_fixed: economy.issues_fixed,
        selected_tower,
        enemies,
        towers: build_towers(world),
        events,
    }
}

/// Build EnemyView list, sorted by spawn order for determinism.
fn build_enemies(world: &World) -> Vec<EnemyView> {
    let mut enemies: Vec<(u64, EnemyView)> = world
        .query::<(&Enemy, &IssueFlags, &Health, &Position, &FlashTimer)>()
        .iter()
        .map(|(_, (enemy, flags, health, position, flash))| {
            (
                enemy.serial,
                EnemyView {
                    id: enemy.id.clone(),
                    category: enemy.category,
                    summary: enemy.summary.clone(),
                    lane: enemy.lane,
                    position: *position,
                    flags: flags.to_vec(),
                    severity: enemy.severity,
                    hp: health.current,
                    max_hp: health.max,
                    resolved: flags.is_resolved(),
                    flashing: flash.is_active(),
                },
            )
        })
        .collect();
    enemies.sort_by_key(|(serial, _)| *serial);
    enemies.into_iter().map(|(_, view)| view).collect()
}

/// Build TowerView list, sorted by placement order.
fn build_towers(world: &World) -> Vec<TowerView> {
    let mut towers: Vec<(u64, TowerView)> = world
        .query::<(&Tower, &Position)>()
        .iter()
        .map(|(_, (tower, position))| {
            (
                tower.serial,
                TowerView {
                    kind: tower.kind,
                    position: *position,
                    range: tower.range,
                    fire_rate: tower.fire_rate,
                    level: tower.level,
                    upgrade_cost: tower.can_upgrade().then(|| tower.upgrade_cost()),
                    sell_value: tower.sell_value(),
                },
            )
        })
        .collect();
    towers.sort_by_key(|(serial, _)| *serial);
    towers.into_iter().map(|(_, view)| view).collect()
}

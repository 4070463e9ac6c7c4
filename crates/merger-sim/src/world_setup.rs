//! Entity spawn factories.
//!
//! Creates enemy and tower entities with their component bundles.

use glam::Vec2;
use hecs::{Entity, World};

use merger_core::components::*;
use merger_core::config::GameConfig;
use merger_core::constants::HP_PER_SEVERITY;
use merger_core::data::RowData;
use merger_core::enums::TowerKind;
use merger_core::types::Position;

use crate::towers;

/// Spawn a record at the start of its lane path.
pub fn spawn_enemy(
    world: &mut World,
    config: &GameConfig,
    row: &RowData,
    lane: usize,
    waypoints: Vec<Vec2>,
    serial: u64,
) -> Entity {
    let start = waypoints.first().copied().unwrap_or(Vec2::ZERO);
    let max_hp = row.severity * HP_PER_SEVERITY;

    world.spawn((
        Enemy {
            id: row.id.clone(),
            category: row.category,
            summary: row.summary.clone(),
            severity: row.severity,
            lane,
            serial,
        },
        IssueFlags::new(row.flags.iter().cloned()),
        Health::full(max_hp),
        Position(start),
        PathFollower {
            waypoints,
            next_index: 1,
            speed: config.enemy_speed,
        },
        FlashTimer::default(),
    ))
}

/// Spawn a level-1 tower of `kind` at `position`.
pub fn spawn_tower(
    world: &mut World,
    config: &GameConfig,
    kind: TowerKind,
    position: Position,
    serial: u64,
) -> Entity {
    world.spawn((
        towers::build_tower(kind, config.max_tower_level, serial),
        position,
    ))
}

//! Game state snapshot: the complete visible state handed to the UI each tick.

use serde::{Deserialize, Serialize};

use crate::enums::*;
use crate::events::GameEvent;
use crate::types::{Position, SimTime};

/// Complete game state broadcast to the UI after each tick.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub time: SimTime,
    pub phase: GamePhase,
    pub funds: u32,
    pub core_hp: u32,
    pub max_core_hp: u32,
    /// 0.0 - 100.0, never decreases during a game.
    pub readiness: f32,
    /// Number of waves started so far.
    pub current_wave: usize,
    pub total_waves: usize,
    pub wave_phase: WavePhase,
    /// Live enemies.
    pub enemies_remaining: usize,
    pub enemies_arrived: u32,
    pub issues_fixed: u32,
    pub selected_tower: TowerKind,
    pub enemies: Vec<EnemyView>,
    pub towers: Vec<TowerView>,
    /// Events raised since the previous snapshot.
    pub events: Vec<GameEvent>,
}

/// A live record on the playfield.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnemyView {
    pub id: String,
    pub category: RoomCategory,
    pub summary: String,
    pub lane: usize,
    pub position: Position,
    /// Remaining flags in their original order.
    pub flags: Vec<String>,
    pub severity: u32,
    pub hp: u32,
    pub max_hp: u32,
    pub resolved: bool,
    /// A flag was removed within the last flash window.
    pub flashing: bool,
}

/// A placed tower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TowerView {
    pub kind: TowerKind,
    pub position: Position,
    pub range: f32,
    pub fire_rate: f32,
    pub level: u32,
    /// `None` at max level.
    pub upgrade_cost: Option<u32>,
    pub sell_value: u32,
}

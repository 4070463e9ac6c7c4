//! Player commands sent from the UI to the simulation.
//!
//! Commands are queued and processed at the next tick boundary.

use serde::{Deserialize, Serialize};

use crate::enums::*;

/// All possible player actions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PlayerCommand {
    // --- Waves ---
    /// Start the next wave, if the sequencer is idle and waves remain.
    StartWave,

    // --- Towers ---
    /// Choose the variant used by subsequent placements.
    SelectTower { kind: TowerKind },
    /// Place the selected variant at a screen position.
    PlaceTower { x: f32, y: f32 },
    /// Remove the tower nearest a screen position (flat refund).
    RemoveTower { x: f32, y: f32 },
    /// Upgrade the tower nearest a screen position.
    UpgradeTower { x: f32, y: f32 },

    // --- Simulation control ---
    /// Reset all state and begin a new game.
    StartGame,
    /// Return to the main menu after a game ends.
    ReturnToMenu,
    /// Pause the simulation.
    Pause,
    /// Resume the simulation.
    Resume,
}

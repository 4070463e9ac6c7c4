//! Enumeration types used throughout the simulation.

use serde::{Deserialize, Serialize};

/// Source system ("room") a record was migrated from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCategory {
    #[default]
    Customers,
    Accounts,
    Fixed,
    Loans,
}

/// Tower variant. Each one targets a single primary issue flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TowerKind {
    /// Merges duplicate customer records.
    #[default]
    DuplicateDetector,
    /// Validates document expiry and maturity dates.
    ExpiryScanner,
    /// Checks dormant and locked balances.
    BalanceChecker,
    /// Finds overdue loans and interest arrears.
    ArrearsRadar,
}

/// Top-level game phase.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    #[default]
    MainMenu,
    /// Simulation running.
    Active,
    /// All timers frozen.
    Paused,
    /// Readiness reached 100.
    Victory,
    /// Core health depleted, or waves exhausted short of full readiness.
    Defeat,
}

/// Wave sequencer state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WavePhase {
    /// No wave started yet.
    #[default]
    Idle,
    /// Rows remain to be spawned.
    Spawning,
    /// All rows spawned, waiting for live enemies to clear.
    Draining,
    /// Wave finished; ready for the next one.
    Complete,
}

/// Why a player command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    InsufficientFunds,
    /// Tile is a lane, the core, or already holds a tower.
    Blocked,
    OutOfBounds,
    /// No tower within removal radius.
    NoTower,
    MaxLevel,
    /// A wave is still spawning or draining.
    WaveInProgress,
    /// No waves left to start.
    NoMoreWaves,
    /// Command not valid in the current game phase.
    WrongPhase,
}

impl TowerKind {
    /// All variants in menu order.
    pub const ALL: [TowerKind; 4] = [
        TowerKind::DuplicateDetector,
        TowerKind::ExpiryScanner,
        TowerKind::BalanceChecker,
        TowerKind::ArrearsRadar,
    ];

    pub fn display_name(&self) -> &'static str {
        match self {
            TowerKind::DuplicateDetector => "Duplicate Detector",
            TowerKind::ExpiryScanner => "Expiry Scanner",
            TowerKind::BalanceChecker => "Balance Checker",
            TowerKind::ArrearsRadar => "Arrears Radar",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            TowerKind::DuplicateDetector => {
                "Advanced algorithm to detect and merge duplicate customer records"
            }
            TowerKind::ExpiryScanner => {
                "Scans documents for expiration dates and validates legal compliance"
            }
            TowerKind::BalanceChecker => {
                "Validates account balances and checks for dormant high-value accounts"
            }
            TowerKind::ArrearsRadar => {
                "Advanced radar system to detect overdue loans and interest arrears"
            }
        }
    }
}

impl GamePhase {
    /// Victory or Defeat.
    pub fn is_over(&self) -> bool {
        matches!(self, GamePhase::Victory | GamePhase::Defeat)
    }
}

impl WavePhase {
    /// Spawning or Draining.
    pub fn is_running(&self) -> bool {
        matches!(self, WavePhase::Spawning | WavePhase::Draining)
    }
}

//! Events emitted by the simulation for UI feedback.

use serde::{Deserialize, Serialize};

use crate::enums::*;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    WaveStarted {
        /// Zero-based wave index.
        wave: usize,
    },
    WaveCompleted {
        wave: usize,
    },
    EnemySpawned {
        id: String,
        lane: usize,
    },
    /// A tower shot removed a flag.
    FlagResolved {
        id: String,
        flag: String,
        tower: TowerKind,
    },
    /// The record's last flag was removed.
    EnemyCleaned {
        id: String,
    },
    /// A record reached the core. Clean records raise readiness,
    /// dirty ones damage the core.
    EnemyArrived {
        id: String,
        clean: bool,
        readiness_gain: f32,
        core_damage: u32,
    },
    TowerPlaced {
        kind: TowerKind,
        x: f32,
        y: f32,
        cost: u32,
    },
    TowerRemoved {
        kind: TowerKind,
        refund: u32,
    },
    TowerUpgraded {
        kind: TowerKind,
        level: u32,
        cost: u32,
    },
    CommandRejected {
        reason: RejectReason,
    },
    GameOver {
        won: bool,
        readiness: f32,
        issues_fixed: u32,
    },
}

impl GameEvent {
    /// One-line status message for the UI banner.
    pub fn message(&self) -> String {
        match self {
            GameEvent::WaveStarted { wave } => format!("Starting wave {}", wave + 1),
            GameEvent::WaveCompleted { wave } => format!("Wave {} completed", wave + 1),
            GameEvent::EnemySpawned { id, lane } => format!("Spawned {id} in lane {lane}"),
            GameEvent::FlagResolved { id, flag, tower } => {
                format!("{} fixed {flag} on {id}", tower.display_name())
            }
            GameEvent::EnemyCleaned { id } => format!("{id} is clean"),
            GameEvent::EnemyArrived {
                clean: true,
                readiness_gain,
                ..
            } => format!("Clean data processed! +{}% readiness", *readiness_gain as i32),
            GameEvent::EnemyArrived { core_damage, .. } => {
                format!("Dirty data reached core! -{core_damage} HP")
            }
            GameEvent::TowerPlaced { kind, .. } => format!("Placed {}", kind.display_name()),
            GameEvent::TowerRemoved { kind, refund } => {
                format!("Removed {} (+${refund})", kind.display_name())
            }
            GameEvent::TowerUpgraded { kind, level, .. } => {
                format!("{} upgraded to level {level}", kind.display_name())
            }
            GameEvent::CommandRejected { reason } => format!("Rejected: {reason:?}"),
            GameEvent::GameOver { won: true, .. } => "Migration completed successfully!".into(),
            GameEvent::GameOver { won: false, .. } => {
                "Migration failed - Core systems compromised!".into()
            }
        }
    }
}

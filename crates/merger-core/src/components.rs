//! ECS components for hecs entities.
//!
//! Components are plain data with small accessors. Game logic that spans
//! several components lives in systems, not here.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::enums::*;

/// Identity of a spawned record (enemy).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    /// Record identifier from the data source.
    pub id: String,
    pub category: RoomCategory,
    pub summary: String,
    /// Positive severity. Drives health, speed, and arrival outcome.
    pub severity: u32,
    /// Lane the record was bound to at spawn.
    pub lane: usize,
    /// Monotonic spawn order; the stable iteration order for targeting.
    pub serial: u64,
}

/// Ordered set of unresolved issue flags. Insertion order is kept,
/// duplicates are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>")]
pub struct IssueFlags(Vec<String>);

/// Health derived from severity. Clamped to `[0, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub current: u32,
    pub max: u32,
}

/// Progress along a fixed lane path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathFollower {
    pub waypoints: Vec<Vec2>,
    /// Index of the waypoint currently being approached.
    pub next_index: usize,
    /// Base speed before flag/severity penalties (pixels/second).
    pub speed: f32,
}

/// "Just resolved" highlight. Render-only, but observable for tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FlashTimer {
    pub remaining_secs: f64,
}

/// A placed tower.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tower {
    pub kind: TowerKind,
    /// 1..=max_level.
    pub level: u32,
    pub max_level: u32,
    /// Targeting radius in pixels.
    pub range: f32,
    /// Shots per second.
    pub fire_rate: f32,
    /// Base placement cost.
    pub cost: u32,
    /// Sim time of the last shot. `None` = ready.
    pub last_fire_secs: Option<f64>,
    /// Monotonic placement order; towers update in this order.
    pub serial: u64,
}

impl IssueFlags {
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = IssueFlags::default();
        for flag in flags {
            let flag = flag.into();
            if !set.contains(&flag) {
                set.0.push(flag);
            }
        }
        set
    }

    pub fn contains(&self, flag: &str) -> bool {
        self.0.iter().any(|f| f == flag)
    }

    /// Remove `flag`. Returns whether it was present.
    pub fn remove(&mut self, flag: &str) -> bool {
        match self.0.iter().position(|f| f == flag) {
            Some(idx) => {
                self.0.remove(idx);
                true
            }
            None => false,
        }
    }

    /// A record is resolved once it carries no flags.
    pub fn is_resolved(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.0.clone()
    }
}

impl From<Vec<String>> for IssueFlags {
    fn from(flags: Vec<String>) -> Self {
        IssueFlags::new(flags)
    }
}

impl Health {
    pub fn full(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Apply damage, clamping at zero. Returns the damage actually taken.
    ///
    /// No tower deals damage; health only feeds the health bar.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let taken = amount.min(self.current);
        self.current -= taken;
        taken
    }
}

impl PathFollower {
    /// Current target waypoint, if the path is not finished.
    pub fn target(&self) -> Option<Vec2> {
        self.waypoints.get(self.next_index).copied()
    }

    /// True once every waypoint has been reached.
    pub fn has_arrived(&self) -> bool {
        self.next_index >= self.waypoints.len()
    }
}

impl FlashTimer {
    pub fn start(&mut self, duration_secs: f64) {
        self.remaining_secs = duration_secs;
    }

    pub fn is_active(&self) -> bool {
        self.remaining_secs > 0.0
    }

    pub fn decay(&mut self, dt: f64) {
        self.remaining_secs = (self.remaining_secs - dt).max(0.0);
    }
}

impl Tower {
    /// Price of the next upgrade: base cost times current level.
    pub fn upgrade_cost(&self) -> u32 {
        self.cost * self.level
    }

    /// Computed resale value. Removal refunds a flat amount instead.
    pub fn sell_value(&self) -> u32 {
        self.cost * self.level / 2
    }

    pub fn can_upgrade(&self) -> bool {
        self.level < self.max_level
    }

    /// Whether enough sim time has passed since the last shot.
    pub fn is_ready(&self, now_secs: f64) -> bool {
        match self.last_fire_secs {
            None => true,
            Some(last) => now_secs - last >= 1.0 / self.fire_rate as f64,
        }
    }
}

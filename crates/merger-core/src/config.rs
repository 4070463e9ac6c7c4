//! Immutable game configuration.
//!
//! A `GameConfig` is built once (defaults, or defaults overlaid by a JSON
//! file) and handed to the engine. Nothing reads module-level tunables at
//! runtime; everything flows through this struct.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::*;
use crate::types::Position;

/// Environment variable naming an optional JSON override file.
pub const CONFIG_PATH_ENV: &str = "MERGER_CONFIG_PATH";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub tick_rate: u32,
    pub screen_width: f32,
    pub game_area_height: f32,
    pub tile_size: f32,
    pub lane_count: usize,
    pub lane_start_y: f32,
    pub lane_spacing: f32,
    pub starting_funds: u32,
    pub starting_core_hp: u32,
    pub spawn_interval_secs: f64,
    pub removal_radius: f32,
    pub removal_refund: u32,
    pub enemy_speed: f32,
    pub waypoint_threshold: f32,
    pub flash_duration_secs: f64,
    pub max_tower_level: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            tick_rate: TICK_RATE,
            screen_width: SCREEN_WIDTH,
            game_area_height: GAME_AREA_HEIGHT,
            tile_size: TILE_SIZE,
            lane_count: LANE_COUNT,
            lane_start_y: LANE_START_Y,
            lane_spacing: LANE_SPACING,
            starting_funds: STARTING_FUNDS,
            starting_core_hp: STARTING_CORE_HP,
            spawn_interval_secs: SPAWN_INTERVAL_SECS,
            removal_radius: REMOVAL_RADIUS,
            removal_refund: REMOVAL_REFUND,
            enemy_speed: ENEMY_SPEED,
            waypoint_threshold: WAYPOINT_THRESHOLD,
            flash_duration_secs: FLASH_DURATION_SECS,
            max_tower_level: MAX_TOWER_LEVEL,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse game config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read game config from {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid game config: {0}")]
    Invalid(&'static str),
}

impl GameConfig {
    /// Seconds per tick.
    pub fn dt(&self) -> f64 {
        1.0 / self.tick_rate as f64
    }

    /// Waypoints for every lane, left (off-screen) to right (past the core).
    pub fn lane_paths(&self) -> Vec<Vec<Vec2>> {
        (0..self.lane_count).map(|i| self.lane_path(i)).collect()
    }

    /// Waypoints for a single lane.
    pub fn lane_path(&self, lane: usize) -> Vec<Vec2> {
        let y = self.lane_start_y + lane as f32 * self.lane_spacing;
        let w = self.screen_width;
        vec![
            Vec2::new(-50.0, y),
            Vec2::new(100.0, y),
            Vec2::new(300.0, y),
            Vec2::new(500.0, y + 20.0),
            Vec2::new(700.0, y),
            Vec2::new(900.0, y - 10.0),
            Vec2::new(w - 100.0, y),
            Vec2::new(w + 50.0, y),
        ]
    }

    /// Center of the core.
    pub fn core_position(&self) -> Position {
        Position::new(
            self.screen_width - CORE_INSET_X,
            self.game_area_height / 2.0,
        )
    }

    /// Grid size in tiles: (columns, rows).
    pub fn grid_dimensions(&self) -> (i32, i32) {
        (
            (self.screen_width / self.tile_size) as i32,
            (self.game_area_height / self.tile_size) as i32,
        )
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate == 0 {
            return Err(ConfigError::Invalid("tick_rate must be positive"));
        }
        if self.lane_count == 0 {
            return Err(ConfigError::Invalid("lane_count must be positive"));
        }
        if !is_positive(self.tile_size) {
            return Err(ConfigError::Invalid("tile_size must be positive"));
        }
        if !is_positive(self.screen_width) || !is_positive(self.game_area_height) {
            return Err(ConfigError::Invalid("play area must be positive"));
        }
        if !self.lane_start_y.is_finite() || !self.lane_spacing.is_finite() {
            return Err(ConfigError::Invalid("lane layout must be finite"));
        }
        if !is_positive(self.enemy_speed) {
            return Err(ConfigError::Invalid("enemy_speed must be positive"));
        }
        if !is_positive(self.waypoint_threshold) {
            return Err(ConfigError::Invalid("waypoint_threshold must be positive"));
        }
        if !(self.spawn_interval_secs >= 0.0 && self.spawn_interval_secs.is_finite()) {
            return Err(ConfigError::Invalid("spawn_interval_secs must not be negative"));
        }
        if !(self.flash_duration_secs >= 0.0 && self.flash_duration_secs.is_finite()) {
            return Err(ConfigError::Invalid("flash_duration_secs must not be negative"));
        }
        if !(self.removal_radius >= 0.0 && self.removal_radius.is_finite()) {
            return Err(ConfigError::Invalid("removal_radius must not be negative"));
        }
        if self.max_tower_level == 0 {
            return Err(ConfigError::Invalid("max_tower_level must be at least 1"));
        }
        Ok(())
    }

    pub fn from_json_str(data: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = serde_json::from_str(data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Load from an explicit path, falling back to defaults on any error.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::from_path(path) {
            Ok(config) => {
                tracing::info!(
                    target: "merger::config",
                    path = %path.display(),
                    "config.loaded=file"
                );
                config
            }
            Err(err) => {
                tracing::warn!(
                    target: "merger::config",
                    path = %path.display(),
                    error = %err,
                    "config.load_failed"
                );
                Self::default()
            }
        }
    }

    /// Load from `MERGER_CONFIG_PATH` if set, otherwise defaults.
    pub fn load_from_env() -> Self {
        match env::var(CONFIG_PATH_ENV).ok().map(PathBuf::from) {
            Some(path) => Self::load_or_default(&path),
            None => {
                tracing::info!(target: "merger::config", "config.loaded=builtin");
                Self::default()
            }
        }
    }
}

fn is_positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

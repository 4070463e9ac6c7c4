//! Default tuning parameters. `GameConfig::default()` is built from these.

/// Simulation tick rate (Hz).
pub const TICK_RATE: u32 = 60;

// --- Screen geometry ---

/// Playfield width in pixels.
pub const SCREEN_WIDTH: f32 = 1200.0;

/// Height of the playfield above the UI strip.
pub const GAME_AREA_HEIGHT: f32 = 700.0;

/// Placement grid tile edge in pixels.
pub const TILE_SIZE: f32 = 40.0;

// --- Lanes ---

pub const LANE_COUNT: usize = 4;

/// y coordinate of lane 0.
pub const LANE_START_Y: f32 = 100.0;

/// Vertical distance between adjacent lanes.
pub const LANE_SPACING: f32 = 150.0;

// --- Core ---

/// Core center sits this far left of the right screen edge.
pub const CORE_INSET_X: f32 = 80.0;

/// Core footprint edge length (square).
pub const CORE_SIZE: f32 = 80.0;

pub const STARTING_CORE_HP: u32 = 100;

/// Readiness at which the migration succeeds.
pub const READINESS_MAX: f32 = 100.0;

/// Readiness gained per point of severity when a clean record arrives.
pub const READINESS_PER_SEVERITY: f32 = 2.0;

// --- Economy ---

pub const STARTING_FUNDS: u32 = 500;

/// Flat refund on tower removal, independent of cost and level.
pub const REMOVAL_REFUND: u32 = 25;

/// A removal or upgrade click hits the tower within this distance.
pub const REMOVAL_RADIUS: f32 = 25.0;

// --- Enemies ---

/// Base movement speed (pixels/second).
pub const ENEMY_SPEED: f32 = 50.0;

/// Health per point of severity.
pub const HP_PER_SEVERITY: u32 = 10;

/// Distance at which a waypoint counts as reached.
pub const WAYPOINT_THRESHOLD: f32 = 5.0;

/// Speed multiplier when carrying more than `HEAVY_FLAG_COUNT` flags.
pub const HEAVY_FLAGS_SPEED_FACTOR: f32 = 0.7;
pub const HEAVY_FLAG_COUNT: usize = 2;

/// Speed multiplier when severity exceeds `HIGH_SEVERITY`.
pub const HIGH_SEVERITY_SPEED_FACTOR: f32 = 0.8;
pub const HIGH_SEVERITY: u32 = 5;

/// How long the "just resolved" highlight lasts.
pub const FLASH_DURATION_SECS: f64 = 0.2;

// --- Waves ---

/// Seconds between row spawns within a wave.
pub const SPAWN_INTERVAL_SECS: f64 = 1.0;

// --- Towers ---

pub const MAX_TOWER_LEVEL: u32 = 3;

/// Base range multiplier applied on every upgrade, before the variant's own.
pub const UPGRADE_RANGE_FACTOR: f32 = 1.2;

/// Base fire-rate multiplier applied on every upgrade, before the variant's own.
pub const UPGRADE_FIRE_RATE_FACTOR: f32 = 1.3;

//! Placement grid: which tiles can hold a tower.
//!
//! Tiles start buildable. Every tile holding a lane waypoint and every tile
//! under the core footprint is blocked. A tile holds at most one tower.

use thiserror::Error;

use merger_core::config::GameConfig;
use merger_core::constants::CORE_SIZE;
use merger_core::enums::RejectReason;
use merger_core::types::{GridCoord, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PlacementError {
    #[error("insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("tile is blocked or occupied")]
    Blocked,
    #[error("position is outside the placement grid")]
    OutOfBounds,
    #[error("no tower near that position")]
    NoTower,
    #[error("tower is already at max level")]
    MaxLevel,
    #[error("game is not running")]
    Inactive,
}

impl PlacementError {
    pub fn reason(&self) -> RejectReason {
        match self {
            PlacementError::InsufficientFunds { .. } => RejectReason::InsufficientFunds,
            PlacementError::Blocked => RejectReason::Blocked,
            PlacementError::OutOfBounds => RejectReason::OutOfBounds,
            PlacementError::NoTower => RejectReason::NoTower,
            PlacementError::MaxLevel => RejectReason::MaxLevel,
            PlacementError::Inactive => RejectReason::WrongPhase,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tile {
    walkable: bool,
    occupied: bool,
}

#[derive(Debug, Clone)]
pub struct PlacementGrid {
    cols: i32,
    rows: i32,
    tile_size: f32,
    tiles: Vec<Tile>,
}

impl PlacementGrid {
    /// Build the grid for `config`, blocking lanes and the core.
    pub fn new(config: &GameConfig) -> Self {
        let (cols, rows) = config.grid_dimensions();
        let mut grid = Self {
            cols,
            rows,
            tile_size: config.tile_size,
            tiles: vec![
                Tile {
                    walkable: true,
                    occupied: false,
                };
                (cols.max(0) * rows.max(0)) as usize
            ],
        };

        for path in config.lane_paths() {
            for point in path {
                if let Some(coord) = grid.coord_of(Position(point)) {
                    grid.block(coord);
                }
            }
        }

        let core = config.core_position();
        let half = CORE_SIZE / 2.0;
        let start = grid.raw_coord(Position::new(core.x() - half, core.y() - half));
        let end = grid.raw_coord(Position::new(core.x() + half, core.y() + half));
        for row in start.row..=end.row {
            for col in start.col..=end.col {
                grid.block(GridCoord::new(col, row));
            }
        }

        grid
    }

    pub fn dimensions(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    /// Tile containing `pos`, or `None` off-grid.
    pub fn coord_of(&self, pos: Position) -> Option<GridCoord> {
        let coord = self.raw_coord(pos);
        self.index(coord).map(|_| coord)
    }

    /// Top-left corner of a tile in screen space.
    pub fn tile_origin(&self, coord: GridCoord) -> Position {
        Position::new(
            coord.col as f32 * self.tile_size,
            coord.row as f32 * self.tile_size,
        )
    }

    pub fn is_walkable(&self, coord: GridCoord) -> bool {
        self.tile(coord).is_some_and(|t| t.walkable)
    }

    pub fn is_occupied(&self, coord: GridCoord) -> bool {
        self.tile(coord).is_some_and(|t| t.occupied)
    }

    /// Walkable and unoccupied.
    pub fn can_place(&self, pos: Position) -> bool {
        self.check(pos).is_ok()
    }

    /// The tile at `pos` if a tower may go there.
    pub fn check(&self, pos: Position) -> Result<GridCoord, PlacementError> {
        let coord = self.coord_of(pos).ok_or(PlacementError::OutOfBounds)?;
        match self.tile(coord) {
            Some(tile) if tile.walkable && !tile.occupied => Ok(coord),
            _ => Err(PlacementError::Blocked),
        }
    }

    /// Mark the tile at `pos` as holding a tower.
    pub fn occupy(&mut self, pos: Position) -> Result<GridCoord, PlacementError> {
        let coord = self.check(pos)?;
        if let Some(idx) = self.index(coord) {
            self.tiles[idx].occupied = true;
        }
        Ok(coord)
    }

    /// Free the tile at `pos`. No-op off-grid.
    pub fn vacate(&mut self, pos: Position) {
        if let Some(idx) = self.coord_of(pos).and_then(|c| self.index(c)) {
            self.tiles[idx].occupied = false;
        }
    }

    /// First placeable tile origin in the 3x3 neighborhood of `pos`
    /// (row-major from the top-left), or `pos` itself when none is free.
    pub fn nearest_valid_position(&self, pos: Position) -> Position {
        let center = self.raw_coord(pos);
        for dy in -1..=1 {
            for dx in -1..=1 {
                let coord = GridCoord::new(center.col + dx, center.row + dy);
                let origin = self.tile_origin(coord);
                if self.can_place(origin) {
                    return origin;
                }
            }
        }
        pos
    }

    fn raw_coord(&self, pos: Position) -> GridCoord {
        GridCoord::new(
            (pos.x() / self.tile_size).floor() as i32,
            (pos.y() / self.tile_size).floor() as i32,
        )
    }

    fn index(&self, coord: GridCoord) -> Option<usize> {
        if coord.col < 0 || coord.row < 0 || coord.col >= self.cols || coord.row >= self.rows {
            return None;
        }
        Some((coord.row * self.cols + coord.col) as usize)
    }

    fn tile(&self, coord: GridCoord) -> Option<&Tile> {
        self.index(coord).map(|idx| &self.tiles[idx])
    }

    fn block(&mut self, coord: GridCoord) {
        if let Some(idx) = self.index(coord) {
            self.tiles[idx].walkable = false;
        }
    }
}

//! Simulation engine: the core of the game.
//!
//! `SimulationEngine` owns the hecs ECS world (enemies and towers), the
//! economy, the placement grid and the wave sequencer. It processes player
//! commands, runs all systems in a fixed order, and produces
//! `GameStateSnapshot`s. Completely headless, enabling deterministic testing.

use std::collections::VecDeque;

use glam::Vec2;
use hecs::{Entity, World};

use merger_core::commands::PlayerCommand;
use merger_core::components::{Enemy, Tower};
use merger_core::config::GameConfig;
use merger_core::data::{builtin_waves, WaveData};
use merger_core::enums::{GamePhase, RejectReason, TowerKind};
use merger_core::events::GameEvent;
use merger_core::state::GameStateSnapshot;
use merger_core::types::{Position, SimTime};

use crate::economy::{Economy, Verdict};
use crate::grid::{PlacementError, PlacementGrid};
use crate::systems;
use crate::towers;
use crate::wave::{WaveError, WaveSequencer};
use crate::world_setup;

/// Configuration for starting a new simulation.
pub struct SimConfig {
    pub game: GameConfig,
    /// Waves played by every game this engine starts.
    pub waves: Vec<WaveData>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            game: GameConfig::default(),
            waves: builtin_waves(),
        }
    }
}

/// The simulation engine. Owns the ECS world and all sim state.
pub struct SimulationEngine {
    world: World,
    time: SimTime,
    phase: GamePhase,
    config: GameConfig,
    lane_paths: Vec<Vec<Vec2>>,
    waves: Vec<WaveData>,
    command_queue: VecDeque<PlayerCommand>,
    despawn_buffer: Vec<Entity>,
    events: Vec<GameEvent>,

    // --- Per-game state (reset by StartGame) ---
    economy: Economy,
    grid: PlacementGrid,
    sequencer: WaveSequencer,
    waves_started: usize,
    selected_tower: TowerKind,
    next_enemy_serial: u64,
    next_tower_serial: u64,
}

impl SimulationEngine {
    /// Create a new simulation engine with the given config.
    pub fn new(config: SimConfig) -> Self {
        let SimConfig { game, waves } = config;
        Self {
            world: World::new(),
            time: SimTime::default(),
            phase: GamePhase::default(),
            lane_paths: game.lane_paths(),
            economy: Economy::new(&game),
            grid: PlacementGrid::new(&game),
            sequencer: WaveSequencer::new(waves.clone(), game.spawn_interval_secs),
            waves,
            command_queue: VecDeque::new(),
            despawn_buffer: Vec::new(),
            events: Vec::new(),
            waves_started: 0,
            selected_tower: TowerKind::default(),
            next_enemy_serial: 0,
            next_tower_serial: 0,
            config: game,
        }
    }

    /// Queue a player command for processing at the next tick boundary.
    pub fn queue_command(&mut self, command: PlayerCommand) {
        self.command_queue.push_back(command);
    }

    /// Queue multiple commands.
    pub fn queue_commands(&mut self, commands: impl IntoIterator<Item = PlayerCommand>) {
        self.command_queue.extend(commands);
    }

    /// Advance one fixed tick (`1 / tick_rate` seconds).
    pub fn tick(&mut self) -> GameStateSnapshot {
        self.step(self.config.dt())
    }

    /// Advance by an arbitrary frame time and return the resulting snapshot.
    pub fn step(&mut self, dt: f64) -> GameStateSnapshot {
        self.process_commands();

        if self.phase == GamePhase::Active {
            self.run_systems(dt);
            self.time.advance(dt);
        }

        self.snapshot()
    }

    /// Snapshot of the current state, draining pending events.
    pub fn snapshot(&mut self) -> GameStateSnapshot {
        let events = std::mem::take(&mut self.events);
        systems::snapshot::build_snapshot(
            &self.world,
            &self.time,
            self.phase,
            &self.economy,
            &self.sequencer,
            self.waves_started,
            self.selected_tower,
            events,
        )
    }

    /// Get the current game phase.
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Get the current simulation time.
    pub fn time(&self) -> SimTime {
        self.time
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn economy(&self) -> &Economy {
        &self.economy
    }

    pub fn grid(&self) -> &PlacementGrid {
        &self.grid
    }

    pub fn sequencer(&self) -> &WaveSequencer {
        &self.sequencer
    }

    pub fn lane_paths(&self) -> &[Vec<Vec2>] {
        &self.lane_paths
    }

    /// Number of waves started this game.
    pub fn waves_started(&self) -> usize {
        self.waves_started
    }

    pub fn selected_tower(&self) -> TowerKind {
        self.selected_tower
    }

    /// Get a read-only reference to the ECS world.
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable world access for tests that stage entities directly.
    #[cfg(test)]
    pub(crate) fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn live_enemies(&self) -> usize {
        self.world.query::<&Enemy>().iter().count()
    }

    // --- Placement / economy surface ---

    /// Whether a tower could go at `pos` (ignores funds).
    pub fn can_place(&self, pos: Position) -> bool {
        self.grid.can_place(pos)
    }

    /// Place a tower of `kind` at `pos`. On failure nothing changes.
    pub fn place_tower(&mut self, kind: TowerKind, pos: Position) -> Result<Entity, PlacementError> {
        if self.phase != GamePhase::Active {
            return Err(PlacementError::Inactive);
        }
        let cost = towers::spec(kind).cost;
        if self.economy.funds < cost {
            return Err(PlacementError::InsufficientFunds {
                needed: cost,
                available: self.economy.funds,
            });
        }
        self.grid.check(pos)?;
        self.economy.spend(cost)?;
        self.grid.occupy(pos)?;

        let entity =
            world_setup::spawn_tower(&mut self.world, &self.config, kind, pos, self.next_tower_serial);
        self.next_tower_serial += 1;

        tracing::info!(
            target: "merger::sim",
            kind = ?kind,
            x = pos.x(),
            y = pos.y(),
            cost,
            funds = self.economy.funds,
            "tower.placed"
        );
        self.events.push(GameEvent::TowerPlaced {
            kind,
            x: pos.x(),
            y: pos.y(),
            cost,
        });
        Ok(entity)
    }

    /// Remove the first tower within the removal radius of `pos` and refund
    /// the flat amount. Returns the refund, or `None` if nothing was there.
    pub fn remove_tower(&mut self, pos: Position) -> Option<u32> {
        let (entity, kind, tower_pos) = self.tower_near(pos)?;
        let _ = self.world.despawn(entity);
        self.grid.vacate(tower_pos);

        let refund = self.config.removal_refund;
        self.economy.refund(refund);

        tracing::info!(
            target: "merger::sim",
            kind = ?kind,
            refund,
            funds = self.economy.funds,
            "tower.removed"
        );
        self.events.push(GameEvent::TowerRemoved { kind, refund });
        Some(refund)
    }

    /// Upgrade the tower near `pos`, charging `cost x level`.
    /// Returns the new level.
    pub fn upgrade_tower(&mut self, pos: Position) -> Result<u32, PlacementError> {
        if self.phase != GamePhase::Active {
            return Err(PlacementError::Inactive);
        }
        let (entity, kind, _) = self.tower_near(pos).ok_or(PlacementError::NoTower)?;
        let mut tower = self
            .world
            .get::<&mut Tower>(entity)
            .map_err(|_| PlacementError::NoTower)?;
        if !tower.can_upgrade() {
            return Err(PlacementError::MaxLevel);
        }
        let cost = tower.upgrade_cost();
        self.economy.spend(cost)?;
        towers::upgrade(&mut tower);
        let level = tower.level;
        drop(tower);

        tracing::info!(
            target: "merger::sim",
            kind = ?kind,
            level,
            cost,
            "tower.upgraded"
        );
        self.events.push(GameEvent::TowerUpgraded { kind, level, cost });
        Ok(level)
    }

    /// First tower (placement order) strictly within the removal radius.
    fn tower_near(&self, pos: Position) -> Option<(Entity, TowerKind, Position)> {
        let mut hits: Vec<(u64, Entity, TowerKind, Position)> = self
            .world
            .query::<(&Tower, &Position)>()
            .iter()
            .filter(|(_, (_, tower_pos))| tower_pos.distance_to(&pos) < self.config.removal_radius)
            .map(|(entity, (tower, tower_pos))| (tower.serial, entity, tower.kind, *tower_pos))
            .collect();
        hits.sort_by_key(|(serial, ..)| *serial);
        hits.into_iter()
            .next()
            .map(|(_, entity, kind, tower_pos)| (entity, kind, tower_pos))
    }

    // --- Waves ---

    /// Start the next wave. The external wave counter only advances when
    /// the sequencer accepts it.
    pub fn start_next_wave(&mut self) -> Result<usize, WaveError> {
        let index = self.waves_started;
        self.sequencer.start_wave(index)?;
        self.waves_started += 1;
        tracing::info!(
            target: "merger::sim",
            wave = index + 1,
            total = self.sequencer.total_waves(),
            "wave.started"
        );
        self.events.push(GameEvent::WaveStarted { wave: index });
        Ok(index)
    }

    /// Process all queued commands.
    fn process_commands(&mut self) {
        while let Some(command) = self.command_queue.pop_front() {
            self.handle_command(command);
        }
    }

    /// Handle a single player command.
    fn handle_command(&mut self, command: PlayerCommand) {
        match command {
            PlayerCommand::StartGame => {
                if matches!(
                    self.phase,
                    GamePhase::MainMenu | GamePhase::Victory | GamePhase::Defeat
                ) {
                    self.reset_game();
                    self.phase = GamePhase::Active;
                    tracing::info!(
                        target: "merger::sim",
                        waves = self.sequencer.total_waves(),
                        funds = self.economy.funds,
                        "game.started"
                    );
                } else {
                    self.reject(RejectReason::WrongPhase);
                }
            }
            PlayerCommand::ReturnToMenu => {
                if self.phase.is_over() {
                    self.phase = GamePhase::MainMenu;
                }
            }
            PlayerCommand::Pause => {
                if self.phase == GamePhase::Active {
                    self.phase = GamePhase::Paused;
                }
            }
            PlayerCommand::Resume => {
                if self.phase == GamePhase::Paused {
                    self.phase = GamePhase::Active;
                }
            }
            PlayerCommand::StartWave => {
                if self.phase != GamePhase::Active {
                    self.reject(RejectReason::WrongPhase);
                } else if let Err(err) = self.start_next_wave() {
                    tracing::debug!(target: "merger::sim", error = %err, "wave.start_rejected");
                    self.reject(err.reason());
                }
            }
            PlayerCommand::SelectTower { kind } => {
                self.selected_tower = kind;
            }
            PlayerCommand::PlaceTower { x, y } => {
                let kind = self.selected_tower;
                if let Err(err) = self.place_tower(kind, Position::new(x, y)) {
                    tracing::debug!(target: "merger::sim", error = %err, "tower.place_rejected");
                    self.reject(err.reason());
                }
            }
            PlayerCommand::RemoveTower { x, y } => {
                if self.phase == GamePhase::Active
                    && self.remove_tower(Position::new(x, y)).is_none()
                {
                    tracing::debug!(target: "merger::sim", x, y, "tower.remove_missed");
                }
            }
            PlayerCommand::UpgradeTower { x, y } => {
                if let Err(err) = self.upgrade_tower(Position::new(x, y)) {
                    tracing::debug!(target: "merger::sim", error = %err, "tower.upgrade_rejected");
                    self.reject(err.reason());
                }
            }
        }
    }

    fn reject(&mut self, reason: RejectReason) {
        self.events.push(GameEvent::CommandRejected { reason });
    }

    /// Fresh world, economy, grid and sequencer for a new game.
    fn reset_game(&mut self) {
        self.world.clear();
        self.time = SimTime::default();
        self.economy = Economy::new(&self.config);
        self.grid = PlacementGrid::new(&self.config);
        self.sequencer = WaveSequencer::new(self.waves.clone(), self.config.spawn_interval_secs);
        self.waves_started = 0;
        self.next_enemy_serial = 0;
        self.next_tower_serial = 0;
        self.despawn_buffer.clear();
        self.events.clear();
    }

    /// Run all systems in order.
    fn run_systems(&mut self, dt: f64) {
        // 1. Towers fire at start-of-frame positions
        systems::tower_fire::run(
            &mut self.world,
            self.time.elapsed_secs,
            self.config.flash_duration_secs,
            &mut self.events,
        );
        // 2. Movement along lane paths
        systems::movement::run(&mut self.world, dt, self.config.waypoint_threshold);
        // 3. Resolve-flash decay
        systems::movement::decay_flash(&mut self.world, dt);
        // 4. Arrivals at the core
        systems::arrival::run(
            &mut self.world,
            &mut self.economy,
            &mut self.despawn_buffer,
            &mut self.events,
        );
        // 5. Wave sequencing / spawning
        systems::wave_spawner::run(
            &mut self.world,
            &self.config,
            &mut self.sequencer,
            &self.lane_paths,
            dt,
            &mut self.next_enemy_serial,
            &mut self.events,
        );
        // 6. End conditions
        self.check_end_conditions();
    }

    fn check_end_conditions(&mut self) {
        let all_complete = self.sequencer.all_waves_complete(self.live_enemies());
        let Some(verdict) = self.economy.verdict(all_complete) else {
            return;
        };
        let won = verdict == Verdict::Victory;
        self.phase = if won {
            GamePhase::Victory
        } else {
            GamePhase::Defeat
        };
        tracing::info!(
            target: "merger::sim",
            verdict = ?verdict,
            readiness = self.economy.readiness,
            core_hp = self.economy.core_hp,
            issues_fixed = self.economy.issues_fixed,
            tick = self.time.tick,
            "game.over"
        );
        self.events.push(GameEvent::GameOver {
            won,
            readiness: self.economy.readiness,
            issues_fixed: self.economy.issues_fixed,
        });
    }
}

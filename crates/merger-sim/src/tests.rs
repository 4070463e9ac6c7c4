//! Tests for the engine, sequencer, targeting, movement, grid and economy.

use glam::Vec2;

use merger_core::commands::PlayerCommand;
use merger_core::components::{IssueFlags, PathFollower, Tower};
use merger_core::config::GameConfig;
use merger_core::data::{RowData, WaveData};
use merger_core::enums::*;
use merger_core::events::GameEvent;
use merger_core::flags::*;
use merger_core::types::{GridCoord, Position};

use crate::economy::{Economy, Verdict};
use crate::engine::{SimConfig, SimulationEngine};
use crate::grid::{PlacementError, PlacementGrid};
use crate::systems::{movement, tower_fire};
use crate::towers;
use crate::wave::{lane_for_id, WaveError, WaveSequencer, WaveTick};
use crate::world_setup;

fn row(id: &str, flags: &[&str], severity: u32) -> RowData {
    RowData {
        id: id.into(),
        category: RoomCategory::Customers,
        summary: format!("{id} summary"),
        flags: flags.iter().map(|f| f.to_string()).collect(),
        severity,
    }
}

fn wave(rows: Vec<RowData>) -> WaveData {
    WaveData { lane: 0, rows }
}

fn engine_with(game: GameConfig, waves: Vec<WaveData>) -> SimulationEngine {
    SimulationEngine::new(SimConfig { game, waves })
}

/// Engine in the Active phase with the builtin waves (none started).
fn active_engine() -> SimulationEngine {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(PlayerCommand::StartGame);
    engine.tick();
    engine
}

/// Stage an enemy directly, heading right from `at`.
fn stage_enemy(
    engine: &mut SimulationEngine,
    id: &str,
    flags: &[&str],
    severity: u32,
    at: Vec2,
    serial: u64,
) -> hecs::Entity {
    let config = engine.config().clone();
    let waypoints = vec![at, Vec2::new(5000.0, at.y)];
    world_setup::spawn_enemy(
        engine.world_mut(),
        &config,
        &row(id, flags, severity),
        0,
        waypoints,
        serial,
    )
}

fn flags_of(engine: &SimulationEngine, entity: hecs::Entity) -> Vec<String> {
    engine
        .world()
        .get::<&IssueFlags>(entity)
        .map(|f| f.to_vec())
        .unwrap_or_default()
}

// ---- Determinism ----

#[test]
fn test_determinism_same_commands() {
    let script = |engine: &mut SimulationEngine| {
        engine.queue_commands([
            PlayerCommand::StartGame,
            PlayerCommand::SelectTower {
                kind: TowerKind::ExpiryScanner,
            },
            PlayerCommand::PlaceTower { x: 200.0, y: 60.0 },
            PlayerCommand::StartWave,
        ]);
    };
    let mut engine_a = SimulationEngine::new(SimConfig::default());
    let mut engine_b = SimulationEngine::new(SimConfig::default());
    script(&mut engine_a);
    script(&mut engine_b);

    for _ in 0..1500 {
        let json_a = serde_json::to_string(&engine_a.tick()).unwrap();
        let json_b = serde_json::to_string(&engine_b.tick()).unwrap();
        assert_eq!(json_a, json_b, "Snapshots diverged with identical input");
    }
}

// ---- Lifecycle ----

#[test]
fn test_starts_in_main_menu_and_does_not_advance() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::MainMenu);
    assert_eq!(snap.time.tick, 0);
}

#[test]
fn test_start_game_only_from_menu_or_end() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 60.0))
        .unwrap();
    engine.start_next_wave().unwrap();
    for _ in 0..120 {
        engine.tick();
    }
    assert!(engine.live_enemies() > 0);

    // StartGame is refused mid-game.
    engine.queue_command(PlayerCommand::StartGame);
    let snap = engine.tick();
    assert!(snap.events.contains(&GameEvent::CommandRejected {
        reason: RejectReason::WrongPhase
    }));

    engine.queue_command(PlayerCommand::Pause);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Paused);
    engine.queue_command(PlayerCommand::StartGame);
    engine.tick();
    assert_eq!(engine.phase(), GamePhase::Paused, "restart only from menu or end");
}

#[test]
fn test_pause_resume_via_commands() {
    let mut engine = active_engine();
    engine.queue_command(PlayerCommand::StartWave);
    for _ in 0..90 {
        engine.tick();
    }

    engine.queue_command(PlayerCommand::Pause);
    let paused = engine.tick();
    assert_eq!(paused.phase, GamePhase::Paused);

    for _ in 0..600 {
        let snap = engine.tick();
        assert_eq!(snap.time.tick, paused.time.tick);
        assert_eq!(snap.enemies.len(), paused.enemies.len());
        for (a, b) in snap.enemies.iter().zip(paused.enemies.iter()) {
            assert_eq!(a.position, b.position, "enemies frozen while paused");
        }
    }
    assert_eq!(
        engine.sequencer().rows_remaining(),
        1,
        "spawn timer frozen: second row still pending"
    );

    engine.queue_command(PlayerCommand::Resume);
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Active);
    assert!(snap.time.tick > paused.time.tick);
}

#[test]
fn test_return_to_menu_only_after_game_over() {
    let mut engine = active_engine();
    engine.queue_command(PlayerCommand::ReturnToMenu);
    assert_eq!(engine.tick().phase, GamePhase::Active);
}

// ---- Wave sequencer ----

#[test]
fn test_sequencer_state_machine() {
    let mut seq = WaveSequencer::new(vec![wave(vec![row("A", &[], 1), row("B", &[], 1)])], 1.0);
    assert_eq!(seq.phase(), WavePhase::Idle);
    assert_eq!(seq.advance(5.0, 0), WaveTick::default(), "idle does nothing");

    seq.start_wave(0).unwrap();
    assert_eq!(seq.phase(), WavePhase::Spawning);

    let t = seq.advance(0.5, 0);
    assert!(t.spawn.is_none());
    let t = seq.advance(0.5, 0);
    assert_eq!(t.spawn.map(|r| r.id), Some("A".to_string()));
    assert_eq!(seq.phase(), WavePhase::Spawning);

    let t = seq.advance(1.0, 1);
    assert_eq!(t.spawn.map(|r| r.id), Some("B".to_string()));
    assert_eq!(seq.phase(), WavePhase::Draining);
    assert!(t.completed.is_none());

    let t = seq.advance(1.0, 2);
    assert!(t.completed.is_none(), "still draining while enemies live");

    let t = seq.advance(1.0, 0);
    assert_eq!(t.completed, Some(0));
    assert_eq!(seq.phase(), WavePhase::Complete);
}

#[test]
fn test_sequencer_rejects_out_of_range_and_reentry() {
    let mut seq = WaveSequencer::new(vec![wave(vec![row("A", &[], 1)]); 2], 1.0);
    assert_eq!(
        seq.start_wave(2),
        Err(WaveError::OutOfRange { index: 2, total: 2 })
    );
    assert_eq!(seq.phase(), WavePhase::Idle, "out of range leaves state alone");

    seq.start_wave(0).unwrap();
    seq.advance(0.2, 0);
    assert_eq!(
        seq.start_wave(1),
        Err(WaveError::AlreadyRunning { index: 0 })
    );
    assert_eq!(seq.active_wave(), Some(0));
    assert_eq!(seq.rows_remaining(), 1, "re-entry must not reset rows");
}

#[test]
fn test_all_waves_complete() {
    let mut seq = WaveSequencer::new(vec![wave(vec![row("A", &[], 1)])], 1.0);
    assert!(!seq.all_waves_complete(0), "false before any wave starts");

    seq.start_wave(0).unwrap();
    assert!(!seq.all_waves_complete(0), "rows remain");

    seq.advance(1.0, 0);
    assert!(!seq.all_waves_complete(1), "enemy live");
    assert!(seq.all_waves_complete(0));
}

#[test]
fn test_empty_wave_completes_immediately() {
    let mut seq = WaveSequencer::new(vec![wave(vec![])], 1.0);
    seq.start_wave(0).unwrap();
    let t = seq.advance(0.01, 0);
    assert_eq!(t.completed, Some(0));
}

#[test]
fn test_lane_hash_is_stable() {
    assert_eq!(lane_for_id("A", 4), 0);
    assert_eq!(lane_for_id("B", 4), 1);
    assert_eq!(lane_for_id("C", 4), 2);
    assert_eq!(lane_for_id("D", 4), 3);
    assert_eq!(lane_for_id("MIX-001", 4), 3);
    assert_eq!(lane_for_id("CUST-002", 4), 1);
    assert_eq!(lane_for_id("anything", 0), 0);
}

#[test]
fn test_engine_start_wave_guards() {
    let mut engine = engine_with(
        GameConfig::default(),
        vec![wave(vec![row("A", &[], 1)]), wave(vec![row("B", &[], 1)])],
    );
    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick();
    assert!(snap.events.contains(&GameEvent::CommandRejected {
        reason: RejectReason::WrongPhase
    }));

    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);
    let snap = engine.tick();
    assert_eq!(snap.current_wave, 1);
    assert!(snap.events.contains(&GameEvent::WaveStarted { wave: 0 }));

    engine.queue_command(PlayerCommand::StartWave);
    let snap = engine.tick();
    assert_eq!(snap.current_wave, 1, "counter not advanced while running");
    assert!(snap.events.contains(&GameEvent::CommandRejected {
        reason: RejectReason::WaveInProgress
    }));
}

// ---- Towers ----

#[test]
fn test_variant_table() {
    let costs: Vec<u32> = TowerKind::ALL.iter().map(|k| towers::spec(*k).cost).collect();
    assert_eq!(costs, vec![50, 75, 60, 80]);
    assert_eq!(towers::spec(TowerKind::ArrearsRadar).primary_flag, LOAN_OVERDUE_120D);
}

#[test]
fn test_on_fire_resolves_primary_and_secondary() {
    let mut flags = IssueFlags::new([EXPIRED_LEGAL_ID, LOAN_OVERDUE_120D, PAST_MATURITY_NOT_CLOSED]);
    let removed = towers::on_fire(TowerKind::ExpiryScanner, &mut flags);
    assert_eq!(removed, vec![EXPIRED_LEGAL_ID, PAST_MATURITY_NOT_CLOSED]);
    assert_eq!(flags.to_vec(), vec![LOAN_OVERDUE_120D.to_string()]);

    let again = towers::on_fire(TowerKind::ExpiryScanner, &mut flags);
    assert!(again.is_empty(), "second shot is a no-op");
}

#[test]
fn test_upgrade_compounds_multipliers() {
    let mut t = towers::build_tower(TowerKind::DuplicateDetector, 3, 0);
    assert!(towers::upgrade(&mut t));
    assert_eq!(t.level, 2);
    assert!((t.range - 120.0 * 1.2 * 1.3).abs() < 1e-3);
    assert!((t.fire_rate - 1.5 * 1.3 * 1.2).abs() < 1e-4);

    let mut e = towers::build_tower(TowerKind::ExpiryScanner, 3, 0);
    towers::upgrade(&mut e);
    assert!((e.range - 120.0).abs() < 1e-3, "expiry only gets the base range factor");
    assert!((e.fire_rate - 1.3 * 1.4).abs() < 1e-4);

    let before = t.range;
    assert!(towers::upgrade(&mut t));
    assert!(t.range > before);
    assert_eq!(t.level, 3);
    assert!(!towers::upgrade(&mut t), "capped at max level");
    assert_eq!(t.level, 3);
}

// ---- Targeting ----

fn candidate(world: &mut hecs::World, x: f32) -> tower_fire::Candidate {
    tower_fire::Candidate {
        entity: world.spawn(()),
        position: Position::new(x, 0.0),
    }
}

#[test]
fn test_find_target_nearest_flagged_in_range() {
    let mut world = hecs::World::new();
    let far = candidate(&mut world, 90.0);
    let near_unflagged = candidate(&mut world, 10.0);
    let near = candidate(&mut world, 30.0);
    let out_of_range = candidate(&mut world, 150.0);

    let flagged = IssueFlags::new([DUPLICATE_LEGAL_ID]);
    let other = IssueFlags::new([EXPIRED_LEGAL_ID]);
    let list = vec![
        (far, &flagged),
        (near_unflagged, &other),
        (near, &flagged),
        (out_of_range, &flagged),
    ];
    let hit = tower_fire::find_target(Position::new(0.0, 0.0), 100.0, DUPLICATE_LEGAL_ID, list);
    assert_eq!(hit, Some(near.entity));
}

#[test]
fn test_find_target_tie_goes_to_first() {
    let mut world = hecs::World::new();
    let first = candidate(&mut world, 50.0);
    let second = candidate(&mut world, -50.0);
    let flagged = IssueFlags::new([DUPLICATE_LEGAL_ID]);
    let hit = tower_fire::find_target(
        Position::new(0.0, 0.0),
        100.0,
        DUPLICATE_LEGAL_ID,
        vec![(first, &flagged), (second, &flagged)],
    );
    assert_eq!(hit, Some(first.entity));
}

#[test]
fn test_find_target_range_is_inclusive_and_skips_resolved() {
    let mut world = hecs::World::new();
    let edge = candidate(&mut world, 100.0);
    let flagged = IssueFlags::new([DUPLICATE_LEGAL_ID]);
    let hit = tower_fire::find_target(
        Position::new(0.0, 0.0),
        100.0,
        DUPLICATE_LEGAL_ID,
        vec![(edge, &flagged)],
    );
    assert_eq!(hit, Some(edge.entity));

    let resolved = IssueFlags::default();
    let hit = tower_fire::find_target(
        Position::new(0.0, 0.0),
        100.0,
        DUPLICATE_LEGAL_ID,
        vec![(edge, &resolved)],
    );
    assert_eq!(hit, None);
}

#[test]
fn test_tower_fires_and_flashes() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::ExpiryScanner, Position::new(200.0, 200.0))
        .unwrap();
    let enemy = stage_enemy(
        &mut engine,
        "E-1",
        &[EXPIRED_LEGAL_ID, LOAN_OVERDUE_120D, PAST_MATURITY_NOT_CLOSED],
        3,
        Vec2::new(230.0, 200.0),
        100,
    );

    let snap = engine.tick();
    assert_eq!(flags_of(&engine, enemy), vec![LOAN_OVERDUE_120D.to_string()]);
    let resolved: Vec<&GameEvent> = snap
        .events
        .iter()
        .filter(|e| matches!(e, GameEvent::FlagResolved { .. }))
        .collect();
    assert_eq!(resolved.len(), 2);
    assert!(snap.enemies[0].flashing);
    assert!(!snap.enemies[0].resolved);

    // Flash expires after 0.2s of sim time.
    let mut snap = engine.tick();
    for _ in 0..15 {
        snap = engine.tick();
    }
    assert!(!snap.enemies[0].flashing);
}

#[test]
fn test_tower_cooldown_respects_fire_rate() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 200.0))
        .unwrap();
    let a = stage_enemy(&mut engine, "E-A", &[DUPLICATE_LEGAL_ID], 1, Vec2::new(210.0, 200.0), 100);
    let b = stage_enemy(&mut engine, "E-B", &[DUPLICATE_LEGAL_ID], 1, Vec2::new(240.0, 200.0), 101);

    engine.tick();
    assert!(flags_of(&engine, a).is_empty(), "nearest cleaned first");
    assert_eq!(flags_of(&engine, b).len(), 1);

    // 1 / 1.5 s = 40 ticks at 60 Hz. Not ready after 30.
    for _ in 0..30 {
        engine.tick();
    }
    assert_eq!(flags_of(&engine, b).len(), 1);

    for _ in 0..15 {
        engine.tick();
    }
    assert!(flags_of(&engine, b).is_empty());
}

#[test]
fn test_pause_does_not_advance_fire_timer() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 200.0))
        .unwrap();
    stage_enemy(&mut engine, "E-A", &[DUPLICATE_LEGAL_ID], 1, Vec2::new(210.0, 200.0), 100);
    let b = stage_enemy(&mut engine, "E-B", &[DUPLICATE_LEGAL_ID], 1, Vec2::new(240.0, 200.0), 101);
    engine.tick();

    engine.queue_command(PlayerCommand::Pause);
    engine.tick();
    for _ in 0..600 {
        engine.tick();
    }
    engine.queue_command(PlayerCommand::Resume);
    engine.tick();
    assert_eq!(
        flags_of(&engine, b).len(),
        1,
        "ten paused seconds must not count toward the cooldown"
    );
}

#[test]
fn test_resolved_enemy_is_never_targeted() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 200.0))
        .unwrap();
    stage_enemy(&mut engine, "E-A", &[], 1, Vec2::new(210.0, 200.0), 100);
    let snap = engine.tick();
    assert!(snap.enemies[0].resolved);
    assert!(!snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::FlagResolved { .. })));
}

// ---- Movement ----

#[test]
fn test_speed_multiplier() {
    assert_eq!(movement::speed_multiplier(1, 3), 1.0);
    assert!((movement::speed_multiplier(3, 3) - 0.7).abs() < 1e-6);
    assert!((movement::speed_multiplier(2, 6) - 0.8).abs() < 1e-6);
    assert!((movement::speed_multiplier(3, 6) - 0.56).abs() < 1e-6);
}

#[test]
fn test_advance_moves_toward_waypoint() {
    let mut pos = Position::new(0.0, 0.0);
    let mut follower = PathFollower {
        waypoints: vec![Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(100.0, 100.0)],
        next_index: 1,
        speed: 50.0,
    };
    movement::advance(&mut pos, &mut follower, 1.0, 1.0, 5.0);
    assert!((pos.x() - 50.0).abs() < 1e-4);
    assert_eq!(follower.next_index, 1);

    movement::advance(&mut pos, &mut follower, 1.0, 2.0, 5.0);
    assert!((pos.x() - 100.0).abs() < 1e-4, "no overshoot");

    movement::advance(&mut pos, &mut follower, 1.0, 1.0, 5.0);
    assert_eq!(follower.next_index, 2, "within threshold: index advances");
    assert_eq!(pos, Position::new(100.0, 0.0), "and no movement that frame");
}

#[test]
fn test_advance_on_waypoint_with_zero_threshold() {
    let mut pos = Position::new(100.0, 0.0);
    let mut follower = PathFollower {
        waypoints: vec![Vec2::ZERO, Vec2::new(100.0, 0.0), Vec2::new(200.0, 0.0)],
        next_index: 1,
        speed: 50.0,
    };
    movement::advance(&mut pos, &mut follower, 1.0, 1.0, 0.0);
    assert_eq!(follower.next_index, 2);
    assert_eq!(pos, Position::new(100.0, 0.0));

    movement::advance(&mut pos, &mut follower, 1.0, 1.0, 0.0);
    assert!(pos.x().is_finite() && pos.y().is_finite());
    assert!((pos.x() - 150.0).abs() < 1e-4);
}

#[test]
fn test_zero_threshold_game_still_finishes() {
    let game = GameConfig {
        waypoint_threshold: 0.0,
        ..GameConfig::default()
    };
    let mut engine = engine_with(game, vec![wave(vec![row("A", &[], 1)])]);
    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);

    let mut snap = engine.tick();
    for _ in 0..60 * 60 {
        snap = engine.tick();
        for enemy in &snap.enemies {
            assert!(enemy.position.x().is_finite() && enemy.position.y().is_finite());
        }
        if snap.phase.is_over() {
            break;
        }
    }
    assert!(snap.phase.is_over(), "enemy never reached the core");
    assert_eq!(snap.enemies_arrived, 1);
}

#[test]
fn test_enemy_walks_full_lane_and_arrives_once() {
    let mut engine = engine_with(GameConfig::default(), vec![wave(vec![row("A", &[], 1)])]);
    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);

    let mut arrivals = 0;
    let mut final_snap = engine.tick();
    for _ in 0..60 * 60 {
        let snap = engine.tick();
        arrivals += snap
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemyArrived { .. }))
            .count();
        final_snap = snap;
        if final_snap.phase.is_over() {
            break;
        }
    }
    assert_eq!(arrivals, 1);
    assert_eq!(final_snap.enemies_arrived, 1);
    assert_eq!(final_snap.enemies_remaining, 0);
    assert_eq!(final_snap.readiness, 2.0);
}

// ---- Grid ----

#[test]
fn test_grid_blocks_lanes_and_core() {
    let grid = PlacementGrid::new(&GameConfig::default());
    assert_eq!(grid.dimensions(), (30, 17));

    // Lane 0 waypoint (100, 100).
    assert!(!grid.is_walkable(GridCoord::new(2, 2)));
    // Lane 0 curve (500, 120).
    assert!(!grid.is_walkable(GridCoord::new(12, 3)));
    // Core at (1120, 350), 80x80.
    for col in 27..=29 {
        for row in 7..=9 {
            assert!(!grid.is_walkable(GridCoord::new(col, row)));
        }
    }
    assert!(grid.can_place(Position::new(200.0, 200.0)));
}

#[test]
fn test_grid_bounds_and_occupancy() {
    let mut grid = PlacementGrid::new(&GameConfig::default());
    assert_eq!(
        grid.check(Position::new(-10.0, 50.0)),
        Err(PlacementError::OutOfBounds)
    );
    assert_eq!(
        grid.check(Position::new(50.0, 710.0)),
        Err(PlacementError::OutOfBounds)
    );

    let pos = Position::new(210.0, 210.0);
    assert_eq!(grid.occupy(pos), Ok(GridCoord::new(5, 5)));
    assert!(grid.is_occupied(GridCoord::new(5, 5)));
    assert_eq!(grid.check(Position::new(230.0, 230.0)), Err(PlacementError::Blocked));

    grid.vacate(pos);
    assert!(grid.can_place(pos));
}

#[test]
fn test_nearest_valid_position() {
    let grid = PlacementGrid::new(&GameConfig::default());
    // (100, 100) is a lane tile; the first free neighbor is (col 1, row 1).
    assert_eq!(
        grid.nearest_valid_position(Position::new(100.0, 100.0)),
        Position::new(40.0, 40.0)
    );
}

// ---- Economy ----

#[test]
fn test_readiness_monotonic_and_capped() {
    let mut economy = Economy::new(&GameConfig::default());
    let mut last = economy.readiness;
    for severity in [9, 1, 10, 10, 10, 10, 10, 3] {
        economy.record_arrival(severity, true);
        assert!(economy.readiness >= last);
        assert!(economy.readiness <= 100.0);
        last = economy.readiness;
    }
    assert_eq!(economy.readiness, 100.0);
    assert_eq!(economy.issues_fixed, 8);
}

#[test]
fn test_core_health_floor() {
    let mut economy = Economy::new(&GameConfig::default());
    let outcome = economy.record_arrival(6, false);
    assert_eq!(outcome.core_damage, 3);
    assert_eq!(economy.core_hp, 97);
    assert_eq!(economy.record_arrival(1, false).core_damage, 1, "at least 1");
    for _ in 0..50 {
        economy.record_arrival(10, false);
    }
    assert_eq!(economy.core_hp, 0);
    assert_eq!(economy.enemies_arrived, 52);
    assert_eq!(economy.issues_fixed, 0);
}

#[test]
fn test_verdict_priority() {
    let mut economy = Economy::new(&GameConfig::default());
    assert_eq!(economy.verdict(false), None);
    assert_eq!(economy.verdict(true), Some(Verdict::WavesExhausted));

    economy.core_hp = 0;
    assert_eq!(economy.verdict(true), Some(Verdict::CoreDestroyed));

    economy.readiness = 100.0;
    assert_eq!(economy.verdict(true), Some(Verdict::Victory));
}

#[test]
fn test_spend_never_goes_negative() {
    let mut economy = Economy::new(&GameConfig::default());
    assert!(economy.spend(600).is_err());
    assert_eq!(economy.funds, 500);
    assert!(economy.spend(500).is_ok());
    assert_eq!(economy.funds, 0);
}

// ---- Placement surface ----

#[test]
fn test_place_rejected_when_unaffordable() {
    let game = GameConfig {
        starting_funds: 40,
        ..GameConfig::default()
    };
    let mut engine = engine_with(game, vec![wave(vec![])]);
    engine.queue_commands([
        PlayerCommand::StartGame,
        PlayerCommand::PlaceTower { x: 200.0, y: 200.0 },
    ]);
    let snap = engine.tick();
    assert_eq!(snap.funds, 40);
    assert!(snap.towers.is_empty());
    assert!(snap.events.contains(&GameEvent::CommandRejected {
        reason: RejectReason::InsufficientFunds
    }));
    assert!(engine.can_place(Position::new(200.0, 200.0)), "cell untouched");
}

#[test]
fn test_place_rejected_on_lane_and_occupied() {
    let mut engine = active_engine();
    assert_eq!(
        engine.place_tower(TowerKind::DuplicateDetector, Position::new(100.0, 100.0)),
        Err(PlacementError::Blocked)
    );
    engine
        .place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 200.0))
        .unwrap();
    assert_eq!(
        engine.place_tower(TowerKind::BalanceChecker, Position::new(210.0, 210.0)),
        Err(PlacementError::Blocked)
    );
    assert_eq!(engine.economy().funds, 450);
}

#[test]
fn test_place_rejected_outside_active_phase() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    assert_eq!(
        engine.place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 200.0)),
        Err(PlacementError::Inactive)
    );
}

#[test]
fn test_remove_refunds_flat_amount() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::ArrearsRadar, Position::new(200.0, 200.0))
        .unwrap();
    assert_eq!(engine.economy().funds, 420);

    assert_eq!(engine.remove_tower(Position::new(215.0, 210.0)), Some(25));
    assert_eq!(engine.economy().funds, 445);
    assert!(engine.can_place(Position::new(200.0, 200.0)), "cell freed");
    assert_eq!(engine.world().query::<&Tower>().iter().count(), 0);
}

#[test]
fn test_remove_with_nothing_nearby_is_noop() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::DuplicateDetector, Position::new(200.0, 200.0))
        .unwrap();
    assert_eq!(engine.remove_tower(Position::new(260.0, 200.0)), None);
    assert_eq!(engine.economy().funds, 450);

    engine.queue_command(PlayerCommand::RemoveTower { x: 600.0, y: 600.0 });
    let snap = engine.tick();
    assert_eq!(snap.towers.len(), 1);
    assert!(snap.events.is_empty());
}

#[test]
fn test_upgrade_charges_cost_times_level() {
    let mut engine = active_engine();
    engine
        .place_tower(TowerKind::BalanceChecker, Position::new(200.0, 200.0))
        .unwrap();
    assert_eq!(engine.economy().funds, 440);

    assert_eq!(engine.upgrade_tower(Position::new(200.0, 200.0)), Ok(2));
    assert_eq!(engine.economy().funds, 380);
    assert_eq!(engine.upgrade_tower(Position::new(200.0, 200.0)), Ok(3));
    assert_eq!(engine.economy().funds, 260);
    assert_eq!(
        engine.upgrade_tower(Position::new(200.0, 200.0)),
        Err(PlacementError::MaxLevel)
    );
    assert_eq!(engine.economy().funds, 260);

    let snap = engine.snapshot();
    assert_eq!(snap.towers[0].level, 3);
    assert_eq!(snap.towers[0].upgrade_cost, None);
    assert_eq!(snap.towers[0].sell_value, 90);
}

#[test]
fn test_upgrade_needs_funds_and_a_tower() {
    let game = GameConfig {
        starting_funds: 100,
        ..GameConfig::default()
    };
    let mut engine = engine_with(game, vec![wave(vec![])]);
    engine.queue_command(PlayerCommand::StartGame);
    engine.tick();
    engine
        .place_tower(TowerKind::ExpiryScanner, Position::new(200.0, 200.0))
        .unwrap();
    assert_eq!(
        engine.upgrade_tower(Position::new(200.0, 200.0)),
        Err(PlacementError::InsufficientFunds {
            needed: 75,
            available: 25
        })
    );
    assert_eq!(
        engine.upgrade_tower(Position::new(500.0, 500.0)),
        Err(PlacementError::NoTower)
    );
}

#[test]
fn test_select_tower_drives_placement() {
    let mut engine = active_engine();
    engine.queue_commands([
        PlayerCommand::SelectTower {
            kind: TowerKind::BalanceChecker,
        },
        PlayerCommand::PlaceTower { x: 200.0, y: 200.0 },
    ]);
    let snap = engine.tick();
    assert_eq!(snap.selected_tower, TowerKind::BalanceChecker);
    assert_eq!(snap.towers[0].kind, TowerKind::BalanceChecker);
    assert_eq!(snap.funds, 440);
}

// ---- End conditions ----

#[test]
fn test_game_over_freezes_simulation() {
    let game = GameConfig {
        starting_core_hp: 1,
        ..GameConfig::default()
    };
    let mut engine = engine_with(game, vec![wave(vec![row("A", &[LOAN_OVERDUE_120D], 2)])]);
    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);
    let mut snap = engine.tick();
    for _ in 0..60 * 60 {
        snap = engine.tick();
        if snap.phase.is_over() {
            break;
        }
    }
    assert_eq!(snap.phase, GamePhase::Defeat);
    assert_eq!(snap.core_hp, 0);
    assert!(snap
        .events
        .iter()
        .any(|e| matches!(e, GameEvent::GameOver { won: false, .. })));

    let frozen = snap.time.tick;
    for _ in 0..10 {
        assert_eq!(engine.tick().time.tick, frozen);
    }

    engine.queue_command(PlayerCommand::ReturnToMenu);
    assert_eq!(engine.tick().phase, GamePhase::MainMenu);
    engine.queue_command(PlayerCommand::StartGame);
    let snap = engine.tick();
    assert_eq!(snap.phase, GamePhase::Active);
    assert_eq!(snap.core_hp, 1);
    assert_eq!(snap.current_wave, 0);
}

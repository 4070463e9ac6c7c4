//! End-to-end game scenarios driven only through commands and snapshots.

use merger_core::commands::PlayerCommand;
use merger_core::config::GameConfig;
use merger_core::data::{load_waves, ComposedSource, RowData, WaveData};
use merger_core::enums::{GamePhase, RejectReason, RoomCategory, TowerKind, WavePhase};
use merger_core::events::GameEvent;
use merger_core::flags::*;
use merger_core::state::GameStateSnapshot;
use merger_sim::{SimConfig, SimulationEngine};

const MAX_TICKS: usize = 60 * 60 * 5;

fn row(id: &str, flags: &[&str], severity: u32) -> RowData {
    RowData {
        id: id.into(),
        category: RoomCategory::Accounts,
        summary: format!("{id} summary"),
        flags: flags.iter().map(|f| f.to_string()).collect(),
        severity,
    }
}

fn single_wave(rows: Vec<RowData>) -> Vec<WaveData> {
    vec![WaveData { lane: 0, rows }]
}

fn place(kind: TowerKind, x: f32, y: f32) -> [PlayerCommand; 2] {
    [
        PlayerCommand::SelectTower { kind },
        PlayerCommand::PlaceTower { x, y },
    ]
}

/// Tick until the game ends, collecting every event along the way.
fn run_to_end(engine: &mut SimulationEngine) -> (GameStateSnapshot, Vec<GameEvent>) {
    let mut events = Vec::new();
    let mut snap = engine.tick();
    events.extend(snap.events.drain(..));
    for _ in 0..MAX_TICKS {
        if snap.phase.is_over() {
            break;
        }
        snap = engine.tick();
        events.extend(snap.events.iter().cloned());
    }
    assert!(snap.phase.is_over(), "game did not finish in time");
    (snap, events)
}

#[test]
fn cleaned_record_raises_readiness_by_twice_severity() {
    // "A" hashes to lane 0 (y = 100).
    let waves = single_wave(vec![row("A", &[DUPLICATE_LEGAL_ID, EXPIRED_LEGAL_ID], 9)]);
    let mut engine = SimulationEngine::new(SimConfig {
        game: GameConfig::default(),
        waves,
    });
    engine.queue_command(PlayerCommand::StartGame);
    engine.queue_commands(place(TowerKind::DuplicateDetector, 200.0, 60.0));
    engine.queue_commands(place(TowerKind::ExpiryScanner, 250.0, 140.0));
    engine.queue_command(PlayerCommand::StartWave);

    let (snap, events) = run_to_end(&mut engine);

    assert_eq!(snap.funds, 500 - 50 - 75);
    assert_eq!(snap.readiness, 18.0);
    assert_eq!(snap.issues_fixed, 1);
    assert_eq!(snap.core_hp, 100);
    assert_eq!(snap.phase, GamePhase::Defeat, "waves ran out below 100%");

    let resolved: Vec<(&str, TowerKind)> = events
        .iter()
        .filter_map(|e| match e {
            GameEvent::FlagResolved { flag, tower, .. } => Some((flag.as_str(), *tower)),
            _ => None,
        })
        .collect();
    assert_eq!(
        resolved,
        vec![
            (DUPLICATE_LEGAL_ID, TowerKind::DuplicateDetector),
            (EXPIRED_LEGAL_ID, TowerKind::ExpiryScanner),
        ]
    );
    assert!(events.contains(&GameEvent::EnemyCleaned { id: "A".into() }));
    assert!(events.contains(&GameEvent::EnemyArrived {
        id: "A".into(),
        clean: true,
        readiness_gain: 18.0,
        core_damage: 0,
    }));
}

#[test]
fn dirty_record_damages_core_by_half_severity() {
    let waves = single_wave(vec![row("A", &[LOAN_OVERDUE_120D], 6)]);
    let mut engine = SimulationEngine::new(SimConfig {
        game: GameConfig::default(),
        waves,
    });
    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);

    let (snap, events) = run_to_end(&mut engine);

    assert_eq!(snap.core_hp, 97);
    assert_eq!(snap.readiness, 0.0);
    assert_eq!(snap.enemies_arrived, 1);
    assert!(events.contains(&GameEvent::EnemyArrived {
        id: "A".into(),
        clean: false,
        readiness_gain: 0.0,
        core_damage: 3,
    }));
    assert!(events
        .iter()
        .any(|e| matches!(e, GameEvent::WaveCompleted { wave: 0 })));
}

#[test]
fn unaffordable_placement_changes_nothing() {
    let game = GameConfig {
        starting_funds: 40,
        ..GameConfig::default()
    };
    let mut engine = SimulationEngine::new(SimConfig {
        game,
        waves: single_wave(vec![row("A", &[], 1)]),
    });
    engine.queue_command(PlayerCommand::StartGame);
    engine.queue_commands(place(TowerKind::DuplicateDetector, 200.0, 60.0));
    let snap = engine.tick();

    assert_eq!(snap.funds, 40);
    assert!(snap.towers.is_empty());
    assert_eq!(
        snap.events,
        vec![GameEvent::CommandRejected {
            reason: RejectReason::InsufficientFunds
        }]
    );
}

#[test]
fn removal_refunds_flat_amount_not_sell_value() {
    let mut engine = SimulationEngine::new(SimConfig::default());
    engine.queue_command(PlayerCommand::StartGame);
    engine.queue_commands(place(TowerKind::DuplicateDetector, 200.0, 60.0));
    engine.queue_command(PlayerCommand::UpgradeTower { x: 200.0, y: 60.0 });
    let snap = engine.tick();
    assert_eq!(snap.funds, 400);
    assert_eq!(snap.towers[0].sell_value, 50);

    engine.queue_command(PlayerCommand::RemoveTower { x: 205.0, y: 65.0 });
    let snap = engine.tick();
    assert_eq!(snap.funds, 425);
    assert!(snap.towers.is_empty());
    assert!(snap.events.contains(&GameEvent::TowerRemoved {
        kind: TowerKind::DuplicateDetector,
        refund: 25,
    }));
}

#[test]
fn clean_records_win_the_game() {
    let rows = (0..5)
        .map(|i| row(&format!("CLEAN-{i}"), &[], 10))
        .collect();
    let mut engine = SimulationEngine::new(SimConfig {
        game: GameConfig::default(),
        waves: single_wave(rows),
    });
    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);

    let (snap, events) = run_to_end(&mut engine);

    assert_eq!(snap.phase, GamePhase::Victory);
    assert_eq!(snap.readiness, 100.0);
    assert_eq!(snap.issues_fixed, 5);
    assert!(events.contains(&GameEvent::GameOver {
        won: true,
        readiness: 100.0,
        issues_fixed: 5,
    }));
}

#[test]
fn core_destroyed_ends_game_before_waves_run_out() {
    let game = GameConfig {
        starting_core_hp: 3,
        ..GameConfig::default()
    };
    let waves = vec![
        WaveData {
            lane: 0,
            rows: vec![row("A", &[INTEREST_IN_ARREARS], 6)],
        },
        WaveData {
            lane: 1,
            rows: vec![row("B", &[INTEREST_IN_ARREARS], 6)],
        },
    ];
    let mut engine = SimulationEngine::new(SimConfig { game, waves });
    engine.queue_commands([PlayerCommand::StartGame, PlayerCommand::StartWave]);

    let (snap, _) = run_to_end(&mut engine);

    assert_eq!(snap.phase, GamePhase::Defeat);
    assert_eq!(snap.core_hp, 0);
    assert_eq!(snap.current_wave, 1, "second wave never started");
}

#[test]
fn composed_campaign_plays_out_consistently() {
    let waves = load_waves(&ComposedSource {
        seed: 7,
        record_count: 24,
        wave_count: 4,
        lane_count: 4,
    });
    let total_rows: usize = waves.iter().map(|w| w.rows.len()).sum();
    let mut engine = SimulationEngine::new(SimConfig {
        game: GameConfig::default(),
        waves,
    });
    engine.queue_command(PlayerCommand::StartGame);
    engine.queue_commands(place(TowerKind::DuplicateDetector, 200.0, 60.0));
    engine.queue_commands(place(TowerKind::ExpiryScanner, 200.0, 210.0));
    engine.queue_commands(place(TowerKind::BalanceChecker, 200.0, 360.0));
    engine.queue_commands(place(TowerKind::ArrearsRadar, 200.0, 510.0));

    let mut last: Option<GameStateSnapshot> = None;
    let mut spawned = 0usize;
    for _ in 0..MAX_TICKS {
        if let Some(prev) = &last {
            if prev.phase.is_over() {
                break;
            }
            if matches!(prev.wave_phase, WavePhase::Idle | WavePhase::Complete) {
                engine.queue_command(PlayerCommand::StartWave);
            }
        }
        let snap = engine.tick();
        spawned += snap
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::EnemySpawned { .. }))
            .count();
        if let Some(prev) = &last {
            assert!(snap.readiness >= prev.readiness, "readiness never drops");
            assert!(snap.core_hp <= prev.core_hp, "core never heals");
            assert!(snap.readiness <= 100.0);
        }
        assert_eq!(
            spawned,
            snap.enemies_arrived as usize + snap.enemies_remaining,
            "every spawned record is either live or arrived exactly once"
        );
        last = Some(snap);
    }

    let end = last.expect("at least one tick ran");
    assert!(end.phase.is_over());
    if end.phase == GamePhase::Defeat && end.core_hp > 0 {
        assert_eq!(spawned, total_rows, "waves exhausted means every row spawned");
    }
}

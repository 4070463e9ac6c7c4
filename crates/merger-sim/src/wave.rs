//! Wave sequencer: one wave at a time, Idle -> Spawning -> Draining -> Complete.

use thiserror::Error;

use merger_core::data::{RowData, WaveData};
use merger_core::enums::{RejectReason, WavePhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaveError {
    #[error("wave {index} out of range ({total} waves)")]
    OutOfRange { index: usize, total: usize },
    #[error("wave {index} is still running")]
    AlreadyRunning { index: usize },
}

impl WaveError {
    pub fn reason(&self) -> RejectReason {
        match self {
            WaveError::OutOfRange { .. } => RejectReason::NoMoreWaves,
            WaveError::AlreadyRunning { .. } => RejectReason::WaveInProgress,
        }
    }
}

/// Result of one sequencer update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WaveTick {
    /// Row dequeued this frame, if any.
    pub spawn: Option<RowData>,
    /// Index of the wave that completed this frame, if any.
    pub completed: Option<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct WaveSequencer {
    waves: Vec<WaveData>,
    phase: WavePhase,
    /// Most recently started wave.
    active: Option<usize>,
    next_row: usize,
    spawn_timer: f64,
    spawn_interval: f64,
}

impl WaveSequencer {
    pub fn new(waves: Vec<WaveData>, spawn_interval: f64) -> Self {
        Self {
            waves,
            phase: WavePhase::Idle,
            active: None,
            next_row: 0,
            spawn_timer: 0.0,
            spawn_interval,
        }
    }

    pub fn total_waves(&self) -> usize {
        self.waves.len()
    }

    pub fn phase(&self) -> WavePhase {
        self.phase
    }

    pub fn active_wave(&self) -> Option<usize> {
        self.active
    }

    /// Rows of the active wave not yet spawned.
    pub fn rows_remaining(&self) -> usize {
        self.active
            .and_then(|idx| self.waves.get(idx))
            .map(|w| w.rows.len().saturating_sub(self.next_row))
            .unwrap_or(0)
    }

    /// Begin spawning wave `index`. Rejected while another wave is running.
    pub fn start_wave(&mut self, index: usize) -> Result<(), WaveError> {
        if index >= self.waves.len() {
            return Err(WaveError::OutOfRange {
                index,
                total: self.waves.len(),
            });
        }
        if self.phase.is_running() {
            return Err(WaveError::AlreadyRunning {
                index: self.active.unwrap_or(index),
            });
        }
        self.active = Some(index);
        self.next_row = 0;
        self.spawn_timer = 0.0;
        self.phase = WavePhase::Spawning;
        Ok(())
    }

    /// Advance timers by `dt`. `live_enemies` is the live count before
    /// this call.
    pub fn advance(&mut self, dt: f64, live_enemies: usize) -> WaveTick {
        let mut tick = WaveTick::default();
        let Some(index) = self.active else {
            return tick;
        };
        let row_count = self.waves[index].rows.len();

        if self.phase == WavePhase::Spawning {
            if self.next_row < row_count {
                self.spawn_timer += dt;
                if self.spawn_timer >= self.spawn_interval {
                    self.spawn_timer = (self.spawn_timer - self.spawn_interval).max(0.0);
                    tick.spawn = Some(self.waves[index].rows[self.next_row].clone());
                    self.next_row += 1;
                }
            }
            if self.next_row >= row_count {
                self.phase = WavePhase::Draining;
            }
        }

        let live = live_enemies + usize::from(tick.spawn.is_some());
        if self.phase == WavePhase::Draining && live == 0 {
            self.phase = WavePhase::Complete;
            tick.completed = Some(index);
        }

        tick
    }

    /// The last wave has been started, all its rows spawned, and nothing
    /// is left alive.
    pub fn all_waves_complete(&self, live_enemies: usize) -> bool {
        let Some(last) = self.waves.len().checked_sub(1) else {
            return false;
        };
        self.active == Some(last)
            && matches!(self.phase, WavePhase::Draining | WavePhase::Complete)
            && live_enemies == 0
    }
}

/// Lane for a record: FNV-1a over the id bytes, modulo `lane_count`.
pub fn lane_for_id(id: &str, lane_count: usize) -> usize {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    if lane_count == 0 {
        return 0;
    }
    let hash = id.bytes().fold(OFFSET_BASIS, |state, byte| {
        (state ^ byte as u64).wrapping_mul(PRIME)
    });
    (hash % lane_count as u64) as usize
}

//! Funds, core health, readiness, and the arrival/end-of-game rules.

use merger_core::config::GameConfig;
use merger_core::constants::{READINESS_MAX, READINESS_PER_SEVERITY};

use crate::grid::PlacementError;

/// Running economy and score for one game.
#[derive(Debug, Clone, Default)]
pub struct Economy {
    pub funds: u32,
    pub core_hp: u32,
    pub max_core_hp: u32,
    /// 0.0 - 100.0, never decreases.
    pub readiness: f32,
    pub enemies_arrived: u32,
    pub issues_fixed: u32,
}

/// What one arrival did to the economy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrivalOutcome {
    pub clean: bool,
    /// Nominal gain (severity x 2), before the cap.
    pub readiness_gain: f32,
    pub core_damage: u32,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Victory,
    /// Core health reached zero.
    CoreDestroyed,
    /// Waves ran out before readiness reached 100.
    WavesExhausted,
}

impl Economy {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            funds: config.starting_funds,
            core_hp: config.starting_core_hp,
            max_core_hp: config.starting_core_hp,
            readiness: 0.0,
            enemies_arrived: 0,
            issues_fixed: 0,
        }
    }

    /// Apply a record reaching the core.
    pub fn record_arrival(&mut self, severity: u32, resolved: bool) -> ArrivalOutcome {
        self.enemies_arrived += 1;
        if resolved {
            let gain = severity as f32 * READINESS_PER_SEVERITY;
            self.readiness = (self.readiness + gain).min(READINESS_MAX);
            self.issues_fixed += 1;
            ArrivalOutcome {
                clean: true,
                readiness_gain: gain,
                core_damage: 0,
            }
        } else {
            let damage = (severity / 2).max(1);
            self.core_hp = self.core_hp.saturating_sub(damage);
            ArrivalOutcome {
                clean: false,
                readiness_gain: 0.0,
                core_damage: damage,
            }
        }
    }

    /// Deduct `cost`, or fail without touching funds.
    pub fn spend(&mut self, cost: u32) -> Result<(), PlacementError> {
        match self.funds.checked_sub(cost) {
            Some(left) => {
                self.funds = left;
                Ok(())
            }
            None => Err(PlacementError::InsufficientFunds {
                needed: cost,
                available: self.funds,
            }),
        }
    }

    pub fn refund(&mut self, amount: u32) {
        self.funds = self.funds.saturating_add(amount);
    }

    /// End-condition check, in priority order: victory, core destroyed,
    /// waves exhausted.
    pub fn verdict(&self, all_waves_complete: bool) -> Option<Verdict> {
        if self.readiness >= READINESS_MAX {
            Some(Verdict::Victory)
        } else if self.core_hp == 0 {
            Some(Verdict::CoreDestroyed)
        } else if all_waves_complete {
            Some(Verdict::WavesExhausted)
        } else {
            None
        }
    }
}

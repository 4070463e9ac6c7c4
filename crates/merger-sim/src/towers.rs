//! Tower variant table and per-variant behavior.
//!
//! The four variants differ only in data: base stats, which flags a shot
//! resolves, and how much extra an upgrade buys. Everything else (cooldown,
//! targeting, costs) is shared.

use merger_core::components::{IssueFlags, Tower};
use merger_core::constants::{UPGRADE_FIRE_RATE_FACTOR, UPGRADE_RANGE_FACTOR};
use merger_core::enums::TowerKind;
use merger_core::flags::*;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TowerSpec {
    pub kind: TowerKind,
    pub cost: u32,
    pub range: f32,
    pub fire_rate: f32,
    /// Flag a target must carry.
    pub primary_flag: &'static str,
    /// Also resolved on the same shot when present.
    pub secondary_flags: &'static [&'static str],
    /// Applied after the shared upgrade factor.
    pub upgrade_range_factor: f32,
    pub upgrade_fire_rate_factor: f32,
}

pub const TOWER_SPECS: [TowerSpec; 4] = [
    TowerSpec {
        kind: TowerKind::DuplicateDetector,
        cost: 50,
        range: 120.0,
        fire_rate: 1.5,
        primary_flag: DUPLICATE_LEGAL_ID,
        secondary_flags: &[DUPLICATE_CUSTOMER_ID],
        upgrade_range_factor: 1.3,
        upgrade_fire_rate_factor: 1.2,
    },
    TowerSpec {
        kind: TowerKind::ExpiryScanner,
        cost: 75,
        range: 100.0,
        fire_rate: 1.0,
        primary_flag: EXPIRED_LEGAL_ID,
        secondary_flags: &[PAST_MATURITY_NOT_CLOSED],
        upgrade_range_factor: 1.0,
        upgrade_fire_rate_factor: 1.4,
    },
    TowerSpec {
        kind: TowerKind::BalanceChecker,
        cost: 60,
        range: 90.0,
        fire_rate: 1.2,
        primary_flag: DORMANT_HIGH_BALANCE,
        secondary_flags: &[LOCKED_RATIO_GT25],
        upgrade_range_factor: 1.15,
        upgrade_fire_rate_factor: 1.3,
    },
    TowerSpec {
        kind: TowerKind::ArrearsRadar,
        cost: 80,
        range: 110.0,
        fire_rate: 0.8,
        primary_flag: LOAN_OVERDUE_120D,
        secondary_flags: &[INTEREST_IN_ARREARS],
        upgrade_range_factor: 1.25,
        upgrade_fire_rate_factor: 1.2,
    },
];

pub fn spec(kind: TowerKind) -> &'static TowerSpec {
    match kind {
        TowerKind::DuplicateDetector => &TOWER_SPECS[0],
        TowerKind::ExpiryScanner => &TOWER_SPECS[1],
        TowerKind::BalanceChecker => &TOWER_SPECS[2],
        TowerKind::ArrearsRadar => &TOWER_SPECS[3],
    }
}

/// A fresh level-1 tower of `kind`.
pub fn build_tower(kind: TowerKind, max_level: u32, serial: u64) -> Tower {
    let spec = spec(kind);
    Tower {
        kind,
        level: 1,
        max_level: max_level.max(1),
        range: spec.range,
        fire_rate: spec.fire_rate,
        cost: spec.cost,
        last_fire_secs: None,
        serial,
    }
}

/// Apply a shot to the target's flags. Returns the flags that were removed,
/// primary first.
pub fn on_fire(kind: TowerKind, flags: &mut IssueFlags) -> Vec<&'static str> {
    let spec = spec(kind);
    std::iter::once(spec.primary_flag)
        .chain(spec.secondary_flags.iter().copied())
        .filter(|flag| flags.remove(flag))
        .collect()
}

/// Level up in place. Range and fire rate compound by the shared factors,
/// then by the variant's own. Returns false at max level.
pub fn upgrade(tower: &mut Tower) -> bool {
    if !tower.can_upgrade() {
        return false;
    }
    let spec = spec(tower.kind);
    tower.level += 1;
    tower.range *= UPGRADE_RANGE_FACTOR;
    tower.fire_rate *= UPGRADE_FIRE_RATE_FACTOR;
    tower.range *= spec.upgrade_range_factor;
    tower.fire_rate *= spec.upgrade_fire_rate_factor;
    true
}

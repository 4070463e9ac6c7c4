//! Path-following movement.
//!
//! Each enemy walks toward its next waypoint. Within `threshold` of it the
//! waypoint index advances instead of moving, so enemies never jitter
//! around a waypoint. Also decays the resolve-flash timers.

use hecs::World;

use merger_core::components::{Enemy, FlashTimer, IssueFlags, PathFollower};
use merger_core::constants::{
    HEAVY_FLAGS_SPEED_FACTOR, HEAVY_FLAG_COUNT, HIGH_SEVERITY, HIGH_SEVERITY_SPEED_FACTOR,
};
use merger_core::types::Position;

/// Speed penalty for heavily flagged or severe records (multiplicative).
pub fn speed_multiplier(flag_count: usize, severity: u32) -> f32 {
    let mut multiplier = 1.0;
    if flag_count > HEAVY_FLAG_COUNT {
        multiplier *= HEAVY_FLAGS_SPEED_FACTOR;
    }
    if severity > HIGH_SEVERITY {
        multiplier *= HIGH_SEVERITY_SPEED_FACTOR;
    }
    multiplier
}

/// Move one step along the path.
pub fn advance(
    position: &mut Position,
    follower: &mut PathFollower,
    multiplier: f32,
    dt: f32,
    threshold: f32,
) {
    let Some(target) = follower.target() else {
        return;
    };
    let to_target = target - position.0;
    let distance = to_target.length();
    if distance <= threshold.max(f32::EPSILON) {
        follower.next_index += 1;
        return;
    }
    let step = (follower.speed * multiplier * dt).min(distance);
    position.0 += to_target / distance * step;
}

/// Move every enemy.
pub fn run(world: &mut World, dt: f64, threshold: f32) {
    for (_entity, (enemy, flags, position, follower)) in
        world.query_mut::<(&Enemy, &IssueFlags, &mut Position, &mut PathFollower)>()
    {
        let multiplier = speed_multiplier(flags.len(), enemy.severity);
        advance(position, follower, multiplier, dt as f32, threshold);
    }
}

/// Count down resolve-flash highlights.
pub fn decay_flash(world: &mut World, dt: f64) {
    for (_entity, flash) in world.query_mut::<&mut FlashTimer>() {
        flash.decay(dt);
    }
}

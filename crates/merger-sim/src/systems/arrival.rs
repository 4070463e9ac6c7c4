//! Arrival sweep: enemies past their last waypoint reach the core.
//!
//! Each arrival is applied to the economy exactly once and the entity is
//! despawned in the same pass.

use hecs::{Entity, World};

use merger_core::components::{Enemy, IssueFlags, PathFollower};
use merger_core::events::GameEvent;

use crate::economy::Economy;

/// Apply and despawn every arrived enemy, in spawn order.
/// Uses a pre-allocated buffer to avoid per-tick allocation.
pub fn run(
    world: &mut World,
    economy: &mut Economy,
    despawn_buffer: &mut Vec<Entity>,
    events: &mut Vec<GameEvent>,
) {
    despawn_buffer.clear();

    let mut arrived: Vec<(u64, Entity, String, u32, bool)> = world
        .query::<(&Enemy, &IssueFlags, &PathFollower)>()
        .iter()
        .filter(|(_, (_, _, follower))| follower.has_arrived())
        .map(|(entity, (enemy, flags, _))| {
            (
                enemy.serial,
                entity,
                enemy.id.clone(),
                enemy.severity,
                flags.is_resolved(),
            )
        })
        .collect();
    arrived.sort_by_key(|(serial, ..)| *serial);

    for (_, entity, id, severity, resolved) in arrived {
        let outcome = economy.record_arrival(severity, resolved);
        tracing::debug!(
            target: "merger::sim",
            id = %id,
            clean = outcome.clean,
            readiness = economy.readiness,
            core_hp = economy.core_hp,
            "enemy.arrived"
        );
        events.push(GameEvent::EnemyArrived {
            id,
            clean: outcome.clean,
            readiness_gain: outcome.readiness_gain,
            core_damage: outcome.core_damage,
        });
        despawn_buffer.push(entity);
    }

    for entity in despawn_buffer.drain(..) {
        let _ = world.despawn(entity);
    }
}

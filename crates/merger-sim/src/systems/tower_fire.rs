//! Tower targeting and firing.
//!
//! Runs before movement, so every tower sees enemy positions as of the
//! start of the frame. Towers fire in placement order; a flag removed by an
//! earlier tower this frame is already gone for later ones.

use hecs::{Entity, World};

use merger_core::components::{Enemy, FlashTimer, IssueFlags, Tower};
use merger_core::enums::TowerKind;
use merger_core::events::GameEvent;
use merger_core::types::Position;

use crate::towers;

/// One enemy as seen by the targeting scan.
#[derive(Debug, Clone, Copy)]
pub struct Candidate {
    pub entity: Entity,
    pub position: Position,
}

/// Nearest candidate within `range` that carries `flag` and is unresolved.
/// Ties go to the earliest candidate in iteration order.
pub fn find_target<'a, I>(origin: Position, range: f32, flag: &str, candidates: I) -> Option<Entity>
where
    I: IntoIterator<Item = (Candidate, &'a IssueFlags)>,
{
    let range_sq = range * range;
    let mut best: Option<(Entity, f32)> = None;
    for (candidate, flags) in candidates {
        if flags.is_resolved() || !flags.contains(flag) {
            continue;
        }
        let distance_sq = origin.distance_squared_to(&candidate.position);
        if distance_sq > range_sq {
            continue;
        }
        if best.map_or(true, |(_, best_sq)| distance_sq < best_sq) {
            best = Some((candidate.entity, distance_sq));
        }
    }
    best.map(|(entity, _)| entity)
}

/// Fire every ready tower at its best target.
pub fn run(world: &mut World, now_secs: f64, flash_duration: f64, events: &mut Vec<GameEvent>) {
    let mut candidates: Vec<(u64, Candidate)> = world
        .query::<(&Enemy, &Position)>()
        .iter()
        .map(|(entity, (enemy, position))| {
            (
                enemy.serial,
                Candidate {
                    entity,
                    position: *position,
                },
            )
        })
        .collect();
    candidates.sort_by_key(|(serial, _)| *serial);

    let mut tower_order: Vec<(u64, Entity)> = world
        .query::<&Tower>()
        .iter()
        .map(|(entity, tower)| (tower.serial, entity))
        .collect();
    tower_order.sort_by_key(|(serial, _)| *serial);

    for (_, tower_entity) in tower_order {
        let (kind, range, origin) = {
            let Ok(tower) = world.get::<&Tower>(tower_entity) else {
                continue;
            };
            if !tower.is_ready(now_secs) {
                continue;
            }
            let Ok(origin) = world.get::<&Position>(tower_entity) else {
                continue;
            };
            (tower.kind, tower.range, *origin)
        };

        let primary = towers::spec(kind).primary_flag;
        let target = {
            let flag_refs: Vec<_> = candidates
                .iter()
                .filter_map(|(_, c)| world.get::<&IssueFlags>(c.entity).ok().map(|f| (*c, f)))
                .collect();
            find_target(
                origin,
                range,
                primary,
                flag_refs.iter().map(|(c, f)| (*c, &**f)),
            )
        };
        let Some(target) = target else {
            continue;
        };

        fire(world, target, kind, flash_duration, events);
        if let Ok(mut tower) = world.get::<&mut Tower>(tower_entity) {
            tower.last_fire_secs = Some(now_secs);
        }
    }
}

fn fire(
    world: &World,
    target: Entity,
    kind: TowerKind,
    flash_duration: f64,
    events: &mut Vec<GameEvent>,
) {
    let Ok(mut flags) = world.get::<&mut IssueFlags>(target) else {
        return;
    };
    let removed = towers::on_fire(kind, &mut flags);
    if removed.is_empty() {
        return;
    }
    let id = world
        .get::<&Enemy>(target)
        .map(|e| e.id.clone())
        .unwrap_or_default();

    if let Ok(mut flash) = world.get::<&mut FlashTimer>(target) {
        flash.start(flash_duration);
    }
    for flag in removed {
        tracing::debug!(
            target: "merger::sim",
            id = %id,
            flag,
            tower = ?kind,
            "flag.resolved"
        );
        events.push(GameEvent::FlagResolved {
            id: id.clone(),
            flag: flag.to_string(),
            tower: kind,
        });
    }
    if flags.is_resolved() {
        events.push(GameEvent::EnemyCleaned { id });
    }
}

//! ECS systems that operate on the simulation world each tick.
//!
//! Systems are free functions over `&mut World` (or `&World` for read-only).
//! They do not own state; entity state lives in components, game-wide state
//! is passed in by the engine.

pub mod arrival;
pub mod movement;
pub mod snapshot;
pub mod tower_fire;
pub mod wave_spawner;

//! Headless runner for the migration-defense simulation.
//!
//! Wires the simulation crates to a realtime game loop thread and a
//! scripted autopilot used by the `merger` binary.

pub mod autoplay;
pub mod game_loop;
pub mod state;

pub use merger_core as core;

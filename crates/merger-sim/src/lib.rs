//! Simulation engine for the migration-defense game.
//!
//! Owns the hecs ECS world, runs systems once per frame,
//! and produces GameStateSnapshots for the UI.

pub mod economy;
pub mod engine;
pub mod grid;
pub mod systems;
pub mod towers;
pub mod wave;
pub mod world_setup;

pub use engine::{SimConfig, SimulationEngine};
pub use merger_core as core;

#[cfg(test)]
mod tests;

//! Core types and definitions for the migration-defense simulation.
//!
//! This crate defines the vocabulary shared across all other crates:
//! components, commands, state snapshots, events, constants, the game
//! configuration, and the wave data sources. It has no dependency on
//! threads or any runtime framework.

pub mod commands;
pub mod components;
pub mod config;
pub mod constants;
pub mod data;
pub mod enums;
pub mod events;
pub mod flags;
pub mod state;
pub mod types;

//! # Blastgrid Core
//!
//! Deterministic core simulation for a grid-arena bomb combat game: a
//! bordered tile maze, one bomb-placing player, wandering and chasing
//! enemies, blast propagation with chain reactions, and power-up items
//! hidden under breakable blocks.
//!
//! The crate is presentation-free. A frontend feeds
//! [`simulation::Simulation::advance`] a time step and the player's
//! commands, and renders from the returned [`events::TickEvents`] batch plus
//! the queryable state. All randomness flows through a single seeded RNG,
//! so a seed and a command script replay a match exactly.
//!
//! # Architecture
//!
//! - [`grid`]: tile matrix, walkability, map generation, position index
//! - [`entity`] / [`registry`]: typed entity records with ordered storage
//! - [`blast`]: pure blast-propagation geometry
//! - [`ai`]: per-tick enemy decisions
//! - [`config`]: difficulty presets and stage parameters
//! - [`simulation`]: the orchestrator driving the fixed-order tick phases
//!
//! # Example
//!
//! ```
//! use blastgrid_core::config::Difficulty;
//! use blastgrid_core::simulation::{PlayerAction, PlayerCommand, Simulation};
//!
//! let mut sim = Simulation::new(7, Difficulty::Normal);
//! sim.start_stage(1);
//!
//! let player = sim.players()[0];
//! let events = sim.advance(
//!     1.0 / 60.0,
//!     &[PlayerCommand { player, action: PlayerAction::PlaceBomb }],
//! );
//! assert_eq!(events.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]

pub mod ai;
pub mod blast;
pub mod config;
pub mod entity;
pub mod events;
pub mod grid;
pub mod registry;
mod resolver;
pub mod simulation;

#[cfg(test)]
mod tests;

pub use config::{Difficulty, TuningConfig};
pub use entity::{Entity, EntityId, EntityTag};
pub use events::{TickEvent, TickEvents};
pub use grid::{Direction, Grid, GridPosition};
pub use simulation::{PlayerAction, PlayerCommand, Simulation};

//! Test module for determinism and integration tests.
//!
//! - `determinism.rs`: same seed and command script reproduce a match
//! - `integration.rs`: end-to-end scenarios through `Simulation::advance`
//! - `helpers.rs`: scenario setup utilities

mod determinism;
mod helpers;

pub use helpers::*;

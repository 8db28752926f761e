//! Cross-module tests.
//!
//! - `determinism.rs`: same seed, same match
//! - `integration.rs`: whole-pipeline scenarios
//! - `helpers.rs`: setup and inspection utilities

mod helpers;

pub use helpers::*;

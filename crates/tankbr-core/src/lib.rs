//! # Tankbr Core
//!
//! Deterministic tank battle simulation for Tankbr.
//!
//! This crate runs one match: an entity store of typed attribute records,
//! a fixed pipeline of update stages over it, and the brains that steer
//! AI-controlled tanks. Rating, matchmaking and evolution live in
//! `tankbr-league`.
//!
//! ## Architecture
//!
//! - **World**: entity ids mapped to attribute records, one map per kind
//! - **Stages**: per-tick systems run in a fixed order over the world
//! - **Brains**: perception in, commands out, memory carried between ticks
//! - **Battle**: spawns a roster, runs the pipeline, reports scores
//!
//! ## Usage
//!
//! ```
//! use std::sync::Arc;
//! use tankbr_core::{Battle, Entrant, MatchConfig, Rotator, Sweeper};
//!
//! let config = MatchConfig {
//!     max_match_turns: 100,
//!     ..MatchConfig::default()
//! };
//! let roster = vec![
//!     Entrant::ai("Tank-0->rotator", Arc::new(Rotator)),
//!     Entrant::ai("Tank-1->fastRotator", Arc::new(Sweeper)),
//! ];
//! let outcome = Battle::new(config, roster, 1).unwrap().run();
//! assert_eq!(outcome.scores().len(), 2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod battle;
pub mod brain;
pub mod command;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod pipeline;
pub mod spawn;
pub mod stage;
pub mod world;

pub use battle::{Battle, BattleOutcome, Entrant, InputFrame, Steering};
pub use brain::{
    Brain, Dummy, DummyRotator, Memory, Monkey, Network, NeuralBrain, Perception, Rotator,
    Sweeper, Verdict, INITIAL_SCALE, NEURAL_SHAPE,
};
pub use command::{Command, Decision};
pub use config::MatchConfig;
pub use entity::{ComponentKind, ComponentMask, EntityId, PlayerCard};
pub use error::ConfigError;
pub use pipeline::Pipeline;
pub use stage::{EndReason, GameStatus};
pub use world::World;

#[cfg(test)]
mod tests;

//! Agent decision policies.
//!
//! A [`Brain`] maps what a tank perceives to the commands it issues. Brains
//! are shared (`Arc<dyn Brain>`) across every tank and every match that uses
//! them, so they hold no per-agent state: anything an agent must remember
//! between ticks travels through the [`Memory`] value the brain returns and
//! receives back on the next call.
//!
//! # Architecture
//!
//! ```text
//! TargetSensor ──► Perception ──► Brain::decide ──► Verdict
//!                                     ▲               │
//!                                     └── Memory ◄────┘
//! ```
//!
//! Randomness comes from the match RNG passed into `decide`, never from a
//! thread-local source, so a match replays identically from its seed.
//!
//! # Example
//!
//! ```
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//! use tankbr_core::brain::{Brain, Perception, Rotator};
//! use tankbr_core::command::Command;
//!
//! let brain = Rotator;
//! let mut rng = ChaCha8Rng::seed_from_u64(1);
//! let verdict = brain.decide(&Perception::blind(), None, &mut rng);
//! let decision = verdict.decision.unwrap();
//! assert_eq!(decision.commands, vec![Command::RotateTurret(3.0)]);
//! ```

mod network;
mod neural;
mod scripted;

use std::fmt;

use glam::Vec2;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::command::Decision;

pub use network::{Layer, Network};
pub use neural::{NeuralBrain, INITIAL_SCALE, NEURAL_SHAPE};
pub use scripted::{Dummy, DummyRotator, Monkey, Rotator, Sweeper};

/// What an agent knows when it decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    /// Nearest target on the turret laser, if any.
    pub target: Option<Vec2>,
}

impl Perception {
    /// Nothing in sight.
    #[must_use]
    pub const fn blind() -> Self {
        Self { target: None }
    }

    /// A target in sight at `position`.
    #[must_use]
    pub const fn sighted(position: Vec2) -> Self {
        Self {
            target: Some(position),
        }
    }
}

/// State an agent carries from one decision to the next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Memory {
    /// Turret sweep phase.
    Sweep {
        /// Sweeping at the fast rate.
        fast: bool,
        /// Ticks left in the current phase.
        ticks_to_change: u32,
    },
    /// A decision being repeated.
    Repeat {
        /// Further ticks to repeat it for.
        ticks_left: u32,
        /// The decision.
        decision: Decision,
    },
}

/// Output of one [`Brain::decide`] call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Verdict {
    /// New decision replacing the agent's queue, or `None` to keep it.
    pub decision: Option<Decision>,
    /// Memory to store for the next call.
    pub memory: Option<Memory>,
}

impl Verdict {
    /// A decision with no memory.
    #[must_use]
    pub fn act(decision: Decision) -> Self {
        Self {
            decision: Some(decision),
            memory: None,
        }
    }

    /// Attaches memory to this verdict.
    #[must_use]
    pub fn remember(mut self, memory: Memory) -> Self {
        self.memory = Some(memory);
        self
    }
}

/// Decision policy for one kind of agent.
///
/// Implementations must be deterministic given the same perception, memory
/// and RNG state.
pub trait Brain: Send + Sync + fmt::Debug {
    /// Short identifier used in player names and logs.
    fn kind(&self) -> &str;

    /// Chooses what to do this tick.
    fn decide(
        &self,
        perception: &Perception,
        memory: Option<Memory>,
        rng: &mut dyn RngCore,
    ) -> Verdict;

    /// The evolvable network behind this brain, if it has one.
    fn network(&self) -> Option<&Network> {
        None
    }
}

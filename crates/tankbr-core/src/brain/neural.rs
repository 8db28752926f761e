//! Brain driven by an evolvable [`Network`].

use std::sync::Arc;

use rand::{Rng, RngCore};

use super::{Brain, Memory, Network, Perception, Verdict};
use crate::command::{Command, Decision};
use crate::config::MatchConfig;

/// Inputs, two hidden layers, seven outputs.
pub const NEURAL_SHAPE: [usize; 4] = [2, 12, 8, 7];

/// Scale of the initial weight distribution.
pub const INITIAL_SCALE: f32 = 3.0;

const ACTIVATION_THRESHOLD: f32 = 0.5;

/// Agent whose every tick is one forward pass.
///
/// Inputs are a uniform random number and a target-visible flag. Outputs
/// above the threshold trigger: `[0]` fire, `[1]/[2]` forward/back,
/// `[3]/[4]` body left/right, `[5]/[6]` turret left/right. Each competing
/// pair resolves to the larger output.
#[derive(Debug, Clone)]
pub struct NeuralBrain {
    network: Arc<Network>,
    movement_speed: f32,
    rotation_speed: f32,
}

impl NeuralBrain {
    /// Wraps a network, taking command magnitudes from `config`.
    #[must_use]
    pub fn new(network: Arc<Network>, config: &MatchConfig) -> Self {
        Self {
            network,
            movement_speed: config.movement_speed,
            rotation_speed: config.rotation_speed,
        }
    }

    /// A fresh random network for the standard shape.
    #[must_use]
    pub fn seeded(seed: u64, config: &MatchConfig) -> Self {
        Self::new(
            Arc::new(Network::random(&NEURAL_SHAPE, seed, INITIAL_SCALE)),
            config,
        )
    }

    /// Shared handle to the network.
    #[must_use]
    pub fn shared_network(&self) -> Arc<Network> {
        Arc::clone(&self.network)
    }
}

/// `Some(+magnitude)` or `Some(-magnitude)` if either output fires.
fn pair(out: &[f32], positive: usize, negative: usize, magnitude: f32) -> Option<f32> {
    let (p, n) = (out.get(positive)?, out.get(negative)?);
    if *p > ACTIVATION_THRESHOLD || *n > ACTIVATION_THRESHOLD {
        Some(if p > n { magnitude } else { -magnitude })
    } else {
        None
    }
}

impl Brain for NeuralBrain {
    fn kind(&self) -> &str {
        "neural"
    }

    fn decide(
        &self,
        perception: &Perception,
        _memory: Option<Memory>,
        rng: &mut dyn RngCore,
    ) -> Verdict {
        let found = if perception.target.is_some() { 1.0 } else { 0.0 };
        let out = self.network.forward(&[rng.gen::<f32>(), found]);

        let mut commands = Vec::new();
        if out.first().is_some_and(|v| *v > ACTIVATION_THRESHOLD) {
            commands.push(Command::Fire);
        }
        if let Some(distance) = pair(&out, 1, 2, self.movement_speed) {
            commands.push(Command::Move(distance));
        }
        if let Some(angle) = pair(&out, 3, 4, self.rotation_speed) {
            commands.push(Command::Rotate(angle));
        }
        if let Some(angle) = pair(&out, 5, 6, self.rotation_speed) {
            commands.push(Command::RotateTurret(angle));
        }
        Verdict::act(Decision::once(commands))
    }

    fn network(&self) -> Option<&Network> {
        Some(&self.network)
    }
}

//! Feed-forward network used by evolvable agents.
//!
//! Weights live in plain row-major `Vec<f32>` buffers with an explicit
//! shape. Every layer uses ReLU. Breeding never edits a parent: crossover
//! and mutation produce a new network.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// One dense layer: `outputs x inputs` weights plus one bias per output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    inputs: usize,
    outputs: usize,
    /// Row `r` holds the weights feeding output `r`.
    weights: Vec<f32>,
    bias: Vec<f32>,
}

impl Layer {
    fn random(inputs: usize, outputs: usize, scale: f32, rng: &mut dyn RngCore) -> Self {
        let weights = (0..inputs * outputs)
            .map(|_| gaussian(rng) * scale)
            .collect();
        let bias = (0..outputs).map(|_| gaussian(rng) * scale).collect();
        Self {
            inputs,
            outputs,
            weights,
            bias,
        }
    }

    /// Number of inputs.
    #[must_use]
    pub const fn inputs(&self) -> usize {
        self.inputs
    }

    /// Number of outputs.
    #[must_use]
    pub const fn outputs(&self) -> usize {
        self.outputs
    }

    /// Row-major weights.
    #[must_use]
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Biases.
    #[must_use]
    pub fn bias(&self) -> &[f32] {
        &self.bias
    }

    fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .chunks(self.inputs.max(1))
            .zip(&self.bias)
            .map(|(row, b)| {
                let z: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum::<f32>() + b;
                z.max(0.0)
            })
            .collect()
    }

    fn same_shape(&self, other: &Self) -> bool {
        self.inputs == other.inputs && self.outputs == other.outputs
    }
}

/// Dense ReLU network with a lineage counter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Network {
    layers: Vec<Layer>,
    generation: u32,
}

impl Network {
    /// Builds a network for `shape` (input width first) with weights drawn
    /// from `N(0, 1) * scale`, reproducibly from `seed`.
    #[must_use]
    pub fn random(shape: &[usize], seed: u64, scale: f32) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let layers = shape
            .windows(2)
            .map(|pair| Layer::random(pair[0], pair[1], scale, &mut rng))
            .collect();
        Self {
            layers,
            generation: 0,
        }
    }

    /// Layer widths, input first.
    #[must_use]
    pub fn shape(&self) -> Vec<usize> {
        let mut shape: Vec<usize> = self.layers.first().map(Layer::inputs).into_iter().collect();
        shape.extend(self.layers.iter().map(Layer::outputs));
        shape
    }

    /// The layers, input side first.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Breeding depth: zero for a random network.
    #[must_use]
    pub const fn generation(&self) -> u32 {
        self.generation
    }

    /// Runs the network. Missing inputs read as zero; extra inputs are ignored.
    #[must_use]
    pub fn forward(&self, input: &[f32]) -> Vec<f32> {
        self.layers
            .iter()
            .fold(input.to_vec(), |activation, layer| layer.forward(&activation))
    }

    /// Mixes two parents row by row.
    ///
    /// For every parameter matrix (weights and bias separately) each output
    /// row is taken whole from one parent chosen by a fair coin. Layers whose
    /// shapes differ are taken from `self`.
    #[must_use]
    pub fn crossover(&self, other: &Self, rng: &mut dyn RngCore) -> Self {
        let layers = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, mine)| match other.layers.get(i) {
                Some(theirs) if mine.same_shape(theirs) => {
                    let row = mine.inputs.max(1);
                    let mut weights = Vec::with_capacity(mine.weights.len());
                    for (a, b) in mine.weights.chunks(row).zip(theirs.weights.chunks(row)) {
                        weights.extend_from_slice(if rng.gen::<bool>() { a } else { b });
                    }
                    let bias = mine
                        .bias
                        .iter()
                        .zip(&theirs.bias)
                        .map(|(a, b)| if rng.gen::<bool>() { *a } else { *b })
                        .collect();
                    Layer {
                        weights,
                        bias,
                        ..*mine
                    }
                }
                _ => mine.clone(),
            })
            .collect();

        Self {
            layers,
            generation: self.generation.max(other.generation),
        }
    }

    /// Scales each parameter, with probability `rate`, by `exp(N(0, scale))`.
    pub fn mutate(&mut self, rate: f64, scale: f32, rng: &mut dyn RngCore) {
        for layer in &mut self.layers {
            for value in layer.weights.iter_mut().chain(layer.bias.iter_mut()) {
                if rng.gen::<f64>() < rate {
                    *value *= (gaussian(rng) * scale).exp();
                }
            }
        }
    }

    /// Crossover followed by mutation; the child is one generation past the
    /// older parent.
    #[must_use]
    pub fn child(
        mother: &Self,
        father: &Self,
        rate: f64,
        scale: f32,
        rng: &mut dyn RngCore,
    ) -> Self {
        let mut child = mother.crossover(father, rng);
        child.mutate(rate, scale, rng);
        child.generation = mother.generation.max(father.generation) + 1;
        child
    }
}

/// Standard normal sample via Box-Muller.
fn gaussian(rng: &mut dyn RngCore) -> f32 {
    const TWO_PI: f32 = std::f32::consts::TAU;
    let u1 = rng.gen::<f32>().clamp(f32::MIN_POSITIVE, 1.0);
    let u2 = rng.gen::<f32>();
    (-2.0 * u1.ln()).sqrt() * (TWO_PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPE: [usize; 4] = [2, 12, 8, 7];

    #[test]
    fn random_builds_requested_shape() {
        let net = Network::random(&SHAPE, 1, 3.0);
        assert_eq!(net.shape(), SHAPE.to_vec());
        assert_eq!(net.layers()[0].weights().len(), 24);
        assert_eq!(net.layers()[2].bias().len(), 7);
        assert_eq!(net.generation(), 0);
    }

    #[test]
    fn same_seed_same_weights() {
        assert_eq!(Network::random(&SHAPE, 9, 3.0), Network::random(&SHAPE, 9, 3.0));
        assert_ne!(Network::random(&SHAPE, 9, 3.0), Network::random(&SHAPE, 10, 3.0));
    }

    #[test]
    fn outputs_are_non_negative() {
        let net = Network::random(&SHAPE, 3, 3.0);
        for input in [[0.0, 0.0], [0.5, 1.0], [1.0, 0.0]] {
            let out = net.forward(&input);
            assert_eq!(out.len(), 7);
            assert!(out.iter().all(|v| *v >= 0.0));
        }
    }

    #[test]
    fn crossover_rows_come_from_a_parent() {
        let mother = Network::random(&SHAPE, 1, 3.0);
        let father = Network::random(&SHAPE, 2, 3.0);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let child = mother.crossover(&father, &mut rng);

        for ((c, m), f) in child.layers().iter().zip(mother.layers()).zip(father.layers()) {
            let row = c.inputs();
            for ((cr, mr), fr) in c
                .weights()
                .chunks(row)
                .zip(m.weights().chunks(row))
                .zip(f.weights().chunks(row))
            {
                assert!(cr == mr || cr == fr);
            }
        }
    }

    #[test]
    fn zero_rate_mutation_is_identity() {
        let mut net = Network::random(&SHAPE, 4, 3.0);
        let before = net.clone();
        net.mutate(0.0, 0.05, &mut ChaCha8Rng::seed_from_u64(1));
        assert_eq!(net, before);
    }

    #[test]
    fn mutation_preserves_sign() {
        let mut net = Network::random(&SHAPE, 4, 3.0);
        let before = net.clone();
        net.mutate(1.0, 0.05, &mut ChaCha8Rng::seed_from_u64(1));
        for (a, b) in net.layers().iter().zip(before.layers()) {
            for (x, y) in a.weights().iter().zip(b.weights()) {
                assert!(x.signum() == y.signum() || *y == 0.0);
            }
        }
    }

    #[test]
    fn child_generation_follows_older_parent() {
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        let a = Network::random(&SHAPE, 1, 3.0);
        let b = Network::random(&SHAPE, 2, 3.0);
        let ab = Network::child(&a, &b, 0.1, 0.05, &mut rng);
        assert_eq!(ab.generation(), 1);
        let abb = Network::child(&ab, &b, 0.1, 0.05, &mut rng);
        assert_eq!(abb.generation(), 2);
    }

    #[test]
    fn gaussian_is_roughly_standard() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let n = 10_000;
        let samples: Vec<f32> = (0..n).map(|_| gaussian(&mut rng)).collect();
        let mean = samples.iter().sum::<f32>() / n as f32;
        let var = samples.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n as f32;
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.1, "variance {var}");
    }
}

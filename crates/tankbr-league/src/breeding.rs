//! Replacement networks for pruned players.
//!
//! Parents are drawn from the rated neural players, the better-ranked ones
//! more often: the best of `n` candidates weighs `n`, the worst weighs `1`.
//! With no parent available the league falls back to a fresh random network.

use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;
use tankbr_core::{MatchConfig, Network, NeuralBrain, INITIAL_SCALE, NEURAL_SHAPE};
use tracing::{debug, warn};

/// How a new network was produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lineage {
    /// Crossover of two distinct parents.
    Crossed,
    /// Mutated copy of the only available parent.
    Cloned,
    /// No parent available.
    Fresh,
}

/// Produces one network from `ranked_parents` (best first).
#[allow(clippy::cast_precision_loss)]
pub fn offspring(
    ranked_parents: &[&Network],
    mutation_rate: f64,
    mutation_scale: f32,
    rng: &mut impl Rng,
) -> (Network, Lineage) {
    let n = ranked_parents.len();
    let weighted: Vec<(usize, &Network)> = ranked_parents.iter().copied().enumerate().collect();

    let parents: Vec<&Network> =
        match weighted.choose_multiple_weighted(rng, 2, |(i, _)| (n - i) as f64) {
            Ok(picked) => picked.map(|(_, net)| *net).collect(),
            Err(error) => {
                warn!(%error, "parent draw failed, using the top of the ranking");
                ranked_parents.iter().take(2).copied().collect()
            }
        };

    match parents.as_slice() {
        [mother, father, ..] => (
            Network::child(mother, father, mutation_rate, mutation_scale, rng),
            Lineage::Crossed,
        ),
        [only] => (
            Network::child(only, only, mutation_rate, mutation_scale, rng),
            Lineage::Cloned,
        ),
        [] => (
            Network::random(&NEURAL_SHAPE, rng.gen(), INITIAL_SCALE),
            Lineage::Fresh,
        ),
    }
}

/// A playable brain bred from `ranked_parents`.
pub fn breed_brain(
    ranked_parents: &[&Network],
    mutation_rate: f64,
    mutation_scale: f32,
    game: &MatchConfig,
    rng: &mut impl Rng,
) -> NeuralBrain {
    let (network, lineage) = offspring(ranked_parents, mutation_rate, mutation_scale, rng);
    debug!(?lineage, generation = network.generation(), "bred network");
    NeuralBrain::new(Arc::new(network), game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn network(seed: u64) -> Network {
        Network::random(&NEURAL_SHAPE, seed, INITIAL_SCALE)
    }

    #[test]
    fn no_parents_gives_a_fresh_network() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (child, lineage) = offspring(&[], 0.5, 0.1, &mut rng);
        assert_eq!(lineage, Lineage::Fresh);
        assert_eq!(child.generation(), 0);
        assert_eq!(child.shape(), NEURAL_SHAPE.to_vec());
    }

    #[test]
    fn single_parent_is_cloned_one_generation_on() {
        let parent = network(2);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (child, lineage) = offspring(&[&parent], 0.0, 0.1, &mut rng);
        assert_eq!(lineage, Lineage::Cloned);
        assert_eq!(child.generation(), 1);
        assert_eq!(child.layers(), parent.layers());
    }

    #[test]
    fn two_parents_are_crossed() {
        let (a, b) = (network(3), network(4));
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let (child, lineage) = offspring(&[&a, &b], 0.8, 0.1, &mut rng);
        assert_eq!(lineage, Lineage::Crossed);
        assert_eq!(child.generation(), 1);
        assert_eq!(child.shape(), a.shape());
    }

    #[test]
    fn breeding_is_seeded() {
        let parents: Vec<Network> = (0..5).map(network).collect();
        let refs: Vec<&Network> = parents.iter().collect();
        let run = |seed| offspring(&refs, 0.8, 0.1, &mut ChaCha8Rng::seed_from_u64(seed)).0;
        assert_eq!(run(7).layers(), run(7).layers());
    }

    #[test]
    fn bred_brain_is_neural() {
        use tankbr_core::Brain;
        let parent = network(5);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let brain = breed_brain(&[&parent], 0.8, 0.1, &MatchConfig::default(), &mut rng);
        assert_eq!(brain.kind(), "neural");
        assert_eq!(brain.network().map(Network::generation), Some(1));
    }
}

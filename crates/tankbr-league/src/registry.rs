//! The authoritative list of competitors.
//!
//! The registry hands out [`PlayerId`]s, generates the starting population,
//! and applies the round-end prune. Everything else (matchmaking, rating,
//! breeding) reads players through [`Registry::fetch_players`] and writes back
//! through [`Registry::get_mut`] or [`Registry::add`].

use std::cmp::Ordering;
use std::sync::Arc;

use rand::Rng;
use tankbr_core::{Brain, Dummy, DummyRotator, MatchConfig, Monkey, NeuralBrain, Rotator, Sweeper};
use tracing::debug;

use crate::player::{PlayerId, PlayerRecord};

/// Name given to the host-steered player.
pub const HUMAN_NAME: &str = "<<Player>>";

/// Best first; unrated players last; ties keep registry order.
fn by_rank(a: &PlayerRecord, b: &PlayerRecord) -> Ordering {
    match (a.rank(), b.rank()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Players across the whole tournament.
#[derive(Debug, Default)]
pub struct Registry {
    players: Vec<PlayerRecord>,
    next_id: u64,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Next unused identity.
    pub fn allocate_id(&mut self) -> PlayerId {
        let id = PlayerId::new(self.next_id);
        self.next_id += 1;
        id
    }

    /// Builds `number` players cycling through the brain roster.
    ///
    /// The roster is the five scripted brains followed by one neural brain
    /// per remaining slot; player `i` gets roster entry `i % roster_len` and
    /// the name `Tank-{i}->{brain}`, neural brains named by their index.
    /// With `include_human`, slot 0 is the host-steered player instead.
    /// Neural networks are seeded from `rng`.
    pub fn generate_players(
        &mut self,
        number: usize,
        include_human: bool,
        config: &MatchConfig,
        rng: &mut impl Rng,
    ) -> Vec<PlayerRecord> {
        let scripted: [(&str, Arc<dyn Brain>); 5] = [
            ("monkey", Arc::new(Monkey)),
            ("dummy", Arc::new(Dummy)),
            ("dummyRotator", Arc::new(DummyRotator)),
            ("rotator", Arc::new(Rotator)),
            ("fastRotator", Arc::new(Sweeper)),
        ];
        let mut roster: Vec<(String, Arc<dyn Brain>)> = scripted
            .into_iter()
            .map(|(name, brain)| (name.to_owned(), brain))
            .collect();
        for j in 0..number.saturating_sub(roster.len()) {
            let brain: Arc<dyn Brain> = Arc::new(NeuralBrain::seeded(rng.gen(), config));
            roster.push((j.to_string(), brain));
        }

        (0..number)
            .map(|i| {
                let id = self.allocate_id();
                if include_human && i == 0 {
                    PlayerRecord::new(id, HUMAN_NAME, None)
                } else {
                    let (brain_name, brain) = &roster[i % roster.len()];
                    PlayerRecord::new(
                        id,
                        format!("Tank-{i}->{brain_name}"),
                        Some(Arc::clone(brain)),
                    )
                }
            })
            .collect()
    }

    /// Replaces the population.
    pub fn set_players(&mut self, players: Vec<PlayerRecord>) {
        self.players = players;
    }

    /// Adds one player.
    pub fn add(&mut self, player: PlayerRecord) {
        self.players.push(player);
    }

    /// Every player; best conservative rank first when `sorted`.
    #[must_use]
    pub fn fetch_players(&self, sorted: bool) -> Vec<&PlayerRecord> {
        let mut players: Vec<&PlayerRecord> = self.players.iter().collect();
        if sorted {
            players.sort_by(|a, b| by_rank(a, b));
        }
        players
    }

    /// Players matching `predicate`, in registry order.
    pub fn fetch_where(&self, predicate: impl Fn(&PlayerRecord) -> bool) -> Vec<&PlayerRecord> {
        self.players.iter().filter(|p| predicate(p)).collect()
    }

    /// Looks up a player.
    #[must_use]
    pub fn get(&self, id: PlayerId) -> Option<&PlayerRecord> {
        self.players.iter().find(|p| p.id == id)
    }

    /// Looks up a player for update.
    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut PlayerRecord> {
        self.players.iter_mut().find(|p| p.id == id)
    }

    /// Population size.
    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    /// True when nobody is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    /// Removes confidently bad players.
    ///
    /// Only the bottom `floor(len * quantile)` of the ranking is considered,
    /// and of those only players whose uncertainty is below `min_sigma`.
    /// Unrated players are never removed. Returns the removed records.
    pub fn remove_worst_players(&mut self, quantile: f64, min_sigma: f64) -> Vec<PlayerRecord> {
        #[allow(
            clippy::cast_possible_truncation,
            clippy::cast_sign_loss,
            clippy::cast_precision_loss
        )]
        let considered = ((self.players.len() as f64) * quantile.clamp(0.0, 1.0)).floor() as usize;

        let doomed: Vec<PlayerId> = self
            .fetch_players(true)
            .into_iter()
            .rev()
            .take(considered)
            .filter(|p| p.sigma().is_some_and(|sigma| sigma < min_sigma))
            .map(|p| p.id)
            .collect();

        let (removed, kept) = std::mem::take(&mut self.players)
            .into_iter()
            .partition(|p| doomed.contains(&p.id));
        self.players = kept;

        debug!(
            considered,
            removed = doomed.len(),
            remaining = self.players.len(),
            "pruned population"
        );
        removed
    }
}

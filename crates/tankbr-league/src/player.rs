//! League-level player records.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tankbr_core::{Brain, Network};

use crate::rating::Rating;

/// Stable identity of a player across rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u64);

impl PlayerId {
    /// Wraps a raw id.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A competitor as the registry sees it.
#[derive(Debug, Clone)]
pub struct PlayerRecord {
    /// Registry-assigned identity.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// `None` for the host-steered player.
    pub brain: Option<Arc<dyn Brain>>,
    /// Score from the last match; reset once it has been rated.
    pub score: f64,
    /// Skill belief; `None` until the first rated match.
    pub rating: Option<Rating>,
    /// Matches rated so far.
    pub games_played: u32,
}

impl PlayerRecord {
    /// A fresh, unrated player.
    #[must_use]
    pub fn new(id: PlayerId, name: impl Into<String>, brain: Option<Arc<dyn Brain>>) -> Self {
        Self {
            id,
            name: name.into(),
            brain,
            score: 0.0,
            rating: None,
            games_played: 0,
        }
    }

    /// Conservative skill estimate, `None` while unrated.
    #[must_use]
    pub fn rank(&self) -> Option<f64> {
        self.rating.map(|rating| rating.conservative())
    }

    /// Rating uncertainty, `None` while unrated.
    #[must_use]
    pub fn sigma(&self) -> Option<f64> {
        self.rating.map(|rating| rating.sigma)
    }

    /// Evolvable parameters, if the brain has any.
    #[must_use]
    pub fn network(&self) -> Option<&Network> {
        self.brain.as_deref().and_then(|brain| brain.network())
    }

    /// Breeding depth of the network, `None` for fixed brains.
    #[must_use]
    pub fn generation(&self) -> Option<u32> {
        self.network().map(Network::generation)
    }

    /// True for the host-steered player.
    #[must_use]
    pub fn is_human(&self) -> bool {
        self.brain.is_none()
    }

    /// Serializable summary for reports.
    #[must_use]
    pub fn standing(&self) -> Standing {
        Standing {
            id: self.id,
            name: self.name.clone(),
            kind: self
                .brain
                .as_deref()
                .map_or_else(|| "human".to_owned(), |brain| brain.kind().to_owned()),
            rating: self.rating,
            rank: self.rank(),
            games_played: self.games_played,
            generation: self.generation(),
        }
    }
}

/// Snapshot of a player for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// Registry identity.
    pub id: PlayerId,
    /// Display name.
    pub name: String,
    /// Brain kind, or `"human"`.
    pub kind: String,
    /// Skill belief.
    pub rating: Option<Rating>,
    /// Conservative estimate.
    pub rank: Option<f64>,
    /// Matches rated.
    pub games_played: u32,
    /// Network lineage depth.
    pub generation: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankbr_core::{MatchConfig, NeuralBrain, Rotator};

    #[test]
    fn unrated_player_has_no_rank() {
        let p = PlayerRecord::new(PlayerId::new(1), "a", Some(Arc::new(Rotator)));
        assert_eq!(p.rank(), None);
        assert_eq!(p.sigma(), None);
        assert!(p.network().is_none());
        assert!(!p.is_human());
    }

    #[test]
    fn rank_is_conservative_estimate() {
        let mut p = PlayerRecord::new(PlayerId::new(1), "a", None);
        p.rating = Some(Rating::new(30.0, 2.0));
        assert_eq!(p.rank(), Some(24.0));
        assert!(p.is_human());
        assert_eq!(p.standing().kind, "human");
    }

    #[test]
    fn neural_player_exposes_network() {
        let brain = NeuralBrain::seeded(3, &MatchConfig::default());
        let p = PlayerRecord::new(PlayerId::new(2), "n", Some(Arc::new(brain)));
        assert_eq!(p.generation(), Some(0));
        assert_eq!(p.standing().kind, "neural");
    }
}

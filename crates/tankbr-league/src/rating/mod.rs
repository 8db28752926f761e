//! TrueSkill-style skill rating.
//!
//! Every player carries a Gaussian belief about its skill: mean `mu` and
//! uncertainty `sigma`. After a match the finishing order is turned into a
//! chain of head-to-head results between neighbours in the ranking (first vs
//! second, second vs third, ...) and each result nudges both beliefs with the
//! two-player TrueSkill update. Players with equal scores draw.
//!
//! The conservative rank `mu - 3 * sigma` is what the league sorts by: a
//! player only climbs once the system is fairly sure it is good.
//!
//! # Example
//!
//! ```
//! use tankbr_league::rating::{ranks_from_scores, TrueSkill};
//!
//! let env = TrueSkill::default();
//! let before = [env.create_rating(), env.create_rating()];
//! let after = env.rate(&before, &ranks_from_scores(&[5.0, 1.0]));
//! assert!(after[0].mu > before[0].mu);
//! assert!(after[1].mu < before[1].mu);
//! assert!(after[0].sigma < before[0].sigma);
//! ```

mod gaussian;

use serde::{Deserialize, Serialize};

pub use gaussian::{cdf, pdf, ppf};

/// Belief about one player's skill.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Estimated skill.
    pub mu: f64,
    /// Uncertainty of the estimate.
    pub sigma: f64,
}

impl Rating {
    /// A rating with the given mean and uncertainty.
    #[must_use]
    pub const fn new(mu: f64, sigma: f64) -> Self {
        Self { mu, sigma }
    }

    /// Skill the player very likely exceeds: `mu - 3 * sigma`.
    #[must_use]
    pub fn conservative(&self) -> f64 {
        self.mu - 3.0 * self.sigma
    }
}

/// Rating environment.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrueSkill {
    /// Initial mean.
    pub mu: f64,
    /// Initial uncertainty.
    pub sigma: f64,
    /// Performance noise: skill gap giving roughly 76% win chance.
    pub beta: f64,
    /// Uncertainty added before every match so ratings can keep moving.
    pub tau: f64,
    /// Chance that two equal players draw.
    pub draw_probability: f64,
}

impl Default for TrueSkill {
    fn default() -> Self {
        let sigma = 25.0 / 3.0;
        Self {
            mu: 25.0,
            sigma,
            beta: sigma / 2.0,
            tau: sigma / 100.0,
            draw_probability: 0.10,
        }
    }
}

impl TrueSkill {
    /// Rating for a newcomer.
    #[must_use]
    pub const fn create_rating(&self) -> Rating {
        Rating::new(self.mu, self.sigma)
    }

    /// Performance gap below which a head-to-head counts as a draw.
    #[must_use]
    pub fn draw_margin(&self) -> f64 {
        ppf((self.draw_probability + 1.0) / 2.0) * 2.0_f64.sqrt() * self.beta
    }

    /// Updates `ratings` from one match.
    ///
    /// `ranks[i]` is player `i`'s finishing position, lower is better; equal
    /// positions are draws. Neighbours in finishing order are rated head to
    /// head against the pre-match beliefs and the corrections are summed.
    /// Slices of different lengths are truncated to the shorter.
    #[must_use]
    pub fn rate(&self, ratings: &[Rating], ranks: &[usize]) -> Vec<Rating> {
        let n = ratings.len().min(ranks.len());
        let prior: Vec<Rating> = ratings[..n]
            .iter()
            .map(|r| Rating::new(r.mu, (r.sigma * r.sigma + self.tau * self.tau).sqrt()))
            .collect();

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by_key(|&i| ranks[i]);

        let mut mean_shift = vec![0.0; n];
        let mut variance_scale = vec![1.0; n];
        let margin = self.draw_margin();

        for pair in order.windows(2) {
            let (hi, lo) = (pair[0], pair[1]);
            let (a, b) = (prior[hi], prior[lo]);
            let (var_a, var_b) = (a.sigma * a.sigma, b.sigma * b.sigma);
            let c2 = 2.0 * self.beta * self.beta + var_a + var_b;
            let c = c2.sqrt();
            let t = (a.mu - b.mu) / c;
            let epsilon = margin / c;

            let (v, w) = if ranks[hi] == ranks[lo] {
                (gaussian::v_draw(t, epsilon), gaussian::w_draw(t, epsilon))
            } else {
                (gaussian::v_win(t, epsilon), gaussian::w_win(t, epsilon))
            };

            mean_shift[hi] += var_a / c * v;
            mean_shift[lo] -= var_b / c * v;
            variance_scale[hi] *= 1.0 - var_a / c2 * w;
            variance_scale[lo] *= 1.0 - var_b / c2 * w;
        }

        prior
            .iter()
            .enumerate()
            .map(|(i, r)| {
                Rating::new(
                    r.mu + mean_shift[i],
                    (r.sigma * r.sigma * variance_scale[i]).sqrt(),
                )
            })
            .collect()
    }
}

/// Finishing positions from scores: the best score is 0 and equal scores
/// share a position. A NaN score finishes last.
///
/// ```
/// use tankbr_league::rating::ranks_from_scores;
///
/// assert_eq!(ranks_from_scores(&[1.0, 3.0, 1.0, 2.0]), vec![2, 0, 2, 1]);
/// ```
#[must_use]
pub fn ranks_from_scores(scores: &[f64]) -> Vec<usize> {
    let key = |i: usize| {
        let score = scores[i];
        if score.is_nan() {
            f64::NEG_INFINITY
        } else {
            score
        }
    };

    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| key(b).total_cmp(&key(a)));

    let mut ranks = vec![0; scores.len()];
    for (position, &index) in order.iter().enumerate() {
        ranks[index] = match position.checked_sub(1).map(|p| order[p]) {
            Some(prev) if key(prev).total_cmp(&key(index)).is_eq() => ranks[prev],
            _ => position,
        };
    }
    ranks
}

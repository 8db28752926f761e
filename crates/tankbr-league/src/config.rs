//! Tournament settings.
//!
//! [`LeagueConfig`] wraps the per-match [`MatchConfig`] with the settings of
//! the outer loop: population, rounds, matchmaking spread and the selection
//! pressure applied between rounds. Like the match constants it is a plain
//! `serde` value, loaded once and validated before the first round.
//!
//! # Example
//!
//! ```
//! use tankbr_league::config::LeagueConfig;
//!
//! let json = r#"{ "players": 12, "match_size": 4, "game": { "ammo": 5 } }"#;
//! let config: LeagueConfig = serde_json::from_str(json).unwrap();
//! assert_eq!(config.game.ammo, 5);
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};
use tankbr_core::MatchConfig;

use crate::error::LeagueError;

/// Settings for a whole tournament.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeagueConfig {
    /// Rounds to play.
    pub rounds: u32,
    /// Initial population size.
    pub players: usize,
    /// Tanks per match.
    pub match_size: usize,
    /// Width of the matchmaking window in multiples of `match_size`.
    /// `1` groups neighbours in the ranking without sampling.
    pub matching_spread: usize,
    /// Give slot 0 to a host-steered tank.
    pub include_human_player: bool,
    /// Seed for the tournament stream.
    pub seed: u64,
    /// Only players rated at least this confidently (σ below it) may be removed.
    pub gen_min_sigma: f64,
    /// Fraction of the population, from the bottom, considered for removal.
    pub gen_worst_quantile: f64,
    /// Chance that each bred weight is perturbed.
    pub mutation_rate: f64,
    /// Standard deviation of the log-normal weight perturbation.
    pub mutation_scale: f32,
    /// Constants for every match.
    pub game: MatchConfig,
}

impl Default for LeagueConfig {
    fn default() -> Self {
        Self {
            rounds: 20,
            players: 20,
            match_size: 5,
            matching_spread: 2,
            include_human_player: false,
            seed: 0x7A4B_B12E,
            gen_min_sigma: 4.0,
            gen_worst_quantile: 0.2,
            mutation_rate: 0.8,
            mutation_scale: 0.1,
            game: MatchConfig::default(),
        }
    }
}

impl LeagueConfig {
    /// Checks that a tournament can run with these settings.
    ///
    /// # Errors
    ///
    /// Returns the first offending setting, or the match constants' own error.
    pub fn validate(&self) -> Result<(), LeagueError> {
        self.game.validate()?;

        if self.match_size < 2 {
            return Err(LeagueError::MatchTooSmall(self.match_size));
        }
        if self.players < self.match_size {
            return Err(LeagueError::NotEnoughPlayers {
                players: self.players,
                match_size: self.match_size,
            });
        }
        if self.matching_spread == 0 {
            return Err(LeagueError::OutOfRange {
                field: "matching_spread",
                range: "[1, ∞)",
                value: 0.0,
            });
        }

        for (field, value) in [
            ("gen_worst_quantile", self.gen_worst_quantile),
            ("mutation_rate", self.mutation_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(LeagueError::OutOfRange {
                    field,
                    range: "[0, 1]",
                    value,
                });
            }
        }
        if !self.gen_min_sigma.is_finite() || self.gen_min_sigma < 0.0 {
            return Err(LeagueError::OutOfRange {
                field: "gen_min_sigma",
                range: "[0, ∞)",
                value: self.gen_min_sigma,
            });
        }
        if !self.mutation_scale.is_finite() || self.mutation_scale < 0.0 {
            return Err(LeagueError::OutOfRange {
                field: "mutation_scale",
                range: "[0, ∞)",
                value: f64::from(self.mutation_scale),
            });
        }
        Ok(())
    }
}

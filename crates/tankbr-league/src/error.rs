//! Error types for tournament setup.

use tankbr_core::ConfigError;
use thiserror::Error;

/// A tournament that cannot be run as configured.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LeagueError {
    /// The per-match constants are invalid.
    #[error("invalid match configuration: {0}")]
    Match(#[from] ConfigError),

    /// Matches need at least two tanks.
    #[error("`match_size` must be at least 2, got {0}")]
    MatchTooSmall(usize),

    /// The population cannot fill a single match.
    #[error("{players} players cannot fill a match of {match_size}")]
    NotEnoughPlayers {
        /// Population size.
        players: usize,
        /// Tanks per match.
        match_size: usize,
    },

    /// A numeric setting lies outside its allowed range.
    #[error("`{field}` must be in {range}, got {value}")]
    OutOfRange {
        /// Offending field name.
        field: &'static str,
        /// Human-readable allowed range.
        range: &'static str,
        /// Supplied value.
        value: f64,
    },
}

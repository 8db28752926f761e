//! # Tankbr League
//!
//! Tournaments over [`tankbr_core`] matches.
//!
//! A population of scripted and neural players is split into matches every
//! round. Match scores become TrueSkill-style ratings, players the league is
//! confident are bad get removed, and the best neural players breed their
//! replacements.
//!
//! ## Architecture
//!
//! - **Registry**: the population, ranking and pruning
//! - **Matchmaking**: ranked population into match groups
//! - **Rating**: Gaussian skill beliefs updated from finishing order
//! - **Breeding**: crossover and mutation of the best networks
//! - **Tournament**: the round loop tying them together
//!
//! ## Usage
//!
//! ```
//! use tankbr_league::{LeagueConfig, Tournament};
//!
//! let mut config = LeagueConfig {
//!     rounds: 2,
//!     players: 6,
//!     match_size: 3,
//!     ..LeagueConfig::default()
//! };
//! config.game.max_match_turns = 50;
//!
//! let mut tournament = Tournament::new(config).unwrap();
//! let reports = tournament.run().unwrap();
//! assert_eq!(reports.len(), 2);
//! assert_eq!(tournament.standings().len(), 6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod breeding;
pub mod config;
pub mod error;
pub mod matchmaking;
pub mod player;
pub mod rating;
pub mod registry;
pub mod tournament;

pub use config::LeagueConfig;
pub use error::LeagueError;
pub use player::{PlayerId, PlayerRecord, Standing};
pub use rating::{Rating, TrueSkill};
pub use registry::Registry;
pub use tournament::{MatchReport, RoundReport, Tournament};

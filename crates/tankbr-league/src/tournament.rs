//! The outer loop: match, rate, prune, breed.
//!
//! # Architecture
//!
//! A round is a strict barrier:
//!
//! 1. The registry is ranked and split into groups by [`make_groups`].
//! 2. Every group gets a seed from the tournament stream, in group order.
//! 3. Matches run in parallel on the `rayon` pool. Each one is a
//!    self-contained [`Battle`] with its own generator, so thread scheduling
//!    never changes an outcome.
//! 4. Results are applied in group order: score orderings feed the rating
//!    update, then match scores are cleared.
//! 5. Confidently bad players are removed and replaced by offspring of the
//!    rated neural survivors.
//!
//! A single [`LeagueConfig::seed`] therefore reproduces the whole tournament.

use std::sync::Arc;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tankbr_core::{Battle, BattleOutcome, EndReason, Entrant, Network};
use tracing::{debug, info, info_span};

use crate::breeding::breed_brain;
use crate::config::LeagueConfig;
use crate::error::LeagueError;
use crate::matchmaking::make_groups;
use crate::player::{PlayerId, PlayerRecord, Standing};
use crate::rating::{ranks_from_scores, Rating, TrueSkill};
use crate::registry::Registry;

/// One match as seen from the league.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchReport {
    /// Participants in roster order.
    pub players: Vec<PlayerId>,
    /// Seed the match ran with.
    pub seed: u64,
    /// Why it ended.
    pub reason: EndReason,
    /// Ticks played.
    pub ticks: u64,
    /// Final scores, parallel to `players`.
    pub scores: Vec<f64>,
}

/// Summary of one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    /// 1-based round number.
    pub round: u32,
    /// Every match played, in group order.
    pub matches: Vec<MatchReport>,
    /// Players without a group this round.
    pub sat_out: usize,
    /// Names of the players removed after rating.
    pub removed: Vec<String>,
    /// Population after breeding.
    pub population: usize,
    /// Top of the ranking after the round.
    pub leader: Option<Standing>,
}

/// A roster ready to play.
struct Fixture {
    players: Vec<PlayerId>,
    entrants: Vec<Entrant>,
    seed: u64,
}

fn entrant(player: &PlayerRecord) -> Entrant {
    match &player.brain {
        Some(brain) => Entrant::ai(player.name.clone(), Arc::clone(brain)),
        None => Entrant::human(player.name.clone()),
    }
}

/// Rounds of matches over an evolving population.
#[derive(Debug)]
pub struct Tournament {
    config: LeagueConfig,
    registry: Registry,
    env: TrueSkill,
    rng: ChaCha8Rng,
    round: u32,
}

impl Tournament {
    /// Validates `config` and generates the starting population.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting.
    pub fn new(config: LeagueConfig) -> Result<Self, LeagueError> {
        config.validate()?;

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut registry = Registry::new();
        let players = registry.generate_players(
            config.players,
            config.include_human_player,
            &config.game,
            &mut rng,
        );
        registry.set_players(players);
        info!(
            players = registry.len(),
            match_size = config.match_size,
            seed = config.seed,
            "tournament created"
        );

        Ok(Self {
            config,
            registry,
            env: TrueSkill::default(),
            rng,
            round: 0,
        })
    }

    /// Rounds played so far.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// The population.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// The rating environment.
    #[must_use]
    pub const fn rating_env(&self) -> &TrueSkill {
        &self.env
    }

    /// Current ranking, best first.
    #[must_use]
    pub fn standings(&self) -> Vec<Standing> {
        self.registry
            .fetch_players(true)
            .into_iter()
            .map(PlayerRecord::standing)
            .collect()
    }

    /// Plays every configured round.
    ///
    /// # Errors
    ///
    /// Propagates the first match that fails to set up.
    pub fn run(&mut self) -> Result<Vec<RoundReport>, LeagueError> {
        (0..self.config.rounds).map(|_| self.play_round()).collect()
    }

    /// Plays one round.
    ///
    /// # Errors
    ///
    /// Returns [`LeagueError::Match`] if a match rejects its configuration.
    pub fn play_round(&mut self) -> Result<RoundReport, LeagueError> {
        self.round += 1;
        let span = info_span!("round", round = self.round);
        let _guard = span.enter();

        let fixtures = self.fixtures();
        let seated: usize = fixtures.iter().map(|f| f.players.len()).sum();
        let sat_out = self.registry.len() - seated;

        let game = &self.config.game;
        let results: Vec<(Vec<PlayerId>, u64, Result<BattleOutcome, _>)> = fixtures
            .into_par_iter()
            .map(|fixture| {
                let outcome = Battle::new(game.clone(), fixture.entrants, fixture.seed)
                    .map(Battle::run);
                (fixture.players, fixture.seed, outcome)
            })
            .collect();

        let mut matches = Vec::with_capacity(results.len());
        for (players, seed, outcome) in results {
            let outcome = outcome?;
            debug!(
                seed,
                reason = %outcome.reason,
                ticks = outcome.ticks,
                "match finished"
            );
            self.apply(&players, &outcome);
            matches.push(MatchReport {
                scores: outcome.scores(),
                players,
                seed,
                reason: outcome.reason,
                ticks: outcome.ticks,
            });
        }

        let removed = self.evolve();
        let leader = self.registry.fetch_players(true).first().map(|p| p.standing());

        info!(
            matches = matches.len(),
            sat_out,
            removed = removed.len(),
            leader = leader.as_ref().map_or("-", |s| s.name.as_str()),
            "round complete"
        );

        Ok(RoundReport {
            round: self.round,
            matches,
            sat_out,
            removed,
            population: self.registry.len(),
            leader,
        })
    }

    /// Groups the ranked population and seeds every group in order.
    fn fixtures(&mut self) -> Vec<Fixture> {
        let ranked = self.registry.fetch_players(true);
        let groups = make_groups(
            &ranked,
            self.config.match_size,
            self.config.matching_spread,
            self.env.sigma,
            &mut self.rng,
        );

        groups
            .into_iter()
            .map(|players| {
                let entrants = players
                    .iter()
                    .filter_map(|id| self.registry.get(*id))
                    .map(entrant)
                    .collect();
                Fixture {
                    players,
                    entrants,
                    seed: self.rng.gen(),
                }
            })
            .collect()
    }

    /// Rates one finished match and clears its scores.
    fn apply(&mut self, players: &[PlayerId], outcome: &BattleOutcome) {
        let scores = outcome.scores();
        for (id, score) in players.iter().zip(&scores) {
            if let Some(player) = self.registry.get_mut(*id) {
                player.score = *score;
            }
        }

        let before: Vec<Rating> = players
            .iter()
            .map(|id| {
                self.registry
                    .get(*id)
                    .and_then(|p| p.rating)
                    .unwrap_or_else(|| self.env.create_rating())
            })
            .collect();
        let after = self.env.rate(&before, &ranks_from_scores(&scores));

        for (id, rating) in players.iter().zip(after) {
            if let Some(player) = self.registry.get_mut(*id) {
                player.rating = Some(rating);
                player.games_played += 1;
                player.score = 0.0;
            }
        }
    }

    /// Removes the confidently bad and breeds one replacement each.
    fn evolve(&mut self) -> Vec<String> {
        let removed = self
            .registry
            .remove_worst_players(self.config.gen_worst_quantile, self.config.gen_min_sigma);
        if removed.is_empty() {
            return Vec::new();
        }

        let parents: Vec<Network> = self
            .registry
            .fetch_players(true)
            .into_iter()
            .filter(|p| p.rating.is_some())
            .filter_map(|p| p.network().cloned())
            .collect();
        let parents: Vec<&Network> = parents.iter().collect();

        for _ in &removed {
            let brain = breed_brain(
                &parents,
                self.config.mutation_rate,
                self.config.mutation_scale,
                &self.config.game,
                &mut self.rng,
            );
            let id = self.registry.allocate_id();
            let generation = brain.shared_network().generation();
            let name = format!("Tank-{}->gen{generation}", id.as_u64());
            self.registry.add(PlayerRecord::new(id, name, Some(Arc::new(brain))));
        }

        removed.into_iter().map(|p| p.name).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tankbr_core::MatchConfig;

    fn quick_config(seed: u64) -> LeagueConfig {
        LeagueConfig {
            rounds: 3,
            players: 10,
            match_size: 5,
            matching_spread: 2,
            seed,
            gen_min_sigma: 8.0,
            gen_worst_quantile: 0.3,
            game: MatchConfig {
                max_match_turns: 150,
                ..MatchConfig::default()
            },
            ..LeagueConfig::default()
        }
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = LeagueConfig {
            match_size: 1,
            ..LeagueConfig::default()
        };
        assert!(matches!(
            Tournament::new(config),
            Err(LeagueError::MatchTooSmall(1))
        ));
    }

    #[test]
    fn starts_with_the_configured_population() {
        let tournament = Tournament::new(quick_config(1)).unwrap();
        assert_eq!(tournament.registry().len(), 10);
        assert_eq!(tournament.round(), 0);
        assert!(tournament.standings().iter().all(|s| s.rating.is_none()));
    }

    #[test]
    fn round_rates_everyone_who_played() {
        let mut tournament = Tournament::new(quick_config(2)).unwrap();
        let report = tournament.play_round().unwrap();
        assert_eq!(report.round, 1);
        assert_eq!(report.matches.len(), 2);
        assert_eq!(report.sat_out, 0);

        for m in &report.matches {
            assert_eq!(m.players.len(), m.scores.len());
            assert!(m.ticks <= 150);
        }
        let played = tournament
            .registry()
            .fetch_where(|p| p.games_played == 1)
            .len();
        assert_eq!(played + report.removed.len(), 10);
        assert!(tournament
            .registry()
            .fetch_players(false)
            .iter()
            .all(|p| p.score == 0.0));
    }

    #[test]
    fn population_stays_constant() {
        let mut tournament = Tournament::new(quick_config(3)).unwrap();
        for report in tournament.run().unwrap() {
            assert_eq!(report.population, 10);
        }
        assert_eq!(tournament.round(), 3);
    }

    #[test]
    fn same_seed_same_tournament() {
        let run = |seed| {
            let mut tournament = Tournament::new(quick_config(seed)).unwrap();
            (tournament.run().unwrap(), tournament.standings())
        };
        assert_eq!(run(7), run(7));
    }

    #[test]
    fn removed_players_are_replaced_by_offspring() {
        let config = LeagueConfig {
            gen_min_sigma: 100.0,
            gen_worst_quantile: 0.5,
            ..quick_config(4)
        };
        let mut tournament = Tournament::new(config).unwrap();
        let report = tournament.play_round().unwrap();
        assert_eq!(report.removed.len(), 5);
        let newcomers = tournament.registry().fetch_where(|p| p.rating.is_none());
        assert_eq!(newcomers.len(), 5);
        assert!(newcomers.iter().all(|p| p.name.contains("->gen")));
    }
}

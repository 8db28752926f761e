//! Tankbr CLI - runs a headless tournament and prints the final standings.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tankbr_league::{LeagueConfig, Tournament};
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Evolve and rank tank AIs over repeated tournaments
#[derive(Parser, Debug)]
#[command(name = "tankbr")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with league and match settings
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// How many full rounds to play
    #[arg(short, long)]
    rounds: Option<u32>,

    /// How many players to generate
    #[arg(short, long)]
    players: Option<usize>,

    /// How many players take part in one match
    #[arg(short, long)]
    match_size: Option<usize>,

    /// How far, in match sizes, players are sampled from (1 disables sampling)
    #[arg(short = 's', long)]
    matching_spread: Option<usize>,

    /// Reserve slot 0 for a host-steered tank
    #[arg(long)]
    include_human_player: bool,

    /// Tournament seed
    #[arg(long)]
    seed: Option<u64>,

    /// Rating certainty (sigma) below which bad players may be removed
    #[arg(short, long)]
    gen_min_sigma: Option<f64>,

    /// Fraction of the worst players considered for removal each round
    #[arg(short = 'q', long)]
    gen_worst_quantile: Option<f64>,

    /// Write every round report to this file as JSON
    #[arg(long)]
    report: Option<PathBuf>,
}

impl Args {
    /// Loads the config file, if any, and applies command line overrides.
    fn league_config(&self) -> Result<LeagueConfig> {
        let mut config = match &self.config {
            Some(path) => {
                let text = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                serde_json::from_str(&text)
                    .with_context(|| format!("parsing {}", path.display()))?
            }
            None => LeagueConfig::default(),
        };

        if let Some(rounds) = self.rounds {
            config.rounds = rounds;
        }
        if let Some(players) = self.players {
            config.players = players;
        }
        if let Some(match_size) = self.match_size {
            config.match_size = match_size;
        }
        if let Some(spread) = self.matching_spread {
            config.matching_spread = spread;
        }
        if self.include_human_player {
            config.include_human_player = true;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(sigma) = self.gen_min_sigma {
            config.gen_min_sigma = sigma;
        }
        if let Some(quantile) = self.gen_worst_quantile {
            config.gen_worst_quantile = quantile;
        }
        Ok(config)
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = args.league_config()?;
    config.validate().context("invalid configuration")?;
    info!(rounds = config.rounds, players = config.players, "starting tournament");

    let mut tournament = Tournament::new(config)?;
    let reports = tournament.run()?;

    if let Some(path) = &args.report {
        let json = serde_json::to_string_pretty(&reports)?;
        fs::write(path, json).with_context(|| format!("writing {}", path.display()))?;
    }

    println!("{}", serde_json::to_string_pretty(&tournament.standings())?);
    Ok(())
}

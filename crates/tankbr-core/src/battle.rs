//! Match controller.
//!
//! [`Battle`] turns a roster of [`Entrant`]s into tanks, drives a standard
//! [`Pipeline`] until the match ends, and reports every entrant's final
//! score, including entrants whose tank was destroyed along the way.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use tankbr_core::battle::{Battle, Entrant};
//! use tankbr_core::brain::{Monkey, Rotator};
//! use tankbr_core::config::MatchConfig;
//!
//! let config = MatchConfig {
//!     max_match_turns: 50,
//!     ..MatchConfig::default()
//! };
//! let roster = vec![
//!     Entrant::ai("Tank-0->rotator", Arc::new(Rotator)),
//!     Entrant::ai("Tank-1->monkey", Arc::new(Monkey)),
//! ];
//! let outcome = Battle::new(config, roster, 7).unwrap().run();
//! assert_eq!(outcome.cards.len(), 2);
//! assert!(outcome.ticks <= 50);
//! ```

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::brain::Brain;
use crate::config::MatchConfig;
use crate::entity::{FireIntent, Kinematics, PlayerCard};
use crate::error::ConfigError;
use crate::pipeline::Pipeline;
use crate::spawn::{spawn_tank, TankHandles, TankSpawn};
use crate::stage::{EndReason, GameStatus};
use crate::world::World;

// =============================================================================
// Input
// =============================================================================

/// Steering for host-controlled tanks, held for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Steering {
    /// Hull distance per tick.
    pub speed: f32,
    /// Hull degrees per tick.
    pub angular_speed: f32,
    /// Turret degrees per tick.
    pub turret_angular_speed: f32,
    /// Pull the trigger.
    pub fire: bool,
}

/// Everything the host hands the simulation for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    /// Ask the match to end.
    pub quit: bool,
    /// Steering for tanks without a brain. `None` leaves their speeds as they were.
    pub steering: Option<Steering>,
}

// =============================================================================
// Roster
// =============================================================================

/// One competitor in a match.
#[derive(Debug, Clone)]
pub struct Entrant {
    /// Display name carried onto the player card.
    pub name: String,
    /// `None` for a host-steered tank.
    pub brain: Option<Arc<dyn Brain>>,
}

impl Entrant {
    /// An AI-controlled entrant.
    #[must_use]
    pub fn ai(name: impl Into<String>, brain: Arc<dyn Brain>) -> Self {
        Self {
            name: name.into(),
            brain: Some(brain),
        }
    }

    /// A host-steered entrant.
    #[must_use]
    pub fn human(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            brain: None,
        }
    }
}

/// Result of a finished match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Why the match ended.
    pub reason: EndReason,
    /// Ticks played.
    pub ticks: u64,
    /// Final card of every entrant, ordered by roster slot.
    pub cards: Vec<PlayerCard>,
}

impl BattleOutcome {
    /// Final scores, indexed by roster slot.
    #[must_use]
    pub fn scores(&self) -> Vec<f64> {
        self.cards.iter().map(|card| card.score).collect()
    }
}

// =============================================================================
// Battle
// =============================================================================

/// One match from spawn to final score.
#[derive(Debug)]
pub struct Battle {
    pipeline: Pipeline,
    steered: Vec<TankHandles>,
    tanks: Vec<TankHandles>,
}

impl Battle {
    /// Validates `config` and spawns one tank per entrant.
    ///
    /// AI tanks appear at random integer coordinates within `spawn_range`
    /// with random hull and turret facings; host-steered tanks appear at the
    /// origin facing 0°. All placement draws come from the match RNG.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field of `config`.
    pub fn new(
        config: MatchConfig,
        entrants: Vec<Entrant>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut pipeline = Pipeline::standard(&config, seed);
        let mut steered = Vec::new();
        let mut tanks = Vec::with_capacity(entrants.len());

        for (slot, entrant) in entrants.into_iter().enumerate() {
            let (world, state) = pipeline.parts_mut();
            let card = PlayerCard::new(slot, entrant.name);
            let spawn = match entrant.brain {
                Some(brain) => {
                    let range = config.spawn_range;
                    #[allow(clippy::cast_precision_loss)]
                    let position = Vec2::new(
                        state.rng.gen_range(-range..=range) as f32,
                        state.rng.gen_range(-range..=range) as f32,
                    );
                    TankSpawn {
                        position,
                        facing: f32::from(state.rng.gen_range(0u16..=359)),
                        turret_facing: f32::from(state.rng.gen_range(0u16..=359)),
                        card,
                        brain: Some(brain),
                    }
                }
                None => TankSpawn {
                    position: Vec2::ZERO,
                    facing: 0.0,
                    turret_facing: 0.0,
                    card,
                    brain: None,
                },
            };
            let is_steered = spawn.brain.is_none();
            let handles = spawn_tank(world, spawn, &config);
            if is_steered {
                steered.push(handles);
            }
            tanks.push(handles);
        }

        debug!(seed, tanks = tanks.len(), humans = steered.len(), "battle set up");
        Ok(Self {
            pipeline,
            steered,
            tanks,
        })
    }

    /// Applies host input, then runs one tick.
    pub fn step(&mut self, input: &InputFrame) -> GameStatus {
        if input.quit {
            self.pipeline.state_mut().quit_requested = true;
        }
        if let Some(steering) = input.steering {
            let world = self.pipeline.world_mut();
            for tank in &self.steered {
                world.insert(
                    tank.body,
                    Kinematics::new(steering.speed, steering.angular_speed),
                );
                world.insert(
                    tank.turret,
                    Kinematics::new(0.0, steering.turret_angular_speed),
                );
                if steering.fire {
                    world.insert(tank.body, FireIntent);
                }
            }
        }
        self.pipeline.step()
    }

    /// Runs without host input until the match ends.
    #[must_use]
    pub fn run(mut self) -> BattleOutcome {
        let idle = InputFrame::default();
        loop {
            if let GameStatus::Ended(reason) = self.step(&idle) {
                return self.outcome(reason);
            }
        }
    }

    /// Final cards for a match that ended for `reason`.
    #[must_use]
    pub fn outcome(&self, reason: EndReason) -> BattleOutcome {
        let world = self.pipeline.world();
        let mut cards: Vec<PlayerCard> = world
            .iter::<PlayerCard>()
            .map(|(_, card)| card.clone())
            .chain(
                self.pipeline
                    .state()
                    .retired
                    .iter()
                    .map(|retired| retired.card.clone()),
            )
            .collect();
        cards.sort_by_key(|card| card.slot);

        BattleOutcome {
            reason,
            ticks: self.pipeline.tick(),
            cards,
        }
    }

    /// Registers a callback fired once when the match ends.
    pub fn on_end(&mut self, callback: impl FnMut(EndReason) + Send + 'static) {
        self.pipeline.on_end(callback);
    }

    /// Read-only view for a renderer.
    #[must_use]
    pub fn world(&self) -> &World {
        self.pipeline.world()
    }

    /// Tank handles in roster order.
    #[must_use]
    pub fn tanks(&self) -> &[TankHandles] {
        &self.tanks
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.pipeline.status()
    }

    /// Ticks played so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.pipeline.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{Dummy, Rotator};
    use crate::entity::{Controller, Transform};

    fn short_config() -> MatchConfig {
        MatchConfig {
            max_match_turns: 20,
            ..MatchConfig::default()
        }
    }

    #[test]
    fn invalid_config_fails_at_setup() {
        let config = MatchConfig {
            gun_load_time: 0,
            ..MatchConfig::default()
        };
        let err = Battle::new(config, vec![], 0).unwrap_err();
        assert_eq!(err, ConfigError::Zero { field: "gun_load_time" });
    }

    #[test]
    fn ai_tanks_spawn_inside_range() {
        let config = short_config();
        let roster = (0..6)
            .map(|i| Entrant::ai(format!("Tank-{i}->rotator"), Arc::new(Rotator)))
            .collect();
        let battle = Battle::new(config.clone(), roster, 11).unwrap();

        for tank in battle.tanks() {
            let t = battle.world().get::<Transform>(tank.body).copied().unwrap();
            let range = config.spawn_range as f32;
            assert!(t.position.x.abs() <= range && t.position.y.abs() <= range);
            assert_eq!(t.position.x, t.position.x.round());
            assert!((0.0..360.0).contains(&t.facing));
            assert!(battle.world().has::<Controller>(tank.body));
        }
    }

    #[test]
    fn human_spawns_at_origin() {
        let battle = Battle::new(
            short_config(),
            vec![
                Entrant::human("<<Player>>"),
                Entrant::ai("Tank-1->dummy", Arc::new(Dummy)),
            ],
            3,
        )
        .unwrap();
        let body = battle.tanks()[0].body;
        let t = battle.world().get::<Transform>(body).copied().unwrap();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.facing, 0.0);
        assert!(!battle.world().has::<Controller>(body));
    }

    #[test]
    fn steering_drives_the_human_tank() {
        let mut battle =
            Battle::new(short_config(), vec![Entrant::human("<<Player>>")], 3).unwrap();
        let tank = battle.tanks()[0];

        battle.step(&InputFrame {
            quit: false,
            steering: Some(Steering {
                speed: 2.0,
                angular_speed: 0.0,
                turret_angular_speed: 5.0,
                fire: false,
            }),
        });

        let body = battle.world().get::<Transform>(tank.body).copied().unwrap();
        let turret = battle.world().get::<Transform>(tank.turret).copied().unwrap();
        assert!(body.position.abs_diff_eq(Vec2::new(2.0, 0.0), 1e-4));
        assert!((turret.facing - 5.0).abs() < 1e-4);
    }

    #[test]
    fn quit_ends_with_manual() {
        let mut battle = Battle::new(
            short_config(),
            vec![
                Entrant::ai("a", Arc::new(Dummy)),
                Entrant::ai("b", Arc::new(Dummy)),
            ],
            3,
        )
        .unwrap();
        let status = battle.step(&InputFrame {
            quit: true,
            steering: None,
        });
        assert_eq!(status, GameStatus::Ended(EndReason::Manual));
    }

    #[test]
    fn dummies_play_out_the_clock() {
        let roster = vec![
            Entrant::ai("a", Arc::new(Dummy)),
            Entrant::ai("b", Arc::new(Dummy)),
        ];
        let config = MatchConfig {
            spawn_range: 1000,
            ..short_config()
        };
        let outcome = Battle::new(config.clone(), roster, 5).unwrap().run();

        assert_eq!(outcome.ticks, u64::from(config.max_match_turns));
        assert_eq!(outcome.cards.len(), 2);
        assert_eq!(outcome.cards[0].slot, 0);
        assert_eq!(outcome.cards[1].slot, 1);
    }
}

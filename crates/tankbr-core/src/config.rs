//! Match constants.
//!
//! [`MatchConfig`] is read once, validated, and then threaded by reference
//! into every stage that needs a number from it. Nothing in the core reads
//! configuration from global state.
//!
//! # Example
//!
//! ```
//! use tankbr_core::config::MatchConfig;
//!
//! let config: MatchConfig = serde_json::from_str(r#"{ "ammo": 3 }"#).unwrap();
//! assert_eq!(config.ammo, 3);
//! assert_eq!(config.max_match_turns, MatchConfig::default().max_match_turns);
//! assert!(config.validate().is_ok());
//! ```

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Constants for one battle.
///
/// Every field has a default, so a partial JSON object deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Points for destroying a tank.
    pub frag_score: f64,
    /// Bonus for the sole survivor when the match ends.
    pub last_man_score: f64,
    /// Points for surviving the whole match, paid out per tick.
    pub survived_score: f64,
    /// Tanks spawn with integer coordinates in `[-spawn_range, spawn_range]`.
    pub spawn_range: i32,
    /// Distance per tick for AI movement commands.
    pub movement_speed: f32,
    /// Degrees per tick for AI rotation commands.
    pub rotation_speed: f32,
    /// Ticks to chamber one round.
    pub gun_load_time: u32,
    /// Rounds per tank.
    pub ammo: u32,
    /// Bullet distance per tick.
    pub bullet_speed: f32,
    /// Distance in front of the turret pivot where bullets appear.
    pub bullet_position_offset: f32,
    /// Bullet lifetime in ticks.
    pub bullet_ttl: u32,
    /// Bullet collision radius.
    pub bullet_radius: f32,
    /// Turret laser length.
    pub laser_range: f32,
    /// Tick budget per match.
    pub max_match_turns: u32,
    /// Ticks a match continues once every weapon is out of ammo.
    pub ammo_timeout: u32,
    /// Hull width and height.
    pub tank_body_size: Vec2,
    /// Turret width and height.
    pub turret_size: Vec2,
    /// Bullet width and height.
    pub bullet_size: Vec2,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            frag_score: 1.0,
            last_man_score: 3.0,
            survived_score: 1.0,
            spawn_range: 300,
            movement_speed: 3.0,
            rotation_speed: 3.0,
            gun_load_time: 30,
            ammo: 10,
            bullet_speed: 20.0,
            bullet_position_offset: 36.0,
            bullet_ttl: 30,
            bullet_radius: 10.0,
            laser_range: 300.0,
            max_match_turns: 3000,
            ammo_timeout: 200,
            tank_body_size: Vec2::new(38.0, 46.0),
            turret_size: Vec2::new(16.0, 40.0),
            bullet_size: Vec2::new(8.0, 8.0),
        }
    }
}

impl MatchConfig {
    /// Survival points paid to each living tank every tick.
    #[must_use]
    pub fn survive_score_per_turn(&self) -> f64 {
        self.survived_score / f64::from(self.max_match_turns.max(1))
    }

    /// Collision radius of a tank hull: 70% of half its diagonal.
    #[must_use]
    pub fn tank_radius(&self) -> f32 {
        self.tank_body_size.length() / 2.0 * 0.7
    }

    /// Checks that every constant can produce a well-formed match.
    ///
    /// # Errors
    ///
    /// Returns the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("frag_score", self.frag_score),
            ("last_man_score", self.last_man_score),
            ("survived_score", self.survived_score),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
        }

        for (field, value) in [
            ("gun_load_time", self.gun_load_time),
            ("bullet_ttl", self.bullet_ttl),
            ("max_match_turns", self.max_match_turns),
        ] {
            if value == 0 {
                return Err(ConfigError::Zero { field });
            }
        }

        for (field, value) in [
            ("movement_speed", self.movement_speed),
            ("rotation_speed", self.rotation_speed),
            ("bullet_speed", self.bullet_speed),
            ("bullet_radius", self.bullet_radius),
            ("laser_range", self.laser_range),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field });
            }
            if value <= 0.0 {
                return Err(ConfigError::NonPositive {
                    field,
                    value: f64::from(value),
                });
            }
        }

        if self.spawn_range < 0 {
            return Err(ConfigError::NonPositive {
                field: "spawn_range",
                value: f64::from(self.spawn_range),
            });
        }

        if self.bullet_position_offset <= self.tank_radius() + self.bullet_radius {
            warn!(
                offset = self.bullet_position_offset,
                tank_radius = self.tank_radius(),
                bullet_radius = self.bullet_radius,
                "bullets spawn touching their own tank"
            );
        }

        Ok(())
    }
}

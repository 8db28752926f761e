//! Attribute records attached to entities.
//!
//! An entity is nothing more than an [`EntityId`] plus whichever of these
//! records are attached to it. A tank body carries a [`Transform`],
//! [`Collidable`], [`Weapon`], [`ParentLink`] to its turret and a
//! [`CombatTag`]; a bullet carries a [`Transform`], [`Collidable`],
//! [`Explosive`], [`OwnerLink`] and [`TimeToLive`].
//!
//! Intent records ([`PendingMove`], [`PendingRotate`],
//! [`PendingTurretRotate`], [`FireIntent`]) live for at most one tick: the
//! stage that consumes them removes them.

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::EntityId;
use crate::brain::{Brain, Memory};
use crate::command::Command;

// =============================================================================
// Spatial
// =============================================================================

/// Position, facing and drawing extents of an entity.
///
/// `facing` is in degrees, counter-clockwise from +x. `size` and `pivot`
/// are presentation data; the simulation only reads `position` and `facing`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Center position in world units.
    pub position: Vec2,
    /// Facing in degrees.
    pub facing: f32,
    /// Width and height of the drawn box.
    pub size: Vec2,
    /// Pivot point inside the box, relative to its top-left corner.
    pub pivot: Vec2,
}

impl Transform {
    /// Creates a transform with zero size.
    #[must_use]
    pub fn new(position: Vec2, facing: f32) -> Self {
        Self {
            position,
            facing,
            size: Vec2::ZERO,
            pivot: Vec2::ZERO,
        }
    }

    /// Sets the box size, pivoting around its center.
    #[must_use]
    pub fn with_size(mut self, size: Vec2) -> Self {
        self.size = size;
        self.pivot = size * 0.5;
        self
    }

    /// Sets an explicit pivot.
    #[must_use]
    pub fn with_pivot(mut self, pivot: Vec2) -> Self {
        self.pivot = pivot;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 0.0)
    }
}

/// Persistent speeds, converted into one-tick intents every tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Kinematics {
    /// Distance per tick along the facing.
    pub speed: f32,
    /// Degrees per tick.
    pub angular_speed: f32,
}

impl Kinematics {
    /// Creates kinematics with the given speeds.
    #[must_use]
    pub const fn new(speed: f32, angular_speed: f32) -> Self {
        Self {
            speed,
            angular_speed,
        }
    }
}

/// Move along the current facing by `distance` this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingMove {
    /// Signed distance; negative reverses.
    pub distance: f32,
}

/// Rotate body (and children) by `angle` degrees this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingRotate {
    /// Signed angle in degrees.
    pub angle: f32,
}

/// Rotate only the weapon's turret by `angle` degrees this tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PendingTurretRotate {
    /// Signed angle in degrees.
    pub angle: f32,
}

// =============================================================================
// Combat
// =============================================================================

/// Collision circle centered on the transform position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Collidable {
    /// Radius in world units.
    pub radius: f32,
}

/// Marker: anything touching this entity destroys itself, and so does this.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Explosive;

/// Gun mounted on a body, aimed by a separate turret entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weapon {
    /// Turret entity whose transform aims the shot.
    pub turret: EntityId,
    /// Rounds not yet loaded.
    pub ammo: u32,
    /// Ticks until the round being loaded is ready.
    pub reload_countdown: u32,
    /// A round is chambered and ready to fire.
    pub loaded: bool,
}

impl Weapon {
    /// A weapon with a round chambered and `ammo` more in reserve.
    #[must_use]
    pub const fn new(turret: EntityId, ammo: u32) -> Self {
        Self {
            turret,
            ammo,
            reload_countdown: 0,
            loaded: true,
        }
    }
}

/// Laser range finder pointing along the holder's facing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetSensor {
    /// Beam length.
    pub max_range: f32,
    /// Beam direction relative to the holder's facing, in degrees.
    pub angle_offset: f32,
    /// Nearest detected target position from the last sensor pass.
    pub closest: Option<Vec2>,
    /// Every target position detected in the last sensor pass.
    pub found: Vec<Vec2>,
}

impl TargetSensor {
    /// A sensor with an empty reading.
    #[must_use]
    pub const fn new(max_range: f32, angle_offset: f32) -> Self {
        Self {
            max_range,
            angle_offset,
            closest: None,
            found: Vec::new(),
        }
    }
}

/// Dependent entity that follows this one and dies with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParentLink {
    /// The child.
    pub child: EntityId,
}

/// Entity credited when this one destroys something.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerLink {
    /// The owner.
    pub owner: EntityId,
}

/// Remaining lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeToLive {
    /// Destroyed on the cleanup pass that sees zero.
    pub ticks: u32,
}

/// Marker: pull the trigger this tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FireIntent;

/// Marker: counts toward the players still alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatTag;

// =============================================================================
// Agents
// =============================================================================

/// Commands re-emitted every tick until `ticks_left` runs out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionQueue {
    /// Commands to apply.
    pub commands: Vec<Command>,
    /// Ticks remaining, including the current one.
    pub ticks_left: u32,
}

/// Brain driving an agent, plus the memory it carries between ticks.
#[derive(Clone)]
pub struct Controller {
    /// Shared, stateless policy.
    pub brain: Arc<dyn Brain>,
    /// Per-agent memory returned by the last decision.
    pub memory: Option<Memory>,
}

impl Controller {
    /// A controller with empty memory.
    #[must_use]
    pub fn new(brain: Arc<dyn Brain>) -> Self {
        Self { brain, memory: None }
    }
}

impl fmt::Debug for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("brain", &self.brain.kind())
            .field("memory", &self.memory)
            .finish()
    }
}

/// Roster slot, display name and running score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerCard {
    /// Index into the match roster.
    pub slot: usize,
    /// Display name.
    pub name: String,
    /// Score accumulated this match.
    pub score: f64,
}

impl PlayerCard {
    /// A card with zero score.
    #[must_use]
    pub fn new(slot: usize, name: impl Into<String>) -> Self {
        Self {
            slot,
            name: name.into(),
            score: 0.0,
        }
    }
}

/// What a renderer should draw for this entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sprite {
    /// Tank hull.
    TankBody,
    /// Tank turret.
    Turret,
    /// Bullet in flight.
    Bullet,
}

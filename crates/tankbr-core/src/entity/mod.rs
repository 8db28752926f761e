//! Entity identifiers and the closed set of attribute kinds.
//!
//! This module provides:
//! - [`EntityId`]: opaque identity for anything living in a [`World`](crate::world::World)
//! - [`ComponentKind`]: tag naming one attribute record type
//! - [`ComponentMask`]: bit set of kinds, used for store queries
//! - [`components`]: the attribute record structs themselves
//!
//! # Example
//!
//! ```
//! use tankbr_core::entity::{ComponentKind, ComponentMask, EntityId};
//!
//! let id = EntityId::new(42);
//! assert_eq!(id.as_u64(), 42);
//!
//! let mask = ComponentMask::TRANSFORM | ComponentMask::COLLIDABLE;
//! assert!(mask.contains(ComponentKind::Transform.mask()));
//! assert_eq!(ComponentKind::in_mask(mask).count(), 2);
//! ```

pub mod components;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use components::{
    CombatTag, Collidable, Controller, DecisionQueue, Explosive, FireIntent, Kinematics,
    OwnerLink, ParentLink, PendingMove, PendingRotate, PendingTurretRotate, PlayerCard, Sprite,
    TargetSensor, TimeToLive, Transform, Weapon,
};

/// Unique identifier for an entity.
///
/// Entity IDs are assigned monotonically by the store and never reused within
/// one world, so ordering by ID is also ordering by creation time. Every
/// stage iterates in this order, which keeps matches reproducible.
///
/// # Example
///
/// ```
/// use tankbr_core::entity::EntityId;
///
/// let id1 = EntityId::new(1);
/// let id2 = EntityId::new(2);
///
/// assert!(id1 < id2);
/// assert_eq!(id1.as_u64(), 1);
/// ```
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new `EntityId` from a raw `u64` value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw `u64` value of this identifier.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self::new(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

bitflags! {
    /// Set of attribute kinds, one bit per [`ComponentKind`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct ComponentMask: u32 {
        /// [`Transform`]
        const TRANSFORM = 1 << 0;
        /// [`Kinematics`]
        const KINEMATICS = 1 << 1;
        /// [`PendingMove`]
        const PENDING_MOVE = 1 << 2;
        /// [`PendingRotate`]
        const PENDING_ROTATE = 1 << 3;
        /// [`PendingTurretRotate`]
        const PENDING_TURRET_ROTATE = 1 << 4;
        /// [`Collidable`]
        const COLLIDABLE = 1 << 5;
        /// [`Explosive`]
        const EXPLOSIVE = 1 << 6;
        /// [`Weapon`]
        const WEAPON = 1 << 7;
        /// [`TargetSensor`]
        const TARGET_SENSOR = 1 << 8;
        /// [`ParentLink`]
        const PARENT_LINK = 1 << 9;
        /// [`OwnerLink`]
        const OWNER_LINK = 1 << 10;
        /// [`TimeToLive`]
        const TIME_TO_LIVE = 1 << 11;
        /// [`FireIntent`]
        const FIRE_INTENT = 1 << 12;
        /// [`DecisionQueue`]
        const DECISION_QUEUE = 1 << 13;
        /// [`Controller`]
        const CONTROLLER = 1 << 14;
        /// [`CombatTag`]
        const COMBAT_TAG = 1 << 15;
        /// [`PlayerCard`]
        const PLAYER_CARD = 1 << 16;
        /// [`Sprite`]
        const SPRITE = 1 << 17;
    }
}

/// Names one attribute record type.
///
/// The set is closed: every kind has exactly one record struct in
/// [`components`] and one sparse map in the world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ComponentKind {
    /// Position, facing and extents
    Transform,
    /// Persistent linear/angular speed
    Kinematics,
    /// One-tick displacement intent
    PendingMove,
    /// One-tick rotation intent
    PendingRotate,
    /// One-tick turret-only rotation intent
    PendingTurretRotate,
    /// Collision circle
    Collidable,
    /// Destroyed on contact
    Explosive,
    /// Gun with ammo and reload state
    Weapon,
    /// Laser range finder
    TargetSensor,
    /// Dependent child moving with this entity
    ParentLink,
    /// Entity credited for this one's kills
    OwnerLink,
    /// Remaining lifetime in ticks
    TimeToLive,
    /// One-tick request to fire
    FireIntent,
    /// Commands re-applied for a number of ticks
    DecisionQueue,
    /// Agent brain and memory
    Controller,
    /// Counts toward players remaining
    CombatTag,
    /// Name and running score of a roster slot
    PlayerCard,
    /// Presentation hint
    Sprite,
}

impl ComponentKind {
    /// Every kind, in declaration order.
    pub const ALL: [Self; 18] = [
        Self::Transform,
        Self::Kinematics,
        Self::PendingMove,
        Self::PendingRotate,
        Self::PendingTurretRotate,
        Self::Collidable,
        Self::Explosive,
        Self::Weapon,
        Self::TargetSensor,
        Self::ParentLink,
        Self::OwnerLink,
        Self::TimeToLive,
        Self::FireIntent,
        Self::DecisionQueue,
        Self::Controller,
        Self::CombatTag,
        Self::PlayerCard,
        Self::Sprite,
    ];

    /// Returns the single-bit mask for this kind.
    #[must_use]
    pub const fn mask(self) -> ComponentMask {
        ComponentMask::from_bits_retain(1 << self as u32)
    }

    /// Iterates over the kinds contained in `mask`.
    pub fn in_mask(mask: ComponentMask) -> impl Iterator<Item = Self> {
        Self::ALL.into_iter().filter(move |kind| mask.contains(kind.mask()))
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

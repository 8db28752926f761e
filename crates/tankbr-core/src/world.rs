//! Sparse entity store for one match.
//!
//! The `World` keeps one `BTreeMap<EntityId, T>` per attribute kind plus the
//! set of live identities. It provides:
//! - Entity lifecycle (`create`, `destroy`, `destroy_with_children`)
//! - Typed attribute access through the [`Component`] trait
//! - Untyped attach/detach through [`AnyComponent`] and [`ComponentKind`]
//! - Multi-kind queries that return matching IDs in ascending order
//!
//! # Determinism
//!
//! Every map is ordered by `EntityId`, and IDs are handed out monotonically,
//! so every query visits entities in creation order on every platform.
//!
//! # Example
//!
//! ```
//! use tankbr_core::entity::{Collidable, ComponentMask, Transform};
//! use tankbr_core::world::World;
//! use glam::Vec2;
//!
//! let mut world = World::new();
//! let tank = world.create();
//! world.insert(tank, Transform::new(Vec2::new(100.0, 200.0), 0.0));
//! world.insert(tank, Collidable { radius: 12.0 });
//!
//! let ghost = world.create();
//! world.insert(ghost, Transform::default());
//!
//! let hits = world.query(ComponentMask::TRANSFORM | ComponentMask::COLLIDABLE);
//! assert_eq!(hits, vec![tank]);
//! ```

use std::collections::{BTreeMap, BTreeSet};

use tracing::trace;

use crate::entity::{
    CombatTag, Collidable, ComponentKind, ComponentMask, Controller, DecisionQueue, EntityId,
    Explosive, FireIntent, Kinematics, OwnerLink, ParentLink, PendingMove, PendingRotate,
    PendingTurretRotate, PlayerCard, Sprite, TargetSensor, TimeToLive, Transform, Weapon,
};

// =============================================================================
// Component trait
// =============================================================================

/// An attribute record with a dedicated sparse map in the [`World`].
pub trait Component: Sized + 'static {
    /// The kind tag of this record.
    const KIND: ComponentKind;

    /// Read access to this kind's map.
    fn storage(world: &World) -> &BTreeMap<EntityId, Self>;

    /// Write access to this kind's map.
    fn storage_mut(world: &mut World) -> &mut BTreeMap<EntityId, Self>;
}

macro_rules! impl_component {
    ($($ty:ident => $field:ident),+ $(,)?) => {
        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn storage(world: &World) -> &BTreeMap<EntityId, Self> {
                    &world.$field
                }

                fn storage_mut(world: &mut World) -> &mut BTreeMap<EntityId, Self> {
                    &mut world.$field
                }
            }
        )+
    };
}

impl_component! {
    Transform => transforms,
    Kinematics => kinematics,
    PendingMove => pending_moves,
    PendingRotate => pending_rotates,
    PendingTurretRotate => pending_turret_rotates,
    Collidable => collidables,
    Explosive => explosives,
    Weapon => weapons,
    TargetSensor => sensors,
    ParentLink => parents,
    OwnerLink => owners,
    TimeToLive => lifetimes,
    FireIntent => fire_intents,
    DecisionQueue => decisions,
    Controller => controllers,
    CombatTag => combat_tags,
    PlayerCard => cards,
    Sprite => sprites,
}

/// Binds the record type for a runtime `ComponentKind` and evaluates `$body`.
macro_rules! with_kind {
    ($kind:expr, $t:ident => $body:expr) => {
        match $kind {
            ComponentKind::Transform => { type $t = Transform; $body }
            ComponentKind::Kinematics => { type $t = Kinematics; $body }
            ComponentKind::PendingMove => { type $t = PendingMove; $body }
            ComponentKind::PendingRotate => { type $t = PendingRotate; $body }
            ComponentKind::PendingTurretRotate => { type $t = PendingTurretRotate; $body }
            ComponentKind::Collidable => { type $t = Collidable; $body }
            ComponentKind::Explosive => { type $t = Explosive; $body }
            ComponentKind::Weapon => { type $t = Weapon; $body }
            ComponentKind::TargetSensor => { type $t = TargetSensor; $body }
            ComponentKind::ParentLink => { type $t = ParentLink; $body }
            ComponentKind::OwnerLink => { type $t = OwnerLink; $body }
            ComponentKind::TimeToLive => { type $t = TimeToLive; $body }
            ComponentKind::FireIntent => { type $t = FireIntent; $body }
            ComponentKind::DecisionQueue => { type $t = DecisionQueue; $body }
            ComponentKind::Controller => { type $t = Controller; $body }
            ComponentKind::CombatTag => { type $t = CombatTag; $body }
            ComponentKind::PlayerCard => { type $t = PlayerCard; $body }
            ComponentKind::Sprite => { type $t = Sprite; $body }
        }
    };
}

/// Any attribute record, for untyped attach.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum AnyComponent {
    Transform(Transform),
    Kinematics(Kinematics),
    PendingMove(PendingMove),
    PendingRotate(PendingRotate),
    PendingTurretRotate(PendingTurretRotate),
    Collidable(Collidable),
    Explosive(Explosive),
    Weapon(Weapon),
    TargetSensor(TargetSensor),
    ParentLink(ParentLink),
    OwnerLink(OwnerLink),
    TimeToLive(TimeToLive),
    FireIntent(FireIntent),
    DecisionQueue(DecisionQueue),
    Controller(Controller),
    CombatTag(CombatTag),
    PlayerCard(PlayerCard),
    Sprite(Sprite),
}

// =============================================================================
// World
// =============================================================================

/// Entity store for one match.
///
/// A record may only be attached to a live entity; attaching to an unknown
/// or destroyed ID is ignored. Destroying an entity removes every record it
/// carries.
#[derive(Debug, Clone, Default)]
pub struct World {
    next_id: u64,
    alive: BTreeSet<EntityId>,
    transforms: BTreeMap<EntityId, Transform>,
    kinematics: BTreeMap<EntityId, Kinematics>,
    pending_moves: BTreeMap<EntityId, PendingMove>,
    pending_rotates: BTreeMap<EntityId, PendingRotate>,
    pending_turret_rotates: BTreeMap<EntityId, PendingTurretRotate>,
    collidables: BTreeMap<EntityId, Collidable>,
    explosives: BTreeMap<EntityId, Explosive>,
    weapons: BTreeMap<EntityId, Weapon>,
    sensors: BTreeMap<EntityId, TargetSensor>,
    parents: BTreeMap<EntityId, ParentLink>,
    owners: BTreeMap<EntityId, OwnerLink>,
    lifetimes: BTreeMap<EntityId, TimeToLive>,
    fire_intents: BTreeMap<EntityId, FireIntent>,
    decisions: BTreeMap<EntityId, DecisionQueue>,
    controllers: BTreeMap<EntityId, Controller>,
    combat_tags: BTreeMap<EntityId, CombatTag>,
    cards: BTreeMap<EntityId, PlayerCard>,
    sprites: BTreeMap<EntityId, Sprite>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Allocates a fresh entity with no records.
    pub fn create(&mut self) -> EntityId {
        let id = EntityId::new(self.next_id);
        self.next_id += 1;
        self.alive.insert(id);
        id
    }

    /// Returns true if `id` is live.
    #[must_use]
    pub fn exists(&self, id: EntityId) -> bool {
        self.alive.contains(&id)
    }

    /// Removes an entity and every record it carries.
    ///
    /// Returns false if the entity was not live.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if !self.alive.remove(&id) {
            return false;
        }
        for kind in ComponentKind::ALL {
            self.detach(id, kind);
        }
        trace!(entity = %id, "destroyed");
        true
    }

    /// Destroys an entity and, transitively, every child it links to.
    ///
    /// Returns the destroyed IDs in destruction order.
    pub fn destroy_with_children(&mut self, id: EntityId) -> Vec<EntityId> {
        let mut destroyed = Vec::new();
        let mut next = Some(id);
        while let Some(current) = next {
            next = self.get::<ParentLink>(current).map(|link| link.child);
            if !self.destroy(current) {
                break;
            }
            destroyed.push(current);
        }
        destroyed
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive.len()
    }

    /// Returns true if no entity is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.alive.is_empty()
    }

    /// Live entity IDs in ascending order.
    pub fn ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.alive.iter().copied()
    }

    // -------------------------------------------------------------------------
    // Typed access
    // -------------------------------------------------------------------------

    /// Attaches `value`, replacing any record of the same kind.
    ///
    /// Returns the replaced record. Ignored if `id` is not live.
    pub fn insert<T: Component>(&mut self, id: EntityId, value: T) -> Option<T> {
        if !self.exists(id) {
            trace!(entity = %id, kind = %T::KIND, "attach to dead entity ignored");
            return None;
        }
        T::storage_mut(self).insert(id, value)
    }

    /// Detaches and returns the record of kind `T`.
    pub fn remove<T: Component>(&mut self, id: EntityId) -> Option<T> {
        T::storage_mut(self).remove(&id)
    }

    /// Returns the record of kind `T`, if attached.
    #[must_use]
    pub fn get<T: Component>(&self, id: EntityId) -> Option<&T> {
        T::storage(self).get(&id)
    }

    /// Returns the record of kind `T` mutably, if attached.
    pub fn get_mut<T: Component>(&mut self, id: EntityId) -> Option<&mut T> {
        T::storage_mut(self).get_mut(&id)
    }

    /// Returns true if a record of kind `T` is attached.
    #[must_use]
    pub fn has<T: Component>(&self, id: EntityId) -> bool {
        T::storage(self).contains_key(&id)
    }

    /// IDs carrying a record of kind `T`, ascending.
    #[must_use]
    pub fn ids_with<T: Component>(&self) -> Vec<EntityId> {
        T::storage(self).keys().copied().collect()
    }

    /// Iterates `(id, record)` pairs of kind `T`, ascending.
    pub fn iter<T: Component>(&self) -> impl Iterator<Item = (EntityId, &T)> + '_ {
        T::storage(self).iter().map(|(id, value)| (*id, value))
    }

    /// Number of entities carrying kind `T`.
    #[must_use]
    pub fn count<T: Component>(&self) -> usize {
        T::storage(self).len()
    }

    /// Detaches every record of kind `T` from every entity.
    pub fn clear<T: Component>(&mut self) {
        T::storage_mut(self).clear();
    }

    // -------------------------------------------------------------------------
    // Untyped access
    // -------------------------------------------------------------------------

    /// Attaches a record of any kind. Ignored if `id` is not live.
    pub fn attach(&mut self, id: EntityId, component: AnyComponent) {
        match component {
            AnyComponent::Transform(c) => {
                self.insert(id, c);
            }
            AnyComponent::Kinematics(c) => {
                self.insert(id, c);
            }
            AnyComponent::PendingMove(c) => {
                self.insert(id, c);
            }
            AnyComponent::PendingRotate(c) => {
                self.insert(id, c);
            }
            AnyComponent::PendingTurretRotate(c) => {
                self.insert(id, c);
            }
            AnyComponent::Collidable(c) => {
                self.insert(id, c);
            }
            AnyComponent::Explosive(c) => {
                self.insert(id, c);
            }
            AnyComponent::Weapon(c) => {
                self.insert(id, c);
            }
            AnyComponent::TargetSensor(c) => {
                self.insert(id, c);
            }
            AnyComponent::ParentLink(c) => {
                self.insert(id, c);
            }
            AnyComponent::OwnerLink(c) => {
                self.insert(id, c);
            }
            AnyComponent::TimeToLive(c) => {
                self.insert(id, c);
            }
            AnyComponent::FireIntent(c) => {
                self.insert(id, c);
            }
            AnyComponent::DecisionQueue(c) => {
                self.insert(id, c);
            }
            AnyComponent::Controller(c) => {
                self.insert(id, c);
            }
            AnyComponent::CombatTag(c) => {
                self.insert(id, c);
            }
            AnyComponent::PlayerCard(c) => {
                self.insert(id, c);
            }
            AnyComponent::Sprite(c) => {
                self.insert(id, c);
            }
        }
    }

    /// Detaches the record of `kind`. Returns true if one was attached.
    pub fn detach(&mut self, id: EntityId, kind: ComponentKind) -> bool {
        with_kind!(kind, T => self.remove::<T>(id).is_some())
    }

    /// Returns true if a record of `kind` is attached.
    #[must_use]
    pub fn contains(&self, id: EntityId, kind: ComponentKind) -> bool {
        with_kind!(kind, T => self.has::<T>(id))
    }

    /// The set of kinds attached to `id`.
    #[must_use]
    pub fn kinds_of(&self, id: EntityId) -> ComponentMask {
        ComponentKind::ALL
            .into_iter()
            .filter(|kind| self.contains(id, *kind))
            .fold(ComponentMask::empty(), |mask, kind| mask | kind.mask())
    }

    /// IDs carrying every kind in `mask`, ascending.
    ///
    /// Walks the smallest requested map and probes the others. An empty mask
    /// matches every live entity.
    #[must_use]
    pub fn query(&self, mask: ComponentMask) -> Vec<EntityId> {
        let kinds: Vec<ComponentKind> = ComponentKind::in_mask(mask).collect();
        let Some(smallest) = kinds
            .iter()
            .copied()
            .min_by_key(|kind| with_kind!(*kind, T => self.count::<T>()))
        else {
            return self.ids().collect();
        };

        with_kind!(smallest, T => self.ids_with::<T>())
            .into_iter()
            .filter(|id| kinds.iter().all(|kind| self.contains(*id, *kind)))
            .collect()
    }
}

// =============================================================================
// Tests
// =============================================================================

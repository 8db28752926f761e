//! Translation and rotation.
//!
//! A body's child (its turret) receives exactly the same delta as the body,
//! so the two stay glued together without a transform hierarchy.

use glam::Vec2;

use super::{MatchState, Stage};
use crate::entity::{
    EntityId, ParentLink, PendingMove, PendingRotate, PendingTurretRotate, Transform, Weapon,
};
use crate::geometry::{heading_vector, wrap_degrees};
use crate::world::World;

fn translate(world: &mut World, id: EntityId, delta: Vec2) {
    if let Some(transform) = world.get_mut::<Transform>(id) {
        transform.position += delta;
    }
}

fn turn(world: &mut World, id: EntityId, angle: f32) {
    if let Some(transform) = world.get_mut::<Transform>(id) {
        transform.facing = wrap_degrees(transform.facing + angle);
    }
}

/// Moves a body and its child by `delta`.
pub(crate) fn shift_with_child(world: &mut World, id: EntityId, delta: Vec2) {
    translate(world, id, delta);
    if let Some(child) = world.get::<ParentLink>(id).map(|link| link.child) {
        translate(world, child, delta);
    }
}

// =============================================================================
// Movement
// =============================================================================

/// Applies and consumes every [`PendingMove`].
///
/// The displacement is recorded in `MatchState::applied_moves` so the
/// collision stage can undo it.
#[derive(Debug, Default)]
pub struct MovementStage;

impl MovementStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for MovementStage {
    fn name(&self) -> &'static str {
        "movement"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        for id in world.ids_with::<PendingMove>() {
            let Some(intent) = world.remove::<PendingMove>(id) else {
                continue;
            };
            let Some(facing) = world.get::<Transform>(id).map(|t| t.facing) else {
                continue;
            };
            let delta = heading_vector(facing) * intent.distance;
            shift_with_child(world, id, delta);
            state.applied_moves.insert(id, delta);
        }
    }
}

// =============================================================================
// Rotation
// =============================================================================

/// Applies and consumes every [`PendingRotate`] and [`PendingTurretRotate`].
#[derive(Debug, Default)]
pub struct RotationStage;

impl RotationStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for RotationStage {
    fn name(&self) -> &'static str {
        "rotation"
    }

    fn run(&mut self, world: &mut World, _state: &mut MatchState) {
        for id in world.ids_with::<PendingRotate>() {
            let Some(intent) = world.remove::<PendingRotate>(id) else {
                continue;
            };
            turn(world, id, intent.angle);
            if let Some(child) = world.get::<ParentLink>(id).map(|link| link.child) {
                turn(world, child, intent.angle);
            }
        }

        for id in world.ids_with::<PendingTurretRotate>() {
            let Some(intent) = world.remove::<PendingTurretRotate>(id) else {
                continue;
            };
            if let Some(turret) = world.get::<Weapon>(id).map(|w| w.turret) {
                turn(world, turret, intent.angle);
            }
        }
    }
}

//! Contact resolution.

use std::collections::BTreeSet;

use glam::Vec2;
use tracing::debug;

use super::movement::shift_with_child;
use super::{destroy_and_retire, MatchState, Stage};
use crate::command::FragEvent;
use crate::config::MatchConfig;
use crate::entity::{Collidable, ComponentMask, EntityId, Explosive, OwnerLink, Transform};
use crate::geometry::circles_overlap;
use crate::world::World;

struct Body {
    id: EntityId,
    position: Vec2,
    radius: f32,
    explosive: bool,
}

/// Resolves overlapping collidables.
///
/// Pairs are evaluated against positions snapshotted when the stage starts.
/// For each ordered pair `(a, b)` that overlaps:
/// - if either is [`Explosive`], `a` is destroyed along with its child, and
///   its live owner (if any) is credited with a frag;
/// - otherwise `a` steps back by whatever it moved this tick.
///
/// Each entity is destroyed or pushed back at most once per tick.
#[derive(Debug)]
pub struct CollisionStage {
    frag_score: f64,
}

impl CollisionStage {
    /// Creates the stage with the frag reward from `config`.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            frag_score: config.frag_score,
        }
    }

    fn snapshot(world: &World) -> Vec<Body> {
        world
            .query(ComponentMask::TRANSFORM | ComponentMask::COLLIDABLE)
            .into_iter()
            .filter_map(|id| {
                Some(Body {
                    id,
                    position: world.get::<Transform>(id)?.position,
                    radius: world.get::<Collidable>(id)?.radius,
                    explosive: world.has::<Explosive>(id),
                })
            })
            .collect()
    }
}

impl Stage for CollisionStage {
    fn name(&self) -> &'static str {
        "collision"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        let bodies = Self::snapshot(world);

        let mut doomed = BTreeSet::new();
        let mut blocked = BTreeSet::new();
        for a in &bodies {
            for b in &bodies {
                if a.id == b.id || !circles_overlap(a.position, a.radius, b.position, b.radius) {
                    continue;
                }
                if a.explosive || b.explosive {
                    doomed.insert(a.id);
                } else {
                    blocked.insert(a.id);
                }
            }
        }

        for id in blocked.difference(&doomed) {
            if let Some(delta) = state.applied_moves.remove(id) {
                shift_with_child(world, *id, -delta);
            }
        }

        // Owners are checked before anything dies, so simultaneous deaths still credit.
        for id in &doomed {
            let owner = world.get::<OwnerLink>(*id).map(|link| link.owner);
            if let Some(owner) = owner.filter(|owner| world.exists(*owner)) {
                state.frags.push(FragEvent {
                    owner,
                    points: self.frag_score,
                });
            }
        }
        for id in doomed {
            debug!(tick = state.tick, entity = %id, "destroyed on contact");
            destroy_and_retire(world, state, id);
        }
    }
}

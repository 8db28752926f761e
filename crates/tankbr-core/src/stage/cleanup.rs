//! Lifetime expiry.

use super::{destroy_and_retire, MatchState, Stage};
use crate::entity::TimeToLive;
use crate::world::World;

/// Destroys entities whose [`TimeToLive`] reached zero; ticks the rest down.
#[derive(Debug, Default)]
pub struct CleanupStage;

impl CleanupStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for CleanupStage {
    fn name(&self) -> &'static str {
        "cleanup"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        for id in world.ids_with::<TimeToLive>() {
            let expired = match world.get_mut::<TimeToLive>(id) {
                Some(ttl) if ttl.ticks > 0 => {
                    ttl.ticks -= 1;
                    false
                }
                Some(_) => true,
                None => false,
            };
            if expired {
                destroy_and_retire(world, state, id);
            }
        }
    }
}

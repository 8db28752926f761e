//! Persistent speeds to one-tick intents.

use super::{MatchState, Stage};
use crate::entity::{Kinematics, PendingMove, PendingRotate};
use crate::world::World;

/// Turns nonzero [`Kinematics`] into `PendingMove`/`PendingRotate`,
/// overriding whatever the decision stage queued.
#[derive(Debug, Default)]
pub struct KinematicsStage;

impl KinematicsStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for KinematicsStage {
    fn name(&self) -> &'static str {
        "kinematics"
    }

    fn run(&mut self, world: &mut World, _state: &mut MatchState) {
        let moving: Vec<_> = world.iter::<Kinematics>().map(|(id, k)| (id, *k)).collect();
        for (id, kinematics) in moving {
            if kinematics.speed != 0.0 {
                world.insert(
                    id,
                    PendingMove {
                        distance: kinematics.speed,
                    },
                );
            }
            if kinematics.angular_speed != 0.0 {
                world.insert(
                    id,
                    PendingRotate {
                        angle: kinematics.angular_speed,
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_overrides_decided_move() {
        let mut world = World::new();
        let id = world.create();
        world.insert(id, Kinematics::new(20.0, 0.0));
        world.insert(id, PendingMove { distance: 1.0 });

        KinematicsStage::new().run(&mut world, &mut MatchState::new(0));

        assert_eq!(world.get::<PendingMove>(id), Some(&PendingMove { distance: 20.0 }));
        assert!(!world.has::<PendingRotate>(id));
    }

    #[test]
    fn zero_speed_leaves_intents_alone() {
        let mut world = World::new();
        let id = world.create();
        world.insert(id, Kinematics::default());
        world.insert(id, PendingRotate { angle: -3.0 });

        KinematicsStage::new().run(&mut world, &mut MatchState::new(0));

        assert_eq!(world.get::<PendingRotate>(id), Some(&PendingRotate { angle: -3.0 }));
        assert!(!world.has::<PendingMove>(id));
    }
}

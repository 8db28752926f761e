//! Brain invocation and command expansion.

use std::sync::Arc;

use tracing::trace;

use super::{MatchState, Stage};
use crate::brain::Perception;
use crate::command::Command;
use crate::entity::{
    ComponentMask, Controller, DecisionQueue, FireIntent, PendingMove, PendingRotate,
    PendingTurretRotate, TargetSensor, Weapon,
};
use crate::world::World;

/// Asks every armed agent's brain for a decision, then replays every
/// decision queue as one-tick intents.
#[derive(Debug, Default)]
pub struct DecisionStage;

impl DecisionStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn perceive(world: &World, weapon: &Weapon) -> Perception {
        Perception {
            target: world
                .get::<TargetSensor>(weapon.turret)
                .and_then(|sensor| sensor.closest),
        }
    }
}

impl Stage for DecisionStage {
    fn name(&self) -> &'static str {
        "decision"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        for id in world.query(ComponentMask::CONTROLLER | ComponentMask::WEAPON) {
            let Some(perception) = world.get::<Weapon>(id).map(|w| Self::perceive(world, w)) else {
                continue;
            };
            let Some(controller) = world.get_mut::<Controller>(id) else {
                continue;
            };
            let brain = Arc::clone(&controller.brain);
            let memory = controller.memory.take();

            let verdict = brain.decide(&perception, memory, &mut state.rng);

            if let Some(controller) = world.get_mut::<Controller>(id) {
                controller.memory = verdict.memory;
            }
            if let Some(decision) = verdict.decision {
                trace!(entity = %id, brain = brain.kind(), ?decision, "decided");
                world.insert(
                    id,
                    DecisionQueue {
                        commands: decision.commands,
                        ticks_left: decision.ticks,
                    },
                );
            }
        }

        for id in world.ids_with::<DecisionQueue>() {
            let Some(queue) = world.get_mut::<DecisionQueue>(id) else {
                continue;
            };
            let commands = queue.commands.clone();
            queue.ticks_left = queue.ticks_left.saturating_sub(1);
            if queue.ticks_left == 0 {
                world.remove::<DecisionQueue>(id);
            }

            for command in commands {
                match command {
                    Command::Move(distance) => {
                        world.insert(id, PendingMove { distance });
                    }
                    Command::Rotate(angle) => {
                        world.insert(id, PendingRotate { angle });
                    }
                    Command::RotateTurret(angle) => {
                        world.insert(id, PendingTurretRotate { angle });
                    }
                    Command::Fire => {
                        world.insert(id, FireIntent);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::{Brain, Dummy, Memory, Rotator, Sweeper};
    use crate::entity::EntityId;
    use glam::Vec2;

    fn armed(world: &mut World, brain: Arc<dyn Brain>) -> (EntityId, EntityId) {
        let body = world.create();
        let turret = world.create();
        world.insert(turret, TargetSensor::new(100.0, 0.0));
        world.insert(body, Weapon::new(turret, 3));
        world.insert(body, Controller::new(brain));
        (body, turret)
    }

    #[test]
    fn blind_rotator_queues_turret_sweep() {
        let mut world = World::new();
        let mut state = MatchState::new(1);
        let (body, _) = armed(&mut world, Arc::new(Rotator));

        DecisionStage::new().run(&mut world, &mut state);

        assert_eq!(
            world.get::<PendingTurretRotate>(body),
            Some(&PendingTurretRotate { angle: 3.0 })
        );
        assert!(!world.has::<FireIntent>(body));
        assert!(!world.has::<DecisionQueue>(body), "one-tick queue expires");
    }

    #[test]
    fn sighted_rotator_fires() {
        let mut world = World::new();
        let mut state = MatchState::new(1);
        let (body, turret) = armed(&mut world, Arc::new(Rotator));
        if let Some(sensor) = world.get_mut::<TargetSensor>(turret) {
            sensor.closest = Some(Vec2::new(10.0, 0.0));
        }

        DecisionStage::new().run(&mut world, &mut state);

        assert!(world.has::<FireIntent>(body));
    }

    #[test]
    fn memory_is_stored_between_ticks() {
        let mut world = World::new();
        let mut state = MatchState::new(1);
        let (body, _) = armed(&mut world, Arc::new(Sweeper));

        DecisionStage::new().run(&mut world, &mut state);
        DecisionStage::new().run(&mut world, &mut state);

        let memory = world.get::<Controller>(body).and_then(|c| c.memory.clone());
        assert_eq!(
            memory,
            Some(Memory::Sweep {
                fast: true,
                ticks_to_change: 119
            })
        );
    }

    #[test]
    fn multi_tick_queue_replays_until_exhausted() {
        let mut world = World::new();
        let mut state = MatchState::new(1);
        let (body, _) = armed(&mut world, Arc::new(Dummy));
        world.insert(
            body,
            DecisionQueue {
                commands: vec![Command::Move(2.0)],
                ticks_left: 2,
            },
        );

        let mut stage = DecisionStage::new();
        stage.run(&mut world, &mut state);
        assert_eq!(world.remove::<PendingMove>(body), Some(PendingMove { distance: 2.0 }));
        stage.run(&mut world, &mut state);
        assert_eq!(world.remove::<PendingMove>(body), Some(PendingMove { distance: 2.0 }));
        stage.run(&mut world, &mut state);
        assert!(!world.has::<PendingMove>(body));
    }

    #[test]
    fn unarmed_controller_is_ignored() {
        let mut world = World::new();
        let mut state = MatchState::new(1);
        let id = world.create();
        world.insert(id, Controller::new(Arc::new(Rotator)));

        DecisionStage::new().run(&mut world, &mut state);

        assert!(!world.has::<PendingTurretRotate>(id));
    }
}

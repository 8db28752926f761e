//! Test helper functions for setting up matches and reading them back.

use std::sync::Arc;

use glam::Vec2;

use crate::battle::Entrant;
use crate::brain::{Brain, Dummy, DummyRotator, Monkey, NeuralBrain, Rotator, Sweeper};
use crate::config::MatchConfig;
use crate::entity::{EntityId, PlayerCard, Transform, Weapon};
use crate::pipeline::Pipeline;
use crate::spawn::{spawn_tank, TankHandles, TankSpawn};
use crate::world::World;

// =============================================================================
// Setup
// =============================================================================

/// Default constants with a short tick budget.
pub fn short_config(max_match_turns: u32) -> MatchConfig {
    MatchConfig {
        max_match_turns,
        ..MatchConfig::default()
    }
}

/// Places a tank with hull and turret both facing `facing`.
pub fn place_tank(
    pipeline: &mut Pipeline,
    config: &MatchConfig,
    slot: usize,
    position: Vec2,
    facing: f32,
    brain: Option<Arc<dyn Brain>>,
) -> TankHandles {
    spawn_tank(
        pipeline.world_mut(),
        TankSpawn {
            position,
            facing,
            turret_facing: facing,
            card: PlayerCard::new(slot, format!("slot-{slot}")),
            brain,
        },
        config,
    )
}

/// One entrant of every brain kind.
pub fn mixed_roster(config: &MatchConfig) -> Vec<Entrant> {
    vec![
        Entrant::ai("Tank-0->rotator", Arc::new(Rotator)),
        Entrant::ai("Tank-1->fastRotator", Arc::new(Sweeper)),
        Entrant::ai("Tank-2->monkey", Arc::new(Monkey)),
        Entrant::ai("Tank-3->dummy", Arc::new(Dummy)),
        Entrant::ai("Tank-4->dummyRotator", Arc::new(DummyRotator)),
        Entrant::ai("Tank-5->neural", Arc::new(NeuralBrain::seeded(5, config))),
    ]
}

// =============================================================================
// Inspection
// =============================================================================

/// Position of `id`, or NaN if it has no transform.
pub fn position(world: &World, id: EntityId) -> Vec2 {
    world
        .get::<Transform>(id)
        .map_or(Vec2::NAN, |transform| transform.position)
}

/// Live or retired score for `slot`.
pub fn score_of(pipeline: &Pipeline, slot: usize) -> Option<f64> {
    pipeline
        .world()
        .iter::<PlayerCard>()
        .map(|(_, card)| card)
        .chain(pipeline.state().retired.iter().map(|retired| &retired.card))
        .find(|card| card.slot == slot)
        .map(|card| card.score)
}

/// Ammo left in `id`'s weapon.
pub fn ammo(world: &World, id: EntityId) -> Option<u32> {
    world.get::<Weapon>(id).map(|weapon| weapon.ammo)
}

/// Every transform in id order.
pub fn transforms(world: &World) -> Vec<(EntityId, Transform)> {
    world.iter::<Transform>().map(|(id, t)| (id, *t)).collect()
}

/// Runs until the match ends or `limit` ticks pass.
pub fn run_until_end(pipeline: &mut Pipeline, limit: u64) {
    while pipeline.status().is_running() && pipeline.tick() < limit {
        pipeline.step();
    }
}

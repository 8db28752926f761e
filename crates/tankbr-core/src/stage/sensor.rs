//! Laser range finding.

use glam::Vec2;

use super::{MatchState, Stage};
use crate::entity::{Collidable, ComponentMask, TargetSensor, Transform};
use crate::geometry::{distance_squared, heading_vector, segment_intersects_circle};
use crate::world::World;

/// Recomputes every [`TargetSensor`] reading.
///
/// The beam runs from the holder's position along `facing + angle_offset`
/// for `max_range`. Every collidable whose circle the beam crosses is
/// reported, except one sitting exactly on the sensor (its own hull).
#[derive(Debug, Default)]
pub struct SensorStage;

impl SensorStage {
    /// Creates the stage.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Stage for SensorStage {
    fn name(&self) -> &'static str {
        "sensor"
    }

    fn run(&mut self, world: &mut World, _state: &mut MatchState) {
        let targets: Vec<(Vec2, f32)> = world
            .query(ComponentMask::TRANSFORM | ComponentMask::COLLIDABLE)
            .into_iter()
            .filter_map(|id| {
                let position = world.get::<Transform>(id)?.position;
                let radius = world.get::<Collidable>(id)?.radius;
                Some((position, radius))
            })
            .collect();

        for id in world.query(ComponentMask::TRANSFORM | ComponentMask::TARGET_SENSOR) {
            let Some(&Transform {
                position: origin,
                facing,
                ..
            }) = world.get::<Transform>(id)
            else {
                continue;
            };
            let Some(sensor) = world.get_mut::<TargetSensor>(id) else {
                continue;
            };

            let range = sensor.max_range;
            let end = origin + heading_vector(facing + sensor.angle_offset) * range;
            sensor.found = targets
                .iter()
                .filter(|(position, radius)| {
                    *position != origin
                        && segment_intersects_circle(origin, end, range, *position, *radius)
                })
                .map(|(position, _)| *position)
                .collect();
            sensor.closest = sensor
                .found
                .iter()
                .copied()
                .min_by(|a, b| {
                    distance_squared(origin, *a).total_cmp(&distance_squared(origin, *b))
                });
        }
    }
}

//! Entity factories for tanks and bullets.

use std::sync::Arc;

use glam::Vec2;

use crate::brain::Brain;
use crate::config::MatchConfig;
use crate::entity::{
    CombatTag, Collidable, Controller, EntityId, Explosive, Kinematics, OwnerLink, ParentLink,
    PlayerCard, Sprite, TargetSensor, TimeToLive, Transform, Weapon,
};
use crate::geometry::heading_vector;
use crate::world::World;

/// Where and as whom a tank enters the match.
#[derive(Debug, Clone)]
pub struct TankSpawn {
    /// Hull and turret position.
    pub position: Vec2,
    /// Hull facing in degrees.
    pub facing: f32,
    /// Turret facing in degrees.
    pub turret_facing: f32,
    /// Roster slot and display name.
    pub card: PlayerCard,
    /// `None` for a tank steered by host input.
    pub brain: Option<Arc<dyn Brain>>,
}

/// The two entities making up a tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TankHandles {
    /// Hull: collides, carries the weapon and the player card.
    pub body: EntityId,
    /// Turret: aims the weapon and carries the laser.
    pub turret: EntityId,
}

/// Creates a hull with its turret.
pub fn spawn_tank(world: &mut World, spawn: TankSpawn, config: &MatchConfig) -> TankHandles {
    let body = world.create();
    let turret = world.create();

    world.insert(
        body,
        Transform::new(spawn.position, spawn.facing).with_size(config.tank_body_size),
    );
    world.insert(
        body,
        Collidable {
            radius: config.tank_radius(),
        },
    );
    world.insert(body, Weapon::new(turret, config.ammo));
    world.insert(body, ParentLink { child: turret });
    world.insert(body, Kinematics::default());
    world.insert(body, CombatTag);
    world.insert(body, spawn.card);
    world.insert(body, Sprite::TankBody);
    if let Some(brain) = spawn.brain {
        world.insert(body, Controller::new(brain));
    }

    world.insert(
        turret,
        Transform::new(spawn.position, spawn.turret_facing).with_size(config.turret_size),
    );
    world.insert(turret, TargetSensor::new(config.laser_range, 0.0));
    world.insert(turret, Kinematics::default());
    world.insert(turret, Sprite::Turret);

    TankHandles { body, turret }
}

/// Creates a bullet in front of `turret`, flying along its facing.
pub fn spawn_bullet(
    world: &mut World,
    owner: EntityId,
    turret: &Transform,
    config: &MatchConfig,
) -> EntityId {
    let position = turret.position + heading_vector(turret.facing) * config.bullet_position_offset;

    let bullet = world.create();
    world.insert(
        bullet,
        Transform::new(position, turret.facing).with_size(config.bullet_size),
    );
    world.insert(
        bullet,
        Collidable {
            radius: config.bullet_radius,
        },
    );
    world.insert(bullet, Kinematics::new(config.bullet_speed, 0.0));
    world.insert(bullet, OwnerLink { owner });
    world.insert(bullet, Explosive);
    world.insert(
        bullet,
        TimeToLive {
            ticks: config.bullet_ttl,
        },
    );
    world.insert(bullet, Sprite::Bullet);
    bullet
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::brain::Rotator;
    use crate::entity::ComponentMask;

    #[test]
    fn tank_is_wired_together() {
        let mut world = World::new();
        let config = MatchConfig::default();
        let tank = spawn_tank(
            &mut world,
            TankSpawn {
                position: Vec2::new(10.0, 20.0),
                facing: 45.0,
                turret_facing: 90.0,
                card: PlayerCard::new(0, "Tank-0->rotator"),
                brain: Some(Arc::new(Rotator)),
            },
            &config,
        );

        assert_eq!(world.get::<ParentLink>(tank.body).map(|l| l.child), Some(tank.turret));
        assert_eq!(world.get::<Weapon>(tank.body).map(|w| w.turret), Some(tank.turret));
        assert_eq!(world.get::<Weapon>(tank.body).map(|w| w.ammo), Some(config.ammo));
        assert!(world.kinds_of(tank.body).contains(
            ComponentMask::COMBAT_TAG | ComponentMask::CONTROLLER | ComponentMask::COLLIDABLE
        ));
        assert!(world.has::<TargetSensor>(tank.turret));
        assert!(!world.has::<Collidable>(tank.turret));
    }

    #[test]
    fn steered_tank_has_no_controller() {
        let mut world = World::new();
        let tank = spawn_tank(
            &mut world,
            TankSpawn {
                position: Vec2::ZERO,
                facing: 0.0,
                turret_facing: 0.0,
                card: PlayerCard::new(0, "<<Player>>"),
                brain: None,
            },
            &MatchConfig::default(),
        );
        assert!(!world.has::<Controller>(tank.body));
    }

    #[test]
    fn bullet_appears_ahead_of_turret() {
        let mut world = World::new();
        let config = MatchConfig::default();
        let owner = world.create();
        let turret = Transform::new(Vec2::new(100.0, 100.0), 90.0);

        let bullet = spawn_bullet(&mut world, owner, &turret, &config);

        let t = world.get::<Transform>(bullet).copied().unwrap_or_default();
        let expected = Vec2::new(100.0, 100.0 + config.bullet_position_offset);
        assert!(t.position.abs_diff_eq(expected, 1e-3));
        assert_eq!(t.facing, 90.0);
        assert_eq!(world.get::<OwnerLink>(bullet), Some(&OwnerLink { owner }));
        assert_eq!(
            world.get::<TimeToLive>(bullet).map(|ttl| ttl.ticks),
            Some(config.bullet_ttl)
        );
        assert!(world.has::<Explosive>(bullet));
    }
}

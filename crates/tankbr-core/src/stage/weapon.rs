//! Firing and reloading.

use tracing::trace;

use super::{MatchState, Stage};
use crate::config::MatchConfig;
use crate::entity::{FireIntent, Transform, Weapon};
use crate::spawn::spawn_bullet;
use crate::world::World;

// =============================================================================
// Discharge
// =============================================================================

/// Fires every loaded weapon whose holder carries a [`FireIntent`].
///
/// The intent is consumed whether or not a shot leaves the barrel.
#[derive(Debug)]
pub struct DischargeStage {
    config: MatchConfig,
}

impl DischargeStage {
    /// Creates the stage with bullet parameters from `config`.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }
}

impl Stage for DischargeStage {
    fn name(&self) -> &'static str {
        "discharge"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        for id in world.ids_with::<FireIntent>() {
            world.remove::<FireIntent>(id);

            let Some(weapon) = world.get::<Weapon>(id).copied() else {
                continue;
            };
            if !weapon.loaded {
                continue;
            }
            let Some(turret) = world.get::<Transform>(weapon.turret).copied() else {
                continue;
            };

            let bullet = spawn_bullet(world, id, &turret, &self.config);
            if let Some(weapon) = world.get_mut::<Weapon>(id) {
                weapon.loaded = false;
            }
            trace!(tick = state.tick, shooter = %id, %bullet, "fired");
        }
    }
}

// =============================================================================
// Reload
// =============================================================================

/// Chambers the next round.
///
/// An empty chamber with ammo left starts a countdown of `gun_load_time`
/// ticks, consuming one round; the weapon is loaded when it reaches zero.
#[derive(Debug)]
pub struct ReloadStage {
    load_time: u32,
}

impl ReloadStage {
    /// Creates the stage with the reload time from `config`.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self {
            load_time: config.gun_load_time,
        }
    }
}

impl Stage for ReloadStage {
    fn name(&self) -> &'static str {
        "reload"
    }

    fn run(&mut self, world: &mut World, _state: &mut MatchState) {
        for id in world.ids_with::<Weapon>() {
            let Some(weapon) = world.get_mut::<Weapon>(id) else {
                continue;
            };
            if weapon.loaded {
                continue;
            }
            if weapon.reload_countdown == 0 {
                if weapon.ammo > 0 {
                    weapon.ammo -= 1;
                    weapon.reload_countdown = self.load_time;
                }
            } else {
                weapon.reload_countdown -= 1;
                weapon.loaded = weapon.reload_countdown == 0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{EntityId, Explosive, OwnerLink};
    use glam::Vec2;

    fn gun(world: &mut World, ammo: u32, loaded: bool) -> (EntityId, EntityId) {
        let turret = world.create();
        world.insert(turret, Transform::new(Vec2::ZERO, 0.0));
        let body = world.create();
        let mut weapon = Weapon::new(turret, ammo);
        weapon.loaded = loaded;
        world.insert(body, weapon);
        (body, turret)
    }

    fn weapon(world: &World, id: EntityId) -> Weapon {
        world
            .get::<Weapon>(id)
            .copied()
            .unwrap_or(Weapon::new(EntityId::new(u64::MAX), u32::MAX))
    }

    mod discharge_tests {
        use super::*;

        #[test]
        fn loaded_weapon_fires_once() {
            let mut world = World::new();
            let mut state = MatchState::new(0);
            let (body, _) = gun(&mut world, 0, true);
            world.insert(body, FireIntent);

            DischargeStage::new(&MatchConfig::default()).run(&mut world, &mut state);

            assert!(!weapon(&world, body).loaded);
            assert!(!world.has::<FireIntent>(body));
            let bullets = world.ids_with::<Explosive>();
            assert_eq!(bullets.len(), 1);
            assert_eq!(world.get::<OwnerLink>(bullets[0]), Some(&OwnerLink { owner: body }));
        }

        #[test]
        fn unloaded_weapon_only_drops_intent() {
            let mut world = World::new();
            let mut state = MatchState::new(0);
            let (body, _) = gun(&mut world, 5, false);
            world.insert(body, FireIntent);

            DischargeStage::new(&MatchConfig::default()).run(&mut world, &mut state);

            assert!(!world.has::<FireIntent>(body));
            assert_eq!(world.count::<Explosive>(), 0);
        }
    }

    mod reload_tests {
        use super::*;

        #[test]
        fn reload_cycle_takes_load_time() {
            let mut world = World::new();
            let mut state = MatchState::new(0);
            let (body, _) = gun(&mut world, 2, false);
            let config = MatchConfig {
                gun_load_time: 3,
                ..MatchConfig::default()
            };
            let mut stage = ReloadStage::new(&config);

            stage.run(&mut world, &mut state);
            assert_eq!(weapon(&world, body).ammo, 1);
            assert_eq!(weapon(&world, body).reload_countdown, 3);

            stage.run(&mut world, &mut state);
            stage.run(&mut world, &mut state);
            assert!(!weapon(&world, body).loaded);
            stage.run(&mut world, &mut state);
            assert!(weapon(&world, body).loaded);
            assert_eq!(weapon(&world, body).ammo, 1);
        }

        #[test]
        fn empty_weapon_stays_empty() {
            let mut world = World::new();
            let mut state = MatchState::new(0);
            let (body, _) = gun(&mut world, 0, false);
            ReloadStage::new(&MatchConfig::default()).run(&mut world, &mut state);
            let after = weapon(&world, body);
            assert!(!after.loaded);
            assert_eq!(after.ammo, 0);
            assert_eq!(after.reload_countdown, 0);
        }

        #[test]
        fn loaded_weapon_keeps_its_reserve() {
            let mut world = World::new();
            let mut state = MatchState::new(0);
            let (body, _) = gun(&mut world, 4, true);
            ReloadStage::new(&MatchConfig::default()).run(&mut world, &mut state);
            assert_eq!(weapon(&world, body).ammo, 4);
        }
    }
}

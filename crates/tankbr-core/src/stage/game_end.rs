//! Match termination.

use tracing::debug;

use super::{EndReason, GameStatus, MatchState, Stage};
use crate::config::MatchConfig;
use crate::entity::{CombatTag, Weapon};
use crate::world::World;

/// Decides when the match is over.
///
/// Every tick the tick budget shrinks by one, and so does the grace period
/// once every weapon is out of ammo. Conditions are checked in priority
/// order and the first that holds wins:
///
/// 1. grace period expired: [`EndReason::OutOfAmmo`]
/// 2. tick budget spent: [`EndReason::OutOfTime`]
/// 3. at most one tank left: [`EndReason::LastManStanding`]
/// 4. quit requested: [`EndReason::Manual`]
#[derive(Debug)]
pub struct GameEndStage {
    turns_left: i64,
    ammo_timeout: u32,
    no_ammo_left: Option<u32>,
}

impl GameEndStage {
    /// Creates the stage with limits from `config`.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self::with_limits(config.max_match_turns, config.ammo_timeout)
    }

    /// Creates the stage with explicit limits.
    #[must_use]
    pub fn with_limits(max_turns: u32, ammo_timeout: u32) -> Self {
        Self {
            turns_left: i64::from(max_turns),
            ammo_timeout,
            no_ammo_left: None,
        }
    }

    /// Ticks left in the budget.
    #[must_use]
    pub const fn turns_left(&self) -> i64 {
        self.turns_left
    }

    fn evaluate(&mut self, world: &World, quit_requested: bool) -> Option<EndReason> {
        self.turns_left -= 1;

        let mut out_of_ammo = false;
        match self.no_ammo_left.as_mut() {
            Some(left) => {
                *left = left.saturating_sub(1);
                out_of_ammo = *left == 0;
            }
            None => {
                if world.iter::<Weapon>().all(|(_, weapon)| weapon.ammo == 0) {
                    debug!(grace = self.ammo_timeout, "every weapon is dry");
                    self.no_ammo_left = Some(self.ammo_timeout);
                }
            }
        }

        if out_of_ammo {
            Some(EndReason::OutOfAmmo)
        } else if self.turns_left <= 0 {
            Some(EndReason::OutOfTime)
        } else if world.count::<CombatTag>() <= 1 {
            Some(EndReason::LastManStanding)
        } else if quit_requested {
            Some(EndReason::Manual)
        } else {
            None
        }
    }
}

impl Stage for GameEndStage {
    fn name(&self) -> &'static str {
        "game_end"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        if !state.status.is_running() {
            return;
        }
        if let Some(reason) = self.evaluate(world, state.quit_requested) {
            debug!(tick = state.tick, %reason, "match ended");
            state.status = GameStatus::Ended(reason);
            state.ended_this_tick = true;
        }
    }
}

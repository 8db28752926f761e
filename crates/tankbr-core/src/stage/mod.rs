//! Per-tick update stages.
//!
//! A stage reads and mutates the [`World`] directly. Stages run strictly in
//! sequence, so each one sees every mutation made by the stages before it in
//! the same tick. Cross-stage data that is not an attribute record (frag
//! events, the displacement each entity moved this tick, retired player
//! cards, the game status) travels in [`MatchState`].
//!
//! # Order
//!
//! [`Pipeline::standard`](crate::pipeline::Pipeline::standard) installs:
//!
//! 1. [`DecisionStage`]: brains emit commands, queues become intents
//! 2. [`KinematicsStage`]: persistent speeds become intents
//! 3. [`MovementStage`]: apply `PendingMove`
//! 4. [`RotationStage`]: apply `PendingRotate`/`PendingTurretRotate`
//! 5. [`SensorStage`]: recompute laser readings
//! 6. [`CollisionStage`]: explode or push back overlapping bodies
//! 7. [`DischargeStage`]: loaded weapons with a fire intent spawn bullets
//! 8. [`ReloadStage`]: chamber the next round
//! 9. [`CleanupStage`]: expire entities whose lifetime ran out
//! 10. [`GameEndStage`]: decide whether the match is over
//! 11. [`ScoreStage`]: credit frags, survival and the last-man bonus
//!
//! # Invariants
//!
//! - Stages iterate entities in ascending `EntityId` order
//! - Stages never panic on dangling links; they skip them
//! - Randomness comes only from `MatchState::rng`

mod cleanup;
mod collision;
mod decision;
mod game_end;
mod kinematics;
mod movement;
mod score;
mod sensor;
mod weapon;

pub use cleanup::CleanupStage;
pub use collision::CollisionStage;
pub use decision::DecisionStage;
pub use game_end::GameEndStage;
pub use kinematics::KinematicsStage;
pub use movement::{MovementStage, RotationStage};
pub use score::ScoreStage;
pub use sensor::SensorStage;
pub use weapon::{DischargeStage, ReloadStage};

use std::collections::BTreeMap;
use std::fmt;

use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::command::FragEvent;
use crate::entity::{EntityId, ParentLink, PlayerCard};
use crate::world::World;

// =============================================================================
// Game status
// =============================================================================

/// Why a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndReason {
    /// The host asked to stop.
    Manual,
    /// Every weapon ran dry and the grace period expired.
    OutOfAmmo,
    /// The tick budget ran out.
    OutOfTime,
    /// At most one tank is left.
    LastManStanding,
}

impl fmt::Display for EndReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Manual => "manual",
            Self::OutOfAmmo => "out of ammo",
            Self::OutOfTime => "out of time",
            Self::LastManStanding => "last man standing",
        };
        f.write_str(text)
    }
}

/// Match lifecycle. `Ended` is absorbing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Still playing.
    #[default]
    Running,
    /// Over, for the given reason.
    Ended(EndReason),
}

impl GameStatus {
    /// True while the match is still playing.
    #[must_use]
    pub const fn is_running(self) -> bool {
        matches!(self, Self::Running)
    }

    /// The end reason, if the match is over.
    #[must_use]
    pub const fn reason(self) -> Option<EndReason> {
        match self {
            Self::Running => None,
            Self::Ended(reason) => Some(reason),
        }
    }
}

// =============================================================================
// Match state
// =============================================================================

/// Card of a tank destroyed earlier in the match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetiredCard {
    /// The destroyed body.
    pub entity: EntityId,
    /// Its card as of destruction; late frags still land here.
    pub card: PlayerCard,
}

/// Non-record state shared by the stages of one match.
#[derive(Debug, Clone)]
pub struct MatchState {
    /// Ticks completed so far.
    pub tick: u64,
    /// The match's only source of randomness.
    pub rng: ChaCha8Rng,
    /// Current lifecycle state.
    pub status: GameStatus,
    /// Set on the tick `status` became `Ended`.
    pub ended_this_tick: bool,
    /// The host asked to stop.
    pub quit_requested: bool,
    /// Frags awaiting score aggregation.
    pub frags: Vec<FragEvent>,
    /// Displacement each entity moved during this tick's movement stage.
    pub applied_moves: BTreeMap<EntityId, Vec2>,
    /// Cards of destroyed tanks.
    pub retired: Vec<RetiredCard>,
}

impl MatchState {
    /// Fresh state seeded for one match.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_rng(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Fresh state around an existing generator.
    #[must_use]
    pub fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            tick: 0,
            rng,
            status: GameStatus::Running,
            ended_this_tick: false,
            quit_requested: false,
            frags: Vec::new(),
            applied_moves: BTreeMap::new(),
            retired: Vec::new(),
        }
    }

    /// Clears per-tick scratch data.
    pub fn begin_tick(&mut self) {
        self.applied_moves.clear();
        self.ended_this_tick = false;
    }

    /// Moves a destroyed tank's card to the retired list.
    pub fn retire(&mut self, entity: EntityId, card: PlayerCard) {
        self.retired.push(RetiredCard { entity, card });
    }
}

// =============================================================================
// Stage trait
// =============================================================================

/// One step of the per-tick update.
///
/// # Example
///
/// ```
/// use tankbr_core::stage::{MatchState, Stage};
/// use tankbr_core::world::World;
///
/// struct CountTicks(u32);
///
/// impl Stage for CountTicks {
///     fn name(&self) -> &'static str {
///         "count"
///     }
///
///     fn run(&mut self, _world: &mut World, _state: &mut MatchState) {
///         self.0 += 1;
///     }
/// }
///
/// let mut stage = CountTicks(0);
/// stage.run(&mut World::new(), &mut MatchState::new(1));
/// assert_eq!(stage.0, 1);
/// ```
pub trait Stage: Send {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Runs this stage for the current tick.
    fn run(&mut self, world: &mut World, state: &mut MatchState);
}

/// Destroys `id` and its children, retiring its card and any child's.
pub(crate) fn destroy_and_retire(world: &mut World, state: &mut MatchState, id: EntityId) {
    let mut next = Some(id);
    while let Some(current) = next {
        if !world.exists(current) {
            break;
        }
        if let Some(card) = world.remove::<PlayerCard>(current) {
            state.retire(current, card);
        }
        next = world.get::<ParentLink>(current).map(|link| link.child);
        world.destroy(current);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_is_object_safe() {
        fn _accepts_boxed(_stage: Box<dyn Stage>) {}
    }

    #[test]
    fn begin_tick_clears_scratch() {
        let mut state = MatchState::new(1);
        state.applied_moves.insert(EntityId::new(1), Vec2::ONE);
        state.ended_this_tick = true;
        state.begin_tick();
        assert!(state.applied_moves.is_empty());
        assert!(!state.ended_this_tick);
    }

    #[test]
    fn status_helpers() {
        assert!(GameStatus::Running.is_running());
        let ended = GameStatus::Ended(EndReason::OutOfTime);
        assert!(!ended.is_running());
        assert_eq!(ended.reason(), Some(EndReason::OutOfTime));
        assert_eq!(EndReason::LastManStanding.to_string(), "last man standing");
    }

    #[test]
    fn destroy_and_retire_keeps_cards() {
        let mut world = World::new();
        let mut state = MatchState::new(1);
        let body = world.create();
        let turret = world.create();
        world.insert(body, ParentLink { child: turret });
        world.insert(body, PlayerCard::new(0, "a"));

        destroy_and_retire(&mut world, &mut state, body);

        assert!(world.is_empty());
        assert_eq!(state.retired.len(), 1);
        assert_eq!(state.retired[0].entity, body);
        assert_eq!(state.retired[0].card.name, "a");
    }
}

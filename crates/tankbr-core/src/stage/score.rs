//! Score aggregation.

use super::{MatchState, Stage};
use crate::config::MatchConfig;
use crate::entity::{CombatTag, ComponentMask, PlayerCard};
use crate::world::World;

/// Credits frags, pays the survival trickle and the last-man bonus.
#[derive(Debug)]
pub struct ScoreStage {
    survive_per_turn: f64,
    last_man_score: f64,
}

impl ScoreStage {
    /// Creates the stage with rewards from `config`.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self::with_rewards(config.survive_score_per_turn(), config.last_man_score)
    }

    /// Creates the stage with explicit rewards.
    #[must_use]
    pub const fn with_rewards(survive_per_turn: f64, last_man_score: f64) -> Self {
        Self {
            survive_per_turn,
            last_man_score,
        }
    }
}

impl Stage for ScoreStage {
    fn name(&self) -> &'static str {
        "score"
    }

    fn run(&mut self, world: &mut World, state: &mut MatchState) {
        for frag in std::mem::take(&mut state.frags) {
            if let Some(card) = world.get_mut::<PlayerCard>(frag.owner) {
                card.score += frag.points;
            } else if let Some(retired) = state
                .retired
                .iter_mut()
                .find(|retired| retired.entity == frag.owner)
            {
                retired.card.score += frag.points;
            }
        }

        let survivors = world.query(ComponentMask::COMBAT_TAG | ComponentMask::PLAYER_CARD);
        for id in &survivors {
            if let Some(card) = world.get_mut::<PlayerCard>(*id) {
                card.score += self.survive_per_turn;
            }
        }

        if state.ended_this_tick && world.count::<CombatTag>() == 1 {
            for id in &survivors {
                if let Some(card) = world.get_mut::<PlayerCard>(*id) {
                    card.score += self.last_man_score;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::FragEvent;
    use crate::entity::EntityId;
    use crate::stage::GameEndStage;
    use proptest::prelude::*;

    const TRICKLE: f64 = 0.02;
    const LAST_MAN: f64 = 3.0;

    fn agent(world: &mut World, score: f64) -> EntityId {
        let id = world.create();
        world.insert(id, CombatTag);
        let mut card = PlayerCard::new(0, "test_agent");
        card.score = score;
        world.insert(id, card);
        id
    }

    fn score(world: &World, id: EntityId) -> f64 {
        world.get::<PlayerCard>(id).map_or(f64::NAN, |c| c.score)
    }

    fn tick(world: &mut World, state: &mut MatchState, end: &mut GameEndStage) {
        state.begin_tick();
        end.run(world, state);
        ScoreStage::with_rewards(TRICKLE, LAST_MAN).run(world, state);
    }

    proptest! {
        #[test]
        fn frag_is_added_with_trickle(start in -1000i32..1000, gained in -1000i32..1000) {
            let mut world = World::new();
            let mut state = MatchState::new(0);
            let a = agent(&mut world, f64::from(start));
            agent(&mut world, 0.0);
            state.frags.push(FragEvent { owner: a, points: f64::from(gained) });

            tick(&mut world, &mut state, &mut GameEndStage::with_limits(10, 10));

            let expected = f64::from(start) + f64::from(gained) + TRICKLE;
            prop_assert!((score(&world, a) - expected).abs() < 1e-9);
            prop_assert!(state.frags.is_empty());
        }
    }

    #[test]
    fn two_survivors_at_end_get_no_bonus() {
        let mut world = World::new();
        let mut state = MatchState::new(0);
        let a = agent(&mut world, 0.0);
        let b = agent(&mut world, 0.0);

        tick(&mut world, &mut state, &mut GameEndStage::with_limits(1, 10));

        assert!(!state.status.is_running());
        assert!((score(&world, a) - TRICKLE).abs() < 1e-12);
        assert!((score(&world, b) - TRICKLE).abs() < 1e-12);
    }

    #[test]
    fn lone_victor_gets_bonus() {
        let mut world = World::new();
        let mut state = MatchState::new(0);
        let a = agent(&mut world, 0.0);

        tick(&mut world, &mut state, &mut GameEndStage::with_limits(10, 10));

        assert!((score(&world, a) - (TRICKLE + LAST_MAN)).abs() < 1e-12);
    }

    #[test]
    fn bonus_is_paid_only_on_the_ending_tick() {
        let mut world = World::new();
        let mut state = MatchState::new(0);
        let a = agent(&mut world, 0.0);
        let mut end = GameEndStage::with_limits(10, 10);

        tick(&mut world, &mut state, &mut end);
        tick(&mut world, &mut state, &mut end);

        assert!((score(&world, a) - (2.0 * TRICKLE + LAST_MAN)).abs() < 1e-12);
    }

    #[test]
    fn frag_for_dead_owner_lands_on_retired_card() {
        let mut world = World::new();
        let mut state = MatchState::new(0);
        let dead = EntityId::new(42);
        state.retire(dead, PlayerCard::new(3, "gone"));
        state.frags.push(FragEvent {
            owner: dead,
            points: 1.0,
        });

        ScoreStage::with_rewards(TRICKLE, LAST_MAN).run(&mut world, &mut state);

        assert!((state.retired[0].card.score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn frag_for_unknown_owner_is_dropped() {
        let mut world = World::new();
        let mut state = MatchState::new(0);
        state.frags.push(FragEvent {
            owner: EntityId::new(7),
            points: 1.0,
        });
        ScoreStage::with_rewards(TRICKLE, LAST_MAN).run(&mut world, &mut state);
        assert!(state.frags.is_empty());
    }
}

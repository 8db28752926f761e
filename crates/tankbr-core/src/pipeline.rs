//! The per-tick driver.
//!
//! A [`Pipeline`] owns one [`World`], the [`MatchState`] shared by its stages,
//! and the ordered stage list. [`Pipeline::step`] runs every stage once:
//!
//! 1. **BEGIN**: clear per-tick scratch in `MatchState`
//! 2. **STAGES**: run each stage in installation order
//! 3. **ADVANCE**: bump the tick counter
//! 4. **NOTIFY**: on the tick the match ends, fire end callbacks once
//!
//! # Determinism
//!
//! Stages walk entities in ascending id order and draw randomness only from
//! `MatchState::rng`, so two pipelines built from the same seed and fed the
//! same setup produce identical worlds tick for tick.
//!
//! # Example
//!
//! ```
//! use tankbr_core::config::MatchConfig;
//! use tankbr_core::pipeline::Pipeline;
//!
//! let config = MatchConfig {
//!     max_match_turns: 3,
//!     ..MatchConfig::default()
//! };
//! let mut pipeline = Pipeline::standard(&config, 42);
//!
//! while pipeline.status().is_running() {
//!     pipeline.step();
//! }
//! // An empty world has no one left standing.
//! assert_eq!(pipeline.tick(), 1);
//! ```

use std::fmt;

use tracing::{debug, trace_span};

use crate::config::MatchConfig;
use crate::stage::{
    CleanupStage, CollisionStage, DecisionStage, DischargeStage, EndReason, GameEndStage,
    GameStatus, KinematicsStage, MatchState, MovementStage, ReloadStage, RotationStage,
    ScoreStage, SensorStage, Stage,
};
use crate::world::World;

/// Callback fired once when the match ends.
pub type EndCallback = Box<dyn FnMut(EndReason) + Send>;

// =============================================================================
// Pipeline
// =============================================================================

/// World, match state, and the stages that advance them.
pub struct Pipeline {
    world: World,
    state: MatchState,
    stages: Vec<Box<dyn Stage>>,
    on_end: Vec<EndCallback>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("world", &self.world)
            .field("tick", &self.state.tick)
            .field("status", &self.state.status)
            .field("stages", &self.stage_names())
            .field("on_end", &format!("[{} callbacks]", self.on_end.len()))
            .finish()
    }
}

impl Pipeline {
    /// Empty pipeline with no stages.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            world: World::new(),
            state: MatchState::new(seed),
            stages: Vec::new(),
            on_end: Vec::new(),
        }
    }

    /// Pipeline with the eleven battle stages installed in order.
    #[must_use]
    pub fn standard(config: &MatchConfig, seed: u64) -> Self {
        let mut pipeline = Self::new(seed);
        pipeline.add_stage(Box::new(DecisionStage::new()));
        pipeline.add_stage(Box::new(KinematicsStage::new()));
        pipeline.add_stage(Box::new(MovementStage::new()));
        pipeline.add_stage(Box::new(RotationStage::new()));
        pipeline.add_stage(Box::new(SensorStage::new()));
        pipeline.add_stage(Box::new(CollisionStage::new(config)));
        pipeline.add_stage(Box::new(DischargeStage::new(config)));
        pipeline.add_stage(Box::new(ReloadStage::new(config)));
        pipeline.add_stage(Box::new(CleanupStage::new()));
        pipeline.add_stage(Box::new(GameEndStage::new(config)));
        pipeline.add_stage(Box::new(ScoreStage::new(config)));
        pipeline
    }

    /// Appends a stage; stages run in the order they are added.
    pub fn add_stage(&mut self, stage: Box<dyn Stage>) {
        self.stages.push(stage);
    }

    /// Names of the installed stages, in run order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Registers a callback fired once, on the tick the match ends.
    pub fn on_end(&mut self, callback: impl FnMut(EndReason) + Send + 'static) {
        self.on_end.push(Box::new(callback));
    }

    /// Runs one tick. Does nothing once the match has ended.
    pub fn step(&mut self) -> GameStatus {
        if !self.state.status.is_running() {
            return self.state.status;
        }

        self.state.begin_tick();
        for stage in &mut self.stages {
            let _span = trace_span!("stage", name = stage.name(), tick = self.state.tick).entered();
            stage.run(&mut self.world, &mut self.state);
        }
        self.state.tick += 1;

        if self.state.ended_this_tick {
            if let Some(reason) = self.state.status.reason() {
                debug!(tick = self.state.tick, %reason, "notifying end of match");
                for callback in &mut self.on_end {
                    callback(reason);
                }
            }
        }
        self.state.status
    }

    /// Read access to the entity store.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Mutable access to the entity store, for setup and host input.
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Read access to the shared match state.
    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    /// Mutable access to the shared match state.
    pub fn state_mut(&mut self) -> &mut MatchState {
        &mut self.state
    }

    /// World and state borrowed together.
    pub fn parts_mut(&mut self) -> (&mut World, &mut MatchState) {
        (&mut self.world, &mut self.state)
    }

    /// Ticks completed so far.
    #[must_use]
    pub fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> GameStatus {
        self.state.status
    }
}

// =============================================================================
// Tests
// =============================================================================

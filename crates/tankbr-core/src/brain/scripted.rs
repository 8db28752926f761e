//! Hand-written rule brains.

use rand::{Rng, RngCore};

use super::{Brain, Memory, Perception, Verdict};
use crate::command::{Command, Decision};

const SWEEP_DEGREES: f32 = 3.0;
const FAST_SWEEP: u32 = 3;
const SLOW_SWEEP: u32 = 1;

const WANDER_CHANCE: f64 = 0.1;
const WANDER_TICKS: u32 = 30;
const BURST_TICKS: u32 = 10;

fn fire() -> Decision {
    Decision::once(vec![Command::Fire])
}

fn sweep(degrees: f32) -> Decision {
    Decision::once(vec![Command::RotateTurret(degrees)])
}

/// Ticks to turn the turret one full circle at `rate` degrees per tick.
const fn full_circle(rate: u32) -> u32 {
    360 / rate
}

// =============================================================================
// Rotator
// =============================================================================

/// Fires when a target is in sight, otherwise sweeps the turret.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rotator;

impl Brain for Rotator {
    fn kind(&self) -> &str {
        "rotator"
    }

    fn decide(
        &self,
        perception: &Perception,
        _memory: Option<Memory>,
        _rng: &mut dyn RngCore,
    ) -> Verdict {
        if perception.target.is_some() {
            Verdict::act(fire())
        } else {
            Verdict::act(sweep(SWEEP_DEGREES))
        }
    }
}

// =============================================================================
// Sweeper
// =============================================================================

/// Alternates one fast forward circle with one slow backward circle.
///
/// Fires when a target is in sight; the sweep phase keeps counting down
/// while it does.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sweeper;

impl Brain for Sweeper {
    fn kind(&self) -> &str {
        "fastRotator"
    }

    fn decide(
        &self,
        perception: &Perception,
        memory: Option<Memory>,
        _rng: &mut dyn RngCore,
    ) -> Verdict {
        let (fast, ticks_to_change) = match memory {
            Some(Memory::Sweep {
                fast,
                ticks_to_change,
            }) => match ticks_to_change.saturating_sub(1) {
                0 if fast => (false, full_circle(SLOW_SWEEP)),
                0 => (true, full_circle(FAST_SWEEP)),
                left => (fast, left),
            },
            _ => (true, full_circle(FAST_SWEEP)),
        };
        let memory = Memory::Sweep {
            fast,
            ticks_to_change,
        };

        let decision = if perception.target.is_some() {
            fire()
        } else if fast {
            sweep(FAST_SWEEP as f32)
        } else {
            sweep(-(SLOW_SWEEP as f32))
        };
        Verdict::act(decision).remember(memory)
    }
}

// =============================================================================
// Monkey
// =============================================================================

/// Erratic agent: occasionally wanders, otherwise fires in bursts.
///
/// Whatever it decides is repeated from memory for a while before it looks
/// again.
#[derive(Debug, Clone, Copy, Default)]
pub struct Monkey;

impl Brain for Monkey {
    fn kind(&self) -> &str {
        "monkey"
    }

    fn decide(
        &self,
        perception: &Perception,
        memory: Option<Memory>,
        rng: &mut dyn RngCore,
    ) -> Verdict {
        if let Some(Memory::Repeat {
            ticks_left,
            decision,
        }) = memory
        {
            if ticks_left > 0 {
                return Verdict::act(decision.clone()).remember(Memory::Repeat {
                    ticks_left: ticks_left - 1,
                    decision,
                });
            }
        }

        if rng.gen::<f64>() > 1.0 - WANDER_CHANCE {
            let distance: i8 = rng.gen_range(-2..=3);
            let angle: i8 = rng.gen_range(-3..=3);
            let decision = Decision::once(vec![
                Command::Move(f32::from(distance)),
                Command::Rotate(f32::from(angle)),
            ]);
            return Verdict::act(decision.clone()).remember(Memory::Repeat {
                ticks_left: WANDER_TICKS,
                decision,
            });
        }

        if perception.target.is_some() {
            let decision = fire();
            Verdict::act(decision.clone()).remember(Memory::Repeat {
                ticks_left: BURST_TICKS,
                decision,
            })
        } else {
            Verdict::act(sweep(SWEEP_DEGREES))
        }
    }
}

// =============================================================================
// Dummies
// =============================================================================

/// Sits still and never acts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dummy;

impl Brain for Dummy {
    fn kind(&self) -> &str {
        "dummy"
    }

    fn decide(
        &self,
        _perception: &Perception,
        _memory: Option<Memory>,
        _rng: &mut dyn RngCore,
    ) -> Verdict {
        Verdict::default()
    }
}

/// Sweeps its turret forever and never fires.
#[derive(Debug, Clone, Copy, Default)]
pub struct DummyRotator;

impl Brain for DummyRotator {
    fn kind(&self) -> &str {
        "dummyRotator"
    }

    fn decide(
        &self,
        _perception: &Perception,
        _memory: Option<Memory>,
        _rng: &mut dyn RngCore,
    ) -> Verdict {
        Verdict::act(sweep(SWEEP_DEGREES))
    }
}

//! Commands emitted by brains and the events stages hand to each other.
//!
//! A brain answers each perception with a [`Decision`]: a list of
//! [`Command`]s and how many ticks to keep re-applying them. The decision
//! stage turns each command into a one-tick intent record.

use serde::{Deserialize, Serialize};

use crate::entity::EntityId;

/// One agent action for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Drive along the body facing.
    Move(f32),
    /// Turn the body (turret follows).
    Rotate(f32),
    /// Turn only the turret.
    RotateTurret(f32),
    /// Pull the trigger.
    Fire,
}

/// Commands plus the number of ticks they stay active.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    /// Applied together, in order.
    pub commands: Vec<Command>,
    /// Ticks to apply them for; at least one.
    pub ticks: u32,
}

impl Decision {
    /// A decision applied for a single tick.
    #[must_use]
    pub fn once(commands: Vec<Command>) -> Self {
        Self::repeated(commands, 1)
    }

    /// A decision applied for `ticks` ticks, clamped to at least one.
    #[must_use]
    pub fn repeated(commands: Vec<Command>, ticks: u32) -> Self {
        Self {
            commands,
            ticks: ticks.max(1),
        }
    }
}

/// Score credited to `owner` because something it owned destroyed a target.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FragEvent {
    /// Entity to credit.
    pub owner: EntityId,
    /// Points to add.
    pub points: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_clamps_to_one_tick() {
        let d = Decision::repeated(vec![Command::Fire], 0);
        assert_eq!(d.ticks, 1);
        assert_eq!(Decision::once(vec![]).ticks, 1);
    }
}

//! Error taxonomy for the resolver.
//!
//! Three families, with different recovery policies:
//!
//! - [`GridError`] and [`ActionError`]: illegal input. The intent is rejected,
//!   nothing is mutated, and the caller may submit a corrected intent.
//! - [`InvariantViolation`]: a core logic defect detected at runtime. Resolution
//!   of the battle is aborted.
//! - [`SetupError`]: the initial roster, grid, or configuration is unusable.
//!
//! [`BattleError`] is what the turn resolver returns and wraps all of them
//! together with state-machine misuse.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::Phase;
use crate::effects::EffectKind;
use crate::fighter::{FighterId, ItemKind};
use crate::grid::GridPos;

/// Grid contract violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GridError {
    /// Coordinate outside the 0..=4 range on either axis.
    #[error("cell ({}, {}) is outside the grid", .0.x, .0.y)]
    OutOfBounds(GridPos),

    /// Destination unreachable, impassable, occupied, or too expensive.
    #[error("illegal move from ({}, {}) to ({}, {}): {reason}", .from.x, .from.y, .to.x, .to.y)]
    IllegalMove {
        /// Start cell.
        from: GridPos,
        /// Requested destination.
        to: GridPos,
        /// Why the move was refused.
        reason: MoveRefusal,
    },
}

/// Reason attached to [`GridError::IllegalMove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveRefusal {
    /// Wall or pit.
    Impassable,
    /// Another fighter stands there.
    Occupied,
    /// No walkable path exists.
    Unreachable,
    /// Cheapest path costs more than the remaining budget.
    OverBudget {
        /// Cheapest path cost.
        cost: u32,
        /// Budget available this turn.
        budget: u32,
    },
    /// The source cell holds no fighter.
    NoOccupant,
}

impl std::fmt::Display for MoveRefusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Impassable => f.write_str("destination is impassable"),
            Self::Occupied => f.write_str("destination is occupied"),
            Self::Unreachable => f.write_str("no path to destination"),
            Self::OverBudget { cost, budget } => {
                write!(f, "path costs {cost} but only {budget} movement remains")
            }
            Self::NoOccupant => f.write_str("nobody stands on the source cell"),
        }
    }
}

/// Validation failure for an [`ActionIntent`](crate::battle::ActionIntent).
///
/// Returned before any state is touched.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ActionError {
    /// No fighter with this id takes part in the battle.
    #[error("unknown fighter {0}")]
    UnknownFighter(FighterId),

    /// The actor has been defeated.
    #[error("fighter {0} is defeated")]
    ActorDefeated(FighterId),

    /// A crowd-control effect prevents any action.
    #[error("fighter {actor} cannot act while affected by {effect}")]
    Incapacitated {
        /// Blocked fighter.
        actor: FighterId,
        /// Blocking effect.
        effect: EffectKind,
    },

    /// Skills are blocked (Silence).
    #[error("fighter {0} is silenced")]
    Silenced(FighterId),

    /// The target is defeated.
    #[error("target {0} is already defeated")]
    TargetDefeated(FighterId),

    /// The target is not acceptable for this action (wrong side, wrong kind).
    #[error("invalid target for this action")]
    InvalidTarget,

    /// Target farther than the action's range.
    #[error("target at distance {distance} is out of range {range}")]
    OutOfRange {
        /// Chebyshev distance to the target.
        distance: u32,
        /// Allowed range.
        range: u32,
    },

    /// A blocking cell lies between actor and target.
    #[error("no line of sight to target")]
    NoLineOfSight,

    /// Skill costs more mana than available.
    #[error("insufficient mana: need {required}, have {available}")]
    InsufficientMana {
        /// Cost after modifiers.
        required: u32,
        /// Current mana.
        available: u32,
    },

    /// Skill index does not exist for the actor's class.
    #[error("unknown skill index {0}")]
    UnknownSkill(usize),

    /// The actor carries none of this item.
    #[error("no {0} left")]
    ItemUnavailable(ItemKind),

    /// Movement rejected by the grid.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// A serialized skill name that matches no skill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown skill '{0}'")]
pub struct UnknownSkillName(pub String);

/// Internal consistency failure. Unreachable through the public contract.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum InvariantViolation {
    /// Health left `[0, max]`.
    #[error("fighter {fighter} health {health} outside [0, {max}]")]
    HealthOutOfRange {
        /// Offending fighter.
        fighter: FighterId,
        /// Observed health.
        health: u32,
        /// Maximum health.
        max: u32,
    },

    /// Mana left `[0, max]`.
    #[error("fighter {fighter} mana {mana} outside [0, {max}]")]
    ManaOutOfRange {
        /// Offending fighter.
        fighter: FighterId,
        /// Observed mana.
        mana: u32,
        /// Maximum mana.
        max: u32,
    },

    /// Two fighters claimed one cell.
    #[error("cell ({}, {}) already holds fighter {occupant}", .cell.x, .cell.y)]
    DoubleOccupancy {
        /// Contested cell.
        cell: GridPos,
        /// Fighter already there.
        occupant: FighterId,
    },

    /// A stackable effect exceeded its cap.
    #[error("fighter {fighter} carries {stacks} stacks of {kind} (cap {cap})")]
    StackCapExceeded {
        /// Offending fighter.
        fighter: FighterId,
        /// Effect kind.
        kind: EffectKind,
        /// Observed stacks.
        stacks: u32,
        /// Documented cap.
        cap: u32,
    },

    /// Fighter position and grid occupancy disagree.
    #[error("fighter {fighter} is not recorded at ({}, {})", .position.x, .position.y)]
    PositionDesync {
        /// Offending fighter.
        fighter: FighterId,
        /// Position stored on the fighter.
        position: GridPos,
    },
}

/// Problems with the initial battle description.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Preset name not recognised.
    #[error("unknown grid preset '{0}'")]
    UnknownPreset(String),

    /// Layout is not 5 rows of 5 known symbols.
    #[error("invalid grid layout: {0}")]
    InvalidLayout(String),

    /// Fewer than two fighters, or only one side represented.
    #[error("a battle needs fighters on both sides")]
    OneSided,

    /// Two fighters share an id.
    #[error("duplicate fighter id {0}")]
    DuplicateFighter(FighterId),

    /// Start cell is off-grid, impassable, or taken.
    #[error("fighter {fighter} cannot start there: {source}")]
    Placement {
        /// Fighter being placed.
        fighter: FighterId,
        /// Underlying grid error.
        source: GridError,
    },

    /// Start cell already holds another fighter.
    #[error(transparent)]
    Invariant(#[from] InvariantViolation),

    /// Configuration could not be parsed.
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

/// Errors surfaced by the turn resolver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BattleError {
    /// The intent failed validation.
    #[error(transparent)]
    Action(#[from] ActionError),

    /// Core defect; the battle has been aborted.
    #[error("battle aborted: {0}")]
    Invariant(#[from] InvariantViolation),

    /// The battle has reached `Terminal`.
    #[error("battle is over")]
    BattleOver,

    /// Operation not allowed in the current phase.
    #[error("operation not allowed in phase {0:?}")]
    WrongPhase(Phase),

    /// The fighter may not act this round (defeated or stunned).
    #[error("fighter {0} is not eligible to act this round")]
    NotEligible(FighterId),

    /// The fighter already has an intent queued this round.
    #[error("fighter {0} already submitted an intent this round")]
    AlreadySubmitted(FighterId),

    /// Eligible fighters still owe an intent.
    #[error("waiting for intents from {0:?}")]
    IntentsPending(Vec<FighterId>),
}

/// Convenience alias for resolver results.
pub type Result<T, E = BattleError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_errors_render_coordinates() {
        let err = GridError::OutOfBounds(GridPos::new(5, -1));
        assert_eq!(err.to_string(), "cell (5, -1) is outside the grid");

        let err = GridError::IllegalMove {
            from: GridPos::new(0, 0),
            to: GridPos::new(2, 0),
            reason: MoveRefusal::OverBudget { cost: 4, budget: 3 },
        };
        assert!(err.to_string().contains("path costs 4 but only 3"));
    }

    #[test]
    fn grid_error_converts_into_action_error() {
        let err: ActionError = GridError::OutOfBounds(GridPos::new(9, 9)).into();
        assert!(matches!(err, ActionError::Grid(GridError::OutOfBounds(_))));
    }

    #[test]
    fn action_errors_are_serializable() {
        let err = ActionError::InsufficientMana {
            required: 20,
            available: 5,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: ActionError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }
}

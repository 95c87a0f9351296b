//! # Tactica Core
//!
//! Deterministic turn-based tactical combat resolver.
//!
//! Given a roster of fighters on a 5×5 terrain grid and one chosen action per
//! fighter, the crate computes the next consistent battle state: damage,
//! healing, status effects, movement, combos, and the victory condition.
//! The same seed and the same intents always produce the same battle.
//!
//! ## Architecture
//!
//! Leaves first:
//!
//! - [`grid`]: terrain table, occupancy, line of sight, flanking, pathing.
//! - [`effects`]: status effect instances, stacking, ticking, and the pair
//!   interaction table.
//! - [`fighter`]: classes, skills, items, and per-battle fighter state.
//! - [`combo`]: action histories and combo matching.
//! - [`resolver`]: intent validation and the damage pipeline.
//! - [`battle`]: [`BattleState`] and the round state machine [`Battle`].
//! - [`autoplay`]: the seam for external decision functions, plus a parallel
//!   batch runner.
//!
//! ## Usage
//!
//! ```
//! use tactica_core::{ActionIntent, Battle, BattleSetup, FighterClass, FighterId, FighterSpec, GridPos, Side};
//!
//! let (knight, archer) = (FighterId::new(1), FighterId::new(2));
//! let setup = BattleSetup::new(vec![
//!     FighterSpec::new(knight, "Brann", FighterClass::Knight, Side::Player).at(GridPos::new(2, 4)),
//!     FighterSpec::new(archer, "Vex", FighterClass::Archer, Side::Enemy).at(GridPos::new(2, 0)),
//! ]);
//!
//! let mut battle = Battle::new(&setup)?;
//! battle.submit(ActionIntent::move_to(knight, GridPos::new(2, 3)))?;
//! battle.submit(ActionIntent::defend(archer))?;
//! let report = battle.resolve_round()?;
//!
//! assert_eq!(report.results.len(), 2);
//! assert_eq!(battle.state().fighter(knight).unwrap().position, GridPos::new(2, 3));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod autoplay;
pub mod battle;
pub mod combo;
pub mod config;
pub mod effects;
pub mod error;
pub mod fighter;
pub mod grid;
pub mod output;
pub mod resolver;

pub use battle::{ActionIntent, ActionKind, Battle, BattleState, Phase, Target};
pub use config::{BattleConfig, BattleSetup, GridSpec};
pub use error::{ActionError, BattleError, GridError, InvariantViolation, SetupError};
pub use fighter::{Fighter, FighterClass, FighterId, FighterSpec, Side};
pub use grid::{Grid, GridPos, TerrainType};
pub use output::{ActionResult, BattleOutcome, RoundReport};

#[cfg(test)]
mod tests;

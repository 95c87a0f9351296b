//! Battle configuration and setup.
//!
//! [`BattleConfig`] holds the tunable numbers of the resolver; every field has
//! a default so a partial JSON document is enough. [`BattleSetup`] bundles a
//! config with a grid description and the starting roster.
//!
//! # Example
//!
//! ```
//! use tactica_core::config::{BattleConfig, BattleSetup, GridSpec};
//!
//! let config = BattleConfig::from_json(r#"{ "seed": 7, "flank_bonus_percent": 20 }"#).unwrap();
//! assert_eq!(config.seed, 7);
//! assert_eq!(config.flank_bonus_percent, 20);
//! assert_eq!(config.shatter_bonus, 30);
//!
//! let setup = BattleSetup::from_json(r#"{
//!     "grid": { "preset": "Mountain Pass" },
//!     "fighters": []
//! }"#).unwrap();
//! assert_eq!(setup.grid, GridSpec::Preset("Mountain Pass".into()));
//! ```

use serde::{Deserialize, Serialize};

use crate::effects::interaction::{SHATTER_BONUS, SHATTER_THRESHOLD};
use crate::error::SetupError;
use crate::fighter::FighterSpec;
use crate::grid::Grid;

/// Tunable resolver parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Seed of the battle RNG (critical hits).
    pub seed: u64,
    /// Minimum hit that shatters a Frozen target.
    pub shatter_threshold: u32,
    /// Damage added by a shatter.
    pub shatter_bonus: u32,
    /// Damage bonus for flanking, in percent.
    pub flank_bonus_percent: u32,
    /// Damage removed by Defend, in percent.
    pub defend_reduction_percent: u32,
    /// Movement points before class and effect modifiers.
    pub base_movement: u32,
    /// Mana every living fighter regains at the end of a round.
    pub mana_regen_per_round: u32,
    /// Rounds after which the battle ends in a draw; `None` for no limit.
    pub max_rounds: Option<u32>,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            shatter_threshold: SHATTER_THRESHOLD,
            shatter_bonus: SHATTER_BONUS,
            flank_bonus_percent: 15,
            defend_reduction_percent: 50,
            base_movement: 3,
            mana_regen_per_round: 5,
            max_rounds: Some(100),
        }
    }
}

impl BattleConfig {
    /// Default configuration with the given seed.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Parses a JSON document; missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// [`SetupError::Config`] for malformed JSON or wrongly typed fields.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// How the grid is described in a setup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSpec {
    /// A named preset, case-insensitive.
    Preset(String),
    /// Five rows of five terrain symbols.
    Layout(Vec<String>),
}

impl Default for GridSpec {
    fn default() -> Self {
        Self::Preset("Training Grounds".to_string())
    }
}

impl GridSpec {
    /// Builds the described grid.
    ///
    /// # Errors
    ///
    /// [`SetupError::UnknownPreset`] or [`SetupError::InvalidLayout`].
    pub fn build(&self) -> Result<Grid, SetupError> {
        match self {
            Self::Preset(name) => Grid::preset(name),
            Self::Layout(rows) => Grid::from_rows(rows.as_slice()),
        }
    }
}

/// Everything needed to start a battle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleSetup {
    /// Resolver parameters.
    #[serde(default)]
    pub config: BattleConfig,
    /// Terrain.
    #[serde(default)]
    pub grid: GridSpec,
    /// Starting roster.
    pub fighters: Vec<FighterSpec>,
}

impl BattleSetup {
    /// Setup on the default grid with the default config.
    #[must_use]
    pub fn new(fighters: Vec<FighterSpec>) -> Self {
        Self {
            fighters,
            ..Self::default()
        }
    }

    /// Replaces the config.
    #[must_use]
    pub fn with_config(mut self, config: BattleConfig) -> Self {
        self.config = config;
        self
    }

    /// Replaces the grid description.
    #[must_use]
    pub fn with_grid(mut self, grid: GridSpec) -> Self {
        self.grid = grid;
        self
    }

    /// Parses a JSON setup document.
    ///
    /// # Errors
    ///
    /// [`SetupError::Config`] for malformed JSON.
    pub fn from_json(json: &str) -> Result<Self, SetupError> {
        Ok(serde_json::from_str(json)?)
    }
}

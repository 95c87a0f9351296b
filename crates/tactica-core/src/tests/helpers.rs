//! Test helper functions for setting up battles and fighters.
//!
//! This module provides factory functions, a simple decision policy, and
//! setup utilities that make writing battle tests more ergonomic and
//! consistent.

use crate::battle::{ActionIntent, Battle, BattleState, Target};
use crate::config::{BattleConfig, BattleSetup, GridSpec};
use crate::fighter::{BaseStats, FighterClass, FighterId, FighterSpec, Side};
use crate::grid::{self, Grid, GridPos};
use crate::resolver;

// =============================================================================
// Tracing
// =============================================================================

/// Installs a test-writer subscriber so `tracing` output shows up for
/// failing tests. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

// =============================================================================
// Grids
// =============================================================================

/// A 5×5 grid of plain ground.
pub fn open_grid() -> GridSpec {
    GridSpec::Layout(vec![".....".to_string(); 5])
}

/// A grid with walls and pits in the middle rows and open start rows.
///
/// ```text
/// .....
/// .#.O.
/// ..~..
/// .O.#.
/// .....
/// ```
pub fn obstacle_grid() -> GridSpec {
    GridSpec::Layout(
        [".....", ".#.O.", "..~..", ".O.#.", "....."]
            .iter()
            .map(ToString::to_string)
            .collect(),
    )
}

// =============================================================================
// Fighters
// =============================================================================

/// Base stats with no crit chance and no defense, so hits equal strength.
pub fn plain_stats() -> BaseStats {
    BaseStats {
        crit_chance: 0,
        defense: 0,
        ..BaseStats::default()
    }
}

/// Creates a fighter spec at `(x, y)` named after its id.
///
/// # Arguments
///
/// * `id` - Fighter id
/// * `class` - Fighter class
/// * `side` - Which side the fighter is on
/// * `x`, `y` - Starting cell
///
/// # Returns
///
/// A spec with default stats and an empty inventory.
pub fn fighter(id: u32, class: FighterClass, side: Side, x: i32, y: i32) -> FighterSpec {
    FighterSpec::new(FighterId::new(id), format!("F{id}"), class, side).at(GridPos::new(x, y))
}

/// Like [`fighter`] but with [`plain_stats`].
pub fn plain_fighter(id: u32, class: FighterClass, side: Side, x: i32, y: i32) -> FighterSpec {
    fighter(id, class, side, x, y).with_stats(plain_stats())
}

// =============================================================================
// Battles
// =============================================================================

/// Sets up a one-on-one duel on an open grid.
///
/// The player (id 1) stands at (2, 3) directly below the enemy (id 2) at
/// (2, 2), so both can attack immediately.
///
/// # Arguments
///
/// * `player` - Class of fighter 1
/// * `enemy` - Class of fighter 2
/// * `seed` - RNG seed
///
/// # Returns
///
/// A setup ready for [`Battle::new`].
pub fn duel_setup(player: FighterClass, enemy: FighterClass, seed: u64) -> BattleSetup {
    BattleSetup::new(vec![
        plain_fighter(1, player, Side::Player, 2, 3),
        plain_fighter(2, enemy, Side::Enemy, 2, 2),
    ])
    .with_config(BattleConfig::with_seed(seed))
    .with_grid(open_grid())
}

/// Sets up a three-on-three skirmish with start rows at the edges.
///
/// Players have ids 1-3 on row 4; enemies have ids 4-6 on row 0.
pub fn skirmish_setup(grid: GridSpec, seed: u64) -> BattleSetup {
    BattleSetup::new(vec![
        fighter(1, FighterClass::Knight, Side::Player, 1, 4),
        fighter(2, FighterClass::Mage, Side::Player, 2, 4),
        fighter(3, FighterClass::Cleric, Side::Player, 3, 4),
        fighter(4, FighterClass::Berserker, Side::Enemy, 1, 0),
        fighter(5, FighterClass::Archer, Side::Enemy, 2, 0),
        fighter(6, FighterClass::Necromancer, Side::Enemy, 3, 0),
    ])
    .with_config(BattleConfig::with_seed(seed))
    .with_grid(grid)
}

/// Builds a battle from `setup`, panicking on invalid setups.
pub fn battle(setup: &BattleSetup) -> Battle {
    Battle::new(setup).expect("test setup should be valid")
}

/// Shorthand for [`FighterId::new`].
pub fn id(n: u32) -> FighterId {
    FighterId::new(n)
}

// =============================================================================
// Policies
// =============================================================================

/// Attacks the lowest-id enemy in reach; otherwise steps to the adjacent
/// cell closest to the nearest enemy; otherwise defends.
pub fn advance_and_attack(state: &BattleState, actor: FighterId) -> ActionIntent {
    let Some(me) = state.fighter(actor) else {
        return ActionIntent::defend(actor);
    };
    let foes: Vec<GridPos> = state.living(me.side.opposite()).map(|f| f.position).collect();

    if let Some(attack) = state
        .living(me.side.opposite())
        .map(|foe| ActionIntent::attack(actor, foe.id))
        .find(|intent| resolver::validate(state, intent).is_ok())
    {
        return attack;
    }

    let closeness = |pos: GridPos| foes.iter().map(|&f| grid::distance(pos, f)).min().unwrap_or(0);
    Grid::neighbors(me.position)
        .map(|cell| ActionIntent::move_to(actor, cell))
        .filter(|intent| resolver::validate(state, intent).is_ok())
        .min_by_key(|intent| match intent.target {
            Target::Cell(cell) => closeness(cell),
            _ => u32::MAX,
        })
        .filter(|intent| match intent.target {
            Target::Cell(cell) => closeness(cell) < closeness(me.position),
            _ => false,
        })
        .unwrap_or(ActionIntent::defend(actor))
}

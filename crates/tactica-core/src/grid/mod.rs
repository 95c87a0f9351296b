//! The 5×5 battle grid.
//!
//! The grid owns terrain and occupancy. Fighters own their position; the grid
//! records which fighter stands on which cell so that passability, movement,
//! and line-of-sight queries never have to scan the roster.
//!
//! # Coordinates
//!
//! Cells are addressed with [`GridPos`] (`glam::IVec2`), `x` growing to the
//! right and `y` growing downwards. Valid coordinates are `0..=4` on both axes.
//! Storage is row-major.
//!
//! # Example
//!
//! ```
//! use tactica_core::grid::{Grid, GridPos, TerrainType};
//!
//! let grid = Grid::from_rows(&[
//!     ".....",
//!     "..#..",
//!     ".....",
//!     "..F..",
//!     ".....",
//! ])
//! .unwrap();
//!
//! assert_eq!(grid.terrain(GridPos::new(2, 1)).unwrap(), TerrainType::Wall);
//! assert!(!grid.has_line_of_sight(GridPos::new(2, 0), GridPos::new(2, 4)));
//! assert!(grid.has_line_of_sight(GridPos::new(0, 0), GridPos::new(0, 4)));
//! ```

mod presets;
mod terrain;

pub use presets::PRESET_NAMES;
pub use terrain::{TerrainStats, TerrainType};

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use glam::IVec2;
use serde::{Deserialize, Serialize};

use crate::error::{GridError, MoveRefusal, SetupError};
use crate::fighter::FighterId;

/// A cell coordinate on the grid.
pub type GridPos = IVec2;

/// Width and height of the grid.
pub const GRID_SIZE: i32 = 5;

/// Cell in the middle of the grid, the default facing target.
pub const GRID_CENTER: GridPos = IVec2::new(GRID_SIZE / 2, GRID_SIZE / 2);

const CELL_COUNT: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// The four orthogonal steps used for movement.
const STEPS: [IVec2; 4] = [IVec2::NEG_Y, IVec2::X, IVec2::Y, IVec2::NEG_X];

// =============================================================================
// Cells
// =============================================================================

/// A single grid cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridCell {
    /// Location of the cell.
    pub pos: GridPos,
    /// Terrain, fixed for the whole battle.
    pub terrain: TerrainType,
    /// Fighter standing here, if any.
    pub occupant: Option<FighterId>,
}

impl GridCell {
    /// True if a fighter could step onto this cell right now.
    #[must_use]
    pub fn is_passable(&self) -> bool {
        !self.terrain.is_impassable() && self.occupant.is_none()
    }
}

// =============================================================================
// Geometry helpers
// =============================================================================

/// True if `pos` lies on the grid.
#[must_use]
pub fn in_bounds(pos: GridPos) -> bool {
    (0..GRID_SIZE).contains(&pos.x) && (0..GRID_SIZE).contains(&pos.y)
}

/// Chebyshev distance: diagonal neighbours are at distance 1.
#[must_use]
pub fn distance(a: GridPos, b: GridPos) -> u32 {
    let d = (a - b).abs();
    d.x.max(d.y).unsigned_abs()
}

/// Unit direction (each component in `-1..=1`) from one cell toward another.
#[must_use]
pub fn direction(from: GridPos, to: GridPos) -> IVec2 {
    (to - from).signum()
}

/// True if `attacker` stands behind or beside a defender facing `facing`.
///
/// The attacker is in front when its direction from the defender has a
/// positive component along the facing; anything else is a flank. A zero
/// facing has no front or back, so it can never be flanked.
#[must_use]
pub fn is_flanking(attacker: GridPos, defender: GridPos, facing: IVec2) -> bool {
    if facing == IVec2::ZERO || attacker == defender {
        return false;
    }
    direction(defender, attacker).dot(facing.signum()) <= 0
}

// =============================================================================
// Grid
// =============================================================================

/// The battle grid: terrain plus occupancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    cells: Vec<GridCell>,
}

impl Default for Grid {
    fn default() -> Self {
        Self::filled(TerrainType::Normal)
    }
}

impl Grid {
    /// Creates a grid with every cell set to `terrain`.
    #[must_use]
    pub fn filled(terrain: TerrainType) -> Self {
        let cells = (0..CELL_COUNT)
            .map(|i| GridCell {
                pos: index_to_pos(i),
                terrain,
                occupant: None,
            })
            .collect();
        Self { cells }
    }

    /// Builds a grid from five rows of five terrain symbols.
    ///
    /// Symbols are listed on [`TerrainType::symbol`]. Whitespace is ignored.
    ///
    /// # Errors
    ///
    /// [`SetupError::InvalidLayout`] for wrong dimensions or unknown symbols.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self, SetupError> {
        if rows.len() != GRID_SIZE as usize {
            return Err(SetupError::InvalidLayout(format!(
                "expected {GRID_SIZE} rows, got {}",
                rows.len()
            )));
        }

        let mut grid = Self::default();
        for (y, row) in rows.iter().enumerate() {
            let symbols: Vec<char> = row
                .as_ref()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect();
            if symbols.len() != GRID_SIZE as usize {
                return Err(SetupError::InvalidLayout(format!(
                    "row {y} has {} cells, expected {GRID_SIZE}",
                    symbols.len()
                )));
            }
            for (x, symbol) in symbols.into_iter().enumerate() {
                let terrain = TerrainType::from_symbol(symbol).ok_or_else(|| {
                    SetupError::InvalidLayout(format!("unknown terrain symbol '{symbol}'"))
                })?;
                grid.cells[y * GRID_SIZE as usize + x].terrain = terrain;
            }
        }
        Ok(grid)
    }

    /// Sets the terrain of one cell.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] outside the grid.
    pub fn set_terrain(&mut self, pos: GridPos, terrain: TerrainType) -> Result<(), GridError> {
        self.cell_mut(pos)?.terrain = terrain;
        Ok(())
    }

    /// Returns the cell at `pos`.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] outside the grid.
    pub fn cell(&self, pos: GridPos) -> Result<&GridCell, GridError> {
        pos_to_index(pos)
            .map(|i| &self.cells[i])
            .ok_or(GridError::OutOfBounds(pos))
    }

    fn cell_mut(&mut self, pos: GridPos) -> Result<&mut GridCell, GridError> {
        pos_to_index(pos)
            .map(|i| &mut self.cells[i])
            .ok_or(GridError::OutOfBounds(pos))
    }

    /// Terrain at `pos`.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] outside the grid.
    pub fn terrain(&self, pos: GridPos) -> Result<TerrainType, GridError> {
        self.cell(pos).map(|c| c.terrain)
    }

    /// Fighter standing on `pos`, if any. `None` off-grid.
    #[must_use]
    pub fn occupant(&self, pos: GridPos) -> Option<FighterId> {
        self.cell(pos).ok().and_then(|c| c.occupant)
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = &GridCell> {
        self.cells.iter()
    }

    /// False for Wall/Pit, occupied cells, and off-grid coordinates.
    #[must_use]
    pub fn is_passable(&self, pos: GridPos) -> bool {
        self.cell(pos).is_ok_and(GridCell::is_passable)
    }

    /// Cost to enter `pos`; `None` means unreachable (Wall, Pit, off-grid).
    #[must_use]
    pub fn movement_cost(&self, pos: GridPos) -> Option<u32> {
        self.cell(pos).ok().and_then(|c| c.terrain.movement_cost())
    }

    /// Orthogonal neighbours of `pos` that lie on the grid.
    pub fn neighbors(pos: GridPos) -> impl Iterator<Item = GridPos> {
        STEPS.into_iter().map(move |s| pos + s).filter(|p| in_bounds(*p))
    }

    /// Bresenham line of sight between two cells.
    ///
    /// Only the cells strictly between the endpoints are inspected: a fighter
    /// standing in a forest can see out of it and be seen into it.
    #[must_use]
    pub fn has_line_of_sight(&self, from: GridPos, to: GridPos) -> bool {
        if !in_bounds(from) || !in_bounds(to) {
            return false;
        }

        let d = (to - from).abs();
        let (dx, dy) = (d.x, -d.y);
        let step = direction(from, to);
        let mut err = dx + dy;
        let mut cur = from;

        while cur != to {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                cur.x += step.x;
            }
            if e2 <= dx {
                err += dx;
                cur.y += step.y;
            }
            if cur == to {
                break;
            }
            if self
                .terrain(cur)
                .map_or(true, TerrainType::blocks_line_of_sight)
            {
                return false;
            }
        }
        true
    }

    /// Facing a fighter takes when nothing else is known: toward the centre.
    ///
    /// On the centre cell itself `fallback` is used.
    #[must_use]
    pub fn default_facing(pos: GridPos, fallback: IVec2) -> IVec2 {
        let toward = direction(pos, GRID_CENTER);
        if toward == IVec2::ZERO {
            fallback
        } else {
            toward
        }
    }

    /// Cheapest orthogonal path cost from `from` to `to`.
    ///
    /// Each entered cell adds its terrain cost. Intermediate cells must be
    /// passable; the starting cell is allowed to hold the mover. Returns
    /// `None` when no path exists or the destination cannot be entered.
    #[must_use]
    pub fn path_cost(&self, from: GridPos, to: GridPos) -> Option<u32> {
        let start = pos_to_index(from)?;
        let goal = pos_to_index(to)?;
        if start == goal {
            return Some(0);
        }
        if !self.cells[goal].is_passable() {
            return None;
        }

        let mut best = [u32::MAX; CELL_COUNT];
        let mut open = BinaryHeap::new();
        best[start] = 0;
        open.push(Reverse((0u32, start)));

        while let Some(Reverse((cost, index))) = open.pop() {
            if index == goal {
                return Some(cost);
            }
            if cost > best[index] {
                continue;
            }
            for next in Self::neighbors(index_to_pos(index)) {
                let Some(next_index) = pos_to_index(next) else {
                    continue;
                };
                let cell = &self.cells[next_index];
                if !cell.is_passable() {
                    continue;
                }
                let Some(step_cost) = cell.terrain.movement_cost() else {
                    continue;
                };
                let tentative = cost + step_cost;
                if tentative < best[next_index] {
                    best[next_index] = tentative;
                    open.push(Reverse((tentative, next_index)));
                }
            }
        }
        None
    }

    /// Checks a move without performing it and returns its cost.
    ///
    /// # Errors
    ///
    /// Same as [`Grid::move_occupant`].
    pub fn plan_move(&self, from: GridPos, to: GridPos, budget: u32) -> Result<u32, GridError> {
        let mover = self.cell(from)?.occupant;
        let target = self.cell(to)?;
        let illegal = |reason| GridError::IllegalMove { from, to, reason };

        if mover.is_none() {
            return Err(illegal(MoveRefusal::NoOccupant));
        }
        if target.terrain.is_impassable() {
            return Err(illegal(MoveRefusal::Impassable));
        }
        if from == to {
            return Ok(0);
        }
        if target.occupant.is_some() {
            return Err(illegal(MoveRefusal::Occupied));
        }

        let cost = self
            .path_cost(from, to)
            .ok_or(illegal(MoveRefusal::Unreachable))?;
        if cost > budget {
            return Err(illegal(MoveRefusal::OverBudget { cost, budget }));
        }
        Ok(cost)
    }

    /// Moves the fighter on `from` to `to`, spending at most `budget`.
    ///
    /// Returns the movement actually spent.
    ///
    /// # Errors
    ///
    /// - [`GridError::OutOfBounds`] for off-grid coordinates.
    /// - [`GridError::IllegalMove`] when the destination is impassable or
    ///   occupied, unreachable, or costs more than `budget`.
    pub fn move_occupant(
        &mut self,
        from: GridPos,
        to: GridPos,
        budget: u32,
    ) -> Result<u32, GridError> {
        let cost = self.plan_move(from, to, budget)?;
        if from != to {
            let mover = self.cell_mut(from)?.occupant.take();
            self.cell_mut(to)?.occupant = mover;
        }
        Ok(cost)
    }

    /// Puts a fighter on an empty, enterable cell.
    ///
    /// # Errors
    ///
    /// [`GridError::OutOfBounds`] off-grid, [`GridError::IllegalMove`] if the
    /// cell is impassable or already occupied.
    pub fn place(&mut self, id: FighterId, pos: GridPos) -> Result<(), GridError> {
        let cell = self.cell_mut(pos)?;
        let refuse = |reason| GridError::IllegalMove {
            from: pos,
            to: pos,
            reason,
        };
        if cell.terrain.is_impassable() {
            return Err(refuse(MoveRefusal::Impassable));
        }
        if cell.occupant.is_some() {
            return Err(refuse(MoveRefusal::Occupied));
        }
        cell.occupant = Some(id);
        Ok(())
    }

    /// Clears the cell and returns whoever stood there.
    pub fn vacate(&mut self, pos: GridPos) -> Option<FighterId> {
        self.cell_mut(pos).ok().and_then(|c| c.occupant.take())
    }

    /// Renders the terrain as layout rows, the inverse of [`Grid::from_rows`].
    #[must_use]
    pub fn to_rows(&self) -> Vec<String> {
        self.cells
            .chunks(GRID_SIZE as usize)
            .map(|row| row.iter().map(|c| c.terrain.symbol()).collect())
            .collect()
    }
}

fn pos_to_index(pos: GridPos) -> Option<usize> {
    in_bounds(pos).then(|| (pos.y * GRID_SIZE + pos.x) as usize)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
fn index_to_pos(index: usize) -> GridPos {
    let i = index as i32;
    IVec2::new(i % GRID_SIZE, i / GRID_SIZE)
}

// =============================================================================
// Tests
// =============================================================================

//! Terrain types and their static modifier table.
//!
//! Every [`TerrainType`] maps to exactly one [`TerrainStats`] row. The table is
//! a `const` match, so it is immutable and needs no loading step.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Static properties of a terrain type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainStats {
    /// Cost to enter the cell. `None` means the cell can never be entered.
    pub movement_cost: Option<u32>,
    /// Percentage applied to damage taken by a fighter standing here.
    /// Positive values mean better protection.
    pub defense_modifier_percent: i32,
    /// Percentage applied to damage dealt by a fighter standing here.
    pub attack_modifier_percent: i32,
    /// Whether the cell interrupts line of sight.
    pub blocks_line_of_sight: bool,
}

/// Terrain of a single grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TerrainType {
    /// Open ground, no modifiers.
    #[default]
    Normal,
    /// Same as normal ground.
    Grass,
    /// Dense trees: slow, protective, blocks sight.
    Forest,
    /// Shallow water: very slow, exposed. Fighters here count as wet.
    Water,
    /// Sticky mud.
    Mud,
    /// Rocky outcrop.
    Rock,
    /// Elevated position, strong attack and defense bonus.
    HighGround,
    /// Depression, weak position.
    LowGround,
    /// Solid wall, impassable, blocks sight.
    Wall,
    /// Chasm, impassable, blocks sight.
    Pit,
}

impl TerrainType {
    /// All terrain types in declaration order.
    pub const ALL: [TerrainType; 10] = [
        Self::Normal,
        Self::Grass,
        Self::Forest,
        Self::Water,
        Self::Mud,
        Self::Rock,
        Self::HighGround,
        Self::LowGround,
        Self::Wall,
        Self::Pit,
    ];

    /// Returns the modifier row for this terrain.
    #[must_use]
    pub const fn stats(self) -> TerrainStats {
        match self {
            Self::Normal | Self::Grass => row(Some(1), 0, 0, false),
            Self::Forest => row(Some(2), 15, -10, true),
            Self::Water => row(Some(3), -10, -15, false),
            Self::Mud => row(Some(2), -5, -10, false),
            Self::Rock => row(Some(1), 10, 5, false),
            Self::HighGround => row(Some(1), 20, 25, false),
            Self::LowGround => row(Some(1), -15, -10, false),
            Self::Wall | Self::Pit => row(None, 0, 0, true),
        }
    }

    /// Movement cost to enter, `None` for impassable terrain.
    #[must_use]
    pub const fn movement_cost(self) -> Option<u32> {
        self.stats().movement_cost
    }

    /// True for terrain no fighter can ever occupy.
    #[must_use]
    pub const fn is_impassable(self) -> bool {
        self.stats().movement_cost.is_none()
    }

    /// True if this terrain interrupts line of sight.
    #[must_use]
    pub const fn blocks_line_of_sight(self) -> bool {
        self.stats().blocks_line_of_sight
    }

    /// True if fighters standing here count as wet for effect interactions.
    #[must_use]
    pub const fn is_wet(self) -> bool {
        matches!(self, Self::Water)
    }

    /// Layout character used by [`Grid::from_rows`](super::Grid::from_rows).
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Normal => '.',
            Self::Grass => ',',
            Self::Forest => 'F',
            Self::Water => '~',
            Self::Mud => 'm',
            Self::Rock => 'r',
            Self::HighGround => '^',
            Self::LowGround => 'v',
            Self::Wall => '#',
            Self::Pit => 'O',
        }
    }

    /// Parses a layout character.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.symbol() == symbol)
    }
}

const fn row(
    movement_cost: Option<u32>,
    defense_modifier_percent: i32,
    attack_modifier_percent: i32,
    blocks_line_of_sight: bool,
) -> TerrainStats {
    TerrainStats {
        movement_cost,
        defense_modifier_percent,
        attack_modifier_percent,
        blocks_line_of_sight,
    }
}

impl fmt::Display for TerrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Normal => "Normal",
            Self::Grass => "Grass",
            Self::Forest => "Forest",
            Self::Water => "Water",
            Self::Mud => "Mud",
            Self::Rock => "Rock",
            Self::HighGround => "High Ground",
            Self::LowGround => "Low Ground",
            Self::Wall => "Wall",
            Self::Pit => "Pit",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_matches_published_values() {
        assert_eq!(TerrainType::Normal.stats(), TerrainType::Grass.stats());
        assert_eq!(TerrainType::Forest.stats(), row(Some(2), 15, -10, true));
        assert_eq!(TerrainType::Water.stats(), row(Some(3), -10, -15, false));
        assert_eq!(TerrainType::Mud.stats(), row(Some(2), -5, -10, false));
        assert_eq!(TerrainType::Rock.stats(), row(Some(1), 10, 5, false));
        assert_eq!(TerrainType::HighGround.stats(), row(Some(1), 20, 25, false));
        assert_eq!(TerrainType::LowGround.stats(), row(Some(1), -15, -10, false));
    }

    #[test]
    fn wall_and_pit_are_impassable_and_opaque() {
        for terrain in [TerrainType::Wall, TerrainType::Pit] {
            assert!(terrain.is_impassable());
            assert!(terrain.blocks_line_of_sight());
            assert_eq!(terrain.movement_cost(), None);
        }
    }

    #[test]
    fn symbols_are_unique_and_parse_back() {
        for terrain in TerrainType::ALL {
            assert_eq!(TerrainType::from_symbol(terrain.symbol()), Some(terrain));
        }
        assert_eq!(TerrainType::from_symbol('x'), None);
    }
}

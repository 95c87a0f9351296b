//! Fighters: identity, class-derived stats, and per-battle state.
//!
//! A [`Fighter`] is built once from a [`FighterSpec`] when the battle starts and
//! is mutated in place by the resolver afterwards. Defeated fighters are never
//! removed; they stay in the roster with the [`FighterFlags::DEFEATED`] flag so
//! that ids remain stable and [`BattleOutcome`](crate::output::BattleOutcome)
//! can report on them.
//!
//! # Example
//!
//! ```
//! use tactica_core::fighter::{BaseStats, Fighter, FighterClass, FighterId, FighterSpec, Side};
//! use tactica_core::grid::GridPos;
//!
//! let spec = FighterSpec::new(FighterId::new(1), "Brann", FighterClass::Knight, Side::Player)
//!     .at(GridPos::new(0, 2));
//! let knight = Fighter::from_spec(&spec);
//!
//! // Knights carry 130% of the base health.
//! assert_eq!(knight.max_health, BaseStats::default().health * 130 / 100);
//! assert!(knight.is_player());
//! ```

mod class;
mod inventory;
mod skills;

pub use class::{ClassProfile, FighterClass, Passive};
pub use inventory::{Inventory, ItemKind};
pub use skills::{by_name as skill_by_name, Skill, SkillEffect, SkillName, SkillTarget};

use bitflags::bitflags;
use glam::IVec2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::combo::ActionHistory;
use crate::effects::{self, percent_of, EffectSet};
use crate::error::{ActionError, InvariantViolation};
use crate::grid::{Grid, GridPos};

// =============================================================================
// Identity
// =============================================================================

/// Unique identifier for a fighter within one battle.
///
/// Ids order the roster: ties in turn order and every per-fighter loop fall
/// back to ascending id.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FighterId(u32);

impl FighterId {
    /// Creates an id from its raw value.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FighterId({})", self.0)
    }
}

impl fmt::Display for FighterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for FighterId {
    fn from(id: u32) -> Self {
        Self::new(id)
    }
}

impl From<FighterId> for u32 {
    fn from(id: FighterId) -> Self {
        id.0
    }
}

/// The two teams of a battle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Side {
    /// Player-controlled; acts before the enemy side on ties.
    Player,
    /// Opponents.
    Enemy,
}

impl Side {
    /// The other side.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Player => Self::Enemy,
            Self::Enemy => Self::Player,
        }
    }

    /// Facing used when a fighter starts on the centre cell.
    #[must_use]
    pub const fn default_facing(self) -> IVec2 {
        match self {
            Self::Player => IVec2::NEG_Y,
            Self::Enemy => IVec2::Y,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

bitflags! {
    /// Per-fighter status flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    pub struct FighterFlags: u8 {
        /// Health reached zero. Permanent.
        const DEFEATED = 1 << 0;
        /// Chose Defend this round; cleared when the round ends.
        const DEFENDING = 1 << 1;
    }
}

// =============================================================================
// Setup
// =============================================================================

/// Stats before class multipliers, with equipment already flattened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    /// Maximum health.
    pub health: u32,
    /// Maximum mana.
    pub mana: u32,
    /// Attack power.
    pub strength: u32,
    /// Flat mitigation.
    pub defense: u32,
    /// Critical hit chance in percent.
    pub crit_chance: u32,
    /// Critical hit damage in percent (150 = 1.5x).
    pub crit_damage: u32,
    /// Turn-order stat; higher acts earlier.
    pub speed: u32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            health: 100,
            mana: 50,
            strength: 10,
            defense: 4,
            crit_chance: 5,
            crit_damage: 150,
            speed: 10,
        }
    }
}

/// Everything needed to put a fighter on the field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterSpec {
    /// Unique id.
    pub id: FighterId,
    /// Display name.
    pub name: String,
    /// Class.
    pub class: FighterClass,
    /// Team.
    pub side: Side,
    /// Starting cell.
    #[serde(default)]
    pub position: GridPos,
    /// Starting facing; defaults to the grid centre.
    #[serde(default)]
    pub facing: Option<IVec2>,
    /// Stats before class multipliers.
    #[serde(default)]
    pub stats: BaseStats,
    /// Starting consumables.
    #[serde(default)]
    pub inventory: Inventory,
}

impl FighterSpec {
    /// Spec with default stats at the origin.
    #[must_use]
    pub fn new(id: FighterId, name: impl Into<String>, class: FighterClass, side: Side) -> Self {
        Self {
            id,
            name: name.into(),
            class,
            side,
            position: GridPos::ZERO,
            facing: None,
            stats: BaseStats::default(),
            inventory: Inventory::default(),
        }
    }

    /// Sets the starting cell.
    #[must_use]
    pub fn at(mut self, position: GridPos) -> Self {
        self.position = position;
        self
    }

    /// Sets an explicit starting facing.
    #[must_use]
    pub fn facing(mut self, facing: IVec2) -> Self {
        self.facing = Some(facing);
        self
    }

    /// Replaces the base stats.
    #[must_use]
    pub fn with_stats(mut self, stats: BaseStats) -> Self {
        self.stats = stats;
        self
    }

    /// Replaces the inventory.
    #[must_use]
    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self
    }
}

// =============================================================================
// Fighter
// =============================================================================

/// Running totals reported in the battle outcome.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterTotals {
    /// Health removed from opponents.
    pub damage_dealt: u32,
    /// Health lost from any source.
    pub damage_taken: u32,
    /// Health restored to anyone, including self.
    pub healing_done: u32,
    /// Combos completed.
    pub combos_triggered: u32,
}

/// A combatant.
///
/// Stat fields are public for snapshot rendering; all mutation during a
/// battle goes through the methods below or the effect engine so that
/// `0 <= health <= max_health` and `0 <= mana <= max_mana` always hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fighter {
    /// Unique id.
    pub id: FighterId,
    /// Display name.
    pub name: String,
    /// Class.
    pub class: FighterClass,
    /// Team.
    pub side: Side,
    /// Current health.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Current mana.
    pub mana: u32,
    /// Maximum mana.
    pub max_mana: u32,
    /// Attack power.
    pub strength: u32,
    /// Flat mitigation.
    pub defense: u32,
    /// Critical hit chance in percent.
    pub crit_chance: u32,
    /// Critical hit damage in percent.
    pub crit_damage: u32,
    /// Turn-order stat.
    pub speed: u32,
    /// Current cell.
    pub position: GridPos,
    /// Unit direction the fighter looks at; drives flanking.
    pub facing: IVec2,
    /// Active status effects.
    pub effects: EffectSet,
    /// Recent actions for combo matching.
    pub history: ActionHistory,
    /// Consumables.
    pub inventory: Inventory,
    /// Status flags.
    pub flags: FighterFlags,
    /// Per-battle totals.
    pub totals: FighterTotals,
}

impl Fighter {
    /// Builds a fighter, applying the class stat multipliers.
    #[must_use]
    pub fn from_spec(spec: &FighterSpec) -> Self {
        let profile = spec.class.profile();
        let stats = spec.stats;
        let max_health = percent_of(stats.health, profile.health_percent).max(1);
        let max_mana = percent_of(stats.mana, profile.mana_percent);
        let facing = spec
            .facing
            .map_or_else(
                || Grid::default_facing(spec.position, spec.side.default_facing()),
                |f| f.signum(),
            );

        Self {
            id: spec.id,
            name: spec.name.clone(),
            class: spec.class,
            side: spec.side,
            health: max_health,
            max_health,
            mana: max_mana,
            max_mana,
            strength: stats.strength,
            defense: percent_of(stats.defense, profile.defense_percent),
            crit_chance: stats.crit_chance.saturating_add(profile.crit_bonus).min(100),
            crit_damage: stats.crit_damage,
            speed: stats.speed,
            position: spec.position,
            facing,
            effects: EffectSet::default(),
            history: ActionHistory::default(),
            inventory: spec.inventory.clone(),
            flags: FighterFlags::empty(),
            totals: FighterTotals::default(),
        }
    }

    /// Class stat profile.
    #[must_use]
    pub const fn profile(&self) -> ClassProfile {
        self.class.profile()
    }

    /// Class passive.
    #[must_use]
    pub const fn passive(&self) -> Passive {
        self.class.passive()
    }

    /// True for fighters on the player side.
    #[must_use]
    pub fn is_player(&self) -> bool {
        self.side == Side::Player
    }

    /// True once health has reached zero.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        self.flags.contains(FighterFlags::DEFEATED)
    }

    /// Opposite of [`Fighter::is_defeated`].
    #[must_use]
    pub fn is_alive(&self) -> bool {
        !self.is_defeated()
    }

    /// True while a Defend action is in force.
    #[must_use]
    pub fn is_defending(&self) -> bool {
        self.flags.contains(FighterFlags::DEFENDING)
    }

    /// Basic attack reach.
    #[must_use]
    pub const fn weapon_range(&self) -> u32 {
        self.profile().weapon_range
    }

    /// True if basic attacks need line of sight.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.profile().ranged
    }

    /// Class skills, addressed by index in intents.
    #[must_use]
    pub fn skills(&self) -> &'static [Skill] {
        self.class.skills()
    }

    /// Skill at `index`.
    ///
    /// # Errors
    ///
    /// [`ActionError::UnknownSkill`] if the class has no such skill.
    pub fn skill(&self, index: usize) -> Result<&'static Skill, ActionError> {
        self.skills()
            .get(index)
            .ok_or(ActionError::UnknownSkill(index))
    }

    /// True when health is below half.
    #[must_use]
    pub fn is_bloodied(&self) -> bool {
        self.health < self.max_health.saturating_sub(self.health)
    }

    /// Removes up to `amount` health and returns what was actually lost.
    ///
    /// Reaching zero sets [`FighterFlags::DEFEATED`] and clears all effects.
    pub fn apply_damage(&mut self, amount: u32) -> u32 {
        if self.is_defeated() {
            return 0;
        }
        let lost = amount.min(self.health);
        self.health -= lost;
        self.totals.damage_taken = self.totals.damage_taken.saturating_add(lost);
        if self.health == 0 {
            self.defeat();
        }
        lost
    }

    /// Restores up to `amount` health and returns what was actually healed.
    ///
    /// Defeated fighters cannot be healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        if self.is_defeated() {
            return 0;
        }
        let healed = amount.min(self.max_health.saturating_sub(self.health));
        self.health += healed;
        healed
    }

    /// Deducts `cost` mana.
    ///
    /// # Errors
    ///
    /// [`ActionError::InsufficientMana`] without touching mana.
    pub fn spend_mana(&mut self, cost: u32) -> Result<(), ActionError> {
        if cost > self.mana {
            return Err(ActionError::InsufficientMana {
                required: cost,
                available: self.mana,
            });
        }
        self.mana -= cost;
        Ok(())
    }

    /// Restores up to `amount` mana and returns what was actually restored.
    pub fn restore_mana(&mut self, amount: u32) -> u32 {
        if self.is_defeated() {
            return 0;
        }
        let restored = amount.min(self.max_mana.saturating_sub(self.mana));
        self.mana += restored;
        restored
    }

    fn defeat(&mut self) {
        self.flags.insert(FighterFlags::DEFEATED);
        self.flags.remove(FighterFlags::DEFENDING);
        self.effects.clear();
    }

    /// Checks the numeric invariants of this fighter.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        if self.health > self.max_health {
            return Err(InvariantViolation::HealthOutOfRange {
                fighter: self.id,
                health: self.health,
                max: self.max_health,
            });
        }
        if self.mana > self.max_mana {
            return Err(InvariantViolation::ManaOutOfRange {
                fighter: self.id,
                mana: self.mana,
                max: self.max_mana,
            });
        }
        effects::check_stack_caps(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fighter(class: FighterClass) -> Fighter {
        Fighter::from_spec(
            &FighterSpec::new(FighterId::new(1), "Test", class, Side::Player).at(GridPos::new(0, 0)),
        )
    }

    mod setup_tests {
        use super::*;

        #[test]
        fn class_multipliers_shape_stats() {
            let mage = fighter(FighterClass::Mage);
            assert_eq!(mage.max_health, 75);
            assert_eq!(mage.max_mana, 75);
            assert_eq!(mage.health, mage.max_health);

            let rogue = fighter(FighterClass::Rogue);
            assert_eq!(rogue.crit_chance, 15);
        }

        #[test]
        fn huge_stats_saturate() {
            let stats = BaseStats {
                health: u32::MAX,
                mana: u32::MAX,
                defense: u32::MAX,
                crit_chance: u32::MAX,
                ..BaseStats::default()
            };
            let knight = Fighter::from_spec(
                &FighterSpec::new(FighterId::new(4), "K", FighterClass::Knight, Side::Player)
                    .with_stats(stats),
            );
            assert_eq!(knight.max_health, u32::MAX);
            assert_eq!(knight.health, u32::MAX);
            assert_eq!(knight.crit_chance, 100);
            assert!(!knight.is_bloodied());

            let rogue = Fighter::from_spec(
                &FighterSpec::new(FighterId::new(5), "R", FighterClass::Rogue, Side::Player)
                    .with_stats(stats),
            );
            assert_eq!(rogue.crit_chance, 100);
        }

        #[test]
        fn default_facing_points_at_centre() {
            let f = fighter(FighterClass::Warrior);
            assert_eq!(f.facing, IVec2::new(1, 1));

            let centre = Fighter::from_spec(
                &FighterSpec::new(FighterId::new(2), "C", FighterClass::Monk, Side::Enemy)
                    .at(GridPos::new(2, 2)),
            );
            assert_eq!(centre.facing, IVec2::Y);
        }

        #[test]
        fn explicit_facing_is_normalised() {
            let f = Fighter::from_spec(
                &FighterSpec::new(FighterId::new(3), "F", FighterClass::Archer, Side::Player)
                    .facing(IVec2::new(0, -4)),
            );
            assert_eq!(f.facing, IVec2::NEG_Y);
        }
    }

    mod health_tests {
        use super::*;
        use crate::effects::{apply, EffectKind};

        #[test]
        fn damage_clamps_at_zero_and_defeats() {
            let mut f = fighter(FighterClass::Warrior);
            apply(&mut f, EffectKind::Poison, 3, 1);
            let lost = f.apply_damage(10_000);
            assert_eq!(lost, f.max_health);
            assert_eq!(f.health, 0);
            assert!(f.is_defeated());
            assert!(f.effects.is_empty());
            assert_eq!(f.apply_damage(5), 0);
        }

        #[test]
        fn heal_caps_at_max_and_skips_the_defeated() {
            let mut f = fighter(FighterClass::Warrior);
            f.apply_damage(30);
            assert_eq!(f.heal(100), 30);
            assert_eq!(f.health, f.max_health);

            f.apply_damage(f.max_health);
            assert_eq!(f.heal(10), 0);
        }

        #[test]
        fn insufficient_mana_is_rejected_without_change() {
            let mut f = fighter(FighterClass::Warrior);
            let before = f.mana;
            let err = f.spend_mana(before + 1).unwrap_err();
            assert_eq!(
                err,
                ActionError::InsufficientMana {
                    required: before + 1,
                    available: before
                }
            );
            assert_eq!(f.mana, before);
        }

        #[test]
        fn invariants_catch_overflowing_health() {
            let mut f = fighter(FighterClass::Cleric);
            assert!(f.check_invariants().is_ok());
            f.health = f.max_health + 1;
            assert!(matches!(
                f.check_invariants(),
                Err(InvariantViolation::HealthOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let f = fighter(FighterClass::Paladin);
        let json = serde_json::to_string(&f).unwrap();
        let back: Fighter = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f);
    }
}

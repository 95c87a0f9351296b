//! Fighter classes: stat profiles and passives.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::skills::{self, Skill};

/// The ten playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FighterClass {
    /// Sturdy frontliner.
    Warrior,
    /// Heavily armoured, slow.
    Knight,
    /// Glass-jawed heavy hitter.
    Berserker,
    /// Fast melee flanker.
    Rogue,
    /// Ranged physical damage.
    Archer,
    /// Ranged elemental damage.
    Mage,
    /// Healer.
    Cleric,
    /// Holy knight.
    Paladin,
    /// Ranged drain and curses.
    Necromancer,
    /// Agile martial artist.
    Monk,
}

/// One passive ability per class, matched exhaustively by the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Passive {
    /// Defending blocks 75% instead of 50%.
    Bulwark,
    /// Cannot be flanked.
    Steadfast,
    /// +25% damage while below half health.
    Bloodlust,
    /// Flanking bonus is doubled.
    Backstab,
    /// Negative terrain attack modifiers are ignored.
    EagleEye,
    /// Skills cost 20% less mana.
    ArcaneFlow,
    /// Healing done is increased by 25%.
    Devotion,
    /// Immune to Curse.
    HolyAura,
    /// Heals for 20% of skill damage dealt.
    LifeTap,
    /// Immune to Stun.
    InnerCalm,
}

/// Stat multipliers and weapon profile for a class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassProfile {
    /// Percentage of base health.
    pub health_percent: u32,
    /// Percentage of base mana.
    pub mana_percent: u32,
    /// Percentage of base defense.
    pub defense_percent: u32,
    /// Damage multiplier used by the damage pipeline.
    pub damage_percent: u32,
    /// Flat crit chance added to the base value.
    pub crit_bonus: u32,
    /// Basic attack reach (Chebyshev).
    pub weapon_range: u32,
    /// Basic attacks need line of sight.
    pub ranged: bool,
    /// Added to the configured base movement.
    pub movement_bonus: i32,
    /// The class passive.
    pub passive: Passive,
}

#[allow(clippy::too_many_arguments)]
const fn profile(
    health_percent: u32,
    mana_percent: u32,
    defense_percent: u32,
    damage_percent: u32,
    crit_bonus: u32,
    weapon_range: u32,
    movement_bonus: i32,
    passive: Passive,
) -> ClassProfile {
    ClassProfile {
        health_percent,
        mana_percent,
        defense_percent,
        damage_percent,
        crit_bonus,
        weapon_range,
        ranged: weapon_range > 1,
        movement_bonus,
        passive,
    }
}

impl FighterClass {
    /// All classes.
    pub const ALL: [FighterClass; 10] = [
        Self::Warrior,
        Self::Knight,
        Self::Berserker,
        Self::Rogue,
        Self::Archer,
        Self::Mage,
        Self::Cleric,
        Self::Paladin,
        Self::Necromancer,
        Self::Monk,
    ];

    /// Stat profile for this class.
    #[must_use]
    pub const fn profile(self) -> ClassProfile {
        match self {
            Self::Warrior => profile(120, 60, 110, 100, 0, 1, 0, Passive::Bulwark),
            Self::Knight => profile(130, 50, 130, 90, 0, 1, -1, Passive::Steadfast),
            Self::Berserker => profile(110, 40, 80, 125, 5, 1, 0, Passive::Bloodlust),
            Self::Rogue => profile(90, 70, 80, 110, 10, 1, 1, Passive::Backstab),
            Self::Archer => profile(85, 70, 80, 100, 5, 3, 0, Passive::EagleEye),
            Self::Mage => profile(75, 150, 70, 120, 0, 3, 0, Passive::ArcaneFlow),
            Self::Cleric => profile(90, 130, 90, 80, 0, 2, 0, Passive::Devotion),
            Self::Paladin => profile(115, 90, 120, 95, 0, 1, 0, Passive::HolyAura),
            Self::Necromancer => profile(85, 140, 75, 110, 0, 3, 0, Passive::LifeTap),
            Self::Monk => profile(100, 80, 100, 105, 10, 1, 1, Passive::InnerCalm),
        }
    }

    /// The class passive.
    #[must_use]
    pub const fn passive(self) -> Passive {
        self.profile().passive
    }

    /// Skills available to this class, addressed by index in intents.
    #[must_use]
    pub fn skills(self) -> &'static [Skill] {
        skills::for_class(self)
    }
}

impl fmt::Display for FighterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

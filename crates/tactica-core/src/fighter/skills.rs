//! Static skill table, two or three skills per class.

use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use super::FighterClass;
use crate::effects::EffectKind;
use crate::error::UnknownSkillName;

/// Who a skill may be aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkillTarget {
    /// A living opponent.
    Enemy,
    /// The caster or a living teammate.
    Ally,
    /// Only the caster.
    Caster,
}

/// An effect a skill applies to its target on a successful cast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkillEffect {
    /// Kind to apply.
    pub kind: EffectKind,
    /// Duration in rounds.
    pub duration: u32,
    /// Stacks added.
    pub stacks: u32,
}

/// A class skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Skill {
    /// Display name, also used by named combo steps.
    pub name: &'static str,
    /// Base mana cost before modifiers.
    pub mana_cost: u32,
    /// Damage multiplier in percent; 0 for skills that deal no damage.
    pub power_percent: u32,
    /// Flat healing applied to an ally target.
    pub heal: u32,
    /// Reach (Chebyshev). Anything beyond 1 needs line of sight.
    pub range: u32,
    /// Valid targets.
    pub target: SkillTarget,
    /// Effects applied to the target.
    pub effects: &'static [SkillEffect],
}

impl Skill {
    /// True if the skill needs line of sight.
    #[must_use]
    pub const fn is_ranged(&self) -> bool {
        self.range > 1
    }

    /// True if the skill runs through the damage pipeline.
    #[must_use]
    pub const fn deals_damage(&self) -> bool {
        self.power_percent > 0
    }
}

/// Name of a skill in the static table.
///
/// Serializes as the plain name. Deserializing looks the name up so that only
/// existing skills can be named.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SkillName(&'static str);

impl<'de> Deserialize<'de> for SkillName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::try_from(name).map_err(de::Error::custom)
    }
}

impl SkillName {
    /// Name of `skill`.
    #[must_use]
    pub const fn of(skill: &Skill) -> Self {
        Self(skill.name)
    }

    /// Name for static tables; checked by their tests rather than here.
    pub(crate) const fn named(name: &'static str) -> Self {
        Self(name)
    }

    /// The name as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl TryFrom<String> for SkillName {
    type Error = UnknownSkillName;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        by_name(&name).map(Self::of).ok_or(UnknownSkillName(name))
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

const fn fx(kind: EffectKind, duration: u32, stacks: u32) -> SkillEffect {
    SkillEffect {
        kind,
        duration,
        stacks,
    }
}

const fn strike(
    name: &'static str,
    mana_cost: u32,
    power_percent: u32,
    range: u32,
    effects: &'static [SkillEffect],
) -> Skill {
    Skill {
        name,
        mana_cost,
        power_percent,
        heal: 0,
        range,
        target: SkillTarget::Enemy,
        effects,
    }
}

const fn support(
    name: &'static str,
    mana_cost: u32,
    heal: u32,
    range: u32,
    target: SkillTarget,
    effects: &'static [SkillEffect],
) -> Skill {
    Skill {
        name,
        mana_cost,
        power_percent: 0,
        heal,
        range,
        target,
        effects,
    }
}

use EffectKind as E;
use SkillTarget::{Ally, Caster};

const WAR_CRY: [SkillEffect; 2] = [fx(E::StrengthBoost, 3, 1), fx(E::DefenseBoost, 3, 1)];
const SHIELD_BASH: [SkillEffect; 1] = [fx(E::Stun, 1, 1)];
const BASTION: [SkillEffect; 2] = [fx(E::Fortify, 3, 1), fx(E::Thorns, 3, 1)];
const REND: [SkillEffect; 1] = [fx(E::Bleed, 3, 2)];
const RAGE: [SkillEffect; 1] = [fx(E::Enrage, 3, 1)];
const VENOM_STRIKE: [SkillEffect; 1] = [fx(E::Poison, 4, 1)];
const CRIPPLING_BLOW: [SkillEffect; 1] = [fx(E::Weakness, 2, 1)];
const FROST_ARROW: [SkillEffect; 1] = [fx(E::Frozen, 2, 1)];
const FIREBALL: [SkillEffect; 1] = [fx(E::Burn, 3, 1)];
const LIGHTNING: [SkillEffect; 1] = [fx(E::Shock, 2, 1)];
const MIRROR_WARD: [SkillEffect; 1] = [fx(E::Reflect, 2, 1)];
const BLESSING: [SkillEffect; 1] = [fx(E::Bless, 3, 1)];
const SMITE: [SkillEffect; 1] = [fx(E::Silence, 1, 1)];
const DIVINE_SHIELD: [SkillEffect; 1] = [fx(E::Shield, 3, 1)];
const HEX: [SkillEffect; 3] = [fx(E::Curse, 3, 1), fx(E::Vulnerable, 2, 1), fx(E::Slow, 2, 1)];
const MEDITATE: [SkillEffect; 2] = [fx(E::Regeneration, 3, 2), fx(E::Haste, 2, 1)];

const WARRIOR: [Skill; 2] = [
    strike("Cleave", 10, 150, 1, &[]),
    support("War Cry", 15, 0, 0, Caster, &WAR_CRY),
];

const KNIGHT: [Skill; 2] = [
    strike("Shield Bash", 15, 120, 1, &SHIELD_BASH),
    support("Bastion", 10, 0, 0, Caster, &BASTION),
];

const BERSERKER: [Skill; 2] = [
    strike("Rend", 10, 110, 1, &REND),
    support("Rage", 10, 0, 0, Caster, &RAGE),
];

const ROGUE: [Skill; 2] = [
    strike("Venom Strike", 10, 100, 1, &VENOM_STRIKE),
    strike("Crippling Blow", 10, 90, 1, &CRIPPLING_BLOW),
];

const ARCHER: [Skill; 2] = [
    strike("Power Shot", 15, 160, 3, &[]),
    strike("Frost Arrow", 15, 90, 3, &FROST_ARROW),
];

const MAGE: [Skill; 3] = [
    strike("Fireball", 25, 180, 3, &FIREBALL),
    strike("Lightning", 20, 140, 3, &LIGHTNING),
    support("Mirror Ward", 15, 0, 0, Caster, &MIRROR_WARD),
];

const CLERIC: [Skill; 2] = [
    support("Heal", 20, 35, 2, Ally, &[]),
    support("Blessing", 15, 0, 2, Ally, &BLESSING),
];

const PALADIN: [Skill; 2] = [
    strike("Smite", 15, 130, 1, &SMITE),
    support("Divine Shield", 20, 0, 1, Ally, &DIVINE_SHIELD),
];

const NECROMANCER: [Skill; 2] = [
    strike("Drain", 15, 120, 3, &[]),
    strike("Hex", 15, 0, 3, &HEX),
];

const MONK: [Skill; 2] = [
    strike("Flurry", 10, 130, 1, &[]),
    support("Meditate", 10, 0, 0, Caster, &MEDITATE),
];

/// Skill list for `class`.
#[must_use]
pub fn for_class(class: FighterClass) -> &'static [Skill] {
    match class {
        FighterClass::Warrior => &WARRIOR,
        FighterClass::Knight => &KNIGHT,
        FighterClass::Berserker => &BERSERKER,
        FighterClass::Rogue => &ROGUE,
        FighterClass::Archer => &ARCHER,
        FighterClass::Mage => &MAGE,
        FighterClass::Cleric => &CLERIC,
        FighterClass::Paladin => &PALADIN,
        FighterClass::Necromancer => &NECROMANCER,
        FighterClass::Monk => &MONK,
    }
}

/// Looks a skill up by name across every class.
#[must_use]
pub fn by_name(name: &str) -> Option<&'static Skill> {
    FighterClass::ALL
        .into_iter()
        .flat_map(for_class)
        .find(|skill| skill.name == name)
}

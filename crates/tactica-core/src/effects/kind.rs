//! Effect kinds and their static properties.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Broad grouping of effect kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EffectCategory {
    /// Damage over time.
    Dot,
    /// Beneficial stat or heal-over-time effect.
    Buff,
    /// Harmful stat effect.
    Debuff,
    /// Absorbs or returns incoming damage.
    Protection,
    /// Restricts what the fighter may do.
    CrowdControl,
}

/// Every status effect the engine knows about.
///
/// Declaration order is the canonical processing order for ticks and
/// modifier aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    /// Stacking damage over time.
    Poison,
    /// Fire damage over time; melts Frozen.
    Burn,
    /// Damage over time that worsens when the bearer acts.
    Bleed,
    /// Lightning damage over time, doubled on wet ground.
    Shock,
    /// Healing over time.
    Regeneration,
    /// Raises strength.
    StrengthBoost,
    /// Raises defense.
    DefenseBoost,
    /// More damage dealt and healing received.
    Bless,
    /// Extra movement.
    Haste,
    /// Less damage taken.
    Fortify,
    /// More damage dealt at the cost of defense.
    Enrage,
    /// Cheaper skills.
    Clarity,
    /// Lowers strength.
    Weakness,
    /// More damage taken, less healing received.
    Curse,
    /// Less movement.
    Slow,
    /// More damage taken.
    Vulnerable,
    /// Absorbs a flat amount of damage.
    Shield,
    /// Returns a share of each hit to the attacker.
    Reflect,
    /// Returns flat damage to the attacker.
    Thorns,
    /// Cannot act.
    Stun,
    /// Movement halved; shatters under heavy hits.
    Frozen,
    /// Cannot use skills.
    Silence,
}

/// Static properties of an effect kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EffectSpec {
    /// Group the kind belongs to.
    pub category: EffectCategory,
    /// Stack cap; 1 for non-stackable kinds.
    pub max_stacks: u32,
    /// Per-tick damage (DOT) or healing (HOT) for a single stack.
    pub per_tick: u32,
    /// True for effects a defeated fighter may not receive.
    pub beneficial: bool,
}

/// Flat amount a fresh Shield absorbs.
pub const SHIELD_ABSORB: u32 = 50;

/// Percentage of a hit that Reflect sends back.
pub const REFLECT_PERCENT: u32 = 25;

/// Flat damage Thorns returns per stack.
pub const THORNS_PER_STACK: u32 = 5;

impl EffectKind {
    /// Number of kinds.
    pub const COUNT: usize = 22;

    /// All kinds in canonical order.
    pub const ALL: [EffectKind; Self::COUNT] = [
        Self::Poison,
        Self::Burn,
        Self::Bleed,
        Self::Shock,
        Self::Regeneration,
        Self::StrengthBoost,
        Self::DefenseBoost,
        Self::Bless,
        Self::Haste,
        Self::Fortify,
        Self::Enrage,
        Self::Clarity,
        Self::Weakness,
        Self::Curse,
        Self::Slow,
        Self::Vulnerable,
        Self::Shield,
        Self::Reflect,
        Self::Thorns,
        Self::Stun,
        Self::Frozen,
        Self::Silence,
    ];

    /// Position of this kind in [`EffectKind::ALL`].
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Static properties of this kind.
    #[must_use]
    pub const fn spec(self) -> EffectSpec {
        use EffectCategory::{Buff, CrowdControl, Debuff, Dot, Protection};
        let (category, max_stacks, per_tick) = match self {
            Self::Poison => (Dot, 5, 10),
            Self::Burn => (Dot, 3, 8),
            Self::Bleed => (Dot, 5, 4),
            Self::Shock => (Dot, 1, 12),
            Self::Regeneration => (Buff, 3, 8),
            Self::StrengthBoost
            | Self::DefenseBoost
            | Self::Bless
            | Self::Haste
            | Self::Enrage
            | Self::Clarity => (Buff, 1, 0),
            Self::Fortify => (Buff, 2, 0),
            Self::Weakness | Self::Curse | Self::Slow | Self::Vulnerable => (Debuff, 1, 0),
            Self::Shield | Self::Reflect => (Protection, 1, 0),
            Self::Thorns => (Protection, 3, 0),
            Self::Stun | Self::Frozen | Self::Silence => (CrowdControl, 1, 0),
        };
        EffectSpec {
            category,
            max_stacks,
            per_tick,
            beneficial: matches!(category, Buff | Protection),
        }
    }

    /// Group this kind belongs to.
    #[must_use]
    pub const fn category(self) -> EffectCategory {
        self.spec().category
    }

    /// Stack cap.
    #[must_use]
    pub const fn max_stacks(self) -> u32 {
        self.spec().max_stacks
    }

    /// True if reapplication adds stacks instead of only refreshing.
    #[must_use]
    pub const fn is_stackable(self) -> bool {
        self.spec().max_stacks > 1
    }

    /// True for buffs and protections.
    #[must_use]
    pub const fn is_beneficial(self) -> bool {
        self.spec().beneficial
    }

    /// True for kinds that heal every tick.
    #[must_use]
    pub const fn heals_over_time(self) -> bool {
        matches!(self, Self::Regeneration)
    }

    /// True for kinds that damage every tick.
    #[must_use]
    pub const fn damages_over_time(self) -> bool {
        matches!(self.spec().category, EffectCategory::Dot)
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_is_in_index_order() {
        for (i, kind) in EffectKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn stack_caps() {
        assert_eq!(EffectKind::Poison.max_stacks(), 5);
        assert_eq!(EffectKind::Burn.max_stacks(), 3);
        assert_eq!(EffectKind::Bleed.max_stacks(), 5);
        assert_eq!(EffectKind::Regeneration.max_stacks(), 3);
        assert_eq!(EffectKind::Fortify.max_stacks(), 2);
        assert_eq!(EffectKind::Thorns.max_stacks(), 3);

        let stackable: Vec<_> = EffectKind::ALL
            .into_iter()
            .filter(|k| k.is_stackable())
            .collect();
        assert_eq!(stackable.len(), 6);
    }

    #[test]
    fn categories_drive_beneficial_flag() {
        assert!(EffectKind::Regeneration.is_beneficial());
        assert!(EffectKind::Shield.is_beneficial());
        assert!(!EffectKind::Poison.is_beneficial());
        assert!(!EffectKind::Curse.is_beneficial());
        assert!(!EffectKind::Stun.is_beneficial());
    }
}

//! Aggregated stat modifiers from active effects.

use serde::{Deserialize, Serialize};

use super::interaction::InteractionPlan;
use super::{EffectKind, StatusEffectInstance};

/// Percentage and flat modifiers summed over all active effects.
///
/// Contributions add up within a category; categories combine
/// multiplicatively wherever more than one applies to the same value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierSet {
    /// Percent change to strength.
    pub strength_percent: i32,
    /// Percent change to defense.
    pub defense_percent: i32,
    /// Percent change to outgoing damage.
    pub damage_dealt_percent: i32,
    /// Percent change to incoming damage.
    pub damage_taken_percent: i32,
    /// Percent change to skill mana costs.
    pub mana_cost_percent: i32,
    /// Percent change to healing received.
    pub healing_received_percent: i32,
    /// Flat change to the movement budget.
    pub movement: i32,
}

/// Scales `value` by `100 + percent` percent, never below zero.
#[must_use]
pub fn apply_percent(value: u32, percent: i32) -> u32 {
    let factor = i64::from(100 + percent).max(0);
    let scaled = i64::from(value) * factor / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

/// `percent` percent of `value`, rounded down and saturating at `u32::MAX`.
#[must_use]
pub fn percent_of(value: u32, percent: u32) -> u32 {
    let scaled = u64::from(value) * u64::from(percent) / 100;
    u32::try_from(scaled).unwrap_or(u32::MAX)
}

impl ModifierSet {
    /// Aggregates the modifiers of `instances` after interaction scaling.
    #[must_use]
    pub fn collect(instances: &[StatusEffectInstance], plan: &InteractionPlan) -> Self {
        let mut set = Self::default();
        for instance in instances {
            set.add(instance, plan);
        }
        set
    }

    fn add(&mut self, instance: &StatusEffectInstance, plan: &InteractionPlan) {
        #[allow(clippy::cast_possible_wrap)]
        let stacks = instance.stacks as i32;
        #[allow(clippy::cast_possible_wrap)]
        let scale = plan.scale(instance.kind) as i32;
        let amount = |base: i32| base * stacks * scale / 100;

        match instance.kind {
            EffectKind::StrengthBoost => self.strength_percent += amount(25),
            EffectKind::DefenseBoost => self.defense_percent += amount(30),
            EffectKind::Bless => {
                self.damage_dealt_percent += amount(10);
                self.healing_received_percent += amount(10);
            }
            EffectKind::Haste => self.movement += amount(1),
            EffectKind::Fortify => self.damage_taken_percent -= amount(15),
            EffectKind::Enrage => {
                self.damage_dealt_percent += amount(30);
                self.defense_percent -= amount(20);
            }
            EffectKind::Clarity => self.mana_cost_percent -= amount(50),
            EffectKind::Weakness => self.strength_percent -= amount(25),
            EffectKind::Curse => {
                self.damage_taken_percent += amount(15);
                self.healing_received_percent -= amount(50);
            }
            EffectKind::Slow => self.movement -= amount(1),
            EffectKind::Vulnerable => self.damage_taken_percent += amount(25),
            EffectKind::Poison
            | EffectKind::Burn
            | EffectKind::Bleed
            | EffectKind::Shock
            | EffectKind::Regeneration
            | EffectKind::Shield
            | EffectKind::Reflect
            | EffectKind::Thorns
            | EffectKind::Stun
            | EffectKind::Frozen
            | EffectKind::Silence => {}
        }
    }

    /// Strength after modifiers.
    #[must_use]
    pub fn strength(&self, base: u32) -> u32 {
        apply_percent(base, self.strength_percent)
    }

    /// Defense after modifiers.
    #[must_use]
    pub fn defense(&self, base: u32) -> u32 {
        apply_percent(base, self.defense_percent)
    }

    /// Skill cost after modifiers.
    #[must_use]
    pub fn mana_cost(&self, base: u32) -> u32 {
        apply_percent(base, self.mana_cost_percent)
    }

    /// Healing after modifiers.
    #[must_use]
    pub fn healing(&self, base: u32) -> u32 {
        apply_percent(base, self.healing_received_percent)
    }

    /// True when no effect contributes anything.
    #[must_use]
    pub fn is_neutral(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::interaction::evaluate;

    fn set_of(kinds: &[(EffectKind, u32)]) -> ModifierSet {
        let instances: Vec<_> = kinds
            .iter()
            .map(|(kind, stacks)| {
                let mut instance = StatusEffectInstance::new(*kind, 3);
                instance.stacks = *stacks;
                instance
            })
            .collect();
        let active: Vec<_> = kinds.iter().map(|(k, _)| *k).collect();
        ModifierSet::collect(&instances, &evaluate(&active, false))
    }

    #[test]
    fn apply_percent_rounds_down_and_floors_at_zero() {
        assert_eq!(apply_percent(10, 0), 10);
        assert_eq!(apply_percent(10, 25), 12);
        assert_eq!(apply_percent(10, -150), 0);
    }

    #[test]
    fn percent_of_saturates_instead_of_wrapping() {
        assert_eq!(percent_of(15, 150), 22);
        assert_eq!(percent_of(u32::MAX, 50), u32::MAX / 2);
        assert_eq!(percent_of(u32::MAX, 150), u32::MAX);
        assert_eq!(apply_percent(u32::MAX, 50), u32::MAX);
    }

    #[test]
    fn no_effects_is_neutral() {
        assert!(set_of(&[]).is_neutral());
        assert!(set_of(&[(EffectKind::Poison, 3)]).is_neutral());
    }

    #[test]
    fn contributions_add_within_a_category() {
        let set = set_of(&[(EffectKind::Bless, 1), (EffectKind::Enrage, 1)]);
        assert_eq!(set.damage_dealt_percent, 40);
        assert_eq!(set.defense_percent, -20);
    }

    #[test]
    fn fortify_scales_with_stacks() {
        let set = set_of(&[(EffectKind::Fortify, 2)]);
        assert_eq!(set.damage_taken_percent, -30);
    }

    #[test]
    fn vulnerable_and_fortify_dampen_each_other() {
        let set = set_of(&[(EffectKind::Vulnerable, 1), (EffectKind::Fortify, 1)]);
        // +25 * 50% = 12, -15 * 50% = -7
        assert_eq!(set.damage_taken_percent, 12 - 7);
    }

    #[test]
    fn haste_and_slow_move_the_budget() {
        assert_eq!(set_of(&[(EffectKind::Haste, 1)]).movement, 1);
        assert_eq!(set_of(&[(EffectKind::Slow, 1)]).movement, -1);
    }
}

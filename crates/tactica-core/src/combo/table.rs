//! The standard combo table.

use serde::{Deserialize, Serialize};

use super::ComboStep::{self, AnySkill, Attack, Defend, Item};
use crate::effects::EffectKind;
use crate::fighter::SkillName;

/// Reward for completing a combo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboBonus {
    /// Flat damage to the target of the completing action.
    BonusDamage(u32),
    /// Healing for the actor.
    Heal(u32),
    /// An effect on the actor.
    ApplyEffect {
        /// Effect kind.
        kind: EffectKind,
        /// Duration in rounds.
        duration: u32,
    },
}

/// A named sequence of 2 to 6 actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComboDefinition {
    /// Unique name.
    pub name: &'static str,
    /// Glyph shown by hint renderers.
    pub icon: &'static str,
    /// Player-facing description.
    pub description: &'static str,
    /// Steps, oldest first.
    pub steps: &'static [ComboStep],
    /// Completion reward.
    pub bonus: ComboBonus,
}

/// Combos available to every fighter.
pub static STANDARD_COMBOS: [ComboDefinition; 7] = [
    ComboDefinition {
        name: "Riposte",
        icon: "⚔",
        description: "Defend, then strike back",
        steps: &[Defend, Attack],
        bonus: ComboBonus::BonusDamage(15),
    },
    ComboDefinition {
        name: "Elemental Fury",
        icon: "☄",
        description: "Fireball followed by Lightning",
        steps: &[
            ComboStep::Skill(SkillName::named("Fireball")),
            ComboStep::Skill(SkillName::named("Lightning")),
        ],
        bonus: ComboBonus::BonusDamage(20),
    },
    ComboDefinition {
        name: "Arcane Surge",
        icon: "✦",
        description: "Three skills in a row",
        steps: &[AnySkill, AnySkill, AnySkill],
        bonus: ComboBonus::ApplyEffect {
            kind: EffectKind::Clarity,
            duration: 2,
        },
    },
    ComboDefinition {
        name: "Second Wind",
        icon: "❤",
        description: "Defend twice, then use an item",
        steps: &[Defend, Defend, Item],
        bonus: ComboBonus::Heal(30),
    },
    ComboDefinition {
        name: "Blade Dance",
        icon: "🗡",
        description: "Two attacks, a skill, and a finishing attack",
        steps: &[Attack, Attack, AnySkill, Attack],
        bonus: ComboBonus::BonusDamage(25),
    },
    ComboDefinition {
        name: "Patient Strike",
        icon: "⏳",
        description: "Hold the line four times, then strike",
        steps: &[Defend, Defend, Defend, Defend, Attack],
        bonus: ComboBonus::BonusDamage(40),
    },
    ComboDefinition {
        name: "Warlord's Cadence",
        icon: "♛",
        description: "Alternate attacks and skills three times",
        steps: &[Attack, AnySkill, Attack, AnySkill, Attack, AnySkill],
        bonus: ComboBonus::ApplyEffect {
            kind: EffectKind::StrengthBoost,
            duration: 3,
        },
    },
];

/// Length of the longest standard combo; sizes action histories.
pub(super) fn longest_combo() -> usize {
    STANDARD_COMBOS
        .iter()
        .map(|c| c.steps.len())
        .max()
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::skill_by_name;

    #[test]
    fn lengths_are_between_two_and_six() {
        for combo in &STANDARD_COMBOS {
            assert!((2..=6).contains(&combo.steps.len()), "{}", combo.name);
        }
    }

    #[test]
    fn named_steps_refer_to_real_skills() {
        for combo in &STANDARD_COMBOS {
            for step in combo.steps {
                if let ComboStep::Skill(name) = step {
                    assert!(skill_by_name(name.as_str()).is_some(), "{name}");
                }
            }
        }
    }

    #[test]
    fn no_combo_completes_inside_another() {
        // A shorter combo finishing on a proper prefix of a longer one would
        // clear the history and make the longer one unreachable.
        for long in &STANDARD_COMBOS {
            for end in 1..long.steps.len() {
                let prefix = &long.steps[..end];
                for short in &STANDARD_COMBOS {
                    let n = short.steps.len();
                    if n <= prefix.len() {
                        assert_ne!(&prefix[prefix.len() - n..], short.steps, "{} inside {}", short.name, long.name);
                    }
                }
            }
        }
    }
}

//! Pairwise effect interactions.
//!
//! All pair interactions live in [`INTERACTIONS`]. The engine never checks for
//! a combination of effects anywhere else: application, ticking, and modifier
//! aggregation all go through [`dispel_partner`] or [`evaluate`].
//!
//! Two interactions are triggered by events rather than by a pair of active
//! effects and are applied where the event happens:
//!
//! - Frozen shatters when a hit of at least the configured threshold lands
//!   (damage pipeline, +[`SHATTER_BONUS`] damage by default).
//! - Bleed gains a stack whenever its bearer takes an action (turn resolver).

use super::EffectKind;

/// Default bonus damage when a Frozen fighter shatters.
pub const SHATTER_BONUS: u32 = 30;

/// Default hit size needed to shatter a Frozen fighter.
pub const SHATTER_THRESHOLD: u32 = 25;

/// Second half of an interaction pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partner {
    /// Another active effect.
    Effect(EffectKind),
    /// The bearer stands on wet terrain.
    Wet,
}

/// What happens when both halves are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Both effects are removed.
    DispelBoth,
    /// The first effect's magnitude is scaled (percent).
    ScaleFirst(u32),
    /// Both effects' magnitudes are scaled (percent).
    ScaleBoth(u32),
}

/// One row of the interaction table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interaction {
    /// Effect that must be active.
    pub first: EffectKind,
    /// Effect or condition it reacts with.
    pub second: Partner,
    /// Outcome.
    pub resolution: Resolution,
}

const fn pair(first: EffectKind, second: EffectKind, resolution: Resolution) -> Interaction {
    Interaction {
        first,
        second: Partner::Effect(second),
        resolution,
    }
}

/// The interaction table, evaluated in this order.
pub const INTERACTIONS: [Interaction; 6] = [
    pair(EffectKind::Burn, EffectKind::Frozen, Resolution::DispelBoth),
    Interaction {
        first: EffectKind::Shock,
        second: Partner::Wet,
        resolution: Resolution::ScaleFirst(200),
    },
    pair(
        EffectKind::Poison,
        EffectKind::Regeneration,
        Resolution::ScaleBoth(50),
    ),
    pair(EffectKind::Curse, EffectKind::Bless, Resolution::DispelBoth),
    pair(EffectKind::Haste, EffectKind::Slow, Resolution::DispelBoth),
    pair(
        EffectKind::Vulnerable,
        EffectKind::Fortify,
        Resolution::ScaleBoth(50),
    ),
];

/// The kind that cancels `kind` out, if any.
#[must_use]
pub fn dispel_partner(kind: EffectKind) -> Option<EffectKind> {
    INTERACTIONS.iter().find_map(|i| match (i.resolution, i.second) {
        (Resolution::DispelBoth, Partner::Effect(other)) if i.first == kind => Some(other),
        (Resolution::DispelBoth, Partner::Effect(other)) if other == kind => Some(i.first),
        _ => None,
    })
}

/// Result of evaluating the table against a set of active effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionPlan {
    scale: [u32; EffectKind::COUNT],
    dispel: Vec<EffectKind>,
}

impl Default for InteractionPlan {
    fn default() -> Self {
        Self {
            scale: [100; EffectKind::COUNT],
            dispel: Vec::new(),
        }
    }
}

impl InteractionPlan {
    /// Magnitude percentage for `kind` (100 when untouched).
    #[must_use]
    pub fn scale(&self, kind: EffectKind) -> u32 {
        self.scale[kind.index()]
    }

    /// Applies the scale for `kind` to `amount`.
    #[must_use]
    pub fn scaled(&self, kind: EffectKind, amount: u32) -> u32 {
        amount * self.scale(kind) / 100
    }

    /// Kinds to remove, in canonical order without duplicates.
    #[must_use]
    pub fn dispelled(&self) -> &[EffectKind] {
        &self.dispel
    }

    fn rescale(&mut self, kind: EffectKind, percent: u32) {
        let slot = &mut self.scale[kind.index()];
        *slot = *slot * percent / 100;
    }
}

/// Evaluates every table row against the active kinds.
///
/// The outcome only depends on which kinds are present, never on the order
/// they were applied in.
#[must_use]
pub fn evaluate(active: &[EffectKind], wet: bool) -> InteractionPlan {
    let mut plan = InteractionPlan::default();
    let has = |kind: EffectKind| active.contains(&kind);

    for row in &INTERACTIONS {
        if !has(row.first) {
            continue;
        }
        let second = match row.second {
            Partner::Effect(kind) if has(kind) => Some(kind),
            Partner::Wet if wet => None,
            _ => continue,
        };
        match row.resolution {
            Resolution::DispelBoth => {
                plan.dispel.push(row.first);
                plan.dispel.extend(second);
            }
            Resolution::ScaleFirst(percent) => plan.rescale(row.first, percent),
            Resolution::ScaleBoth(percent) => {
                plan.rescale(row.first, percent);
                if let Some(kind) = second {
                    plan.rescale(kind, percent);
                }
            }
        }
    }

    plan.dispel.sort_unstable();
    plan.dispel.dedup();
    plan
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispel_partners_are_symmetric() {
        assert_eq!(dispel_partner(EffectKind::Curse), Some(EffectKind::Bless));
        assert_eq!(dispel_partner(EffectKind::Bless), Some(EffectKind::Curse));
        assert_eq!(dispel_partner(EffectKind::Haste), Some(EffectKind::Slow));
        assert_eq!(dispel_partner(EffectKind::Frozen), Some(EffectKind::Burn));
        assert_eq!(dispel_partner(EffectKind::Poison), None);
    }

    #[test]
    fn empty_set_is_untouched() {
        let plan = evaluate(&[], true);
        assert!(plan.dispelled().is_empty());
        assert!(EffectKind::ALL.iter().all(|k| plan.scale(*k) == 100));
    }

    #[test]
    fn shock_doubles_only_when_wet() {
        assert_eq!(evaluate(&[EffectKind::Shock], true).scale(EffectKind::Shock), 200);
        assert_eq!(evaluate(&[EffectKind::Shock], false).scale(EffectKind::Shock), 100);
    }

    #[test]
    fn poison_and_regeneration_halve_each_other() {
        let plan = evaluate(&[EffectKind::Poison, EffectKind::Regeneration], false);
        assert_eq!(plan.scaled(EffectKind::Poison, 20), 10);
        assert_eq!(plan.scaled(EffectKind::Regeneration, 16), 8);
    }

    #[test]
    fn outcome_is_order_independent() {
        let a = evaluate(
            &[EffectKind::Frozen, EffectKind::Curse, EffectKind::Burn, EffectKind::Bless],
            false,
        );
        let b = evaluate(
            &[EffectKind::Bless, EffectKind::Burn, EffectKind::Curse, EffectKind::Frozen],
            false,
        );
        assert_eq!(a, b);
        assert_eq!(
            a.dispelled(),
            &[EffectKind::Burn, EffectKind::Bless, EffectKind::Curse, EffectKind::Frozen]
        );
    }
}

//! Status effect engine.
//!
//! Effects live on their fighter as an [`EffectSet`]: at most one
//! [`StatusEffectInstance`] per [`EffectKind`], kept in canonical kind order so
//! that ticking and modifier aggregation never depend on application order.
//!
//! The engine is a set of free functions over `&mut Fighter`:
//!
//! - [`apply`]: add, stack, refresh, or cancel against a dispel partner.
//! - [`tick`]: once per living fighter per round. DOT/HOT first, then
//!   interaction dispels, then duration countdown, then expiry.
//! - [`modifiers`]: the aggregated [`ModifierSet`].
//! - [`can_act`], [`can_use_skills`], [`movement_budget`]: action gating.
//!
//! Pair interactions are all defined in [`interaction::INTERACTIONS`].
//!
//! # Example
//!
//! ```
//! use tactica_core::effects::{self, ApplyOutcome, EffectKind};
//! use tactica_core::fighter::{Fighter, FighterClass, FighterId, FighterSpec, Side};
//!
//! let mut f = Fighter::from_spec(&FighterSpec::new(
//!     FighterId::new(1),
//!     "Ysolde",
//!     FighterClass::Warrior,
//!     Side::Enemy,
//! ));
//!
//! assert_eq!(effects::apply(&mut f, EffectKind::Poison, 4, 1), ApplyOutcome::Added);
//! assert_eq!(
//!     effects::apply(&mut f, EffectKind::Poison, 4, 1),
//!     ApplyOutcome::Stacked { stacks: 2 }
//! );
//!
//! let report = effects::tick(&mut f, effects::TickContext::default());
//! assert_eq!(report.damage, 20);
//! ```

pub mod interaction;
mod kind;
mod modifiers;

pub use kind::{
    EffectCategory, EffectKind, EffectSpec, REFLECT_PERCENT, SHIELD_ABSORB, THORNS_PER_STACK,
};
pub use modifiers::{apply_percent, percent_of, ModifierSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::InvariantViolation;
use crate::fighter::{Fighter, Passive};
use crate::output::{TickEntry, TickReport};

use interaction::{dispel_partner, evaluate, InteractionPlan};

// =============================================================================
// Instances
// =============================================================================

/// Kind-specific state carried by an instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectPayload {
    /// Nothing beyond duration and stacks.
    #[default]
    None,
    /// Absorb left on a Shield.
    Shield {
        /// Damage the shield can still absorb.
        remaining: u32,
    },
}

/// One active effect on a fighter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEffectInstance {
    /// Effect kind.
    pub kind: EffectKind,
    /// Rounds left, always at least 1 while the instance exists.
    pub remaining: u32,
    /// Stack count, `1..=kind.max_stacks()`.
    pub stacks: u32,
    /// Kind-specific state.
    pub payload: EffectPayload,
    /// Applied or renewed since the last tick. The next tick keeps the
    /// duration as is, so a one-round effect outlives the round it landed in.
    #[serde(default)]
    pub fresh: bool,
}

impl StatusEffectInstance {
    /// Fresh single-stack instance.
    #[must_use]
    pub fn new(kind: EffectKind, duration: u32) -> Self {
        Self {
            kind,
            remaining: duration.max(1),
            stacks: 1,
            payload: Self::fresh_payload(kind),
            fresh: false,
        }
    }

    fn fresh_payload(kind: EffectKind) -> EffectPayload {
        match kind {
            EffectKind::Shield => EffectPayload::Shield {
                remaining: SHIELD_ABSORB,
            },
            _ => EffectPayload::None,
        }
    }

    /// Absorb left if this is a Shield.
    #[must_use]
    pub fn shield_remaining(&self) -> Option<u32> {
        match self.payload {
            EffectPayload::Shield { remaining } => Some(remaining),
            EffectPayload::None => None,
        }
    }
}

/// Active effects of one fighter, at most one instance per kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EffectSet {
    instances: Vec<StatusEffectInstance>,
}

impl EffectSet {
    /// Instance of `kind`, if active.
    #[must_use]
    pub fn get(&self, kind: EffectKind) -> Option<&StatusEffectInstance> {
        self.position(kind).ok().map(|i| &self.instances[i])
    }

    fn get_mut(&mut self, kind: EffectKind) -> Option<&mut StatusEffectInstance> {
        self.position(kind).ok().map(|i| &mut self.instances[i])
    }

    /// True if `kind` is active.
    #[must_use]
    pub fn contains(&self, kind: EffectKind) -> bool {
        self.position(kind).is_ok()
    }

    /// Stacks of `kind`, 0 when absent.
    #[must_use]
    pub fn stacks(&self, kind: EffectKind) -> u32 {
        self.get(kind).map_or(0, |i| i.stacks)
    }

    /// Active kinds in canonical order.
    pub fn kinds(&self) -> impl Iterator<Item = EffectKind> + '_ {
        self.instances.iter().map(|i| i.kind)
    }

    /// Instances in canonical order.
    #[must_use]
    pub fn as_slice(&self) -> &[StatusEffectInstance] {
        &self.instances
    }

    /// Number of active effects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// True when nothing is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Removes `kind` and returns the instance, if present.
    pub fn remove(&mut self, kind: EffectKind) -> Option<StatusEffectInstance> {
        self.position(kind).ok().map(|i| self.instances.remove(i))
    }

    /// Removes everything.
    pub fn clear(&mut self) {
        self.instances.clear();
    }

    fn insert(&mut self, instance: StatusEffectInstance) {
        match self.position(instance.kind) {
            Ok(i) => self.instances[i] = instance,
            Err(i) => self.instances.insert(i, instance),
        }
    }

    fn position(&self, kind: EffectKind) -> Result<usize, usize> {
        self.instances.binary_search_by_key(&kind, |i| i.kind)
    }
}

// =============================================================================
// Application
// =============================================================================

/// What [`apply`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyOutcome {
    /// A new instance was added.
    Added,
    /// An existing stackable instance gained stacks; duration refreshed.
    Stacked {
        /// Stack count afterwards.
        stacks: u32,
    },
    /// An existing instance had its duration (and payload) refreshed.
    Refreshed,
    /// A dispel partner was present; both are gone.
    Dispelled {
        /// The partner that was removed.
        partner: EffectKind,
    },
    /// The fighter is defeated or immune.
    Resisted,
}

/// True if the fighter's class ignores `kind`.
#[must_use]
pub fn is_immune(fighter: &Fighter, kind: EffectKind) -> bool {
    matches!(
        (fighter.passive(), kind),
        (Passive::HolyAura, EffectKind::Curse) | (Passive::InnerCalm, EffectKind::Stun)
    )
}

/// Applies `stacks` stacks of `kind` for `duration` rounds.
///
/// - Dispel partner active: the partner is removed and `kind` is not added.
/// - Stackable and active: stacks rise up to the cap, duration is reset to
///   `duration` (never summed).
/// - Non-stackable and active: duration is reset; a Shield's absorb is
///   restored.
/// - Otherwise a new instance is added with `stacks` capped.
///
/// Defeated fighters and class immunities resist everything.
pub fn apply(fighter: &mut Fighter, kind: EffectKind, duration: u32, stacks: u32) -> ApplyOutcome {
    if fighter.is_defeated() || is_immune(fighter, kind) {
        trace!(fighter = %fighter.id, %kind, "effect resisted");
        return ApplyOutcome::Resisted;
    }

    if let Some(partner) = dispel_partner(kind) {
        if fighter.effects.remove(partner).is_some() {
            trace!(fighter = %fighter.id, %kind, %partner, "effects cancelled");
            return ApplyOutcome::Dispelled { partner };
        }
    }

    let duration = duration.max(1);
    let stacks = stacks.max(1);
    let cap = kind.max_stacks();

    let outcome = match fighter.effects.get_mut(kind) {
        Some(existing) if kind.is_stackable() => {
            existing.stacks = (existing.stacks + stacks).min(cap);
            existing.remaining = duration;
            existing.fresh = true;
            ApplyOutcome::Stacked {
                stacks: existing.stacks,
            }
        }
        Some(existing) => {
            existing.remaining = duration;
            existing.payload = StatusEffectInstance::fresh_payload(kind);
            existing.fresh = true;
            ApplyOutcome::Refreshed
        }
        None => {
            let mut instance = StatusEffectInstance::new(kind, duration);
            instance.stacks = stacks.min(cap);
            instance.fresh = true;
            fighter.effects.insert(instance);
            ApplyOutcome::Added
        }
    };
    trace!(fighter = %fighter.id, %kind, duration, ?outcome, "effect applied");
    outcome
}

/// Adds one Bleed stack (capped) if the fighter is bleeding.
///
/// Called by the turn resolver whenever a bleeding fighter completes an
/// action. Returns true if a stack was added.
pub fn grow_bleed(fighter: &mut Fighter) -> bool {
    let cap = EffectKind::Bleed.max_stacks();
    match fighter.effects.get_mut(EffectKind::Bleed) {
        Some(bleed) if bleed.stacks < cap => {
            bleed.stacks += 1;
            true
        }
        _ => false,
    }
}

/// Removes every damage-over-time effect and returns the removed kinds.
pub fn cleanse_damage_over_time(fighter: &mut Fighter) -> Vec<EffectKind> {
    let removed: Vec<_> = fighter
        .effects
        .kinds()
        .filter(|k| k.damages_over_time())
        .collect();
    for kind in &removed {
        fighter.effects.remove(*kind);
    }
    removed
}

/// Soaks up to `amount` with the fighter's Shield.
///
/// Returns the absorbed amount. An exhausted shield is removed; the second
/// value reports that.
pub fn absorb_with_shield(fighter: &mut Fighter, amount: u32) -> (u32, bool) {
    let Some(shield) = fighter.effects.get_mut(EffectKind::Shield) else {
        return (0, false);
    };
    let EffectPayload::Shield { remaining } = &mut shield.payload else {
        return (0, false);
    };
    let absorbed = amount.min(*remaining);
    *remaining -= absorbed;
    let exhausted = *remaining == 0;
    if exhausted {
        fighter.effects.remove(EffectKind::Shield);
    }
    (absorbed, exhausted)
}

// =============================================================================
// Ticking
// =============================================================================

/// Environment of a tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickContext {
    /// The fighter stands on wet terrain.
    pub wet: bool,
}

fn plan_for(fighter: &Fighter, wet: bool) -> InteractionPlan {
    let active: Vec<EffectKind> = fighter.effects.kinds().collect();
    evaluate(&active, wet)
}

/// Advances every effect on `fighter` by one round.
///
/// Order: (1) DOT damage and HOT healing, scaled by stacks and by the
/// interactions evaluated at the start of the tick; (2) interaction
/// dispels; (3) durations decrease by one, except for instances applied
/// since the previous tick; (4) expired instances are removed. A fighter defeated by DOT damage stops ticking immediately and
/// loses all effects.
///
/// DOT damage ignores Shield and damage-taken modifiers. HOT healing is
/// scaled by healing-received modifiers.
pub fn tick(fighter: &mut Fighter, ctx: TickContext) -> TickReport {
    let mut report = TickReport::new(fighter.id);
    if fighter.is_defeated() || fighter.effects.is_empty() {
        return report;
    }

    let plan = plan_for(fighter, ctx.wet);
    let mods = ModifierSet::collect(fighter.effects.as_slice(), &plan);

    let periodic: Vec<(EffectKind, u32)> = fighter
        .effects
        .as_slice()
        .iter()
        .filter(|i| i.kind.spec().per_tick > 0)
        .map(|i| (i.kind, plan.scaled(i.kind, i.kind.spec().per_tick * i.stacks)))
        .collect();

    for (kind, amount) in periodic {
        if kind.heals_over_time() {
            let healed = fighter.heal(mods.healing(amount));
            fighter.totals.healing_done = fighter.totals.healing_done.saturating_add(healed);
            report.healing += healed;
            report.entries.push(TickEntry {
                kind,
                amount: healed,
            });
        } else {
            let lost = fighter.apply_damage(amount);
            report.damage += lost;
            report.entries.push(TickEntry { kind, amount: lost });
            if fighter.is_defeated() {
                report.defeated = true;
                trace!(fighter = %fighter.id, %kind, "defeated by damage over time");
                return report;
            }
        }
    }

    for kind in plan.dispelled() {
        if fighter.effects.remove(*kind).is_some() {
            report.dispelled.push(*kind);
        }
    }

    for instance in &mut fighter.effects.instances {
        if !std::mem::take(&mut instance.fresh) {
            instance.remaining = instance.remaining.saturating_sub(1);
        }
    }
    fighter.effects.instances.retain(|i| {
        if i.remaining == 0 {
            report.expired.push(i.kind);
            false
        } else {
            true
        }
    });

    trace!(
        fighter = %fighter.id,
        damage = report.damage,
        healing = report.healing,
        expired = report.expired.len(),
        "effects ticked"
    );
    report
}

// =============================================================================
// Queries
// =============================================================================

/// Aggregated modifiers of the fighter's active effects.
#[must_use]
pub fn modifiers(fighter: &Fighter) -> ModifierSet {
    ModifierSet::collect(fighter.effects.as_slice(), &plan_for(fighter, false))
}

/// Effect that prevents any action, if one is active.
#[must_use]
pub fn incapacitating_effect(fighter: &Fighter) -> Option<EffectKind> {
    fighter
        .effects
        .contains(EffectKind::Stun)
        .then_some(EffectKind::Stun)
}

/// True if the fighter is alive and not stunned.
#[must_use]
pub fn can_act(fighter: &Fighter) -> bool {
    fighter.is_alive() && incapacitating_effect(fighter).is_none()
}

/// True if the fighter can act and is not silenced.
#[must_use]
pub fn can_use_skills(fighter: &Fighter) -> bool {
    can_act(fighter) && !fighter.effects.contains(EffectKind::Silence)
}

/// Movement points available this round.
///
/// `base` plus the class bonus plus Haste/Slow, never negative, halved
/// (rounding down) while Frozen. Zero when the fighter cannot act.
#[must_use]
pub fn movement_budget(fighter: &Fighter, base: u32) -> u32 {
    if !can_act(fighter) {
        return 0;
    }
    let bonus = fighter.profile().movement_bonus + modifiers(fighter).movement;
    let budget = base.saturating_add_signed(bonus);
    if fighter.effects.contains(EffectKind::Frozen) {
        budget / 2
    } else {
        budget
    }
}

/// Checks every instance against its stack cap.
///
/// # Errors
///
/// [`InvariantViolation::StackCapExceeded`] for the first offender.
pub fn check_stack_caps(fighter: &Fighter) -> Result<(), InvariantViolation> {
    match fighter
        .effects
        .as_slice()
        .iter()
        .find(|i| i.stacks == 0 || i.stacks > i.kind.max_stacks())
    {
        Some(i) => Err(InvariantViolation::StackCapExceeded {
            fighter: fighter.id,
            kind: i.kind,
            stacks: i.stacks,
            cap: i.kind.max_stacks(),
        }),
        None => Ok(()),
    }
}

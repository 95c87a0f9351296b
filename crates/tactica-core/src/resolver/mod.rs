//! Action validation and resolution.
//!
//! Resolution is split in two phases so that illegal input never touches the
//! state:
//!
//! 1. [`validate`] reads the state and turns an [`ActionIntent`] into a
//!    [`Plan`], or rejects it with an [`ActionError`].
//! 2. [`resolve`] validates and then carries the plan out: movement, the
//!    [`damage`] pipeline, healing, skill effects, items, the actor's combo
//!    history, and Bleed growth. Cells of fighters defeated along the way are
//!    freed before it returns.
//!
//! # Invariants
//!
//! - Nothing is mutated when an error is returned.
//! - Given the same state and intent, the result is identical: the only
//!   randomness is the critical roll drawn from the state's own RNG.

pub mod damage;

pub use damage::{DamageBreakdown, HitOutcome};

use std::collections::BTreeMap;
use tracing::{debug, trace};

use crate::battle::{ActionIntent, ActionKind, BattleState, Target};
use crate::combo::{ActionRecord, ComboBonus, ComboTracker};
use crate::effects::{self, apply_percent, percent_of, ApplyOutcome, EffectKind};
use crate::error::ActionError;
use crate::fighter::{Fighter, FighterFlags, FighterId, ItemKind, Passive, Skill, SkillName, SkillTarget};
use crate::grid::{self, GridPos};
use crate::output::{ActionResult, EffectChange, EffectRemoval, Movement};

/// Power of a basic attack, in percent.
pub const BASIC_ATTACK_POWER: u32 = 100;

/// Mana discount for Mages, in percent.
pub const ARCANE_FLOW_DISCOUNT: i32 = 20;

/// Extra healing done by Clerics, in percent.
pub const DEVOTION_BONUS: i32 = 25;

/// Share of skill damage a Necromancer heals back, in percent.
pub const LIFE_TAP_PERCENT: u32 = 20;

/// A validated intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Plan {
    /// Basic attack on a living enemy in reach.
    Attack {
        /// Defender.
        target: FighterId,
    },
    /// Defend until the end of the round.
    Defend,
    /// Cast a skill.
    Skill {
        /// The skill.
        skill: &'static Skill,
        /// Resolved target; the caster for self-targeted skills.
        target: FighterId,
        /// Mana cost after modifiers.
        cost: u32,
    },
    /// Consume an item.
    Item(ItemKind),
    /// Walk to a cell.
    Move {
        /// Destination.
        to: GridPos,
        /// Movement points the path costs.
        cost: u32,
    },
}

// =============================================================================
// Validation
// =============================================================================

/// Mana a skill costs `fighter` right now.
#[must_use]
pub fn skill_cost(fighter: &Fighter, skill: &Skill) -> u32 {
    let cost = effects::modifiers(fighter).mana_cost(skill.mana_cost);
    if fighter.passive() == Passive::ArcaneFlow {
        apply_percent(cost, -ARCANE_FLOW_DISCOUNT)
    } else {
        cost
    }
}

fn lookup(state: &BattleState, id: FighterId) -> Result<&Fighter, ActionError> {
    state.fighter(id).ok_or(ActionError::UnknownFighter(id))
}

fn fighter_target(target: Target) -> Result<FighterId, ActionError> {
    match target {
        Target::Fighter(id) => Ok(id),
        Target::None | Target::Cell(_) => Err(ActionError::InvalidTarget),
    }
}

fn living_target<'a>(
    state: &'a BattleState,
    actor: &Fighter,
    id: FighterId,
    hostile: bool,
) -> Result<&'a Fighter, ActionError> {
    let target = lookup(state, id)?;
    if (target.side != actor.side) != hostile {
        return Err(ActionError::InvalidTarget);
    }
    if target.is_defeated() {
        return Err(ActionError::TargetDefeated(id));
    }
    Ok(target)
}

fn check_reach(
    state: &BattleState,
    actor: &Fighter,
    target: &Fighter,
    range: u32,
    needs_sight: bool,
) -> Result<(), ActionError> {
    let distance = grid::distance(actor.position, target.position);
    if distance > range {
        return Err(ActionError::OutOfRange { distance, range });
    }
    if needs_sight && !state.grid().has_line_of_sight(actor.position, target.position) {
        return Err(ActionError::NoLineOfSight);
    }
    Ok(())
}

fn validate_skill(
    state: &BattleState,
    actor: &Fighter,
    index: usize,
    target: Target,
) -> Result<Plan, ActionError> {
    if !effects::can_use_skills(actor) {
        return Err(ActionError::Silenced(actor.id));
    }
    let skill = actor.skill(index)?;

    let target = match (skill.target, target) {
        (SkillTarget::Enemy, target) => living_target(state, actor, fighter_target(target)?, true)?,
        (SkillTarget::Ally, Target::None) => actor,
        (SkillTarget::Ally, Target::Fighter(id)) => living_target(state, actor, id, false)?,
        (SkillTarget::Caster, Target::None) => actor,
        (SkillTarget::Caster, Target::Fighter(id)) if id == actor.id => actor,
        (SkillTarget::Ally | SkillTarget::Caster, _) => return Err(ActionError::InvalidTarget),
    };
    check_reach(state, actor, target, skill.range, skill.is_ranged())?;

    let cost = skill_cost(actor, skill);
    if cost > actor.mana {
        return Err(ActionError::InsufficientMana {
            required: cost,
            available: actor.mana,
        });
    }
    Ok(Plan::Skill {
        skill,
        target: target.id,
        cost,
    })
}

/// Checks `intent` against `state` without modifying anything.
///
/// Checks run in order: actor exists, is alive, is not incapacitated; then
/// per action: silence, skill index, target kind and liveness, range,
/// line of sight, mana, item count, path cost.
///
/// # Errors
///
/// The first failed check as an [`ActionError`].
pub fn validate(state: &BattleState, intent: &ActionIntent) -> Result<Plan, ActionError> {
    let actor = lookup(state, intent.actor)?;
    if actor.is_defeated() {
        return Err(ActionError::ActorDefeated(actor.id));
    }
    if let Some(effect) = effects::incapacitating_effect(actor) {
        return Err(ActionError::Incapacitated {
            actor: actor.id,
            effect,
        });
    }

    match intent.kind {
        ActionKind::Attack => {
            let target = living_target(state, actor, fighter_target(intent.target)?, true)?;
            check_reach(state, actor, target, actor.weapon_range(), actor.is_ranged())?;
            Ok(Plan::Attack { target: target.id })
        }
        ActionKind::Defend => Ok(Plan::Defend),
        ActionKind::Skill(index) => validate_skill(state, actor, index, intent.target),
        ActionKind::Item(kind) => {
            match intent.target {
                Target::None => {}
                Target::Fighter(id) if id == actor.id => {}
                Target::Fighter(_) | Target::Cell(_) => return Err(ActionError::InvalidTarget),
            }
            if actor.inventory.count(kind) == 0 {
                return Err(ActionError::ItemUnavailable(kind));
            }
            Ok(Plan::Item(kind))
        }
        ActionKind::Move => {
            let Target::Cell(to) = intent.target else {
                return Err(ActionError::InvalidTarget);
            };
            let budget = effects::movement_budget(actor, state.config().base_movement);
            let cost = state.grid().plan_move(actor.position, to, budget)?;
            Ok(Plan::Move { to, cost })
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Two distinct fighters borrowed mutably at once.
fn pair_mut(
    fighters: &mut BTreeMap<FighterId, Fighter>,
    first: FighterId,
    second: FighterId,
) -> Option<(&mut Fighter, &mut Fighter)> {
    if first == second {
        return None;
    }
    let mut a = None;
    let mut b = None;
    for (id, fighter) in fighters.iter_mut() {
        if *id == first {
            a = Some(fighter);
        } else if *id == second {
            b = Some(fighter);
        }
    }
    Some((a?, b?))
}

fn fighter_mut(state: &mut BattleState, id: FighterId) -> Result<&mut Fighter, ActionError> {
    state.fighter_mut(id).ok_or(ActionError::UnknownFighter(id))
}

fn record_effect(result: &mut ActionResult, target: FighterId, kind: EffectKind, outcome: ApplyOutcome) {
    result.effects_applied.push(EffectChange {
        target,
        kind,
        outcome,
    });
    if let ApplyOutcome::Dispelled { partner } = outcome {
        result.effects_removed.push(EffectRemoval {
            target,
            kind: partner,
        });
    }
}

/// Heals `patient` by `amount` after its healing modifiers and credits `healer`.
fn mend(state: &mut BattleState, healer: FighterId, patient: FighterId, amount: u32) -> u32 {
    let Some(target) = state.fighter_mut(patient) else {
        return 0;
    };
    let amount = effects::modifiers(target).healing(amount);
    let healed = target.heal(amount);
    if let Some(source) = state.fighter_mut(healer) {
        source.totals.healing_done = source.totals.healing_done.saturating_add(healed);
    }
    healed
}

/// Runs the damage pipeline from `actor` onto `target`.
fn strike(
    state: &mut BattleState,
    actor: FighterId,
    target: FighterId,
    power: u32,
    result: &mut ActionResult,
) -> Result<HitOutcome, ActionError> {
    let BattleState {
        fighters,
        grid: board,
        rng,
        config,
        ..
    } = state;
    let (attacker, defender) = pair_mut(fighters, actor, target).ok_or(ActionError::InvalidTarget)?;

    attacker.facing = grid::direction(attacker.position, defender.position);
    let roll = damage::compute(attacker, defender, board, config, power, rng);
    let hit = damage::land(attacker, defender, &roll);

    result.target = Some(target);
    result.damage = roll.hit;
    result.absorbed = hit.absorbed;
    result.reflected = hit.reflected;
    result.thorns = hit.thorns;
    result.crit = roll.crit;
    result.flank = roll.flank;
    result.shatter = roll.shatter;
    if hit.shattered {
        result.effects_removed.push(EffectRemoval {
            target,
            kind: EffectKind::Frozen,
        });
    }
    if hit.shield_exhausted {
        result.effects_removed.push(EffectRemoval {
            target,
            kind: EffectKind::Shield,
        });
    }
    if hit.defender_defeated {
        result.defeated.push(target);
    }
    if hit.attacker_defeated {
        result.defeated.push(actor);
    }
    Ok(hit)
}

fn cast(
    state: &mut BattleState,
    actor: FighterId,
    skill: &'static Skill,
    target: FighterId,
    cost: u32,
    result: &mut ActionResult,
) -> Result<(), ActionError> {
    result.skill = Some(SkillName::of(skill));
    result.target = Some(target);

    if skill.deals_damage() {
        let hit = strike(state, actor, target, skill.power_percent, result)?;
        let caster = fighter_mut(state, actor)?;
        if caster.passive() == Passive::LifeTap {
            let healed = caster.heal(percent_of(hit.health_lost, LIFE_TAP_PERCENT));
            caster.totals.healing_done = caster.totals.healing_done.saturating_add(healed);
            result.healing += healed;
        }
    }

    let caster = fighter_mut(state, actor)?;
    caster.spend_mana(cost)?;
    result.mana_spent = cost;

    if skill.heal > 0 {
        let amount = if caster.passive() == Passive::Devotion {
            apply_percent(skill.heal, DEVOTION_BONUS)
        } else {
            skill.heal
        };
        result.healing += mend(state, actor, target, amount);
    }

    for effect in skill.effects {
        let bearer = fighter_mut(state, target)?;
        let outcome = effects::apply(bearer, effect.kind, effect.duration, effect.stacks);
        record_effect(result, target, effect.kind, outcome);
    }
    Ok(())
}

fn use_item(
    state: &mut BattleState,
    actor: FighterId,
    kind: ItemKind,
    result: &mut ActionResult,
) -> Result<(), ActionError> {
    let user = fighter_mut(state, actor)?;
    if !user.inventory.take(kind) {
        return Err(ActionError::ItemUnavailable(kind));
    }
    result.target = Some(actor);

    match kind {
        ItemKind::HealthPotion => {
            result.healing += mend(state, actor, actor, ItemKind::HEALTH_POTION_HEAL);
        }
        ItemKind::ManaPotion => {
            result.mana_restored = user.restore_mana(ItemKind::MANA_POTION_RESTORE);
            let outcome = effects::apply(user, EffectKind::Clarity, ItemKind::MANA_POTION_CLARITY, 1);
            record_effect(result, actor, EffectKind::Clarity, outcome);
        }
        ItemKind::Antidote => {
            for removed in effects::cleanse_damage_over_time(user) {
                result.effects_removed.push(EffectRemoval {
                    target: actor,
                    kind: removed,
                });
            }
        }
    }
    Ok(())
}

fn walk(
    state: &mut BattleState,
    actor: FighterId,
    to: GridPos,
    cost: u32,
    result: &mut ActionResult,
) -> Result<(), ActionError> {
    let from = lookup(state, actor)?.position;
    let spent = state.grid.move_occupant(from, to, cost)?;
    let mover = fighter_mut(state, actor)?;
    if from != to {
        mover.facing = grid::direction(from, to);
    }
    mover.position = to;
    result.movement = Some(Movement {
        from,
        to,
        cost: spent,
    });
    Ok(())
}

/// Flat combo damage straight to the target's health.
fn bonus_damage(state: &mut BattleState, actor: FighterId, amount: u32, result: &mut ActionResult) {
    let Some(target) = result.target else {
        return;
    };
    let Some((attacker, defender)) = pair_mut(&mut state.fighters, actor, target) else {
        return;
    };
    if defender.is_defeated() || defender.side == attacker.side {
        return;
    }
    let lost = defender.apply_damage(amount);
    attacker.totals.damage_dealt = attacker.totals.damage_dealt.saturating_add(lost);
    result.combo_damage = lost;
    if defender.is_defeated() {
        result.defeated.push(target);
    }
}

fn advance_combo(
    state: &mut BattleState,
    actor: FighterId,
    record: ActionRecord,
    tracker: &ComboTracker,
    result: &mut ActionResult,
) {
    let Some(fighter) = state.fighter_mut(actor) else {
        return;
    };
    if fighter.is_defeated() {
        return;
    }
    fighter.history.record(record);
    let evaluation = tracker.evaluate(&mut fighter.history);
    result.combo_progress = evaluation.progress;
    let Some(triggered) = evaluation.triggered else {
        return;
    };

    fighter.totals.combos_triggered = fighter.totals.combos_triggered.saturating_add(1);
    debug!(fighter = %actor, combo = %triggered.combo, "combo triggered");
    match triggered.bonus {
        ComboBonus::BonusDamage(amount) => bonus_damage(state, actor, amount, result),
        ComboBonus::Heal(amount) => result.healing += mend(state, actor, actor, amount),
        ComboBonus::ApplyEffect { kind, duration } => {
            let outcome = effects::apply(fighter, kind, duration, 1);
            record_effect(result, actor, kind, outcome);
        }
    }
    result.combo = Some(triggered);
}

/// Validates `intent` and applies it to `state`.
///
/// # Errors
///
/// The [`ActionError`] from [`validate`]; `state` is then unchanged.
pub fn resolve(
    state: &mut BattleState,
    intent: &ActionIntent,
    tracker: &ComboTracker,
) -> Result<ActionResult, ActionError> {
    let plan = validate(state, intent)?;
    let actor = intent.actor;
    let mut result = ActionResult::new(actor, intent.kind);

    let record = match plan {
        Plan::Attack { target } => {
            strike(state, actor, target, BASIC_ATTACK_POWER, &mut result)?;
            Some(ActionRecord::Attack)
        }
        Plan::Defend => {
            fighter_mut(state, actor)?
                .flags
                .insert(FighterFlags::DEFENDING);
            Some(ActionRecord::Defend)
        }
        Plan::Skill {
            skill,
            target,
            cost,
        } => {
            cast(state, actor, skill, target, cost, &mut result)?;
            Some(ActionRecord::Skill(SkillName::of(skill)))
        }
        Plan::Item(kind) => {
            use_item(state, actor, kind, &mut result)?;
            Some(ActionRecord::Item)
        }
        Plan::Move { to, cost } => {
            walk(state, actor, to, cost, &mut result)?;
            None
        }
    };

    if let Some(record) = record {
        advance_combo(state, actor, record, tracker, &mut result);
    }
    if let Some(fighter) = state.fighter_mut(actor) {
        if effects::grow_bleed(fighter) {
            trace!(fighter = %actor, stacks = fighter.effects.stacks(EffectKind::Bleed), "bleed worsened");
        }
    }
    state.clear_defeated();

    debug!(
        actor = %actor,
        action = %intent.kind,
        damage = result.damage,
        healing = result.healing,
        defeated = result.defeated.len(),
        "action resolved"
    );
    Ok(result)
}

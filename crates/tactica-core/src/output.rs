//! Resolver outputs.
//!
//! These are the only channel through which collaborators (combat log, HUD,
//! reward screens) observe what happened:
//!
//! - [`ActionResult`]: one per resolved (or fizzled) intent.
//! - [`TickReport`]: one per living fighter per round, from effect ticking.
//! - [`RoundReport`]: everything above for one round, plus the outcome when
//!   the round ended the battle.
//! - [`BattleOutcome`]: winner, rounds elapsed, per-fighter final stats.
//!
//! All outputs serialize with serde so they can be shipped to a renderer or
//! stored verbatim.

use serde::{Deserialize, Serialize};

use crate::battle::ActionKind;
use crate::combo::{ComboProgress, ComboTriggered};
use crate::effects::{ApplyOutcome, EffectKind};
use crate::error::ActionError;
use crate::fighter::{Fighter, FighterClass, FighterId, Side, SkillName};
use crate::grid::GridPos;

// =============================================================================
// Action results
// =============================================================================

/// An effect application attempted during an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectChange {
    /// Fighter the effect was aimed at.
    pub target: FighterId,
    /// Effect kind.
    pub kind: EffectKind,
    /// What the engine did with it.
    pub outcome: ApplyOutcome,
}

/// An effect removed during an action (shatter, exhausted shield, cleanse).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectRemoval {
    /// Fighter that lost the effect.
    pub target: FighterId,
    /// Effect kind.
    pub kind: EffectKind,
}

/// A completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    /// Start cell.
    pub from: GridPos,
    /// End cell.
    pub to: GridPos,
    /// Movement points spent.
    pub cost: u32,
}

/// Outcome of one intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    /// Acting fighter.
    pub actor: FighterId,
    /// What was attempted.
    pub action: ActionKind,
    /// Fighter targeted, if any.
    pub target: Option<FighterId>,
    /// Skill used, if any.
    pub skill: Option<SkillName>,
    /// Size of the hit after every modifier, before Shield absorption.
    pub damage: u32,
    /// Part of the hit soaked up by Shield.
    pub absorbed: u32,
    /// Healing applied by the action or its combo.
    pub healing: u32,
    /// Damage returned to the actor by Reflect.
    pub reflected: u32,
    /// Damage returned to the actor by Thorns.
    pub thorns: u32,
    /// Extra damage from a completed combo.
    pub combo_damage: u32,
    /// Mana paid for a skill.
    pub mana_spent: u32,
    /// Mana restored by an item.
    pub mana_restored: u32,
    /// Set for move actions.
    pub movement: Option<Movement>,
    /// Effect applications, in the order they were attempted.
    pub effects_applied: Vec<EffectChange>,
    /// Effects removed.
    pub effects_removed: Vec<EffectRemoval>,
    /// The hit was critical.
    pub crit: bool,
    /// The hit came from a flank.
    pub flank: bool,
    /// The hit shattered a Frozen target.
    pub shatter: bool,
    /// Fighters defeated by this action (target, and actor via Reflect/Thorns).
    pub defeated: Vec<FighterId>,
    /// Combo completed by this action.
    pub combo: Option<ComboTriggered>,
    /// Combo progress of the actor after this action.
    pub combo_progress: Vec<ComboProgress>,
    /// Set when the intent went stale and did nothing.
    pub fizzled: Option<ActionError>,
}

impl ActionResult {
    /// Empty result for `actor` performing `action`.
    #[must_use]
    pub fn new(actor: FighterId, action: ActionKind) -> Self {
        Self {
            actor,
            action,
            target: None,
            skill: None,
            damage: 0,
            absorbed: 0,
            healing: 0,
            reflected: 0,
            thorns: 0,
            combo_damage: 0,
            mana_spent: 0,
            mana_restored: 0,
            movement: None,
            effects_applied: Vec::new(),
            effects_removed: Vec::new(),
            crit: false,
            flank: false,
            shatter: false,
            defeated: Vec::new(),
            combo: None,
            combo_progress: Vec::new(),
            fizzled: None,
        }
    }

    /// Result of an intent that failed revalidation at its turn.
    #[must_use]
    pub fn fizzled(actor: FighterId, action: ActionKind, reason: ActionError) -> Self {
        Self {
            fizzled: Some(reason),
            ..Self::new(actor, action)
        }
    }

    /// True if the intent did nothing.
    #[must_use]
    pub fn is_fizzled(&self) -> bool {
        self.fizzled.is_some()
    }

    /// True if the action defeated its target.
    #[must_use]
    pub fn target_defeated(&self) -> bool {
        self.target.is_some_and(|t| self.defeated.contains(&t))
    }

    /// Health the target actually lost from the main hit.
    #[must_use]
    pub fn health_damage(&self) -> u32 {
        self.damage - self.absorbed
    }
}

// =============================================================================
// Ticks
// =============================================================================

/// Damage or healing from one effect during a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickEntry {
    /// Effect kind.
    pub kind: EffectKind,
    /// Health lost (DOT) or restored (HOT).
    pub amount: u32,
}

/// What effect ticking did to one fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Ticked fighter.
    pub fighter: FighterId,
    /// Total DOT damage.
    pub damage: u32,
    /// Total HOT healing.
    pub healing: u32,
    /// Per-effect breakdown in canonical order.
    pub entries: Vec<TickEntry>,
    /// Effects removed by interactions.
    pub dispelled: Vec<EffectKind>,
    /// Effects that ran out.
    pub expired: Vec<EffectKind>,
    /// The fighter was defeated by DOT damage.
    pub defeated: bool,
}

impl TickReport {
    /// Empty report for `fighter`.
    #[must_use]
    pub fn new(fighter: FighterId) -> Self {
        Self {
            fighter,
            damage: 0,
            healing: 0,
            entries: Vec::new(),
            dispelled: Vec::new(),
            expired: Vec::new(),
            defeated: false,
        }
    }
}

// =============================================================================
// Rounds and outcome
// =============================================================================

/// Everything that happened in one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundReport {
    /// Round number, starting at 1.
    pub round: u32,
    /// Resolution order of the submitted intents.
    pub order: Vec<FighterId>,
    /// One result per intent, in resolution order.
    pub results: Vec<ActionResult>,
    /// One report per fighter alive when ticking started, in id order.
    pub ticks: Vec<TickReport>,
    /// Set when this round ended the battle.
    pub outcome: Option<BattleOutcome>,
}

/// Final numbers for one fighter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FighterFinalStats {
    /// Fighter id.
    pub id: FighterId,
    /// Display name.
    pub name: String,
    /// Class.
    pub class: FighterClass,
    /// Team.
    pub side: Side,
    /// Health at the end.
    pub health: u32,
    /// Maximum health.
    pub max_health: u32,
    /// Mana at the end.
    pub mana: u32,
    /// Defeated at the end.
    pub defeated: bool,
    /// Health removed from opponents.
    pub damage_dealt: u32,
    /// Health lost.
    pub damage_taken: u32,
    /// Healing done.
    pub healing_done: u32,
    /// Combos completed.
    pub combos_triggered: u32,
}

impl From<&Fighter> for FighterFinalStats {
    fn from(f: &Fighter) -> Self {
        Self {
            id: f.id,
            name: f.name.clone(),
            class: f.class,
            side: f.side,
            health: f.health,
            max_health: f.max_health,
            mana: f.mana,
            defeated: f.is_defeated(),
            damage_dealt: f.totals.damage_dealt,
            damage_taken: f.totals.damage_taken,
            healing_done: f.totals.healing_done,
            combos_triggered: f.totals.combos_triggered,
        }
    }
}

/// How a battle ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOutcome {
    /// Winning side; `None` for a draw.
    pub winner: Option<Side>,
    /// Rounds resolved.
    pub rounds: u32,
    /// Every fighter, in id order.
    pub fighters: Vec<FighterFinalStats>,
}

impl BattleOutcome {
    /// True if nobody won.
    #[must_use]
    pub fn is_draw(&self) -> bool {
        self.winner.is_none()
    }

    /// Final stats of one fighter.
    #[must_use]
    pub fn fighter(&self, id: FighterId) -> Option<&FighterFinalStats> {
        self.fighters.iter().find(|f| f.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fizzled_result_carries_reason_only() {
        let result = ActionResult::fizzled(
            FighterId::new(1),
            ActionKind::Attack,
            ActionError::TargetDefeated(FighterId::new(2)),
        );
        assert!(result.is_fizzled());
        assert_eq!(result.damage, 0);
        assert!(result.defeated.is_empty());
    }

    #[test]
    fn target_defeated_checks_the_target() {
        let mut result = ActionResult::new(FighterId::new(1), ActionKind::Attack);
        result.target = Some(FighterId::new(2));
        result.defeated.push(FighterId::new(1));
        assert!(!result.target_defeated());
        result.defeated.push(FighterId::new(2));
        assert!(result.target_defeated());
    }

    #[test]
    fn results_serialize_for_renderers() {
        let mut result = ActionResult::new(FighterId::new(4), ActionKind::Skill(0));
        result.damage = 42;
        result.crit = true;
        let json = serde_json::to_string(&result).unwrap();
        let back: ActionResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, result);
    }
}

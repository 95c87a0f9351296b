//! Combo tracking.
//!
//! Each fighter carries an [`ActionHistory`]: a ring buffer of its most recent
//! resolved actions (moves excluded), as long as the longest combo. After every
//! action the [`ComboTracker`] matches the tail of that history against the
//! combo table.
//!
//! # Matching
//!
//! For every definition the tracker finds the longest prefix of its steps that
//! equals the last actions in the history. A prefix as long as the definition
//! is a completed combo; anything shorter is progress, reported together with
//! the next step needed.
//!
//! When a combo completes, the matched actions are cleared from the history so
//! the same actions can never trigger twice. If more than one combo completes
//! on the same action the longest wins; ties go to table order.
//!
//! # Example
//!
//! ```
//! use tactica_core::combo::{ActionHistory, ActionRecord, ComboTracker};
//!
//! let tracker = ComboTracker::default();
//! let mut history = ActionHistory::default();
//!
//! history.record(ActionRecord::defend());
//! let first = tracker.evaluate(&mut history);
//! assert!(first.triggered.is_none());
//!
//! history.record(ActionRecord::attack());
//! let second = tracker.evaluate(&mut history);
//! assert_eq!(second.triggered.unwrap().combo, "Riposte");
//! assert!(history.is_empty());
//! ```

mod table;

pub use table::{ComboBonus, ComboDefinition, STANDARD_COMBOS};

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

use crate::fighter::SkillName;

// =============================================================================
// Steps and history
// =============================================================================

/// One step of a combo definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComboStep {
    /// A basic attack.
    Attack,
    /// A Defend action.
    Defend,
    /// Any skill.
    AnySkill,
    /// One particular skill.
    Skill(SkillName),
    /// Any consumable.
    Item,
}

impl ComboStep {
    /// True if `record` satisfies this step.
    #[must_use]
    pub fn matches(&self, record: &ActionRecord) -> bool {
        match (self, record) {
            (Self::Attack, ActionRecord::Attack)
            | (Self::Defend, ActionRecord::Defend)
            | (Self::Item, ActionRecord::Item)
            | (Self::AnySkill, ActionRecord::Skill(_)) => true,
            (Self::Skill(wanted), ActionRecord::Skill(used)) => wanted == used,
            _ => false,
        }
    }
}

impl fmt::Display for ComboStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => f.write_str("attack"),
            Self::Defend => f.write_str("defend"),
            Self::AnySkill => f.write_str("any skill"),
            Self::Skill(name) => write!(f, "{name}"),
            Self::Item => f.write_str("item"),
        }
    }
}

/// A resolved action as remembered for combo matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionRecord {
    /// Basic attack.
    Attack,
    /// Defend.
    Defend,
    /// A skill, by name.
    Skill(SkillName),
    /// A consumable.
    Item,
}

impl ActionRecord {
    /// Shorthand for [`ActionRecord::Attack`].
    #[must_use]
    pub const fn attack() -> Self {
        Self::Attack
    }

    /// Shorthand for [`ActionRecord::Defend`].
    #[must_use]
    pub const fn defend() -> Self {
        Self::Defend
    }
}

/// Bounded history of a fighter's recent actions, oldest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionHistory {
    records: VecDeque<ActionRecord>,
    capacity: usize,
}

impl Default for ActionHistory {
    fn default() -> Self {
        Self::with_capacity(table::longest_combo())
    }
}

impl ActionHistory {
    /// Empty history holding at most `capacity` records (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            records: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a record, dropping the oldest one when full.
    pub fn record(&mut self, record: ActionRecord) {
        if self.records.len() == self.capacity {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ActionRecord> {
        self.records.iter()
    }

    /// Number of stored records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Maximum number of records kept.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops the newest `count` records.
    pub fn clear_suffix(&mut self, count: usize) {
        let keep = self.records.len().saturating_sub(count);
        self.records.truncate(keep);
    }

    /// True if the newest records equal `steps` in order.
    fn ends_with(&self, steps: &[ComboStep]) -> bool {
        steps.len() <= self.records.len()
            && self
                .records
                .iter()
                .skip(self.records.len() - steps.len())
                .zip(steps)
                .all(|(record, step)| step.matches(record))
    }
}

// =============================================================================
// Tracker
// =============================================================================

/// Partial match of one combo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboProgress {
    /// Combo name.
    pub combo: String,
    /// Steps matched so far.
    pub matched: usize,
    /// Total steps.
    pub length: usize,
    /// Step that would advance the combo.
    pub next: ComboStep,
}

/// A completed combo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboTriggered {
    /// Combo name.
    pub combo: String,
    /// Bonus granted.
    pub bonus: ComboBonus,
}

/// Result of [`ComboTracker::evaluate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComboEvaluation {
    /// Combos partially matched after the action, in table order.
    pub progress: Vec<ComboProgress>,
    /// Combo completed by the action, if any.
    pub triggered: Option<ComboTriggered>,
}

/// Matches histories against a combo table.
#[derive(Debug, Clone)]
pub struct ComboTracker {
    definitions: &'static [ComboDefinition],
}

impl Default for ComboTracker {
    fn default() -> Self {
        Self::new(&STANDARD_COMBOS)
    }
}

impl ComboTracker {
    /// Tracker over `definitions`, evaluated in slice order.
    #[must_use]
    pub const fn new(definitions: &'static [ComboDefinition]) -> Self {
        Self { definitions }
    }

    /// The combo table.
    #[must_use]
    pub const fn definitions(&self) -> &'static [ComboDefinition] {
        self.definitions
    }

    /// Longest matched prefix length of `definition` against `history`.
    fn matched(definition: &ComboDefinition, history: &ActionHistory) -> usize {
        (1..=definition.steps.len())
            .rev()
            .find(|&len| history.ends_with(&definition.steps[..len]))
            .unwrap_or(0)
    }

    /// Current progress toward every combo, without side effects.
    #[must_use]
    pub fn progress(&self, history: &ActionHistory) -> Vec<ComboProgress> {
        self.definitions
            .iter()
            .filter_map(|def| {
                let matched = Self::matched(def, history);
                (matched > 0 && matched < def.steps.len()).then(|| ComboProgress {
                    combo: def.name.to_string(),
                    matched,
                    length: def.steps.len(),
                    next: def.steps[matched],
                })
            })
            .collect()
    }

    /// Checks the history after a new record.
    ///
    /// A completed combo is returned once and its actions are cleared from
    /// `history`; progress is computed on what remains.
    pub fn evaluate(&self, history: &mut ActionHistory) -> ComboEvaluation {
        let completed = self
            .definitions
            .iter()
            .filter(|def| !def.steps.is_empty() && history.ends_with(def.steps))
            .fold(None::<&ComboDefinition>, |best, def| match best {
                Some(b) if b.steps.len() >= def.steps.len() => Some(b),
                _ => Some(def),
            });

        let triggered = completed.map(|def| {
            history.clear_suffix(def.steps.len());
            ComboTriggered {
                combo: def.name.to_string(),
                bonus: def.bonus,
            }
        });

        ComboEvaluation {
            progress: self.progress(history),
            triggered,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::skill_by_name;

    fn skill(name: &str) -> ActionRecord {
        ActionRecord::Skill(SkillName::of(skill_by_name(name).unwrap()))
    }

    fn feed(tracker: &ComboTracker, history: &mut ActionHistory, records: &[ActionRecord]) -> Vec<ComboEvaluation> {
        records
            .iter()
            .map(|r| {
                history.record(*r);
                tracker.evaluate(history)
            })
            .collect()
    }

    mod history_tests {
        use super::*;

        #[test]
        fn capacity_is_the_longest_combo() {
            let history = ActionHistory::default();
            let longest = STANDARD_COMBOS.iter().map(|c| c.steps.len()).max().unwrap();
            assert_eq!(history.capacity(), longest);
        }

        #[test]
        fn ring_buffer_drops_oldest() {
            let mut history = ActionHistory::with_capacity(2);
            history.record(ActionRecord::Attack);
            history.record(ActionRecord::Defend);
            history.record(ActionRecord::Item);
            let kept: Vec<_> = history.iter().copied().collect();
            assert_eq!(kept, vec![ActionRecord::Defend, ActionRecord::Item]);
        }
    }

    mod matching_tests {
        use super::*;

        #[test]
        fn full_match_triggers_once_and_clears() {
            let tracker = ComboTracker::default();
            let mut history = ActionHistory::default();
            let evals = feed(
                &tracker,
                &mut history,
                &[ActionRecord::Defend, ActionRecord::Attack, ActionRecord::Attack],
            );
            assert!(evals[0].triggered.is_none());
            assert_eq!(evals[1].triggered.as_ref().unwrap().combo, "Riposte");
            assert!(evals[2].triggered.is_none());
        }

        #[test]
        fn progress_reports_next_step() {
            let tracker = ComboTracker::default();
            let mut history = ActionHistory::default();
            let evals = feed(&tracker, &mut history, &[ActionRecord::Defend, ActionRecord::Defend]);
            let second_wind = evals[1]
                .progress
                .iter()
                .find(|p| p.combo == "Second Wind")
                .unwrap();
            assert_eq!(second_wind.matched, 2);
            assert_eq!(second_wind.length, 3);
            assert_eq!(second_wind.next, ComboStep::Item);
        }

        #[test]
        fn named_skill_steps_need_that_skill() {
            let tracker = ComboTracker::default();
            let mut history = ActionHistory::default();
            let evals = feed(&tracker, &mut history, &[skill("Fireball"), skill("Fireball")]);
            assert!(evals[1].triggered.is_none());

            let mut history = ActionHistory::default();
            let evals = feed(&tracker, &mut history, &[skill("Fireball"), skill("Lightning")]);
            assert_eq!(evals[1].triggered.as_ref().unwrap().combo, "Elemental Fury");
        }

        #[test]
        fn longest_completed_combo_wins() {
            let tracker = ComboTracker::default();
            let mut history = ActionHistory::default();
            let evals = feed(
                &tracker,
                &mut history,
                &[
                    ActionRecord::Defend,
                    ActionRecord::Defend,
                    ActionRecord::Defend,
                    ActionRecord::Defend,
                    ActionRecord::Attack,
                ],
            );
            let triggered: Vec<_> = evals
                .iter()
                .filter_map(|e| e.triggered.as_ref())
                .map(|t| t.combo.as_str())
                .collect();
            assert_eq!(triggered, vec!["Patient Strike"]);
            assert!(history.is_empty());
        }

        #[test]
        fn any_skill_accepts_every_skill() {
            let tracker = ComboTracker::default();
            let mut history = ActionHistory::default();
            let evals = feed(
                &tracker,
                &mut history,
                &[skill("Heal"), skill("Blessing"), skill("Heal")],
            );
            assert_eq!(evals[2].triggered.as_ref().unwrap().combo, "Arcane Surge");
        }

        #[test]
        fn six_step_combo_completes() {
            let tracker = ComboTracker::default();
            let mut history = ActionHistory::default();
            let cleave = skill("Cleave");
            let evals = feed(
                &tracker,
                &mut history,
                &[
                    ActionRecord::Attack,
                    cleave,
                    ActionRecord::Attack,
                    cleave,
                    ActionRecord::Attack,
                    cleave,
                ],
            );
            assert!(evals[..5].iter().all(|e| e.triggered.is_none()));
            assert_eq!(evals[5].triggered.as_ref().unwrap().combo, "Warlord's Cadence");
        }
    }
}

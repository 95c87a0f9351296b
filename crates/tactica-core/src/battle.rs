//! Battle state and the round state machine.
//!
//! [`BattleState`] is the complete, serializable state of one battle: roster,
//! grid, RNG, round counter, and configuration. It is owned by the caller and
//! only changes through [`BattleState::step`] (one action, pure) or through a
//! [`Battle`], which runs whole rounds:
//!
//! ```text
//! AwaitingIntents -> Validating -> Resolving -> Ticking -> CheckingVictory
//!        ^                                                      |
//!        +------------------------------------------------------+--> Terminal
//! ```
//!
//! A round is resolved on a clone of the current state and committed only if
//! every invariant still holds afterwards, the same current/next double buffer
//! used for every state transition in this crate.
//!
//! # Example
//!
//! ```
//! use tactica_core::battle::{ActionIntent, Battle};
//! use tactica_core::config::BattleSetup;
//! use tactica_core::fighter::{FighterClass, FighterId, FighterSpec, Side};
//! use tactica_core::grid::GridPos;
//!
//! let hero = FighterId::new(1);
//! let brute = FighterId::new(2);
//! let setup = BattleSetup::new(vec![
//!     FighterSpec::new(hero, "Hero", FighterClass::Warrior, Side::Player).at(GridPos::new(2, 3)),
//!     FighterSpec::new(brute, "Brute", FighterClass::Berserker, Side::Enemy).at(GridPos::new(2, 2)),
//! ]);
//!
//! let mut battle = Battle::new(&setup).unwrap();
//! battle.submit(ActionIntent::attack(hero, brute)).unwrap();
//! battle.submit(ActionIntent::defend(brute)).unwrap();
//!
//! let report = battle.resolve_round().unwrap();
//! assert_eq!(report.round, 1);
//! // Defend always resolves first.
//! assert_eq!(report.order, vec![brute, hero]);
//! ```

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, error, info, warn};

use crate::combo::ComboTracker;
use crate::config::{BattleConfig, BattleSetup};
use crate::effects::{self, TickContext};
use crate::error::{ActionError, BattleError, InvariantViolation, SetupError};
use crate::fighter::{Fighter, FighterFlags, FighterId, ItemKind, Side};
use crate::grid::{Grid, GridPos};
use crate::output::{ActionResult, BattleOutcome, FighterFinalStats, RoundReport, TickReport};
use crate::resolver;

// =============================================================================
// Intents
// =============================================================================

/// What a fighter wants to do this round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    /// Basic weapon attack on an enemy.
    Attack,
    /// Reduce incoming damage until the end of the round.
    Defend,
    /// Class skill by index into [`Fighter::skills`].
    Skill(usize),
    /// Consume an item from the inventory (self only).
    Item(ItemKind),
    /// Move to a cell.
    Move,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attack => f.write_str("attack"),
            Self::Defend => f.write_str("defend"),
            Self::Skill(index) => write!(f, "skill #{index}"),
            Self::Item(kind) => write!(f, "use {kind}"),
            Self::Move => f.write_str("move"),
        }
    }
}

/// Target of an intent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// No target; self-targeted skills and items.
    #[default]
    None,
    /// A fighter.
    Fighter(FighterId),
    /// A cell, for moves.
    Cell(GridPos),
}

impl From<FighterId> for Target {
    fn from(id: FighterId) -> Self {
        Self::Fighter(id)
    }
}

impl From<GridPos> for Target {
    fn from(pos: GridPos) -> Self {
        Self::Cell(pos)
    }
}

/// One fighter's chosen action for a round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionIntent {
    /// Acting fighter.
    pub actor: FighterId,
    /// Action.
    pub kind: ActionKind,
    /// Target.
    #[serde(default)]
    pub target: Target,
}

impl ActionIntent {
    /// Basic attack on `target`.
    #[must_use]
    pub const fn attack(actor: FighterId, target: FighterId) -> Self {
        Self {
            actor,
            kind: ActionKind::Attack,
            target: Target::Fighter(target),
        }
    }

    /// Defend.
    #[must_use]
    pub const fn defend(actor: FighterId) -> Self {
        Self {
            actor,
            kind: ActionKind::Defend,
            target: Target::None,
        }
    }

    /// Skill `index` aimed at `target`.
    #[must_use]
    pub fn skill(actor: FighterId, index: usize, target: impl Into<Target>) -> Self {
        Self {
            actor,
            kind: ActionKind::Skill(index),
            target: target.into(),
        }
    }

    /// Consume one item of `kind`.
    #[must_use]
    pub const fn item(actor: FighterId, kind: ItemKind) -> Self {
        Self {
            actor,
            kind: ActionKind::Item(kind),
            target: Target::None,
        }
    }

    /// Move to `cell`.
    #[must_use]
    pub const fn move_to(actor: FighterId, cell: GridPos) -> Self {
        Self {
            actor,
            kind: ActionKind::Move,
            target: Target::Cell(cell),
        }
    }

    /// Sort key of the round order: Defend first, then the player side, then
    /// higher speed, then lower id.
    fn order_key(&self, state: &BattleState) -> (bool, Side, Reverse<u32>, FighterId) {
        let (side, speed) = state
            .fighter(self.actor)
            .map_or((Side::Enemy, 0), |f| (f.side, f.speed));
        (
            self.kind != ActionKind::Defend,
            side,
            Reverse(speed),
            self.actor,
        )
    }
}

// =============================================================================
// State
// =============================================================================

/// Complete state of one battle.
///
/// Cloning is cheap (a handful of fighters and 25 cells) and is how both
/// [`BattleState::step`] and [`Battle::resolve_round`] stay transactional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleState {
    pub(crate) fighters: BTreeMap<FighterId, Fighter>,
    pub(crate) grid: Grid,
    pub(crate) rng: ChaCha8Rng,
    pub(crate) round: u32,
    pub(crate) config: BattleConfig,
}

impl BattleState {
    /// Builds the starting state.
    ///
    /// # Errors
    ///
    /// - [`SetupError::UnknownPreset`] / [`SetupError::InvalidLayout`] for the grid.
    /// - [`SetupError::DuplicateFighter`] for repeated ids.
    /// - [`SetupError::Placement`] for off-grid, impassable or shared cells.
    /// - [`SetupError::OneSided`] unless both sides field someone.
    pub fn new(setup: &BattleSetup) -> Result<Self, SetupError> {
        let mut grid = setup.grid.build()?;
        let mut fighters = BTreeMap::new();

        for spec in &setup.fighters {
            if fighters.contains_key(&spec.id) {
                return Err(SetupError::DuplicateFighter(spec.id));
            }
            grid.place(spec.id, spec.position)
                .map_err(|source| SetupError::Placement {
                    fighter: spec.id,
                    source,
                })?;
            fighters.insert(spec.id, Fighter::from_spec(spec));
        }

        let fielded = |side| fighters.values().any(|f: &Fighter| f.side == side);
        if !fielded(Side::Player) || !fielded(Side::Enemy) {
            return Err(SetupError::OneSided);
        }

        let state = Self {
            fighters,
            grid,
            rng: ChaCha8Rng::seed_from_u64(setup.config.seed),
            round: 0,
            config: setup.config.clone(),
        };
        state.check_invariants()?;
        debug!(
            fighters = state.fighters.len(),
            seed = state.config.seed,
            "battle state created"
        );
        Ok(state)
    }

    /// Fighter by id.
    #[must_use]
    pub fn fighter(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.get(&id)
    }

    pub(crate) fn fighter_mut(&mut self, id: FighterId) -> Option<&mut Fighter> {
        self.fighters.get_mut(&id)
    }

    /// Every fighter, defeated ones included, in id order.
    pub fn fighters(&self) -> impl Iterator<Item = &Fighter> {
        self.fighters.values()
    }

    /// Living fighters of `side`, in id order.
    pub fn living(&self, side: Side) -> impl Iterator<Item = &Fighter> {
        self.fighters
            .values()
            .filter(move |f| f.side == side && f.is_alive())
    }

    /// The grid.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    /// Rounds resolved so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Resolver parameters.
    #[must_use]
    pub fn config(&self) -> &BattleConfig {
        &self.config
    }

    /// True once at least one side has no living fighter.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        self.living(Side::Player).next().is_none() || self.living(Side::Enemy).next().is_none()
    }

    /// The only side with living fighters, if the battle is decided and not
    /// a mutual wipe.
    #[must_use]
    pub fn winner(&self) -> Option<Side> {
        let player = self.living(Side::Player).next().is_some();
        let enemy = self.living(Side::Enemy).next().is_some();
        match (player, enemy) {
            (true, false) => Some(Side::Player),
            (false, true) => Some(Side::Enemy),
            _ => None,
        }
    }

    /// Applies one intent to a copy of this state.
    ///
    /// The action is resolved exactly as inside a round (combos and Bleed
    /// growth included) but no effects tick and no round passes.
    ///
    /// # Errors
    ///
    /// The [`ActionError`] from validation; `self` is never modified.
    pub fn step(&self, intent: &ActionIntent) -> Result<(Self, ActionResult), ActionError> {
        let mut next = self.clone();
        let result = resolver::resolve(&mut next, intent, &ComboTracker::default())?;
        Ok((next, result))
    }

    /// Frees the cell of every defeated fighter still recorded on the grid.
    pub(crate) fn clear_defeated(&mut self) {
        for fighter in self.fighters.values().filter(|f| f.is_defeated()) {
            if self.grid.occupant(fighter.position) == Some(fighter.id) {
                self.grid.vacate(fighter.position);
            }
        }
    }

    /// Ticks the effects of every fighter alive at the start of the tick.
    fn tick_effects(&mut self) -> Vec<TickReport> {
        let mut reports = Vec::new();
        for fighter in self.fighters.values_mut().filter(|f| f.is_alive()) {
            let wet = self
                .grid
                .terrain(fighter.position)
                .is_ok_and(|t| t.is_wet());
            reports.push(effects::tick(fighter, TickContext { wet }));
        }
        self.clear_defeated();
        reports
    }

    /// Mana regeneration and Defend expiry.
    fn end_round(&mut self) {
        let regen = self.config.mana_regen_per_round;
        for fighter in self.fighters.values_mut() {
            fighter.flags.remove(FighterFlags::DEFENDING);
            if fighter.is_alive() {
                fighter.restore_mana(regen);
            }
        }
    }

    /// Snapshot of the result so far.
    #[must_use]
    pub fn outcome(&self, winner: Option<Side>) -> BattleOutcome {
        BattleOutcome {
            winner,
            rounds: self.round,
            fighters: self.fighters.values().map(FighterFinalStats::from).collect(),
        }
    }

    /// Checks every cross-cutting invariant.
    ///
    /// # Errors
    ///
    /// The first [`InvariantViolation`] found, in fighter id order.
    pub fn check_invariants(&self) -> Result<(), InvariantViolation> {
        let mut claimed: BTreeMap<(i32, i32), FighterId> = BTreeMap::new();
        for fighter in self.fighters.values() {
            fighter.check_invariants()?;
            let pos = fighter.position;
            let on_grid = self.grid.occupant(pos) == Some(fighter.id);
            if fighter.is_defeated() {
                if on_grid {
                    return Err(InvariantViolation::PositionDesync {
                        fighter: fighter.id,
                        position: pos,
                    });
                }
                continue;
            }
            if let Some(&occupant) = claimed.get(&(pos.x, pos.y)) {
                return Err(InvariantViolation::DoubleOccupancy {
                    cell: pos,
                    occupant,
                });
            }
            if !on_grid {
                return Err(InvariantViolation::PositionDesync {
                    fighter: fighter.id,
                    position: pos,
                });
            }
            claimed.insert((pos.x, pos.y), fighter.id);
        }
        Ok(())
    }
}

// =============================================================================
// State machine
// =============================================================================

/// Phase of the round state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    /// Collecting one intent per eligible fighter.
    AwaitingIntents,
    /// Fixing the resolution order.
    Validating,
    /// Resolving intents one by one.
    Resolving,
    /// Ticking status effects.
    Ticking,
    /// Looking for a winner or the round limit.
    CheckingVictory,
    /// Over. Absorbing.
    Terminal,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A battle driven round by round.
#[derive(Debug, Clone)]
pub struct Battle {
    state: BattleState,
    phase: Phase,
    intents: BTreeMap<FighterId, ActionIntent>,
    tracker: ComboTracker,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    /// Starts a battle from a setup.
    ///
    /// # Errors
    ///
    /// See [`BattleState::new`].
    pub fn new(setup: &BattleSetup) -> Result<Self, SetupError> {
        Ok(Self::from_state(BattleState::new(setup)?))
    }

    /// Resumes a battle from a state, e.g. one deserialized from a snapshot.
    ///
    /// A state that is already decided yields a terminal battle.
    #[must_use]
    pub fn from_state(state: BattleState) -> Self {
        let outcome = state
            .is_decided()
            .then(|| state.outcome(state.winner()));
        let phase = if outcome.is_some() {
            Phase::Terminal
        } else {
            Phase::AwaitingIntents
        };
        Self {
            state,
            phase,
            intents: BTreeMap::new(),
            tracker: ComboTracker::default(),
            outcome,
        }
    }

    /// Replaces the combo table.
    #[must_use]
    pub fn with_tracker(mut self, tracker: ComboTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// Current committed state.
    #[must_use]
    pub fn state(&self) -> &BattleState {
        &self.state
    }

    /// Current phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Final outcome once terminal. `None` also after an aborted battle.
    #[must_use]
    pub fn outcome(&self) -> Option<&BattleOutcome> {
        self.outcome.as_ref()
    }

    /// True once the battle can no longer advance.
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.phase == Phase::Terminal
    }

    /// Fighters that must submit an intent this round: alive and not
    /// incapacitated.
    #[must_use]
    pub fn eligible(&self) -> Vec<FighterId> {
        self.state
            .fighters()
            .filter(|f| effects::can_act(f))
            .map(|f| f.id)
            .collect()
    }

    /// Eligible fighters that have not submitted yet.
    #[must_use]
    pub fn pending(&self) -> Vec<FighterId> {
        self.eligible()
            .into_iter()
            .filter(|id| !self.intents.contains_key(id))
            .collect()
    }

    /// Intents submitted so far this round.
    pub fn intents(&self) -> impl Iterator<Item = &ActionIntent> {
        self.intents.values()
    }

    /// Validates `intent` against the current state and stores it.
    ///
    /// A rejected intent leaves nothing behind; the fighter may submit again.
    ///
    /// # Errors
    ///
    /// [`BattleError::BattleOver`], [`BattleError::WrongPhase`],
    /// [`BattleError::NotEligible`], [`BattleError::AlreadySubmitted`], or the
    /// validation [`ActionError`].
    pub fn submit(&mut self, intent: ActionIntent) -> Result<(), BattleError> {
        match self.phase {
            Phase::AwaitingIntents => {}
            Phase::Terminal => return Err(BattleError::BattleOver),
            other => return Err(BattleError::WrongPhase(other)),
        }
        let actor = self
            .state
            .fighter(intent.actor)
            .ok_or(ActionError::UnknownFighter(intent.actor))?;
        if !effects::can_act(actor) {
            return Err(BattleError::NotEligible(intent.actor));
        }
        if self.intents.contains_key(&intent.actor) {
            return Err(BattleError::AlreadySubmitted(intent.actor));
        }
        if let Err(reason) = resolver::validate(&self.state, &intent) {
            debug!(actor = %intent.actor, action = %intent.kind, %reason, "intent rejected");
            return Err(reason.into());
        }
        self.intents.insert(intent.actor, intent);
        Ok(())
    }

    /// Withdraws a submitted intent so a different one can be submitted.
    pub fn withdraw(&mut self, actor: FighterId) -> Option<ActionIntent> {
        if self.phase == Phase::AwaitingIntents {
            self.intents.remove(&actor)
        } else {
            None
        }
    }

    fn enter(&mut self, phase: Phase) {
        debug!(from = %self.phase, to = %phase, "phase");
        self.phase = phase;
    }

    /// Resolves the round once every eligible fighter has submitted.
    ///
    /// Intents resolve in order (Defend first, then the player side, then
    /// higher speed, then lower id) and are revalidated at their turn; an
    /// intent made stale by an earlier action fizzles. Effects then tick for
    /// every living fighter, mana regenerates, Defend expires, and the
    /// victory condition and round limit are checked.
    ///
    /// # Errors
    ///
    /// - [`BattleError::BattleOver`] / [`BattleError::WrongPhase`].
    /// - [`BattleError::IntentsPending`] with the missing fighters.
    /// - [`BattleError::Invariant`] if resolution broke an invariant. The
    ///   committed state is left as it was and the battle becomes terminal
    ///   without an outcome.
    pub fn resolve_round(&mut self) -> Result<RoundReport, BattleError> {
        match self.phase {
            Phase::AwaitingIntents => {}
            Phase::Terminal => return Err(BattleError::BattleOver),
            other => return Err(BattleError::WrongPhase(other)),
        }
        let pending = self.pending();
        if !pending.is_empty() {
            return Err(BattleError::IntentsPending(pending));
        }

        self.enter(Phase::Validating);
        let mut intents: Vec<ActionIntent> = self.intents.values().copied().collect();
        intents.sort_by_key(|intent| intent.order_key(&self.state));
        let order: Vec<FighterId> = intents.iter().map(|i| i.actor).collect();

        let mut next = self.state.clone();
        next.round += 1;

        self.enter(Phase::Resolving);
        let mut results = Vec::with_capacity(intents.len());
        for intent in &intents {
            let result = match resolver::resolve(&mut next, intent, &self.tracker) {
                Ok(result) => result,
                Err(reason) => {
                    debug!(actor = %intent.actor, action = %intent.kind, %reason, "intent fizzled");
                    ActionResult::fizzled(intent.actor, intent.kind, reason)
                }
            };
            results.push(result);
        }

        self.enter(Phase::Ticking);
        let ticks = next.tick_effects();
        next.end_round();

        self.enter(Phase::CheckingVictory);
        self.intents.clear();
        if let Err(violation) = next.check_invariants() {
            error!(round = next.round, %violation, "invariant violated, battle aborted");
            self.phase = Phase::Terminal;
            return Err(violation.into());
        }

        let outcome = if next.is_decided() {
            Some(next.outcome(next.winner()))
        } else if next.config.max_rounds.is_some_and(|max| next.round >= max) {
            warn!(round = next.round, "round limit reached, battle drawn");
            Some(next.outcome(None))
        } else {
            None
        };

        std::mem::swap(&mut self.state, &mut next);
        let round = self.state.round;

        if let Some(outcome) = &outcome {
            info!(round, winner = ?outcome.winner, "battle over");
            self.enter(Phase::Terminal);
        } else {
            self.enter(Phase::AwaitingIntents);
        }
        self.outcome.clone_from(&outcome);

        debug!(
            round,
            actions = results.len(),
            fizzled = results.iter().filter(|r| r.is_fizzled()).count(),
            "round resolved"
        );
        Ok(RoundReport {
            round,
            order,
            results,
            ticks,
            outcome,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GridSpec;
    use crate::effects::{apply, EffectKind};
    use crate::fighter::{FighterClass, FighterSpec};

    fn open_grid() -> GridSpec {
        GridSpec::Layout(vec![".....".to_string(); 5])
    }

    fn spec(id: u32, class: FighterClass, side: Side, x: i32, y: i32) -> FighterSpec {
        FighterSpec::new(FighterId::new(id), format!("F{id}"), class, side).at(GridPos::new(x, y))
    }

    fn duel_setup() -> BattleSetup {
        BattleSetup::new(vec![
            spec(1, FighterClass::Warrior, Side::Player, 2, 3),
            spec(2, FighterClass::Rogue, Side::Enemy, 2, 2),
        ])
        .with_grid(open_grid())
    }

    fn id(n: u32) -> FighterId {
        FighterId::new(n)
    }

    mod setup_tests {
        use super::*;

        #[test]
        fn one_sided_roster_is_rejected() {
            let setup = BattleSetup::new(vec![spec(1, FighterClass::Mage, Side::Player, 0, 0)]);
            assert!(matches!(
                BattleState::new(&setup),
                Err(SetupError::OneSided)
            ));
        }

        #[test]
        fn duplicate_ids_are_rejected() {
            let setup = BattleSetup::new(vec![
                spec(1, FighterClass::Mage, Side::Player, 0, 0),
                spec(1, FighterClass::Monk, Side::Enemy, 4, 4),
            ]);
            assert!(matches!(
                BattleState::new(&setup),
                Err(SetupError::DuplicateFighter(_))
            ));
        }

        #[test]
        fn shared_start_cells_are_rejected() {
            let setup = BattleSetup::new(vec![
                spec(1, FighterClass::Mage, Side::Player, 0, 0),
                spec(2, FighterClass::Monk, Side::Enemy, 0, 0),
            ]);
            assert!(matches!(
                BattleState::new(&setup),
                Err(SetupError::Placement { .. })
            ));
        }

        #[test]
        fn walls_cannot_be_start_cells() {
            let setup = BattleSetup::new(vec![
                spec(1, FighterClass::Mage, Side::Player, 0, 1),
                spec(2, FighterClass::Monk, Side::Enemy, 4, 4),
            ])
            .with_grid(GridSpec::Preset("Mountain Pass".into()));
            assert!(matches!(
                BattleState::new(&setup),
                Err(SetupError::Placement { .. })
            ));
        }

        #[test]
        fn fresh_state_is_consistent() {
            let state = BattleState::new(&duel_setup()).unwrap();
            assert!(state.check_invariants().is_ok());
            assert_eq!(state.round(), 0);
            assert_eq!(state.grid().occupant(GridPos::new(2, 3)), Some(id(1)));
            assert!(!state.is_decided());
        }

        #[test]
        fn desynced_positions_are_violations() {
            let mut state = BattleState::new(&duel_setup()).unwrap();
            state.fighter_mut(id(1)).unwrap().position = GridPos::new(0, 0);
            assert!(matches!(
                state.check_invariants(),
                Err(InvariantViolation::PositionDesync { .. })
            ));
        }

        #[test]
        fn state_round_trips_through_json() {
            let state = BattleState::new(&duel_setup()).unwrap();
            let json = serde_json::to_string(&state).unwrap();
            let back: BattleState = serde_json::from_str(&json).unwrap();
            assert_eq!(serde_json::to_string(&back).unwrap(), json);
        }
    }

    mod step_tests {
        use super::*;

        #[test]
        fn step_leaves_the_input_untouched() {
            let state = BattleState::new(&duel_setup()).unwrap();
            let before = serde_json::to_string(&state).unwrap();
            let (next, result) = state.step(&ActionIntent::attack(id(1), id(2))).unwrap();
            assert_eq!(serde_json::to_string(&state).unwrap(), before);
            assert!(result.damage > 0);
            assert!(next.fighter(id(2)).unwrap().health < state.fighter(id(2)).unwrap().health);
        }

        #[test]
        fn invalid_step_is_an_error() {
            let state = BattleState::new(&duel_setup()).unwrap();
            let err = state.step(&ActionIntent::attack(id(1), id(1))).unwrap_err();
            assert_eq!(err, ActionError::InvalidTarget);
        }
    }

    mod machine_tests {
        use super::*;

        #[test]
        fn every_eligible_fighter_must_submit() {
            let mut battle = Battle::new(&duel_setup()).unwrap();
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            assert_eq!(
                battle.resolve_round().unwrap_err(),
                BattleError::IntentsPending(vec![id(2)])
            );
            assert_eq!(battle.phase(), Phase::AwaitingIntents);
        }

        #[test]
        fn double_submission_is_refused() {
            let mut battle = Battle::new(&duel_setup()).unwrap();
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            assert_eq!(
                battle.submit(ActionIntent::attack(id(1), id(2))),
                Err(BattleError::AlreadySubmitted(id(1)))
            );
            battle.withdraw(id(1));
            assert!(battle.submit(ActionIntent::attack(id(1), id(2))).is_ok());
        }

        #[test]
        fn invalid_intents_are_rejected_at_submit() {
            let mut battle = Battle::new(&duel_setup()).unwrap();
            let far = ActionIntent::move_to(id(1), GridPos::new(0, 0));
            assert!(matches!(
                battle.submit(far),
                Err(BattleError::Action(ActionError::Grid(_)))
            ));
            assert!(battle.pending().contains(&id(1)));
        }

        #[test]
        fn stunned_fighters_sit_the_round_out() {
            let mut state = BattleState::new(&duel_setup()).unwrap();
            apply(state.fighter_mut(id(2)).unwrap(), EffectKind::Stun, 1, 1);
            let mut battle = Battle::from_state(state);
            assert_eq!(battle.eligible(), vec![id(1)]);
            assert_eq!(
                battle.submit(ActionIntent::defend(id(2))),
                Err(BattleError::NotEligible(id(2)))
            );
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            battle.resolve_round().unwrap();
            // The first tick after a stun lands leaves its duration alone.
            assert_eq!(battle.eligible(), vec![id(1)]);
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            let report = battle.resolve_round().unwrap();
            let tick = report.ticks.iter().find(|t| t.fighter == id(2)).unwrap();
            assert_eq!(tick.expired, vec![EffectKind::Stun]);
            assert_eq!(battle.eligible(), vec![id(1), id(2)]);
        }

        #[test]
        fn order_is_defend_then_player_then_speed_then_id() {
            let setup = BattleSetup::new(vec![
                spec(1, FighterClass::Warrior, Side::Player, 0, 4),
                spec(2, FighterClass::Knight, Side::Player, 1, 4),
                spec(3, FighterClass::Rogue, Side::Enemy, 0, 0),
                spec(4, FighterClass::Monk, Side::Enemy, 1, 0),
            ])
            .with_grid(open_grid());
            let mut state = BattleState::new(&setup).unwrap();
            state.fighter_mut(id(2)).unwrap().speed = 20;
            let mut battle = Battle::from_state(state);

            battle.submit(ActionIntent::move_to(id(1), GridPos::new(0, 3))).unwrap();
            battle.submit(ActionIntent::move_to(id(2), GridPos::new(1, 3))).unwrap();
            battle.submit(ActionIntent::move_to(id(3), GridPos::new(0, 1))).unwrap();
            battle.submit(ActionIntent::defend(id(4))).unwrap();

            let report = battle.resolve_round().unwrap();
            assert_eq!(report.order, vec![id(4), id(2), id(1), id(3)]);
        }

        #[test]
        fn defend_is_cleared_at_round_end() {
            let mut battle = Battle::new(&duel_setup()).unwrap();
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            battle.submit(ActionIntent::defend(id(2))).unwrap();
            battle.resolve_round().unwrap();
            assert!(battle.state().fighters().all(|f| !f.is_defending()));
        }

        #[test]
        fn stale_intents_fizzle_without_effect() {
            let mut state = BattleState::new(&duel_setup()).unwrap();
            // The rogue will die to the first swing.
            state.fighter_mut(id(2)).unwrap().health = 1;
            let setup_extra = spec(3, FighterClass::Archer, Side::Player, 4, 4);
            let archer = Fighter::from_spec(&setup_extra);
            state.grid.place(archer.id, archer.position).unwrap();
            state.fighters.insert(archer.id, archer);
            state.fighter_mut(id(3)).unwrap().speed = 1;

            let mut battle = Battle::from_state(state);
            battle.submit(ActionIntent::attack(id(1), id(2))).unwrap();
            battle.submit(ActionIntent::attack(id(3), id(2))).unwrap();
            battle.submit(ActionIntent::defend(id(2))).unwrap();
            let report = battle.resolve_round().unwrap();

            let archer_result = report.results.iter().find(|r| r.actor == id(3)).unwrap();
            assert_eq!(
                archer_result.fizzled,
                Some(ActionError::TargetDefeated(id(2)))
            );
            assert_eq!(archer_result.damage, 0);
            assert_eq!(battle.outcome().unwrap().winner, Some(Side::Player));
            assert_eq!(battle.phase(), Phase::Terminal);
            assert_eq!(battle.state().grid().occupant(GridPos::new(2, 2)), None);
        }

        #[test]
        fn terminal_is_absorbing() {
            let mut state = BattleState::new(&duel_setup()).unwrap();
            state.fighter_mut(id(2)).unwrap().health = 1;
            let mut battle = Battle::from_state(state);
            battle.submit(ActionIntent::attack(id(1), id(2))).unwrap();
            battle.submit(ActionIntent::defend(id(2))).unwrap();
            battle.resolve_round().unwrap();
            assert!(battle.is_over());
            assert_eq!(
                battle.submit(ActionIntent::defend(id(1))),
                Err(BattleError::BattleOver)
            );
            assert_eq!(battle.resolve_round().unwrap_err(), BattleError::BattleOver);
        }

        #[test]
        fn round_limit_ends_in_a_draw() {
            let setup = duel_setup().with_config(BattleConfig {
                max_rounds: Some(2),
                ..BattleConfig::default()
            });
            let mut battle = Battle::new(&setup).unwrap();
            for _ in 0..2 {
                battle.submit(ActionIntent::defend(id(1))).unwrap();
                battle.submit(ActionIntent::defend(id(2))).unwrap();
                battle.resolve_round().unwrap();
            }
            let outcome = battle.outcome().unwrap();
            assert!(outcome.is_draw());
            assert_eq!(outcome.rounds, 2);
        }

        #[test]
        fn mana_regenerates_each_round() {
            let mut state = BattleState::new(&duel_setup()).unwrap();
            state.fighter_mut(id(1)).unwrap().mana = 0;
            let mut battle = Battle::from_state(state);
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            battle.submit(ActionIntent::defend(id(2))).unwrap();
            battle.resolve_round().unwrap();
            assert_eq!(battle.state().fighter(id(1)).unwrap().mana, 5);
        }

        #[test]
        fn invariant_violation_aborts_without_commit() {
            let mut state = BattleState::new(&duel_setup()).unwrap();
            state.fighter_mut(id(2)).unwrap().mana = 10_000;
            let before = serde_json::to_string(&state).unwrap();
            let mut battle = Battle::from_state(state);
            battle.submit(ActionIntent::defend(id(1))).unwrap();
            battle.submit(ActionIntent::defend(id(2))).unwrap();

            let err = battle.resolve_round().unwrap_err();
            assert!(matches!(
                err,
                BattleError::Invariant(InvariantViolation::ManaOutOfRange { .. })
            ));
            assert!(battle.is_over());
            assert!(battle.outcome().is_none());
            assert_eq!(serde_json::to_string(battle.state()).unwrap(), before);
        }
    }
}

//! Driving battles with external decision functions.
//!
//! The resolver never decides what a fighter does. Players, scripted
//! opponents, and AI policies all sit behind [`IntentSource`]; any
//! `FnMut(&BattleState, FighterId) -> ActionIntent` closure qualifies.
//! Policy tweaks such as an AI "mistake chance" are adapters around a
//! source ([`WithMistakes`]), not resolver features.
//!
//! Battles share nothing, so [`run_many`] plays a batch across the rayon
//! pool. Each battle stays single-threaded and deterministic; outcomes come
//! back in input order.
//!
//! # Example
//!
//! ```
//! use tactica_core::autoplay::run_to_completion;
//! use tactica_core::battle::{ActionIntent, Battle, BattleState};
//! use tactica_core::config::BattleSetup;
//! use tactica_core::fighter::{FighterClass, FighterId, FighterSpec, Side};
//! use tactica_core::grid::GridPos;
//!
//! let setup = BattleSetup::new(vec![
//!     FighterSpec::new(FighterId::new(1), "A", FighterClass::Berserker, Side::Player).at(GridPos::new(2, 3)),
//!     FighterSpec::new(FighterId::new(2), "B", FighterClass::Mage, Side::Enemy).at(GridPos::new(2, 2)),
//! ]);
//! let mut battle = Battle::new(&setup).unwrap();
//!
//! // Everyone swings at the only opponent.
//! let mut brawl = |_state: &BattleState, actor: FighterId| {
//!     let foe = if actor == FighterId::new(1) { 2 } else { 1 };
//!     ActionIntent::attack(actor, FighterId::new(foe))
//! };
//! let outcome = run_to_completion(&mut battle, &mut brawl).unwrap();
//! assert!(outcome.winner.is_some());
//! ```

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use tracing::debug;

use crate::battle::{ActionIntent, Battle, BattleState};
use crate::error::BattleError;
use crate::fighter::FighterId;
use crate::output::{BattleOutcome, RoundReport};

/// Chooses intents for fighters.
pub trait IntentSource {
    /// Intent for `actor` given the committed state.
    fn choose(&mut self, state: &BattleState, actor: FighterId) -> ActionIntent;
}

impl<F> IntentSource for F
where
    F: FnMut(&BattleState, FighterId) -> ActionIntent,
{
    fn choose(&mut self, state: &BattleState, actor: FighterId) -> ActionIntent {
        self(state, actor)
    }
}

/// Replaces a share of another source's choices with Defend.
///
/// Uses its own seeded RNG so the battle RNG stream is untouched.
#[derive(Debug, Clone)]
pub struct WithMistakes<S> {
    inner: S,
    chance_percent: u32,
    rng: ChaCha8Rng,
}

impl<S> WithMistakes<S> {
    /// Wraps `inner`; `chance_percent` is clamped to 100.
    #[must_use]
    pub fn new(inner: S, chance_percent: u32, seed: u64) -> Self {
        Self {
            inner,
            chance_percent: chance_percent.min(100),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<S: IntentSource> IntentSource for WithMistakes<S> {
    fn choose(&mut self, state: &BattleState, actor: FighterId) -> ActionIntent {
        let intended = self.inner.choose(state, actor);
        if self.rng.gen_range(0..100) < self.chance_percent {
            debug!(actor = %actor, "mistake: defending instead");
            ActionIntent::defend(actor)
        } else {
            intended
        }
    }
}

/// Collects one intent per pending fighter from `source` and resolves the
/// round.
///
/// A choice the battle rejects is replaced with Defend.
///
/// # Errors
///
/// Any [`BattleError`] from submitting the fallback or resolving the round.
pub fn run_round<S: IntentSource + ?Sized>(
    battle: &mut Battle,
    source: &mut S,
) -> Result<RoundReport, BattleError> {
    for actor in battle.pending() {
        let intent = ActionIntent {
            actor,
            ..source.choose(battle.state(), actor)
        };
        if let Err(reason) = battle.submit(intent) {
            debug!(actor = %actor, %reason, "choice rejected, defending instead");
            battle.submit(ActionIntent::defend(actor))?;
        }
    }
    battle.resolve_round()
}

/// Plays rounds until the battle is terminal.
///
/// With `max_rounds: None` in the config this only returns once a side is
/// wiped out.
///
/// # Errors
///
/// The first [`BattleError`] from a round.
pub fn run_to_completion<S: IntentSource + ?Sized>(
    battle: &mut Battle,
    source: &mut S,
) -> Result<BattleOutcome, BattleError> {
    while !battle.is_over() {
        run_round(battle, source)?;
    }
    battle.outcome().cloned().ok_or(BattleError::BattleOver)
}

/// Plays every battle to completion in parallel.
///
/// `source_for(i)` builds the decision function for battle `i`. Results are
/// in input order.
pub fn run_many<S, F>(battles: Vec<Battle>, source_for: F) -> Vec<Result<BattleOutcome, BattleError>>
where
    S: IntentSource,
    F: Fn(usize) -> S + Sync,
{
    battles
        .into_par_iter()
        .enumerate()
        .map(|(index, mut battle)| {
            let mut source = source_for(index);
            run_to_completion(&mut battle, &mut source)
        })
        .collect()
}

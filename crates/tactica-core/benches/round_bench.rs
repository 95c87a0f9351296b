use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tactica_core::autoplay::{run_many, run_to_completion};
use tactica_core::resolver;
use tactica_core::{
    ActionIntent, Battle, BattleConfig, BattleSetup, BattleState, FighterClass, FighterId,
    FighterSpec, GridPos, GridSpec, Side,
};

fn skirmish(seed: u64) -> BattleSetup {
    let roster = [
        (FighterClass::Knight, Side::Player, 1, 4),
        (FighterClass::Mage, Side::Player, 2, 4),
        (FighterClass::Cleric, Side::Player, 3, 4),
        (FighterClass::Berserker, Side::Enemy, 1, 0),
        (FighterClass::Archer, Side::Enemy, 2, 0),
        (FighterClass::Necromancer, Side::Enemy, 3, 0),
    ];
    let fighters = roster
        .iter()
        .zip(1..)
        .map(|(&(class, side, x, y), id)| {
            FighterSpec::new(FighterId::new(id), format!("F{id}"), class, side).at(GridPos::new(x, y))
        })
        .collect();
    BattleSetup::new(fighters)
        .with_config(BattleConfig::with_seed(seed))
        .with_grid(GridSpec::Preset("Forest Clearing".into()))
}

/// Attacks anything in reach, otherwise walks one cell toward row 2.
fn charge(state: &BattleState, actor: FighterId) -> ActionIntent {
    let Some(me) = state.fighter(actor) else {
        return ActionIntent::defend(actor);
    };
    let valid = |intent: &ActionIntent| resolver::validate(state, intent).is_ok();
    state
        .living(me.side.opposite())
        .map(|foe| ActionIntent::attack(actor, foe.id))
        .find(valid)
        .or_else(|| {
            let step = if me.position.y > 2 { -1 } else { 1 };
            Some(ActionIntent::move_to(actor, GridPos::new(me.position.x, me.position.y + step)))
                .filter(valid)
        })
        .unwrap_or(ActionIntent::defend(actor))
}

fn bench_step(c: &mut Criterion) {
    let setup = BattleSetup::new(vec![
        FighterSpec::new(FighterId::new(1), "A", FighterClass::Rogue, Side::Player).at(GridPos::new(2, 3)),
        FighterSpec::new(FighterId::new(2), "B", FighterClass::Monk, Side::Enemy).at(GridPos::new(2, 2)),
    ]);
    let state = BattleState::new(&setup).unwrap();
    let intent = ActionIntent::attack(FighterId::new(1), FighterId::new(2));

    c.bench_function("step_attack", |b| b.iter(|| black_box(state.step(black_box(&intent)))));
}

fn bench_resolve_round(c: &mut Criterion) {
    let mut template = Battle::new(&skirmish(42)).unwrap();
    for actor in template.pending() {
        let intent = charge(template.state(), actor);
        template.submit(intent).unwrap();
    }

    c.bench_function("resolve_round_3v3", |b| {
        b.iter(|| {
            let mut battle = template.clone();
            black_box(battle.resolve_round())
        })
    });
}

fn bench_full_battle(c: &mut Criterion) {
    c.bench_function("full_battle_3v3", |b| {
        b.iter(|| {
            let mut battle = Battle::new(&skirmish(black_box(7))).unwrap();
            black_box(run_to_completion(&mut battle, &mut charge))
        })
    });
}

fn bench_parallel_batch(c: &mut Criterion) {
    c.bench_function("parallel_batch_64", |b| {
        b.iter(|| {
            let battles = (0..64).map(|seed| Battle::new(&skirmish(seed)).unwrap()).collect();
            black_box(run_many(battles, |_| charge))
        })
    });
}

criterion_group!(benches, bench_step, bench_resolve_round, bench_full_battle, bench_parallel_batch);
criterion_main!(benches);

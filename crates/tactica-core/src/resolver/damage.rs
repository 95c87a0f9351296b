//! The damage pipeline.
//!
//! A hit is computed in a fixed order; changing the order changes results, so
//! every step is a separate, traced stage:
//!
//! 1. validation (done by the caller, see [`super::validate`])
//! 2. base: strength (after status modifiers) × class damage% × skill power%
//! 3. terrain: attacker cell Atk%, defender cell Def%, then half the
//!    defender's effective defense as flat mitigation (at least 1 damage)
//! 4. status: attacker damage-dealt%, then defender damage-taken%
//! 5. flanking bonus
//! 6. critical roll
//! 7. Defend reduction
//! 8. Frozen shatter, then Shield, Reflect, Thorns
//! 9. health clamp and defeat
//!
//! Steps 2 to 7 plus the shatter decision are pure ([`compute`]); step 8 onward
//! mutates the two fighters ([`land`]). All arithmetic is integer percent math
//! so results are identical on every platform.

use rand::Rng;
use tracing::trace;

use crate::config::BattleConfig;
use crate::effects::{
    self, apply_percent, percent_of, EffectKind, REFLECT_PERCENT, THORNS_PER_STACK,
};
use crate::fighter::{Fighter, Passive};
use crate::grid::{self, Grid};

/// Extra damage percent for a Berserker below half health.
pub const BLOODLUST_BONUS: i32 = 25;

/// Defend reduction for Warriors.
pub const BULWARK_REDUCTION: u32 = 75;

/// Intermediate values of one hit, kept for tracing and tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DamageBreakdown {
    /// Step 2.
    pub base: u32,
    /// After step 3.
    pub after_terrain: u32,
    /// After step 4.
    pub after_status: u32,
    /// After step 5.
    pub after_flank: u32,
    /// After step 6.
    pub after_crit: u32,
    /// After step 7.
    pub after_defend: u32,
    /// Final hit size, including any shatter bonus.
    pub hit: u32,
    /// Flanking applied.
    pub flank: bool,
    /// Critical hit.
    pub crit: bool,
    /// Frozen will shatter.
    pub shatter: bool,
}

/// Changes made when a hit lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HitOutcome {
    /// Soaked by Shield.
    pub absorbed: u32,
    /// Health the defender lost.
    pub health_lost: u32,
    /// Returned to the attacker by Reflect (health actually lost).
    pub reflected: u32,
    /// Returned to the attacker by Thorns (health actually lost).
    pub thorns: u32,
    /// Frozen was removed by the hit.
    pub shattered: bool,
    /// Shield ran out and was removed.
    pub shield_exhausted: bool,
    /// The defender reached zero health.
    pub defender_defeated: bool,
    /// The attacker reached zero health from Reflect or Thorns.
    pub attacker_defeated: bool,
}

fn attack_terrain_percent(attacker: &Fighter, grid: &Grid) -> i32 {
    let percent = grid
        .terrain(attacker.position)
        .unwrap_or_default()
        .stats()
        .attack_modifier_percent;
    if attacker.passive() == Passive::EagleEye {
        percent.max(0)
    } else {
        percent
    }
}

fn defense_terrain_percent(defender: &Fighter, grid: &Grid) -> i32 {
    grid.terrain(defender.position)
        .unwrap_or_default()
        .stats()
        .defense_modifier_percent
}

/// True if `attacker` hits `defender` from a flank.
#[must_use]
pub fn is_flanked(attacker: &Fighter, defender: &Fighter) -> bool {
    defender.passive() != Passive::Steadfast
        && grid::is_flanking(attacker.position, defender.position, defender.facing)
}

/// Runs steps 2 to 7 and the shatter check.
///
/// Consumes exactly one value from `rng` (the critical roll).
pub fn compute<R: Rng>(
    attacker: &Fighter,
    defender: &Fighter,
    grid: &Grid,
    config: &BattleConfig,
    power_percent: u32,
    rng: &mut R,
) -> DamageBreakdown {
    let attacker_mods = effects::modifiers(attacker);
    let defender_mods = effects::modifiers(defender);
    let mut out = DamageBreakdown::default();

    // 2. base
    let strength = u64::from(attacker_mods.strength(attacker.strength));
    let class = u64::from(attacker.profile().damage_percent);
    let base = strength * class * u64::from(power_percent) / 10_000;
    out.base = u32::try_from(base).unwrap_or(u32::MAX);

    // 3. terrain, then flat mitigation
    let mut damage = apply_percent(out.base, attack_terrain_percent(attacker, grid));
    damage = apply_percent(damage, -defense_terrain_percent(defender, grid));
    let defense = defender_mods.defense(defender.defense);
    damage = damage.saturating_sub(defense / 2).max(1);
    out.after_terrain = damage;

    // 4. status
    let mut dealt = attacker_mods.damage_dealt_percent;
    if attacker.passive() == Passive::Bloodlust && attacker.is_bloodied() {
        dealt += BLOODLUST_BONUS;
    }
    damage = apply_percent(damage, dealt);
    damage = apply_percent(damage, defender_mods.damage_taken_percent);
    out.after_status = damage;

    // 5. flanking
    out.flank = is_flanked(attacker, defender);
    if out.flank {
        let mut bonus = config.flank_bonus_percent;
        if attacker.passive() == Passive::Backstab {
            bonus = bonus.saturating_mul(2);
        }
        damage = apply_percent(damage, i32::try_from(bonus).unwrap_or(i32::MAX));
    }
    out.after_flank = damage;

    // 6. critical
    let roll: u32 = rng.gen_range(0..100);
    out.crit = roll < attacker.crit_chance.min(100);
    if out.crit {
        damage = percent_of(damage, attacker.crit_damage);
    }
    out.after_crit = damage;

    // 7. defend
    if defender.is_defending() {
        let reduction = if defender.passive() == Passive::Bulwark {
            BULWARK_REDUCTION
        } else {
            config.defend_reduction_percent
        };
        damage = percent_of(damage, 100u32.saturating_sub(reduction));
    }
    out.after_defend = damage;

    // 8a. shatter
    out.shatter =
        defender.effects.contains(EffectKind::Frozen) && damage >= config.shatter_threshold;
    if out.shatter {
        damage = damage.saturating_add(config.shatter_bonus);
    }
    out.hit = damage;

    trace!(
        attacker = %attacker.id,
        defender = %defender.id,
        base = out.base,
        terrain = out.after_terrain,
        status = out.after_status,
        flank = out.flank,
        crit = out.crit,
        defend = out.after_defend,
        shatter = out.shatter,
        hit = out.hit,
        "damage computed"
    );
    out
}

/// Runs steps 8 and 9: shatter removal, Shield, Reflect, Thorns, clamping.
///
/// Reflect and Thorns are based on the full hit, before Shield. Neither can
/// trigger further Reflect or Thorns.
pub fn land(attacker: &mut Fighter, defender: &mut Fighter, roll: &DamageBreakdown) -> HitOutcome {
    let mut out = HitOutcome::default();

    if roll.shatter {
        out.shattered = defender.effects.remove(EffectKind::Frozen).is_some();
    }

    let (absorbed, exhausted) = effects::absorb_with_shield(defender, roll.hit);
    out.absorbed = absorbed;
    out.shield_exhausted = exhausted;

    let reflect = if defender.effects.contains(EffectKind::Reflect) {
        percent_of(roll.hit, REFLECT_PERCENT)
    } else {
        0
    };
    let thorns = defender
        .effects
        .stacks(EffectKind::Thorns)
        .saturating_mul(THORNS_PER_STACK);

    out.health_lost = defender.apply_damage(roll.hit - absorbed);
    out.defender_defeated = defender.is_defeated();
    attacker.totals.damage_dealt = attacker.totals.damage_dealt.saturating_add(out.health_lost);

    if roll.hit > 0 {
        out.reflected = attacker.apply_damage(reflect);
        out.thorns = attacker.apply_damage(thorns);
        defender.totals.damage_dealt = defender
            .totals
            .damage_dealt
            .saturating_add(out.reflected + out.thorns);
    }
    out.attacker_defeated = attacker.is_defeated();

    trace!(
        attacker = %attacker.id,
        defender = %defender.id,
        absorbed = out.absorbed,
        lost = out.health_lost,
        reflected = out.reflected,
        thorns = out.thorns,
        "hit landed"
    );
    out
}

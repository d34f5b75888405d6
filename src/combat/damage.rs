//! Damage model
//!
//! Mitigation follows a diminishing-returns curve rather than a hard cap:
//! `power * (1 - m / (m + power * k))`. Any finite mitigation lets some
//! damage through, and a floor of 15% of attacker power always applies.

use serde::{Deserialize, Serialize};

use crate::core::config::DamageConfig;
use crate::core::rng::Dice;
use crate::core::types::sanitize;

/// Outcome of one damage computation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageRoll {
    pub amount: u32,
    pub crit: bool,
}

/// Deterministic part of the curve, before variance and crit
pub fn mitigated_damage(power: f64, mitigation: f64, config: &DamageConfig) -> f64 {
    let power = sanitize(power);
    let mitigation = sanitize(mitigation);
    let denominator = mitigation + power * config.mitigation_k;
    if denominator <= 0.0 {
        return power;
    }
    power * (1.0 - mitigation / denominator)
}

/// Crit chance for the acting side given both sides' speed
pub fn crit_chance(actor_speed: f64, other_speed: f64, config: &DamageConfig) -> f64 {
    let actor_speed = sanitize(actor_speed);
    let total = actor_speed + sanitize(other_speed);
    let share = if total > 0.0 { actor_speed / total } else { 0.0 };
    (config.base_crit_chance + config.speed_crit_bonus * share).min(config.crit_chance_cap)
}

/// Inclusive `(lower, upper)` damage bounds for an attack of `power`
pub fn damage_bounds(power: f64, crit: bool, config: &DamageConfig) -> (u32, u32) {
    let power = sanitize(power);
    if power <= 0.0 {
        return (0, 0);
    }
    let mut lower = (power * config.floor_ratio).floor();
    if power >= 1.0 {
        lower = lower.max(1.0);
    }
    let crit_multiplier = if crit { config.crit_multiplier } else { 1.0 };
    let upper = (power * config.variance_max * crit_multiplier).floor().max(lower);
    (lower as u32, upper as u32)
}

/// Roll damage for one hit
///
/// Always consumes two rolls (variance, then crit) so replays stay aligned
/// even when the attacker has no power.
pub fn roll_damage(
    attacker_power: f64,
    mitigation: f64,
    actor_speed: f64,
    other_speed: f64,
    config: &DamageConfig,
    dice: &mut impl Dice,
) -> DamageRoll {
    let variance = dice.between(config.variance_min, config.variance_max);
    let crit = dice.chance(crit_chance(actor_speed, other_speed, config));

    let power = sanitize(attacker_power);
    if power <= 0.0 {
        return DamageRoll { amount: 0, crit };
    }

    let mut amount = (mitigated_damage(power, mitigation, config) * variance).round();
    if crit {
        amount = (amount * config.crit_multiplier).round();
    }

    let (lower, upper) = damage_bounds(power, crit, config);
    let amount = amount.max(lower as f64).min(upper as f64);

    DamageRoll {
        amount: amount as u32,
        crit,
    }
}

//! Applying hits and effects between two units
//!
//! Both the auto-resolver and the interactive battle go through these
//! helpers so damage and effect rules stay identical between the paths.

use crate::combat::damage::{roll_damage, DamageRoll};
use crate::combat::effects::Effect;
use crate::combat::unit::{BattleUnit, Modifier};
use crate::core::config::DamageConfig;
use crate::core::rng::Dice;
use crate::core::types::Stat;

/// Net result of applying a list of effects
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    pub damage: u32,
    pub crit: bool,
    pub healed: u32,
}

/// Hit `defender` with `multiplier` times the attacker's effective attack
///
/// Returns the hp the defender actually lost.
pub fn strike(
    attacker: &BattleUnit,
    defender: &mut BattleUnit,
    multiplier: f64,
    config: &DamageConfig,
    dice: &mut impl Dice,
) -> DamageRoll {
    let power = attacker.effective(Stat::Attack) * multiplier;
    strike_with_power(power, attacker.effective(Stat::Speed), defender, config, dice)
}

/// Hit `defender` with a raw power value (companions, abilities)
pub fn strike_with_power(
    power: f64,
    actor_speed: f64,
    defender: &mut BattleUnit,
    config: &DamageConfig,
    dice: &mut impl Dice,
) -> DamageRoll {
    let roll = roll_damage(
        power,
        defender.mitigation(config.defend_bonus),
        actor_speed,
        defender.effective(Stat::Speed),
        config,
        dice,
    );
    let dealt = defender.take_damage(roll.amount);
    DamageRoll {
        amount: dealt,
        crit: roll.crit,
    }
}

/// Apply `effects` from `user` (identified by `source`) against `target`
pub fn apply_effects(
    source: &str,
    effects: &[Effect],
    user: &mut BattleUnit,
    target: &mut BattleUnit,
    config: &DamageConfig,
    dice: &mut impl Dice,
) -> EffectOutcome {
    let mut outcome = EffectOutcome::default();
    for effect in effects {
        match effect {
            Effect::Damage(damage) => {
                if target.is_defeated() {
                    continue;
                }
                let roll = strike(user, target, damage.multiplier.max(0.0), config, dice);
                outcome.damage += roll.amount;
                outcome.crit |= roll.crit;
            }
            Effect::Debuff(debuff) => {
                target.add_modifier(Modifier {
                    id: source.to_string(),
                    stat: debuff.stat,
                    magnitude: -debuff.magnitude.abs(),
                    remaining: Some(debuff.duration.max(1)),
                });
            }
            Effect::Heal(_) | Effect::Buff(_) => {
                outcome.healed += user.apply_to_self(source, effect);
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;

    fn pair() -> (BattleUnit, BattleUnit) {
        (
            BattleUnit::new("Lin", 100.0, 20.0, 300, 20.0, 10.0),
            BattleUnit::new("Golem", 40.0, 0.0, 200, 10.0, 10.0),
        )
    }

    #[test]
    fn test_strike_reduces_defender_hp() {
        let (attacker, mut defender) = pair();
        // variance 1.0, no crit
        let mut dice = ScriptedDice::new(vec![0.5, 0.9]);
        let roll = strike(&attacker, &mut defender, 1.0, &DamageConfig::default(), &mut dice);
        assert_eq!(roll.amount, 100);
        assert_eq!(defender.hp, 100);
    }

    #[test]
    fn test_strike_reports_actual_hp_lost() {
        let (attacker, mut defender) = pair();
        defender.hp = 30;
        let mut dice = ScriptedDice::new(vec![0.5, 0.9]);
        let roll = strike(&attacker, &mut defender, 1.0, &DamageConfig::default(), &mut dice);
        assert_eq!(roll.amount, 30);
        assert!(defender.is_defeated());
    }

    #[test]
    fn test_mixed_effects() {
        let (mut user, mut target) = pair();
        user.hp = 200;
        let effects = vec![
            Effect::damage(1.5),
            Effect::heal(50),
            Effect::debuff(Stat::Defense, 0.3, 2),
            Effect::buff(Stat::Attack, 0.1, 2),
        ];
        let mut dice = ScriptedDice::new(vec![0.5, 0.9]);
        let outcome = apply_effects(
            "storm_palm",
            &effects,
            &mut user,
            &mut target,
            &DamageConfig::default(),
            &mut dice,
        );
        assert_eq!(outcome.damage, 150);
        assert_eq!(outcome.healed, 50);
        assert_eq!(user.hp, 250);
        assert_eq!(target.modifiers[0].magnitude, -0.3);
        assert_eq!(user.modifiers[0].stat, Stat::Attack);
    }
}

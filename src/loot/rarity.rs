//! Rarity distribution
//!
//! Base weights are shifted toward rarer tiers by player tier (with
//! diminishing returns), activity type, risk level and pity. Common pays
//! for every shift but never drops below its floor.

use crate::catalog::Rarity;
use crate::core::config::{LootConfig, RarityWeights};
use crate::core::rng::Dice;
use crate::core::types::TierIndex;
use crate::opponent::activity::{ActivityKind, RiskLevel};

/// Extra weight granted by the kind of encounter
pub fn activity_bonus(kind: ActivityKind) -> RarityWeights {
    match kind {
        ActivityKind::Lucky => RarityWeights::new(0.0, 5.0, 0.0, 0.0),
        ActivityKind::FactionChallenge => RarityWeights::new(0.0, 6.0, 3.0, 0.0),
        ActivityKind::ApexBoss => RarityWeights::new(0.0, 0.0, 6.0, 2.0),
        ActivityKind::Ordinary | ActivityKind::SecretRealm => RarityWeights::new(0.0, 0.0, 0.0, 0.0),
    }
}

/// Extra weight granted by the area's risk level
pub fn risk_bonus(risk: Option<RiskLevel>) -> RarityWeights {
    match risk {
        Some(RiskLevel::Medium) => RarityWeights::new(0.0, 4.0, 2.0, 0.0),
        Some(RiskLevel::High) => RarityWeights::new(0.0, 6.0, 4.0, 1.0),
        Some(RiskLevel::Extreme) => RarityWeights::new(0.0, 8.0, 6.0, 2.5),
        Some(RiskLevel::Low) | None => RarityWeights::new(0.0, 0.0, 0.0, 0.0),
    }
}

/// Diminishing-returns bonus for climbing the tier ladder
pub fn tier_bonus(config: &LootConfig, tier: TierIndex) -> RarityWeights {
    let factor = 1.0 - config.tier_bonus_decay.powi(tier.0 as i32);
    let caps = config.tier_bonus_caps;
    RarityWeights::new(
        0.0,
        caps.rare * factor,
        caps.legendary * factor,
        caps.mythic * factor,
    )
}

/// Final rarity weights in `Rarity::ALL` order
pub fn rarity_weights(
    config: &LootConfig,
    tier: TierIndex,
    kind: ActivityKind,
    risk: Option<RiskLevel>,
    pity_bonus: f64,
) -> [f64; 4] {
    let mut weights = config.base_weights.as_array();
    let mut shift = [0.0; 4];
    for bonus in [
        tier_bonus(config, tier),
        activity_bonus(kind),
        risk_bonus(risk),
    ] {
        for (slot, value) in shift.iter_mut().zip(bonus.as_array()) {
            *slot += value;
        }
    }
    shift[Rarity::Legendary.index()] += pity_bonus.max(0.0);

    let moved: f64 = shift[1..].iter().sum();
    for index in 1..4 {
        weights[index] += shift[index];
    }
    weights[0] = (weights[0] - moved).max(config.common_floor);
    weights
}

pub fn roll_rarity(weights: &[f64; 4], dice: &mut impl Dice) -> Rarity {
    dice.weighted_index(weights)
        .map(|index| Rarity::ALL[index])
        .unwrap_or(Rarity::Common)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;

    #[test]
    fn test_base_weights_at_lowest_tier() {
        let cfg = LootConfig::default();
        let weights = rarity_weights(&cfg, TierIndex(0), ActivityKind::Ordinary, None, 0.0);
        assert_eq!(weights, [70.0, 22.0, 6.5, 1.5]);
    }

    #[test]
    fn test_tier_bonus_has_diminishing_returns() {
        let cfg = LootConfig::default();
        let first = tier_bonus(&cfg, TierIndex(1)).rare;
        let second = tier_bonus(&cfg, TierIndex(2)).rare - first;
        assert!((first - 2.5).abs() < 1e-9);
        assert!(second < first);
        assert!(tier_bonus(&cfg, TierIndex(50)).rare <= cfg.tier_bonus_caps.rare);
    }

    #[test]
    fn test_risk_and_tier_shift_toward_rare() {
        let cfg = LootConfig::default();
        let calm = rarity_weights(&cfg, TierIndex(0), ActivityKind::SecretRealm, None, 0.0);
        let wild = rarity_weights(
            &cfg,
            TierIndex(8),
            ActivityKind::SecretRealm,
            Some(RiskLevel::Extreme),
            0.0,
        );
        assert!(wild[0] < calm[0]);
        assert!(wild[2] > calm[2]);
        assert!(wild[3] > calm[3]);
    }

    #[test]
    fn test_common_floor() {
        let cfg = LootConfig::default();
        let weights = rarity_weights(
            &cfg,
            TierIndex(8),
            ActivityKind::ApexBoss,
            Some(RiskLevel::Extreme),
            500.0,
        );
        assert_eq!(weights[0], cfg.common_floor);
    }

    #[test]
    fn test_roll_rarity_walks_weights() {
        let weights = [70.0, 22.0, 6.5, 1.5];
        assert_eq!(roll_rarity(&weights, &mut ScriptedDice::constant(0.0)), Rarity::Common);
        assert_eq!(roll_rarity(&weights, &mut ScriptedDice::constant(0.8)), Rarity::Rare);
        assert_eq!(roll_rarity(&weights, &mut ScriptedDice::constant(0.95)), Rarity::Legendary);
        assert_eq!(roll_rarity(&weights, &mut ScriptedDice::constant(0.99)), Rarity::Mythic);
    }
}

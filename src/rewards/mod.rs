//! Experience and currency deltas for a concluded battle
//!
//! Gains scale with the player's tier multiplier, tier-level, activity
//! difficulty, risk level and opponent strength. Defeat costs a fraction
//! of the matching gain with a small minimum; fleeing costs nothing.

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::combat::snapshot::CombatantSnapshot;
use crate::core::config::EngineConfig;
use crate::core::types::{clamp_tier_level, sanitize, Outcome};
use crate::opponent::generator::OpponentDescriptor;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewardDelta {
    pub exp: i64,
    pub currency: i64,
}

pub struct RewardCalculator<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
}

impl<'a> RewardCalculator<'a> {
    pub fn new(config: &'a EngineConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Shared scale for exp and currency before the base values
    pub fn scale(&self, player: &CombatantSnapshot, opponent: &OpponentDescriptor) -> f64 {
        let r = &self.config.rewards;
        let tier = self.catalog.tiers.get(player.tier).reward_multiplier;
        let level = 1.0 + r.level_step * (clamp_tier_level(player.tier_level) as f64 - 1.0);
        let difficulty = opponent.activity.difficulty(&self.config.activity);
        let risk = opponent
            .activity
            .risk()
            .map_or(1.0, |risk| risk.reward_multiplier(&self.config.activity));
        let strength = sanitize(opponent.strength_multiplier).clamp(r.strength_min, r.strength_max);
        tier * level * difficulty * risk * strength
    }

    pub fn compute(
        &self,
        outcome: Outcome,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
    ) -> RewardDelta {
        let r = &self.config.rewards;
        let scale = self.scale(player, opponent);
        let exp = r.base_exp * scale;
        let currency = r.base_currency * scale;

        match outcome {
            Outcome::Victory => {
                let (exp_bonus, currency_bonus) = opponent
                    .boss_id
                    .as_deref()
                    .and_then(|id| self.catalog.boss(id).ok())
                    .map_or((0, 0), |boss| (boss.exp_bonus.max(0), boss.currency_bonus.max(0)));
                RewardDelta {
                    exp: (exp.round() as i64).max(1) + exp_bonus,
                    currency: (currency.round() as i64).max(1) + currency_bonus,
                }
            }
            Outcome::Defeat => RewardDelta {
                exp: -((exp * r.defeat_ratio).round() as i64).max(r.min_exp_loss),
                currency: -((currency * r.defeat_ratio).round() as i64).max(r.min_currency_loss),
            },
            Outcome::Fled => RewardDelta::default(),
        }
    }
}

//! Battle results as handed to callers
//!
//! Both resolution paths end in a [`BattleRecord`]; [`Settlement`] turns it
//! into a [`BattleResolution`] by rolling loot, computing rewards and
//! writing the summary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::combat::log::{RoundLog, RoundLogEntry};
use crate::combat::snapshot::CombatantSnapshot;
use crate::core::config::EngineConfig;
use crate::core::rng::Dice;
use crate::core::types::{BattleId, Outcome};
use crate::loot::{LootGenerator, LootItem, LootPity, LootRequest};
use crate::opponent::generator::OpponentDescriptor;
use crate::rewards::{RewardCalculator, RewardDelta};

/// Raw result of the fight itself, before loot and rewards
#[derive(Debug, Clone)]
pub struct BattleRecord {
    pub battle_id: BattleId,
    pub outcome: Outcome,
    pub rounds: u32,
    pub hit_round_cap: bool,
    pub log: RoundLog,
    pub hp_after: u32,
    /// Companion cooldowns still running; `None` without a companion
    pub companion_cooldowns: Option<BTreeMap<String, u32>>,
}

/// Immutable replay of one battle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleResolution {
    pub battle_id: BattleId,
    pub opponent: OpponentDescriptor,
    pub log: Vec<RoundLogEntry>,
    pub outcome: Outcome,
    pub victory: bool,
    pub rounds: u32,
    pub hit_round_cap: bool,
    pub hp_before: u32,
    pub hp_after: u32,
    pub hp_lost: u32,
    pub summary: String,
    pub exp_change: i64,
    pub currency_change: i64,
    pub loot: Option<Vec<LootItem>>,
    pub companion_cooldowns: Option<BTreeMap<String, u32>>,
}

impl BattleResolution {
    pub fn to_json(&self) -> crate::core::error::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

pub struct Settlement<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
}

impl<'a> Settlement<'a> {
    pub fn new(config: &'a EngineConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Roll loot (victories only), compute rewards and package the replay
    pub fn settle(
        &self,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
        record: BattleRecord,
        pity: &mut LootPity,
        dice: &mut impl Dice,
    ) -> BattleResolution {
        let loot = if record.outcome.is_victory() {
            let request = LootRequest::for_opponent(opponent, player.tier);
            Some(LootGenerator::new(&self.config.loot, self.catalog).generate(&request, pity, dice))
        } else {
            None
        };

        let rewards =
            RewardCalculator::new(self.config, self.catalog).compute(record.outcome, player, opponent);

        let hp_before = player.hp.min(player.max_hp);
        let hp_lost = hp_before.saturating_sub(record.hp_after);
        let summary = summarize(
            &player.name,
            &opponent.display_name(),
            &record,
            hp_lost,
            rewards,
            loot.as_deref(),
        );

        info!(
            battle = %record.battle_id.0,
            outcome = ?record.outcome,
            rounds = record.rounds,
            cap = record.hit_round_cap,
            exp = rewards.exp,
            "battle concluded"
        );

        let companion_cooldowns = record
            .companion_cooldowns
            .filter(|cooldowns| !cooldowns.is_empty());

        BattleResolution {
            battle_id: record.battle_id,
            opponent: opponent.clone(),
            log: record.log.into_entries(),
            outcome: record.outcome,
            victory: record.outcome.is_victory(),
            rounds: record.rounds,
            hit_round_cap: record.hit_round_cap,
            hp_before,
            hp_after: record.hp_after,
            hp_lost,
            summary,
            exp_change: rewards.exp,
            currency_change: rewards.currency,
            loot,
            companion_cooldowns,
        }
    }
}

fn summarize(
    player: &str,
    opponent: &str,
    record: &BattleRecord,
    hp_lost: u32,
    rewards: RewardDelta,
    loot: Option<&[LootItem]>,
) -> String {
    let rounds = match record.rounds {
        1 => "1 round".to_string(),
        n => format!("{} rounds", n),
    };
    let mut summary = match record.outcome {
        Outcome::Victory => format!(
            "{} defeated {} in {}, losing {} hp.",
            player, opponent, rounds, hp_lost
        ),
        Outcome::Defeat if record.hit_round_cap => format!(
            "{} could not bring down {} before the round limit ({}).",
            player, opponent, rounds
        ),
        Outcome::Defeat => format!("{} fell to {} after {}.", player, opponent, rounds),
        Outcome::Fled => format!("{} escaped from {} after {}.", player, opponent, rounds),
    };

    if rewards.exp > 0 {
        summary.push_str(&format!(
            " Gained {} exp and {} spirit stones.",
            rewards.exp, rewards.currency
        ));
    } else if rewards.exp < 0 {
        summary.push_str(&format!(
            " Lost {} exp and {} spirit stones.",
            -rewards.exp, -rewards.currency
        ));
    }

    if let Some(items) = loot.filter(|items| !items.is_empty()) {
        let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
        summary.push_str(&format!(" Found: {}.", names.join(", ")));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;
    use crate::core::types::TierIndex;
    use crate::opponent::activity::Activity;
    use crate::opponent::generator::OpponentGenerator;

    fn record(outcome: Outcome, hp_after: u32) -> BattleRecord {
        BattleRecord {
            battle_id: BattleId::from_dice(&mut ScriptedDice::constant(0.2)),
            outcome,
            rounds: 4,
            hit_round_cap: false,
            log: RoundLog::new(),
            hp_after,
            companion_cooldowns: Some(BTreeMap::new()),
        }
    }

    #[test]
    fn test_settle_victory_and_defeat() {
        let config = EngineConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let player = CombatantSnapshot::new("Lin", TierIndex(0), 1)
            .with_stats(50.0, 30.0, 500, 20.0, 10.0);
        let opponent = OpponentGenerator::new(&config, &catalog)
            .generate_stats(&player, &Activity::Ordinary, &mut ScriptedDice::constant(0.5))
            .unwrap();
        let settlement = Settlement::new(&config, &catalog);
        let mut pity = LootPity::new();
        let mut dice = ScriptedDice::constant(0.4);

        let win = settlement.settle(&player, &opponent, record(Outcome::Victory, 320), &mut pity, &mut dice);
        assert!(win.victory);
        assert_eq!(win.hp_lost, 180);
        assert!(win.loot.as_ref().is_some_and(|l| !l.is_empty()));
        assert!(win.exp_change > 0);
        assert!(win.summary.contains("defeated"));
        assert_eq!(win.companion_cooldowns, None);

        let loss = settlement.settle(&player, &opponent, record(Outcome::Defeat, 0), &mut pity, &mut dice);
        assert!(!loss.victory);
        assert!(loss.loot.is_none());
        assert!(loss.exp_change < 0);
        assert!(loss.summary.contains("Lost"));
    }

    #[test]
    fn test_resolution_serializes() {
        let config = EngineConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let player = CombatantSnapshot::new("Lin", TierIndex(0), 1)
            .with_stats(50.0, 30.0, 500, 20.0, 10.0);
        let opponent = OpponentGenerator::new(&config, &catalog)
            .generate_stats(&player, &Activity::Lucky, &mut ScriptedDice::constant(0.5))
            .unwrap();
        let resolution = Settlement::new(&config, &catalog).settle(
            &player,
            &opponent,
            record(Outcome::Fled, 500),
            &mut LootPity::new(),
            &mut ScriptedDice::constant(0.5),
        );
        let json = resolution.to_json().unwrap();
        let back: BattleResolution = serde_json::from_str(&json).unwrap();
        assert_eq!(back.outcome, Outcome::Fled);
        assert_eq!(back.exp_change, 0);
    }
}

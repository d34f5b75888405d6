//! Entry point for callers: generate an opponent, fight it, collect the result

use crate::catalog::Catalog;
use crate::combat::snapshot::CombatantSnapshot;
use crate::core::config::EngineConfig;
use crate::core::error::Result;
use crate::core::rng::Dice;
use crate::interactive::InteractiveBattle;
use crate::loot::LootPity;
use crate::opponent::activity::Activity;
use crate::opponent::generator::{OpponentDescriptor, OpponentGenerator};
use crate::opponent::names::NameSource;
use crate::resolution::{AutoResolver, BattleResolution};

pub struct Encounter<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
    names: &'a dyn NameSource,
}

impl<'a> Encounter<'a> {
    pub fn new(config: &'a EngineConfig, catalog: &'a Catalog, names: &'a dyn NameSource) -> Self {
        Self {
            config,
            catalog,
            names,
        }
    }

    /// Generate the opponent for an activity
    pub async fn prepare<D: Dice + Send>(
        &self,
        player: &CombatantSnapshot,
        activity: &Activity,
        dice: &mut D,
    ) -> Result<OpponentDescriptor> {
        OpponentGenerator::new(self.config, self.catalog)
            .generate(player, activity, dice, self.names)
            .await
    }

    /// Skip straight to the result
    pub fn auto_resolve(
        &self,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
        pity: &mut LootPity,
        dice: &mut impl Dice,
    ) -> BattleResolution {
        AutoResolver::new(self.config, self.catalog).resolve(player, opponent, pity, dice)
    }

    pub fn begin_interactive(
        &self,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
        dice: &mut impl Dice,
    ) -> InteractiveBattle<'a> {
        InteractiveBattle::new(self.config, self.catalog, player, opponent, dice)
    }

    /// Package a concluded interactive battle
    pub fn finish_interactive(
        &self,
        battle: InteractiveBattle<'a>,
        pity: &mut LootPity,
        dice: &mut impl Dice,
    ) -> Result<BattleResolution> {
        battle.conclude(pity, dice)
    }

    /// Prepare and auto-resolve in one call
    pub async fn run_auto<D: Dice + Send>(
        &self,
        player: &CombatantSnapshot,
        activity: &Activity,
        pity: &mut LootPity,
        dice: &mut D,
    ) -> Result<BattleResolution> {
        let opponent = self.prepare(player, activity, dice).await?;
        Ok(self.auto_resolve(player, &opponent, pity, dice))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::TierIndex;
    use crate::core::types::Outcome;
    use crate::interactive::{Phase, PlayerAction};
    use crate::opponent::names::StaticNames;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn player() -> CombatantSnapshot {
        CombatantSnapshot::new("Lin", TierIndex(0), 1).with_stats(50.0, 30.0, 500, 20.0, 10.0)
    }

    #[tokio::test]
    async fn test_run_auto_is_reproducible() {
        let config = EngineConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let encounter = Encounter::new(&config, &catalog, &StaticNames);

        let mut first = ChaCha8Rng::seed_from_u64(99);
        let a = encounter
            .run_auto(&player(), &Activity::Ordinary, &mut LootPity::new(), &mut first)
            .await
            .unwrap();
        let mut second = ChaCha8Rng::seed_from_u64(99);
        let b = encounter
            .run_auto(&player(), &Activity::Ordinary, &mut LootPity::new(), &mut second)
            .await
            .unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_interactive_round_trip() {
        let config = EngineConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let encounter = Encounter::new(&config, &catalog, &StaticNames);
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let opponent = encounter
            .prepare(&player(), &Activity::Lucky, &mut rng)
            .await
            .unwrap();
        let mut battle = encounter.begin_interactive(&player(), &opponent, &mut rng);
        if battle.phase() == Phase::OpponentActing {
            battle.advance_opponent(&mut rng).unwrap();
        }
        battle
            .act(PlayerAction::Flee { guaranteed: true }, &mut rng)
            .unwrap();
        let resolution = encounter
            .finish_interactive(battle, &mut LootPity::new(), &mut rng)
            .unwrap();
        assert_eq!(resolution.outcome, Outcome::Fled);
        assert!(!resolution.victory);
        assert!(resolution.loot.is_none());
        assert_eq!(resolution.exp_change, 0);
    }
}

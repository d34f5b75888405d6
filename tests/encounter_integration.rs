//! End-to-end encounter tests
//!
//! Drive opponent generation, both resolution paths, loot and rewards
//! through the public API the way a game server would.

use async_trait::async_trait;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use realm_combat::combat::{Effect, InventoryStack, SkillSpec};
use realm_combat::core::types::{Actor, TierIndex};
use realm_combat::opponent::names::{NameRequest, NameSource, StaticNames};
use realm_combat::opponent::{composite_power, OpponentGenerator};
use realm_combat::{
    Activity, Catalog, CombatError, CombatantSnapshot, Encounter, EngineConfig, LootPity, Outcome,
    Phase, PlayerAction, Result,
};

fn lowest_tier_player() -> CombatantSnapshot {
    CombatantSnapshot::new("Lin Feng", TierIndex(0), 1).with_stats(50.0, 30.0, 500, 20.0, 10.0)
}

/// Always fails, like an unreachable template service
struct BrokenNames;

#[async_trait]
impl NameSource for BrokenNames {
    async fn generate_name(&self, _request: &NameRequest) -> Result<Option<String>> {
        Err(CombatError::NameServiceError("connection refused".into()))
    }
}

/// Always answers with the same name
struct FixedName;

#[async_trait]
impl NameSource for FixedName {
    async fn generate_name(&self, _request: &NameRequest) -> Result<Option<String>> {
        Ok(Some("Glass-Eyed Reaver".into()))
    }
}

#[tokio::test]
async fn test_lowest_tier_ordinary_scenario() {
    let config = EngineConfig::default();
    let catalog = Catalog::builtin().unwrap();
    let encounter = Encounter::new(&config, &catalog, &StaticNames);
    let player = lowest_tier_player();

    for seed in 0..50 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let opponent = encounter
            .prepare(&player, &Activity::Ordinary, &mut rng)
            .await
            .unwrap();

        // Base stats before variance and difficulty
        assert!(
            (25.0..=45.0).contains(&opponent.trace.base_attack),
            "seed {}: base attack {}",
            seed,
            opponent.trace.base_attack
        );
        assert!(
            (350.0..=450.0).contains(&opponent.trace.base_hp),
            "seed {}: base hp {}",
            seed,
            opponent.trace.base_hp
        );

        let resolution = encounter.auto_resolve(&player, &opponent, &mut LootPity::new(), &mut rng);
        assert!(resolution.rounds <= config.battle.round_cap);
        assert!(!resolution.hit_round_cap, "seed {} stalled at the round cap", seed);
        let last = resolution.log.last().unwrap();
        assert!(last.player_hp == 0 || last.opponent_hp == 0);
    }
}

#[tokio::test]
async fn test_overpowered_boss_is_rescaled_into_band() {
    let config = EngineConfig::default();
    let catalog = Catalog::builtin().unwrap();
    let encounter = Encounter::new(&config, &catalog, &StaticNames);
    let player = lowest_tier_player();
    let player_power = composite_power(&realm_combat::opponent::generator::player_stats(&player));

    let giants: Vec<_> = catalog
        .bosses
        .iter()
        .filter(|b| composite_power(&b.stats) > player_power * 10.0)
        .collect();
    assert!(!giants.is_empty());

    for boss in giants {
        for seed in 0..20 {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            let activity = Activity::ApexBoss {
                boss_id: boss.id.clone(),
            };
            let opponent = encounter.prepare(&player, &activity, &mut rng).await.unwrap();
            let ratio = composite_power(&opponent.stats()) / player_power;
            assert!(
                (0.89..=1.81).contains(&ratio),
                "{} seed {}: ratio {}",
                boss.id,
                seed,
                ratio
            );
            assert_eq!(opponent.name, boss.name);
        }
    }
}

#[tokio::test]
async fn test_name_service_failure_keeps_static_name() {
    let config = EngineConfig::default();
    let catalog = Catalog::builtin().unwrap();
    let generator = OpponentGenerator::new(&config, &catalog);
    let player = lowest_tier_player();

    for seed in 0..40 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let opponent = generator
            .generate(&player, &Activity::Ordinary, &mut rng, &BrokenNames)
            .await
            .unwrap();
        assert!(!opponent.name.is_empty());
        assert!(catalog.names.ordinary.contains(&opponent.name));
    }
}

#[tokio::test]
async fn test_name_service_is_sometimes_consulted() {
    let config = EngineConfig::default();
    let catalog = Catalog::builtin().unwrap();
    let generator = OpponentGenerator::new(&config, &catalog);
    let player = lowest_tier_player();

    let mut external = 0;
    for seed in 0..200 {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let opponent = generator
            .generate(&player, &Activity::Ordinary, &mut rng, &FixedName)
            .await
            .unwrap();
        if opponent.name == "Glass-Eyed Reaver" {
            external += 1;
        }
    }
    assert!(external > 0 && external < 200, "external names: {}", external);
}

#[tokio::test]
async fn test_interactive_battle_plays_to_conclusion() {
    let config = EngineConfig::default();
    let catalog = Catalog::builtin().unwrap();
    let encounter = Encounter::new(&config, &catalog, &StaticNames);
    let mut player = lowest_tier_player().with_mana(60);
    player.techniques.push(SkillSpec {
        id: "storm_palm".into(),
        name: "Storm Palm".into(),
        mana_cost: 20,
        cooldown: 2,
        effects: vec![Effect::damage(1.8)],
    });
    player.inventory.push(InventoryStack {
        id: "jade_salve".into(),
        name: "Jade Salve".into(),
        quantity: 1,
        effects: vec![Effect::heal(120)],
    });

    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let opponent = encounter
        .prepare(&player, &Activity::Ordinary, &mut rng)
        .await
        .unwrap();
    let mut battle = encounter.begin_interactive(&player, &opponent, &mut rng);

    let mut steps = 0;
    while !battle.phase().is_concluded() {
        steps += 1;
        assert!(steps < 500, "interactive battle did not conclude");
        match battle.phase() {
            Phase::AwaitingPlayerAction => {
                let action = if battle.hero().hp < battle.hero().max_hp / 3
                    && battle.item_quantity("jade_salve") > 0
                {
                    PlayerAction::item("jade_salve")
                } else {
                    PlayerAction::skill("storm_palm")
                };
                if let Err(e) = battle.act(action, &mut rng) {
                    assert!(e.is_recoverable());
                    battle.act(PlayerAction::Attack, &mut rng).unwrap();
                }
            }
            Phase::OpponentActing => {
                battle.advance_opponent(&mut rng).unwrap();
            }
            Phase::Resolving | Phase::Concluded(_) => unreachable!(),
        }

        let view = battle.view();
        assert!(view.player.hp <= view.player.max_hp);
        assert!(view.opponent.hp <= view.opponent.max_hp);
    }

    // Finished battles refuse further input
    let err = battle.act(PlayerAction::Attack, &mut rng).unwrap_err();
    assert!(matches!(err, CombatError::BattleConcluded));

    let resolution = encounter
        .finish_interactive(battle, &mut LootPity::new(), &mut rng)
        .unwrap();
    match resolution.outcome {
        Outcome::Victory => {
            assert!(resolution.exp_change > 0);
            assert!(resolution.loot.is_some());
        }
        Outcome::Defeat => {
            assert!(resolution.exp_change < 0);
            assert!(resolution.loot.is_none());
        }
        Outcome::Fled => unreachable!(),
    }
    assert!(resolution.log.iter().any(|e| e.actor == Actor::Player));
    let ids: Vec<u64> = resolution.log.iter().map(|e| e.id).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
}

#[tokio::test]
async fn test_resolution_serializes_for_clients() {
    let config = EngineConfig::default();
    let catalog = Catalog::builtin().unwrap();
    let encounter = Encounter::new(&config, &catalog, &StaticNames);
    let mut rng = ChaCha8Rng::seed_from_u64(8);
    let resolution = encounter
        .run_auto(
            &lowest_tier_player(),
            &Activity::SecretRealm {
                risk: realm_combat::RiskLevel::High,
                min_tier: None,
            },
            &mut LootPity::new(),
            &mut rng,
        )
        .await
        .unwrap();

    let json = resolution.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["opponent"]["activity"]["type"], "secret_realm");
    assert_eq!(value["opponent"]["activity"]["risk"], "high");
    assert!(value["log"].is_array());
    let back: realm_combat::BattleResolution = serde_json::from_str(&json).unwrap();
    assert_eq!(back.battle_id, resolution.battle_id);
    assert_eq!(back.log.len(), resolution.log.len());
    assert_eq!(back.outcome, resolution.outcome);
}

#[test]
fn test_empty_tier_table_is_fatal() {
    let err = Catalog::from_toml_str("[[bosses]]\n").unwrap_err();
    assert!(matches!(err, CombatError::EmptyTierTable | CombatError::CatalogError(_)));
    assert!(matches!(
        Catalog::from_toml_str("").unwrap_err(),
        CombatError::EmptyTierTable
    ));
}

//! One-pass battle resolution
//!
//! Each round the side that goes first takes its whole action batch, then
//! the other side takes its batch. The companion follows every player
//! action. The round cap is the only liveness guarantee.

use tracing::debug;

use crate::catalog::Catalog;
use crate::combat::action_economy::allowance;
use crate::combat::companion::CompanionState;
use crate::combat::exchange::strike;
use crate::combat::log::{describe_hit, ActionKind, LoggedAction, RoundLog};
use crate::combat::snapshot::CombatantSnapshot;
use crate::combat::unit::BattleUnit;
use crate::core::config::EngineConfig;
use crate::core::rng::Dice;
use crate::core::types::{Actor, BattleId, Outcome, Side, Stat};
use crate::loot::LootPity;
use crate::opponent::generator::OpponentDescriptor;
use crate::resolution::replay::{BattleRecord, BattleResolution, Settlement};

pub struct AutoResolver<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
}

impl<'a> AutoResolver<'a> {
    pub fn new(config: &'a EngineConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Fight to the end and settle loot and rewards
    pub fn resolve(
        &self,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
        pity: &mut LootPity,
        dice: &mut impl Dice,
    ) -> BattleResolution {
        let record = self.fight(player, opponent, dice);
        Settlement::new(self.config, self.catalog).settle(player, opponent, record, pity, dice)
    }

    /// Run the round loop only
    pub fn fight(
        &self,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
        dice: &mut impl Dice,
    ) -> BattleRecord {
        let battle_id = BattleId::from_dice(dice);
        let cfg = self.config;
        let mut hero = BattleUnit::from_snapshot(player);
        let mut foe = opponent.to_unit();
        let mut companion = player.companion.clone().map(CompanionState::new);
        let mut log = RoundLog::new();

        let turns = allowance(
            hero.effective(Stat::Speed),
            hero.effective(Stat::Perception),
            foe.effective(Stat::Speed),
            foe.effective(Stat::Perception),
            &cfg.action_economy,
        );
        debug!(
            player = turns.player,
            opponent = turns.opponent,
            first = ?turns.first,
            "action allowance"
        );

        let order = [turns.first, turns.first.other()];
        let mut rounds = 0;
        'battle: while rounds < cfg.battle.round_cap && !hero.is_defeated() && !foe.is_defeated() {
            rounds += 1;
            for side in order {
                for _ in 0..turns.for_side(side) {
                    match side {
                        Side::Player => {
                            let roll = strike(&hero, &mut foe, 1.0, &cfg.damage, dice);
                            log.record(
                                LoggedAction {
                                    round: rounds,
                                    actor: Actor::Player,
                                    kind: ActionKind::Attack,
                                    damage: roll.amount,
                                    crit: roll.crit,
                                    healed: 0,
                                    text: describe_hit(&hero.name, &foe.name, "strikes", roll.amount, roll.crit),
                                },
                                hero.hp,
                                foe.hp,
                            );
                            if foe.is_defeated() {
                                break 'battle;
                            }

                            if let Some(companion) = companion.as_mut() {
                                let action = companion.act(
                                    hero.effective(Stat::Speed),
                                    &mut foe,
                                    &cfg.battle,
                                    &cfg.damage,
                                    dice,
                                );
                                log.record(
                                    LoggedAction {
                                        round: rounds,
                                        actor: Actor::Companion,
                                        kind: action.kind,
                                        damage: action.damage,
                                        crit: action.crit,
                                        healed: 0,
                                        text: action.text,
                                    },
                                    hero.hp,
                                    foe.hp,
                                );
                                if foe.is_defeated() {
                                    break 'battle;
                                }
                            }
                        }
                        Side::Opponent => {
                            let roll = strike(&foe, &mut hero, 1.0, &cfg.damage, dice);
                            log.record(
                                LoggedAction {
                                    round: rounds,
                                    actor: Actor::Opponent,
                                    kind: ActionKind::Attack,
                                    damage: roll.amount,
                                    crit: roll.crit,
                                    healed: 0,
                                    text: describe_hit(&foe.name, &hero.name, "attacks", roll.amount, roll.crit),
                                },
                                hero.hp,
                                foe.hp,
                            );
                            if hero.is_defeated() {
                                break 'battle;
                            }
                        }
                    }
                }
            }
        }

        let hit_round_cap = !hero.is_defeated() && !foe.is_defeated();
        let outcome = judge(&hero, &foe);
        BattleRecord {
            battle_id,
            outcome,
            rounds,
            hit_round_cap,
            log,
            hp_after: hero.hp,
            companion_cooldowns: companion.map(|c| c.remaining_cooldowns()),
        }
    }
}

/// Only a fallen opponent is a victory; a capped battle counts as a loss
pub(crate) fn judge(hero: &BattleUnit, foe: &BattleUnit) -> Outcome {
    if foe.is_defeated() && !hero.is_defeated() {
        Outcome::Victory
    } else {
        Outcome::Defeat
    }
}

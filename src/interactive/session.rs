//! Step-by-step battle driven by player commands
//!
//! The player spends a batch of actions, then `advance_opponent` runs the
//! opponent's batch and opens the next player batch. Commands are
//! validated before anything changes, so a rejected command leaves the
//! battle exactly as it was. The opponent only ever attacks.

use std::collections::BTreeMap;

use tracing::debug;

use crate::catalog::Catalog;
use crate::combat::action_economy::{allowance, ActionAllowance};
use crate::combat::companion::CompanionState;
use crate::combat::exchange::{apply_effects, strike, EffectOutcome};
use crate::combat::log::{describe_hit, ActionKind, LoggedAction, RoundLog, RoundLogEntry};
use crate::combat::snapshot::{AbilitySpec, CombatantSnapshot, InventoryStack};
use crate::combat::unit::BattleUnit;
use crate::core::config::EngineConfig;
use crate::core::error::{CombatError, Result};
use crate::core::rng::Dice;
use crate::core::types::{Actor, BattleId, Outcome, Side, Stat};
use crate::interactive::state::{BattleView, CombatantView, Phase, PlayerAction};
use crate::loot::LootPity;
use crate::opponent::generator::OpponentDescriptor;
use crate::resolution::replay::{BattleRecord, BattleResolution, Settlement};

pub struct InteractiveBattle<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
    battle_id: BattleId,
    player: CombatantSnapshot,
    opponent: OpponentDescriptor,
    hero: BattleUnit,
    foe: BattleUnit,
    companion: Option<CompanionState>,
    inventory: Vec<InventoryStack>,
    spirit_charges: u32,
    ability_cooldowns: BTreeMap<String, u32>,
    turns: ActionAllowance,
    actions_left: u32,
    batches_done: u32,
    phase: Phase,
    log: RoundLog,
}

impl<'a> InteractiveBattle<'a> {
    /// Set up a battle; when the opponent is faster it acts first
    pub fn new(
        config: &'a EngineConfig,
        catalog: &'a Catalog,
        player: &CombatantSnapshot,
        opponent: &OpponentDescriptor,
        dice: &mut impl Dice,
    ) -> Self {
        let hero = BattleUnit::from_snapshot(player);
        let foe = opponent.to_unit();
        let turns = allowance(
            hero.effective(Stat::Speed),
            hero.effective(Stat::Perception),
            foe.effective(Stat::Speed),
            foe.effective(Stat::Perception),
            &config.action_economy,
        );

        let mut battle = Self {
            config,
            catalog,
            battle_id: BattleId::from_dice(dice),
            player: player.clone(),
            opponent: opponent.clone(),
            hero,
            foe,
            companion: player.companion.clone().map(CompanionState::new),
            inventory: player.inventory.clone(),
            spirit_charges: player.spirit_charges,
            ability_cooldowns: BTreeMap::new(),
            turns,
            actions_left: 0,
            batches_done: 0,
            phase: Phase::OpponentActing,
            log: RoundLog::new(),
        };

        if battle.hero.is_defeated() {
            battle.phase = Phase::Concluded(Outcome::Defeat);
        } else if turns.first == Side::Player {
            battle.open_player_batch();
        }
        debug!(
            battle = %battle.battle_id.0,
            first = ?turns.first,
            player_actions = turns.player,
            opponent_actions = turns.opponent,
            "interactive battle started"
        );
        battle
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn battle_id(&self) -> BattleId {
        self.battle_id
    }

    /// Round of the batch currently running (1-based)
    pub fn round(&self) -> u32 {
        self.batches_done / 2 + 1
    }

    pub fn actions_remaining(&self) -> u32 {
        self.actions_left
    }

    pub fn allowance(&self) -> ActionAllowance {
        self.turns
    }

    pub fn log(&self) -> &[RoundLogEntry] {
        self.log.entries()
    }

    pub fn hero(&self) -> &BattleUnit {
        &self.hero
    }

    pub fn foe(&self) -> &BattleUnit {
        &self.foe
    }

    pub fn spirit_charges(&self) -> u32 {
        self.spirit_charges
    }

    pub fn item_quantity(&self, id: &str) -> u32 {
        self.inventory
            .iter()
            .find(|stack| stack.id == id)
            .map_or(0, |stack| stack.quantity)
    }

    /// Odds of a normal escape attempt succeeding right now
    pub fn flee_chance(&self) -> f64 {
        let b = &self.config.battle;
        let mine = self.hero.effective(Stat::Speed);
        let total = mine + self.foe.effective(Stat::Speed);
        let share = if total > 0.0 { mine / total } else { 0.5 };
        (b.flee_base + b.flee_speed_weight * (share - 0.5)).clamp(b.flee_min, b.flee_max)
    }

    pub fn view(&self) -> BattleView {
        BattleView {
            battle_id: self.battle_id,
            round: self.round(),
            phase: self.phase,
            actions_remaining: self.actions_left,
            player: CombatantView::from(&self.hero),
            opponent: CombatantView::from(&self.foe),
            skill_cooldowns: self
                .hero
                .skills
                .iter()
                .filter(|slot| !slot.ready())
                .map(|slot| (slot.spec.id.clone(), slot.cooldown_remaining))
                .collect(),
            ability_cooldowns: self
                .ability_cooldowns
                .iter()
                .filter(|(_, turns)| **turns > 0)
                .map(|(id, turns)| (id.clone(), *turns))
                .collect(),
            companion_cooldowns: self.companion.as_ref().map(CompanionState::remaining_cooldowns),
            inventory: self.inventory.clone(),
            spirit_charges: self.spirit_charges,
            flee_chance: self.flee_chance(),
            log_len: self.log.len(),
        }
    }

    /// Apply one player command
    ///
    /// Returns the log entries it produced (the player's action and the
    /// companion's follow-up). Validation failures change nothing.
    pub fn act(&mut self, action: PlayerAction, dice: &mut impl Dice) -> Result<Vec<RoundLogEntry>> {
        self.ensure_awaiting()?;
        self.validate(&action)?;

        let first_new = self.log.len();
        self.phase = Phase::Resolving;
        let round = self.round();

        let (kind, outcome, text) = match &action {
            PlayerAction::Attack => {
                let roll = strike(&self.hero, &mut self.foe, 1.0, &self.config.damage, dice);
                let text = describe_hit(&self.hero.name, &self.foe.name, "strikes", roll.amount, roll.crit);
                (
                    ActionKind::Attack,
                    EffectOutcome {
                        damage: roll.amount,
                        crit: roll.crit,
                        healed: 0,
                    },
                    text,
                )
            }
            PlayerAction::Defend => {
                self.hero.is_defending = true;
                let text = format!("{} braces for the next blow.", self.hero.name);
                (ActionKind::Defend, EffectOutcome::default(), text)
            }
            PlayerAction::UseSkill { id } => {
                let (name, effects) = match self.hero.skill_mut(id) {
                    Some(slot) => {
                        slot.cooldown_remaining = slot.spec.cooldown;
                        (slot.spec.name.clone(), slot.spec.effects.clone())
                    }
                    None => return Err(CombatError::UnknownSkill(id.clone())),
                };
                let cost = self.hero.skill(id).map_or(0, |slot| slot.spec.mana_cost);
                self.hero.mana -= cost;
                let outcome = apply_effects(id, &effects, &mut self.hero, &mut self.foe, &self.config.damage, dice);
                let text = self.describe_use(&name, outcome);
                (ActionKind::Skill(id.clone()), outcome, text)
            }
            PlayerAction::UseItem { id } => {
                let (name, effects) = match self.inventory.iter_mut().find(|stack| &stack.id == id) {
                    Some(stack) => {
                        stack.quantity -= 1;
                        (stack.name.clone(), stack.effects.clone())
                    }
                    None => return Err(CombatError::ItemUnavailable(id.clone())),
                };
                let outcome = apply_effects(id, &effects, &mut self.hero, &mut self.foe, &self.config.damage, dice);
                let text = self.describe_use(&name, outcome);
                (ActionKind::Item(id.clone()), outcome, text)
            }
            PlayerAction::UseAbility { id } => {
                let ability = self.ability(id)?.clone();
                self.spirit_charges -= ability.charge_cost;
                self.ability_cooldowns.insert(ability.id.clone(), ability.cooldown);
                let outcome = apply_effects(id, &ability.effects, &mut self.hero, &mut self.foe, &self.config.damage, dice);
                let text = self.describe_use(&ability.name, outcome);
                (ActionKind::Ability(id.clone()), outcome, text)
            }
            PlayerAction::Flee { guaranteed } => {
                let escaped = *guaranteed || dice.chance(self.flee_chance());
                let text = if escaped {
                    format!("{} escapes from {}.", self.hero.name, self.foe.name)
                } else {
                    format!("{} tries to flee but {} cuts off the escape.", self.hero.name, self.foe.name)
                };
                self.record(round, Actor::Player, ActionKind::Flee, EffectOutcome::default(), text);
                if escaped {
                    self.conclude_with(Outcome::Fled);
                } else {
                    self.finish_player_action();
                }
                return Ok(self.log.entries()[first_new..].to_vec());
            }
        };

        self.record(round, Actor::Player, kind, outcome, text);
        if self.foe.is_defeated() {
            self.conclude_with(Outcome::Victory);
            return Ok(self.log.entries()[first_new..].to_vec());
        }

        self.companion_turn(round, dice);
        if self.foe.is_defeated() {
            self.conclude_with(Outcome::Victory);
            return Ok(self.log.entries()[first_new..].to_vec());
        }

        self.finish_player_action();
        Ok(self.log.entries()[first_new..].to_vec())
    }

    /// Run the opponent's batch of plain attacks and hand control back
    pub fn advance_opponent(&mut self, dice: &mut impl Dice) -> Result<Vec<RoundLogEntry>> {
        match self.phase {
            Phase::OpponentActing => {}
            Phase::Concluded(_) => return Err(CombatError::BattleConcluded),
            _ => return Err(CombatError::NotAwaitingInput),
        }

        let first_new = self.log.len();
        let round = self.round();
        self.foe.begin_batch();
        for _ in 0..self.turns.opponent {
            let roll = strike(&self.foe, &mut self.hero, 1.0, &self.config.damage, dice);
            let text = describe_hit(&self.foe.name, &self.hero.name, "attacks", roll.amount, roll.crit);
            self.record(
                round,
                Actor::Opponent,
                ActionKind::Attack,
                EffectOutcome {
                    damage: roll.amount,
                    crit: roll.crit,
                    healed: 0,
                },
                text,
            );
            if self.hero.is_defeated() {
                self.conclude_with(Outcome::Defeat);
                return Ok(self.log.entries()[first_new..].to_vec());
            }
        }

        self.batches_done += 1;
        self.open_player_batch();
        Ok(self.log.entries()[first_new..].to_vec())
    }

    /// Package the finished battle, rolling loot on victory
    pub fn conclude(self, pity: &mut LootPity, dice: &mut impl Dice) -> Result<BattleResolution> {
        let outcome = self.phase.outcome().ok_or(CombatError::BattleInProgress)?;
        let record = BattleRecord {
            battle_id: self.battle_id,
            outcome,
            rounds: self.round(),
            hit_round_cap: false,
            log: self.log,
            hp_after: self.hero.hp,
            companion_cooldowns: self.companion.map(|c| c.remaining_cooldowns()),
        };
        Ok(Settlement::new(self.config, self.catalog).settle(
            &self.player,
            &self.opponent,
            record,
            pity,
            dice,
        ))
    }

    fn ensure_awaiting(&self) -> Result<()> {
        match self.phase {
            Phase::AwaitingPlayerAction => Ok(()),
            Phase::Concluded(_) => Err(CombatError::BattleConcluded),
            _ => Err(CombatError::NotAwaitingInput),
        }
    }

    fn validate(&self, action: &PlayerAction) -> Result<()> {
        match action {
            PlayerAction::Attack | PlayerAction::Defend | PlayerAction::Flee { .. } => Ok(()),
            PlayerAction::UseSkill { id } => {
                let slot = self
                    .hero
                    .skill(id)
                    .ok_or_else(|| CombatError::UnknownSkill(id.clone()))?;
                if !slot.ready() {
                    return Err(CombatError::OnCooldown {
                        name: slot.spec.name.clone(),
                        remaining: slot.cooldown_remaining,
                    });
                }
                if self.hero.mana < slot.spec.mana_cost {
                    return Err(CombatError::InsufficientMana {
                        required: slot.spec.mana_cost,
                        available: self.hero.mana,
                    });
                }
                Ok(())
            }
            PlayerAction::UseItem { id } => {
                if self.item_quantity(id) == 0 {
                    return Err(CombatError::ItemUnavailable(id.clone()));
                }
                Ok(())
            }
            PlayerAction::UseAbility { id } => {
                let ability = self.ability(id)?;
                let remaining = self.ability_cooldowns.get(id).copied().unwrap_or(0);
                if remaining > 0 {
                    return Err(CombatError::OnCooldown {
                        name: ability.name.clone(),
                        remaining,
                    });
                }
                if self.spirit_charges < ability.charge_cost {
                    return Err(CombatError::InsufficientCharges {
                        required: ability.charge_cost,
                        available: self.spirit_charges,
                    });
                }
                Ok(())
            }
        }
    }

    fn ability(&self, id: &str) -> Result<&AbilitySpec> {
        self.player
            .abilities
            .iter()
            .find(|ability| ability.id == id)
            .ok_or_else(|| CombatError::UnknownAbility(id.to_string()))
    }

    fn companion_turn(&mut self, round: u32, dice: &mut impl Dice) {
        let Some(companion) = self.companion.as_mut() else {
            return;
        };
        let action = companion.act(
            self.hero.effective(Stat::Speed),
            &mut self.foe,
            &self.config.battle,
            &self.config.damage,
            dice,
        );
        self.record(
            round,
            Actor::Companion,
            action.kind,
            EffectOutcome {
                damage: action.damage,
                crit: action.crit,
                healed: 0,
            },
            action.text,
        );
    }

    fn record(&mut self, round: u32, actor: Actor, kind: ActionKind, outcome: EffectOutcome, text: String) {
        self.log.record(
            LoggedAction {
                round,
                actor,
                kind,
                damage: outcome.damage,
                crit: outcome.crit,
                healed: outcome.healed,
                text,
            },
            self.hero.hp,
            self.foe.hp,
        );
    }

    fn describe_use(&self, name: &str, outcome: EffectOutcome) -> String {
        let mut text = format!("{} uses {}", self.hero.name, name);
        if outcome.damage > 0 {
            text.push_str(&format!(", dealing {} damage to {}", outcome.damage, self.foe.name));
            if outcome.crit {
                text.push_str(" (critical)");
            }
        }
        if outcome.healed > 0 {
            text.push_str(&format!(", recovering {} hp", outcome.healed));
        }
        text.push('.');
        text
    }

    fn finish_player_action(&mut self) {
        self.actions_left = self.actions_left.saturating_sub(1);
        if self.actions_left == 0 {
            self.batches_done += 1;
            self.phase = Phase::OpponentActing;
        } else {
            self.phase = Phase::AwaitingPlayerAction;
        }
    }

    fn open_player_batch(&mut self) {
        self.hero.begin_batch();
        for turns in self.ability_cooldowns.values_mut() {
            *turns = turns.saturating_sub(1);
        }
        self.actions_left = self.turns.player;
        self.phase = Phase::AwaitingPlayerAction;
    }

    fn conclude_with(&mut self, outcome: Outcome) {
        self.phase = Phase::Concluded(outcome);
        self.actions_left = 0;
        debug!(battle = %self.battle_id.0, ?outcome, round = self.round(), "interactive battle ended");
    }
}

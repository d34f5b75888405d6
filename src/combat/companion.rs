//! Companion unit behavior
//!
//! A companion acts right after each player action. It either attacks or
//! fires a random ready skill; affection and level make skills likelier.

use std::collections::BTreeMap;

use crate::combat::exchange::strike_with_power;
use crate::combat::log::{describe_hit, ActionKind};
use crate::combat::snapshot::CompanionSnapshot;
use crate::combat::unit::BattleUnit;
use crate::core::config::{BattleConfig, DamageConfig};
use crate::core::rng::Dice;
use crate::core::types::sanitize;

/// What the companion did on its turn
#[derive(Debug, Clone, PartialEq)]
pub struct CompanionAction {
    pub kind: ActionKind,
    pub damage: u32,
    pub crit: bool,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct CompanionState {
    snapshot: CompanionSnapshot,
    cooldowns: BTreeMap<String, u32>,
}

impl CompanionState {
    pub fn new(snapshot: CompanionSnapshot) -> Self {
        let cooldowns = snapshot.cooldowns.clone();
        Self {
            snapshot,
            cooldowns,
        }
    }

    pub fn name(&self) -> &str {
        &self.snapshot.name
    }

    /// Attack power after level and affection scaling
    pub fn attack_power(&self, config: &BattleConfig) -> f64 {
        let level = self.snapshot.level as f64;
        let affection = sanitize(self.snapshot.affection).min(100.0);
        sanitize(self.snapshot.attack)
            * (1.0 + config.companion_level_attack * level)
            * (1.0 + affection / config.companion_affection_scale)
    }

    /// Probability of reaching for a skill this turn
    pub fn skill_chance(&self, config: &BattleConfig) -> f64 {
        let affection = sanitize(self.snapshot.affection).min(100.0);
        let level = self.snapshot.level as f64;
        (config.companion_skill_base
            + affection / config.companion_skill_affection_scale
            + level / config.companion_skill_level_scale)
            .min(config.companion_skill_cap)
    }

    pub fn cooldown(&self, skill_id: &str) -> u32 {
        self.cooldowns.get(skill_id).copied().unwrap_or(0)
    }

    /// Cooldowns still running; finished ones are omitted
    pub fn remaining_cooldowns(&self) -> BTreeMap<String, u32> {
        self.cooldowns
            .iter()
            .filter(|(_, turns)| **turns > 0)
            .map(|(id, turns)| (id.clone(), *turns))
            .collect()
    }

    /// Take one turn against `opponent`
    pub fn act(
        &mut self,
        player_speed: f64,
        opponent: &mut BattleUnit,
        battle: &BattleConfig,
        damage: &DamageConfig,
        dice: &mut impl Dice,
    ) -> CompanionAction {
        for turns in self.cooldowns.values_mut() {
            *turns = turns.saturating_sub(1);
        }

        let power = self.attack_power(battle);
        let wants_skill = dice.chance(self.skill_chance(battle));
        let ready: Vec<usize> = self
            .snapshot
            .skills
            .iter()
            .enumerate()
            .filter(|(_, s)| self.cooldown(&s.id) == 0)
            .map(|(i, _)| i)
            .collect();

        if wants_skill && !ready.is_empty() {
            let skill = self.snapshot.skills[ready[dice.pick_index(ready.len())]].clone();
            let roll = strike_with_power(
                power * skill.multiplier.max(0.0),
                player_speed,
                opponent,
                damage,
                dice,
            );
            self.cooldowns.insert(skill.id.clone(), skill.cooldown);
            let verb = format!("unleashes {} on", skill.name);
            return CompanionAction {
                kind: ActionKind::CompanionSkill(skill.id),
                damage: roll.amount,
                crit: roll.crit,
                text: describe_hit(&self.snapshot.name, &opponent.name, &verb, roll.amount, roll.crit),
            };
        }

        let roll = strike_with_power(power, player_speed, opponent, damage, dice);
        CompanionAction {
            kind: ActionKind::Attack,
            damage: roll.amount,
            crit: roll.crit,
            text: describe_hit(&self.snapshot.name, &opponent.name, "bites", roll.amount, roll.crit),
        }
    }
}

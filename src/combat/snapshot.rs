//! Read-only combatant views supplied by the caller
//!
//! Stats arrive already aggregated from equipment and inventory. The engine
//! never mutates a snapshot; it derives a `BattleUnit` from it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::effects::Effect;
use crate::core::types::TierIndex;

/// A technique the player can use in interactive battles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSpec {
    pub id: String,
    pub name: String,
    pub mana_cost: u32,
    /// Turns before the skill can be used again
    pub cooldown: u32,
    pub effects: Vec<Effect>,
}

/// A consumable stack in the battle-scoped inventory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryStack {
    pub id: String,
    pub name: String,
    pub quantity: u32,
    pub effects: Vec<Effect>,
}

/// A bounded-use artifact ability paid for with spirit charges instead of mana
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbilitySpec {
    pub id: String,
    pub name: String,
    pub charge_cost: u32,
    pub cooldown: u32,
    pub effects: Vec<Effect>,
}

/// A companion skill: a stronger hit on a cooldown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionSkill {
    pub id: String,
    pub name: String,
    /// Multiple of the companion's attack power
    pub multiplier: f64,
    pub cooldown: u32,
}

/// Equipped pet or familiar
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanionSnapshot {
    pub name: String,
    pub attack: f64,
    pub level: u32,
    /// 0-100
    pub affection: f64,
    #[serde(default)]
    pub skills: Vec<CompanionSkill>,
    /// Cooldowns carried over from earlier battles
    #[serde(default)]
    pub cooldowns: BTreeMap<String, u32>,
}

/// Aggregated view of the player at battle start
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub name: String,
    pub attack: f64,
    pub defense: f64,
    pub hp: u32,
    pub max_hp: u32,
    pub speed: f64,
    pub perception: f64,
    #[serde(default)]
    pub mana: u32,
    #[serde(default)]
    pub max_mana: u32,
    pub tier: TierIndex,
    pub tier_level: u8,
    #[serde(default)]
    pub companion: Option<CompanionSnapshot>,
    #[serde(default)]
    pub techniques: Vec<SkillSpec>,
    #[serde(default)]
    pub inventory: Vec<InventoryStack>,
    #[serde(default)]
    pub abilities: Vec<AbilitySpec>,
    /// Non-stat resource spent by abilities
    #[serde(default)]
    pub spirit_charges: u32,
}

impl CombatantSnapshot {
    /// Minimal snapshot with the core stats filled in
    pub fn new(name: impl Into<String>, tier: TierIndex, tier_level: u8) -> Self {
        Self {
            name: name.into(),
            tier,
            tier_level,
            ..Default::default()
        }
    }

    pub fn with_stats(
        mut self,
        attack: f64,
        defense: f64,
        max_hp: u32,
        speed: f64,
        perception: f64,
    ) -> Self {
        self.attack = attack;
        self.defense = defense;
        self.hp = max_hp;
        self.max_hp = max_hp;
        self.speed = speed;
        self.perception = perception;
        self
    }

    pub fn with_mana(mut self, mana: u32) -> Self {
        self.mana = mana;
        self.max_mana = mana;
        self
    }

    pub fn with_companion(mut self, companion: CompanionSnapshot) -> Self {
        self.companion = Some(companion);
        self
    }
}

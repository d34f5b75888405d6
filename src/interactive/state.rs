//! Phases, player commands and the live view of an interactive battle

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::combat::snapshot::InventoryStack;
use crate::combat::unit::{BattleUnit, Modifier};
use crate::core::types::{BattleId, Outcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "phase", content = "outcome", rename_all = "snake_case")]
pub enum Phase {
    AwaitingPlayerAction,
    /// A player action is being applied
    Resolving,
    /// The player's batch is spent; `advance_opponent` runs the reply
    OpponentActing,
    Concluded(Outcome),
}

impl Phase {
    pub fn is_concluded(self) -> bool {
        matches!(self, Phase::Concluded(_))
    }

    pub fn outcome(self) -> Option<Outcome> {
        match self {
            Phase::Concluded(outcome) => Some(outcome),
            _ => None,
        }
    }
}

/// One discrete player command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PlayerAction {
    Attack,
    Defend,
    UseSkill { id: String },
    UseItem { id: String },
    UseAbility { id: String },
    /// `guaranteed` comes from escape talismans and the like
    Flee { guaranteed: bool },
}

impl PlayerAction {
    pub fn skill(id: impl Into<String>) -> Self {
        PlayerAction::UseSkill { id: id.into() }
    }

    pub fn item(id: impl Into<String>) -> Self {
        PlayerAction::UseItem { id: id.into() }
    }

    pub fn ability(id: impl Into<String>) -> Self {
        PlayerAction::UseAbility { id: id.into() }
    }
}

/// Render-ready state of one combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantView {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub mana: u32,
    pub max_mana: u32,
    pub modifiers: Vec<Modifier>,
    pub is_defending: bool,
}

impl From<&BattleUnit> for CombatantView {
    fn from(unit: &BattleUnit) -> Self {
        Self {
            name: unit.name.clone(),
            hp: unit.hp,
            max_hp: unit.max_hp,
            mana: unit.mana,
            max_mana: unit.max_mana,
            modifiers: unit.modifiers.clone(),
            is_defending: unit.is_defending,
        }
    }
}

/// Serializable snapshot of a live battle, taken after every action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleView {
    pub battle_id: BattleId,
    pub round: u32,
    pub phase: Phase,
    pub actions_remaining: u32,
    pub player: CombatantView,
    pub opponent: CombatantView,
    pub skill_cooldowns: BTreeMap<String, u32>,
    pub ability_cooldowns: BTreeMap<String, u32>,
    pub companion_cooldowns: Option<BTreeMap<String, u32>>,
    pub inventory: Vec<InventoryStack>,
    pub spirit_charges: u32,
    pub flee_chance: f64,
    pub log_len: usize,
}

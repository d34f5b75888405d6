//! Append-only round log
//!
//! One entry per discrete action. Entries are never reordered or removed.

use serde::{Deserialize, Serialize};

use crate::core::ids::IdSequence;
use crate::core::types::Actor;

/// What kind of action produced an entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Defend,
    Skill(String),
    Item(String),
    Ability(String),
    CompanionSkill(String),
    Flee,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundLogEntry {
    pub id: u64,
    pub round: u32,
    pub actor: Actor,
    pub kind: ActionKind,
    pub damage: u32,
    pub crit: bool,
    #[serde(default)]
    pub healed: u32,
    pub text: String,
    pub player_hp: u32,
    pub opponent_hp: u32,
}

/// Details of an action, before it gets an id and hp snapshot
#[derive(Debug, Clone)]
pub struct LoggedAction {
    pub round: u32,
    pub actor: Actor,
    pub kind: ActionKind,
    pub damage: u32,
    pub crit: bool,
    pub healed: u32,
    pub text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RoundLog {
    entries: Vec<RoundLogEntry>,
    ids: IdSequence,
}

impl RoundLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an action with both sides' hp after it resolved
    pub fn record(&mut self, action: LoggedAction, player_hp: u32, opponent_hp: u32) -> &RoundLogEntry {
        let entry = RoundLogEntry {
            id: self.ids.next_id(),
            round: action.round,
            actor: action.actor,
            kind: action.kind,
            damage: action.damage,
            crit: action.crit,
            healed: action.healed,
            text: action.text,
            player_hp,
            opponent_hp,
        };
        tracing::trace!(id = entry.id, round = entry.round, "{}", entry.text);
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn entries(&self) -> &[RoundLogEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&RoundLogEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<RoundLogEntry> {
        self.entries
    }

    /// Total damage dealt by one actor
    pub fn damage_by(&self, actor: Actor) -> u64 {
        self.entries
            .iter()
            .filter(|e| e.actor == actor)
            .map(|e| e.damage as u64)
            .sum()
    }
}

/// Narrative line for a damaging action
pub fn describe_hit(actor_name: &str, target_name: &str, verb: &str, damage: u32, crit: bool) -> String {
    if crit {
        format!(
            "{} {} {} with a critical blow for {} damage!",
            actor_name, verb, target_name, damage
        )
    } else {
        format!("{} {} {} for {} damage.", actor_name, verb, target_name, damage)
    }
}

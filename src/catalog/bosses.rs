//! Fixed-boss roster

use serde::{Deserialize, Serialize};

use crate::catalog::items::{ItemCategory, Rarity};

/// Stats as authored for a boss, before composite-power rescaling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaseStats {
    pub attack: f64,
    pub defense: f64,
    pub max_hp: f64,
    pub speed: f64,
    pub perception: f64,
}

impl BaseStats {
    /// Every stat multiplied by `factor`
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            attack: self.attack * factor,
            defense: self.defense * factor,
            max_hp: self.max_hp * factor,
            speed: self.speed * factor,
            perception: self.perception * factor,
        }
    }
}

/// One entry in a boss's reward table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDrop {
    pub item: String,
    pub category: ItemCategory,
    pub rarity: Rarity,
    pub chance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BossDef {
    pub id: String,
    pub name: String,
    pub title: String,
    /// Tier name; resolved against the ladder when the catalog loads
    pub tier: String,
    pub stats: BaseStats,
    #[serde(default)]
    pub exp_bonus: i64,
    #[serde(default)]
    pub currency_bonus: i64,
    #[serde(default)]
    pub drops: Vec<BossDrop>,
}

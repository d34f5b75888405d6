//! Lootable item templates grouped by category and rarity

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::combat::effects::Effect;

/// Rarity tiers, ordered from most to least common
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Rarity {
    Common,
    Rare,
    Legendary,
    Mythic,
}

impl Rarity {
    pub const ALL: [Rarity; 4] = [
        Rarity::Common,
        Rarity::Rare,
        Rarity::Legendary,
        Rarity::Mythic,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Next rarity down, if any
    pub fn downgrade(self) -> Option<Rarity> {
        match self {
            Rarity::Common => None,
            Rarity::Rare => Some(Rarity::Common),
            Rarity::Legendary => Some(Rarity::Rare),
            Rarity::Mythic => Some(Rarity::Legendary),
        }
    }
}

/// Equipment slot an item occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentSlot {
    Weapon,
    Armor,
    Accessory,
    Ring,
    Artifact,
}

/// Loot categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Herb,
    Pill,
    Material,
    Weapon,
    Armor,
    Accessory,
    Ring,
    Artifact,
    Recipe,
}

impl ItemCategory {
    pub const ALL: [ItemCategory; 9] = [
        ItemCategory::Herb,
        ItemCategory::Pill,
        ItemCategory::Material,
        ItemCategory::Weapon,
        ItemCategory::Armor,
        ItemCategory::Accessory,
        ItemCategory::Ring,
        ItemCategory::Artifact,
        ItemCategory::Recipe,
    ];

    pub fn slot(self) -> Option<EquipmentSlot> {
        match self {
            ItemCategory::Weapon => Some(EquipmentSlot::Weapon),
            ItemCategory::Armor => Some(EquipmentSlot::Armor),
            ItemCategory::Accessory => Some(EquipmentSlot::Accessory),
            ItemCategory::Ring => Some(EquipmentSlot::Ring),
            ItemCategory::Artifact => Some(EquipmentSlot::Artifact),
            _ => None,
        }
    }

    pub fn is_equipment(self) -> bool {
        self.slot().is_some()
    }

    /// Categories whose rare drops may carry revive charges
    pub fn can_carry_revives(self) -> bool {
        matches!(self, ItemCategory::Weapon | ItemCategory::Artifact)
    }
}

/// A catalog entry as authored in the data files
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub name: String,
    pub category: ItemCategory,
    pub rarity: Rarity,
    #[serde(default)]
    pub effects: Vec<Effect>,
}

/// Read-only index of templates by (category, rarity)
#[derive(Debug, Clone, Default)]
pub struct ItemPools {
    pools: AHashMap<(ItemCategory, Rarity), Vec<ItemTemplate>>,
}

impl ItemPools {
    pub fn from_templates(templates: Vec<ItemTemplate>) -> Self {
        let mut pools: AHashMap<(ItemCategory, Rarity), Vec<ItemTemplate>> = AHashMap::new();
        for template in templates {
            pools
                .entry((template.category, template.rarity))
                .or_default()
                .push(template);
        }
        Self { pools }
    }

    pub fn pool(&self, category: ItemCategory, rarity: Rarity) -> &[ItemTemplate] {
        self.pools
            .get(&(category, rarity))
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Look a template up by exact name
    pub fn find(&self, name: &str) -> Option<&ItemTemplate> {
        self.pools.values().flatten().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.pools.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

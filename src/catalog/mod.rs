//! Read-only content tables consumed by the engine
//!
//! Tiers, bosses, item pools and opponent names are authored in TOML.
//! The built-in set lives in `data/catalog.toml`.

pub mod bosses;
pub mod items;
pub mod tiers;

pub use bosses::{BaseStats, BossDef, BossDrop};
pub use items::{EquipmentSlot, ItemCategory, ItemPools, ItemTemplate, Rarity};
pub use tiers::{TierDef, TierLadder};

use std::path::Path;

use serde::Deserialize;

use crate::core::error::{CombatError, Result};
use crate::core::types::TierIndex;

const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.toml");

/// Static opponent names per activity kind
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NamePools {
    pub ordinary: Vec<String>,
    pub lucky: Vec<String>,
    pub secret_realm: Vec<String>,
    pub faction: Vec<String>,
    pub titles: Vec<String>,
}

/// On-disk layout of a catalog document
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    tiers: Vec<TierDef>,
    #[serde(default)]
    bosses: Vec<BossDef>,
    #[serde(default)]
    items: Vec<ItemTemplate>,
    #[serde(default)]
    names: NamePools,
}

/// All lookup data the engine needs
#[derive(Debug, Clone)]
pub struct Catalog {
    pub tiers: TierLadder,
    pub bosses: Vec<BossDef>,
    pub items: ItemPools,
    pub names: NamePools,
}

impl Catalog {
    /// The content shipped with the crate
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_CATALOG)
    }

    /// Parse a catalog document
    ///
    /// Fails on an empty tier table or a boss pointing at an unknown tier.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(content)?;
        let tiers = TierLadder::new(file.tiers)?;

        for boss in &file.bosses {
            tiers.index_of(&boss.tier)?;
        }

        tracing::debug!(
            tiers = tiers.len(),
            bosses = file.bosses.len(),
            items = file.items.len(),
            "catalog loaded"
        );

        Ok(Self {
            tiers,
            bosses: file.bosses,
            items: ItemPools::from_templates(file.items),
            names: file.names,
        })
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    pub fn boss(&self, id: &str) -> Result<&BossDef> {
        self.bosses
            .iter()
            .find(|b| b.id == id)
            .ok_or_else(|| CombatError::UnknownBoss(id.to_string()))
    }

    pub fn boss_tier(&self, boss: &BossDef) -> Result<TierIndex> {
        self.tiers.index_of(&boss.tier)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_loads() {
        let catalog = Catalog::builtin().unwrap();
        assert_eq!(catalog.tiers.len(), 9);
        assert!(!catalog.bosses.is_empty());
        assert!(!catalog.names.ordinary.is_empty());

        // Every category has common stock so loot never comes up empty
        for category in ItemCategory::ALL {
            assert!(
                !catalog.items.pool(category, Rarity::Common).is_empty(),
                "{:?} has no common items",
                category
            );
        }
    }

    #[test]
    fn test_catalog_file_matches_builtin() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/catalog.toml");
        let catalog = Catalog::from_file(path).unwrap();
        assert_eq!(catalog.tiers.len(), Catalog::builtin().unwrap().tiers.len());
        assert!(matches!(
            Catalog::from_file("no/such/catalog.toml"),
            Err(CombatError::IoError(_))
        ));
    }

    #[test]
    fn test_reward_multipliers_grow_sub_linearly() {
        let catalog = Catalog::builtin().unwrap();
        let multipliers: Vec<f64> = catalog.tiers.iter().map(|t| t.reward_multiplier).collect();
        for pair in multipliers.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        // Geometric growth would put the top tier far beyond 10x
        assert!(*multipliers.last().unwrap() < 10.0);
    }

    #[test]
    fn test_boss_tiers_resolve() {
        let catalog = Catalog::builtin().unwrap();
        for boss in &catalog.bosses {
            assert!(catalog.boss_tier(boss).is_ok());
        }
        assert!(matches!(
            catalog.boss("no_such_boss"),
            Err(CombatError::UnknownBoss(_))
        ));
    }

    #[test]
    fn test_empty_tier_table_rejected() {
        let result = Catalog::from_toml_str("[names]\nordinary = [\"Scavenger\"]\n");
        assert!(matches!(result, Err(CombatError::EmptyTierTable)));
    }

    #[test]
    fn test_boss_with_unknown_tier_rejected() {
        let doc = r#"
            [[tiers]]
            name = "Qi Refining"
            baseline_perception = 10.0
            reward_multiplier = 1.0

            [[bosses]]
            id = "ghost"
            name = "Ghost"
            title = "the Unlisted"
            tier = "Heavenly Emperor"
            stats = { attack = 1.0, defense = 1.0, max_hp = 1.0, speed = 1.0, perception = 1.0 }
        "#;
        assert!(matches!(
            Catalog::from_toml_str(doc),
            Err(CombatError::UnknownTier(_))
        ));
    }
}

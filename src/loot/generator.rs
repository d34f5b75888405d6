//! Victory loot
//!
//! Each battle draws a strength-scaled number of items. Names already
//! drawn this battle are excluded; an exhausted pool degrades to a lower
//! rarity, then to duplicates, then to fewer items.

use ahash::AHashSet;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{BossDef, Catalog, EquipmentSlot, ItemCategory, ItemTemplate, Rarity};
use crate::combat::effects::Effect;
use crate::core::config::LootConfig;
use crate::core::rng::Dice;
use crate::core::types::{sanitize, TierIndex};
use crate::loot::category::CategoryPicker;
use crate::loot::pity::LootPity;
use crate::loot::rarity::{rarity_weights, roll_rarity};
use crate::opponent::activity::{ActivityKind, RiskLevel};
use crate::opponent::generator::OpponentDescriptor;

/// A generated reward item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LootItem {
    pub name: String,
    pub category: ItemCategory,
    pub rarity: Rarity,
    #[serde(default)]
    pub effects: Vec<Effect>,
    pub slot: Option<EquipmentSlot>,
    pub revive_charges: Option<u32>,
}

/// Identity used for de-duplication within one battle
pub type LootKey = (String, Rarity, Option<EquipmentSlot>);

impl LootItem {
    pub fn key(&self) -> LootKey {
        (self.name.clone(), self.rarity, self.slot)
    }
}

fn template_key(template: &ItemTemplate) -> LootKey {
    (
        template.name.clone(),
        template.rarity,
        template.category.slot(),
    )
}

/// Everything the loot roll depends on
#[derive(Debug, Clone, PartialEq)]
pub struct LootRequest {
    pub strength_multiplier: f64,
    pub activity: ActivityKind,
    pub risk: Option<RiskLevel>,
    pub player_tier: TierIndex,
    pub boss_id: Option<String>,
}

impl LootRequest {
    pub fn for_opponent(opponent: &OpponentDescriptor, player_tier: TierIndex) -> Self {
        Self {
            strength_multiplier: opponent.strength_multiplier,
            activity: opponent.activity.kind(),
            risk: opponent.activity.risk(),
            player_tier,
            boss_id: opponent.boss_id.clone(),
        }
    }

    fn needs_rarity_floor(&self) -> bool {
        self.activity == ActivityKind::ApexBoss || self.risk == Some(RiskLevel::Extreme)
    }
}

pub struct LootGenerator<'a> {
    config: &'a LootConfig,
    catalog: &'a Catalog,
}

impl<'a> LootGenerator<'a> {
    pub fn new(config: &'a LootConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Items to draw for an opponent of the given strength
    pub fn item_count(&self, strength_multiplier: f64, dice: &mut impl Dice) -> usize {
        let cfg = self.config;
        let max = cfg.max_items.max(1) as usize;
        let steps = ((sanitize(strength_multiplier) - cfg.count_strength_base)
            / cfg.count_strength_step
            + 1e-9)
            .floor()
            .max(0.0);
        let mut count = (1 + steps.min(max as f64) as usize).min(max);
        if dice.chance(cfg.extra_item_chance) {
            count = (count + 1).min(max);
        }
        count
    }

    /// Roll the loot for one victory and update the pity counter
    pub fn generate(
        &self,
        request: &LootRequest,
        pity: &mut LootPity,
        dice: &mut impl Dice,
    ) -> Vec<LootItem> {
        let weights = rarity_weights(
            self.config,
            request.player_tier,
            request.activity,
            request.risk,
            pity.bonus(self.config),
        );
        let target = self.item_count(request.strength_multiplier, dice);
        let mut picker = CategoryPicker::new(self.config.equipment_streak_penalty);
        let mut items: Vec<LootItem> = Vec::with_capacity(target);
        let mut seen: AHashSet<LootKey> = AHashSet::new();

        for _ in 0..target {
            let rarity = roll_rarity(&weights, dice);
            let category = picker.pick(dice);
            match self.draw(category, rarity, &seen, dice) {
                Some(item) => {
                    seen.insert(item.key());
                    items.push(item);
                }
                None => warn!(?category, ?rarity, "loot pool empty, yielding fewer items"),
            }
        }

        if request.needs_rarity_floor() {
            self.ensure_rarity_floor(&mut items, dice);
        }

        if let Some(boss) = request
            .boss_id
            .as_deref()
            .and_then(|id| self.catalog.boss(id).ok())
        {
            self.merge_boss_drops(boss, &mut items, dice);
        }

        let reset = pity.record(&items);
        debug!(
            count = items.len(),
            target,
            pity = pity.misses,
            reset,
            "loot generated"
        );
        items
    }

    /// Pick one item; unused names first, lower rarities next, duplicates last
    fn draw(
        &self,
        category: ItemCategory,
        rarity: Rarity,
        seen: &AHashSet<LootKey>,
        dice: &mut impl Dice,
    ) -> Option<LootItem> {
        let mut current = Some(rarity);
        while let Some(r) = current {
            let fresh: Vec<&ItemTemplate> = self
                .catalog
                .items
                .pool(category, r)
                .iter()
                .filter(|t| !seen.contains(&template_key(t)))
                .collect();
            if !fresh.is_empty() {
                if r != rarity {
                    debug!(?category, from = ?rarity, to = ?r, "loot rarity downgraded");
                }
                let template = fresh[dice.pick_index(fresh.len())];
                return Some(self.instantiate(template, dice));
            }
            current = r.downgrade();
        }

        let mut current = Some(rarity);
        while let Some(r) = current {
            let pool = self.catalog.items.pool(category, r);
            if !pool.is_empty() {
                debug!(?category, rarity = ?r, "loot pool exhausted, allowing duplicate");
                let template = &pool[dice.pick_index(pool.len())];
                return Some(self.instantiate(template, dice));
            }
            current = r.downgrade();
        }
        None
    }

    fn instantiate(&self, template: &ItemTemplate, dice: &mut impl Dice) -> LootItem {
        LootItem {
            name: template.name.clone(),
            category: template.category,
            rarity: template.rarity,
            effects: template.effects.clone(),
            slot: template.category.slot(),
            revive_charges: self.roll_revives(template.category, template.rarity, dice),
        }
    }

    fn roll_revives(
        &self,
        category: ItemCategory,
        rarity: Rarity,
        dice: &mut impl Dice,
    ) -> Option<u32> {
        if !category.can_carry_revives() {
            return None;
        }
        let chance = match rarity {
            Rarity::Legendary => self.config.legendary_revive_chance,
            Rarity::Mythic => self.config.mythic_revive_chance,
            _ => return None,
        };
        if dice.chance(chance) {
            Some(dice.range_inclusive(1, self.config.max_revive_charges.max(1)))
        } else {
            None
        }
    }

    /// Swap the last item for a rare one when nothing rare-or-better dropped
    fn ensure_rarity_floor(&self, items: &mut Vec<LootItem>, dice: &mut impl Dice) {
        if items.iter().any(|item| item.rarity >= Rarity::Rare) {
            return;
        }
        let seen: AHashSet<LootKey> = items
            .iter()
            .take(items.len().saturating_sub(1))
            .map(LootItem::key)
            .collect();
        let preferred = items.last().map(|item| item.category);
        let categories = preferred.into_iter().chain(ItemCategory::ALL);

        for category in categories {
            let fresh: Vec<&ItemTemplate> = self
                .catalog
                .items
                .pool(category, Rarity::Rare)
                .iter()
                .filter(|t| !seen.contains(&template_key(t)))
                .collect();
            if fresh.is_empty() {
                continue;
            }
            let item = self.instantiate(fresh[dice.pick_index(fresh.len())], dice);
            debug!(item = %item.name, "rarity floor applied");
            match items.last_mut() {
                Some(last) => *last = item,
                None => items.push(item),
            }
            return;
        }
        warn!("no rare items in catalog, rarity floor skipped");
    }

    fn merge_boss_drops(&self, boss: &BossDef, items: &mut Vec<LootItem>, dice: &mut impl Dice) {
        for drop in &boss.drops {
            if !dice.chance(drop.chance) {
                continue;
            }
            let effects = self
                .catalog
                .items
                .find(&drop.item)
                .map(|t| t.effects.clone())
                .unwrap_or_default();
            let item = LootItem {
                name: drop.item.clone(),
                category: drop.category,
                rarity: drop.rarity,
                effects,
                slot: drop.category.slot(),
                revive_charges: self.roll_revives(drop.category, drop.rarity, dice),
            };
            if items.iter().any(|existing| existing.key() == item.key()) {
                continue;
            }
            items.push(item);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn request(strength: f64) -> LootRequest {
        LootRequest {
            strength_multiplier: strength,
            activity: ActivityKind::Ordinary,
            risk: None,
            player_tier: TierIndex(0),
            boss_id: None,
        }
    }

    #[test]
    fn test_item_count_scales_with_strength() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let mut no_extra = ScriptedDice::constant(0.9);
        assert_eq!(generator.item_count(0.5, &mut no_extra), 1);
        assert_eq!(generator.item_count(0.85, &mut no_extra), 1);
        assert_eq!(generator.item_count(1.0, &mut no_extra), 2);
        assert_eq!(generator.item_count(1.2, &mut no_extra), 3);
        assert_eq!(generator.item_count(9.0, &mut no_extra), 4);
        assert_eq!(generator.item_count(f64::NAN, &mut no_extra), 1);

        let mut extra = ScriptedDice::constant(0.0);
        assert_eq!(generator.item_count(1.0, &mut extra), 3);
        assert_eq!(generator.item_count(9.0, &mut extra), 4);
    }

    /// Every template of `category` at or below `rarity` is among `keys`
    fn exhausted(catalog: &Catalog, keys: &[LootKey], category: ItemCategory, rarity: Rarity) -> bool {
        Rarity::ALL
            .iter()
            .filter(|r| **r <= rarity)
            .flat_map(|r| catalog.items.pool(category, *r))
            .all(|t| keys.contains(&template_key(t)))
    }

    #[test]
    fn test_duplicates_only_from_exhausted_pools() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let mut pity = LootPity::new();
        for _ in 0..300 {
            let items = generator.generate(&request(2.0), &mut pity, &mut rng);
            assert!(!items.is_empty() && items.len() <= 4);
            let keys: Vec<LootKey> = items.iter().map(LootItem::key).collect();
            for (i, item) in items.iter().enumerate() {
                if keys[..i].contains(&keys[i]) {
                    assert!(
                        exhausted(&catalog, &keys[..i], item.category, item.rarity),
                        "{} repeated while its pool still had fresh entries",
                        item.name
                    );
                }
            }
        }
    }

    #[test]
    fn test_empty_rarity_pool_downgrades() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        assert!(catalog.items.pool(ItemCategory::Recipe, Rarity::Mythic).is_empty());
        let mut dice = ScriptedDice::constant(0.0);
        let item = generator
            .draw(ItemCategory::Recipe, Rarity::Mythic, &AHashSet::new(), &mut dice)
            .unwrap();
        assert!(item.rarity < Rarity::Mythic);
        assert_eq!(item.category, ItemCategory::Recipe);
    }

    #[test]
    fn test_exhausted_pool_allows_duplicates() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let seen: AHashSet<LootKey> = ItemCategory::ALL
            .iter()
            .flat_map(|c| Rarity::ALL.iter().map(move |r| (*c, *r)))
            .flat_map(|(c, r)| catalog.items.pool(c, r).iter().map(template_key))
            .collect();
        let mut dice = ScriptedDice::constant(0.0);
        let item = generator.draw(ItemCategory::Herb, Rarity::Common, &seen, &mut dice);
        assert!(item.is_some());
    }

    #[test]
    fn test_empty_catalog_yields_nothing() {
        let cfg = LootConfig::default();
        let catalog = Catalog::from_toml_str(
            r#"
            [[tiers]]
            name = "Mortal"
            baseline_perception = 5.0
            reward_multiplier = 1.0
            "#,
        )
        .unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let mut pity = LootPity::new();
        let items = generator.generate(&request(1.5), &mut pity, &mut ScriptedDice::constant(0.3));
        assert!(items.is_empty());
        assert_eq!(pity.misses, 1);
    }

    #[test]
    fn test_boss_victory_always_has_rare() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut pity = LootPity::new();
        let boss_request = LootRequest {
            strength_multiplier: 0.9,
            activity: ActivityKind::ApexBoss,
            risk: None,
            player_tier: TierIndex(0),
            boss_id: Some("hollow_matriarch".into()),
        };
        for _ in 0..100 {
            let items = generator.generate(&boss_request, &mut pity, &mut rng);
            assert!(items.iter().any(|i| i.rarity >= Rarity::Rare));
        }
    }

    #[test]
    fn test_rarity_floor_replaces_last_item() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let common = catalog.items.pool(ItemCategory::Herb, Rarity::Common)[0].clone();
        let mut items = vec![generator.instantiate(&common, &mut ScriptedDice::constant(0.0))];
        generator.ensure_rarity_floor(&mut items, &mut ScriptedDice::constant(0.0));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].rarity, Rarity::Rare);
        assert_eq!(items[0].category, ItemCategory::Herb);
    }

    #[test]
    fn test_revives_only_on_rare_weapons_and_artifacts() {
        let cfg = LootConfig::default();
        let catalog = Catalog::builtin().unwrap();
        let generator = LootGenerator::new(&cfg, &catalog);
        let mut always = ScriptedDice::constant(0.0);
        assert_eq!(
            generator.roll_revives(ItemCategory::Weapon, Rarity::Mythic, &mut always),
            Some(1)
        );
        assert_eq!(
            generator.roll_revives(ItemCategory::Armor, Rarity::Mythic, &mut always),
            None
        );
        assert_eq!(
            generator.roll_revives(ItemCategory::Artifact, Rarity::Rare, &mut always),
            None
        );
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..200 {
            if let Some(charges) =
                generator.roll_revives(ItemCategory::Artifact, Rarity::Legendary, &mut rng)
            {
                assert!((1..=3).contains(&charges));
            }
        }
    }
}

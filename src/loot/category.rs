//! Weighted category selection with an equipment streak penalty

use crate::catalog::ItemCategory;
use crate::core::rng::Dice;

pub fn category_weight(category: ItemCategory) -> f64 {
    match category {
        ItemCategory::Herb => 20.0,
        ItemCategory::Pill => 18.0,
        ItemCategory::Material => 18.0,
        ItemCategory::Weapon => 10.0,
        ItemCategory::Armor => 10.0,
        ItemCategory::Accessory => 7.0,
        ItemCategory::Ring => 6.0,
        ItemCategory::Artifact => 5.0,
        ItemCategory::Recipe => 6.0,
    }
}

/// Picks categories for one battle's loot
///
/// After an equipment pick, equipment weights are multiplied by the
/// penalty for the very next pick only.
#[derive(Debug, Clone)]
pub struct CategoryPicker {
    penalty: f64,
    after_equipment: bool,
}

impl CategoryPicker {
    pub fn new(penalty: f64) -> Self {
        Self {
            penalty,
            after_equipment: false,
        }
    }

    pub fn weights(&self) -> [f64; 9] {
        ItemCategory::ALL.map(|category| {
            let weight = category_weight(category);
            if self.after_equipment && category.is_equipment() {
                weight * self.penalty
            } else {
                weight
            }
        })
    }

    pub fn pick(&mut self, dice: &mut impl Dice) -> ItemCategory {
        let category = dice
            .weighted_index(&self.weights())
            .map(|index| ItemCategory::ALL[index])
            .unwrap_or(ItemCategory::Herb);
        self.after_equipment = category.is_equipment();
        category
    }
}

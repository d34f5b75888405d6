//! Cross-battle bad-luck protection

use serde::{Deserialize, Serialize};

use crate::catalog::Rarity;
use crate::core::config::LootConfig;
use crate::loot::LootItem;

/// Victories in a row without a legendary-or-better drop
///
/// Owned and persisted by the caller; the engine only reads and updates it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LootPity {
    pub misses: u32,
}

impl LootPity {
    pub fn new() -> Self {
        Self::default()
    }

    /// Extra legendary weight earned so far
    pub fn bonus(&self, config: &LootConfig) -> f64 {
        (self.misses as f64 * config.pity_step).min(config.pity_cap)
    }

    /// Update after a victory; returns true when the drop reset the counter
    pub fn record(&mut self, items: &[LootItem]) -> bool {
        if items.iter().any(|item| item.rarity >= Rarity::Legendary) {
            self.misses = 0;
            true
        } else {
            self.misses = self.misses.saturating_add(1);
            false
        }
    }
}

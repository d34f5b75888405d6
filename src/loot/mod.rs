//! Loot generation: rarity and category rolls, de-duplication and pity

pub mod category;
pub mod generator;
pub mod pity;
pub mod rarity;

pub use category::CategoryPicker;
pub use generator::{LootGenerator, LootItem, LootKey, LootRequest};
pub use pity::LootPity;
pub use rarity::{rarity_weights, roll_rarity};

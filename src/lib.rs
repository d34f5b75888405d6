//! Realm Combat - battle resolution for a cultivation wasteland RPG
//!
//! Generates opponents scaled to the player, resolves battles either in one
//! pass or one player action at a time, and settles loot and rewards.

pub mod catalog;
pub mod combat;
pub mod core;
pub mod encounter;
pub mod interactive;
pub mod loot;
pub mod opponent;
pub mod resolution;
pub mod rewards;

pub use crate::catalog::Catalog;
pub use crate::combat::CombatantSnapshot;
pub use crate::core::{CombatError, Dice, EngineConfig, Outcome, Result, ScriptedDice};
pub use crate::encounter::Encounter;
pub use crate::interactive::{BattleView, InteractiveBattle, Phase, PlayerAction};
pub use crate::loot::{LootItem, LootPity};
pub use crate::opponent::{Activity, OpponentDescriptor, RiskLevel};
pub use crate::resolution::BattleResolution;

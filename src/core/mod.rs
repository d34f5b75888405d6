pub mod config;
pub mod error;
pub mod ids;
pub mod rng;
pub mod types;

pub use config::EngineConfig;
pub use error::{CombatError, Result};
pub use rng::{Dice, ScriptedDice};
pub use types::{Actor, BattleId, Outcome, Side, Stat, TierIndex};

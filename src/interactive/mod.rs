//! Interactive battles: one player command at a time

pub mod session;
pub mod state;

pub use session::InteractiveBattle;
pub use state::{BattleView, CombatantView, Phase, PlayerAction};

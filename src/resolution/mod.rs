//! Turning a generated opponent into a finished battle

pub mod auto;
pub mod replay;

pub use auto::AutoResolver;
pub use replay::{BattleRecord, BattleResolution, Settlement};

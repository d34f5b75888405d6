pub mod action_economy;
pub mod companion;
pub mod damage;
pub mod effects;
pub mod exchange;
pub mod log;
pub mod snapshot;
pub mod unit;

pub use action_economy::{allowance, ActionAllowance};
pub use companion::{CompanionAction, CompanionState};
pub use damage::{roll_damage, DamageRoll};
pub use effects::{BuffEffect, DamageEffect, DebuffEffect, Effect, HealEffect};
pub use log::{ActionKind, RoundLog, RoundLogEntry};
pub use snapshot::{
    AbilitySpec, CombatantSnapshot, CompanionSkill, CompanionSnapshot, InventoryStack, SkillSpec,
};
pub use unit::{BattleUnit, Modifier, SkillSlot};

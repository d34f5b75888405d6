//! Opponent generation: activities, strength tiers, stats and names

pub mod activity;
pub mod generator;
pub mod name_service;
pub mod names;
pub mod strength;

pub use activity::{Activity, ActivityKind, RiskLevel};
pub use generator::{composite_power, GenerationTrace, OpponentDescriptor, OpponentGenerator};
pub use name_service::TemplateNameClient;
pub use names::{NameRequest, NameSource, StaticNames};
pub use strength::StrengthTier;

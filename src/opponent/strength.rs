//! Strength tiers and their per-activity odds

use serde::{Deserialize, Serialize};

use crate::core::rng::Dice;
use crate::opponent::activity::ActivityKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrengthTier {
    Weak,
    Normal,
    Tough,
}

impl StrengthTier {
    pub fn multiplier(self) -> f64 {
        match self {
            StrengthTier::Weak => 0.85,
            StrengthTier::Normal => 1.0,
            StrengthTier::Tough => 1.2,
        }
    }

    /// Range the per-stat variance is sampled from
    pub fn variance_band(self) -> (f64, f64) {
        match self {
            StrengthTier::Weak => (0.90, 1.00),
            StrengthTier::Normal => (0.95, 1.05),
            StrengthTier::Tough => (1.00, 1.15),
        }
    }

    /// Composite-power ratio range for fixed bosses
    pub fn boss_ratio_band(self) -> (f64, f64) {
        match self {
            StrengthTier::Weak => (0.9, 1.1),
            StrengthTier::Normal => (1.1, 1.4),
            StrengthTier::Tough => (1.4, 1.8),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StrengthTier::Weak => "weak",
            StrengthTier::Normal => "normal",
            StrengthTier::Tough => "tough",
        }
    }
}

/// Weak / normal / tough odds for an activity
pub fn strength_odds(kind: ActivityKind) -> [f64; 3] {
    match kind {
        ActivityKind::Ordinary => [0.30, 0.55, 0.15],
        ActivityKind::Lucky => [0.55, 0.40, 0.05],
        ActivityKind::SecretRealm => [0.20, 0.50, 0.30],
        ActivityKind::FactionChallenge => [0.10, 0.50, 0.40],
        ActivityKind::ApexBoss => [0.15, 0.55, 0.30],
    }
}

pub fn roll_strength(kind: ActivityKind, dice: &mut impl Dice) -> StrengthTier {
    match dice.weighted_index(&strength_odds(kind)) {
        Some(0) => StrengthTier::Weak,
        Some(2) => StrengthTier::Tough,
        _ => StrengthTier::Normal,
    }
}

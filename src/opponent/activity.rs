//! Activity descriptors: what kind of encounter the player walked into

use serde::{Deserialize, Serialize};

use crate::core::config::ActivityConfig;
use crate::core::types::TierIndex;

/// Intensity dial for risk-leveled areas
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Extreme,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Extreme,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn strength_scale(self, config: &ActivityConfig) -> f64 {
        config.risk_strength[self.index()]
    }

    pub fn reward_multiplier(self, config: &ActivityConfig) -> f64 {
        config.risk_reward[self.index()]
    }
}

/// Encounter type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Activity {
    /// Everyday exploration at the player's own tier
    Ordinary,
    /// Low-risk exploration; opponents may come from one tier down
    Lucky,
    /// Risk-leveled secret area with a declared minimum tier
    SecretRealm {
        #[serde(default)]
        risk: RiskLevel,
        /// Defaults to the player's own tier
        #[serde(default)]
        min_tier: Option<TierIndex>,
    },
    /// Challenge a faction leader one or two tiers up
    FactionChallenge,
    /// Fixed boss from the roster
    ApexBoss { boss_id: String },
}

/// Discriminant-only view used for table lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    Ordinary,
    Lucky,
    SecretRealm,
    FactionChallenge,
    ApexBoss,
}

impl Activity {
    pub fn kind(&self) -> ActivityKind {
        match self {
            Activity::Ordinary => ActivityKind::Ordinary,
            Activity::Lucky => ActivityKind::Lucky,
            Activity::SecretRealm { .. } => ActivityKind::SecretRealm,
            Activity::FactionChallenge => ActivityKind::FactionChallenge,
            Activity::ApexBoss { .. } => ActivityKind::ApexBoss,
        }
    }

    /// Risk level, only for risk-leveled activities
    pub fn risk(&self) -> Option<RiskLevel> {
        match self {
            Activity::SecretRealm { risk, .. } => Some(*risk),
            _ => None,
        }
    }

    pub fn difficulty(&self, config: &ActivityConfig) -> f64 {
        match self.kind() {
            ActivityKind::Ordinary => config.ordinary_difficulty,
            ActivityKind::Lucky => config.lucky_difficulty,
            ActivityKind::SecretRealm => config.secret_realm_difficulty,
            ActivityKind::FactionChallenge => config.faction_difficulty,
            ActivityKind::ApexBoss => config.apex_boss_difficulty,
        }
    }
}

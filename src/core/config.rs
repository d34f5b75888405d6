//! Engine configuration with documented constants
//!
//! All balance numbers are collected here with explanations of their purpose
//! and how they interact with each other. The config is passed explicitly to
//! every subsystem; there is no global instance.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{CombatError, Result};

/// Top-level engine configuration
///
/// These values have been tuned so an even fight lasts 3-8 rounds.
/// Changing them will affect pacing and reward inflation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub damage: DamageConfig,
    pub action_economy: ActionEconomyConfig,
    pub activity: ActivityConfig,
    pub opponent: OpponentConfig,
    pub battle: BattleConfig,
    pub loot: LootConfig,
    pub rewards: RewardConfig,
}

/// Damage curve and crit tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DamageConfig {
    /// Curve constant for `power * (1 - m / (m + power * k))`
    ///
    /// At 0.5, mitigation equal to half the attacker's power halves damage.
    /// Mitigation never fully nullifies damage.
    pub mitigation_k: f64,

    /// Lower bound of the uniform damage roll
    pub variance_min: f64,

    /// Upper bound of the uniform damage roll
    pub variance_max: f64,

    /// Minimum damage as a fraction of attacker power
    pub floor_ratio: f64,

    /// Crit chance before the speed bonus
    pub base_crit_chance: f64,

    /// Largest crit bonus from owning the whole speed share
    pub speed_crit_bonus: f64,

    /// Hard cap on total crit chance
    pub crit_chance_cap: f64,

    /// Damage multiplier on a crit
    pub crit_multiplier: f64,

    /// Extra effective defense while defending (0.5 = +50%)
    pub defend_bonus: f64,
}

impl Default for DamageConfig {
    fn default() -> Self {
        Self {
            mitigation_k: 0.5,
            variance_min: 0.9,
            variance_max: 1.1,
            floor_ratio: 0.15,
            base_crit_chance: 0.10,
            speed_crit_bonus: 0.10,
            crit_chance_cap: 0.20,
            crit_multiplier: 1.5,
            defend_bonus: 0.5,
        }
    }
}

/// Actions-per-round tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionEconomyConfig {
    /// Weight of speed in action power
    pub speed_weight: f64,

    /// Weight of perception in action power
    pub perception_weight: f64,

    /// Relative advantage needed per extra action (0.5 = every +50%)
    pub advantage_step: f64,

    /// Most actions one side can take before control passes
    pub max_actions: u32,
}

impl Default for ActionEconomyConfig {
    fn default() -> Self {
        Self {
            speed_weight: 0.6,
            perception_weight: 0.4,
            advantage_step: 0.5,
            max_actions: 5,
        }
    }
}

/// Per-activity difficulty and risk scaling
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivityConfig {
    pub ordinary_difficulty: f64,
    pub lucky_difficulty: f64,
    pub secret_realm_difficulty: f64,
    pub faction_difficulty: f64,

    /// Bosses are balanced by composite power; this stays at 1.0
    pub apex_boss_difficulty: f64,

    /// Opponent strength scale per risk level (low, medium, high, extreme)
    pub risk_strength: [f64; 4],

    /// Reward multiplier per risk level (low, medium, high, extreme)
    pub risk_reward: [f64; 4],
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            ordinary_difficulty: 1.0,
            lucky_difficulty: 0.85,
            secret_realm_difficulty: 1.1,
            faction_difficulty: 1.25,
            apex_boss_difficulty: 1.0,
            risk_strength: [0.9, 1.0, 1.15, 1.3],
            risk_reward: [1.0, 1.3, 1.7, 2.2],
        }
    }
}

/// Opponent generation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OpponentConfig {
    /// Opponent base attack as a fraction of player attack
    pub attack_ratio: f64,

    /// Opponent base defense as a fraction of player defense
    pub defense_ratio: f64,

    /// Flat attack added per tier-level
    pub attack_per_level: f64,

    /// Flat defense added per tier-level
    pub defense_per_level: f64,

    /// Opponent hp range as a fraction of player max hp
    ///
    /// 70-90% keeps an even fight inside the 3-8 round band.
    pub hp_ratio_min: f64,
    pub hp_ratio_max: f64,

    /// Opponent speed range as a fraction of player speed
    pub speed_ratio_min: f64,
    pub speed_ratio_max: f64,

    /// Share of player perception in the opponent's perception blend
    ///
    /// The rest comes from the tier's baseline perception.
    pub perception_player_weight: f64,

    /// Stat factor per tier the opponent sits above the player
    pub tier_step_up: f64,

    /// Stat factor per tier the opponent sits below the player
    pub tier_step_down: f64,

    /// Strength reduction per tier the player exceeds an area's minimum
    pub suppression_per_tier: f64,

    /// Largest tier-suppression reduction
    pub suppression_cap: f64,

    /// Chance a faction leader sits two tiers up instead of one
    pub faction_two_tier_chance: f64,

    /// Rare chance a faction leader is clamped back to the player's tier
    pub faction_floor_chance: f64,

    /// Chance a lucky encounter comes from one tier below the player
    pub lucky_downshift_chance: f64,

    /// Boss composite power band relative to the player
    pub boss_ratio_min: f64,
    pub boss_ratio_max: f64,

    /// Attack ratio above which opponent hp is trimmed
    pub hp_adjust_high_ratio: f64,

    /// Attack ratio below which opponent hp is padded
    pub hp_adjust_low_ratio: f64,

    /// Size of the hp trim/pad
    pub hp_adjust: f64,

    pub min_attack: f64,
    pub min_defense: f64,
    pub min_hp: u32,
    pub min_speed: f64,
    pub min_perception: f64,

    /// Chance to ask the external name service for a name
    pub external_name_chance: f64,
}

impl Default for OpponentConfig {
    fn default() -> Self {
        Self {
            attack_ratio: 0.6,
            defense_ratio: 0.6,
            attack_per_level: 2.0,
            defense_per_level: 1.5,
            hp_ratio_min: 0.7,
            hp_ratio_max: 0.9,
            speed_ratio_min: 0.85,
            speed_ratio_max: 1.15,
            perception_player_weight: 0.6,
            tier_step_up: 1.2,
            tier_step_down: 0.85,
            suppression_per_tier: 0.2,
            suppression_cap: 0.6,
            faction_two_tier_chance: 0.3,
            faction_floor_chance: 0.05,
            lucky_downshift_chance: 0.5,
            boss_ratio_min: 0.9,
            boss_ratio_max: 1.8,
            hp_adjust_high_ratio: 1.2,
            hp_adjust_low_ratio: 0.8,
            hp_adjust: 0.1,
            min_attack: 8.0,
            min_defense: 6.0,
            min_hp: 40,
            min_speed: 1.0,
            min_perception: 1.0,
            external_name_chance: 0.15,
        }
    }
}

/// Battle loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleConfig {
    /// Hard round cap for auto-resolution
    pub round_cap: u32,

    /// Flee chance at an even speed share
    pub flee_base: f64,

    /// Flee chance gained per unit of speed share above 0.5
    pub flee_speed_weight: f64,

    pub flee_min: f64,
    pub flee_max: f64,

    /// Companion attack bonus per companion level
    pub companion_level_attack: f64,

    /// Affection that doubles companion attack
    pub companion_affection_scale: f64,

    /// Companion skill chance before affection and level
    pub companion_skill_base: f64,

    /// Affection per +1.0 skill chance
    pub companion_skill_affection_scale: f64,

    /// Levels per +1.0 skill chance
    pub companion_skill_level_scale: f64,

    /// Hard cap on companion skill chance
    pub companion_skill_cap: f64,
}

impl Default for BattleConfig {
    fn default() -> Self {
        Self {
            round_cap: 40,
            flee_base: 0.4,
            flee_speed_weight: 0.4,
            flee_min: 0.2,
            flee_max: 0.8,
            companion_level_attack: 0.02,
            companion_affection_scale: 200.0,
            companion_skill_base: 0.2,
            companion_skill_affection_scale: 400.0,
            companion_skill_level_scale: 200.0,
            companion_skill_cap: 0.7,
        }
    }
}

/// Weights for the four rarity tiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RarityWeights {
    pub common: f64,
    pub rare: f64,
    pub legendary: f64,
    pub mythic: f64,
}

impl RarityWeights {
    pub const fn new(common: f64, rare: f64, legendary: f64, mythic: f64) -> Self {
        Self {
            common,
            rare,
            legendary,
            mythic,
        }
    }

    pub fn as_array(&self) -> [f64; 4] {
        [self.common, self.rare, self.legendary, self.mythic]
    }
}

/// Loot generation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LootConfig {
    /// Starting rarity weights before tier, activity and risk shifts
    pub base_weights: RarityWeights,

    /// Largest tier bonus per rarity (common is ignored)
    pub tier_bonus_caps: RarityWeights,

    /// Diminishing-returns base: bonus = cap * (1 - decay^tier)
    pub tier_bonus_decay: f64,

    /// Common weight never drops below this
    pub common_floor: f64,

    /// Strength multiplier that still yields a single item
    pub count_strength_base: f64,

    /// Strength per additional guaranteed item
    pub count_strength_step: f64,

    /// Chance of one bonus item on top of the strength count
    pub extra_item_chance: f64,

    pub max_items: u32,

    /// Weight factor on equipment categories right after an equipment pick
    pub equipment_streak_penalty: f64,

    pub legendary_revive_chance: f64,
    pub mythic_revive_chance: f64,
    pub max_revive_charges: u32,

    /// Legendary weight added per victory without a legendary-or-better drop
    pub pity_step: f64,

    pub pity_cap: f64,
}

impl Default for LootConfig {
    fn default() -> Self {
        Self {
            base_weights: RarityWeights::new(70.0, 22.0, 6.5, 1.5),
            tier_bonus_caps: RarityWeights::new(0.0, 10.0, 6.0, 2.5),
            tier_bonus_decay: 0.75,
            common_floor: 10.0,
            count_strength_base: 0.8,
            count_strength_step: 0.2,
            extra_item_chance: 0.25,
            max_items: 4,
            equipment_streak_penalty: 0.5,
            legendary_revive_chance: 0.06,
            mythic_revive_chance: 0.12,
            max_revive_charges: 3,
            pity_step: 1.0,
            pity_cap: 5.0,
        }
    }
}

/// Experience and currency tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    pub base_exp: f64,
    pub base_currency: f64,

    /// Reward gained per tier-level above 1 (0.1 = +10% each)
    pub level_step: f64,

    /// Defeat loss as a fraction of the matching victory gain
    pub defeat_ratio: f64,

    pub min_exp_loss: i64,
    pub min_currency_loss: i64,

    /// Strength multiplier is clamped into this range before scaling rewards
    pub strength_min: f64,
    pub strength_max: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            base_exp: 50.0,
            base_currency: 30.0,
            level_step: 0.1,
            defeat_ratio: 0.55,
            min_exp_loss: 5,
            min_currency_loss: 3,
            strength_min: 0.5,
            strength_max: 2.0,
        }
    }
}

impl EngineConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let d = &self.damage;
        if d.mitigation_k <= 0.0 {
            return Err(invalid("damage.mitigation_k must be positive"));
        }
        if d.variance_min <= 0.0 || d.variance_min > d.variance_max {
            return Err(invalid(format!(
                "damage variance range ({}, {}) is not ordered",
                d.variance_min, d.variance_max
            )));
        }
        if !(0.0..=1.0).contains(&d.crit_chance_cap) || d.base_crit_chance > d.crit_chance_cap {
            return Err(invalid("crit chances must satisfy base <= cap <= 1"));
        }

        if self.action_economy.max_actions == 0 {
            return Err(invalid("action_economy.max_actions must be at least 1"));
        }
        if self.action_economy.advantage_step <= 0.0 {
            return Err(invalid("action_economy.advantage_step must be positive"));
        }

        let o = &self.opponent;
        if o.hp_ratio_min > o.hp_ratio_max || o.speed_ratio_min > o.speed_ratio_max {
            return Err(invalid("opponent ratio ranges must be ordered"));
        }
        if o.boss_ratio_min <= 0.0 || o.boss_ratio_min > o.boss_ratio_max {
            return Err(invalid(format!(
                "boss ratio band ({}, {}) is not ordered",
                o.boss_ratio_min, o.boss_ratio_max
            )));
        }
        if !(0.0..1.0).contains(&o.suppression_cap) {
            return Err(invalid("opponent.suppression_cap must be in [0, 1)"));
        }

        if self.battle.round_cap == 0 {
            return Err(invalid("battle.round_cap must be at least 1"));
        }
        if self.battle.flee_min > self.battle.flee_max {
            return Err(invalid("battle flee bounds are not ordered"));
        }

        if self.loot.max_items == 0 {
            return Err(invalid("loot.max_items must be at least 1"));
        }
        if self.loot.count_strength_step <= 0.0 {
            return Err(invalid("loot.count_strength_step must be positive"));
        }

        let r = &self.rewards;
        if !(0.0..=1.0).contains(&r.defeat_ratio) {
            return Err(invalid("rewards.defeat_ratio must be in [0, 1]"));
        }
        if r.min_exp_loss < 1 || r.min_currency_loss < 1 {
            return Err(invalid("minimum defeat losses must be positive"));
        }

        Ok(())
    }
}

fn invalid(message: impl Into<String>) -> CombatError {
    CombatError::InvalidConfig(message.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            [battle]
            round_cap = 25

            [damage]
            crit_multiplier = 2.0
            "#,
        )
        .unwrap();
        assert_eq!(config.battle.round_cap, 25);
        assert_eq!(config.damage.crit_multiplier, 2.0);
        assert_eq!(config.damage.mitigation_k, 0.5);
        assert_eq!(config.action_economy.max_actions, 5);
    }

    #[test]
    fn test_missing_config_file_is_io_error() {
        let err = EngineConfig::from_file("no/such/engine.toml").unwrap_err();
        assert!(matches!(err, CombatError::IoError(_)));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_inverted_variance_rejected() {
        let mut config = EngineConfig::default();
        config.damage.variance_min = 1.2;
        assert!(matches!(
            config.validate(),
            Err(CombatError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_round_cap_rejected() {
        let result = EngineConfig::from_toml_str("[battle]\nround_cap = 0\n");
        assert!(result.is_err());
    }
}

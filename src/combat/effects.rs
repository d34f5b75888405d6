//! Typed effect payloads shared by skills, consumables, abilities and loot

use serde::{Deserialize, Serialize};

use crate::core::types::Stat;

/// Deal damage as a multiple of the user's attack power
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DamageEffect {
    pub multiplier: f64,
}

/// Restore hp: flat amount plus a fraction of max hp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealEffect {
    #[serde(default)]
    pub amount: u32,
    #[serde(default)]
    pub ratio: f64,
}

impl HealEffect {
    pub fn amount_for(&self, max_hp: u32) -> u32 {
        let scaled = (max_hp as f64 * self.ratio.max(0.0)).round() as u32;
        self.amount.saturating_add(scaled)
    }
}

/// Raise one of the holder's stats by a fraction
///
/// `duration: None` means permanent (equipment bonuses).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BuffEffect {
    pub stat: Stat,
    pub magnitude: f64,
    #[serde(default)]
    pub duration: Option<u32>,
}

/// Lower one of the target's stats by a fraction for a number of turns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebuffEffect {
    pub stat: Stat,
    pub magnitude: f64,
    pub duration: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Effect {
    Damage(DamageEffect),
    Heal(HealEffect),
    Buff(BuffEffect),
    Debuff(DebuffEffect),
}

impl Effect {
    pub fn damage(multiplier: f64) -> Self {
        Effect::Damage(DamageEffect { multiplier })
    }

    pub fn heal(amount: u32) -> Self {
        Effect::Heal(HealEffect { amount, ratio: 0.0 })
    }

    pub fn buff(stat: Stat, magnitude: f64, duration: u32) -> Self {
        Effect::Buff(BuffEffect {
            stat,
            magnitude,
            duration: Some(duration),
        })
    }

    pub fn debuff(stat: Stat, magnitude: f64, duration: u32) -> Self {
        Effect::Debuff(DebuffEffect {
            stat,
            magnitude,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heal_combines_flat_and_ratio() {
        let heal = HealEffect {
            amount: 20,
            ratio: 0.1,
        };
        assert_eq!(heal.amount_for(500), 70);
    }

    #[test]
    fn test_effect_tagged_serialization() {
        let effect = Effect::buff(Stat::Attack, 0.2, 3);
        let json = serde_json::to_string(&effect).unwrap();
        assert!(json.contains("\"kind\":\"buff\""));
        let back: Effect = serde_json::from_str(&json).unwrap();
        assert_eq!(back, effect);
    }
}

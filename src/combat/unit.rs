//! Mutable per-battle combatant state

use serde::{Deserialize, Serialize};

use crate::combat::effects::Effect;
use crate::combat::snapshot::{CombatantSnapshot, SkillSpec};
use crate::core::types::{sanitize, Stat};

/// Effective stats never drop below this fraction of base
const MIN_STAT_FACTOR: f64 = 0.1;

/// Active buff (positive) or debuff (negative)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Modifier {
    pub id: String,
    pub stat: Stat,
    pub magnitude: f64,
    /// Batches left; `None` lasts for the rest of the battle
    pub remaining: Option<u32>,
}

/// A usable skill with its live cooldown
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillSlot {
    pub spec: SkillSpec,
    pub cooldown_remaining: u32,
}

impl SkillSlot {
    pub fn ready(&self) -> bool {
        self.cooldown_remaining == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleUnit {
    pub name: String,
    pub hp: u32,
    pub max_hp: u32,
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
    pub perception: f64,
    pub mana: u32,
    pub max_mana: u32,
    pub modifiers: Vec<Modifier>,
    pub skills: Vec<SkillSlot>,
    pub is_defending: bool,
}

impl BattleUnit {
    /// Fresh unit at full hp with sanitized stats
    pub fn new(
        name: impl Into<String>,
        attack: f64,
        defense: f64,
        max_hp: u32,
        speed: f64,
        perception: f64,
    ) -> Self {
        let max_hp = max_hp.max(1);
        Self {
            name: name.into(),
            hp: max_hp,
            max_hp,
            attack: sanitize(attack),
            defense: sanitize(defense),
            speed: sanitize(speed),
            perception: sanitize(perception),
            mana: 0,
            max_mana: 0,
            modifiers: Vec::new(),
            skills: Vec::new(),
            is_defending: false,
        }
    }

    /// Working copy of the player's snapshot
    pub fn from_snapshot(snapshot: &CombatantSnapshot) -> Self {
        let mut unit = Self::new(
            snapshot.name.clone(),
            snapshot.attack,
            snapshot.defense,
            snapshot.max_hp,
            snapshot.speed,
            snapshot.perception,
        );
        unit.hp = snapshot.hp.min(unit.max_hp);
        unit.max_mana = snapshot.max_mana.max(snapshot.mana);
        unit.mana = snapshot.mana;
        unit.skills = snapshot
            .techniques
            .iter()
            .cloned()
            .map(|spec| SkillSlot {
                spec,
                cooldown_remaining: 0,
            })
            .collect();
        unit
    }

    pub fn is_defeated(&self) -> bool {
        self.hp == 0
    }

    /// Base stat scaled by active modifiers
    pub fn effective(&self, stat: Stat) -> f64 {
        let base = match stat {
            Stat::Attack => self.attack,
            Stat::Defense => self.defense,
            Stat::Speed => self.speed,
            Stat::Perception => self.perception,
        };
        let shift: f64 = self
            .modifiers
            .iter()
            .filter(|m| m.stat == stat)
            .map(|m| m.magnitude)
            .sum();
        base * (1.0 + shift).max(MIN_STAT_FACTOR)
    }

    /// Defense used against incoming hits
    pub fn mitigation(&self, defend_bonus: f64) -> f64 {
        let defense = self.effective(Stat::Defense);
        if self.is_defending {
            defense * (1.0 + defend_bonus)
        } else {
            defense
        }
    }

    /// Apply damage, clamped at 0; returns the hp actually lost
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let lost = amount.min(self.hp);
        self.hp -= lost;
        lost
    }

    /// Restore hp, clamped at max; returns the hp actually gained
    pub fn heal(&mut self, amount: u32) -> u32 {
        let gained = amount.min(self.max_hp - self.hp);
        self.hp += gained;
        gained
    }

    pub fn add_modifier(&mut self, modifier: Modifier) {
        self.modifiers.push(modifier);
    }

    /// Apply a self-targeted effect (heal or buff); returns hp healed
    pub fn apply_to_self(&mut self, source: &str, effect: &Effect) -> u32 {
        match effect {
            Effect::Heal(heal) => self.heal(heal.amount_for(self.max_hp)),
            Effect::Buff(buff) => {
                self.add_modifier(Modifier {
                    id: source.to_string(),
                    stat: buff.stat,
                    magnitude: buff.magnitude.abs(),
                    remaining: buff.duration,
                });
                0
            }
            Effect::Damage(_) | Effect::Debuff(_) => 0,
        }
    }

    /// Called when this unit's action batch begins
    ///
    /// Ticks modifier durations and skill cooldowns and drops the defend stance.
    pub fn begin_batch(&mut self) {
        self.is_defending = false;
        for modifier in self.modifiers.iter_mut() {
            if let Some(remaining) = modifier.remaining.as_mut() {
                *remaining = remaining.saturating_sub(1);
            }
        }
        self.modifiers.retain(|m| m.remaining != Some(0));
        for slot in self.skills.iter_mut() {
            slot.cooldown_remaining = slot.cooldown_remaining.saturating_sub(1);
        }
    }

    pub fn skill(&self, id: &str) -> Option<&SkillSlot> {
        self.skills.iter().find(|s| s.spec.id == id)
    }

    pub fn skill_mut(&mut self, id: &str) -> Option<&mut SkillSlot> {
        self.skills.iter_mut().find(|s| s.spec.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::effects::HealEffect;

    fn unit() -> BattleUnit {
        BattleUnit::new("Test", 50.0, 30.0, 100, 20.0, 10.0)
    }

    #[test]
    fn test_hp_clamped() {
        let mut u = unit();
        assert_eq!(u.take_damage(250), 100);
        assert_eq!(u.hp, 0);
        assert!(u.is_defeated());
        assert_eq!(u.heal(500), 100);
        assert_eq!(u.hp, 100);
    }

    #[test]
    fn test_modifiers_scale_effective_stats() {
        let mut u = unit();
        u.add_modifier(Modifier {
            id: "pill".into(),
            stat: Stat::Attack,
            magnitude: 0.2,
            remaining: Some(2),
        });
        u.add_modifier(Modifier {
            id: "curse".into(),
            stat: Stat::Attack,
            magnitude: -0.5,
            remaining: Some(1),
        });
        assert!((u.effective(Stat::Attack) - 35.0).abs() < 1e-9);

        u.begin_batch();
        assert_eq!(u.modifiers.len(), 1);
        assert!((u.effective(Stat::Attack) - 60.0).abs() < 1e-9);

        u.begin_batch();
        assert!(u.modifiers.is_empty());
    }

    #[test]
    fn test_stacked_debuffs_floor() {
        let mut u = unit();
        u.add_modifier(Modifier {
            id: "a".into(),
            stat: Stat::Defense,
            magnitude: -2.0,
            remaining: None,
        });
        assert!((u.effective(Stat::Defense) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_defend_boosts_mitigation_until_next_batch() {
        let mut u = unit();
        u.is_defending = true;
        assert!((u.mitigation(0.5) - 45.0).abs() < 1e-9);
        u.begin_batch();
        assert!((u.mitigation(0.5) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_snapshot_coercion() {
        let mut snapshot = CombatantSnapshot::default();
        snapshot.attack = f64::NAN;
        snapshot.hp = 10;
        snapshot.max_hp = 0;
        let u = BattleUnit::from_snapshot(&snapshot);
        assert_eq!(u.attack, 0.0);
        assert_eq!(u.max_hp, 1);
        assert_eq!(u.hp, 1);
    }

    #[test]
    fn test_apply_heal_effect() {
        let mut u = unit();
        u.take_damage(60);
        let healed = u.apply_to_self(
            "herb",
            &Effect::Heal(HealEffect {
                amount: 10,
                ratio: 0.2,
            }),
        );
        assert_eq!(healed, 30);
        assert_eq!(u.hp, 70);
    }
}

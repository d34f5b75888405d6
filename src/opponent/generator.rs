//! Opponent generation
//!
//! Stats are derived from the player's snapshot: a base fraction of the
//! player's stats plus a per-level bonus, scaled by tier gap, activity
//! difficulty and a rolled strength tier. Fixed bosses are instead
//! rescaled so their composite power lands in a band around the player's.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::catalog::{BaseStats, Catalog};
use crate::combat::snapshot::CombatantSnapshot;
use crate::combat::unit::BattleUnit;
use crate::core::config::{EngineConfig, OpponentConfig};
use crate::core::error::Result;
use crate::core::rng::Dice;
use crate::core::types::{clamp_tier_level, sanitize, TierIndex};
use crate::opponent::activity::{Activity, ActivityKind};
use crate::opponent::names::{pick_static_name, pick_title, NameRequest, NameSource};
use crate::opponent::strength::{roll_strength, StrengthTier};

/// Composite power weights: attack, defense, hp, speed, perception
const POWER_WEIGHTS: [f64; 5] = [1.0, 0.8, 0.15, 0.6, 0.4];

/// Single number summarizing how dangerous a stat block is
pub fn composite_power(stats: &BaseStats) -> f64 {
    POWER_WEIGHTS[0] * sanitize(stats.attack)
        + POWER_WEIGHTS[1] * sanitize(stats.defense)
        + POWER_WEIGHTS[2] * sanitize(stats.max_hp)
        + POWER_WEIGHTS[3] * sanitize(stats.speed)
        + POWER_WEIGHTS[4] * sanitize(stats.perception)
}

/// The player's stats in the same shape as an authored stat block
pub fn player_stats(player: &CombatantSnapshot) -> BaseStats {
    BaseStats {
        attack: sanitize(player.attack),
        defense: sanitize(player.defense),
        max_hp: player.max_hp as f64,
        speed: sanitize(player.speed),
        perception: sanitize(player.perception),
    }
}

/// Intermediate values kept for inspection and tests
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationTrace {
    /// Stats before tier, difficulty and variance scaling
    pub base_attack: f64,
    pub base_defense: f64,
    pub base_hp: f64,
    pub tier_gap: i32,
    pub gap_factor: f64,
    pub suppression: f64,
    pub difficulty: f64,
    /// Factor applied to hp after comparing attack against the player
    pub hp_adjustment: f64,
}

/// A generated opponent, ready to become a battle unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpponentDescriptor {
    pub name: String,
    pub title: Option<String>,
    pub tier: TierIndex,
    pub tier_name: String,
    pub attack: f64,
    pub defense: f64,
    pub max_hp: u32,
    pub speed: f64,
    pub perception: f64,
    pub strength: StrengthTier,
    /// How strongly the opponent was scaled relative to the player;
    /// feeds loot count and reward scaling
    pub strength_multiplier: f64,
    pub activity: Activity,
    pub boss_id: Option<String>,
    pub trace: GenerationTrace,
}

impl OpponentDescriptor {
    pub fn display_name(&self) -> String {
        match &self.title {
            Some(title) => format!("{} {}", self.name, title),
            None => self.name.clone(),
        }
    }

    pub fn stats(&self) -> BaseStats {
        BaseStats {
            attack: self.attack,
            defense: self.defense,
            max_hp: self.max_hp as f64,
            speed: self.speed,
            perception: self.perception,
        }
    }

    pub fn to_unit(&self) -> BattleUnit {
        BattleUnit::new(
            self.display_name(),
            self.attack,
            self.defense,
            self.max_hp,
            self.speed,
            self.perception,
        )
    }
}

pub struct OpponentGenerator<'a> {
    config: &'a EngineConfig,
    catalog: &'a Catalog,
}

impl<'a> OpponentGenerator<'a> {
    pub fn new(config: &'a EngineConfig, catalog: &'a Catalog) -> Self {
        Self { config, catalog }
    }

    /// Generate an opponent, consulting `names` for a flavored name
    ///
    /// The name service is only asked occasionally and never for bosses.
    /// Errors from it are logged and the static name is kept.
    pub async fn generate<D: Dice + Send>(
        &self,
        player: &CombatantSnapshot,
        activity: &Activity,
        dice: &mut D,
        names: &dyn NameSource,
    ) -> Result<OpponentDescriptor> {
        let mut opponent = self.generate_stats(player, activity, dice)?;
        if opponent.boss_id.is_some() || !dice.chance(self.config.opponent.external_name_chance)
        {
            return Ok(opponent);
        }

        let request = NameRequest {
            activity: activity.kind(),
            tier_name: opponent.tier_name.clone(),
            strength: opponent.strength,
            fallback: opponent.name.clone(),
        };
        match names.generate_name(&request).await {
            Ok(Some(name)) => {
                debug!(name = %name, fallback = %opponent.name, "external opponent name");
                opponent.name = name;
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, fallback = %opponent.name, "name service failed, keeping static name");
            }
        }
        Ok(opponent)
    }

    /// Generate an opponent with a name from the static pools
    pub fn generate_stats(
        &self,
        player: &CombatantSnapshot,
        activity: &Activity,
        dice: &mut impl Dice,
    ) -> Result<OpponentDescriptor> {
        let opponent = match activity {
            Activity::ApexBoss { boss_id } => self.boss(player, activity, boss_id, dice)?,
            _ => self.scaled(player, activity, dice),
        };
        debug!(
            opponent = %opponent.display_name(),
            tier = %opponent.tier_name,
            strength = opponent.strength.label(),
            multiplier = opponent.strength_multiplier,
            "opponent generated"
        );
        Ok(opponent)
    }

    fn opponent_tier(&self, player_tier: TierIndex, activity: &Activity, dice: &mut impl Dice) -> TierIndex {
        let ladder = &self.catalog.tiers;
        let o = &self.config.opponent;
        match activity {
            Activity::Ordinary | Activity::ApexBoss { .. } => player_tier,
            Activity::Lucky => {
                if player_tier > ladder.lowest() && dice.chance(o.lucky_downshift_chance) {
                    player_tier.saturating_down(1)
                } else {
                    player_tier
                }
            }
            Activity::SecretRealm { min_tier, .. } => ladder.clamp(min_tier.unwrap_or(player_tier)),
            Activity::FactionChallenge => {
                if dice.chance(o.faction_floor_chance) {
                    return player_tier;
                }
                let steps = if dice.chance(o.faction_two_tier_chance) { 2 } else { 1 };
                ladder.clamp(TierIndex(player_tier.0 + steps))
            }
        }
    }

    fn scaled(
        &self,
        player: &CombatantSnapshot,
        activity: &Activity,
        dice: &mut impl Dice,
    ) -> OpponentDescriptor {
        let o = &self.config.opponent;
        let kind = activity.kind();
        let me = player_stats(player);
        let level = clamp_tier_level(player.tier_level) as f64;
        let player_tier = self.catalog.tiers.clamp(player.tier);

        let tier = self.opponent_tier(player_tier, activity, dice);
        let tier_gap = tier.gap_from(player_tier);
        let gap_factor = if tier_gap > 0 {
            o.tier_step_up.powi(tier_gap)
        } else if tier_gap < 0 && kind != ActivityKind::SecretRealm {
            o.tier_step_down.powi(-tier_gap)
        } else {
            1.0
        };
        let suppression = if kind == ActivityKind::SecretRealm && tier_gap < 0 {
            (o.suppression_per_tier * (-tier_gap) as f64).min(o.suppression_cap)
        } else {
            0.0
        };

        let strength = roll_strength(kind, dice);
        let risk_scale = activity
            .risk()
            .map_or(1.0, |risk| risk.strength_scale(&self.config.activity));
        let difficulty = activity.difficulty(&self.config.activity)
            * strength.multiplier()
            * risk_scale
            * (1.0 - suppression);

        let base_attack = o.attack_ratio * me.attack + o.attack_per_level * level;
        let base_defense = o.defense_ratio * me.defense + o.defense_per_level * level;
        let base_hp = me.max_hp * dice.between(o.hp_ratio_min, o.hp_ratio_max);
        let speed_roll = dice.between(o.speed_ratio_min, o.speed_ratio_max);
        let tier_def = self.catalog.tiers.get(tier);
        let base_perception = o.perception_player_weight * me.perception
            + (1.0 - o.perception_player_weight) * tier_def.baseline_perception;

        let (low, high) = strength.variance_band();
        let attack = base_attack * gap_factor * difficulty * dice.between(low, high);
        let defense = base_defense * gap_factor * difficulty * dice.between(low, high);
        let perception = base_perception * difficulty * dice.between(low, high);
        let speed = me.speed * speed_roll * gap_factor;
        let hp = base_hp * gap_factor;

        let hp_adjustment = hp_adjustment(attack, me.attack, o);
        let stats = apply_floors(
            BaseStats {
                attack,
                defense,
                max_hp: hp * hp_adjustment,
                speed,
                perception,
            },
            o,
        );

        let name = pick_static_name(&self.catalog.names, kind, dice);
        let title = pick_title(&self.catalog.names, kind, dice);

        OpponentDescriptor {
            name,
            title,
            tier,
            tier_name: tier_def.name.clone(),
            attack: stats.attack,
            defense: stats.defense,
            max_hp: hp_to_u32(stats.max_hp, o),
            speed: stats.speed,
            perception: stats.perception,
            strength,
            strength_multiplier: difficulty * gap_factor,
            activity: activity.clone(),
            boss_id: None,
            trace: GenerationTrace {
                base_attack,
                base_defense,
                base_hp,
                tier_gap,
                gap_factor,
                suppression,
                difficulty,
                hp_adjustment,
            },
        }
    }

    fn boss(
        &self,
        player: &CombatantSnapshot,
        activity: &Activity,
        boss_id: &str,
        dice: &mut impl Dice,
    ) -> Result<OpponentDescriptor> {
        let o = &self.config.opponent;
        let boss = self.catalog.boss(boss_id)?;
        let tier = self.catalog.boss_tier(boss)?;
        let player_tier = self.catalog.tiers.clamp(player.tier);

        let me = player_stats(player);
        let player_power = composite_power(&me).max(f64::EPSILON);
        let authored = composite_power(&boss.stats);

        let strength = roll_strength(ActivityKind::ApexBoss, dice);
        let (low, high) = strength.boss_ratio_band();
        let difficulty = activity.difficulty(&self.config.activity);
        let target = dice.between(low, high) * difficulty;

        let mut stats = if authored > 0.0 {
            boss.stats.scaled(target * player_power / authored)
        } else {
            me.scaled(target)
        };

        let hp_adjustment = hp_adjustment(stats.attack, me.attack, o);
        stats.max_hp *= hp_adjustment;
        stats = apply_floors(stats, o);

        let ratio = composite_power(&stats) / player_power;
        let banded = ratio.clamp(o.boss_ratio_min, o.boss_ratio_max);
        if (banded - ratio).abs() > f64::EPSILON {
            debug!(boss = %boss.id, ratio, banded, "boss power rescaled into band");
            stats = apply_floors(stats.scaled(banded / ratio), o);
        }

        Ok(OpponentDescriptor {
            name: boss.name.clone(),
            title: Some(boss.title.clone()),
            tier,
            tier_name: self.catalog.tiers.get(tier).name.clone(),
            attack: stats.attack,
            defense: stats.defense,
            max_hp: hp_to_u32(stats.max_hp, o),
            speed: stats.speed,
            perception: stats.perception,
            strength,
            strength_multiplier: banded,
            activity: activity.clone(),
            boss_id: Some(boss.id.clone()),
            trace: GenerationTrace {
                base_attack: boss.stats.attack,
                base_defense: boss.stats.defense,
                base_hp: boss.stats.max_hp,
                tier_gap: tier.gap_from(player_tier),
                gap_factor: 1.0,
                suppression: 0.0,
                difficulty: target,
                hp_adjustment,
            },
        })
    }
}

/// Trim hp for hard hitters and pad it for soft ones
fn hp_adjustment(attack: f64, player_attack: f64, o: &OpponentConfig) -> f64 {
    if player_attack <= 0.0 {
        return 1.0;
    }
    let ratio = attack / player_attack;
    if ratio > o.hp_adjust_high_ratio {
        1.0 - o.hp_adjust
    } else if ratio < o.hp_adjust_low_ratio {
        1.0 + o.hp_adjust
    } else {
        1.0
    }
}

fn apply_floors(stats: BaseStats, o: &OpponentConfig) -> BaseStats {
    BaseStats {
        attack: sanitize(stats.attack).max(o.min_attack),
        defense: sanitize(stats.defense).max(o.min_defense),
        max_hp: sanitize(stats.max_hp).max(o.min_hp as f64),
        speed: sanitize(stats.speed).max(o.min_speed),
        perception: sanitize(stats.perception).max(o.min_perception),
    }
}

fn hp_to_u32(hp: f64, o: &OpponentConfig) -> u32 {
    (hp.round().min(u32::MAX as f64) as u32).max(o.min_hp)
}

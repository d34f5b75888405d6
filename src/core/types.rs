//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::rng::Dice;

/// Unique identifier for a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BattleId(pub Uuid);

impl BattleId {
    /// Build an id from the battle's own random source so seeded runs reproduce it
    pub fn from_dice(dice: &mut impl Dice) -> Self {
        let mut bytes = [0u8; 16];
        for byte in bytes.iter_mut() {
            *byte = (dice.roll() * 256.0) as u8;
        }
        Self(uuid::Builder::from_random_bytes(bytes).into_uuid())
    }
}

/// The two sides of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }
}

/// Who performed a logged action
///
/// The companion fights on the player side but is logged separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Actor {
    Player,
    Companion,
    Opponent,
}

impl Actor {
    pub fn side(self) -> Side {
        match self {
            Actor::Player | Actor::Companion => Side::Player,
            Actor::Opponent => Side::Opponent,
        }
    }
}

/// How a battle ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Victory,
    Defeat,
    Fled,
}

impl Outcome {
    pub fn is_victory(self) -> bool {
        self == Outcome::Victory
    }
}

/// Position on the tier ladder (0 = lowest tier)
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct TierIndex(pub usize);

impl TierIndex {
    /// Signed distance from `other` to `self`
    pub fn gap_from(self, other: TierIndex) -> i32 {
        self.0 as i32 - other.0 as i32
    }

    pub fn saturating_down(self, steps: usize) -> TierIndex {
        TierIndex(self.0.saturating_sub(steps))
    }
}

/// Sub-level within a tier
pub const MIN_TIER_LEVEL: u8 = 1;
pub const MAX_TIER_LEVEL: u8 = 10;

/// Coerce a tier-level into the valid 1..=10 range
pub fn clamp_tier_level(level: u8) -> u8 {
    level.clamp(MIN_TIER_LEVEL, MAX_TIER_LEVEL)
}

/// Combat stats a modifier can touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Attack,
    Defense,
    Speed,
    Perception,
}

/// Coerce a possibly-garbage stat into a usable non-negative number
///
/// Partially initialized combatants carry NaN, infinities or negatives;
/// all of them read as 0.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

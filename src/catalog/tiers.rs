//! Tier ladder: the ordered progression stages

use serde::{Deserialize, Serialize};

use crate::core::error::{CombatError, Result};
use crate::core::types::TierIndex;

/// One progression tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TierDef {
    pub name: String,
    /// Perception an average combatant of this tier has
    pub baseline_perception: f64,
    /// Reward scaling; grows sub-linearly up the ladder
    pub reward_multiplier: f64,
}

/// Ordered, non-empty list of tiers (lowest first)
#[derive(Debug, Clone, Serialize)]
pub struct TierLadder {
    tiers: Vec<TierDef>,
}

impl TierLadder {
    /// Build a ladder; an empty table is a broken data collaborator
    pub fn new(tiers: Vec<TierDef>) -> Result<Self> {
        if tiers.is_empty() {
            return Err(CombatError::EmptyTierTable);
        }
        Ok(Self { tiers })
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn lowest(&self) -> TierIndex {
        TierIndex(0)
    }

    pub fn top(&self) -> TierIndex {
        TierIndex(self.tiers.len() - 1)
    }

    /// Pull an out-of-range index back onto the ladder
    pub fn clamp(&self, index: TierIndex) -> TierIndex {
        TierIndex(index.0.min(self.tiers.len() - 1))
    }

    pub fn get(&self, index: TierIndex) -> &TierDef {
        &self.tiers[self.clamp(index).0]
    }

    pub fn index_of(&self, name: &str) -> Result<TierIndex> {
        self.tiers
            .iter()
            .position(|t| t.name.eq_ignore_ascii_case(name))
            .map(TierIndex)
            .ok_or_else(|| CombatError::UnknownTier(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TierDef> {
        self.tiers.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tier(name: &str) -> TierDef {
        TierDef {
            name: name.into(),
            baseline_perception: 10.0,
            reward_multiplier: 1.0,
        }
    }

    #[test]
    fn test_empty_ladder_is_fatal() {
        assert!(matches!(
            TierLadder::new(vec![]),
            Err(CombatError::EmptyTierTable)
        ));
    }

    #[test]
    fn test_clamp_and_lookup() {
        let ladder = TierLadder::new(vec![tier("Qi Refining"), tier("Core Formation")]).unwrap();
        assert_eq!(ladder.top(), TierIndex(1));
        assert_eq!(ladder.clamp(TierIndex(7)), TierIndex(1));
        assert_eq!(ladder.get(TierIndex(9)).name, "Core Formation");
        assert_eq!(ladder.index_of("core formation").unwrap(), TierIndex(1));
        assert!(matches!(
            ladder.index_of("Nascent Soul"),
            Err(CombatError::UnknownTier(_))
        ));
    }
}

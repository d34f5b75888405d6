//! Opponent naming
//!
//! Names come from the catalog's static pools. A `NameSource` can supply
//! flavored names instead; any failure from it falls back to the pools.

use async_trait::async_trait;
use serde::Serialize;

use crate::catalog::NamePools;
use crate::core::error::Result;
use crate::core::rng::Dice;
use crate::opponent::activity::ActivityKind;
use crate::opponent::strength::StrengthTier;

/// What a name source is told about the opponent it is naming
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NameRequest {
    pub activity: ActivityKind,
    pub tier_name: String,
    pub strength: StrengthTier,
    pub fallback: String,
}

/// Somewhere flavored opponent names can come from
#[async_trait]
pub trait NameSource: Send + Sync {
    /// `Ok(None)` means "no opinion, use the static name"
    async fn generate_name(&self, request: &NameRequest) -> Result<Option<String>>;
}

/// Never produces a name; the generator keeps its static pick
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticNames;

#[async_trait]
impl NameSource for StaticNames {
    async fn generate_name(&self, _request: &NameRequest) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Pick a name from the pool for `kind`
pub fn pick_static_name(pools: &NamePools, kind: ActivityKind, dice: &mut impl Dice) -> String {
    let pool = match kind {
        ActivityKind::Ordinary | ActivityKind::ApexBoss => &pools.ordinary,
        ActivityKind::Lucky => &pools.lucky,
        ActivityKind::SecretRealm => &pools.secret_realm,
        ActivityKind::FactionChallenge => &pools.faction,
    };
    let pool = if pool.is_empty() { &pools.ordinary } else { pool };
    if pool.is_empty() {
        return "Nameless Wanderer".to_string();
    }
    pool[dice.pick_index(pool.len())].clone()
}

/// Optional epithet; faction leaders always carry one
pub fn pick_title(pools: &NamePools, kind: ActivityKind, dice: &mut impl Dice) -> Option<String> {
    if kind != ActivityKind::FactionChallenge || pools.titles.is_empty() {
        return None;
    }
    Some(pools.titles[dice.pick_index(pools.titles.len())].clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedDice;

    fn pools() -> NamePools {
        NamePools {
            ordinary: vec!["Scrap Golem".into(), "Blight Boar".into()],
            lucky: vec![],
            secret_realm: vec!["Tomb Warden".into()],
            faction: vec!["Red Dune Warlord".into()],
            titles: vec!["the Scarred".into()],
        }
    }

    #[test]
    fn test_pick_from_activity_pool() {
        let mut dice = ScriptedDice::constant(0.0);
        assert_eq!(
            pick_static_name(&pools(), ActivityKind::SecretRealm, &mut dice),
            "Tomb Warden"
        );
    }

    #[test]
    fn test_empty_pool_falls_back_to_ordinary() {
        let mut dice = ScriptedDice::constant(0.9);
        assert_eq!(
            pick_static_name(&pools(), ActivityKind::Lucky, &mut dice),
            "Blight Boar"
        );
        let name = pick_static_name(&NamePools::default(), ActivityKind::Lucky, &mut dice);
        assert!(!name.is_empty());
    }

    #[test]
    fn test_titles_only_for_faction() {
        let mut dice = ScriptedDice::constant(0.0);
        assert_eq!(pick_title(&pools(), ActivityKind::Ordinary, &mut dice), None);
        assert_eq!(
            pick_title(&pools(), ActivityKind::FactionChallenge, &mut dice),
            Some("the Scarred".to_string())
        );
    }

    #[tokio::test]
    async fn test_static_names_has_no_opinion() {
        let request = NameRequest {
            activity: ActivityKind::Ordinary,
            tier_name: "Qi Refining".into(),
            strength: StrengthTier::Normal,
            fallback: "Scrap Golem".into(),
        };
        assert_eq!(StaticNames.generate_name(&request).await.unwrap(), None);
    }
}

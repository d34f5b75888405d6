use thiserror::Error;

#[derive(Error, Debug)]
pub enum CombatError {
    #[error("insufficient mana: {required} required, {available} available")]
    InsufficientMana { required: u32, available: u32 },

    #[error("{name} is on cooldown for {remaining} more turn(s)")]
    OnCooldown { name: String, remaining: u32 },

    #[error("insufficient spirit charges: {required} required, {available} available")]
    InsufficientCharges { required: u32, available: u32 },

    #[error("unknown skill: {0}")]
    UnknownSkill(String),

    #[error("unknown ability: {0}")]
    UnknownAbility(String),

    #[error("item not available: {0}")]
    ItemUnavailable(String),

    #[error("battle is not awaiting a player action")]
    NotAwaitingInput,

    #[error("battle already concluded")]
    BattleConcluded,

    #[error("battle has not concluded yet")]
    BattleInProgress,

    #[error("tier table is empty")]
    EmptyTierTable,

    #[error("unknown tier: {0}")]
    UnknownTier(String),

    #[error("unknown boss: {0}")]
    UnknownBoss(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("catalog error: {0}")]
    CatalogError(#[from] toml::de::Error),

    #[error("name service error: {0}")]
    NameServiceError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

impl CombatError {
    /// Errors that leave a live battle untouched and let the player pick another action
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CombatError::InsufficientMana { .. }
                | CombatError::OnCooldown { .. }
                | CombatError::InsufficientCharges { .. }
                | CombatError::UnknownSkill(_)
                | CombatError::UnknownAbility(_)
                | CombatError::ItemUnavailable(_)
                | CombatError::NotAwaitingInput
        )
    }
}

pub type Result<T> = std::result::Result<T, CombatError>;

//! Actions-per-round from relative speed and perception
//!
//! Only the faster side ever gets more than one action. Every full
//! `advantage_step` of relative action-power lead grants one more, up to
//! `max_actions`.

use serde::{Deserialize, Serialize};

use crate::core::config::ActionEconomyConfig;
use crate::core::types::{sanitize, Side};

/// How many actions each side takes per batch, and who goes first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionAllowance {
    pub player: u32,
    pub opponent: u32,
    pub first: Side,
}

impl ActionAllowance {
    pub fn for_side(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player,
            Side::Opponent => self.opponent,
        }
    }
}

/// Weighted blend of speed and perception
pub fn action_power(speed: f64, perception: f64, config: &ActionEconomyConfig) -> f64 {
    sanitize(speed) * config.speed_weight + sanitize(perception) * config.perception_weight
}

/// Actions for the side with `fast` power against `slow` power
pub fn actions_for(fast: f64, slow: f64, config: &ActionEconomyConfig) -> u32 {
    let max = config.max_actions.max(1);
    if fast <= slow {
        return 1;
    }
    if slow <= 0.0 {
        return max;
    }
    let advantage = (fast - slow) / slow;
    // Epsilon keeps exact multiples (e.g. +50.0%) from flooring down
    let extra = ((advantage / config.advantage_step) + 1e-9).floor();
    let total = 1.0 + extra;
    if total >= max as f64 {
        max
    } else {
        total as u32
    }
}

/// Allowance for a player/opponent pairing; ties go to the player
pub fn allowance(
    player_speed: f64,
    player_perception: f64,
    opponent_speed: f64,
    opponent_perception: f64,
    config: &ActionEconomyConfig,
) -> ActionAllowance {
    let player_power = action_power(player_speed, player_perception, config);
    let opponent_power = action_power(opponent_speed, opponent_perception, config);

    if opponent_power > player_power {
        ActionAllowance {
            player: 1,
            opponent: actions_for(opponent_power, player_power, config),
            first: Side::Opponent,
        }
    } else {
        ActionAllowance {
            player: actions_for(player_power, opponent_power, config),
            opponent: 1,
            first: Side::Player,
        }
    }
}

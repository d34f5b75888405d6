//! Per-battle id sequence
//!
//! Each battle owns its own counter so concurrent battles never share state.

use serde::{Deserialize, Serialize};

/// Monotonically increasing id source owned by one battle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdSequence {
    next: u64,
}

impl IdSequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }
}

//! Random source seam
//!
//! Every roll the engine makes goes through [`Dice`]. Any `rand` generator
//! qualifies; seeded `ChaCha8Rng` gives reproducible battles and
//! [`ScriptedDice`] replays an exact sequence so tests can force branches.

use rand::{Rng, RngCore};

/// Uniform random source producing values in `[0, 1)`
pub trait Dice {
    fn roll(&mut self) -> f64;

    /// Uniform value in `[low, high)`; returns `low` for an empty range
    fn between(&mut self, low: f64, high: f64) -> f64 {
        if high <= low {
            return low;
        }
        low + (high - low) * self.roll()
    }

    /// True with probability `p`
    fn chance(&mut self, p: f64) -> bool {
        p > 0.0 && self.roll() < p
    }

    /// Uniform index into a collection of `len` elements (0 when empty)
    fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        ((self.roll() * len as f64) as usize).min(len - 1)
    }

    /// Uniform integer in `[low, high]`
    fn range_inclusive(&mut self, low: u32, high: u32) -> u32 {
        if high <= low {
            return low;
        }
        low + self.pick_index((high - low + 1) as usize) as u32
    }

    /// Index drawn proportionally to `weights`; `None` when nothing is positive
    fn weighted_index(&mut self, weights: &[f64]) -> Option<usize> {
        let total: f64 = weights.iter().filter(|w| **w > 0.0).sum();
        if total <= 0.0 {
            return None;
        }
        let mut target = self.roll() * total;
        let mut last_positive = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            last_positive = Some(index);
            if target < *weight {
                return Some(index);
            }
            target -= weight;
        }
        last_positive
    }
}

impl<R: RngCore> Dice for R {
    fn roll(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Replays a fixed list of rolls, cycling when exhausted
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    rolls: Vec<f64>,
    cursor: usize,
}

impl ScriptedDice {
    pub fn new(rolls: Vec<f64>) -> Self {
        Self { rolls, cursor: 0 }
    }

    /// Always returns the same value
    pub fn constant(value: f64) -> Self {
        Self::new(vec![value])
    }

    /// Number of rolls consumed so far
    pub fn consumed(&self) -> usize {
        self.cursor
    }
}

impl Dice for ScriptedDice {
    fn roll(&mut self) -> f64 {
        if self.rolls.is_empty() {
            return 0.0;
        }
        let value = self.rolls[self.cursor % self.rolls.len()];
        self.cursor += 1;
        value.clamp(0.0, 0.999_999)
    }
}

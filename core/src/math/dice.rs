use crate::prelude::{RandomSource, DICE_SIDES};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::collections::VecDeque;

/// Converts a probability into the integer threshold a draw is compared
/// against. Truncates toward zero and adds one, so `p = 1.0` always
/// passes a strict `draw < threshold` test.
pub fn threshold(probability: f64) -> u32 {
    (probability * DICE_SIDES as f64) as u32 + 1
}

/// Production draw stream backed by `StdRng`.
pub struct SeededDice {
    rng: StdRng,
}

impl SeededDice {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }
}

impl RandomSource for SeededDice {
    fn draw(&mut self) -> u32 {
        self.rng.gen_range(0..DICE_SIDES)
    }
}

/// Replays a fixed sequence of draws. Once exhausted it keeps returning
/// the fallback value.
#[derive(Debug, Clone)]
pub struct ScriptedDice {
    draws: VecDeque<u32>,
    fallback: u32,
}

impl ScriptedDice {
    pub fn new<I: IntoIterator<Item = u32>>(draws: I) -> Self {
        Self {
            draws: draws.into_iter().map(|d| d % DICE_SIDES).collect(),
            fallback: 0,
        }
    }

    /// Dice that always rolls the same face.
    pub fn constant(face: u32) -> Self {
        Self {
            draws: VecDeque::new(),
            fallback: face % DICE_SIDES,
        }
    }

    pub fn remaining(&self) -> usize {
        self.draws.len()
    }
}

impl RandomSource for ScriptedDice {
    fn draw(&mut self) -> u32 {
        self.draws.pop_front().unwrap_or(self.fallback)
    }
}

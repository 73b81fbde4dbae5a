//! Injectable randomness for social checks, phrase selection, and cooldowns.
//!
//! The core never reaches for a global RNG: every stochastic decision goes
//! through a [`Roller`], so a scripted roller reproduces a conversation
//! end-to-end.

use rand::Rng;
use std::collections::VecDeque;

/// Source of the two kinds of randomness the core needs.
pub trait Roller {
    /// A uniform roll in `[0.0, 100.0)`.
    fn roll_percent(&mut self) -> f32;

    /// A uniform index in `[0, upper)`. `upper` must be non-zero.
    fn pick(&mut self, upper: usize) -> usize;
}

/// Production roller backed by any [`rand::Rng`].
#[derive(Debug)]
pub struct RngRoller<R: Rng> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    /// Wrap an RNG.
    pub fn new(rng: R) -> Self {
        Self { rng }
    }
}

impl<R: Rng> Roller for RngRoller<R> {
    fn roll_percent(&mut self) -> f32 {
        self.rng.gen_range(0.0..100.0)
    }

    fn pick(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0);
        self.rng.gen_range(0..upper)
    }
}

/// Scripted roller for tests and replays.
///
/// Percent rolls and index picks are drawn from separate queues; an
/// exhausted queue yields `0.0` / `0`, which keeps selection deterministic
/// (first candidate) rather than panicking.
#[derive(Debug, Default)]
pub struct SequenceRoller {
    rolls: VecDeque<f32>,
    picks: VecDeque<usize>,
}

impl SequenceRoller {
    /// Create an empty scripted roller (all rolls 0.0, all picks 0).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue percent rolls to return in order.
    #[must_use]
    pub fn with_rolls(mut self, rolls: &[f32]) -> Self {
        self.rolls.extend(rolls.iter().copied());
        self
    }

    /// Queue index picks to return in order.
    #[must_use]
    pub fn with_picks(mut self, picks: &[usize]) -> Self {
        self.picks.extend(picks.iter().copied());
        self
    }
}

impl Roller for SequenceRoller {
    fn roll_percent(&mut self) -> f32 {
        self.rolls.pop_front().unwrap_or(0.0)
    }

    fn pick(&mut self, upper: usize) -> usize {
        debug_assert!(upper > 0);
        self.picks.pop_front().unwrap_or(0).min(upper - 1)
    }
}

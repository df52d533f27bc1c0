//! Randomness seam for the reward generator
//!
//! The engine never reaches for a global RNG on its own. Every draw goes
//! through a `RandomSource` the caller owns, so tests can replay exact values
//! and concurrent callers never share seed state.

use rand::rngs::{StdRng, ThreadRng};
use rand::{Rng, SeedableRng};

/// Uniform `[0, 1)` generator
pub trait RandomSource {
    /// Next value in `[0, 1)`
    fn next_f64(&mut self) -> f64;

    /// Uniform index in `0..len` (`len` must be non-zero)
    fn next_index(&mut self, len: usize) -> usize {
        let idx = (self.next_f64() * len as f64).floor() as usize;
        idx.min(len.saturating_sub(1))
    }
}

/// Adapter exposing any `rand::Rng` as a `RandomSource`
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    /// Deterministic source for simulations and tests
    pub fn seeded(seed: u64) -> Self {
        RngSource(StdRng::seed_from_u64(seed))
    }
}

impl RngSource<ThreadRng> {
    /// Thread-local source for normal use
    pub fn thread() -> Self {
        RngSource(rand::thread_rng())
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn next_f64(&mut self) -> f64 {
        self.0.gen::<f64>()
    }
}

/// Replays a fixed list of values, wrapping around at the end
#[derive(Debug, Clone)]
pub struct SequenceSource {
    values: Vec<f64>,
    pos: usize,
}

impl SequenceSource {
    pub fn new(values: Vec<f64>) -> Self {
        Self { values, pos: 0 }
    }

    /// How many values have been consumed so far
    pub fn consumed(&self) -> usize {
        self.pos
    }
}

impl RandomSource for SequenceSource {
    fn next_f64(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let value = self.values[self.pos % self.values.len()];
        self.pos += 1;
        value
    }
}

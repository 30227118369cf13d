//! Seeded randomness for reproducible runs.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform random numbers consumed by the simulation.
///
/// Every random decision in a run (Bernoulli trials, delays, tip selection)
/// is drawn from one instance in the order the algorithm asks for it, so a
/// given seed always replays the same run.
pub trait RandomSource {
    /// Returns a real number in `[low, high]`.
    fn uniform_real(&mut self, low: f64, high: f64) -> f64;

    /// Returns an integer in `[low, high]` (inclusive).
    fn uniform_int(&mut self, low: usize, high: usize) -> usize;

    /// Returns the seed the source was created with.
    fn seed(&self) -> u64;
}

/// ChaCha8-backed random source.
#[derive(Debug, Clone)]
pub struct SeededRng {
    seed: u64,
    rng: ChaCha8Rng,
}

impl SeededRng {
    /// Creates a new source with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for SeededRng {
    fn uniform_real(&mut self, low: f64, high: f64) -> f64 {
        if low >= high {
            return low;
        }
        // rand's float ranges overflow once the span nears f64::MAX
        if low.is_finite() && high.is_finite() && high - low <= f64::MAX / 2.0 {
            return self.rng.gen_range(low..=high);
        }

        // Huge or overflowed walk weights; keep the draw monotone in the unit sample.
        let unit: f64 = self.rng.gen();
        if unit == 0.0 {
            return low;
        }
        let span = high - low;
        let value = if span.is_finite() {
            low + span * unit
        } else {
            low * (1.0 - unit) + high * unit
        };
        value.min(high)
    }

    fn uniform_int(&mut self, low: usize, high: usize) -> usize {
        if low >= high {
            return low;
        }
        self.rng.gen_range(low..=high)
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

//! Random number generation for trade selection
//!
//! Selection code never reaches for ambient randomness; it draws through the
//! [`RandomSource`] trait so callers can inject a seeded generator.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Source of uniform draws used by the selector
pub trait RandomSource {
    /// Returns a uniform value in `0..n`
    ///
    /// Returns 0 if n is 0.
    fn rn2(&mut self, n: u32) -> u32;
}

impl<R: RandomSource + ?Sized> RandomSource for &mut R {
    fn rn2(&mut self, n: u32) -> u32 {
        (**self).rn2(n)
    }
}

/// Seedable trade RNG
///
/// Wraps ChaCha8Rng so a given seed always reproduces the same picks.
/// Keep [`TradeRng::seed`] around to replay an entropy-seeded roll.
#[derive(Debug, Clone)]
pub struct TradeRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl TradeRng {
    /// Create a new RNG with the given seed
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new RNG with a random seed
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// Get the seed used to create this RNG
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RandomSource for TradeRng {
    fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }
}

impl Default for TradeRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

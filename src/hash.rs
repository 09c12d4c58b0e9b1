//! ## Hash family
//! Randomized affine multiplicative rolling hash over byte sequences.
//!
//! Every sketch gets its own hash function drawn from the family, which decorrelates
//! independent experiment runs. A hash function is fully defined by one odd `u32`
//! multiplier `A` and evaluated as `h = h * A + byte` (wrapping) over the input bytes.

use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::trace;

/// Hash function from the multiplicative family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MultiplicativeHash {
    multiplier: u32,
}

impl MultiplicativeHash {
    /// Lowest multiplier drawn by `HashFamily`.
    pub const MIN_MULTIPLIER: u32 = 1000;

    /// Create hash function with given multiplier, forcing its lowest bit to 1.
    #[inline]
    pub fn new(multiplier: u32) -> Self {
        Self {
            multiplier: multiplier | 1,
        }
    }

    /// Return multiplier `A`
    #[inline]
    pub fn multiplier(&self) -> u32 {
        self.multiplier
    }

    /// Hash given bytes into `u32`
    #[inline]
    pub fn hash(&self, bytes: &[u8]) -> u32 {
        bytes.iter().fold(0u32, |h, &b| {
            h.wrapping_mul(self.multiplier).wrapping_add(u32::from(b))
        })
    }
}

/// Generator of `MultiplicativeHash` functions.
pub struct HashFamily {
    rng: StdRng,
    multipliers: Uniform<u32>,
}

impl HashFamily {
    /// Create hash family seeded from OS entropy
    pub fn new() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }

    /// Create hash family with fixed seed, producing the same hash functions on every run
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            multipliers: Uniform::new_inclusive(MultiplicativeHash::MIN_MULTIPLIER, u32::MAX),
        }
    }

    /// Draw new hash function from the family
    pub fn generate(&mut self) -> MultiplicativeHash {
        let hash = MultiplicativeHash::new(self.multipliers.sample(&mut self.rng));
        trace!(multiplier = hash.multiplier(), "generated hash function");
        hash
    }
}

impl Default for HashFamily {
    fn default() -> Self {
        Self::new()
    }
}

//! Random number generation for the generator.
//!
//! Uses a seeded ChaCha RNG for reproducibility: the same seed and the
//! same configuration replay the exact same level. The generator owns
//! one `GenRng` and threads it through placement, pathfinding, edge
//! routing, and marker scattering; there is no ambient RNG state.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Generator random number stream.
///
/// Wraps ChaCha8Rng. Serialized as its seed only; deserializing yields a
/// fresh stream at the start of that seed.
#[derive(Debug, Clone)]
pub struct GenRng {
    rng: ChaCha8Rng,
    seed: u64,
}

impl Serialize for GenRng {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        self.seed.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for GenRng {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let seed = u64::deserialize(deserializer)?;
        Ok(GenRng::new(seed))
    }
}

impl GenRng {
    /// Create a new stream with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// Create a new stream with a random seed.
    pub fn from_entropy() -> Self {
        let seed = rand::random();
        Self::new(seed)
    }

    /// The seed this stream was created from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Uniform integer in `0..n`. Returns 0 if n is 0.
    pub fn rn2(&mut self, n: u32) -> u32 {
        if n == 0 {
            return 0;
        }
        self.rng.gen_range(0..n)
    }

    /// Uniform float in `[0, hi)`. Returns 0.0 if hi is not positive.
    pub fn uniform(&mut self, hi: f32) -> f32 {
        if hi <= 0.0 {
            return 0.0;
        }
        self.rng.gen_range(0.0..hi)
    }

    /// Returns true with probability 1/n.
    pub fn one_in(&mut self, n: u32) -> bool {
        self.rn2(n) == 0
    }

    /// Choose a random element from a slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            Some(&items[self.rn2(items.len() as u32) as usize])
        }
    }

    /// Shuffle a slice in place (Fisher-Yates).
    pub fn shuffle<T>(&mut self, items: &mut [T]) {
        for i in (1..items.len()).rev() {
            let j = self.rn2(i as u32 + 1) as usize;
            items.swap(i, j);
        }
    }
}

impl Default for GenRng {
    fn default() -> Self {
        Self::from_entropy()
    }
}

//! Seeded random sources for Monte Carlo draws.

use std::hash::Hasher;

use rand::rngs::{OsRng, StdRng};
use rand::{RngCore, SeedableRng};
use siphasher::sip::SipHasher13;

/// `StdRng` paired with the seed it was built from.
///
/// Keeping the seed next to the generator means any draw can be replayed,
/// including one whose seed came from OS entropy.
#[derive(Debug, Clone)]
pub struct RngHandle {
    seed: u64,
    rng: StdRng,
}

impl RngHandle {
    /// Generator seeded with `seed`.
    pub fn from_seed(seed: u64) -> Self {
        Self {
            seed,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generator seeded from operating system entropy.
    pub fn from_entropy() -> Self {
        Self::from_seed(OsRng.next_u64())
    }

    /// Fresh generator for substream `index` of `master_seed`.
    pub fn substream(master_seed: u64, index: u64) -> Self {
        Self::from_seed(derive_substream_seed(master_seed, index))
    }

    /// Seed this generator started from.
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

impl RngCore for RngHandle {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest);
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

/// Seed of substream `index` under `master_seed`.
///
/// SipHash-1-3 with zero keys over `(master_seed, index)`; the value is stable
/// across platforms and releases.
pub fn derive_substream_seed(master_seed: u64, index: u64) -> u64 {
    let mut hasher = SipHasher13::new_with_keys(0, 0);
    hasher.write_u64(master_seed);
    hasher.write_u64(index);
    hasher.finish()
}

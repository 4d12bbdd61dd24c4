// src/rng.rs
//! Random number generation for hedging simulations
//!
//! Every simulated path draws from its own generator seeded from
//! `(base_seed, path_id)`, so a simulation gives identical results however
//! Rayon distributes paths across threads. Callers pass the factory in
//! explicitly; there is no process-wide seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

/// Source of independent per-path generators
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Generator for one path
    pub fn create_std_rng(&self, path_id: u64) -> StdRng {
        StdRng::seed_from_u64(splitmix64(self.base_seed.wrapping_add(path_id)))
    }
}

impl Default for RngFactory {
    fn default() -> Self {
        Self::new(42)
    }
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Scramble neighbouring seeds so consecutive path ids share no structure
fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(0x9e37_79b9_7f4a_7c15);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

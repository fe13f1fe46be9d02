//! Deterministic randomness for choreography generation.
//!
//! Every random decision (style switches, candidate picks, wall layouts)
//! draws from a PCG32 stream created here, so a base seed reproduces a whole
//! song. Independent streams per difficulty are derived by hashing the base
//! seed with a key.

use rand::SeedableRng;
use rand_pcg::Pcg32;

pub fn create_rng(seed: u64) -> Pcg32 {
    Pcg32::seed_from_u64(seed)
}

/// Derive an independent seed for `key` (e.g. a difficulty name) from `base_seed`.
pub fn derive_seed(base_seed: u64, key: &str) -> u64 {
    let mut input = Vec::with_capacity(8 + key.len());
    input.extend_from_slice(&base_seed.to_le_bytes());
    input.extend_from_slice(key.as_bytes());

    let hash = blake3::hash(&input);
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

pub fn create_keyed_rng(base_seed: u64, key: &str) -> Pcg32 {
    create_rng(derive_seed(base_seed, key))
}

/// A fresh seed for runs that did not ask for one.
pub fn random_seed() -> u64 {
    rand::random()
}

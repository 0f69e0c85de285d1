//! Random source for track generation
//!
//! Generators take any `rand::Rng`; this is the one the tools use. PCG is
//! small, fast and reproducible across platforms for a given seed.

use rand::SeedableRng;
use rand_pcg::Pcg32;

pub type TrackRng = Pcg32;

/// Create a generator, seeded from `seed` or from OS entropy when `None`
pub fn track_rng(seed: Option<u64>) -> TrackRng {
    match seed {
        Some(seed) => Pcg32::seed_from_u64(seed),
        None => Pcg32::from_rng(&mut rand::rng()),
    }
}

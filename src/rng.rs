//! Deterministic random number generation
//!
//! A single seeded ChaCha stream is threaded through world generation and
//! turn resolution, so identical seeds replay identical simulations.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

pub type SimRng = ChaCha8Rng;

/// Build the simulation RNG from a scenario seed.
pub fn seeded(seed: u64) -> SimRng {
    SimRng::seed_from_u64(seed)
}

/// Draw a uniformly random element out of a shrinking candidate pool.
///
/// The pool is consumed with `swap_remove`; once it is empty the caller sees
/// `None` instead of retrying blindly against already-taken tiles.
pub fn take_random<T>(pool: &mut Vec<T>, rng: &mut impl Rng) -> Option<T> {
    if pool.is_empty() {
        return None;
    }
    let index = rng.gen_range(0..pool.len());
    Some(pool.swap_remove(index))
}

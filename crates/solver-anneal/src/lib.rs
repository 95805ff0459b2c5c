//! Randomized constraint-satisfying construction plus simulated annealing.

pub mod anneal;
pub mod initial;
pub mod neighbor;
pub mod sampler;

#[cfg(test)]
mod testkit;

pub use anneal::{accept, temperature, validate_params, AnnealState, Annealer, Iteration};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use sched_core::{AnnealParams, Catalogue, ScheduleError, Solution, Solver};
use tracing::info;

/// Default [`Solver`]: one annealing run per campus.
///
/// With `params.seed` set, every campus gets its own reproducible stream
/// (the seed mixed with the campus id); otherwise the run is seeded from
/// OS entropy.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnnealingSolver;

impl AnnealingSolver {
    pub fn new() -> Self {
        Self
    }
}

impl Solver for AnnealingSolver {
    fn solve(&self, cat: &Catalogue, params: &AnnealParams) -> Result<Solution, ScheduleError> {
        validate_params(params)?;
        let rng = match params.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed ^ campus_salt(cat.campus().0.as_str())),
            None => ChaCha8Rng::from_entropy(),
        };
        info!(
            sessions = cat.sessions().len(),
            rooms = cat.rooms().len(),
            k_max = params.k_max,
            seeded = params.seed.is_some(),
            "annealing"
        );
        let solution = Annealer::new(cat, params, rng)?.run()?;
        info!(
            initial = solution.stats.initial_energy,
            energy = solution.energy,
            iterations = solution.stats.iterations,
            accepted = solution.stats.accepted,
            elapsed_ms = solution.stats.elapsed_ms,
            "annealing finished"
        );
        Ok(solution)
    }
}

/// FNV-1a; stable across runs and platforms, unlike `DefaultHasher`.
fn campus_salt(campus: &str) -> u64 {
    campus.bytes().fold(0xcbf2_9ce4_8422_2325, |h, b| {
        (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
    })
}

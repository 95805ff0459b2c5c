use crate::sampler::sample_placement;
use rand::seq::index;
use rand::Rng;
use sched_core::{Catalogue, Grid, Journal, Phase, ScheduleError};

/// How many sessions a neighbor move lifts out: `ceil(fraction * n)`,
/// never more than `n`.
pub fn neighbor_size(sessions: usize, fraction: f64) -> usize {
    let k = (sessions as f64 * fraction).ceil();
    if k <= 0.0 {
        0
    } else {
        (k as usize).min(sessions)
    }
}

/// Moves the grid to a random neighbor in place: `k` distinct sessions are
/// removed, then each is re-placed against the partially cleared grid.
/// Every change is logged in `journal`, so the caller can roll back a
/// rejected neighbor. On failure the grid is already rolled back.
pub fn perturb<R: Rng + ?Sized>(
    grid: &mut Grid,
    journal: &mut Journal,
    cat: &Catalogue,
    rng: &mut R,
    k: usize,
    max_attempts: u32,
) -> Result<(), ScheduleError> {
    let n = cat.sessions().len();
    let k = k.min(n);
    if k == 0 {
        return Ok(());
    }
    let chosen = index::sample(rng, n, k).into_vec();

    for &session in &chosen {
        grid.remove_logged(journal, session);
    }
    for &session in &chosen {
        match sample_placement(rng, session, grid, cat, max_attempts, Phase::Neighbor) {
            Ok((room, start)) => {
                grid.place_logged(journal, session, room, start, cat.duration(session))
            }
            Err(e) => {
                journal.rollback(grid);
                return Err(e);
            }
        }
    }
    Ok(())
}

use crate::sampler::sample_placement;
use rand::Rng;
use sched_core::{Catalogue, Grid, Phase, ScheduleError};
use tracing::debug;

/// Greedy randomized initial timetable. Sessions are placed in catalogue
/// order, i.e. longest first.
pub fn initial_state<R: Rng + ?Sized>(
    cat: &Catalogue,
    rng: &mut R,
    max_attempts: u32,
) -> Result<Grid, ScheduleError> {
    let mut grid = Grid::empty(cat.rooms().len(), cat.sessions().len());
    for session in 0..cat.sessions().len() {
        let (room, start) =
            sample_placement(rng, session, &grid, cat, max_attempts, Phase::Initial)?;
        grid.place(session, room, start, cat.duration(session));
    }
    debug!(sessions = cat.sessions().len(), "initial state built");
    Ok(grid)
}

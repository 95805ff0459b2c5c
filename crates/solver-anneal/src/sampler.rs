use rand::Rng;
use sched_core::slots::{CLOSE_SLOT, DAYS, OPEN_SLOT, SLOTS_PER_DAY};
use sched_core::{can_place, Catalogue, Grid, Phase, ScheduleError};

/// Rejection-samples a legal `(room, start)` for `session`: uniform weekday,
/// uniform in-hours start offset, uniform room, at most `max_attempts` draws.
pub fn sample_placement<R: Rng + ?Sized>(
    rng: &mut R,
    session: usize,
    grid: &Grid,
    cat: &Catalogue,
    max_attempts: u32,
    phase: Phase,
) -> Result<(usize, u32), ScheduleError> {
    let rooms = cat.rooms().len();
    if rooms > 0 {
        for _ in 0..max_attempts {
            let day = rng.gen_range(0..DAYS);
            let offset = rng.gen_range(OPEN_SLOT..CLOSE_SLOT);
            let room = rng.gen_range(0..rooms);
            let start = day * SLOTS_PER_DAY + offset;
            if can_place(session, room, start, grid, cat) {
                return Ok((room, start));
            }
        }
    }
    Err(ScheduleError::Infeasible {
        class: cat.session(session).id.clone(),
        attempts: max_attempts,
        phase,
    })
}

use crate::catalogue::Catalogue;
use crate::grid::Grid;
use crate::slots::{self, OPEN_SLOT, SLOTS_PER_WEEK};
use thiserror::Error;

/// First hard rule a candidate placement breaks.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum Rejection {
    #[error("starts before opening")]
    BeforeOpening,
    #[error("runs past closing")]
    AfterClosing,
    #[error("room does not exist")]
    UnknownRoom,
    #[error("room does not support the session type")]
    RoomTypeMismatch,
    #[error("room already taken at slot {slot} by session {by}")]
    RoomOccupied { slot: u32, by: usize },
    #[error("clashes with session {with} at slot {slot}")]
    Clash { slot: u32, with: usize },
}

/// Checks placing `session` in `room` starting at `start` against `grid`.
/// Read-only.
pub fn check_placement(
    session: usize,
    room: usize,
    start: u32,
    grid: &Grid,
    cat: &Catalogue,
) -> Result<(), Rejection> {
    if start >= SLOTS_PER_WEEK {
        return Err(Rejection::AfterClosing);
    }
    if slots::slot_in_day(start) < OPEN_SLOT {
        return Err(Rejection::BeforeOpening);
    }
    if room >= cat.rooms().len() {
        return Err(Rejection::UnknownRoom);
    }
    if !cat.supports(session, room) {
        return Err(Rejection::RoomTypeMismatch);
    }
    let duration = cat.duration(session);
    if !slots::within_hours(start, duration) {
        return Err(Rejection::AfterClosing);
    }

    let clashes = cat.clashes();
    for slot in start..start + duration {
        if let Some(by) = grid.occupant(slot, room) {
            return Err(Rejection::RoomOccupied { slot, by });
        }
        for &other in grid.slot_row(slot).iter().flatten() {
            if clashes.clashes(session, other) {
                return Err(Rejection::Clash { slot, with: other });
            }
        }
    }
    Ok(())
}

#[inline]
pub fn can_place(session: usize, room: usize, start: u32, grid: &Grid, cat: &Catalogue) -> bool {
    check_placement(session, room, start, grid, cat).is_ok()
}

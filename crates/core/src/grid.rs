//! `[slot][room]` occupancy grid with an undo journal.

use crate::slots::SLOTS_PER_WEEK;
use std::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Placement {
    pub room: usize,
    pub start: u32,
    pub duration: u32,
}

impl Placement {
    #[inline]
    pub fn slots(&self) -> Range<u32> {
        self.start..self.start + self.duration
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rooms: usize,
    cells: Vec<Option<usize>>,
    placed: Vec<Option<Placement>>,
}

impl Grid {
    pub fn empty(rooms: usize, sessions: usize) -> Self {
        Self {
            rooms,
            cells: vec![None; SLOTS_PER_WEEK as usize * rooms],
            placed: vec![None; sessions],
        }
    }

    #[inline]
    pub fn rooms(&self) -> usize {
        self.rooms
    }

    #[inline]
    pub fn sessions(&self) -> usize {
        self.placed.len()
    }

    #[inline]
    fn idx(&self, slot: u32, room: usize) -> usize {
        slot as usize * self.rooms + room
    }

    /// Session occupying `room` at `slot`, if any. Out-of-week slots read as empty.
    #[inline]
    pub fn occupant(&self, slot: u32, room: usize) -> Option<usize> {
        if slot >= SLOTS_PER_WEEK || room >= self.rooms {
            return None;
        }
        self.cells[self.idx(slot, room)]
    }

    /// All rooms at one slot.
    #[inline]
    pub fn slot_row(&self, slot: u32) -> &[Option<usize>] {
        let from = self.idx(slot, 0);
        &self.cells[from..from + self.rooms]
    }

    #[inline]
    pub fn placement(&self, session: usize) -> Option<Placement> {
        self.placed.get(session).copied().flatten()
    }

    pub fn is_complete(&self) -> bool {
        self.placed.iter().all(Option::is_some)
    }

    /// Writes a `duration`-slot block for `session`. Callers are expected to
    /// have checked feasibility first; the block must lie inside the week.
    pub fn place(&mut self, session: usize, room: usize, start: u32, duration: u32) {
        debug_assert!(self.placed[session].is_none(), "session {session} placed twice");
        debug_assert!(start + duration <= SLOTS_PER_WEEK);
        for slot in start..start + duration {
            let i = self.idx(slot, room);
            debug_assert!(self.cells[i].is_none(), "cell ({slot}, {room}) already taken");
            self.cells[i] = Some(session);
        }
        self.placed[session] = Some(Placement {
            room,
            start,
            duration,
        });
    }

    /// Clears every cell held by `session` and returns where it was.
    pub fn remove(&mut self, session: usize) -> Option<Placement> {
        let p = self.placed.get_mut(session)?.take()?;
        for slot in p.slots() {
            let i = self.idx(slot, p.room);
            self.cells[i] = None;
        }
        Some(p)
    }

    pub fn place_logged(
        &mut self,
        journal: &mut Journal,
        session: usize,
        room: usize,
        start: u32,
        duration: u32,
    ) {
        self.place(session, room, start, duration);
        journal.ops.push(Op::Placed(session));
    }

    pub fn remove_logged(&mut self, journal: &mut Journal, session: usize) -> Option<Placement> {
        let p = self.remove(session)?;
        journal.ops.push(Op::Removed(session, p));
        Some(p)
    }

    /// Session starts in room-major order: for each room, slots are scanned
    /// from the start of the week and each session is reported at the first
    /// slot it holds, then skipped for the rest of its block.
    pub fn starts(&self) -> Starts<'_> {
        Starts {
            grid: self,
            room: 0,
            slot: 0,
        }
    }
}

pub struct Starts<'a> {
    grid: &'a Grid,
    room: usize,
    slot: u32,
}

impl<'a> Iterator for Starts<'a> {
    type Item = (usize, Placement);

    fn next(&mut self) -> Option<Self::Item> {
        while self.room < self.grid.rooms {
            while self.slot < SLOTS_PER_WEEK {
                let slot = self.slot;
                match self.grid.occupant(slot, self.room) {
                    Some(session) => {
                        let duration = self
                            .grid
                            .placement(session)
                            .map(|p| p.duration)
                            .unwrap_or(1);
                        self.slot += duration.max(1);
                        return Some((
                            session,
                            Placement {
                                room: self.room,
                                start: slot,
                                duration,
                            },
                        ));
                    }
                    None => self.slot += 1,
                }
            }
            self.room += 1;
            self.slot = 0;
        }
        None
    }
}

#[derive(Clone, Copy, Debug)]
enum Op {
    Placed(usize),
    Removed(usize, Placement),
}

/// Undo log for a batch of grid mutations.
#[derive(Debug, Default)]
pub struct Journal {
    ops: Vec<Op>,
}

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Keep the logged changes.
    pub fn commit(&mut self) {
        self.ops.clear();
    }

    /// Undo the logged changes, newest first.
    pub fn rollback(&mut self, grid: &mut Grid) {
        while let Some(op) = self.ops.pop() {
            match op {
                Op::Placed(session) => {
                    grid.remove(session);
                }
                Op::Removed(session, p) => grid.place(session, p.room, p.start, p.duration),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn place_and_remove_keep_cells_and_index_in_sync() {
        let mut g = Grid::empty(2, 2);
        g.place(0, 1, 20, 3);
        assert_eq!(g.occupant(20, 1), Some(0));
        assert_eq!(g.occupant(22, 1), Some(0));
        assert_eq!(g.occupant(23, 1), None);
        assert_eq!(g.occupant(20, 0), None);
        assert!(!g.is_complete());

        let p = g.remove(0).unwrap();
        assert_eq!(p.slots(), 20..23);
        assert!(g.slot_row(21).iter().all(Option::is_none));
        assert_eq!(g.remove(0), None);
    }

    #[test]
    fn starts_report_each_session_once_room_major() {
        let mut g = Grid::empty(2, 3);
        g.place(0, 1, 16, 2);
        g.place(1, 0, 30, 4);
        g.place(2, 0, 17, 1);
        let starts: Vec<_> = g.starts().map(|(s, p)| (s, p.room, p.start)).collect();
        assert_eq!(starts, vec![(2, 0, 17), (1, 0, 30), (0, 1, 16)]);
    }

    #[test]
    fn back_to_back_sessions_are_distinct_starts() {
        let mut g = Grid::empty(1, 2);
        g.place(0, 0, 16, 2);
        g.place(1, 0, 18, 2);
        assert_eq!(g.starts().count(), 2);
    }

    #[test]
    fn rollback_restores_exact_state() {
        let mut g = Grid::empty(2, 3);
        g.place(0, 0, 16, 2);
        g.place(1, 1, 20, 1);
        let before = g.clone();

        let mut j = Journal::new();
        g.remove_logged(&mut j, 0);
        g.remove_logged(&mut j, 1);
        g.place_logged(&mut j, 1, 0, 16, 1);
        g.place_logged(&mut j, 0, 1, 30, 2);
        g.place_logged(&mut j, 2, 0, 17, 1);
        assert_eq!(j.len(), 5);
        assert_ne!(g, before);

        j.rollback(&mut g);
        assert!(j.is_empty());
        assert_eq!(g, before);
    }

    #[test]
    fn commit_forgets_history() {
        let mut g = Grid::empty(1, 1);
        let mut j = Journal::new();
        g.place_logged(&mut j, 0, 0, 16, 1);
        j.commit();
        j.rollback(&mut g);
        assert_eq!(g.placement(0).map(|p| p.start), Some(16));
    }
}

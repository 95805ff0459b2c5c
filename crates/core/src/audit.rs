use crate::catalogue::Catalogue;
use crate::grid::{Grid, Placement};
use crate::slots;
use serde_json::json;
use std::collections::HashMap;
use types::{Assignment, Violation, ViolationKind};

fn violation(cat: &Catalogue, kind: ViolationKind, session: usize, details: serde_json::Value) -> Violation {
    Violation {
        kind,
        class_id: cat.session(session).id.clone(),
        details,
    }
}

/// Checks each session's placement (indexed by catalogue position).
fn audit_placements(cat: &Catalogue, placed: &[Option<Placement>]) -> Vec<Violation> {
    let mut out = Vec::new();
    let mut cells: HashMap<(u32, usize), usize> = HashMap::new();

    for (i, p) in placed.iter().enumerate() {
        let Some(p) = p else {
            out.push(violation(cat, ViolationKind::Unplaced, i, json!({})));
            continue;
        };
        let expected = cat.duration(i);
        if p.duration != expected {
            out.push(violation(
                cat,
                ViolationKind::Duration,
                i,
                json!({ "expected": expected, "actual": p.duration }),
            ));
        }
        if p.room >= cat.rooms().len() {
            out.push(violation(cat, ViolationKind::UnknownReference, i, json!({ "roomIndex": p.room })));
            continue;
        }
        let room_id = &cat.room(p.room).id;
        if !cat.supports(i, p.room) {
            out.push(violation(
                cat,
                ViolationKind::RoomType,
                i,
                json!({ "room": room_id, "sessionType": cat.session(i).session_type }),
            ));
        }
        if p.start >= slots::SLOTS_PER_WEEK {
            out.push(violation(cat, ViolationKind::OperatingHours, i, json!({ "start": p.start })));
            continue;
        }
        if !slots::within_hours(p.start, p.duration) {
            let last = p.start + p.duration.max(1) - 1;
            let kind = if slots::day_of(p.start) != slots::day_of(last) {
                ViolationKind::DayBoundary
            } else {
                ViolationKind::OperatingHours
            };
            out.push(violation(cat, kind, i, json!({ "start": slots::label(p.start), "duration": p.duration })));
        }
        for slot in p.slots() {
            if let Some(&other) = cells.get(&(slot, p.room)) {
                out.push(violation(
                    cat,
                    ViolationKind::DoubleBooking,
                    i,
                    json!({
                        "room": room_id,
                        "slot": slots::label(slot),
                        "with": cat.session(other).id,
                    }),
                ));
            } else {
                cells.insert((slot, p.room), i);
            }
        }
    }

    for (i, j) in cat.clashes().pairs() {
        let (Some(a), Some(b)) = (placed[i], placed[j]) else {
            continue;
        };
        // Out-of-week starts were reported above.
        if a.start >= slots::SLOTS_PER_WEEK || b.start >= slots::SLOTS_PER_WEEK {
            continue;
        }
        if a.start < b.start + b.duration && b.start < a.start + a.duration {
            out.push(violation(
                cat,
                ViolationKind::ClashOverlap,
                i,
                json!({
                    "with": cat.session(j).id,
                    "at": slots::label(a.start.max(b.start)),
                }),
            ));
        }
    }
    out
}

/// Audits a solver grid, including consistency between its cells and its
/// placement index.
pub fn audit(grid: &Grid, cat: &Catalogue) -> Vec<Violation> {
    let placed: Vec<Option<Placement>> = (0..cat.sessions().len()).map(|i| grid.placement(i)).collect();
    let mut out = audit_placements(cat, &placed);

    for slot in 0..slots::SLOTS_PER_WEEK {
        for (room, cell) in grid.slot_row(slot).iter().enumerate() {
            let Some(s) = *cell else { continue };
            let covered = grid
                .placement(s)
                .is_some_and(|p| p.room == room && p.slots().contains(&slot));
            if !covered {
                out.push(violation(
                    cat,
                    ViolationKind::DoubleBooking,
                    s,
                    json!({ "slot": slots::label(slot), "roomIndex": room, "reason": "stray cell" }),
                ));
            }
        }
    }
    out
}

pub struct AssignmentAudit {
    pub violations: Vec<Violation>,
    /// Accepted placement per session; unknown and repeated rows are dropped.
    pub placed: Vec<Option<Placement>>,
}

impl AssignmentAudit {
    pub fn is_feasible(&self) -> bool {
        self.violations.is_empty()
    }

    /// One start per placed session.
    pub fn starts(&self) -> impl Iterator<Item = u32> + '_ {
        self.placed.iter().flatten().map(|p| p.start)
    }
}

/// Audits an externally supplied schedule for the campus in `cat`.
pub fn audit_assignments(cat: &Catalogue, assignments: &[Assignment]) -> AssignmentAudit {
    let sessions = cat.session_index();
    let rooms = cat.room_index();
    let mut placed: Vec<Option<Placement>> = vec![None; cat.sessions().len()];
    let mut out = Vec::new();

    for a in assignments {
        let Some(&i) = sessions.get(&a.class_id) else {
            out.push(Violation {
                kind: ViolationKind::UnknownReference,
                class_id: a.class_id.clone(),
                details: json!({ "reason": "unknown class" }),
            });
            continue;
        };
        let Some(&room) = rooms.get(&a.room_id) else {
            out.push(violation(cat, ViolationKind::UnknownReference, i, json!({ "room": a.room_id })));
            continue;
        };
        if placed[i].is_some() {
            out.push(violation(
                cat,
                ViolationKind::DoubleBooking,
                i,
                json!({ "reason": "class assigned more than once" }),
            ));
            continue;
        }
        placed[i] = Some(Placement {
            room,
            start: a.start_slot,
            duration: cat.duration(i),
        });
    }
    out.extend(audit_placements(cat, &placed));
    AssignmentAudit {
        violations: out,
        placed,
    }
}

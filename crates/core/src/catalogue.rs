use crate::clash::ClashIndex;
use crate::error::ScheduleError;
use crate::slots::MAX_DURATION;
use std::collections::HashMap;
use types::{CampusId, CampusSnapshot, ClassId, ClassSession, RoomId, RoomSpec};

/// Validated, indexed view of one campus snapshot.
///
/// Sessions are held longest-first (ties keep their snapshot order) and
/// every other structure in a run, the grid included, refers to them by
/// position in that order.
#[derive(Clone, Debug)]
pub struct Catalogue {
    campus: CampusId,
    rooms: Vec<RoomSpec>,
    sessions: Vec<ClassSession>,
    clashes: ClashIndex,
    // sessions.len() x rooms.len()
    compat: Vec<bool>,
}

/// Every problem with a snapshot, in the order found. An empty list means
/// [`Catalogue::new`] will succeed.
pub fn validate(snapshot: &CampusSnapshot) -> Vec<ScheduleError> {
    let mut errors = Vec::new();

    if snapshot.rooms.is_empty() && !snapshot.sessions.is_empty() {
        errors.push(ScheduleError::NoRooms {
            campus: snapshot.campus.clone(),
            sessions: snapshot.sessions.len(),
        });
    }

    fn chk_unique<'a>(
        kind: &'static str,
        ids: impl Iterator<Item = &'a String>,
        errors: &mut Vec<ScheduleError>,
    ) {
        let mut seen = std::collections::HashSet::new();
        for id in ids {
            if !seen.insert(id) {
                errors.push(ScheduleError::DuplicateId {
                    kind,
                    id: id.clone(),
                });
            }
        }
    }
    chk_unique("room", snapshot.rooms.iter().map(|r| &r.id.0), &mut errors);
    chk_unique("class", snapshot.sessions.iter().map(|s| &s.id.0), &mut errors);

    for s in &snapshot.sessions {
        if s.duration == 0 || s.duration > MAX_DURATION {
            errors.push(ScheduleError::InvalidDuration {
                class: s.id.clone(),
                duration: s.duration,
                max: MAX_DURATION,
            });
        }
        if s.session_type.0.trim().is_empty() {
            errors.push(ScheduleError::MissingSessionType { class: s.id.clone() });
            continue;
        }
        if !snapshot.rooms.is_empty()
            && !snapshot
                .rooms
                .iter()
                .any(|r| r.session_types.contains(&s.session_type))
        {
            errors.push(ScheduleError::NoCompatibleRoom {
                campus: snapshot.campus.clone(),
                class: s.id.clone(),
                session_type: s.session_type.clone(),
            });
        }
    }
    errors
}

impl Catalogue {
    pub fn new(snapshot: CampusSnapshot) -> Result<Self, ScheduleError> {
        if let Some(first) = validate(&snapshot).into_iter().next() {
            return Err(first);
        }

        let CampusSnapshot {
            campus,
            rooms,
            mut sessions,
        } = snapshot;
        sessions.sort_by(|a, b| b.duration.cmp(&a.duration));

        let clashes = ClashIndex::build(&sessions);
        let mut compat = Vec::with_capacity(sessions.len() * rooms.len());
        for s in &sessions {
            for r in &rooms {
                compat.push(r.session_types.contains(&s.session_type));
            }
        }

        Ok(Self {
            campus,
            rooms,
            sessions,
            clashes,
            compat,
        })
    }

    pub fn campus(&self) -> &CampusId {
        &self.campus
    }

    pub fn rooms(&self) -> &[RoomSpec] {
        &self.rooms
    }

    pub fn sessions(&self) -> &[ClassSession] {
        &self.sessions
    }

    #[inline]
    pub fn session(&self, i: usize) -> &ClassSession {
        &self.sessions[i]
    }

    #[inline]
    pub fn room(&self, r: usize) -> &RoomSpec {
        &self.rooms[r]
    }

    #[inline]
    pub fn duration(&self, i: usize) -> u32 {
        self.sessions[i].duration
    }

    pub fn clashes(&self) -> &ClashIndex {
        &self.clashes
    }

    /// Whether room `r` supports the session type of session `i`.
    #[inline]
    pub fn supports(&self, i: usize, r: usize) -> bool {
        self.compat[i * self.rooms.len() + r]
    }

    pub fn session_index(&self) -> HashMap<&ClassId, usize> {
        self.sessions
            .iter()
            .enumerate()
            .map(|(i, s)| (&s.id, i))
            .collect()
    }

    pub fn room_index(&self) -> HashMap<&RoomId, usize> {
        self.rooms
            .iter()
            .enumerate()
            .map(|(i, r)| (&r.id, i))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::SessionType;

    fn room(id: &str, types: &[&str]) -> RoomSpec {
        RoomSpec {
            id: id.into(),
            session_types: types.iter().map(|t| SessionType::from(*t)).collect(),
        }
    }

    fn session(id: &str, kind: &str, duration: u32) -> ClassSession {
        ClassSession {
            id: id.into(),
            session_type: kind.into(),
            duration,
            teacher: None,
            students: Default::default(),
        }
    }

    fn snapshot(rooms: Vec<RoomSpec>, sessions: Vec<ClassSession>) -> CampusSnapshot {
        CampusSnapshot {
            campus: "main".into(),
            rooms,
            sessions,
        }
    }

    #[test]
    fn sessions_are_ordered_longest_first_and_stable() {
        let cat = Catalogue::new(snapshot(
            vec![room("r1", &["lecture"])],
            vec![
                session("a", "lecture", 1),
                session("b", "lecture", 4),
                session("c", "lecture", 1),
                session("d", "lecture", 2),
            ],
        ))
        .unwrap();
        let ids: Vec<_> = cat.sessions().iter().map(|s| s.id.0.as_str()).collect();
        assert_eq!(ids, vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn compatibility_table_follows_room_types() {
        let cat = Catalogue::new(snapshot(
            vec![room("lec", &["lecture"]), room("tut", &["tutorial", "practical"])],
            vec![session("l", "lecture", 2), session("t", "tutorial", 1)],
        ))
        .unwrap();
        assert!(cat.supports(0, 0));
        assert!(!cat.supports(0, 1));
        assert!(!cat.supports(1, 0));
        assert!(cat.supports(1, 1));
    }

    #[test]
    fn sessions_without_rooms_are_rejected() {
        let err = Catalogue::new(snapshot(vec![], vec![session("a", "lecture", 1)])).unwrap_err();
        assert!(matches!(err, ScheduleError::NoRooms { sessions: 1, .. }));
    }

    #[test]
    fn empty_campus_is_fine() {
        let cat = Catalogue::new(snapshot(vec![], vec![])).unwrap();
        assert!(cat.sessions().is_empty());
    }

    #[test]
    fn type_matching_no_room_is_infeasible_up_front() {
        let err = Catalogue::new(snapshot(
            vec![room("r1", &["lecture"])],
            vec![session("a", "practical", 1)],
        ))
        .unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn validate_collects_every_problem() {
        let errs = validate(&snapshot(
            vec![room("r1", &["lecture"]), room("r1", &["lecture"])],
            vec![
                session("a", "lecture", 0),
                session("b", " ", 1),
                session("c", "lecture", MAX_DURATION + 1),
            ],
        ));
        assert_eq!(errs.len(), 4);
        assert!(matches!(errs[0], ScheduleError::DuplicateId { kind: "room", .. }));
        assert!(matches!(errs[1], ScheduleError::InvalidDuration { duration: 0, .. }));
        assert!(matches!(errs[2], ScheduleError::MissingSessionType { .. }));
        assert!(matches!(errs[3], ScheduleError::InvalidDuration { .. }));
    }
}

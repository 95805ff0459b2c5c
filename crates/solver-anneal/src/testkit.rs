//! Catalogue fixtures shared by the unit tests.

use sched_core::slots::MAX_DURATION;
use sched_core::Catalogue;
use types::{CampusSnapshot, ClassSession, RoomSpec, SessionType, StudentId};

pub fn room(id: &str, kinds: &[&str]) -> RoomSpec {
    RoomSpec {
        id: id.into(),
        session_types: kinds.iter().map(|k| SessionType::from(*k)).collect(),
    }
}

pub fn session(id: &str, kind: &str, duration: u32, teacher: Option<&str>, students: &[&str]) -> ClassSession {
    ClassSession {
        id: id.into(),
        session_type: kind.into(),
        duration,
        teacher: teacher.map(Into::into),
        students: students.iter().map(|s| StudentId::from(*s)).collect(),
    }
}

fn catalogue(rooms: Vec<RoomSpec>, sessions: Vec<ClassSession>) -> Catalogue {
    Catalogue::new(CampusSnapshot {
        campus: "test".into(),
        rooms,
        sessions,
    })
    .expect("fixture catalogue is valid")
}

/// Lecture room + tutorial room; a 2-slot lecture and a tutorial sharing
/// teacher `t1`, and an unrelated tutorial.
pub fn scenario() -> Catalogue {
    catalogue(
        vec![room("lec", &["lecture"]), room("tut", &["tutorial"])],
        vec![
            session("L", "lecture", 2, Some("t1"), &[]),
            session("T1", "tutorial", 1, Some("t1"), &[]),
            session("T2", "tutorial", 1, Some("t2"), &[]),
        ],
    )
}

/// A comfortably feasible campus with overlapping teachers and students.
pub fn busy_campus(sessions: usize, rooms: usize) -> Catalogue {
    let rooms = (0..rooms)
        .map(|i| match i % 3 {
            0 => room(&format!("r{i}"), &["lecture"]),
            1 => room(&format!("r{i}"), &["tutorial"]),
            _ => room(&format!("r{i}"), &["lecture", "tutorial"]),
        })
        .collect();
    let sessions = (0..sessions)
        .map(|i| {
            let kind = if i % 2 == 0 { "lecture" } else { "tutorial" };
            let teacher = format!("t{}", i % 5);
            let a = format!("s{}", i % 7);
            let b = format!("s{}", 7 + (i * 3) % 11);
            session(
                &format!("c{i}"),
                kind,
                1 + (i % 4) as u32,
                Some(&teacher),
                &[a.as_str(), b.as_str()],
            )
        })
        .collect();
    catalogue(rooms, sessions)
}

/// `n` full-day sessions for one teacher in a single room.
pub fn full_days(n: usize) -> Catalogue {
    catalogue(
        vec![room("hall", &["lecture"])],
        (0..n)
            .map(|i| session(&format!("d{i}"), "lecture", MAX_DURATION, Some("t"), &[]))
            .collect(),
    )
}

use std::fmt;
use thiserror::Error;
use types::{CampusId, ClassId, SessionType, Violation};

/// Where a placement attempt ran out of budget.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Initial,
    Neighbor,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initial => f.write_str("initial placement"),
            Phase::Neighbor => f.write_str("neighbor regeneration"),
        }
    }
}

/// Fatal errors for one campus run. None of these abort other campuses.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("campus {campus} has {sessions} class session(s) but no rooms")]
    NoRooms { campus: CampusId, sessions: usize },

    #[error("class {class} has invalid duration {duration} (expected 1..={max} half-hour slots)")]
    InvalidDuration {
        class: ClassId,
        duration: u32,
        max: u32,
    },

    #[error("class {class} has no session type")]
    MissingSessionType { class: ClassId },

    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: &'static str, id: String },

    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    #[error("class {class} is unschedulable: no room at campus {campus} supports {session_type}")]
    NoCompatibleRoom {
        campus: CampusId,
        class: ClassId,
        session_type: SessionType,
    },

    #[error("class {class} could not be placed after {attempts} attempts during {phase}")]
    Infeasible {
        class: ClassId,
        attempts: u32,
        phase: Phase,
    },

    #[error("failed to load campus {campus}: {source:#}")]
    Load {
        campus: CampusId,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write schedule for campus {campus}: {source:#}")]
    Write {
        campus: CampusId,
        #[source]
        source: anyhow::Error,
    },

    #[error("schedule for campus {campus} failed audit with {} violation(s)", .violations.len())]
    Audit {
        campus: CampusId,
        violations: Vec<Violation>,
    },
}

impl ScheduleError {
    /// The instance looks over-constrained rather than malformed.
    pub fn is_infeasible(&self) -> bool {
        matches!(
            self,
            ScheduleError::Infeasible { .. } | ScheduleError::NoCompatibleRoom { .. }
        )
    }

    pub fn is_input(&self) -> bool {
        matches!(
            self,
            ScheduleError::NoRooms { .. }
                | ScheduleError::InvalidDuration { .. }
                | ScheduleError::MissingSessionType { .. }
                | ScheduleError::DuplicateId { .. }
                | ScheduleError::InvalidParams(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offender() {
        let e = ScheduleError::Infeasible {
            class: "c7".into(),
            attempts: 500,
            phase: Phase::Neighbor,
        };
        assert_eq!(
            e.to_string(),
            "class c7 could not be placed after 500 attempts during neighbor regeneration"
        );
        assert!(e.is_infeasible());
        assert!(!e.is_input());

        let e = ScheduleError::NoRooms {
            campus: "north".into(),
            sessions: 3,
        };
        assert_eq!(e.to_string(), "campus north has 3 class session(s) but no rooms");
        assert!(e.is_input());
    }

    #[test]
    fn load_error_keeps_cause() {
        let e = ScheduleError::Load {
            campus: "north".into(),
            source: anyhow::anyhow!("connection reset"),
        };
        assert!(e.to_string().contains("connection reset"));
        assert!(std::error::Error::source(&e).is_some());
    }
}

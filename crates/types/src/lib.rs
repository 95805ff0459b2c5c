use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use utoipa::ToSchema;

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(
            Clone,
            Debug,
            Serialize,
            Deserialize,
            ToSchema,
            JsonSchema,
            Eq,
            PartialEq,
            Ord,
            PartialOrd,
            Hash,
        )]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }
    };
}
id_newtype!(CampusId);
id_newtype!(RoomId);
id_newtype!(ClassId);
id_newtype!(StaffId);
id_newtype!(StudentId);
id_newtype!(SubjectId);
id_newtype!(CourseId);
id_newtype!(SessionType);

// Record-store rows. These mirror what the surrounding administration system
// persists; the scheduler only reads them and writes back start slot / room.

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Campus {
    pub id: CampusId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: RoomId,
    pub campus_id: CampusId,
    #[serde(default)]
    pub session_types: Vec<SessionType>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub capacity: Option<u32>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub campus_id: CampusId,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub id: SubjectId,
    pub course_id: CourseId,
    #[serde(default)]
    pub code: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassRecord {
    pub id: ClassId,
    pub subject_id: SubjectId,
    pub session_type: SessionType,
    /// Length in half-hour slots.
    pub duration_slots: u32,
    #[serde(default)]
    pub staff_id: Option<StaffId>,
    #[serde(default)]
    pub start_slot: Option<u32>,
    #[serde(default)]
    pub room_id: Option<RoomId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Enrollment {
    pub student_id: StudentId,
    pub subject_id: SubjectId,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    #[serde(default)]
    pub campuses: Vec<Campus>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub courses: Vec<Course>,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub classes: Vec<ClassRecord>,
    #[serde(default)]
    pub enrollments: Vec<Enrollment>,
}

// Scheduler-facing shapes.

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RoomSpec {
    pub id: RoomId,
    #[serde(default)]
    pub session_types: BTreeSet<SessionType>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ClassSession {
    pub id: ClassId,
    pub session_type: SessionType,
    /// Length in half-hour slots.
    pub duration: u32,
    #[serde(default)]
    pub teacher: Option<StaffId>,
    #[serde(default)]
    pub students: BTreeSet<StudentId>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampusSnapshot {
    pub campus: CampusId,
    #[serde(default)]
    pub rooms: Vec<RoomSpec>,
    #[serde(default)]
    pub sessions: Vec<ClassSession>,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub class_id: ClassId,
    pub start_slot: u32,
    pub room_id: RoomId,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct AnnealParams {
    pub k_max: u32,
    pub init_temp: f64,
    pub ideal_hour: u32,
    pub neighbor_fraction: f64,
    pub max_attempts: u32,
    pub seed: Option<u64>,
    pub time_limit_ms: Option<u64>,
}

impl Default for AnnealParams {
    fn default() -> Self {
        Self {
            k_max: 1000,
            init_temp: 100.0,
            ideal_hour: 13,
            neighbor_fraction: 0.2,
            max_attempts: 10_000,
            seed: None,
            time_limit_ms: None,
        }
    }
}

/// Partial overrides applied on top of the configured defaults.
#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParamOverrides {
    #[serde(default)]
    pub k_max: Option<u32>,
    #[serde(default)]
    pub init_temp: Option<f64>,
    #[serde(default)]
    pub ideal_hour: Option<u32>,
    #[serde(default)]
    pub neighbor_fraction: Option<f64>,
    #[serde(default)]
    pub max_attempts: Option<u32>,
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
}

impl ParamOverrides {
    pub fn apply(&self, base: &AnnealParams) -> AnnealParams {
        AnnealParams {
            k_max: self.k_max.unwrap_or(base.k_max),
            init_temp: self.init_temp.unwrap_or(base.init_temp),
            ideal_hour: self.ideal_hour.unwrap_or(base.ideal_hour),
            neighbor_fraction: self.neighbor_fraction.unwrap_or(base.neighbor_fraction),
            max_attempts: self.max_attempts.unwrap_or(base.max_attempts),
            seed: self.seed.or(base.seed),
            time_limit_ms: self.time_limit_ms.or(base.time_limit_ms),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    #[serde(default)]
    pub campus_id: Option<CampusId>,
    #[serde(default)]
    pub course_id: Option<CourseId>,
    #[serde(default)]
    pub params: Option<ParamOverrides>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CampusStats {
    pub sessions: usize,
    pub rooms: usize,
    pub clash_pairs: usize,
    pub initial_energy: i64,
    pub final_energy: i64,
    pub iterations: u32,
    pub accepted: u32,
    pub elapsed_ms: u64,
    #[serde(default)]
    pub stopped_early: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum CampusStatus {
    Solved { stats: CampusStats, written: usize },
    Failed { message: String },
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CampusOutcome {
    pub campus: CampusId,
    #[serde(flatten)]
    pub status: CampusStatus,
}

impl CampusOutcome {
    pub fn is_solved(&self) -> bool {
        matches!(self.status, CampusStatus::Solved { .. })
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub outcomes: Vec<CampusOutcome>,
}

impl RunReport {
    pub fn all_solved(&self) -> bool {
        self.outcomes.iter().all(CampusOutcome::is_solved)
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, ToSchema, JsonSchema, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    DoubleBooking,
    ClashOverlap,
    RoomType,
    OperatingHours,
    DayBoundary,
    Duration,
    Unplaced,
    UnknownReference,
}

#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub kind: ViolationKind,
    pub class_id: ClassId,
    pub details: serde_json::Value,
}

pub mod audit;
pub mod catalogue;
pub mod clash;
pub mod error;
pub mod feasibility;
pub mod grid;
pub mod scoring;
pub mod slots;
pub mod store;
pub mod writer;

pub use catalogue::{validate, Catalogue};
pub use clash::ClashIndex;
pub use error::{Phase, ScheduleError};
pub use feasibility::{can_place, check_placement, Rejection};
pub use grid::{Grid, Journal, Placement};
pub use store::{load_campus, AssignmentSink, SnapshotSource};
pub use types::{
    AnnealParams, Assignment, CampusId, CampusSnapshot, CampusStats, ClassSession, RoomSpec,
};

/// A finished, constraint-satisfying timetable for one campus.
#[derive(Clone, Debug)]
pub struct Solution {
    pub grid: Grid,
    pub energy: i64,
    pub stats: CampusStats,
}

/// Campus-level optimiser. Implementations are CPU-bound and synchronous;
/// callers on an async runtime should move them onto a blocking thread.
pub trait Solver: Send + Sync + 'static {
    fn solve(&self, cat: &Catalogue, params: &AnnealParams) -> Result<Solution, ScheduleError>;
}

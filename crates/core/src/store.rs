use crate::catalogue::Catalogue;
use crate::error::ScheduleError;
use async_trait::async_trait;
use tracing::debug;
use types::{Assignment, CampusId, CampusSnapshot, CourseId};

/// Read side of the record store.
#[async_trait]
pub trait SnapshotSource: Send + Sync + 'static {
    async fn campuses(&self) -> anyhow::Result<Vec<CampusId>>;

    async fn campus_of_course(&self, course: &CourseId) -> anyhow::Result<Option<CampusId>>;

    /// Rooms and class sessions (with teacher and derived student set) of one
    /// campus.
    async fn load_campus(&self, campus: &CampusId) -> anyhow::Result<CampusSnapshot>;
}

/// Write side of the record store.
#[async_trait]
pub trait AssignmentSink: Send + Sync + 'static {
    /// Upserts `(class, start, room)` for every assignment of one campus.
    /// Either all of them land or none do.
    async fn write_campus(&self, campus: &CampusId, assignments: &[Assignment]) -> anyhow::Result<()>;
}

/// Snapshot loader: any read failure or malformed snapshot aborts the run
/// for this campus.
pub async fn load_campus<S: SnapshotSource + ?Sized>(
    source: &S,
    campus: &CampusId,
) -> Result<Catalogue, ScheduleError> {
    let snapshot = source
        .load_campus(campus)
        .await
        .map_err(|source| ScheduleError::Load {
            campus: campus.clone(),
            source,
        })?;
    debug!(
        rooms = snapshot.rooms.len(),
        sessions = snapshot.sessions.len(),
        "loaded campus snapshot"
    );
    Catalogue::new(snapshot)
}

use crate::audit::audit;
use crate::catalogue::Catalogue;
use crate::error::ScheduleError;
use crate::grid::Grid;
use crate::store::AssignmentSink;
use tracing::{debug, info};
use types::Assignment;

/// Translates a frozen grid into one `(class, start, room)` row per session.
/// Continuation cells of a block are skipped.
pub fn assignments(grid: &Grid, cat: &Catalogue) -> Vec<Assignment> {
    grid.starts()
        .map(|(session, p)| Assignment {
            class_id: cat.session(session).id.clone(),
            start_slot: p.start,
            room_id: cat.room(p.room).id.clone(),
        })
        .collect()
}

/// Result writer: audits the grid, then persists the whole campus in a
/// single sink call. Returns the number of rows written.
pub async fn write_schedule<W: AssignmentSink + ?Sized>(
    sink: &W,
    grid: &Grid,
    cat: &Catalogue,
) -> Result<usize, ScheduleError> {
    let violations = audit(grid, cat);
    if !violations.is_empty() {
        return Err(ScheduleError::Audit {
            campus: cat.campus().clone(),
            violations,
        });
    }

    let rows = assignments(grid, cat);
    debug!(rows = rows.len(), "writing campus schedule");
    sink.write_campus(cat.campus(), &rows)
        .await
        .map_err(|source| ScheduleError::Write {
            campus: cat.campus().clone(),
            source,
        })?;
    info!(rows = rows.len(), "campus schedule written");
    Ok(rows.len())
}

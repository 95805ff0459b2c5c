use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use types::{Assignment, CampusId};

#[utoipa::path(
    get,
    path = "/v1/campuses/{id}/timetable",
    params(("id" = String, Path, description = "Campus ID")),
    responses(
        (status = 200, description = "Persisted assignments of the campus", body = [Assignment]),
        (status = 404, description = "Unknown campus")
    )
)]
pub async fn timetable(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Assignment>>, ApiError> {
    state
        .store
        .timetable(&CampusId(id))
        .map(Json)
        .map_err(|e| ApiError::NotFound(e.to_string()))
}

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use jobs::JobStatus;
use types::RunReport;

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Job status", body = JobStatus),
        (status = 404, description = "Unknown job")
    )
)]
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<JobStatus>, ApiError> {
    state
        .jobs
        .get(&id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("job {id} not found")))
}

#[utoipa::path(
    get,
    path = "/v1/jobs/{id}/result",
    params(("id" = String, Path, description = "Job ID")),
    responses(
        (status = 200, description = "Per-campus outcomes", body = RunReport),
        (status = 404, description = "Unknown job"),
        (status = 409, description = "Job not finished, or failed")
    )
)]
pub async fn result(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RunReport>, ApiError> {
    match state.jobs.get(&id) {
        Some(JobStatus::Completed { report }) => Ok(Json(report)),
        Some(JobStatus::Failed { message }) => Err(ApiError::Conflict(message)),
        Some(_) => Err(ApiError::Conflict(format!("job {id} is not finished"))),
        None => Err(ApiError::NotFound(format!("job {id} not found"))),
    }
}

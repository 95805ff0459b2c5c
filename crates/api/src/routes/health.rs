use crate::state::AppState;
use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
    pub campuses: usize,
}

#[utoipa::path(
    get,
    path = "/v1/health",
    responses((status = 200, description = "Service is up", body = Health))
)]
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    Json(Health {
        status: "ok",
        campuses: state.store.campus_count(),
    })
}

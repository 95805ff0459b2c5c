use axum::Json;
use sched_core::validate;
use serde::Serialize;
use types::CampusSnapshot;

#[derive(Serialize, utoipa::ToSchema)]
pub struct ValidationReport {
    pub ok: bool,
    pub errors: Vec<String>,
}

#[utoipa::path(
    post,
    path = "/v1/validate",
    request_body = CampusSnapshot,
    responses(
        (status = 200, description = "Validation result", body = ValidationReport)
    )
)]
pub async fn validate_handler(Json(snapshot): Json<CampusSnapshot>) -> Json<ValidationReport> {
    let errors: Vec<String> = validate(&snapshot).iter().map(ToString::to_string).collect();
    Json(ValidationReport {
        ok: errors.is_empty(),
        errors,
    })
}

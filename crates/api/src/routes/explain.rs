use crate::error::ApiError;
use axum::Json;
use sched_core::audit::audit_assignments;
use sched_core::scoring::{breakdown_of_starts, OFF_HOUR_PENALTY};
use sched_core::slots::{ideal_slot, label};
use sched_core::Catalogue;
use serde::{Deserialize, Serialize};
use types::{AnnealParams, Assignment, CampusSnapshot, Violation};
use utoipa::ToSchema;

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplainIn {
    pub snapshot: CampusSnapshot,
    pub assignments: Vec<Assignment>,
    #[serde(default)]
    pub ideal_hour: Option<u32>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExplainOut {
    /// Objective value; lower is better.
    pub energy: i64,
    pub feasible: bool,
    pub ideal_start: String,
    pub off_hour_penalty: i64,
    pub starts: usize,
    pub off_hour_starts: usize,
    pub distance_total: i64,
    pub violations: Vec<Violation>,
}

#[utoipa::path(
    post,
    path = "/v1/explain",
    request_body = ExplainIn,
    responses(
        (status = 200, description = "Energy breakdown and hard-rule violations", body = ExplainOut),
        (status = 400, description = "Malformed snapshot")
    )
)]
pub async fn explain(Json(input): Json<ExplainIn>) -> Result<Json<ExplainOut>, ApiError> {
    let hour = input
        .ideal_hour
        .unwrap_or_else(|| AnnealParams::default().ideal_hour);
    if hour >= 24 {
        return Err(ApiError::BadRequest(format!("idealHour must be below 24, got {hour}")));
    }
    let ideal = ideal_slot(hour);
    let cat = Catalogue::new(input.snapshot)?;
    let audit = audit_assignments(&cat, &input.assignments);
    let b = breakdown_of_starts(audit.starts(), ideal);

    Ok(Json(ExplainOut {
        energy: b.energy,
        feasible: audit.is_feasible(),
        ideal_start: label(ideal),
        off_hour_penalty: OFF_HOUR_PENALTY,
        starts: b.starts,
        off_hour_starts: b.off_hour_starts,
        distance_total: b.distance_total,
        violations: audit.violations,
    }))
}

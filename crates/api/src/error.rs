use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (code, message) = match self {
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m),
            ApiError::Conflict(m) => (StatusCode::CONFLICT, m),
        };
        (code, Json(json!({ "error": message }))).into_response()
    }
}

impl From<sched_core::ScheduleError> for ApiError {
    fn from(e: sched_core::ScheduleError) -> Self {
        ApiError::BadRequest(e.to_string())
    }
}

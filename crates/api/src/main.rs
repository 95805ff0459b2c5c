mod config;
mod error;
mod state;
mod telemetry;
pub mod routes {
    pub mod explain;
    pub mod generate;
    pub mod health;
    pub mod jobs;
    pub mod timetable;
    pub mod validate;
}

use axum::{
    routing::{get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
        paths(
            routes::health::health,
            routes::generate::generate,
            routes::jobs::status,
            routes::jobs::result,
            routes::validate::validate_handler,
            routes::explain::explain,
            routes::timetable::timetable,
        ),
        components(schemas(
            types::CampusSnapshot, types::RoomSpec, types::ClassSession, types::Assignment,
            types::GenerateRequest, types::ParamOverrides, types::AnnealParams,
            types::RunReport, types::CampusOutcome, types::CampusStatus, types::CampusStats,
            types::Violation, types::ViolationKind,
            types::CampusId, types::RoomId, types::ClassId, types::StaffId, types::StudentId,
            types::CourseId, types::SessionType,
            jobs::JobId, jobs::JobStatus,
            routes::health::Health,
            routes::validate::ValidationReport,
            routes::generate::JobCreated,
            routes::explain::ExplainIn,
            routes::explain::ExplainOut
        )),
        tags(
            (name = "timetable", description = "Weekly timetable generation API")
        )
    )]
struct ApiDoc;

fn app(state: state::AppState, body_limit: usize) -> Router {
    Router::new()
        .route("/v1/health", get(routes::health::health))
        .route("/v1/generate", post(routes::generate::generate))
        .route("/v1/validate", post(routes::validate::validate_handler))
        .route("/v1/explain", post(routes::explain::explain))
        .route("/v1/jobs/:id", get(routes::jobs::status))
        .route("/v1/jobs/:id/result", get(routes::jobs::result))
        .route("/v1/campuses/:id/timetable", get(routes::timetable::timetable))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(telemetry::stack(body_limit))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init();

    let config = config::Config::from_env()?;
    let app_state = state::AppState::from_config(&config)?;
    let app = app(app_state, config.body_limit);

    tracing::info!(addr = %config.listen, max_parallel = config.max_parallel, "listening");
    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use store::InMemStore;
    use tower::ServiceExt;
    use types::{Campus, ClassRecord, Course, Dataset, Location, Subject};

    fn dataset() -> Dataset {
        Dataset {
            campuses: vec![Campus {
                id: "main".into(),
                name: Some("Main".into()),
            }],
            locations: vec![Location {
                id: "hall".into(),
                campus_id: "main".into(),
                session_types: vec!["lecture".into()],
                name: None,
                capacity: Some(120),
            }],
            courses: vec![Course {
                id: "cs".into(),
                campus_id: "main".into(),
                name: None,
            }],
            subjects: vec![Subject {
                id: "algo".into(),
                course_id: "cs".into(),
                code: None,
            }],
            classes: vec![ClassRecord {
                id: "algo-lec".into(),
                subject_id: "algo".into(),
                session_type: "lecture".into(),
                duration_slots: 2,
                staff_id: Some("ada".into()),
                start_slot: None,
                room_id: None,
            }],
            enrollments: vec![],
        }
    }

    fn router() -> Router {
        let config = config::Config::from_lookup(|k| match k {
            "TIMETABLE__ANNEAL__K_MAX" => Some("20".into()),
            "TIMETABLE__ANNEAL__SEED" => Some("5".into()),
            _ => None,
        })
        .unwrap();
        app(state::AppState::new(InMemStore::new(dataset()), &config), config.body_limit)
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let req = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn health_reports_campuses() {
        let (status, body) = call(&router(), "GET", "/v1/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["campuses"], 1);
    }

    #[tokio::test]
    async fn validate_lists_problems() {
        let snapshot = json!({
            "campus": "main",
            "rooms": [],
            "sessions": [{ "id": "c1", "sessionType": "lecture", "duration": 30 }]
        });
        let (status, body) = call(&router(), "POST", "/v1/validate", Some(snapshot)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], false);
        assert!(body["errors"].as_array().unwrap().len() >= 2);
    }

    #[tokio::test]
    async fn explain_scores_and_audits() {
        let input = json!({
            "snapshot": {
                "campus": "main",
                "rooms": [{ "id": "hall", "sessionTypes": ["lecture"] }],
                "sessions": [{ "id": "c1", "sessionType": "lecture", "duration": 2 }]
            },
            "assignments": [{ "classId": "c1", "startSlot": 27, "roomId": "hall" }]
        });
        let (status, body) = call(&router(), "POST", "/v1/explain", Some(input)).await;
        assert_eq!(status, StatusCode::OK);
        // Half past 13:00: off-hour surcharge plus one slot of distance.
        assert_eq!(body["energy"], 101);
        assert_eq!(body["feasible"], true);
    }

    #[tokio::test]
    async fn explain_scores_each_known_class_once() {
        let input = json!({
            "snapshot": {
                "campus": "main",
                "rooms": [{ "id": "hall", "sessionTypes": ["lecture"] }],
                "sessions": [
                    { "id": "c1", "sessionType": "lecture", "duration": 2, "teacher": "ada" },
                    { "id": "c2", "sessionType": "lecture", "duration": 1, "teacher": "ada" }
                ]
            },
            "assignments": [
                { "classId": "c1", "startSlot": 26, "roomId": "hall" },
                { "classId": "c1", "startSlot": 27, "roomId": "hall" },
                { "classId": "ghost", "startSlot": 27, "roomId": "hall" },
                { "classId": "c2", "startSlot": u32::MAX, "roomId": "hall" }
            ]
        });
        let (status, body) = call(&router(), "POST", "/v1/explain", Some(input)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["feasible"], false);
        assert_eq!(body["starts"], 2);
    }

    #[tokio::test]
    async fn unknown_job_and_campus_are_404() {
        let app = router();
        let (status, _) = call(&app, "GET", "/v1/jobs/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, "GET", "/v1/campuses/nope/timetable", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn generate_then_read_timetable() {
        let app = router();
        let (status, body) = call(&app, "POST", "/v1/generate", Some(json!({}))).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        let job = body["jobId"].as_str().unwrap().to_string();

        let mut done = false;
        for _ in 0..500 {
            let (_, body) = call(&app, "GET", &format!("/v1/jobs/{job}"), None).await;
            if body["status"] == "Completed" {
                done = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(done, "job did not complete");

        let (status, report) = call(&app, "GET", &format!("/v1/jobs/{job}/result"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report["outcomes"][0]["status"], "solved");

        let (status, rows) = call(&app, "GET", "/v1/campuses/main/timetable", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rows[0]["classId"], "algo-lec");
        assert_eq!(rows[0]["roomId"], "hall");
    }
}

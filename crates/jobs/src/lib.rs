mod run;

pub use run::Generator;

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info};
use types::{GenerateRequest, RunReport};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
pub struct JobId(pub String);

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize, ToSchema)]
#[serde(tag = "status")]
pub enum JobStatus {
    Queued,
    Running,
    Completed { report: RunReport },
    Failed { message: String },
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Completed { .. } | JobStatus::Failed { .. })
    }
}

/// Generation job registry. Jobs run in the background; at most one
/// generation writes to the store at a time.
#[derive(Clone)]
pub struct InMemJobs {
    inner: Arc<RwLock<HashMap<String, JobStatus>>>,
    generator: Arc<Generator>,
    run_lock: Arc<Mutex<()>>,
}

impl InMemJobs {
    pub fn new(generator: Generator) -> Self {
        Self {
            inner: Default::default(),
            generator: Arc::new(generator),
            run_lock: Default::default(),
        }
    }

    pub fn enqueue(&self, req: GenerateRequest) -> JobId {
        let id = Uuid::new_v4().to_string();
        self.inner.write().insert(id.clone(), JobStatus::Queued);

        let map = self.inner.clone();
        let generator = self.generator.clone();
        let run_lock = self.run_lock.clone();
        let id_for_task = id.clone();

        tokio::spawn(async move {
            let _running = run_lock.lock().await;
            map.write().insert(id_for_task.clone(), JobStatus::Running);
            info!(job = %id_for_task, "generation job running");

            let status = match generator.run_generation(&req).await {
                Ok(report) => JobStatus::Completed { report },
                Err(e) => {
                    let message = format!("{e:#}");
                    error!(job = %id_for_task, error = %message, "generation job failed");
                    JobStatus::Failed { message }
                }
            };
            map.write().insert(id_for_task, status);
        });

        JobId(id)
    }

    pub fn get(&self, id: &str) -> Option<JobStatus> {
        self.inner.read().get(id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sched_core::AnnealParams;
    use solver_anneal::AnnealingSolver;
    use std::time::Duration;
    use store::InMemStore;
    use types::{Campus, ClassRecord, Course, Dataset, Location, Subject};

    fn store() -> InMemStore {
        InMemStore::new(Dataset {
            campuses: vec![Campus {
                id: "main".into(),
                name: None,
            }],
            locations: vec![Location {
                id: "hall".into(),
                campus_id: "main".into(),
                session_types: vec!["lecture".into()],
                name: None,
                capacity: None,
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
            classes: (0..4)
                .map(|i| ClassRecord {
                    id: format!("c{i}").as_str().into(),
                    subject_id: "algo".into(),
                    session_type: "lecture".into(),
                    duration_slots: 2,
                    staff_id: Some("ada".into()),
                    start_slot: None,
                    room_id: None,
                })
                .collect(),
            enrollments: vec![],
        })
    }

    fn jobs(store: &InMemStore) -> InMemJobs {
        let store = Arc::new(store.clone());
        InMemJobs::new(
            Generator::new(store.clone(), store, Arc::new(AnnealingSolver)).with_defaults(
                AnnealParams {
                    k_max: 50,
                    seed: Some(3),
                    ..AnnealParams::default()
                },
            ),
        )
    }

    async fn wait(jobs: &InMemJobs, id: &JobId) -> JobStatus {
        for _ in 0..500 {
            if let Some(s) = jobs.get(&id.0).filter(JobStatus::is_finished) {
                return s;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {} did not finish", id.0)
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn job_completes_with_report() {
        let store = store();
        let jobs = jobs(&store);
        let id = jobs.enqueue(GenerateRequest::default());
        assert!(jobs.get(&id.0).is_some());

        match wait(&jobs, &id).await {
            JobStatus::Completed { report } => {
                assert!(report.all_solved());
                assert_eq!(report.outcomes.len(), 1);
            }
            other => panic!("unexpected status {other:?}"),
        }
        assert_eq!(store.timetable(&"main".into()).unwrap().len(), 4);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn bad_filter_fails_the_job() {
        let jobs = jobs(&store());
        let id = jobs.enqueue(GenerateRequest {
            campus_id: Some("elsewhere".into()),
            ..Default::default()
        });
        assert!(matches!(wait(&jobs, &id).await, JobStatus::Failed { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn queued_jobs_all_finish() {
        let jobs = jobs(&store());
        let ids: Vec<_> = (0..3).map(|_| jobs.enqueue(GenerateRequest::default())).collect();
        for id in &ids {
            assert!(matches!(wait(&jobs, id).await, JobStatus::Completed { .. }));
        }
    }

    #[test]
    fn unknown_job_is_none() {
        let store = Arc::new(store());
        let jobs = InMemJobs::new(Generator::new(store.clone(), store, Arc::new(AnnealingSolver)));
        assert!(jobs.get("missing").is_none());
    }
}

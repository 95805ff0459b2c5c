use anyhow::{anyhow, bail};
use sched_core::writer::write_schedule;
use sched_core::{load_campus, AnnealParams, AssignmentSink, CampusStats, SnapshotSource, Solver};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, info_span, Instrument, Span};
use types::{CampusId, CampusOutcome, CampusStatus, GenerateRequest, RunReport};

#[derive(Clone)]
pub struct Generator {
    source: Arc<dyn SnapshotSource>,
    sink: Arc<dyn AssignmentSink>,
    solver: Arc<dyn Solver>,
    defaults: AnnealParams,
    max_parallel: usize,
}

impl Generator {
    pub fn new(
        source: Arc<dyn SnapshotSource>,
        sink: Arc<dyn AssignmentSink>,
        solver: Arc<dyn Solver>,
    ) -> Self {
        Self {
            source,
            sink,
            solver,
            defaults: AnnealParams::default(),
            max_parallel: 4,
        }
    }

    pub fn with_defaults(mut self, defaults: AnnealParams) -> Self {
        self.defaults = defaults;
        self
    }

    /// Campuses solved at once; at least one.
    pub fn with_max_parallel(mut self, n: usize) -> Self {
        self.max_parallel = n.max(1);
        self
    }

    /// Campuses a request covers. The scheduler always works per campus, so
    /// a course filter widens to the course's whole campus.
    pub async fn resolve(&self, req: &GenerateRequest) -> anyhow::Result<Vec<CampusId>> {
        let all = self.source.campuses().await?;
        if let Some(campus) = &req.campus_id {
            if !all.contains(campus) {
                bail!("unknown campus {campus}");
            }
            return Ok(vec![campus.clone()]);
        }
        if let Some(course) = &req.course_id {
            let campus = self
                .source
                .campus_of_course(course)
                .await?
                .ok_or_else(|| anyhow!("unknown course {course}"))?;
            return Ok(vec![campus]);
        }
        Ok(all)
    }

    /// Runs every campus the request covers, at most `max_parallel` at a
    /// time. A failing campus shows up in the report; it never stops the
    /// others.
    pub async fn run_generation(&self, req: &GenerateRequest) -> anyhow::Result<RunReport> {
        let campuses = self.resolve(req).await?;
        let params = match &req.params {
            Some(o) => o.apply(&self.defaults),
            None => self.defaults.clone(),
        };
        info!(campuses = campuses.len(), "generation started");

        let permits = Arc::new(Semaphore::new(self.max_parallel));
        let mut tasks = JoinSet::new();
        for (i, campus) in campuses.iter().cloned().enumerate() {
            let this = self.clone();
            let params = params.clone();
            let permits = permits.clone();
            tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                (i, this.run_campus(campus, &params).await)
            });
        }

        let mut slots: Vec<Option<CampusOutcome>> = vec![None; campuses.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((i, outcome)) => slots[i] = Some(outcome),
                Err(e) => error!(error = %e, "campus task aborted"),
            }
        }
        let outcomes: Vec<CampusOutcome> = slots
            .into_iter()
            .zip(campuses)
            .map(|(slot, campus)| {
                slot.unwrap_or_else(|| CampusOutcome {
                    campus,
                    status: CampusStatus::Failed {
                        message: "campus task aborted".into(),
                    },
                })
            })
            .collect();

        let solved = outcomes.iter().filter(|o| o.is_solved()).count();
        info!(solved, failed = outcomes.len() - solved, "generation finished");
        Ok(RunReport { outcomes })
    }

    /// Load, solve and write one campus. Errors end up in the outcome.
    pub async fn run_campus(&self, campus: CampusId, params: &AnnealParams) -> CampusOutcome {
        let span = info_span!("campus", campus = %campus);
        let status = match self.try_campus(&campus, params).instrument(span.clone()).await {
            Ok((stats, written)) => CampusStatus::Solved { stats, written },
            Err(e) => {
                let message = format!("{e:#}");
                span.in_scope(|| error!(error = %message, "campus failed"));
                CampusStatus::Failed { message }
            }
        };
        CampusOutcome { campus, status }
    }

    async fn try_campus(
        &self,
        campus: &CampusId,
        params: &AnnealParams,
    ) -> anyhow::Result<(CampusStats, usize)> {
        let cat = Arc::new(load_campus(self.source.as_ref(), campus).await?);
        info!(sessions = cat.sessions().len(), rooms = cat.rooms().len(), "campus loaded");

        let solution = {
            let cat = cat.clone();
            let params = params.clone();
            let solver = self.solver.clone();
            let span = Span::current();
            tokio::task::spawn_blocking(move || {
                let _entered = span.enter();
                solver.solve(&cat, &params)
            })
            .await
            .map_err(|e| anyhow!("solver task failed: {e}"))??
        };

        let written = write_schedule(self.sink.as_ref(), &solution.grid, &cat).await?;
        info!(
            energy = solution.energy,
            iterations = solution.stats.iterations,
            written,
            "campus solved"
        );
        Ok((solution.stats, written))
    }
}

use crate::initial::initial_state;
use crate::neighbor::{neighbor_size, perturb};
use rand::Rng;
use sched_core::scoring::energy;
use sched_core::slots::ideal_slot;
use sched_core::{AnnealParams, CampusStats, Catalogue, Grid, Journal, ScheduleError, Solution};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Temperature at iteration `k`: falls linearly from `t0` and reaches 0 on
/// the last iteration.
#[inline]
pub fn temperature(k: u32, k_max: u32, t0: f64) -> f64 {
    if k_max == 0 {
        return 0.0;
    }
    t0 * (1.0 - (k as f64 + 1.0) / k_max as f64)
}

/// Metropolis acceptance. Improving moves are always taken; anything else
/// needs a positive temperature and `exp(-delta / t) > u`.
#[inline]
pub fn accept(current: i64, candidate: i64, temperature: f64, u: f64) -> bool {
    if candidate < current {
        return true;
    }
    if !(temperature > 0.0) {
        return false;
    }
    let delta = (candidate - current) as f64;
    (-delta / temperature).exp() > u
}

pub fn validate_params(params: &AnnealParams) -> Result<(), ScheduleError> {
    let bad = |msg: String| Err(ScheduleError::InvalidParams(msg));
    if !(params.init_temp.is_finite() && params.init_temp >= 0.0) {
        return bad(format!("initTemp must be a non-negative number, got {}", params.init_temp));
    }
    if !(params.neighbor_fraction > 0.0 && params.neighbor_fraction <= 1.0) {
        return bad(format!(
            "neighborFraction must be in (0, 1], got {}",
            params.neighbor_fraction
        ));
    }
    if params.max_attempts == 0 {
        return bad("maxAttempts must be positive".into());
    }
    if params.ideal_hour >= 24 {
        return bad(format!("idealHour must be below 24, got {}", params.ideal_hour));
    }
    Ok(())
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnnealState {
    Running { energy: i64, iteration: u32 },
    Done { energy: i64 },
}

/// What happened in one iteration; handed to observers.
#[derive(Clone, Copy, Debug)]
pub struct Iteration {
    pub k: u32,
    pub temperature: f64,
    pub candidate_energy: i64,
    pub accepted: bool,
    /// Current energy after the decision.
    pub energy: i64,
}

pub struct Annealer<'a, R: Rng> {
    cat: &'a Catalogue,
    params: AnnealParams,
    rng: R,
    ideal: u32,
    lift: usize,

    grid: Grid,
    energy: i64,
    journal: Journal,

    best: Grid,
    best_energy: i64,
    initial_energy: i64,

    iteration: u32,
    accepted: u32,
    started: Instant,
    deadline: Option<Instant>,
    stopped_early: bool,
    done: bool,
}

impl<'a, R: Rng> Annealer<'a, R> {
    /// Builds the initial state and gets ready to iterate.
    pub fn new(cat: &'a Catalogue, params: &AnnealParams, mut rng: R) -> Result<Self, ScheduleError> {
        validate_params(params)?;
        let grid = initial_state(cat, &mut rng, params.max_attempts)?;
        Ok(Self::from_state(cat, params, rng, grid))
    }

    /// Starts from a given complete grid.
    pub fn from_state(cat: &'a Catalogue, params: &AnnealParams, rng: R, grid: Grid) -> Self {
        let ideal = ideal_slot(params.ideal_hour);
        let e = energy(&grid, ideal);
        let started = Instant::now();
        Self {
            cat,
            params: params.clone(),
            rng,
            ideal,
            lift: neighbor_size(cat.sessions().len(), params.neighbor_fraction),
            best: grid.clone(),
            grid,
            energy: e,
            journal: Journal::new(),
            best_energy: e,
            initial_energy: e,
            iteration: 0,
            accepted: 0,
            started,
            deadline: params
                .time_limit_ms
                .map(|ms| started + Duration::from_millis(ms)),
            stopped_early: false,
            done: false,
        }
    }

    pub fn state(&self) -> AnnealState {
        if self.done {
            AnnealState::Done {
                energy: self.best_energy,
            }
        } else {
            AnnealState::Running {
                energy: self.energy,
                iteration: self.iteration,
            }
        }
    }

    /// Runs one iteration. Returns `None` once the run is done.
    pub fn step(&mut self) -> Result<Option<Iteration>, ScheduleError> {
        if self.done {
            return Ok(None);
        }
        if self.iteration >= self.params.k_max {
            self.done = true;
            return Ok(None);
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                warn!(
                    iteration = self.iteration,
                    k_max = self.params.k_max,
                    "time limit reached, stopping early"
                );
                self.stopped_early = true;
                self.done = true;
                return Ok(None);
            }
        }

        let k = self.iteration;
        let t = temperature(k, self.params.k_max, self.params.init_temp);
        perturb(
            &mut self.grid,
            &mut self.journal,
            self.cat,
            &mut self.rng,
            self.lift,
            self.params.max_attempts,
        )?;
        let candidate = energy(&self.grid, self.ideal);
        let u: f64 = self.rng.gen();

        let accepted = accept(self.energy, candidate, t, u);
        if accepted {
            self.journal.commit();
            self.energy = candidate;
            self.accepted += 1;
            if candidate < self.best_energy {
                self.best_energy = candidate;
                self.best.clone_from(&self.grid);
            }
        } else {
            self.journal.rollback(&mut self.grid);
        }
        self.iteration += 1;

        if self.iteration % 100 == 0 {
            debug!(
                iteration = self.iteration,
                temperature = t,
                energy = self.energy,
                best = self.best_energy,
                accepted = self.accepted,
                "annealing progress"
            );
        }

        Ok(Some(Iteration {
            k,
            temperature: t,
            candidate_energy: candidate,
            accepted,
            energy: self.energy,
        }))
    }

    pub fn run(self) -> Result<Solution, ScheduleError> {
        self.run_observed(|_| {})
    }

    pub fn run_observed(
        mut self,
        mut observe: impl FnMut(&Iteration),
    ) -> Result<Solution, ScheduleError> {
        while let Some(it) = self.step()? {
            observe(&it);
        }
        Ok(self.finish())
    }

    /// Best state seen so far, with run statistics.
    pub fn finish(self) -> Solution {
        let stats = CampusStats {
            sessions: self.cat.sessions().len(),
            rooms: self.cat.rooms().len(),
            clash_pairs: self.cat.clashes().pair_count(),
            initial_energy: self.initial_energy,
            final_energy: self.best_energy,
            iterations: self.iteration,
            accepted: self.accepted,
            elapsed_ms: self.started.elapsed().as_millis() as u64,
            stopped_early: self.stopped_early,
        };
        Solution {
            grid: self.best,
            energy: self.best_energy,
            stats,
        }
    }
}

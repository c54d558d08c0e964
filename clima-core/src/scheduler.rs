//! Fixed-period job loop driving the [`Pipeline`].

use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::pipeline::{CycleOutcome, Pipeline};

pub const JOB_NAME: &str = "fetch-and-store";

/// How often the loop checks whether the job is due.
pub const TICK_RESOLUTION: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// A named job with a fixed period. The first run is due one period after
/// registration; each later run is due one period after the previous run
/// finished.
#[derive(Debug, Clone)]
pub struct Job {
    name: &'static str,
    period: Duration,
    next_run: Instant,
    last_run: Option<Instant>,
}

impl Job {
    pub fn new(name: &'static str, period: Duration, now: Instant) -> Self {
        Self { name, period, next_run: now + period, last_run: None }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn next_run(&self) -> Instant {
        self.next_run
    }

    pub fn last_run(&self) -> Option<Instant> {
        self.last_run
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.next_run
    }

    fn finished(&mut self, started: Instant, now: Instant) {
        self.last_run = Some(started);
        self.next_run = now + self.period;
    }
}

#[derive(Debug)]
pub struct Scheduler {
    job: Job,
    pipeline: Pipeline,
    state: SchedulerState,
}

impl Scheduler {
    pub fn new(pipeline: Pipeline, period: Duration) -> Self {
        Self {
            job: Job::new(JOB_NAME, period, Instant::now()),
            pipeline,
            state: SchedulerState::Idle,
        }
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Run the job inline if it is due. Returns the cycle outcome when it ran.
    pub async fn run_pending(&mut self) -> Option<CycleOutcome> {
        let started = Instant::now();
        if !self.job.is_due(started) {
            return None;
        }

        self.state = SchedulerState::Running;
        debug!(job = self.job.name, "running job");

        let outcome = self.pipeline.run_cycle().await;

        self.job.finished(started, Instant::now());
        self.state = SchedulerState::Idle;
        Some(outcome)
    }

    /// Check the job forever. Cycle failures are already logged by the
    /// pipeline and never stop the loop.
    pub async fn run(mut self) {
        info!(
            job = self.job.name,
            period_secs = self.job.period.as_secs_f64(),
            cities = self.pipeline.rotator().len(),
            "weather pipeline started"
        );

        loop {
            self.run_pending().await;
            sleep(TICK_RESOLUTION).await;
        }
    }
}

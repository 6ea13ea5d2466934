//! Shared fakes and polling helpers for worker integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyperlab_core::experiment::ExperimentParams;
use hyperlab_core::types::DbId;
use hyperlab_db::models::experiment::Experiment;
use hyperlab_db::repositories::ExperimentRepo;
use hyperlab_worker::progress::ProgressReporter;
use hyperlab_worker::task::{TaskError, TrainingOutcome, TrainingTask};
use sqlx::SqlitePool;

/// Give up waiting on a background task after this long.
pub const WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Reports every epoch with loss `1 / epoch`, then returns `accuracy`.
pub struct SteppingTask {
    pub step_delay: Duration,
    pub accuracy: f64,
}

impl SteppingTask {
    pub fn quick() -> Self {
        Self {
            step_delay: Duration::from_millis(5),
            accuracy: 0.75,
        }
    }
}

impl TrainingTask for SteppingTask {
    async fn run(
        &self,
        params: ExperimentParams,
        mut progress: ProgressReporter,
    ) -> Result<TrainingOutcome, TaskError> {
        for epoch in 1..=params.epochs {
            tokio::time::sleep(self.step_delay).await;
            progress.report(epoch, 1.0 / epoch as f64).await?;
        }
        Ok(TrainingOutcome {
            accuracy: self.accuracy,
        })
    }
}

/// Reports one step, then fails.
pub struct FailingTask;

impl TrainingTask for FailingTask {
    async fn run(
        &self,
        _params: ExperimentParams,
        mut progress: ProgressReporter,
    ) -> Result<TrainingOutcome, TaskError> {
        progress.report(1, 0.5).await?;
        Err(TaskError::Failed("out of memory".into()))
    }
}

/// Panics before reporting anything.
pub struct PanickingTask;

impl TrainingTask for PanickingTask {
    async fn run(
        &self,
        _params: ExperimentParams,
        _progress: ProgressReporter,
    ) -> Result<TrainingOutcome, TaskError> {
        panic!("training exploded");
    }
}

/// Tracks how many instances run at the same time.
#[derive(Default)]
pub struct CountingTask {
    pub active: AtomicUsize,
    pub peak: AtomicUsize,
}

impl TrainingTask for CountingTask {
    async fn run(
        &self,
        _params: ExperimentParams,
        _progress: ProgressReporter,
    ) -> Result<TrainingOutcome, TaskError> {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(30)).await;
        self.active.fetch_sub(1, Ordering::SeqCst);
        Ok(TrainingOutcome { accuracy: 0.5 })
    }
}

pub fn shared<T>(task: T) -> Arc<T> {
    Arc::new(task)
}

pub async fn fetch(pool: &SqlitePool, id: DbId) -> Experiment {
    ExperimentRepo::find_by_id(pool, id)
        .await
        .unwrap()
        .unwrap_or_else(|| panic!("experiment {id} missing"))
}

/// Poll until experiment `id` is done, returning the final record.
pub async fn wait_until_done(pool: &SqlitePool, id: DbId) -> Experiment {
    let deadline = tokio::time::Instant::now() + WAIT_TIMEOUT;
    loop {
        let exp = fetch(pool, id).await;
        if exp.is_done() {
            return exp;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "experiment {id} did not finish in time: {exp:?}"
        );
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

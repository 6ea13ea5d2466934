//! Background execution of training tasks.
//!
//! Each spawned task runs on its own Tokio task, fire-and-forget. Task
//! errors and panics are contained here: they are logged, the experiment
//! stays `running`, and neither the caller nor other jobs are affected.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use hyperlab_core::experiment::ExperimentParams;
use hyperlab_core::types::DbId;
use hyperlab_db::repositories::ExperimentRepo;
use hyperlab_db::DbPool;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::progress::ProgressReporter;
use crate::task::{TaskError, TrainingOutcome, TrainingTask};

/// Launches training tasks and records their results.
///
/// Cheaply cloneable. With a concurrency limit, spawned tasks queue on a
/// semaphore; their records already exist and show as `running` at step 0
/// while they wait.
#[derive(Clone)]
pub struct TaskRunner {
    pool: DbPool,
    limit: Option<usize>,
    limiter: Option<Arc<Semaphore>>,
}

impl TaskRunner {
    /// A runner that starts every task immediately.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            limit: None,
            limiter: None,
        }
    }

    /// A runner that executes at most `max_concurrent` tasks at once.
    /// `0` means unbounded.
    pub fn with_concurrency_limit(pool: DbPool, max_concurrent: usize) -> Self {
        let limit = (max_concurrent > 0).then_some(max_concurrent);
        Self {
            pool,
            limit,
            limiter: limit.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Maximum number of tasks executing at once, if bounded.
    pub fn concurrency_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Start `task` for experiment `id` in the background and return at once.
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn spawn<T>(&self, id: DbId, params: ExperimentParams, task: Arc<T>) -> JoinHandle<()>
    where
        T: TrainingTask + 'static,
    {
        let pool = self.pool.clone();
        let limiter = self.limiter.clone();
        let span = tracing::info_span!("experiment", experiment_id = id);

        tokio::spawn(
            async move {
                let _permit = match limiter {
                    Some(semaphore) => match semaphore.acquire_owned().await {
                        Ok(permit) => Some(permit),
                        Err(e) => {
                            tracing::error!(error = %e, "Concurrency limiter closed, task not started");
                            return;
                        }
                    },
                    None => None,
                };

                tracing::info!(
                    lr = params.lr,
                    epochs = params.epochs,
                    batch_size = params.batch_size,
                    "Training task started",
                );

                let reporter = ProgressReporter::new(pool.clone(), id, params.epochs);
                let started = Instant::now();
                let outcome = AssertUnwindSafe(task.run(params, reporter))
                    .catch_unwind()
                    .await;
                let runtime = started.elapsed().as_secs_f64();

                match outcome {
                    Ok(Ok(result)) => finish(&pool, id, result, runtime).await,
                    Ok(Err(e)) => {
                        tracing::error!(
                            error = %e,
                            "Training task failed; experiment left running",
                        );
                    }
                    Err(panic) => {
                        tracing::error!(
                            panic = panic_message(panic.as_ref()),
                            "Training task panicked; experiment left running",
                        );
                    }
                }
            }
            .instrument(span),
        )
    }
}

/// Write the terminal state for a successful run.
async fn finish(pool: &DbPool, id: DbId, result: TrainingOutcome, runtime: f64) {
    if !result.accuracy.is_finite() {
        let e = TaskError::Failed(format!("non-finite accuracy {}", result.accuracy));
        tracing::error!(error = %e, "Training task failed; experiment left running");
        return;
    }

    match ExperimentRepo::complete(pool, id, result.accuracy, runtime).await {
        Ok(true) => {
            tracing::info!(
                accuracy = result.accuracy,
                runtime_secs = runtime,
                "Experiment completed",
            );
        }
        Ok(false) => {
            tracing::warn!("Experiment finished but its record is gone or already done");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to record experiment result");
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = panic.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

//! Per-experiment progress reporter handed to a running task.

use hyperlab_core::types::DbId;
use hyperlab_db::repositories::ExperimentRepo;
use hyperlab_db::DbPool;

use crate::task::TaskError;

/// Publishes incremental progress for exactly one experiment.
///
/// Owned by the task, so reports for one id come from a single writer and
/// are totally ordered. Steps must be non-decreasing and at most
/// `total_steps`; metrics must be finite.
#[derive(Debug)]
pub struct ProgressReporter {
    pool: DbPool,
    experiment_id: DbId,
    total_steps: i64,
    last_step: i64,
}

impl ProgressReporter {
    pub fn new(pool: DbPool, experiment_id: DbId, total_steps: i64) -> Self {
        Self {
            pool,
            experiment_id,
            total_steps,
            last_step: 0,
        }
    }

    /// The last step successfully reported (0 before the first report).
    pub fn last_step(&self) -> i64 {
        self.last_step
    }

    /// Record that `step` steps are complete and the latest metric is `metric`.
    pub async fn report(&mut self, step: i64, metric: f64) -> Result<(), TaskError> {
        if step < self.last_step || step > self.total_steps {
            return Err(self.invalid(format!(
                "step {step} outside {}..={}",
                self.last_step, self.total_steps
            )));
        }
        if !metric.is_finite() {
            return Err(self.invalid(format!("metric {metric} is not finite")));
        }

        let written =
            ExperimentRepo::update_progress(&self.pool, self.experiment_id, step, metric).await?;
        if !written {
            // Row cleared by a reset (or otherwise no longer running).
            tracing::debug!(
                experiment_id = self.experiment_id,
                step,
                "Progress update matched no running experiment",
            );
        }

        self.last_step = step;
        Ok(())
    }

    fn invalid(&self, reason: String) -> TaskError {
        TaskError::InvalidProgress {
            experiment_id: self.experiment_id,
            reason,
        }
    }
}

//! The seam between the job runner and a training procedure.

use std::future::Future;

use hyperlab_core::experiment::ExperimentParams;
use hyperlab_core::types::DbId;

use crate::progress::ProgressReporter;

/// Final result of a training run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingOutcome {
    /// Test accuracy in `0.0..=1.0`.
    pub accuracy: f64,
}

/// Errors a training task (or the runner on its behalf) can raise.
///
/// None of these ever reach the submitter: the runner logs them and leaves
/// the experiment `running`.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    /// Writing progress or the result to the store failed.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A progress report broke the reporter's contract.
    #[error("Invalid progress report for experiment {experiment_id}: {reason}")]
    InvalidProgress { experiment_id: DbId, reason: String },

    /// A blocking compute section panicked or was cancelled.
    #[error("Compute task aborted: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// The training procedure itself gave up.
    #[error("Training failed: {0}")]
    Failed(String),
}

/// A long-running training procedure.
///
/// Implementations receive the experiment's parameters and a
/// [`ProgressReporter`] bound to its id, report progress as they go, and
/// return the final outcome. The runner owns timing and the terminal write.
pub trait TrainingTask: Send + Sync {
    fn run(
        &self,
        params: ExperimentParams,
        progress: ProgressReporter,
    ) -> impl Future<Output = Result<TrainingOutcome, TaskError>> + Send;
}

//! Submission and reset entry points used by the HTTP layer.

use std::sync::Arc;

use hyperlab_core::experiment::ExperimentParams;
use hyperlab_core::types::DbId;
use hyperlab_db::repositories::ExperimentRepo;
use hyperlab_db::DbPool;

use crate::registry::JobRegistry;
use crate::runner::TaskRunner;
use crate::task::TrainingTask;

/// What happened to a submission. Both variants are success for the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A new experiment was created and its task started.
    Started(DbId),
    /// An experiment with the same parameters already exists.
    Duplicate,
}

/// Admits submissions and launches their training tasks.
pub struct JobService<T> {
    pool: DbPool,
    registry: JobRegistry,
    runner: TaskRunner,
    task: Arc<T>,
}

impl<T> JobService<T>
where
    T: TrainingTask + 'static,
{
    pub fn new(pool: DbPool, runner: TaskRunner, task: T) -> Self {
        Self {
            registry: JobRegistry::new(pool.clone()),
            pool,
            runner,
            task: Arc::new(task),
        }
    }

    /// Admit `params` and, if novel, start training in the background.
    ///
    /// The record is committed before the task is handed off, so an
    /// identical submission arriving afterwards is recognised as duplicate.
    pub async fn submit_job(&self, params: ExperimentParams) -> Result<Admission, sqlx::Error> {
        match self.registry.submit(&params).await? {
            Some(id) => {
                // Fire-and-forget; the runner logs the outcome.
                drop(self.runner.spawn(id, params, Arc::clone(&self.task)));
                Ok(Admission::Started(id))
            }
            None => Ok(Admission::Duplicate),
        }
    }

    /// Delete every experiment record. Tasks still running keep running;
    /// their writes no longer match any row.
    pub async fn reset(&self) -> Result<u64, sqlx::Error> {
        let deleted = ExperimentRepo::clear_all(&self.pool).await?;
        tracing::warn!(deleted, "All experiments reset");
        Ok(deleted)
    }
}

//! Experiment row model and the two client-facing projections of it.

use hyperlab_core::experiment::{ExperimentParams, ExperimentStatus};
use hyperlab_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `experiments` table.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct Experiment {
    pub id: DbId,
    pub lr: f64,
    pub epochs: i64,
    pub batch_size: i64,
    /// Final test accuracy; `0.0` until the experiment is done.
    pub accuracy: f64,
    /// Training wall time in seconds; `0.0` until the experiment is done.
    pub runtime: f64,
    #[sqlx(try_from = "String")]
    pub status: ExperimentStatus,
    pub current_epoch: i64,
    /// Most recently reported training loss.
    pub loss: f64,
}

impl Experiment {
    pub fn params(&self) -> ExperimentParams {
        ExperimentParams::new(self.lr, self.epochs, self.batch_size)
    }

    pub fn is_done(&self) -> bool {
        self.status == ExperimentStatus::Done
    }
}

/// Which rows a listing returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExperimentFilter {
    All,
    Status(ExperimentStatus),
}

/// Entry of `GET /api/experiments`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExperimentSummary {
    pub id: DbId,
    pub lr: f64,
    pub epochs: i64,
    pub batch_size: i64,
    pub accuracy: f64,
    pub runtime: f64,
    pub status: ExperimentStatus,
}

impl From<Experiment> for ExperimentSummary {
    fn from(exp: Experiment) -> Self {
        Self {
            id: exp.id,
            lr: exp.lr,
            epochs: exp.epochs,
            batch_size: exp.batch_size,
            accuracy: exp.accuracy,
            runtime: exp.runtime,
            status: exp.status,
        }
    }
}

/// Entry of `GET /api/running_jobs`: enough to draw a progress bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunningJob {
    pub id: DbId,
    pub epochs: i64,
    pub current_epoch: i64,
    pub loss: f64,
}

impl From<Experiment> for RunningJob {
    fn from(exp: Experiment) -> Self {
        Self {
            id: exp.id,
            epochs: exp.epochs,
            current_epoch: exp.current_epoch,
            loss: exp.loss,
        }
    }
}

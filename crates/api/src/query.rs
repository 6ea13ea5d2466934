//! Read-only experiment views and their query parameters.
//!
//! Both views are snapshots of the store at call time; they never write
//! and may be called by any number of pollers concurrently.

use hyperlab_core::experiment::{ExperimentStatus, SortDirection, SortKey};
use hyperlab_db::models::experiment::{Experiment, ExperimentFilter};
use hyperlab_db::repositories::ExperimentRepo;
use hyperlab_db::DbPool;
use serde::Deserialize;

/// Query parameters for `GET /api/experiments` (`?sort=&direction=`).
///
/// Both are free-form strings: unknown values fall back to the defaults
/// rather than rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ExperimentListParams {
    pub sort: Option<String>,
    pub direction: Option<String>,
}

impl ExperimentListParams {
    pub fn sort_key(&self) -> SortKey {
        SortKey::parse(self.sort.as_deref())
    }

    pub fn direction(&self) -> SortDirection {
        SortDirection::parse(self.direction.as_deref())
    }
}

/// Read-side service over the experiment store.
#[derive(Clone)]
pub struct QueryService {
    pool: DbPool,
}

impl QueryService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Every experiment, running or done, ordered by `sort` in `direction`.
    /// Running experiments sort with their zero-valued result fields.
    pub async fn list_completed(
        &self,
        sort: SortKey,
        direction: SortDirection,
    ) -> Result<Vec<Experiment>, sqlx::Error> {
        ExperimentRepo::list(&self.pool, ExperimentFilter::All, Some(sort), direction).await
    }

    /// Experiments still running, in id order.
    pub async fn list_running(&self) -> Result<Vec<Experiment>, sqlx::Error> {
        ExperimentRepo::list(
            &self.pool,
            ExperimentFilter::Status(ExperimentStatus::Running),
            None,
            SortDirection::Asc,
        )
        .await
    }
}

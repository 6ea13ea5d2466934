//! Repository for the `experiments` table.
//!
//! Writes are guarded in SQL so a record can only move forward: progress
//! never decreases and never exceeds `epochs`, and nothing changes once the
//! row is `done`.

use hyperlab_core::experiment::{ExperimentParams, ExperimentStatus, SortDirection, SortKey};
use hyperlab_core::types::DbId;

use crate::models::experiment::{Experiment, ExperimentFilter};
use crate::DbPool;

/// Column list for `experiments` queries.
const COLUMNS: &str = "\
    id, lr, epochs, batch_size, accuracy, runtime, status, current_epoch, loss";

/// Provides storage operations for experiments.
pub struct ExperimentRepo;

impl ExperimentRepo {
    /// Insert a new `running` experiment at step 0. Returns its id.
    pub async fn insert(pool: &DbPool, params: &ExperimentParams) -> Result<DbId, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO experiments (lr, epochs, batch_size, status) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(params.lr)
        .bind(params.epochs)
        .bind(params.batch_size)
        .bind(ExperimentStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Whether any experiment, in any status, has exactly these parameters.
    pub async fn exists(pool: &DbPool, params: &ExperimentParams) -> Result<bool, sqlx::Error> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM experiments \
             WHERE lr = ?1 AND epochs = ?2 AND batch_size = ?3 \
             LIMIT 1",
        )
        .bind(params.lr)
        .bind(params.epochs)
        .bind(params.batch_size)
        .fetch_optional(pool)
        .await?;
        Ok(found.is_some())
    }

    /// Record training progress for a running experiment.
    ///
    /// Returns `false` when nothing was written: the row is gone (store
    /// reset), already done, or `step` would move progress backwards or
    /// past `epochs`.
    pub async fn update_progress(
        pool: &DbPool,
        id: DbId,
        step: i64,
        loss: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE experiments SET current_epoch = ?2, loss = ?3 \
             WHERE id = ?1 AND status = ?4 \
               AND current_epoch <= ?2 AND ?2 <= epochs",
        )
        .bind(id)
        .bind(step)
        .bind(loss)
        .bind(ExperimentStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Mark a running experiment as done together with its result.
    ///
    /// Status, accuracy and runtime change in a single statement, so no
    /// reader ever sees `done` without a result. Returns `false` if the row
    /// is gone or was already done.
    pub async fn complete(
        pool: &DbPool,
        id: DbId,
        accuracy: f64,
        runtime: f64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE experiments SET status = ?2, accuracy = ?3, runtime = ?4 \
             WHERE id = ?1 AND status = ?5",
        )
        .bind(id)
        .bind(ExperimentStatus::Done.as_str())
        .bind(accuracy)
        .bind(runtime)
        .bind(ExperimentStatus::Running.as_str())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Find an experiment by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> Result<Option<Experiment>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM experiments WHERE id = ?1");
        sqlx::query_as::<_, Experiment>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List experiments matching `filter`.
    ///
    /// With a `sort` key, rows are ordered by that column in `direction`;
    /// without one they come back in id order. Ties always break on
    /// ascending id.
    pub async fn list(
        pool: &DbPool,
        filter: ExperimentFilter,
        sort: Option<SortKey>,
        direction: SortDirection,
    ) -> Result<Vec<Experiment>, sqlx::Error> {
        let where_clause = match filter {
            ExperimentFilter::All => "",
            ExperimentFilter::Status(_) => "WHERE status = ?1",
        };
        let order_clause = match sort {
            Some(key) => format!("ORDER BY {} {}, id ASC", key.column(), direction.as_sql()),
            None => "ORDER BY id ASC".to_string(),
        };
        let query = format!("SELECT {COLUMNS} FROM experiments {where_clause} {order_clause}");

        let mut q = sqlx::query_as::<_, Experiment>(&query);
        if let ExperimentFilter::Status(status) = filter {
            q = q.bind(status.as_str());
        }
        q.fetch_all(pool).await
    }

    /// Delete every experiment. Returns the number of rows removed.
    pub async fn clear_all(pool: &DbPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM experiments").execute(pool).await?;
        tracing::debug!(deleted = result.rows_affected(), "Cleared experiments table");
        Ok(result.rows_affected())
    }
}

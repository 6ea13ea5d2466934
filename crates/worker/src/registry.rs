//! Admission gatekeeper: deduplication and record creation.

use hyperlab_core::experiment::ExperimentParams;
use hyperlab_core::types::DbId;
use hyperlab_db::repositories::ExperimentRepo;
use hyperlab_db::DbPool;

/// Creates experiment records, at most one per distinct parameter tuple.
///
/// Dedup is best-effort: the existence check and the insert are separate
/// statements, so two identical submissions racing through the same narrow
/// window can both be admitted. Sequential duplicates are always rejected.
#[derive(Clone)]
pub struct JobRegistry {
    pool: DbPool,
}

impl JobRegistry {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Admit `params` if no experiment with the same tuple exists.
    ///
    /// Returns the new id, or `None` for a duplicate. On `Some`, the
    /// `running` record is committed before this returns.
    pub async fn submit(&self, params: &ExperimentParams) -> Result<Option<DbId>, sqlx::Error> {
        if ExperimentRepo::exists(&self.pool, params).await? {
            tracing::debug!(
                lr = params.lr,
                epochs = params.epochs,
                batch_size = params.batch_size,
                "Duplicate submission ignored",
            );
            return Ok(None);
        }

        let id = ExperimentRepo::insert(&self.pool, params).await?;
        tracing::info!(
            experiment_id = id,
            lr = params.lr,
            epochs = params.epochs,
            batch_size = params.batch_size,
            "Experiment admitted",
        );
        Ok(Some(id))
    }
}

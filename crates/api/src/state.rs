use std::sync::Arc;

use hyperlab_worker::runner::TaskRunner;
use hyperlab_worker::service::JobService;
use hyperlab_worker::trainer::SyntheticTrainer;

use crate::config::ServerConfig;
use crate::query::QueryService;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: hyperlab_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Admission and reset of training jobs.
    pub jobs: Arc<JobService<SyntheticTrainer>>,
    /// Read-only experiment views for polling clients.
    pub queries: QueryService,
}

impl AppState {
    /// Wire the job service and query service around `pool`.
    pub fn new(pool: hyperlab_db::DbPool, config: ServerConfig, trainer: SyntheticTrainer) -> Self {
        let runner = TaskRunner::with_concurrency_limit(pool.clone(), config.max_concurrent_jobs);
        Self {
            jobs: Arc::new(JobService::new(pool.clone(), runner, trainer)),
            queries: QueryService::new(pool.clone()),
            config: Arc::new(config),
            pool,
        }
    }
}

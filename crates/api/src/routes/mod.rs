pub mod experiments;
pub mod health;

use axum::Router;

use crate::state::AppState;

/// Build the full route tree (without middleware).
///
/// ```text
/// GET    /health                 service + database health
/// GET    /                       UI shell
/// POST   /                       submit experiment (form)
/// GET    /api/experiments        all experiments, sorted
/// GET    /api/running_jobs       running experiments
/// POST   /reset                  delete all experiments
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(experiments::router())
}

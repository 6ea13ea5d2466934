//! Route definitions for experiments.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{experiments, ui};
use crate::state::AppState;

/// Routes mounted at the root.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(ui::index).post(experiments::submit_experiment))
        .route("/api/experiments", get(experiments::list_experiments))
        .route("/api/running_jobs", get(experiments::list_running_jobs))
        .route("/reset", post(experiments::reset))
}

//! Handlers for experiment submission, polling, and reset.
//!
//! Submissions are idempotent from the client's point of view: a duplicate
//! parameter tuple is absorbed and acknowledged like a new one.

use axum::extract::rejection::FormRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::{Form, Json};
use hyperlab_core::experiment::ExperimentParams;
use hyperlab_db::models::experiment::{ExperimentSummary, RunningJob};
use hyperlab_worker::service::Admission;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::query::ExperimentListParams;
use crate::state::AppState;

/// Form body of `POST /`.
#[derive(Debug, Deserialize)]
pub struct SubmitExperimentForm {
    pub lr: f64,
    pub epochs: i64,
    pub batch_size: i64,
}

impl From<SubmitExperimentForm> for ExperimentParams {
    fn from(form: SubmitExperimentForm) -> Self {
        ExperimentParams::new(form.lr, form.epochs, form.batch_size)
    }
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /
///
/// Admit a training job and redirect back to the UI. The job id is not
/// returned; clients discover jobs by polling.
pub async fn submit_experiment(
    State(state): State<AppState>,
    form: Result<Form<SubmitExperimentForm>, FormRejection>,
) -> AppResult<impl IntoResponse> {
    let Form(input) = form.map_err(|e| AppError::BadRequest(e.body_text()))?;
    let params = ExperimentParams::from(input);
    params.validate()?;

    match state.jobs.submit_job(params).await? {
        Admission::Started(id) => {
            tracing::info!(experiment_id = id, "Experiment submitted");
        }
        Admission::Duplicate => {
            tracing::info!(
                lr = params.lr,
                epochs = params.epochs,
                batch_size = params.batch_size,
                "Duplicate experiment submission absorbed",
            );
        }
    }

    Ok(Redirect::to("/"))
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

/// GET /api/experiments?sort=&direction=
///
/// All experiments ordered by `accuracy` (default) or `runtime`,
/// descending unless `direction=asc`.
pub async fn list_experiments(
    State(state): State<AppState>,
    Query(params): Query<ExperimentListParams>,
) -> AppResult<Json<Vec<ExperimentSummary>>> {
    let experiments = state
        .queries
        .list_completed(params.sort_key(), params.direction())
        .await?;
    Ok(Json(experiments.into_iter().map(Into::into).collect()))
}

/// GET /api/running_jobs
pub async fn list_running_jobs(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<RunningJob>>> {
    let running = state.queries.list_running().await?;
    Ok(Json(running.into_iter().map(Into::into).collect()))
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

/// POST /reset
///
/// Delete every experiment. Unconditional; confirmation is the UI's job.
pub async fn reset(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.jobs.reset().await?;
    Ok(StatusCode::NO_CONTENT)
}

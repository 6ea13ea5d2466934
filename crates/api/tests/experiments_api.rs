//! HTTP-level integration tests for experiment submission, polling, and reset.
//!
//! Uses Axum's `tower::ServiceExt` to send requests directly to the router.
//! Training runs on the real synthetic trainer, shrunk to finish in
//! milliseconds.

mod common;

use axum::http::header::{CONTENT_TYPE, LOCATION};
use axum::http::StatusCode;
use common::{body_bytes, body_json, build_test_app, get, post_empty, post_form, wait_until_idle};
use sqlx::SqlitePool;

async fn experiment_count(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM experiments")
        .fetch_one(pool)
        .await
        .unwrap()
}

// ---------------------------------------------------------------------------
// Submission
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn submit_redirects_and_creates_record(pool: SqlitePool) {
    let app = build_test_app(pool.clone());

    let response = post_form(app.clone(), "/", "lr=0.01&epochs=3&batch_size=32").await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[LOCATION], "/");

    assert_eq!(experiment_count(&pool).await, 1);

    wait_until_idle(&app).await;
    let json = body_json(get(app, "/api/experiments").await).await;
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["lr"], 0.01);
    assert_eq!(rows[0]["epochs"], 3);
    assert_eq!(rows[0]["batch_size"], 32);
    assert_eq!(rows[0]["status"], "done");
    assert!(rows[0]["runtime"].as_f64().unwrap() > 0.0);
    let accuracy = rows[0]["accuracy"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&accuracy));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn duplicate_submission_is_absorbed(pool: SqlitePool) {
    let app = build_test_app(pool.clone());

    let first = post_form(app.clone(), "/", "lr=0.05&epochs=2&batch_size=16").await;
    assert_eq!(first.status(), StatusCode::SEE_OTHER);
    wait_until_idle(&app).await;

    let second = post_form(app.clone(), "/", "lr=0.05&epochs=2&batch_size=16").await;
    assert_eq!(second.status(), StatusCode::SEE_OTHER);

    assert_eq!(experiment_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn malformed_form_is_rejected(pool: SqlitePool) {
    let app = build_test_app(pool.clone());

    for body in [
        "lr=abc&epochs=3&batch_size=32",
        "lr=0.01&batch_size=32",
        "lr=0.01&epochs=2.5&batch_size=32",
    ] {
        let response = post_form(app.clone(), "/", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "BAD_REQUEST");
    }

    assert_eq!(experiment_count(&pool).await, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn out_of_range_parameters_are_rejected(pool: SqlitePool) {
    let app = build_test_app(pool.clone());

    for body in [
        "lr=0&epochs=3&batch_size=32",
        "lr=-0.1&epochs=3&batch_size=32",
        "lr=NaN&epochs=3&batch_size=32",
        "lr=0.01&epochs=0&batch_size=32",
        "lr=0.01&epochs=1001&batch_size=32",
        "lr=0.01&epochs=3&batch_size=0",
    ] {
        let response = post_form(app.clone(), "/", body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {body}");
        let json = body_json(response).await;
        assert_eq!(json["code"], "VALIDATION_ERROR", "body: {body}");
    }

    assert_eq!(experiment_count(&pool).await, 0);
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn experiments_are_sorted_on_request(pool: SqlitePool) {
    let app = build_test_app(pool);

    for body in [
        "lr=0.001&epochs=2&batch_size=64",
        "lr=0.1&epochs=3&batch_size=16",
        "lr=0.5&epochs=1&batch_size=8",
    ] {
        let response = post_form(app.clone(), "/", body).await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }
    wait_until_idle(&app).await;

    let desc = body_json(get(app.clone(), "/api/experiments").await).await;
    let accuracies: Vec<f64> = desc
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["accuracy"].as_f64().unwrap())
        .collect();
    assert_eq!(accuracies.len(), 3);
    assert!(accuracies.windows(2).all(|w| w[0] >= w[1]), "{accuracies:?}");

    let asc = body_json(get(app, "/api/experiments?sort=runtime&direction=asc").await).await;
    let runtimes: Vec<f64> = asc
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["runtime"].as_f64().unwrap())
        .collect();
    assert!(runtimes.windows(2).all(|w| w[0] <= w[1]), "{runtimes:?}");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unknown_sort_values_fall_back_to_defaults(pool: SqlitePool) {
    let app = build_test_app(pool);

    let response = get(app, "/api/experiments?sort=loss&direction=sideways").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn running_jobs_expose_progress_fields(pool: SqlitePool) {
    // Insert a running record directly so no task races the assertion.
    sqlx::query(
        "INSERT INTO experiments (lr, epochs, batch_size, current_epoch, loss) \
         VALUES (0.01, 10, 32, 4, 0.6931)",
    )
    .execute(&pool)
    .await
    .unwrap();
    let app = build_test_app(pool);

    let json = body_json(get(app, "/api/running_jobs").await).await;
    let jobs = json.as_array().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0]["epochs"], 10);
    assert_eq!(jobs[0]["current_epoch"], 4);
    assert_eq!(jobs[0]["loss"], 0.6931);
    assert!(jobs[0]["id"].is_i64());
    assert!(jobs[0].get("accuracy").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn unavailable_store_fails_loudly(pool: SqlitePool) {
    let app = build_test_app(pool.clone());
    pool.close().await;

    for uri in ["/api/experiments", "/api/running_jobs"] {
        let response = get(app.clone(), uri).await;
        assert!(response.status().is_server_error(), "{uri}: {}", response.status());
        let json = body_json(response).await;
        assert_ne!(json, serde_json::json!([]), "{uri}");
        assert!(json["code"].is_string(), "{uri}: {json}");
    }

    let response = post_form(app, "/", "lr=0.01&epochs=3&batch_size=32").await;
    assert!(response.status().is_server_error(), "{}", response.status());
}

// ---------------------------------------------------------------------------
// Reset
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn reset_empties_both_views(pool: SqlitePool) {
    let app = build_test_app(pool.clone());

    post_form(app.clone(), "/", "lr=0.01&epochs=2&batch_size=32").await;
    wait_until_idle(&app).await;

    let response = post_empty(app.clone(), "/reset").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let experiments = body_json(get(app.clone(), "/api/experiments").await).await;
    let running = body_json(get(app.clone(), "/api/running_jobs").await).await;
    assert_eq!(experiments, serde_json::json!([]));
    assert_eq!(running, serde_json::json!([]));

    // The same parameters are admissible again.
    post_form(app.clone(), "/", "lr=0.01&epochs=2&batch_size=32").await;
    assert_eq!(experiment_count(&pool).await, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn reset_on_empty_store_succeeds(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = post_empty(app, "/reset").await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

// ---------------------------------------------------------------------------
// UI
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn index_serves_html(pool: SqlitePool) {
    let app = build_test_app(pool);
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/html"), "{content_type}");

    let html = String::from_utf8(body_bytes(response).await).unwrap();
    assert!(html.contains("/api/running_jobs"));
    assert!(html.contains("name=\"batch_size\""));
}

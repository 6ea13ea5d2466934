//! The browser UI shell. All data is fetched client-side from the JSON API.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../assets/index.html");

/// GET /
pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

//! The "coming soon" page. A single static document whose script talks to
//! `/signup` and `/stats`.

use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../static/index.html");

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

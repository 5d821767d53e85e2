//! HTTP request handlers.

use super::AppState;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};

const TEXT_FORMAT: &str = "text/plain; version=0.0.4; charset=utf-8";

const INDEX_PAGE: &str = r#"<html>
<head><title>UptimeRobot Exporter</title></head>
<body>
<h1>UptimeRobot Exporter</h1>
<p><a href="/metrics">Metrics</a></p>
</body>
</html>"#;

pub async fn handle_index() -> impl IntoResponse {
    Html(INDEX_PAGE)
}

pub async fn handle_metrics(State(state): State<AppState>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(body) => ([(header::CONTENT_TYPE, TEXT_FORMAT)], body).into_response(),
        Err(e) => {
            tracing::error!("Failed to encode metrics: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

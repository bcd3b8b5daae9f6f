use crate::controller::{App, Mode};
use crate::intake::Uploads;
use crate::page;
use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use axum::{Json, Router};
use facelens_core::report::Severity;
use facelens_core::FaceAnalyzer;
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    mode: Option<String>,
}

/// HTTP routes for the page and a status endpoint.
pub fn router<A: FaceAnalyzer + 'static>(app: Arc<App<A>>, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(show_page).post(submit::<A>))
        .route("/health", get(health::<A>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(app)
}

/// Empty page for the selected mode.
async fn show_page(Query(query): Query<PageQuery>) -> Html<String> {
    let mode = Mode::from_query(query.mode.as_deref());
    Html(page::render(mode, ""))
}

/// Run the selected flow on the submitted files and render the results.
async fn submit<A: FaceAnalyzer + 'static>(
    State(app): State<Arc<App<A>>>,
    Query(query): Query<PageQuery>,
    mut multipart: Multipart,
) -> (StatusCode, Html<String>) {
    let mode = Mode::from_query(query.mode.as_deref());

    let mut uploads = match Uploads::read(&mut multipart).await {
        Ok(u) => u,
        Err(e) => {
            tracing::warn!(error = %e, "upload failed");
            let body = page::notice(Severity::Error, &e.to_string());
            return (StatusCode::BAD_REQUEST, Html(page::render(mode, &body)));
        }
    };

    let mut content = page::rejected_notices(&uploads.rejected);
    match mode {
        Mode::Emotion => {
            let outcome = app.analyze_emotions(uploads.take("image")).await;
            content.push_str(&page::emotion_results(&outcome));
        }
        Mode::Compare => {
            let source = uploads.take("source");
            let target = uploads.take("target");
            let outcome = app.compare_faces(source, target).await;
            content.push_str(&page::comparison_results(&outcome));
        }
    }

    (StatusCode::OK, Html(page::render(mode, &content)))
}

async fn health<A: FaceAnalyzer + 'static>(State(app): State<Arc<App<A>>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "overlay": app.overlay_enabled(),
        "similarity_threshold": app.similarity_threshold(),
    }))
}

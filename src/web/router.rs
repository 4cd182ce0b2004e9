//! Router configuration.

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use super::handlers::{download_file, get_thumbnail, list_files, stream_file, upload_file, AppState};
use super::middleware::{create_cors_layer, security_headers};
use super::openapi::openapi_json;

/// Create the main router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let upload_limit = usize::try_from(app_state.max_upload_size).unwrap_or(usize::MAX);

    let upload_routes = Router::new()
        .route("/upload", post(upload_file))
        .layer(DefaultBodyLimit::max(upload_limit));

    let api_routes = Router::new()
        .route("/files", get(list_files))
        .route("/openapi.json", get(openapi_json));

    Router::new()
        .merge(upload_routes)
        .route("/download/:name", get(download_file))
        .route("/stream/:name", get(stream_file))
        .route("/thumbnail/:name", get(get_thumbnail))
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

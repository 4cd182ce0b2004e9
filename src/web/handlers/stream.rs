//! Range-aware media streaming handler.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
};
use futures::StreamExt;

use super::AppState;
use crate::stream::{open_chunks, plan, STREAM_CONTENT_TYPE};
use crate::web::error::ApiError;

/// GET /stream/:name - Stream a file, honouring a single `Range: bytes=` request.
///
/// Without a usable Range header the whole file is sent with 200. Every
/// response advertises `Accept-Ranges: bytes` and a video content type.
#[utoipa::path(
    get,
    path = "/stream/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored filename"),
        ("Range" = Option<String>, Header, description = "Single byte range, e.g. bytes=0-1023")
    ),
    responses(
        (status = 200, description = "Whole file", content_type = "video/mp4"),
        (status = 206, description = "Requested byte range", content_type = "video/mp4"),
        (status = 404, description = "File not found"),
        (status = 416, description = "Range starts past the end of the file"),
        (status = 503, description = "Too many concurrent streams")
    )
)]
pub async fn stream_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let store = state.files.store();
    let file = store
        .stat(&name)?
        .ok_or_else(|| ApiError::not_found("File not found"))?;
    let path = store
        .file_path(&file.name)
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let range = headers
        .get(header::RANGE)
        .and_then(|value| value.to_str().ok());
    let delivery = plan(range, file.size).map_err(|e| {
        tracing::debug!(file = %file.name, range = ?range, "Range not satisfiable");
        ApiError::from(e)
    })?;
    tracing::debug!(
        file = %file.name,
        offset = delivery.offset(),
        length = delivery.length(),
        partial = delivery.is_partial(),
        "Streaming file"
    );

    let permit = state.acquire_stream_permit()?;
    let chunks = open_chunks(&path, delivery.offset(), delivery.length(), state.chunk_size)
        .await?
        .map(move |chunk| {
            // The permit is released when the body is dropped.
            let _held = &permit;
            chunk
        });

    let status = if delivery.is_partial() {
        StatusCode::PARTIAL_CONTENT
    } else {
        StatusCode::OK
    };

    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, STREAM_CONTENT_TYPE)
        .header(header::ACCEPT_RANGES, "bytes")
        .header(header::CONTENT_LENGTH, delivery.length());
    if let Some(content_range) = delivery.content_range() {
        builder = builder.header(header::CONTENT_RANGE, content_range);
    }

    builder.body(Body::from_stream(chunks)).map_err(|e| {
        tracing::error!("Failed to build response: {}", e);
        ApiError::internal("Failed to build response")
    })
}

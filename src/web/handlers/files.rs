//! File handlers: listing, upload, download and thumbnails.

use std::path::Path as FsPath;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, StatusCode},
    response::Response,
    Json,
};
use futures::TryStreamExt;

use super::AppState;
use crate::file::sanitize_filename;
use crate::stream::open_chunks;
use crate::web::dto::{ApiResponse, FileResponse};
use crate::web::error::ApiError;
use crate::ShareError;

/// Build a Content-Disposition value that forces a download.
///
/// Control characters are dropped so the name cannot inject headers; names
/// that are not plain ASCII also get an RFC 5987 `filename*` parameter.
pub(crate) fn content_disposition_header(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if c == '"' || c == '\\' { '_' } else { c })
        .collect();

    if filename.is_ascii() && fallback == filename {
        return format!("attachment; filename=\"{filename}\"");
    }

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

fn multipart_error(e: MultipartError) -> ApiError {
    tracing::warn!("Failed to read multipart data: {}", e);
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::payload_too_large("Upload exceeds the size limit")
    } else {
        ApiError::bad_request("Invalid multipart data")
    }
}

fn upload_body_error(e: MultipartError) -> ShareError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ShareError::PayloadTooLarge
    } else {
        ShareError::Upload(e.body_text())
    }
}

/// Stream `size` bytes of `path` as a 200 response.
pub(crate) async fn file_response(
    path: &FsPath,
    size: u64,
    content_type: &str,
    disposition: Option<String>,
    chunk_size: usize,
) -> Result<Response, ApiError> {
    let chunks = open_chunks(path, 0, size, chunk_size).await?;

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, size);
    if let Some(disposition) = disposition {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }

    builder.body(Body::from_stream(chunks)).map_err(|e| {
        tracing::error!("Failed to build response: {}", e);
        ApiError::internal("Failed to build response")
    })
}

/// GET /api/files - List shared files.
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Visible files sorted by name", body = Vec<FileResponse>),
        (status = 500, description = "Storage directory unreadable")
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, ApiError> {
    let mut files = state.files.store().list()?;
    files.sort_by(|a, b| a.name.cmp(&b.name));

    let responses = files.into_iter().map(FileResponse::from).collect();
    Ok(Json(ApiResponse::new(responses)))
}

/// POST /upload - Upload one file.
///
/// Request body: multipart/form-data with a "file" field. Requests without a
/// usable "file" field are accepted and ignored.
#[utoipa::path(
    post,
    path = "/upload",
    tag = "files",
    responses(
        (status = 204, description = "File stored, or nothing to store"),
        (status = 400, description = "Malformed multipart body"),
        (status = 413, description = "Upload exceeds the size limit")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<StatusCode, ApiError> {
    let mut multipart = match multipart {
        Ok(multipart) => multipart,
        Err(e) => {
            tracing::debug!("Upload without multipart body ignored: {}", e);
            return Ok(StatusCode::NO_CONTENT);
        }
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = sanitize_filename(field.file_name().unwrap_or_default());
        if filename.is_empty() {
            tracing::debug!("Upload without a usable filename ignored");
            return Ok(StatusCode::NO_CONTENT);
        }

        let outcome = state
            .files
            .upload(&filename, field.map_err(upload_body_error))
            .await?;

        tracing::info!(
            requested = %filename,
            stored = %outcome.file.name,
            size = outcome.file.size,
            thumbnail = outcome.thumbnail_created,
            "Upload complete"
        );
        return Ok(StatusCode::NO_CONTENT);
    }

    Ok(StatusCode::NO_CONTENT)
}

/// GET /download/:name - Download a file as an attachment.
#[utoipa::path(
    get,
    path = "/download/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let store = state.files.store();
    let file = store
        .stat(&name)?
        .ok_or_else(|| ApiError::not_found("File not found"))?;
    let path = store
        .file_path(&file.name)
        .ok_or_else(|| ApiError::not_found("File not found"))?;

    let content_type = mime_guess::from_path(&file.name)
        .first_or_octet_stream()
        .to_string();

    file_response(
        &path,
        file.size,
        &content_type,
        Some(content_disposition_header(&file.name)),
        state.chunk_size,
    )
    .await
}

/// GET /thumbnail/:name - Serve the thumbnail of a stored image.
#[utoipa::path(
    get,
    path = "/thumbnail/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored filename")
    ),
    responses(
        (status = 200, description = "Thumbnail image"),
        (status = 404, description = "No thumbnail for this file")
    )
)]
pub async fn get_thumbnail(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let path = state
        .files
        .store()
        .thumbnail_path_for(&name)
        .ok_or_else(|| ApiError::not_found("Thumbnail not found"))?;
    let size = tokio::fs::metadata(&path)
        .await
        .map_err(ShareError::from)?
        .len();

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();

    file_response(&path, size, &content_type, None, state.chunk_size).await
}

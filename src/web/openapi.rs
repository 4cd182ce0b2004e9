//! OpenAPI document for the HTTP API.

use axum::Json;
use utoipa::OpenApi;

use super::dto::FileResponse;
use crate::file::MediaKind;
use super::handlers::{files, stream};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sharefolder",
        description = "Shared folder with uploads, downloads, thumbnails and range streaming"
    ),
    paths(
        files::list_files,
        files::upload_file,
        files::download_file,
        files::get_thumbnail,
        stream::stream_file,
    ),
    components(schemas(FileResponse, MediaKind)),
    tags(
        (name = "files", description = "Shared file operations")
    )
)]
pub struct ApiDoc;

/// GET /api/openapi.json
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

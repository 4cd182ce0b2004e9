//! HTTP interface for the shared folder.
//!
//! Plain routes for upload, download, streaming and thumbnails, plus a small
//! JSON API for listing files.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod router;
pub mod server;

pub use error::ApiError;
pub use handlers::AppState;
pub use router::{create_health_router, create_router};
pub use server::WebServer;

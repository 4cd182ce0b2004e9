//! sharefolder - a shared folder served over HTTP.
//!
//! Files can be uploaded, listed, downloaded and streamed with byte ranges.
//! Uploaded images get a small thumbnail.

pub mod config;
pub mod error;
pub mod file;
pub mod logging;
pub mod stream;
pub mod web;

pub use config::Config;
pub use error::{Result, ShareError};

//! Configuration module for sharefolder.

use serde::Deserialize;
use std::path::Path;

use crate::{Result, ShareError};

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// File storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FilesConfig {
    /// Directory holding the shared files.
    #[serde(default = "default_storage_path")]
    pub storage_path: String,
    /// Directory holding generated thumbnails.
    #[serde(default = "default_thumbnail_path")]
    pub thumbnail_path: String,
    /// Maximum upload size in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Bounding box (in pixels) for both thumbnail dimensions.
    #[serde(default = "default_thumbnail_max_dimension")]
    pub thumbnail_max_dimension: u32,
    /// Size of each chunk read from disk while streaming.
    #[serde(default = "default_stream_chunk_size")]
    pub stream_chunk_size: usize,
    /// Maximum number of simultaneous stream responses (0 = unlimited).
    #[serde(default)]
    pub max_concurrent_streams: usize,
}

fn default_storage_path() -> String {
    "Shared Files".to_string()
}

fn default_thumbnail_path() -> String {
    "thumbnails".to_string()
}

fn default_max_upload_size() -> u64 {
    4096
}

fn default_thumbnail_max_dimension() -> u32 {
    120
}

fn default_stream_chunk_size() -> usize {
    8 * 1024
}

impl FilesConfig {
    /// Maximum upload size in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_size_mb.saturating_mul(1024 * 1024)
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
            thumbnail_path: default_thumbnail_path(),
            max_upload_size_mb: default_max_upload_size(),
            thumbnail_max_dimension: default_thumbnail_max_dimension(),
            stream_chunk_size: default_stream_chunk_size(),
            max_concurrent_streams: 0,
        }
    }
}

/// Web configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WebConfig {
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/sharefolder.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// File storage configuration.
    #[serde(default)]
    pub files: FilesConfig,
    /// Web configuration.
    #[serde(default)]
    pub web: WebConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShareError::Io)?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShareError::Config(format!("config parse error: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<()> {
        if self.files.stream_chunk_size == 0 {
            return Err(ShareError::Validation(
                "files.stream_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.files.thumbnail_max_dimension == 0 {
            return Err(ShareError::Validation(
                "files.thumbnail_max_dimension must be greater than zero".to_string(),
            ));
        }
        if self.files.max_upload_size_mb == 0 {
            return Err(ShareError::Validation(
                "files.max_upload_size_mb must be greater than zero".to_string(),
            ));
        }
        if Path::new(&self.files.storage_path) == Path::new(&self.files.thumbnail_path) {
            return Err(ShareError::Validation(
                "files.storage_path and files.thumbnail_path must differ".to_string(),
            ));
        }
        Ok(())
    }
}

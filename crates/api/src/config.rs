use std::path::PathBuf;

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except the JWT secret have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Largest accepted upload body in megabytes (default: `20`).
    pub max_upload_mb: usize,
    /// Pending (unauthorized) image directory.
    pub raw_uploads_dir: PathBuf,
    /// Published image directory.
    pub pano_dir: PathBuf,
    /// Deadline for one resize in seconds (default: `10`).
    pub resize_timeout_secs: u64,
    /// JWT token configuration.
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                  |
    /// |------------------------|--------------------------|
    /// | `HOST`                 | `0.0.0.0`                |
    /// | `PORT`                 | `3000`                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                     |
    /// | `MAX_UPLOAD_MB`        | `20`                     |
    /// | `RAW_UPLOADS`          | `storage/raw_uploads`    |
    /// | `PANO_DIR`             | `storage/panoramas`      |
    /// | `RESIZE_TIMEOUT_SECS`  | `10`                     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let max_upload_mb: usize = std::env::var("MAX_UPLOAD_MB")
            .unwrap_or_else(|_| "20".into())
            .parse()
            .expect("MAX_UPLOAD_MB must be a valid usize");

        let raw_uploads_dir = std::env::var("RAW_UPLOADS")
            .unwrap_or_else(|_| "storage/raw_uploads".into())
            .into();
        let pano_dir = std::env::var("PANO_DIR")
            .unwrap_or_else(|_| "storage/panoramas".into())
            .into();

        let resize_timeout_secs: u64 = std::env::var("RESIZE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("RESIZE_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            max_upload_mb,
            raw_uploads_dir,
            pano_dir,
            resize_timeout_secs,
            jwt,
        }
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb * 1024 * 1024
    }
}

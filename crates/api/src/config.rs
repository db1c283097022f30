use std::path::PathBuf;

use campus_core::student_import::{ColumnMapping, HeaderMode, ImportOptions};

use crate::auth::jwt::JwtConfig;

/// Default upper bound on an import upload body (5 MiB).
const DEFAULT_IMPORT_MAX_BYTES: usize = 5 * 1024 * 1024;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`). Bulk imports are exempt.
    pub request_timeout_secs: u64,
    /// Seconds to wait for in-flight requests after a shutdown signal (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Directory uploaded student photos are written under (default: `media`).
    pub media_root: PathBuf,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// Bulk student import settings.
    pub import: ImportConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `SHUTDOWN_TIMEOUT_SECS`| `30`                       |
    /// | `MEDIA_ROOT`           | `media`                    |
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

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let media_root = PathBuf::from(std::env::var("MEDIA_ROOT").unwrap_or_else(|_| "media".into()));

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            media_root,
            jwt: JwtConfig::from_env(),
            import: ImportConfig::from_env(),
        }
    }
}

/// Settings for `POST /students/import`.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Largest accepted request body in bytes.
    pub max_bytes: usize,
    /// Header handling when the request does not choose one.
    pub header: HeaderMode,
    /// Column that `date_admitted` is read from.
    pub date_admitted_column: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_IMPORT_MAX_BYTES,
            header: HeaderMode::default(),
            date_admitted_column: ColumnMapping::legacy().date_admitted,
        }
    }
}

impl ImportConfig {
    /// Load import settings from environment variables.
    ///
    /// | Env Var                               | Default   |
    /// |---------------------------------------|-----------|
    /// | `STUDENT_IMPORT_MAX_BYTES`            | `5242880` |
    /// | `STUDENT_IMPORT_HEADER_MODE`          | `detect`  |
    /// | `STUDENT_IMPORT_DATE_ADMITTED_COLUMN` | `9`       |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let max_bytes: usize = std::env::var("STUDENT_IMPORT_MAX_BYTES")
            .map(|v| v.parse().expect("STUDENT_IMPORT_MAX_BYTES must be a valid usize"))
            .unwrap_or(defaults.max_bytes);

        let header: HeaderMode = std::env::var("STUDENT_IMPORT_HEADER_MODE")
            .map(|v| {
                v.parse()
                    .unwrap_or_else(|e| panic!("STUDENT_IMPORT_HEADER_MODE: {e}"))
            })
            .unwrap_or(defaults.header);

        let date_admitted_column: usize = std::env::var("STUDENT_IMPORT_DATE_ADMITTED_COLUMN")
            .map(|v| {
                v.parse()
                    .expect("STUDENT_IMPORT_DATE_ADMITTED_COLUMN must be a valid usize")
            })
            .unwrap_or(defaults.date_admitted_column);

        Self {
            max_bytes,
            header,
            date_admitted_column,
        }
    }

    /// Options for one run, letting the request override the header mode.
    pub fn options(&self, header: Option<HeaderMode>) -> ImportOptions {
        ImportOptions {
            header: header.unwrap_or(self.header),
            columns: ColumnMapping::legacy().with_date_admitted(self.date_admitted_column),
        }
    }
}

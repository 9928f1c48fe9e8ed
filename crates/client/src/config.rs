//! # Client Configuration Module
//!
//! This module handles loading configuration for the Rollcall client from
//! environment variables, providing defaults where appropriate.
//!
//! ## Environment Variables
//!
//! The following environment variables are used:
//!
//! - `LOG_LEVEL`: Logging level (default: "info")
//! - `REPORT_DIR`: Directory attendance reports are written to (default: ".")
//! - `PROJECT_ID`: Identifier of the managed backend project (optional; the
//!   in-memory backend ignores it)

use std::env;
use std::path::PathBuf;

use eyre::Result;
use tracing::Level;

/// Configuration for the Rollcall client
///
/// # Example
///
/// ```
/// use eyre::Result;
/// use rollcall_client::config::AppConfig;
///
/// fn example() -> Result<()> {
///     let config = AppConfig::from_env()?;
///     println!("Writing reports to {}", config.report_dir.display());
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Log level for the application
    pub log_level: Level,

    /// Directory attendance reports are written to
    pub report_dir: PathBuf,

    /// Backend project identifier, when attached to a hosted project
    pub project_id: Option<String>,
}

impl AppConfig {
    /// Creates a new AppConfig from environment variables
    ///
    /// Every value has a default, so this only fails if a future setting
    /// gains one that cannot be defaulted.
    pub fn from_env() -> Result<Self> {
        // Logging settings
        let log_level = parse_log_level(
            &env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        );

        // Report output settings
        let report_dir = env::var("REPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("."));

        // Backend settings
        let project_id = env::var("PROJECT_ID").ok();

        Ok(Self {
            log_level,
            report_dir,
            project_id,
        })
    }
}

/// Parses a log level string, falling back to `INFO` for unknown values.
pub fn parse_log_level(value: &str) -> Level {
    match value {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

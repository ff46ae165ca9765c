//! Configuration module for the greetings service.
//!
//! All configuration is loaded from environment variables with sensible defaults.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::AppError;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the JSON file holding the greeting collection
    pub data_path: PathBuf,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Emit logs as JSON lines instead of plain text
    pub log_json: bool,
    /// Deployment environment; `development` exposes internal error detail
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let data_path = env::var("GREETINGS_DATA_PATH")
            .unwrap_or_else(|_| "./data/data.json".to_string())
            .into();

        let bind_addr = match (env::var("GREETINGS_BIND_ADDR"), env::var("PORT")) {
            (Ok(addr), _) => addr,
            (Err(_), Ok(port)) => format!("0.0.0.0:{}", port),
            (Err(_), Err(_)) => "127.0.0.1:3000".to_string(),
        };
        let bind_addr = bind_addr
            .parse()
            .map_err(|e| AppError::Config(format!("Invalid bind address {:?}: {}", bind_addr, e)))?;

        let log_level = env::var("GREETINGS_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_json = env::var("GREETINGS_LOG_FORMAT")
            .map(|f| f.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        let environment =
            env::var("GREETINGS_ENV").unwrap_or_else(|_| "production".to_string());

        Ok(Self {
            data_path,
            bind_addr,
            log_level,
            log_json,
            environment,
        })
    }

    /// Whether internal error detail may be returned to clients.
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }
}

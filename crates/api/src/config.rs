use seezee_core::fleet::DEFAULT_HEARTBEAT_THRESHOLD_SECS;

use crate::auth::jwt::JwtConfig;

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
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Graceful shutdown timeout in seconds (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// Heartbeat age in seconds beyond which a node's derived status is
    /// OFFLINE (default: `60`).
    pub heartbeat_threshold_secs: i64,
    /// Age in seconds after which a running run on a silent node is failed
    /// by the background reaper. `0` disables reaping (default: `0`).
    pub stale_run_timeout_secs: i64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                         | Default                 |
    /// |---------------------------------|-------------------------|
    /// | `HOST`                          | `0.0.0.0`               |
    /// | `PORT`                          | `3000`                  |
    /// | `CORS_ORIGINS`                  | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`          | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`         | `30`                    |
    /// | `NODE_HEARTBEAT_THRESHOLD_SECS` | `60`                    |
    /// | `STALE_RUN_TIMEOUT_SECS`        | `0` (disabled)          |
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

        let heartbeat_threshold_secs: i64 = std::env::var("NODE_HEARTBEAT_THRESHOLD_SECS")
            .unwrap_or_else(|_| DEFAULT_HEARTBEAT_THRESHOLD_SECS.to_string())
            .parse()
            .expect("NODE_HEARTBEAT_THRESHOLD_SECS must be a valid i64");

        let stale_run_timeout_secs: i64 = std::env::var("STALE_RUN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "0".into())
            .parse()
            .expect("STALE_RUN_TIMEOUT_SECS must be a valid i64");

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            heartbeat_threshold_secs,
            stale_run_timeout_secs,
            jwt,
        }
    }
}

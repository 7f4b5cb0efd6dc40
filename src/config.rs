//! Process configuration, read once from the environment at startup.
//!
//! ## Environment Variables
//! - `PORT` - port to listen on (default: `3000`)
//! - `APP_URL` - public base URL, used to build OAuth redirect URIs
//!   (default: `http://localhost:{PORT}`)
//! - `STATIC_DIR` - directory with the built dashboard (default: `dist`)
//! - `DATA_PATH` - JSON data file; unset means in-memory only
//! - `ANALYTICS_POLL_SECS` - analytics poll interval (default: 1 hour)

use crate::constants::{DEFAULT_ANALYTICS_POLL_SECS, DEFAULT_PORT};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub app_url: String,
    pub static_dir: String,
    pub data_path: Option<String>,
    pub analytics_poll_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let app_url =
            std::env::var("APP_URL").unwrap_or_else(|_| format!("http://localhost:{}", port));
        let static_dir = std::env::var("STATIC_DIR").unwrap_or_else(|_| "dist".to_string());
        let data_path = std::env::var("DATA_PATH").ok().filter(|v| !v.is_empty());
        let analytics_poll_secs = std::env::var("ANALYTICS_POLL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_ANALYTICS_POLL_SECS);

        Self {
            port,
            app_url,
            static_dir,
            data_path,
            analytics_poll_secs,
        }
    }
}

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is honored for local runs.

use std::env;
use std::path::PathBuf;

const DEFAULT_API_BASE_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_AUTH_URL: &str = "https://www.strava.com/oauth/token";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Strava OAuth client ID (public)
    pub strava_client_id: String,
    /// Strava OAuth client secret
    pub strava_client_secret: String,
    /// JSON file holding the access/refresh token pair
    pub tokens_path: PathBuf,
    /// Cache directory for activity stream bodies
    pub stream_cache_dir: PathBuf,
    /// Cache directory for activity detail bodies
    pub activity_cache_dir: PathBuf,
    /// Strava REST API root
    pub api_base_url: String,
    /// OAuth token endpoint used for refreshes
    pub auth_url: String,
    /// Activities requested per page when listing
    pub page_size: u32,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            tokens_path: PathBuf::from(".config/strava_tokens.txt"),
            stream_cache_dir: PathBuf::from("stream_cache"),
            activity_cache_dir: PathBuf::from("activity_cache"),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_url: DEFAULT_AUTH_URL.to_string(),
            page_size: 200,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let page_size: u32 = match env::var("STRAVA_PAGE_SIZE") {
            Ok(v) => v
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("STRAVA_PAGE_SIZE", v))?,
            Err(_) => 200,
        };

        Ok(Self {
            strava_client_id: env::var("STRAVA_CLIENT_ID")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_ID"))?,
            strava_client_secret: env::var("STRAVA_CLIENT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("STRAVA_CLIENT_SECRET"))?,
            tokens_path: env::var("STRAVA_TOKENS_PATH")
                .unwrap_or_else(|_| ".config/strava_tokens.txt".to_string())
                .into(),
            stream_cache_dir: env::var("STREAM_CACHE_DIR")
                .unwrap_or_else(|_| "stream_cache".to_string())
                .into(),
            activity_cache_dir: env::var("ACTIVITY_CACHE_DIR")
                .unwrap_or_else(|_| "activity_cache".to_string())
                .into(),
            api_base_url: env::var("STRAVA_API_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string()),
            auth_url: env::var("STRAVA_AUTH_URL").unwrap_or_else(|_| DEFAULT_AUTH_URL.to_string()),
            page_size,
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

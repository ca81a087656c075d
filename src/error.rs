// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use std::path::PathBuf;

/// Application error type shared by the credential, cache, remote and
/// aggregation layers.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Credential file unreadable/unparsable, or the refresh call failed.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Non-2xx response from the Strava API.
    #[error("Strava API returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("Strava request failed: {0}")]
    Transport(String),

    #[error("Failed to read cache entry {}: {source}", path.display())]
    CacheRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write cache entry {}: {source}", path.display())]
    CacheWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Segment {0} has no recorded efforts")]
    EmptySegment(u64),

    #[error("Activity {0} is not in the retrieved activity list")]
    UnknownActivity(u64),

    #[error("Failed to parse response: {0}")]
    Parse(String),
}

impl AppError {
    /// HTTP status carried by a remote failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            AppError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Strava answered 429; the 15-minute/daily quota is spent.
    pub fn is_rate_limited(&self) -> bool {
        self.status() == Some(429)
    }

    /// True for failures that a new access token might fix.
    pub fn is_token_error(&self) -> bool {
        matches!(self, AppError::Auth(_)) || self.status() == Some(401)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Parse(err.to_string())
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;

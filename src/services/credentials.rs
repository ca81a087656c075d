// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed OAuth credential store.
//!
//! The token file is the only durable copy of the credential. It is read on
//! every request for a token and rewritten in full (temp file + rename)
//! whenever Strava issues a new pair.

use crate::error::{AppError, Result};
use crate::models::Credential;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// A token this close to expiry (seconds) is treated as already expired.
pub const TOKEN_REFRESH_MARGIN_SECS: i64 = 100;

/// Whether an access token expiring at `expires_at` is usable at `now`.
pub fn is_access_valid(expires_at: i64, now: i64) -> bool {
    now + TOKEN_REFRESH_MARGIN_SECS < expires_at
}

/// Loads, refreshes and persists the single user's Strava credential.
#[derive(Clone)]
pub struct CredentialStore {
    http: reqwest::Client,
    path: PathBuf,
    auth_url: String,
    client_id: String,
    client_secret: String,
}

impl CredentialStore {
    pub fn new(
        path: impl Into<PathBuf>,
        auth_url: impl Into<String>,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            path: path.into(),
            auth_url: auth_url.into(),
            client_id,
            client_secret,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted credential.
    pub fn load(&self) -> Result<Credential> {
        let raw = fs::read_to_string(&self.path).map_err(|e| {
            AppError::Auth(format!(
                "Failed to read token file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            AppError::Auth(format!(
                "Failed to parse token file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    /// Get a usable access token, refreshing it with Strava if needed.
    pub async fn get_access_token(&self) -> Result<String> {
        self.get_access_token_at(Utc::now().timestamp()).await
    }

    /// Same as [`get_access_token`](Self::get_access_token) with an explicit
    /// clock reading (Unix seconds).
    pub async fn get_access_token_at(&self, now: i64) -> Result<String> {
        let credential = self.load()?;

        if is_access_valid(credential.expires_at, now) {
            tracing::debug!(expires_at = credential.expires_at, "Existing access token is valid");
            return Ok(credential.access_token);
        }

        tracing::info!(
            expires_at = credential.expires_at,
            "Access token expired, refreshing"
        );

        let refreshed = self.refresh(&credential.refresh_token).await?;
        self.persist(&refreshed)?;

        tracing::info!(expires_at = refreshed.expires_at, "Token refreshed and stored");
        Ok(refreshed.access_token)
    }

    /// Exchange the refresh token for a new credential.
    async fn refresh(&self, refresh_token: &str) -> Result<Credential> {
        let response = self
            .http
            .post(&self.auth_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::Auth(format!("Token refresh request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "Strava token refresh failed");
            return Err(AppError::Auth(format!(
                "Token refresh failed with status {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::Auth(format!("Failed to parse token response: {}", e)))
    }

    /// Overwrite the token file without exposing a half-written file.
    fn persist(&self, credential: &Credential) -> Result<()> {
        let body = serde_json::to_string(credential)
            .map_err(|e| AppError::Auth(format!("Failed to encode credential: {}", e)))?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, body)
            .and_then(|_| fs::rename(&tmp, &self.path))
            .map_err(|e| {
                AppError::Auth(format!(
                    "Failed to write token file {}: {}",
                    self.path.display(),
                    e
                ))
            })
    }
}

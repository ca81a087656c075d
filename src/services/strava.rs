// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client.
//!
//! Handles:
//! - Paginated activity listing
//! - Activity detail (optionally with all segment efforts)
//! - Activity stream bundles
//! - Segment detail
//!
//! Nothing here retries. Under Strava's 200-per-15-minutes quota a blind
//! retry only burns requests; callers treat a failure as "no data".

use crate::error::{AppError, Result};
use crate::models::ActivitySummary;
use crate::services::CredentialStore;
use serde::Deserialize;

/// Low-level Strava API client. Every call takes an explicit access token.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
}

impl StravaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// One page of the athlete's activities (1-based page numbers).
    pub async fn list_activities_page(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivitySummary>> {
        let url = format!("{}/athlete/activities", self.base_url);
        let query = [("page", page.to_string()), ("per_page", per_page.to_string())];
        let body = self.get_bytes(&url, access_token, &query).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Raw detail body for one activity.
    pub async fn get_activity_detail(
        &self,
        access_token: &str,
        activity_id: u64,
        include_all_efforts: bool,
    ) -> Result<Vec<u8>> {
        let url = format!("{}/activities/{}", self.base_url, activity_id);
        let query = [("include_all_efforts", include_all_efforts.to_string())];
        self.get_bytes(&url, access_token, &query).await
    }

    /// Raw stream bundle for one activity, keyed by stream type.
    pub async fn get_activity_streams(
        &self,
        access_token: &str,
        activity_id: u64,
        keys: &[&str],
    ) -> Result<Vec<u8>> {
        let url = format!("{}/activities/{}/streams", self.base_url, activity_id);
        let query = [
            ("keys", keys.join(",")),
            ("key_by_type", "true".to_string()),
        ];
        self.get_bytes(&url, access_token, &query).await
    }

    /// Raw detail body for one segment.
    pub async fn get_segment_detail(&self, access_token: &str, segment_id: u64) -> Result<Vec<u8>> {
        let url = format!("{}/segments/{}", self.base_url, segment_id);
        self.get_bytes(&url, access_token, &[]).await
    }

    /// Generic authenticated GET returning the body bytes.
    async fn get_bytes(
        &self,
        url: &str,
        access_token: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .query(query)
            .send()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        let response = check_response(response).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| AppError::Transport(e.to_string()))?;

        tracing::debug!(url, bytes = body.len(), "Received Strava response");
        Ok(body.to_vec())
    }
}

/// Turn a non-2xx response into `AppError::Remote`.
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();

    if status == 429 {
        tracing::warn!("Strava rate limit hit (429)");
    }

    Err(AppError::Remote {
        status,
        body: extract_message(&body).unwrap_or(body),
    })
}

/// Strava error bodies look like `{"message": "...", "errors": [...]}`.
fn extract_message(body: &str) -> Option<String> {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: String,
    }
    serde_json::from_str::<ErrorBody>(body).ok().map(|e| e.message)
}

// ─────────────────────────────────────────────────────────────────────────────
// StravaService - API calls with token management
// ─────────────────────────────────────────────────────────────────────────────

/// Strava client paired with the credential store.
///
/// A token is requested from the store for every call; the store itself
/// avoids refreshing while the current token is still valid.
#[derive(Clone)]
pub struct StravaService {
    client: StravaClient,
    credentials: CredentialStore,
}

impl StravaService {
    pub fn new(client: StravaClient, credentials: CredentialStore) -> Self {
        Self {
            client,
            credentials,
        }
    }

    pub fn credentials(&self) -> &CredentialStore {
        &self.credentials
    }

    pub async fn list_activities_page(
        &self,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<ActivitySummary>> {
        let access_token = self.credentials.get_access_token().await?;
        self.client
            .list_activities_page(&access_token, page, per_page)
            .await
    }

    /// Every activity, requesting pages until one comes back empty.
    pub async fn list_all_activities(&self, per_page: u32) -> Result<Vec<ActivitySummary>> {
        let mut activities = Vec::new();
        let mut page = 1;

        tracing::info!(per_page, "Beginning request of activities");
        loop {
            let batch = self.list_activities_page(page, per_page).await?;
            tracing::debug!(page, count = batch.len(), "Received activity page");

            if batch.is_empty() {
                break;
            }
            activities.extend(batch);
            page += 1;
        }

        tracing::info!(total = activities.len(), "Retrieved all activities");
        Ok(activities)
    }

    pub async fn get_activity_detail(
        &self,
        activity_id: u64,
        include_all_efforts: bool,
    ) -> Result<Vec<u8>> {
        let access_token = self.credentials.get_access_token().await?;
        self.client
            .get_activity_detail(&access_token, activity_id, include_all_efforts)
            .await
    }

    pub async fn get_activity_streams(&self, activity_id: u64, keys: &[&str]) -> Result<Vec<u8>> {
        let access_token = self.credentials.get_access_token().await?;
        self.client
            .get_activity_streams(&access_token, activity_id, keys)
            .await
    }

    pub async fn get_segment_detail(&self, segment_id: u64) -> Result<Vec<u8>> {
        let access_token = self.credentials.get_access_token().await?;
        self.client
            .get_segment_detail(&access_token, segment_id)
            .await
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Cache-first fetching of Strava entities.
//!
//! Handles the core workflow:
//! 1. Check the id against the retrieved activity list
//! 2. Serve the cached body if present (unless forced)
//! 3. Otherwise request it from Strava and cache the result
//! 4. Report remote failures as "no data" instead of aborting the batch

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{ActivityDetail, ActivityIndex, ActivityStreams, DEFAULT_STREAM_KEYS};
use crate::services::{CredentialStore, ResponseCache, StravaClient, StravaService};
use std::future::Future;

/// A response cache plus the fetch-or-reuse policy around it.
#[derive(Debug)]
pub struct CachedFetcher {
    cache: ResponseCache,
}

impl CachedFetcher {
    pub fn new(cache: ResponseCache) -> Self {
        Self { cache }
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut ResponseCache {
        &mut self.cache
    }

    /// Return the body for `id`, calling `fetch_fn` only on a cache miss or
    /// when `force` is set.
    ///
    /// `Ok(None)` means the remote call failed (already logged). Auth,
    /// rate-limit and cache I/O failures are returned as errors.
    pub async fn fetch<F, Fut>(&mut self, id: u64, force: bool, fetch_fn: F) -> Result<Option<String>>
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = Result<Vec<u8>>>,
    {
        if !force {
            if let Some(body) = self.cache.read(id)? {
                tracing::debug!(id, "Cache hit");
                return Ok(Some(body));
            }
        } else {
            tracing::warn!(
                id,
                "Bypassing cache; repeated forced fetches can exhaust the Strava rate limit"
            );
        }

        let body = match fetch_fn(id).await {
            Ok(body) => body,
            // No token, or no quota left: no further request can succeed either.
            Err(e) if e.is_token_error() || e.is_rate_limited() => return Err(e),
            Err(e) => {
                tracing::warn!(
                    id,
                    error = %e,
                    "Unable to find in cache and unable to retrieve from Strava"
                );
                return Ok(None);
            }
        };

        self.cache.write(id, &body)?;
        Ok(self.cache.read(id)?)
    }
}

/// Strava access backed by the stream and activity-detail caches.
pub struct StravaRepository {
    service: StravaService,
    streams: CachedFetcher,
    details: CachedFetcher,
    page_size: u32,
}

impl StravaRepository {
    pub fn new(
        service: StravaService,
        stream_cache: ResponseCache,
        detail_cache: ResponseCache,
        page_size: u32,
    ) -> Self {
        Self {
            service,
            streams: CachedFetcher::new(stream_cache),
            details: CachedFetcher::new(detail_cache),
            page_size,
        }
    }

    /// Wire up client, credential store and both caches from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let credentials = CredentialStore::new(
            config.tokens_path.clone(),
            config.auth_url.clone(),
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        );
        let service = StravaService::new(StravaClient::new(&config.api_base_url), credentials);

        Ok(Self::new(
            service,
            ResponseCache::open(&config.stream_cache_dir)?,
            ResponseCache::open(&config.activity_cache_dir)?,
            config.page_size,
        ))
    }

    pub fn service(&self) -> &StravaService {
        &self.service
    }

    pub fn stream_fetcher(&mut self) -> &mut CachedFetcher {
        &mut self.streams
    }

    pub fn detail_fetcher(&mut self) -> &mut CachedFetcher {
        &mut self.details
    }

    /// Fetch the complete activity list. Never cached.
    pub async fn retrieve_activities(&self) -> Result<ActivityIndex> {
        let activities = self.service.list_all_activities(self.page_size).await?;
        Ok(ActivityIndex::new(activities))
    }

    /// Detail for a listed activity. `include_all_efforts` asks Strava for
    /// every segment effort rather than only the highlighted ones.
    ///
    /// Like streams, the cache is keyed by activity id only; a body cached
    /// with a different `include_all_efforts` is returned unless `force`.
    pub async fn activity_detail(
        &mut self,
        index: &ActivityIndex,
        activity_id: u64,
        include_all_efforts: bool,
        force: bool,
    ) -> Result<Option<ActivityDetail>> {
        ensure_listed(index, activity_id)?;

        let service = &self.service;
        let body = self
            .details
            .fetch(activity_id, force, |id| {
                service.get_activity_detail(id, include_all_efforts)
            })
            .await?;

        body.as_deref().map(ActivityDetail::from_json).transpose()
    }

    /// Stream bundle for a listed activity. `keys` defaults to
    /// [`DEFAULT_STREAM_KEYS`] when empty.
    ///
    /// The cache is keyed by activity id only, so a cached bundle is
    /// returned as-is even if it was requested with other keys.
    pub async fn activity_streams(
        &mut self,
        index: &ActivityIndex,
        activity_id: u64,
        keys: &[&str],
        force: bool,
    ) -> Result<Option<ActivityStreams>> {
        ensure_listed(index, activity_id)?;

        let keys = if keys.is_empty() {
            DEFAULT_STREAM_KEYS
        } else {
            keys
        };
        let service = &self.service;
        let body = self
            .streams
            .fetch(activity_id, force, |id| service.get_activity_streams(id, keys))
            .await?;

        body.as_deref().map(ActivityStreams::from_json).transpose()
    }

    /// Segment detail, straight from Strava every time.
    pub async fn segment_detail(&self, segment_id: u64) -> Result<Option<serde_json::Value>> {
        tracing::warn!(
            segment_id,
            "Segment detail is not cached; calling this in a loop will exhaust the rate limit \
             (200 per 15 minutes, 2000 per day)"
        );

        match self.service.get_segment_detail(segment_id).await {
            Ok(body) => Ok(Some(serde_json::from_slice(&body)?)),
            Err(e @ (AppError::Remote { .. } | AppError::Transport(_))) => {
                tracing::warn!(segment_id, error = %e, "Segment request failed");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

fn ensure_listed(index: &ActivityIndex, activity_id: u64) -> Result<()> {
    if index.contains(activity_id) {
        return Ok(());
    }
    tracing::warn!(activity_id, "Activity not found, not requesting it");
    Err(AppError::UnknownActivity(activity_id))
}

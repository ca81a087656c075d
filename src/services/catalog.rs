// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Segment catalog: efforts from many activities grouped by route.

use crate::error::Result;
use crate::models::{ActivityDetail, ActivityIndex, Segment};
use crate::services::StravaRepository;
use std::collections::HashMap;

/// Every route seen across a set of activities, keyed by route id.
#[derive(Debug, Clone, Default)]
pub struct SegmentCatalog {
    segments: HashMap<u64, Segment>,
    /// Route ids in first-encounter order
    order: Vec<u64>,
}

impl SegmentCatalog {
    /// Group the efforts of `details` by route in a single pass.
    ///
    /// Input order defines each segment's effort order, which decides the
    /// personal-best and latest-effort tie-breaks.
    pub fn build<'a, I>(details: I) -> Self
    where
        I: IntoIterator<Item = &'a ActivityDetail>,
    {
        let mut catalog = Self::default();
        for detail in details {
            catalog.add_activity(detail);
        }
        catalog
    }

    /// Fetch (cache-first) the detail of each activity in `activity_ids`
    /// and build the catalog. Activities with no data are skipped; once
    /// Strava answers 429 the remaining ids are not requested.
    pub async fn from_repository(
        repo: &mut StravaRepository,
        index: &ActivityIndex,
        activity_ids: impl IntoIterator<Item = u64>,
    ) -> Result<Self> {
        let mut catalog = Self::default();
        let mut skipped = 0usize;

        for activity_id in activity_ids {
            match repo.activity_detail(index, activity_id, true, false).await {
                Ok(Some(detail)) => catalog.add_activity(&detail),
                Ok(None) => {
                    tracing::warn!(activity_id, "No cached or remote data for activity");
                    skipped += 1;
                }
                Err(e) if e.is_rate_limited() => {
                    tracing::warn!(
                        activity_id,
                        error = %e,
                        "Strava rate limit reached; returning the partial catalog"
                    );
                    break;
                }
                Err(e) if e.is_token_error() => return Err(e),
                Err(e) => {
                    tracing::warn!(activity_id, error = %e, "Skipping activity");
                    skipped += 1;
                }
            }
        }

        tracing::info!(
            segments = catalog.len(),
            skipped,
            "Segment catalog built"
        );
        Ok(catalog)
    }

    fn add_activity(&mut self, detail: &ActivityDetail) {
        for effort in &detail.segment_efforts {
            let route_id = effort.route_id;
            let order = &mut self.order;
            self.segments
                .entry(route_id)
                .or_insert_with(|| {
                    order.push(route_id);
                    Segment::new(route_id)
                })
                .add_effort(effort.clone());
        }
    }

    pub fn get(&self, route_id: u64) -> Option<&Segment> {
        self.segments.get(&route_id)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segments in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.order.iter().filter_map(|id| self.segments.get(id))
    }

    pub fn into_map(self) -> HashMap<u64, Segment> {
        self.segments
    }
}

/// Route ids of `detail`'s efforts in ride order, or just the one at
/// `position` when given.
pub fn segment_ids_of_activity(detail: &ActivityDetail, position: Option<usize>) -> Vec<u64> {
    let ids = detail.segment_ids();
    match position {
        Some(i) => ids.get(i).copied().into_iter().collect(),
        None => ids,
    }
}

/// Route id from a segment page link such as
/// `https://www.strava.com/segments/23981846?filter=overall`.
pub fn segment_link_to_segment_id(link: &str) -> Option<u64> {
    let path = link.split(['?', '#']).next()?;
    path.trim_end_matches('/').rsplit('/').next()?.parse().ok()
}

/// Route id from an effort link such as
/// `https://www.strava.com/activities/{activity_id}/segments/{effort_id}`,
/// resolved through the activity's effort list.
pub fn effort_link_to_segment_id(detail: &ActivityDetail, link: &str) -> Option<u64> {
    let path = link.split(['?', '#']).next()?;
    let mut parts = path.trim_end_matches('/').rsplit('/');
    let effort_id: u64 = parts.next()?.parse().ok()?;
    if parts.next()? != "segments" {
        return None;
    }
    let activity_id: u64 = parts.next()?.parse().ok()?;
    if activity_id != detail.id {
        tracing::warn!(
            activity_id,
            detail_id = detail.id,
            "Effort link points at a different activity"
        );
        return None;
    }

    detail
        .segment_efforts
        .iter()
        .find(|e| e.effort_id == effort_id)
        .map(|e| e.route_id)
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity records: list summaries, detail bodies and the
//! retrieved-activity index.

use crate::models::SegmentEffort;
use crate::time_utils::deserialize_local_datetime;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Summary activity from the paginated `athlete/activities` endpoint.
///
/// Only the fields this crate reasons about are typed; everything else the
/// service sends is kept in `extra` for downstream table building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivitySummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub sport_type: String,
    /// Local start time ("2024-01-15T10:30:00Z", zone-less despite the Z)
    #[serde(deserialize_with = "deserialize_local_datetime")]
    pub start_date_local: NaiveDateTime,
    /// Distance in meters
    #[serde(default)]
    pub distance: f64,
    /// Moving time in seconds
    #[serde(default)]
    pub moving_time: u32,
    /// Elapsed time in seconds
    #[serde(default)]
    pub elapsed_time: u32,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Detailed activity body, as returned with `include_all_efforts=true`.
#[derive(Debug, Clone, Deserialize)]
pub struct ActivityDetail {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Every segment effort recorded during the activity, in ride order.
    #[serde(default)]
    pub segment_efforts: Vec<SegmentEffort>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ActivityDetail {
    /// Parse a raw detail body (cached or fresh).
    pub fn from_json(body: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    /// Route ids in the order their efforts appear in this activity.
    pub fn segment_ids(&self) -> Vec<u64> {
        self.segment_efforts.iter().map(|e| e.route_id).collect()
    }
}

/// The activity list retrieved from Strava, used to decide which ids are
/// valid to fetch.
#[derive(Debug, Clone, Default)]
pub struct ActivityIndex {
    activities: Vec<ActivitySummary>,
    ids: HashSet<u64>,
}

impl ActivityIndex {
    pub fn new(activities: Vec<ActivitySummary>) -> Self {
        let ids = activities.iter().map(|a| a.id).collect();
        Self { activities, ids }
    }

    /// Summaries in the order Strava returned them (newest first).
    pub fn activities(&self) -> &[ActivitySummary] {
        &self.activities
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.activities.is_empty()
    }

    pub fn contains(&self, activity_id: u64) -> bool {
        self.ids.contains(&activity_id)
    }

    pub fn get(&self, activity_id: u64) -> Option<&ActivitySummary> {
        self.activities.iter().find(|a| a.id == activity_id)
    }

    /// The `index`-th activity (in list order) that started on `date`.
    pub fn id_by_date(&self, date: NaiveDate, index: usize) -> Option<u64> {
        self.activities
            .iter()
            .filter(|a| a.start_date_local.date() == date)
            .nth(index)
            .map(|a| a.id)
    }

    /// Activity with the most recent local start time.
    pub fn latest(&self) -> Option<&ActivitySummary> {
        self.activities.iter().max_by_key(|a| a.start_date_local)
    }

    /// Keep only activities matching `predicate`, preserving order.
    pub fn filtered<F>(&self, predicate: F) -> Self
    where
        F: Fn(&ActivitySummary) -> bool,
    {
        Self::new(
            self.activities
                .iter()
                .filter(|a| predicate(a))
                .cloned()
                .collect(),
        )
    }
}

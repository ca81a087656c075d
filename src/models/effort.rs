// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Segment effort records nested in activity details.

use crate::time_utils::deserialize_local_datetime;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Achievement `type_id` Strava uses for Local Legend.
pub const LOCAL_LEGEND_TYPE_ID: u32 = 7;

/// One achievement attached to an effort (PR, KOM rank, Local Legend...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub type_id: u32,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub rank: Option<u32>,
    /// Efforts counted toward the achievement (Local Legend streak count)
    #[serde(default)]
    pub effort_count: Option<u32>,
}

impl Achievement {
    pub fn is_local_legend(&self) -> bool {
        self.type_id == LOCAL_LEGEND_TYPE_ID
    }
}

/// Route summary embedded in every effort record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    /// Length in meters
    #[serde(default)]
    pub distance: Option<f64>,
    /// Percent grade
    #[serde(default)]
    pub average_grade: Option<f64>,
    #[serde(default)]
    pub maximum_grade: Option<f64>,
    #[serde(default)]
    pub elevation_high: Option<f64>,
    #[serde(default)]
    pub elevation_low: Option<f64>,
    #[serde(default)]
    pub climb_category: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct ActivityRef {
    id: u64,
}

/// Wire shape of an effort inside an activity detail body.
#[derive(Debug, Deserialize)]
struct RawSegmentEffort {
    id: u64,
    name: String,
    activity: ActivityRef,
    segment: SegmentSummary,
    elapsed_time: u32,
    moving_time: u32,
    #[serde(deserialize_with = "deserialize_local_datetime")]
    start_date_local: NaiveDateTime,
    #[serde(default)]
    average_heartrate: Option<f64>,
    #[serde(default)]
    max_heartrate: Option<f64>,
    #[serde(default)]
    pr_rank: Option<u32>,
    #[serde(default)]
    achievements: Vec<Achievement>,
}

/// A single attempt at a route, flattened from the raw record.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawSegmentEffort")]
pub struct SegmentEffort {
    pub effort_id: u64,
    pub route_id: u64,
    pub activity_id: u64,
    pub route_name: String,
    /// Seconds
    pub elapsed_time: u32,
    /// Seconds
    pub moving_time: u32,
    pub start_time: NaiveDateTime,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub pr_rank: Option<u32>,
    pub achievements: Vec<Achievement>,
    pub segment: SegmentSummary,
}

impl From<RawSegmentEffort> for SegmentEffort {
    fn from(raw: RawSegmentEffort) -> Self {
        Self {
            effort_id: raw.id,
            route_id: raw.segment.id,
            activity_id: raw.activity.id,
            route_name: raw.name,
            elapsed_time: raw.elapsed_time,
            moving_time: raw.moving_time,
            start_time: raw.start_date_local,
            average_heartrate: raw.average_heartrate,
            max_heartrate: raw.max_heartrate,
            pr_rank: raw.pr_rank,
            achievements: raw.achievements,
            segment: raw.segment,
        }
    }
}

impl SegmentEffort {
    /// The Local Legend achievement on this effort, if it carries one.
    pub fn local_legend(&self) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.is_local_legend())
    }
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Per-route aggregate over repeated efforts.
//!
//! Every view here is recomputed from the effort list on each call, so
//! adding an effort can never leave a stale personal best or latest pick.

use crate::error::{AppError, Result};
use crate::models::{Achievement, SegmentEffort, SegmentSummary};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// All recorded efforts for one route, in the order they were encountered.
#[derive(Debug, Clone)]
pub struct Segment {
    route_id: u64,
    efforts: Vec<SegmentEffort>,
}

/// Local Legend held on the most recent attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegendStatus {
    pub start_time: NaiveDateTime,
    /// Efforts counted toward the legend title (None if Strava omitted it)
    pub effort_count: Option<u32>,
}

/// One row of the time-ordered effort table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffortRow {
    pub effort_id: u64,
    pub route_id: u64,
    pub activity_id: u64,
    pub route_name: String,
    pub elapsed_time: u32,
    pub moving_time: u32,
    pub start_time: NaiveDateTime,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub pr_rank: Option<u32>,
    /// 1-based position in start-time order
    pub time_index: usize,
    /// 0-based position of `activity_id` among this route's distinct
    /// activities, ordered by activity id
    pub activity_index: usize,
}

impl Segment {
    pub fn new(route_id: u64) -> Self {
        Self {
            route_id,
            efforts: Vec::new(),
        }
    }

    pub fn route_id(&self) -> u64 {
        self.route_id
    }

    pub fn add_effort(&mut self, effort: SegmentEffort) {
        self.efforts.push(effort);
    }

    pub fn efforts(&self) -> &[SegmentEffort] {
        &self.efforts
    }

    pub fn number_efforts(&self) -> usize {
        self.efforts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.efforts.is_empty()
    }

    /// Route metadata carried on the first effort.
    pub fn summary(&self) -> Option<&SegmentSummary> {
        self.efforts.first().map(|e| &e.segment)
    }

    pub fn name(&self) -> Option<&str> {
        self.efforts.first().map(|e| e.route_name.as_str())
    }

    fn non_empty(&self) -> Result<&[SegmentEffort]> {
        if self.efforts.is_empty() {
            return Err(AppError::EmptySegment(self.route_id));
        }
        Ok(&self.efforts)
    }

    /// Fastest effort and its elapsed time.
    ///
    /// Scans with `<=`, so among equal times the last one encountered wins.
    pub fn personal_best(&self) -> Result<(&SegmentEffort, u32)> {
        let efforts = self.non_empty()?;
        let mut best = &efforts[0];
        for effort in efforts {
            if effort.elapsed_time <= best.elapsed_time {
                best = effort;
            }
        }
        Ok((best, best.elapsed_time))
    }

    /// Effort with the greatest start time; the first one wins exact ties.
    pub fn latest_effort(&self) -> Result<&SegmentEffort> {
        let efforts = self.non_empty()?;
        let mut latest = &efforts[0];
        for effort in efforts {
            if effort.start_time > latest.start_time {
                latest = effort;
            }
        }
        Ok(latest)
    }

    /// Local Legend status of the latest effort only.
    ///
    /// An older effort holding the title does not count.
    pub fn legend_status(&self) -> Result<Option<LegendStatus>> {
        let latest = self.latest_effort()?;
        Ok(latest.local_legend().map(|a| LegendStatus {
            start_time: latest.start_time,
            effort_count: a.effort_count,
        }))
    }

    /// Achievements attached to the latest effort.
    pub fn latest_effort_achievements(&self) -> Result<&[Achievement]> {
        Ok(&self.latest_effort()?.achievements)
    }

    /// Every (effort, achievement) pair on this route, in effort order.
    pub fn achievements(&self) -> Vec<(&SegmentEffort, &Achievement)> {
        self.efforts
            .iter()
            .flat_map(|e| e.achievements.iter().map(move |a| (e, a)))
            .collect()
    }

    /// Efforts sorted by start time with time and activity indices.
    pub fn effort_table(&self) -> Result<Vec<EffortRow>> {
        let efforts = self.non_empty()?;

        let mut activity_ids: Vec<u64> = efforts.iter().map(|e| e.activity_id).collect();
        activity_ids.sort_unstable();
        activity_ids.dedup();
        let activity_index: BTreeMap<u64, usize> = activity_ids
            .into_iter()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect();

        let mut ordered: Vec<&SegmentEffort> = efforts.iter().collect();
        // Stable: equal start times keep encounter order.
        ordered.sort_by_key(|e| e.start_time);

        Ok(ordered
            .into_iter()
            .enumerate()
            .map(|(i, e)| EffortRow {
                effort_id: e.effort_id,
                route_id: self.route_id,
                activity_id: e.activity_id,
                route_name: e.route_name.clone(),
                elapsed_time: e.elapsed_time,
                moving_time: e.moving_time,
                start_time: e.start_time,
                average_heartrate: e.average_heartrate,
                max_heartrate: e.max_heartrate,
                pr_rank: e.pr_rank,
                time_index: i + 1,
                activity_index: activity_index[&e.activity_id],
            })
            .collect())
    }
}

impl PartialEq for Segment {
    fn eq(&self, other: &Self) -> bool {
        self.route_id == other.route_id
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Segment: {}, {} efforts",
            self.route_id,
            self.efforts.len()
        )
    }
}

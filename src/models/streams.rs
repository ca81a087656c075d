// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Activity stream bundle (`key_by_type=true` layout).

use serde::Deserialize;
use std::collections::BTreeMap;

/// Stream keys requested when the caller does not choose any.
pub const DEFAULT_STREAM_KEYS: &[&str] = &[
    "distance",
    "time",
    "altitude",
    "velocity_smooth",
    "heartrate",
    "moving",
    "latlng",
];

/// One stream series, e.g. `heartrate`.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamSeries {
    pub data: Vec<serde_json::Value>,
    #[serde(default)]
    pub series_type: Option<String>,
    #[serde(default)]
    pub original_size: Option<usize>,
    #[serde(default)]
    pub resolution: Option<String>,
}

/// Streams of one activity keyed by stream type.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ActivityStreams {
    streams: BTreeMap<String, StreamSeries>,
}

impl ActivityStreams {
    pub fn from_json(body: &str) -> crate::error::Result<Self> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.streams.keys().map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&StreamSeries> {
        self.streams.get(key)
    }

    /// Number of samples (longest series; Strava sends equal lengths).
    pub fn len(&self) -> usize {
        self.streams.values().map(|s| s.data.len()).max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A scalar stream as floats. `None` if absent or non-numeric
    /// (`latlng` pairs, for instance).
    pub fn column_f64(&self, key: &str) -> Option<Vec<f64>> {
        self.streams
            .get(key)?
            .data
            .iter()
            .map(|v| v.as_f64())
            .collect()
    }
}

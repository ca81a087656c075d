// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Shared helpers for date/time parsing.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Parse a Strava `start_date_local` value.
///
/// Strava suffixes local times with `Z` even though they carry no zone, so
/// the suffix is accepted and ignored.
pub fn parse_local_datetime(value: &str) -> Option<NaiveDateTime> {
    let trimmed = value.strip_suffix('Z').unwrap_or(value);
    trimmed.parse::<NaiveDateTime>().ok()
}

/// Today's calendar date in the local zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Serde adapter for `start_date_local` fields.
pub fn deserialize_local_datetime<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_local_datetime(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid local datetime: {raw}")))
}

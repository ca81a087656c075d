// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava-Segments: cached Strava retrieval and per-segment effort history
//!
//! This crate fetches a single athlete's activities, activity details and
//! streams from Strava, keeps every raw response in an on-disk cache so the
//! API quota is spent only once per entity, and groups segment efforts into
//! per-route aggregates (personal best, latest attempt, Local Legend).

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod time_utils;

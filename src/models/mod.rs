// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Data models for the application.

pub mod activity;
pub mod credential;
pub mod effort;
pub mod segment;
pub mod streams;

pub use activity::{ActivityDetail, ActivityIndex, ActivitySummary};
pub use credential::Credential;
pub use effort::{Achievement, SegmentEffort, SegmentSummary, LOCAL_LEGEND_TYPE_ID};
pub use segment::{EffortRow, LegendStatus, Segment};
pub use streams::{ActivityStreams, StreamSeries, DEFAULT_STREAM_KEYS};

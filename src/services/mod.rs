// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod cache;
pub mod catalog;
pub mod credentials;
pub mod fetcher;
pub mod strava;

pub use cache::ResponseCache;
pub use catalog::{
    effort_link_to_segment_id, segment_ids_of_activity, segment_link_to_segment_id,
    SegmentCatalog,
};
pub use credentials::CredentialStore;
pub use fetcher::{CachedFetcher, StravaRepository};
pub use strava::{StravaClient, StravaService};

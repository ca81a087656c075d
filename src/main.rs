// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Segments batch run.
//!
//! Retrieves the activity list, fills the activity-detail cache, and logs
//! a per-segment summary for the most recent activity.

use strava_segments::{
    config::Config,
    services::{segment_ids_of_activity, SegmentCatalog, StravaRepository},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    let config = Config::from_env()?;
    tracing::info!(
        tokens = %config.tokens_path.display(),
        activity_cache = %config.activity_cache_dir.display(),
        stream_cache = %config.stream_cache_dir.display(),
        "Starting Strava-Segments"
    );

    let mut repo = StravaRepository::from_config(&config)?;

    let activities = repo.retrieve_activities().await?;
    let Some(latest) = activities.latest() else {
        tracing::warn!("No activities returned by Strava");
        return Ok(());
    };
    let latest_id = latest.id;

    let ids: Vec<u64> = activities.activities().iter().map(|a| a.id).collect();
    let catalog = SegmentCatalog::from_repository(&mut repo, &activities, ids).await?;

    let Some(detail) = repo.activity_detail(&activities, latest_id, true, false).await? else {
        tracing::warn!(activity_id = latest_id, "No cached or remote data for activity");
        return Ok(());
    };

    for route_id in segment_ids_of_activity(&detail, None) {
        let Some(segment) = catalog.get(route_id) else {
            continue;
        };
        let (pr, pr_time) = segment.personal_best()?;
        let latest_effort = segment.latest_effort()?;
        let legend = segment.legend_status()?;

        tracing::info!(
            route_id,
            name = segment.name().unwrap_or_default(),
            efforts = segment.number_efforts(),
            pr_time,
            pr_date = %pr.start_time,
            latest_time = latest_effort.elapsed_time,
            local_legend = ?legend.and_then(|l| l.effort_count),
            "Segment summary"
        );
    }

    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("strava_segments=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Segment catalog over real-shaped activity details.
//!
//! IMPORTANT: a wrong "latest" or "fastest" pick here shows up silently in
//! every per-segment summary, so these pin the tie-break rules end to end.

use strava_segments::error::AppError;
use strava_segments::models::{ActivityDetail, ActivityIndex};
use strava_segments::services::{
    effort_link_to_segment_id, segment_ids_of_activity, SegmentCatalog,
};

mod common;
use common::{detail_json, load_fixture, summary_json, MockStrava, TestEnv};

fn fixture_detail() -> ActivityDetail {
    ActivityDetail::from_json(&load_fixture("activity_12345678901.json"))
        .expect("Failed to parse activity fixture")
}

fn detail(activity_id: u64, efforts: &[(u64, u64, u32, &str)]) -> ActivityDetail {
    serde_json::from_value(detail_json(activity_id, efforts)).unwrap()
}

#[test]
fn test_fixture_parses_efforts() {
    let detail = fixture_detail();

    assert_eq!(detail.id, 12345678901);
    assert_eq!(
        segment_ids_of_activity(&detail, None),
        vec![8109834, 611413, 4293851]
    );
    assert_eq!(
        detail.extra.get("device_name").and_then(|v| v.as_str()),
        Some("Garmin Edge 530")
    );

    let olh = &detail.segment_efforts[0];
    assert_eq!(olh.activity_id, 12345678901);
    assert_eq!(olh.elapsed_time, 1512);
    assert_eq!(olh.pr_rank, Some(2));
    assert_eq!(olh.segment.climb_category, Some(3));
    assert!(detail.segment_efforts[2].average_heartrate.is_none());
}

#[test]
fn test_fixture_legend_on_latest_effort() {
    let detail = fixture_detail();
    let catalog = SegmentCatalog::build([&detail]);

    let olh = catalog.get(8109834).unwrap();
    let legend = olh.legend_status().unwrap().unwrap();
    assert_eq!(legend.effort_count, Some(23));
    assert_eq!(olh.summary().unwrap().average_grade, Some(7.9));
    assert_eq!(olh.to_string(), "Segment: 8109834, 1 efforts");

    let skyline = catalog.get(611413).unwrap();
    assert_eq!(skyline.legend_status().unwrap(), None);
}

#[test]
fn test_newer_effort_without_legend_clears_status() {
    let older = fixture_detail();
    let newer = detail(
        12345678999,
        &[(4000000001, 8109834, 1530, "2024-07-01T07:00:00Z")],
    );

    let catalog = SegmentCatalog::build([&older, &newer]);
    let olh = catalog.get(8109834).unwrap();

    assert_eq!(olh.number_efforts(), 2);
    assert_eq!(olh.latest_effort().unwrap().effort_id, 4000000001);
    assert_eq!(olh.legend_status().unwrap(), None);
    assert_eq!(olh.personal_best().unwrap().1, 1512);
    assert_eq!(olh.achievements().len(), 2);
}

#[test]
fn test_effort_table_across_activities() {
    let a50 = detail(
        50,
        &[
            (1, 700, 300, "2024-01-01T09:00:00Z"),
            (2, 700, 310, "2024-01-01T09:40:00Z"),
        ],
    );
    let a30 = detail(30, &[(3, 700, 305, "2024-01-03T09:00:00Z")]);

    let catalog = SegmentCatalog::build([&a50, &a30]);
    let table = catalog.get(700).unwrap().effort_table().unwrap();

    let rows: Vec<(u64, usize, usize)> = table
        .iter()
        .map(|r| (r.effort_id, r.time_index, r.activity_index))
        .collect();
    assert_eq!(rows, vec![(1, 1, 1), (2, 2, 1), (3, 3, 0)]);
}

#[test]
fn test_effort_link_resolves_through_fixture() {
    let detail = fixture_detail();
    assert_eq!(
        effort_link_to_segment_id(
            &detail,
            "https://www.strava.com/activities/12345678901/segments/3212300003"
        ),
        Some(4293851)
    );
}

#[tokio::test]
async fn test_from_repository_skips_activities_without_data() {
    let mock = MockStrava::default();
    mock.details.lock().unwrap().insert(
        1,
        detail_json(1, &[(11, 700, 300, "2024-01-01T09:00:00Z")]),
    );
    mock.details.lock().unwrap().insert(
        3,
        detail_json(3, &[(31, 700, 300, "2024-01-03T09:00:00Z")]),
    );
    // Activity 2 is listed but its detail request fails.
    mock.failures.lock().unwrap().insert(2, 500);
    let env = TestEnv::start(mock).await;
    env.write_valid_tokens();
    let mut repo = env.repository(200);

    let index = ActivityIndex::new(
        [3, 2, 1]
            .iter()
            .map(|id| serde_json::from_value(summary_json(*id, "2024-01-01T09:00:00Z")).unwrap())
            .collect(),
    );

    // 4 is not listed at all and must not reach the server.
    let catalog = SegmentCatalog::from_repository(&mut repo, &index, [1, 2, 3, 4])
        .await
        .unwrap();

    let segment = catalog.get(700).unwrap();
    assert_eq!(segment.number_efforts(), 2);
    // Equal times, so the last encountered (activity 3) holds the PR.
    assert_eq!(segment.personal_best().unwrap().0.effort_id, 31);
    assert_eq!(env.mock.api_calls(), 3);
}

#[tokio::test]
async fn test_from_repository_stops_at_rate_limit() {
    let mock = MockStrava::default();
    for id in [1, 3] {
        mock.details.lock().unwrap().insert(
            id,
            detail_json(id, &[(id * 10, 700, 300, "2024-01-01T09:00:00Z")]),
        );
    }
    mock.failures.lock().unwrap().insert(2, 429);
    let env = TestEnv::start(mock).await;
    env.write_valid_tokens();
    let mut repo = env.repository(200);

    let index = ActivityIndex::new(
        [1, 2, 3]
            .iter()
            .map(|id| serde_json::from_value(summary_json(*id, "2024-01-01T09:00:00Z")).unwrap())
            .collect(),
    );

    let catalog = SegmentCatalog::from_repository(&mut repo, &index, [1, 2, 3])
        .await
        .unwrap();

    // Activity 3 is never requested once the quota is spent.
    assert_eq!(env.mock.api_calls(), 2);
    assert_eq!(catalog.get(700).unwrap().number_efforts(), 1);
    assert_eq!(catalog.get(700).unwrap().efforts()[0].effort_id, 10);
}

#[tokio::test]
async fn test_from_repository_stops_on_auth_failure() {
    let env = TestEnv::start(MockStrava::default()).await;
    // No token file written.
    let mut repo = env.repository(200);
    let index = ActivityIndex::new(vec![
        serde_json::from_value(summary_json(1, "2024-01-01T09:00:00Z")).unwrap(),
    ]);

    let result = SegmentCatalog::from_repository(&mut repo, &index, [1]).await;

    assert!(matches!(result, Err(AppError::Auth(_))));
}

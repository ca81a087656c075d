// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-process stand-in for the Strava API and OAuth endpoint.

#![allow(dead_code)]

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use strava_segments::models::Credential;
use strava_segments::services::{
    CredentialStore, ResponseCache, StravaClient, StravaRepository, StravaService,
};
use tempfile::TempDir;

pub const NEW_ACCESS_TOKEN: &str = "access-refreshed";
pub const NEW_REFRESH_TOKEN: &str = "refresh-refreshed";
pub const VALID_ACCESS_TOKEN: &str = "access-valid";

/// Canned responses and request counters for the mock server.
#[derive(Default)]
pub struct MockStrava {
    pub pages: Mutex<Vec<Vec<Value>>>,
    pub details: Mutex<HashMap<u64, Value>>,
    pub streams: Mutex<HashMap<u64, Value>>,
    pub segments: Mutex<HashMap<u64, Value>>,
    /// Status to answer with for an id instead of its canned body
    pub failures: Mutex<HashMap<u64, u16>>,
    pub refresh_fails: AtomicBool,
    pub refresh_calls: AtomicUsize,
    pub api_calls: AtomicUsize,
    pub last_bearer: Mutex<Option<String>>,
    pub last_query: Mutex<HashMap<String, String>>,
}

impl MockStrava {
    pub fn api_calls(&self) -> usize {
        self.api_calls.load(Ordering::SeqCst)
    }

    pub fn refresh_calls(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    fn record(&self, headers: &HeaderMap, query: HashMap<String, String>) {
        self.api_calls.fetch_add(1, Ordering::SeqCst);
        let bearer = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(String::from);
        *self.last_bearer.lock().unwrap() = bearer;
        *self.last_query.lock().unwrap() = query;
    }

    fn lookup(&self, table: &Mutex<HashMap<u64, Value>>, id: u64) -> Response {
        if let Some(status) = self.failures.lock().unwrap().get(&id) {
            let status = StatusCode::from_u16(*status).unwrap();
            return (status, Json(json!({ "message": "Forced failure", "errors": [] })))
                .into_response();
        }
        match table.lock().unwrap().get(&id) {
            Some(body) => Json(body.clone()).into_response(),
            None => (
                StatusCode::NOT_FOUND,
                Json(json!({ "message": "Record Not Found", "errors": [] })),
            )
                .into_response(),
        }
    }
}

type Shared = State<Arc<MockStrava>>;

async fn token(State(s): Shared, Form(form): Form<HashMap<String, String>>) -> Response {
    s.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if s.refresh_fails.load(Ordering::SeqCst)
        || form.get("grant_type").map(String::as_str) != Some("refresh_token")
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": "Bad Request", "errors": [{ "code": "invalid" }] })),
        )
            .into_response();
    }

    let expires_at = chrono::Utc::now().timestamp() + 21600;
    Json(json!({
        "token_type": "Bearer",
        "access_token": NEW_ACCESS_TOKEN,
        "expires_at": expires_at,
        "expires_in": 21600,
        "refresh_token": NEW_REFRESH_TOKEN
    }))
    .into_response()
}

async fn list_activities(
    State(s): Shared,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let page: usize = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(1);
    s.record(&headers, query);
    let body = s
        .pages
        .lock()
        .unwrap()
        .get(page.saturating_sub(1))
        .cloned()
        .unwrap_or_default();
    Json(body).into_response()
}

async fn activity_detail(
    State(s): Shared,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    s.record(&headers, query);
    s.lookup(&s.details, id)
}

async fn activity_streams(
    State(s): Shared,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    s.record(&headers, query);
    s.lookup(&s.streams, id)
}

async fn segment_detail(
    State(s): Shared,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    s.record(&headers, query);
    s.lookup(&s.segments, id)
}

/// Serve `mock` on an ephemeral local port; returns the server root URL.
pub async fn spawn_mock(mock: Arc<MockStrava>) -> String {
    let app = Router::new()
        .route("/oauth/token", post(token))
        .route("/api/v3/athlete/activities", get(list_activities))
        .route("/api/v3/activities/{id}", get(activity_detail))
        .route("/api/v3/activities/{id}/streams", get(activity_streams))
        .route("/api/v3/segments/{id}", get(segment_detail))
        .with_state(mock);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind mock server");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

/// A mock server plus a scratch directory for tokens and caches.
pub struct TestEnv {
    pub mock: Arc<MockStrava>,
    pub root: String,
    pub dir: TempDir,
}

impl TestEnv {
    pub async fn start(mock: MockStrava) -> Self {
        let mock = Arc::new(mock);
        let root = spawn_mock(mock.clone()).await;
        Self {
            mock,
            root,
            dir: tempfile::tempdir().unwrap(),
        }
    }

    pub fn tokens_path(&self) -> PathBuf {
        self.dir.path().join("strava_tokens.txt")
    }

    pub fn write_tokens(&self, access_token: &str, expires_at: i64) {
        let credential = Credential {
            access_token: access_token.to_string(),
            refresh_token: "refresh-original".to_string(),
            expires_at,
        };
        std::fs::write(
            self.tokens_path(),
            serde_json::to_string(&credential).unwrap(),
        )
        .unwrap();
    }

    /// Token file holding an access token valid for hours.
    pub fn write_valid_tokens(&self) {
        self.write_tokens(VALID_ACCESS_TOKEN, chrono::Utc::now().timestamp() + 6 * 3600);
    }

    pub fn credential_store(&self) -> CredentialStore {
        CredentialStore::new(
            self.tokens_path(),
            format!("{}/oauth/token", self.root),
            "client-id".to_string(),
            "client-secret".to_string(),
        )
    }

    pub fn service(&self) -> StravaService {
        StravaService::new(
            StravaClient::new(format!("{}/api/v3", self.root)),
            self.credential_store(),
        )
    }

    pub fn repository(&self, page_size: u32) -> StravaRepository {
        StravaRepository::new(
            self.service(),
            ResponseCache::open(self.dir.path().join("stream_cache")).unwrap(),
            ResponseCache::open(self.dir.path().join("activity_cache")).unwrap(),
            page_size,
        )
    }
}

/// Minimal activity-list entry.
pub fn summary_json(id: u64, start_date_local: &str) -> Value {
    json!({
        "id": id,
        "name": format!("Ride {id}"),
        "sport_type": "Ride",
        "start_date_local": start_date_local,
        "distance": 30000.0,
        "moving_time": 3600,
        "elapsed_time": 3900,
        "max_speed": 14.2,
        "average_heartrate": 150.0
    })
}

/// Activity detail with one effort per `(effort_id, route_id, elapsed, start)`.
pub fn detail_json(activity_id: u64, efforts: &[(u64, u64, u32, &str)]) -> Value {
    let efforts: Vec<Value> = efforts
        .iter()
        .map(|(effort_id, route_id, elapsed, start)| {
            json!({
                "id": effort_id,
                "name": format!("Route {route_id}"),
                "activity": { "id": activity_id },
                "segment": { "id": route_id, "name": format!("Route {route_id}") },
                "elapsed_time": elapsed,
                "moving_time": elapsed,
                "start_date_local": start,
                "average_heartrate": 160.0,
                "max_heartrate": 175.0,
                "pr_rank": null,
                "achievements": []
            })
        })
        .collect();
    json!({
        "id": activity_id,
        "name": format!("Ride {activity_id}"),
        "segment_efforts": efforts
    })
}

pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).expect("Failed to read fixture")
}

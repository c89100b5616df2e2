//! End-to-end smoke tests for the full zonealarmd stack.
//!
//! Each test wires the real adapters (in-memory `SQLite`, system clock, host
//! time sync, firing bus, axum router) and exercises the protocol over HTTP
//! via `tower::ServiceExt::oneshot`, so no TCP port is bound.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use chrono::FixedOffset;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tokio::sync::Mutex;
use tower::ServiceExt;
use zonealarm_adapter_clock::{HostTimeSync, SystemClock};
use zonealarm_adapter_http_axum::router;
use zonealarm_adapter_http_axum::state::AppState;
use zonealarm_adapter_storage_sqlite_sqlx::byte_store::SqliteByteStore;
use zonealarm_adapter_storage_sqlite_sqlx::pool::{Config, Database};
use zonealarm_app::dispatcher::Dispatcher;
use zonealarm_app::firing_bus::InProcessFiringBus;
use zonealarm_app::scheduler::Scheduler;
use zonealarm_domain::id::{SlotId, ZoneId};

type Stack = Dispatcher<SqliteByteStore, Arc<InProcessFiringBus>, SystemClock, HostTimeSync>;

struct TestApp {
    db: Database,
    dispatcher: Arc<Mutex<Stack>>,
    bus: Arc<InProcessFiringBus>,
}

async fn database() -> Database {
    Config {
        database_url: "sqlite::memory:".to_string(),
    }
    .build()
    .await
    .expect("in-memory database should initialise")
}

/// Wire a scheduler over `db` with an unset clock and boot it.
async fn app_over(db: Database) -> TestApp {
    let offset = FixedOffset::east_opt(19_800).unwrap();
    let bus = Arc::new(InProcessFiringBus::new(16));

    let mut scheduler = Scheduler::new(
        SqliteByteStore::new(db.pool().clone()),
        SystemClock::new(offset, false),
    );
    for zone in ZoneId::all() {
        scheduler.register_sink(zone, Arc::clone(&bus));
    }
    scheduler.boot().await;

    TestApp {
        db,
        dispatcher: Arc::new(Mutex::new(Dispatcher::new(
            scheduler,
            HostTimeSync::new(offset),
        ))),
        bus,
    }
}

async fn app() -> TestApp {
    app_over(database().await).await
}

impl TestApp {
    fn router(&self) -> axum::Router {
        router::build(AppState::from_arcs(
            Arc::clone(&self.dispatcher),
            Arc::clone(&self.bus),
        ))
    }

    async fn send(&self, method: Method, uri: &str, body: Body) -> (StatusCode, Value) {
        let resp = self
            .router()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn command(&self, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/api/command", Body::from(body.to_string()))
            .await
    }

    async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Body::empty()).await
    }
}

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_return_ok_when_health_check_called() {
    let resp = app()
        .await
        .router()
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"OK");
}

// ---------------------------------------------------------------------------
// Alarm commands
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_add_list_and_delete_alarms() {
    let app = app().await;

    let (status, body) = app
        .command(json!({"command": "add", "callback": 2, "type": "day", "days": ["mon", "fri"], "time": "06:15", "action": "ON"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "id": 0}));

    let (_, body) = app
        .command(json!({"command": "add", "callback": 2, "type": "date", "date": "2025-12-24", "oneTime": true, "time": "18:00", "action": "OFF"}))
        .await;
    assert_eq!(body["id"], 1);

    let (status, body) = app.get("/api/alarms").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], "list");
    assert_eq!(body["alarms"].as_array().unwrap().len(), 2);
    assert_eq!(body["alarms"][1]["date"], "2025-12-24");
    assert_eq!(body["alarms"][1]["oneTime"], true);

    let (status, body) = app
        .command(json!({"command": "delete", "callback": 2, "id": 0}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = app.get("/api/alarms").await;
    assert_eq!(body["alarms"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn should_reject_invalid_alarm_with_protocol_message() {
    let app = app().await;

    let (status, body) = app
        .command(json!({"command": "add", "callback": 1, "type": "day", "days": ["funday"], "time": "06:15", "action": "ON"}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid day: funday");
}

#[tokio::test]
async fn should_answer_conflict_when_zone_is_full() {
    let app = app().await;
    for minute in 0..10 {
        let (status, _) = app
            .command(json!({"command": "add", "callback": 3, "type": "day", "days": ["sun"], "time": format!("07:{minute:02}"), "action": "ON"}))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .command(json!({"command": "add", "callback": 3, "type": "day", "days": ["sun"], "time": "09:00", "action": "ON"}))
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Callback full");
}

#[tokio::test]
async fn should_answer_unknown_command() {
    let app = app().await;
    let (status, body) = app.command(json!({"command": "reboot"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown command");
}

// ---------------------------------------------------------------------------
// Clock
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_report_time_only_after_set() {
    let app = app().await;

    let (status, _) = app.get("/api/time").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = app
        .command(json!({"command": "set", "time": "2025-06-16 08:30:00"}))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/time").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["time"].as_str().unwrap().starts_with("2025/06/16 08:3"));
}

#[tokio::test]
async fn should_reject_set_with_bad_format() {
    let app = app().await;
    let (status, body) = app
        .command(json!({"command": "set", "time": "16/06/2025 08:30"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["message"],
        "Invalid time format. Use YYYY-MM-DD HH:MM[:SS]"
    );
}

#[tokio::test]
async fn should_sync_clock_from_host_time() {
    let app = app().await;

    let (status, body) = app.command(json!({"command": "ntp"})).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["command"], "ntp");
    assert_eq!(body["status"], "success");
    let (status, _) = app.get("/api/time").await;
    assert_eq!(status, StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Tick & persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn should_fire_and_consume_one_time_alarm() {
    let app = app().await;
    let mut firings = app.bus.subscribe();

    app.command(json!({"command": "add", "callback": 1, "type": "date", "date": "2025-06-16", "oneTime": true, "time": "08:30", "action": "ON", "zone_data": {"valve": 7}}))
        .await;
    app.command(json!({"command": "set", "time": "2025-06-16 08:30:05"}))
        .await;

    let report = app.dispatcher.lock().await.scheduler_mut().tick().await;
    assert_eq!(report.fired.len(), 1);

    let firing = firings.recv().await.unwrap();
    assert_eq!(firing.zone.get(), 1);
    assert_eq!(firing.payload.to_value(), json!({"valve": 7}));

    let (_, body) = app.get("/api/alarms").await;
    assert_eq!(body["alarms"], json!([]));
}

#[tokio::test]
async fn should_restore_alarms_and_zone_data_after_restart() {
    let first = app().await;
    first
        .command(json!({"command": "add", "callback": 4, "type": "day", "days": ["tue"], "time": "21:45", "action": "OFF", "zone_data": {"label": "porch"}}))
        .await;
    first
        .command(json!({"command": "add", "callback": 4, "type": "day", "days": ["wed"], "time": "22:00", "action": "ON"}))
        .await;
    first
        .command(json!({"command": "delete", "callback": 4, "id": 0}))
        .await;
    first
        .command(json!({"command": "add", "callback": 4, "type": "date", "date": "2026-01-01", "oneTime": false, "time": "00:00", "action": "ON", "zone_data": {"label": "new year"}}))
        .await;

    let (_, before) = first.get("/api/alarms").await;
    let second = app_over(first.db).await;
    let (_, after) = second.get("/api/alarms").await;

    assert_eq!(after, before);
    assert_eq!(after["alarms"][0]["id"], 0);
    assert_eq!(after["alarms"][1]["id"], 1);

    let dispatcher = second.dispatcher.lock().await;
    let zone = ZoneId::new(4).unwrap();
    let slot = SlotId::new(0).unwrap();
    assert_eq!(
        dispatcher
            .scheduler()
            .zone_data()
            .get_or_empty(zone, slot)
            .to_value(),
        json!({"label": "new year"})
    );
}

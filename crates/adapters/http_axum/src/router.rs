//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use zonealarm_app::ports::{AlarmSink, ByteStore, ClockSource, TimeSync};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Nests API routes under `/api` and includes a [`TraceLayer`] that logs each
/// HTTP request/response at the `DEBUG` level.
pub fn build<B, S, C, T>(state: AppState<B, S, C, T>) -> Router
where
    B: ByteStore + Send + Sync + 'static,
    S: AlarmSink + Send + Sync + 'static,
    C: ClockSource + Send + Sync + 'static,
    T: TimeSync + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tower::ServiceExt;
    use zonealarm_app::dispatcher::Dispatcher;
    use zonealarm_app::firing_bus::InProcessFiringBus;
    use zonealarm_app::memory_store::InMemoryByteStore;
    use zonealarm_app::scheduler::Scheduler;
    use zonealarm_domain::error::{ClockError, ZoneAlarmError};
    use zonealarm_domain::id::ZoneId;
    use zonealarm_domain::time::{WallClock, parse_wall_clock};

    use super::*;

    // ── Stub clock & sync ───────────────────────────────────────────

    #[derive(Default)]
    struct StubClock(Mutex<Option<WallClock>>);

    impl ClockSource for StubClock {
        fn now(&self) -> Result<WallClock, ClockError> {
            self.0.lock().unwrap().ok_or(ClockError::Unset)
        }

        fn set(&self, at: WallClock) -> Result<(), ClockError> {
            *self.0.lock().unwrap() = Some(at);
            Ok(())
        }
    }

    struct StubSync;

    impl TimeSync for StubSync {
        async fn sync(&self) -> Result<WallClock, ZoneAlarmError> {
            Ok(parse_wall_clock("2025-06-16 08:30").unwrap())
        }
    }

    type TestState = AppState<InMemoryByteStore, Arc<InProcessFiringBus>, StubClock, StubSync>;

    fn test_state() -> TestState {
        let bus = Arc::new(InProcessFiringBus::new(16));
        let mut scheduler = Scheduler::new(InMemoryByteStore::new(), StubClock::default());
        for zone in ZoneId::all() {
            scheduler.register_sink(zone, Arc::clone(&bus));
        }
        AppState::new(Dispatcher::new(scheduler, StubSync), bus)
    }

    async fn call(state: &TestState, method: Method, uri: &str, body: &str) -> (StatusCode, Value) {
        let response = build(state.clone())
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("content-type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let app = build(test_state());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_add_alarm_through_command_endpoint() {
        let state = test_state();
        let body = json!({"command": "add", "callback": 1, "type": "day", "days": ["mon"], "time": "08:30", "action": "ON"});

        let (status, value) = call(&state, Method::POST, "/api/command", &body.to_string()).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(value, json!({"status": "success", "id": 0}));

        let (status, listed) = call(&state, Method::GET, "/api/alarms", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["alarms"][0]["days"], json!(["mon"]));
    }

    #[tokio::test]
    async fn should_answer_bad_request_for_invalid_json() {
        let state = test_state();
        let (status, value) = call(&state, Method::POST, "/api/command", "{oops").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(value["message"], "Invalid JSON");
    }

    #[tokio::test]
    async fn should_answer_not_found_for_inactive_slot() {
        let state = test_state();
        let body = json!({"command": "delete", "callback": 2, "id": 3}).to_string();
        let (status, value) = call(&state, Method::POST, "/api/command", &body).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(value["message"], "Invalid ID");
    }

    #[tokio::test]
    async fn should_answer_unavailable_while_clock_unset() {
        let state = test_state();
        let (status, value) = call(&state, Method::GET, "/api/time", "").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(value["command"], "time");

        let (status, _) = call(&state, Method::POST, "/api/command", r#"{"command":"ntp"}"#).await;
        assert_eq!(status, StatusCode::OK);
        let (status, value) = call(&state, Method::GET, "/api/time", "").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(value["time"], "2025/06/16 08:30:00");
    }

    #[tokio::test]
    async fn should_stream_firings_from_the_bus() {
        let state = test_state();
        let mut rx = state.firing_bus.subscribe();
        let _sse = crate::api::sse::stream(axum::extract::State(state.clone())).await;

        {
            let mut dispatcher = state.dispatcher.lock().await;
            dispatcher
                .dispatch_json(r#"{"command":"add","callback":4,"type":"day","days":["mon"],"time":"08:30","action":"OFF"}"#)
                .await;
            dispatcher
                .dispatch_json(r#"{"command":"set","time":"2025-06-16 08:30:10"}"#)
                .await;
            dispatcher.scheduler_mut().tick().await;
        }

        let firing = rx.recv().await.unwrap();
        assert_eq!(firing.zone.get(), 4);
    }
}

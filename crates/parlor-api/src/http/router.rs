//! Axum router configuration with middleware.
//!
//! Routes sit at the root (`/participants`, `/messages`, `/status`).
//! Middleware: CORS, request tracing.

use axum::Router;
use axum::extract::State;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/participants",
            post(handlers::participant::register).get(handlers::participant::list),
        )
        .route(
            "/messages",
            post(handlers::message::post).get(handlers::message::list),
        )
        .route("/status", post(handlers::status::heartbeat))
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Liveness plus the reaper's current phase.
async fn health_check(State(state): State<AppState>) -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "reaper": state.reaper.state(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use parlor_core::reaper::CycleOutcome;
    use parlor_infra::sqlite::pool::DatabasePool;
    use parlor_types::config::{ParlorConfig, ReaperConfig};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    async fn test_state(stale_after_secs: u64) -> AppState {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        std::mem::forget(dir);
        let pool = DatabasePool::new(&url).await.unwrap();
        let config = ParlorConfig {
            database_url: url,
            reaper: ReaperConfig {
                interval_secs: 15,
                stale_after_secs,
            },
            ..ParlorConfig::default()
        };
        AppState::from_pool(pool, config)
    }

    async fn send(
        router: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            req = req.header("user", user);
        }
        let req = match body {
            Some(body) => req
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => req.body(Body::empty()).unwrap(),
        };

        let resp = router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    fn texts(messages: &Value) -> Vec<String> {
        messages
            .as_array()
            .unwrap()
            .iter()
            .map(|m| m["text"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_register_and_list() {
        let router = build_router(test_state(10).await);

        let (status, _) = send(&router, "POST", "/participants", None, Some(json!({ "name": "alice" }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = send(&router, "POST", "/participants", None, Some(json!({ "name": "alice" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, body) = send(&router, "GET", "/participants", None, None).await;
        assert_eq!(status, StatusCode::OK);
        let roster = body.as_array().unwrap();
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0]["name"], "alice");
    }

    #[tokio::test]
    async fn test_register_invalid_name() {
        let router = build_router(test_state(10).await);

        let (status, body) = send(&router, "POST", "/participants", None, Some(json!({ "name": "   " }))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["code"], "VALIDATION_ERROR");
        assert_eq!(body["errors"][0]["details"][0]["rule"], "not_empty");

        let (status, _) = send(&router, "POST", "/participants", None, Some(json!({}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&router, "POST", "/participants", None, None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_post_message_rules() {
        let router = build_router(test_state(10).await);
        send(&router, "POST", "/participants", None, Some(json!({ "name": "alice" }))).await;

        let (status, body) = send(
            &router,
            "POST",
            "/messages",
            Some("alice"),
            Some(json!({ "to": "", "text": "", "type": "shout" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["details"].as_array().unwrap().len(), 3);

        let (status, body) = send(
            &router,
            "POST",
            "/messages",
            Some("mallory"),
            Some(json!({ "to": "Todos", "text": "hi", "type": "message" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["code"], "UNKNOWN_SENDER");

        let (status, _) = send(
            &router,
            "POST",
            "/messages",
            None,
            Some(json!({ "to": "Todos", "text": "hi", "type": "message" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_messages_unknown_user() {
        let router = build_router(test_state(10).await);
        let (status, body) = send(&router, "GET", "/messages", Some("ghost"), None).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"][0]["code"], "UNKNOWN_USER");
    }

    #[tokio::test]
    async fn test_heartbeat() {
        let router = build_router(test_state(10).await);
        send(&router, "POST", "/participants", None, Some(json!({ "name": "alice" }))).await;

        let (status, _) = send(&router, "POST", "/status", Some("alice"), None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = send(&router, "POST", "/status", Some("ghost"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["errors"][0]["code"], "PARTICIPANT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_private_messages_and_limit() {
        let router = build_router(test_state(10).await);
        for name in ["alice", "bob", "carol"] {
            send(&router, "POST", "/participants", None, Some(json!({ "name": name }))).await;
        }
        send(
            &router,
            "POST",
            "/messages",
            Some("alice"),
            Some(json!({ "to": "bob", "text": "psst", "type": "private_message" })),
        )
        .await;
        send(
            &router,
            "POST",
            "/messages",
            Some("bob"),
            Some(json!({ "to": "Todos", "text": "hello", "type": "message" })),
        )
        .await;

        let (_, bob) = send(&router, "GET", "/messages", Some("bob"), None).await;
        assert!(texts(&bob).contains(&"psst".to_string()));

        let (_, carol) = send(&router, "GET", "/messages", Some("carol"), None).await;
        assert!(!texts(&carol).contains(&"psst".to_string()));

        let (_, carol) = send(&router, "GET", "/messages?limit=2", Some("carol"), None).await;
        assert_eq!(texts(&carol), ["entra na sala...", "hello"]);

        let (_, carol) = send(&router, "GET", "/messages?limit=0", Some("carol"), None).await;
        assert_eq!(texts(&carol).len(), 4);
    }

    #[tokio::test]
    async fn test_end_to_end_session() {
        let state = test_state(0).await;
        let router = build_router(state.clone());

        let (status, _) = send(&router, "POST", "/participants", None, Some(json!({ "name": "alice" }))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, roster) = send(&router, "GET", "/participants", None, None).await;
        assert_eq!(roster[0]["name"], "alice");

        let (_, log) = send(&router, "GET", "/messages", Some("alice"), None).await;
        let log = log.as_array().unwrap().clone();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0]["type"], "status");
        assert_eq!(log[0]["text"], "entra na sala...");
        assert_eq!(log[0]["from"], "alice");

        let (status, _) = send(&router, "POST", "/participants", None, Some(json!({ "name": "alice" }))).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, echo) = send(
            &router,
            "POST",
            "/messages",
            Some("alice"),
            Some(json!({ "to": "Todos", "text": "hi", "type": "message" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(echo["from"], "alice");
        assert_eq!(echo["text"], "hi");

        send(&router, "POST", "/participants", None, Some(json!({ "name": "bob" }))).await;
        let (_, bob_view) = send(&router, "GET", "/messages", Some("bob"), None).await;
        assert_eq!(texts(&bob_view).iter().filter(|t| *t == "hi").count(), 1);

        // everyone is stale with a zero threshold once the clock moves on
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        match state.reaper.run_cycle().await {
            CycleOutcome::Completed(report) => assert_eq!(report.evicted, ["alice", "bob"]),
            other => panic!("expected Completed, got {other:?}"),
        }

        let (_, roster) = send(&router, "GET", "/participants", None, None).await;
        assert!(roster.as_array().unwrap().is_empty());

        let departures: Vec<String> = departure_senders(&state).await;
        assert_eq!(departures, ["alice", "bob"]);
    }

    /// Departure senders, read back through a freshly registered observer.
    async fn departure_senders(state: &AppState) -> Vec<String> {
        state
            .presence
            .register(Some(&json!("observer")))
            .await
            .unwrap();
        state
            .messages
            .list_visible_to("observer", None)
            .await
            .unwrap()
            .into_iter()
            .filter(|m| m.text == "sai da sala...")
            .map(|m| m.from)
            .collect()
    }

    #[tokio::test]
    async fn test_health() {
        let router = build_router(test_state(10).await);
        let (status, body) = send(&router, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["reaper"], "idle");
    }
}

// Shared doubles for the vendor agent API and the workflow webhook.
//
// Both run as real HTTP servers on an ephemeral port so the backend's reqwest
// clients are exercised end to end.

#![allow(dead_code)]

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Json},
    routing::post,
    Router,
};
use serde_json::{json, Value};
use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use voice_agent_bridge::Config;

/// Basic credentials for customer "id" / secret "secret"
pub const EXPECTED_AUTH: &str = "Basic aWQ6c2VjcmV0";

pub const CERTIFICATE: &str = "test-certificate";

#[derive(Clone, Default)]
pub struct Received {
    pub bodies: Arc<Mutex<Vec<Value>>>,
}

impl Received {
    pub fn last(&self) -> Option<Value> {
        self.bodies.lock().unwrap().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.bodies.lock().unwrap().len()
    }
}

pub async fn spawn(router: Router) -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move { axum::serve(listener, router).await });
    Ok(format!("http://{}", addr))
}

// ============================================================================
// Vendor agent API
// ============================================================================

async fn vendor_join(
    State(received): State<Received>,
    Path(app_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    if headers.get("authorization").and_then(|v| v.to_str().ok()) != Some(EXPECTED_AUTH) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "bad credentials" })),
        );
    }
    if app_id == "forbidden-app" {
        return (
            StatusCode::FORBIDDEN,
            Json(json!({ "message": "project disabled" })),
        );
    }

    received.bodies.lock().unwrap().push(body);
    (
        StatusCode::OK,
        Json(json!({ "agent_id": "agent-42", "status": "RUNNING", "create_ts": 1700000000 })),
    )
}

async fn vendor_leave(
    State(received): State<Received>,
    Path((_app_id, agent_id)): Path<(String, String)>,
) -> impl IntoResponse {
    received
        .bodies
        .lock()
        .unwrap()
        .push(json!({ "left": agent_id }));

    if agent_id == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "agent not found" })),
        );
    }
    (StatusCode::OK, Json(json!({})))
}

/// Anything outside the join/leave routes is recorded so tests can assert it
/// never happens
async fn vendor_unexpected(State(received): State<Received>, uri: Uri) -> impl IntoResponse {
    received
        .bodies
        .lock()
        .unwrap()
        .push(json!({ "unexpected": uri.path() }));
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": "no such route" })),
    )
}

pub async fn spawn_vendor() -> Result<(String, Received)> {
    let received = Received::default();
    let router = Router::new()
        .route("/projects/:app_id/join", post(vendor_join))
        .route(
            "/projects/:app_id/agents/:agent_id/leave",
            post(vendor_leave),
        )
        .fallback(vendor_unexpected)
        .with_state(received.clone());

    Ok((spawn(router).await?, received))
}

// ============================================================================
// Workflow webhook
// ============================================================================

async fn webhook_ok(State(received): State<Received>, Json(body): Json<Value>) -> impl IntoResponse {
    received.bodies.lock().unwrap().push(body);
    Json(json!({ "text": "hello from flow", "status": "success", "audio_url": null }))
}

async fn webhook_error() -> impl IntoResponse {
    (StatusCode::INTERNAL_SERVER_ERROR, "workflow crashed")
}

async fn webhook_slow() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(3)).await;
    Json(json!({ "text": "too late" }))
}

async fn webhook_garbage() -> impl IntoResponse {
    (StatusCode::OK, "definitely not json")
}

async fn webhook_empty() -> impl IntoResponse {
    Json(json!({}))
}

pub async fn spawn_webhook() -> Result<(String, Received)> {
    let received = Received::default();
    let router = Router::new()
        .route("/ok", post(webhook_ok))
        .route("/error", post(webhook_error))
        .route("/slow", post(webhook_slow))
        .route("/garbage", post(webhook_garbage))
        .route("/empty", post(webhook_empty))
        .with_state(received.clone());

    Ok((spawn(router).await?, received))
}

// ============================================================================
// Configuration
// ============================================================================

/// Write a config file pointing at the doubles and load it
pub fn load_config(
    app_id: &str,
    certificate: &str,
    vendor_url: &str,
    webhook_url: &str,
) -> Result<(Config, TempDir)> {
    let dir = TempDir::new()?;
    let path = dir.path().join("bridge.toml");
    let mut file = std::fs::File::create(&path)?;
    write!(
        file,
        r#"
[rtc]
app_id = "{app_id}"
app_certificate = "{certificate}"

[agent]
api_base_url = "{vendor_url}"
customer_id = "id"
customer_secret = "secret"

[tts]
api_key = "sk_test_key_1234567890"
voice_id = "voice-1"

[webhook]
url = "{webhook_url}"
timeout_secs = 1
"#
    )?;

    let config = Config::load(path.to_str().expect("utf-8 temp path"))?;
    Ok((config, dir))
}

use std::sync::Arc;
use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use crate::chatops::{agent_router, ChatOpsAgent, ErrorTracker, HealthMonitor, UnionActionClient};
use crate::chatops::message::MessageLimits;
use crate::config::{AppEnvironment, SurveyConfig};
use crate::intake::ComplaintContext;
use crate::pipeline::{backend_router, UnionActionService};
use crate::survey::StubSurveyDeployer;

/// Serves the backend on an ephemeral port and returns its base URL.
pub(super) async fn spawn_backend() -> String {
    let service = UnionActionService::new(
        Arc::new(StubSurveyDeployer::default()),
        SurveyConfig::default(),
    );
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind backend");
    let addr = listener.local_addr().expect("backend addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, backend_router(Arc::new(service))).await;
    });
    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub(super) async fn closed_backend() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    format!("http://{addr}")
}

pub(super) fn agent(base_url: String, limits: MessageLimits) -> (Router, Arc<ErrorTracker>) {
    agent_in(base_url, limits, AppEnvironment::Test)
}

pub(super) fn agent_in(
    base_url: String,
    limits: MessageLimits,
    environment: AppEnvironment,
) -> (Router, Arc<ErrorTracker>) {
    let client = Arc::new(
        UnionActionClient::new(base_url, Duration::from_secs(5), ComplaintContext::default())
            .expect("client"),
    );
    let tracker = Arc::new(ErrorTracker::new());
    let health = HealthMonitor::new(
        client.clone(),
        tracker.clone(),
        Duration::from_secs(10),
        environment,
    )
    .with_log_level("debug");
    let agent = ChatOpsAgent::new(client, tracker.clone(), health, limits);
    (agent_router(Arc::new(agent)), tracker)
}

pub(super) async fn send(
    router: Router,
    request: Request<Body>,
) -> (StatusCode, Option<String>, Value) {
    let response = router.oneshot(request).await.expect("router response");
    let status = response.status();
    let correlation = response
        .headers()
        .get("x-correlation-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let bytes = to_bytes(response.into_body(), 256 * 1024)
        .await
        .expect("body bytes");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, correlation, body)
}

pub(super) fn webhook(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub(super) fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

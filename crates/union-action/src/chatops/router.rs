use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;

use super::agent::{success_body, ChatOpsAgent};
use super::correlation::{correlation_layer, CorrelationId};

/// Agent endpoints. Every response carries the request's correlation id.
pub fn agent_router(agent: Arc<ChatOpsAgent>) -> Router {
    Router::new()
        .route("/webhook", post(webhook_handler))
        .route("/health", get(health_handler))
        .route("/health/errors", get(errors_handler))
        .route("/debug", get(debug_handler))
        .with_state(agent)
        .layer(middleware::from_fn(correlation_layer))
}

pub(crate) async fn webhook_handler(
    State(agent): State<Arc<ChatOpsAgent>>,
    Extension(correlation_id): Extension<CorrelationId>,
    body: Bytes,
) -> Response {
    let started = Instant::now();
    match agent.handle_webhook(&body).await {
        Ok(result) => {
            let payload = success_body(&result, &correlation_id, started.elapsed());
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => (err.status(), Json(err.to_body(&correlation_id))).into_response(),
    }
}

pub(crate) async fn health_handler(State(agent): State<Arc<ChatOpsAgent>>) -> Response {
    let report = agent.health().report().await;
    (StatusCode::OK, Json(report)).into_response()
}

#[derive(Debug, Deserialize)]
pub(crate) struct ErrorsQuery {
    limit: Option<usize>,
}

pub(crate) async fn errors_handler(
    State(agent): State<Arc<ChatOpsAgent>>,
    Query(query): Query<ErrorsQuery>,
) -> Response {
    let tracker = agent.tracker();
    let summary = tracker.summary();
    let payload = json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
        "error_metrics": summary.errors,
        "total_errors": summary.total_errors,
        "recent_errors": tracker.recent(query.limit.unwrap_or(50)),
        "time_since_reset_seconds": summary.time_since_reset_seconds,
    });
    (StatusCode::OK, Json(payload)).into_response()
}

pub(crate) async fn debug_handler(State(agent): State<Arc<ChatOpsAgent>>) -> Response {
    match agent.health().debug_report() {
        Some(report) => (StatusCode::OK, Json(report)).into_response(),
        None => (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "FORBIDDEN",
                "message": "Debug endpoint only available in development mode",
            })),
        )
            .into_response(),
    }
}

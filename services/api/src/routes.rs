use crate::infra::AppState;
use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::Ordering;
use union_action::chatops::format_uptime;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MetricsQuery {
    #[serde(default)]
    pub(crate) format: Option<String>,
}

/// Adds `/ready` and `/metrics` to a service router. Both read `AppState`
/// from an `Extension` layered on by the caller.
pub(crate) fn with_operational_routes(router: Router) -> Router {
    router
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(
    Extension(state): Extension<AppState>,
    Query(query): Query<MetricsQuery>,
) -> Response {
    if query.format.as_deref() == Some("json") {
        let uptime = state.started.elapsed();
        let error_metrics = state.errors.as_ref().map(|tracker| tracker.summary());
        return Json(json!({
            "uptime_seconds": uptime.as_secs(),
            "uptime": format_uptime(uptime),
            "error_metrics": error_metrics,
        }))
        .into_response();
    }

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use serde_json::Value;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Instant;
    use tower::ServiceExt;
    use union_action::chatops::{ErrorCategory, ErrorTracker};

    fn state(ready: bool, errors: Option<Arc<ErrorTracker>>) -> AppState {
        let recorder = PrometheusBuilder::new().build_recorder();
        AppState {
            readiness: Arc::new(AtomicBool::new(ready)),
            metrics: Arc::new(recorder.handle()),
            errors,
            started: Instant::now(),
        }
    }

    fn app(state: AppState) -> Router {
        with_operational_routes(Router::new()).layer(Extension(state))
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("router response");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), 64 * 1024)
            .await
            .expect("body bytes");
        (status, content_type, bytes.to_vec())
    }

    #[tokio::test]
    async fn readiness_reports_initializing_until_bound() {
        let (status, _, body) = get(app(state(false, None)), "/ready").await;
        let body: Value = serde_json::from_slice(&body).expect("json");

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "initializing");

        let (status, _, body) = get(app(state(true, None)), "/ready").await;
        let body: Value = serde_json::from_slice(&body).expect("json");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ready");
    }

    #[tokio::test]
    async fn metrics_default_to_prometheus_text() {
        let (status, content_type, _) = get(app(state(true, None)), "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("text/plain; version=0.0.4"));
    }

    #[tokio::test]
    async fn json_metrics_include_error_summary() {
        let tracker = Arc::new(ErrorTracker::new());
        tracker.track(ErrorCategory::Validation, json!({"reason": "empty body"}));
        tracker.track(ErrorCategory::Integration, Value::Null);

        let (status, _, body) =
            get(app(state(true, Some(tracker))), "/metrics?format=json").await;
        let body: Value = serde_json::from_slice(&body).expect("json");

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["error_metrics"]["total_errors"], 2);
        assert_eq!(body["error_metrics"]["errors"]["validation"], 1);
        assert!(body["uptime"].as_str().is_some());
    }

    #[tokio::test]
    async fn json_metrics_without_agent_have_no_error_summary() {
        let (_, _, body) = get(app(state(true, None)), "/metrics?format=json").await;
        let body: Value = serde_json::from_slice(&body).expect("json");

        assert!(body["error_metrics"].is_null());
        assert!(body["uptime_seconds"].is_u64());
    }
}

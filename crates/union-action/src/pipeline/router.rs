use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde_json::json;
use tracing::error;

use super::{PipelineError, TransformationRequest, UnionActionService};

/// Backend endpoints: the two workflow steps plus a liveness probe.
pub fn backend_router(service: Arc<UnionActionService>) -> Router {
    Router::new()
        .route("/escalate-to-ethics", post(escalate_handler))
        .route("/generate-koers-survey", post(generate_survey_handler))
        .route("/health", get(health_handler))
        .with_state(service)
}

pub(crate) async fn escalate_handler(
    State(service): State<Arc<UnionActionService>>,
    Json(request): Json<TransformationRequest>,
) -> Response {
    let workflow_id = request.workflow_id.clone();
    match service.escalate(request) {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => failure_response(&workflow_id, err),
    }
}

pub(crate) async fn generate_survey_handler(
    State(service): State<Arc<UnionActionService>>,
    Json(request): Json<TransformationRequest>,
) -> Response {
    let workflow_id = request.workflow_id.clone();
    match service.generate_survey(request).await {
        Ok(result) => (StatusCode::OK, Json(result)).into_response(),
        Err(err) => failure_response(&workflow_id, err),
    }
}

pub(crate) async fn health_handler() -> Response {
    let payload = json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
    });
    (StatusCode::OK, Json(payload)).into_response()
}

fn failure_response(workflow_id: &str, err: PipelineError) -> Response {
    let (status, code) = match &err {
        PipelineError::Deployment(_) => (StatusCode::BAD_GATEWAY, "DEPLOYMENT_FAILED"),
        PipelineError::Encoding(_) => {
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR")
        }
        PipelineError::Intake(_)
        | PipelineError::Analysis(_)
        | PipelineError::Selection(_)
        | PipelineError::MalformedReport(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "TRANSFORMATION_FAILED")
        }
    };
    error!(workflow_id, error_code = code, error = %err, "workflow step failed");

    let payload = json!({
        "error": code,
        "message": err.to_string(),
    });
    (status, Json(payload)).into_response()
}

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::http::StatusCode;
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info, warn};

use super::client::{ClientError, UnionActionClient};
use super::correlation::CorrelationId;
use super::diagnostics::{log_slow_operation, ErrorCategory, ErrorTracker};
use super::health::HealthMonitor;
use super::message::{
    parse_message, validation_summary, MessageError, MessageLimits, PayloadError, WebhookPayload,
    EXPECTED_FORMAT, FORMAT_EXAMPLE,
};

/// Combined outcome of both backend calls.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowResult {
    pub status: &'static str,
    pub ethical_analysis: Value,
    pub deployment_report: Value,
    pub survey_url: Option<String>,
    pub module_list: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    #[error("Invalid JSON payload: {0}")]
    InvalidJson(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error(transparent)]
    Message(#[from] MessageError),
    #[error(transparent)]
    Integration(#[from] ClientError),
}

impl WebhookError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            WebhookError::InvalidJson(_) | WebhookError::Payload(_) => ErrorCategory::Validation,
            WebhookError::Message(_) => ErrorCategory::Parsing,
            WebhookError::Integration(_) => ErrorCategory::Integration,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebhookError::Integration(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::BAD_REQUEST,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Validation => "VALIDATION_ERROR",
            ErrorCategory::Parsing => "PARSE_ERROR",
            ErrorCategory::Integration => "INTEGRATION_ERROR",
            ErrorCategory::Unknown => "UNKNOWN_ERROR",
        }
    }

    fn context(&self) -> Value {
        match self {
            WebhookError::InvalidJson(_) => json!({
                "field": "body",
                "expected_format": "JSON object",
            }),
            WebhookError::Payload(err) => json!({
                "field": err.field(),
                "expected_format": err.expected_format(),
            }),
            WebhookError::Message(_) => json!({
                "parse_stage": "format_validation",
                "expected_format": EXPECTED_FORMAT,
                "example": FORMAT_EXAMPLE,
            }),
            WebhookError::Integration(_) => json!({
                "service": "union_action_api",
            }),
        }
    }

    /// Error envelope returned to the webhook caller.
    pub fn to_body(&self, correlation_id: &CorrelationId) -> Value {
        json!({
            "status": "error",
            "detail": self.to_string(),
            "error_code": self.error_code(),
            "timestamp": Utc::now().to_rfc3339(),
            "correlation_id": correlation_id.as_str(),
            "context": self.context(),
        })
    }
}

pub fn success_body(
    result: &WorkflowResult,
    correlation_id: &CorrelationId,
    elapsed: Duration,
) -> Value {
    json!({
        "status": "received",
        "workflow_result": result,
        "timestamp": Utc::now().to_rfc3339(),
        "correlation_id": correlation_id.as_str(),
        "processing_time_ms": elapsed.as_millis() as u64,
    })
}

/// Webhook orchestration: validate, split, then escalate and generate.
pub struct ChatOpsAgent {
    client: Arc<UnionActionClient>,
    tracker: Arc<ErrorTracker>,
    health: HealthMonitor,
    limits: MessageLimits,
}

impl ChatOpsAgent {
    pub fn new(
        client: Arc<UnionActionClient>,
        tracker: Arc<ErrorTracker>,
        health: HealthMonitor,
        limits: MessageLimits,
    ) -> Self {
        Self {
            client,
            tracker,
            health,
            limits,
        }
    }

    pub fn tracker(&self) -> &ErrorTracker {
        &self.tracker
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    pub async fn handle_webhook(&self, raw: &[u8]) -> Result<WorkflowResult, WebhookError> {
        let started = Instant::now();
        let outcome = self.process(raw).await;

        match &outcome {
            Ok(result) => {
                info!(
                    survey_url = result.survey_url.as_deref().unwrap_or_default(),
                    modules = result.module_list.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "webhook processed"
                );
            }
            Err(err) => {
                self.tracker
                    .track(err.category(), json!({ "reason": err.to_string() }));
                match err {
                    WebhookError::Integration(_) => {
                        error!(error_code = err.error_code(), error = %err, "webhook failed")
                    }
                    _ => warn!(error_code = err.error_code(), error = %err, "webhook rejected"),
                }
            }
        }
        log_slow_operation("webhook_processing", started.elapsed());
        outcome
    }

    async fn process(&self, raw: &[u8]) -> Result<WorkflowResult, WebhookError> {
        let payload: WebhookPayload = serde_json::from_slice(raw)
            .map_err(|err| WebhookError::InvalidJson(err.to_string()))?;
        info!(
            from = payload.from.as_deref().unwrap_or("unknown"),
            body_chars = payload.body.as_deref().map(|body| body.chars().count()).unwrap_or(0),
            has_timestamp = payload.timestamp.is_some(),
            "webhook received"
        );

        let validated = payload.validate()?;
        debug!(summary = ?validation_summary(&validated.body, &self.limits), "message summary");
        let parsed = parse_message(&validated.body, &self.limits)?;

        let ethical_analysis = self
            .client
            .escalate_to_ethics(&validated.workflow_id, &parsed.narrative, &parsed.maxim)
            .await?;
        let deployment_report = self
            .client
            .generate_koers_survey(&validated.workflow_id, ethical_analysis.clone())
            .await?;

        let survey_url = deployment_report
            .get("survey_url")
            .and_then(Value::as_str)
            .map(str::to_string);
        let module_list = deployment_report
            .get("module_list")
            .and_then(Value::as_array)
            .map(|modules| {
                modules
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Ok(WorkflowResult {
            status: "success",
            ethical_analysis,
            deployment_report,
            survey_url,
            module_list,
        })
    }
}

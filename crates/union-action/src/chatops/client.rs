use std::time::{Duration, Instant};

use reqwest::Client;
use serde_json::Value;
use tracing::{error, info};

use crate::intake::ComplaintContext;
use crate::pipeline::{TransformationRequest, TransformationResult};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("union action request failed: {0}")]
    Transport(String),
    #[error("union action request timed out after {0} seconds")]
    Timeout(u64),
    #[error("union action returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid union action response: {0}")]
    InvalidResponse(String),
}

/// HTTP client for the backend's workflow endpoints.
#[derive(Debug, Clone)]
pub struct UnionActionClient {
    client: Client,
    base_url: String,
    timeout: Duration,
    context: ComplaintContext,
}

impl UnionActionClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        context: ComplaintContext,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("union-action-agent/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|err| ClientError::Transport(err.to_string()))?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        info!(%base_url, timeout_secs = timeout.as_secs(), "union action client ready");
        Ok(Self {
            client,
            base_url,
            timeout,
            context,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn transport_error(&self, err: reqwest::Error) -> ClientError {
        if err.is_timeout() {
            ClientError::Timeout(self.timeout.as_secs())
        } else {
            ClientError::Transport(err.to_string())
        }
    }

    async fn transform(
        &self,
        path: &str,
        request: &TransformationRequest,
    ) -> Result<Value, ClientError> {
        let started = Instant::now();
        let response = self
            .client
            .post(self.url(path))
            .json(request)
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(
                path,
                workflow_id = %request.workflow_id,
                status = status.as_u16(),
                %body,
                "union action call failed"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        if body.get("transformed_data").is_none() {
            return Err(ClientError::InvalidResponse(
                "missing 'transformed_data'".to_string(),
            ));
        }
        let result: TransformationResult = serde_json::from_value(body)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;

        info!(
            path,
            workflow_id = %request.workflow_id,
            schema = %result.schema_version,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "union action call complete"
        );
        Ok(result.transformed_data)
    }

    /// Wraps the chat message in a complaint document and requests the
    /// ethical analysis.
    pub async fn escalate_to_ethics(
        &self,
        workflow_id: &str,
        narrative: &str,
        maxim: &str,
    ) -> Result<Value, ClientError> {
        let document = self.context.build_document(narrative, maxim);
        let source_data = serde_json::to_value(&document)
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))?;
        let request = TransformationRequest {
            workflow_id: workflow_id.to_string(),
            source_data,
            schema_version: None,
        };
        self.transform("/escalate-to-ethics", &request).await
    }

    pub async fn generate_koers_survey(
        &self,
        workflow_id: &str,
        ethical_report: Value,
    ) -> Result<Value, ClientError> {
        let request = TransformationRequest {
            workflow_id: workflow_id.to_string(),
            source_data: ethical_report,
            schema_version: None,
        };
        self.transform("/generate-koers-survey", &request).await
    }

    pub async fn health_check(&self) -> Result<Value, ClientError> {
        let response = self
            .client
            .get(self.url("/health"))
            .send()
            .await
            .map_err(|err| self.transport_error(err))?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            });
        }
        response
            .json()
            .await
            .map_err(|err| ClientError::InvalidResponse(err.to_string()))
    }
}

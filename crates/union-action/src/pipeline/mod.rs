//! The two-step backend workflow: complaint to ethical analysis, then
//! analysis to a deployed survey.

pub mod router;

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use crate::config::SurveyConfig;
use crate::ethics::{
    AnalysisError, KantianEthicalAnalyzer, ModuleSelectionError, VerdictSet,
    ViolationToModuleMapper,
};
use crate::intake::{ComplaintDocument, IntakeError};
use crate::survey::{DeploymentError, DeploymentRequest, DeploymentResult, SurveyDeployer};

pub use router::backend_router;

pub const ANALYSIS_SCHEMA: &str = "EthicalAnalysisReport_v1";
pub const DEPLOYMENT_SCHEMA: &str = "DeploymentReport_v1";

/// Envelope accepted by both workflow endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationRequest {
    pub workflow_id: String,
    pub source_data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema_version: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationResult {
    pub workflow_id: String,
    pub transformed_data: Value,
    pub schema_version: String,
    pub transformation_time_ms: u64,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Intake(#[from] IntakeError),
    #[error(transparent)]
    Analysis(#[from] AnalysisError),
    #[error(transparent)]
    Selection(#[from] ModuleSelectionError),
    #[error("ethical analysis is malformed: {0}")]
    MalformedReport(String),
    #[error(transparent)]
    Deployment(#[from] DeploymentError),
    #[error("failed to encode result: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Stateless backend service. Shared across handlers behind an `Arc`.
pub struct UnionActionService {
    analyzer: KantianEthicalAnalyzer,
    mapper: ViolationToModuleMapper,
    deployer: Arc<dyn SurveyDeployer>,
    survey: SurveyConfig,
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}

impl UnionActionService {
    pub fn new(deployer: Arc<dyn SurveyDeployer>, survey: SurveyConfig) -> Self {
        Self {
            analyzer: KantianEthicalAnalyzer::new(),
            mapper: ViolationToModuleMapper::new(),
            deployer,
            survey,
        }
    }

    /// Step one: complaint document in, ethical analysis report out.
    pub fn escalate(
        &self,
        request: TransformationRequest,
    ) -> Result<TransformationResult, PipelineError> {
        let started = Instant::now();
        info!(workflow_id = %request.workflow_id, "escalation received");

        let input = ComplaintDocument::from_value(request.source_data)?.into_analysis_input()?;
        let report = self.analyzer.analyze(input)?;
        let transformed_data = serde_json::to_value(&report)?;

        let transformation_time_ms = elapsed_ms(started);
        info!(
            workflow_id = %request.workflow_id,
            violations = report.violations().len(),
            transformation_time_ms,
            "escalation complete"
        );

        Ok(TransformationResult {
            workflow_id: request.workflow_id,
            transformed_data,
            schema_version: ANALYSIS_SCHEMA.to_string(),
            transformation_time_ms,
        })
    }

    /// Step two: ethical analysis in, deployed survey out.
    pub async fn generate_survey(
        &self,
        request: TransformationRequest,
    ) -> Result<TransformationResult, PipelineError> {
        let started = Instant::now();
        info!(workflow_id = %request.workflow_id, "survey generation received");

        let verdicts: VerdictSet = serde_json::from_value(request.source_data)
            .map_err(|err| PipelineError::MalformedReport(err.to_string()))?;
        let modules = self.mapper.map(&verdicts)?;
        let deployment = DeploymentRequest {
            modules: &modules,
            scale_type: &self.survey.scale_type,
            mode: &self.survey.deployment_mode,
            credential: self.survey.api_token.as_ref(),
        };
        let result = self.deploy(&deployment).await?;
        result.validate()?;

        let transformation_time_ms = elapsed_ms(started);
        info!(
            workflow_id = %request.workflow_id,
            survey_url = %result.survey_url,
            item_count = result.item_count,
            transformation_time_ms,
            "survey generation complete"
        );

        Ok(TransformationResult {
            workflow_id: request.workflow_id,
            transformed_data: serde_json::to_value(&result)?,
            schema_version: DEPLOYMENT_SCHEMA.to_string(),
            transformation_time_ms,
        })
    }

    async fn deploy(
        &self,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult, DeploymentError> {
        let timeout = self.survey.deploy_timeout;
        match tokio::time::timeout(timeout, self.deployer.deploy(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(timeout_secs = timeout.as_secs(), "survey deployment timed out");
                Err(DeploymentError::Timeout(timeout.as_secs()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;
    use serde_json::json;

    use super::*;
    use crate::survey::StubSurveyDeployer;

    struct SlowDeployer;

    #[async_trait]
    impl SurveyDeployer for SlowDeployer {
        async fn deploy(
            &self,
            _request: &DeploymentRequest<'_>,
        ) -> Result<DeploymentResult, DeploymentError> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Err(DeploymentError::Transport("unreachable".to_string()))
        }
    }

    struct MiscountingDeployer;

    #[async_trait]
    impl SurveyDeployer for MiscountingDeployer {
        async fn deploy(
            &self,
            request: &DeploymentRequest<'_>,
        ) -> Result<DeploymentResult, DeploymentError> {
            Ok(DeploymentResult {
                survey_id: "broken".to_string(),
                survey_url: "https://typeform.com/to/broken".to_string(),
                item_count: 3,
                module_list: request.modules.names(),
                validation_status: "passed".to_string(),
            })
        }
    }

    fn service(deployer: Arc<dyn SurveyDeployer>) -> UnionActionService {
        UnionActionService::new(
            deployer,
            SurveyConfig {
                deploy_timeout: Duration::from_millis(50),
                ..SurveyConfig::default()
            },
        )
    }

    fn complaint() -> Value {
        json!({
            "narrative": "I was denied training despite requests",
            "pentadic_context": {
                "scene": {
                    "phenomenal": "Cost reduction pressures",
                    "noumenal": "Professional development duty"
                },
                "agent": {"role": "Healthcare Assistant"}
            },
            "maxim_extraction": "Training can be denied when convenient"
        })
    }

    fn request(source_data: Value) -> TransformationRequest {
        TransformationRequest {
            workflow_id: "wf-1".to_string(),
            source_data,
            schema_version: None,
        }
    }

    #[test]
    fn escalation_returns_analysis_report() {
        let service = service(Arc::new(StubSurveyDeployer::default()));

        let result = service.escalate(request(complaint())).expect("escalate");

        assert_eq!(result.workflow_id, "wf-1");
        assert_eq!(result.schema_version, ANALYSIS_SCHEMA);
        assert_eq!(
            result.transformed_data["humanity_formula_test"]["verdict"],
            "VIOLATION"
        );
        assert_eq!(
            result.transformed_data["case_input"]["actor_role"],
            "Healthcare Assistant"
        );
    }

    #[test]
    fn escalation_rejects_incomplete_complaint() {
        let service = service(Arc::new(StubSurveyDeployer::default()));

        let error = service
            .escalate(request(json!({"narrative": "only a narrative"})))
            .expect_err("incomplete");

        assert!(matches!(
            error,
            PipelineError::Intake(IntakeError::MissingField("maxim_extraction"))
        ));
    }

    #[tokio::test]
    async fn both_steps_chain_into_a_survey() {
        let service = service(Arc::new(StubSurveyDeployer::default()));
        let analysis = service.escalate(request(complaint())).expect("escalate");

        let result = service
            .generate_survey(request(analysis.transformed_data))
            .await
            .expect("survey");

        assert_eq!(result.schema_version, DEPLOYMENT_SCHEMA);
        assert_eq!(result.transformed_data["module_list"][0], "core");
        assert_eq!(result.transformed_data["item_count"], 27);
    }

    #[tokio::test]
    async fn empty_report_is_missing_categories() {
        let service = service(Arc::new(StubSurveyDeployer::default()));

        let error = service
            .generate_survey(request(json!({"summary": "nothing"})))
            .await
            .expect_err("no categories");

        assert!(matches!(
            error,
            PipelineError::Selection(ModuleSelectionError::MissingCategory)
        ));
    }

    #[tokio::test]
    async fn categories_without_a_usable_verdict_are_non_adverse() {
        let service = service(Arc::new(StubSurveyDeployer::default()));

        for autonomy in [json!({"rationale": "n/a"}), json!({"verdict": "CONFLICT"})] {
            let result = service
                .generate_survey(request(json!({
                    "humanity_formula_test": {"verdict": "VIOLATION"},
                    "autonomy_test": autonomy
                })))
                .await
                .expect("survey");

            assert_eq!(
                result.transformed_data["module_list"],
                json!(["core", "dignity_instrumentalization"])
            );
            assert_eq!(result.transformed_data["item_count"], 12);
        }
    }

    #[test]
    fn escalation_rejects_empty_pentadic_context() {
        let service = service(Arc::new(StubSurveyDeployer::default()));

        let error = service
            .escalate(request(json!({
                "narrative": "I was denied training",
                "pentadic_context": {},
                "maxim_extraction": "Training can be denied"
            })))
            .expect_err("empty context");

        assert!(matches!(
            error,
            PipelineError::Intake(IntakeError::MissingField("pentadic_context.scene"))
        ));
    }

    #[tokio::test]
    async fn slow_deployer_times_out() {
        let service = service(Arc::new(SlowDeployer));

        let error = service
            .generate_survey(request(json!({
                "autonomy_test": {"verdict": "VIOLATION", "rationale": ""}
            })))
            .await
            .expect_err("timeout");

        assert!(matches!(
            error,
            PipelineError::Deployment(DeploymentError::Timeout(_))
        ));
    }

    #[tokio::test]
    async fn invalid_deployment_result_is_rejected() {
        let service = service(Arc::new(MiscountingDeployer));

        let error = service
            .generate_survey(request(json!({
                "autonomy_test": {"verdict": "PASS", "rationale": ""}
            })))
            .await
            .expect_err("invalid");

        assert!(matches!(
            error,
            PipelineError::Deployment(DeploymentError::InvalidResult(_))
        ));
    }
}

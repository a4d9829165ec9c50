use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::warn;

use super::deployer::{DeploymentError, DeploymentRequest, DeploymentResult, SurveyDeployer};
use crate::ethics::{ModuleSelection, SurveyModule};

/// Returns deterministic mock surveys derived from the module list. Used when
/// no forms credential is configured.
#[derive(Debug, Clone)]
pub struct StubSurveyDeployer {
    share_host: String,
}

impl StubSurveyDeployer {
    pub fn new(share_host: impl Into<String>) -> Self {
        Self {
            share_host: share_host.into(),
        }
    }

    fn digest(modules: &ModuleSelection) -> u64 {
        let mut names = modules.names();
        names.sort();
        let hash = Sha256::digest(names.join(",").as_bytes());
        let mut prefix = [0u8; 8];
        prefix.copy_from_slice(&hash[..8]);
        u64::from_be_bytes(prefix) % 1_000_000
    }
}

impl Default for StubSurveyDeployer {
    fn default() -> Self {
        Self::new("typeform.com")
    }
}

#[async_trait]
impl SurveyDeployer for StubSurveyDeployer {
    async fn deploy(
        &self,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult, DeploymentError> {
        warn!(
            modules = ?request.modules.names(),
            mode = request.mode,
            "stub survey deployer in use; no survey is published"
        );

        let digest = Self::digest(request.modules);
        let label = request
            .modules
            .modules()
            .iter()
            .find(|module| **module != SurveyModule::Core)
            .map(|module| module.as_str().to_uppercase())
            .unwrap_or_else(|| "CORE".to_string());

        Ok(DeploymentResult {
            survey_id: format!("mock_tf_{digest}"),
            survey_url: format!("https://{}/to/MOCK_{label}_{digest}", self.share_host),
            item_count: request.modules.item_count(),
            module_list: request.modules.names(),
            validation_status: "passed".to_string(),
        })
    }
}

use async_trait::async_trait;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

use crate::ethics::{ModuleSelection, SurveyModule, CORE_ITEM_COUNT, MODULE_ITEM_COUNT};

/// Everything a deployer needs to publish one survey.
#[derive(Debug, Clone, Copy)]
pub struct DeploymentRequest<'a> {
    pub modules: &'a ModuleSelection,
    pub scale_type: &'a str,
    pub mode: &'a str,
    pub credential: Option<&'a SecretString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeploymentResult {
    pub survey_id: String,
    pub survey_url: String,
    pub item_count: usize,
    pub module_list: Vec<String>,
    pub validation_status: String,
}

impl DeploymentResult {
    /// Checks the item-count contract: known module names, core present, at
    /// least seven items and five more for every non-core module.
    pub fn validate(&self) -> Result<(), DeploymentError> {
        if let Some(unknown) = self
            .module_list
            .iter()
            .find(|module| SurveyModule::parse(module).is_none())
        {
            return Err(DeploymentError::InvalidResult(format!(
                "module_list contains unknown module '{unknown}'"
            )));
        }
        if !self.module_list.iter().any(|module| module == "core") {
            return Err(DeploymentError::InvalidResult(
                "module_list must contain 'core'".to_string(),
            ));
        }
        if self.item_count < CORE_ITEM_COUNT {
            return Err(DeploymentError::InvalidResult(format!(
                "item_count must be at least {CORE_ITEM_COUNT}, got {}",
                self.item_count
            )));
        }
        let expected = CORE_ITEM_COUNT + MODULE_ITEM_COUNT * (self.module_list.len() - 1);
        if self.item_count != expected {
            return Err(DeploymentError::InvalidResult(format!(
                "item_count {} does not match {} modules (expected {expected})",
                self.item_count,
                self.module_list.len()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeploymentError {
    #[error("forms API credential is required for live deployment")]
    MissingCredential,
    #[error("forms API request failed: {0}")]
    Transport(String),
    #[error("survey deployment timed out after {0} seconds")]
    Timeout(u64),
    #[error("forms API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("forms API response malformed: {0}")]
    MalformedResponse(String),
    #[error("deployment result failed validation: {0}")]
    InvalidResult(String),
}

#[async_trait]
pub trait SurveyDeployer: Send + Sync {
    async fn deploy(
        &self,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult, DeploymentError>;
}

//! Survey deployment behind an injectable interface: a deterministic stub for
//! local runs and a live forms-API client.

pub mod deployer;
pub mod stub;
pub mod typeform;

use std::sync::Arc;

use crate::config::SurveyConfig;

pub use deployer::{DeploymentError, DeploymentRequest, DeploymentResult, SurveyDeployer};
pub use stub::StubSurveyDeployer;
pub use typeform::TypeformDeployer;

/// Live deployer when a forms credential is configured, otherwise the stub.
pub fn deployer_from_config(
    config: &SurveyConfig,
) -> Result<Arc<dyn SurveyDeployer>, DeploymentError> {
    match config.api_token {
        Some(_) => Ok(Arc::new(TypeformDeployer::new(config)?)),
        None => Ok(Arc::new(StubSurveyDeployer::new(config.share_host.clone()))),
    }
}

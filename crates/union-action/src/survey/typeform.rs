use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use super::deployer::{DeploymentError, DeploymentRequest, DeploymentResult, SurveyDeployer};
use crate::config::SurveyConfig;
use crate::ethics::{ModuleSelection, SurveyModule};

/// Creates a real form through the Typeform `POST /forms` endpoint.
pub struct TypeformDeployer {
    client: Client,
    api_base: String,
    share_host: String,
    credential: Option<SecretString>,
    timeout: Duration,
}

#[derive(Debug, Serialize)]
struct CreateForm {
    title: String,
    fields: Vec<FormField>,
    settings: FormSettings,
}

#[derive(Debug, Serialize)]
struct FormSettings {
    is_public: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct FormField {
    #[serde(rename = "type")]
    kind: &'static str,
    pub(crate) title: String,
    properties: FieldProperties,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct FieldProperties {
    choices: Vec<Choice>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct Choice {
    label: String,
}

#[derive(Debug, Deserialize)]
struct CreatedForm {
    #[serde(default)]
    id: Option<String>,
}

/// Scale strings look like `"0-4"`; anything unparsable or inverted falls
/// back to 0..=4.
pub(crate) fn scale_choices(scale_type: &str) -> Vec<String> {
    let bounds = scale_type.split_once('-').and_then(|(lower, upper)| {
        let lower = lower.trim().parse::<i32>().ok()?;
        let upper = upper.trim().parse::<i32>().ok()?;
        (lower <= upper).then_some((lower, upper))
    });
    let (lower, upper) = bounds.unwrap_or((0, 4));
    (lower..=upper).map(|value| value.to_string()).collect()
}

pub(crate) fn form_fields(modules: &ModuleSelection, scale_type: &str) -> Vec<FormField> {
    let choices: Vec<Choice> = scale_choices(scale_type)
        .into_iter()
        .map(|label| Choice { label })
        .collect();
    let field = |title: String| FormField {
        kind: "multiple_choice",
        title,
        properties: FieldProperties {
            choices: choices.clone(),
        },
    };

    let mut fields = Vec::with_capacity(modules.item_count());
    for module in modules.modules() {
        for index in 1..=module.item_count() {
            let title = match module {
                SurveyModule::Core => {
                    format!("Core Q{index}: Please rate this core item ({scale_type})")
                }
                other => format!(
                    "{} Q{index}: Please rate this item ({scale_type})",
                    other.display_name()
                ),
            };
            fields.push(field(title));
        }
    }
    fields
}

impl TypeformDeployer {
    pub fn new(config: &SurveyConfig) -> Result<Self, DeploymentError> {
        let client = Client::builder()
            .timeout(config.deploy_timeout)
            .build()
            .map_err(|err| DeploymentError::Transport(err.to_string()))?;

        Ok(Self {
            client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            share_host: config.share_host.clone(),
            credential: config.api_token.clone(),
            timeout: config.deploy_timeout,
        })
    }

    fn forms_url(&self) -> String {
        format!("{}/forms", self.api_base)
    }
}

#[async_trait]
impl SurveyDeployer for TypeformDeployer {
    async fn deploy(
        &self,
        request: &DeploymentRequest<'_>,
    ) -> Result<DeploymentResult, DeploymentError> {
        let token = request
            .credential
            .or(self.credential.as_ref())
            .map(|secret| secret.expose_secret().trim())
            .filter(|token| !token.is_empty())
            .ok_or(DeploymentError::MissingCredential)?;

        let fields = form_fields(request.modules, request.scale_type);
        let item_count = fields.len();
        let payload = CreateForm {
            title: format!("KOERS Survey ({})", request.mode),
            fields,
            settings: FormSettings { is_public: true },
        };

        info!(
            modules = request.modules.len(),
            item_count,
            mode = request.mode,
            "creating survey form"
        );

        let response = self
            .client
            .post(self.forms_url())
            .bearer_auth(token)
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    DeploymentError::Timeout(self.timeout.as_secs())
                } else {
                    DeploymentError::Transport(err.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = status.as_u16(), %body, "survey form creation failed");
            return Err(DeploymentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let created: CreatedForm = response
            .json()
            .await
            .map_err(|err| DeploymentError::MalformedResponse(err.to_string()))?;
        let form_id = created
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| DeploymentError::MalformedResponse("missing form id".to_string()))?;

        let survey_url = format!("https://{}/to/{form_id}", self.share_host);
        info!(survey_id = %form_id, %survey_url, item_count, "survey form created");

        Ok(DeploymentResult {
            survey_id: form_id,
            survey_url,
            item_count,
            module_list: request.modules.names(),
            validation_status: "passed".to_string(),
        })
    }
}

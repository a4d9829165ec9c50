//! Complaint documents produced upstream (narrative, pentadic context and
//! extracted maxim) and their mapping onto an [`AnalysisInput`].

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::ethics::domain::default_actor_role;
use crate::ethics::AnalysisInput;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Scene {
    #[serde(default)]
    pub phenomenal: String,
    #[serde(default)]
    pub noumenal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Agent {
    #[serde(default = "default_actor_role")]
    pub role: String,
}

impl Default for Agent {
    fn default() -> Self {
        Self {
            role: default_actor_role(),
        }
    }
}

/// `scene` and `agent` must both be present; their inner fields may be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PentadicContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<Scene>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<Agent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RhetoricalContext {
    #[serde(default)]
    pub experience: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplaintDocument {
    #[serde(default)]
    pub narrative: Option<String>,
    #[serde(default)]
    pub pentadic_context: Option<PentadicContext>,
    #[serde(default)]
    pub maxim_extraction: Option<String>,
    #[serde(default)]
    pub rhetorical_context: RhetoricalContext,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub complaint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IntakeError {
    #[error("complaint document missing required field: {0}")]
    MissingField(&'static str),
    #[error("complaint document is malformed: {0}")]
    Malformed(String),
}

fn required(value: Option<String>, field: &'static str) -> Result<String, IntakeError> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or(IntakeError::MissingField(field))
}

impl ComplaintDocument {
    pub fn from_value(value: Value) -> Result<Self, IntakeError> {
        serde_json::from_value(value).map_err(|err| IntakeError::Malformed(err.to_string()))
    }

    /// Narrative becomes the action, the maxim the tested policy and the
    /// scene supplies pressures and duties.
    pub fn into_analysis_input(self) -> Result<AnalysisInput, IntakeError> {
        let narrative = required(self.narrative, "narrative")?;
        let maxim = required(self.maxim_extraction, "maxim_extraction")?;
        let context = self
            .pentadic_context
            .ok_or(IntakeError::MissingField("pentadic_context"))?;
        let scene = context
            .scene
            .ok_or(IntakeError::MissingField("pentadic_context.scene"))?;
        let agent = context
            .agent
            .ok_or(IntakeError::MissingField("pentadic_context.agent"))?;

        info!(role = %agent.role, "complaint mapped to analysis input");

        Ok(AnalysisInput::new(maxim, narrative)
            .with_pressures(scene.phenomenal)
            .with_duties(scene.noumenal)
            .with_role(agent.role))
    }
}

/// Context strings attached to complaints that arrive without one, such as
/// chat messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComplaintContext {
    pub pressures: String,
    pub duties: String,
    pub actor_role: String,
    pub experience: String,
}

impl Default for ComplaintContext {
    fn default() -> Self {
        Self {
            pressures: "Healthcare workplace constraints".to_string(),
            duties: "Professional duty to patient care".to_string(),
            actor_role: "Healthcare staff".to_string(),
            experience: "Employee experience with the situation".to_string(),
        }
    }
}

impl ComplaintContext {
    pub fn build_document(&self, narrative: &str, maxim: &str) -> ComplaintDocument {
        let now = Utc::now();
        ComplaintDocument {
            narrative: Some(narrative.to_string()),
            pentadic_context: Some(PentadicContext {
                scene: Some(Scene {
                    phenomenal: self.pressures.clone(),
                    noumenal: self.duties.clone(),
                }),
                agent: Some(Agent {
                    role: self.actor_role.clone(),
                }),
                agency: Some("Professional duties".to_string()),
                purpose: Some("Patient care".to_string()),
            }),
            maxim_extraction: Some(maxim.to_string()),
            rhetorical_context: RhetoricalContext {
                experience: self.experience.clone(),
            },
            complaint_id: Some(format!("whatsapp_{}", now.timestamp())),
            timestamp: Some(now.to_rfc3339()),
            source: Some("whatsapp_chatops".to_string()),
        }
    }
}

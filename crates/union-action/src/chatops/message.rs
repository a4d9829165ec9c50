use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const MESSAGE_DELIMITER: char = '|';
pub const FALLBACK_WORKFLOW_ID: &str = "unknown_user";
pub const EXPECTED_FORMAT: &str = "narrative|maxim";
pub const FORMAT_EXAMPLE: &str = "I observed X happening|Act according to principle Y";

/// Character limits applied to both halves of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLimits {
    pub max_narrative_chars: usize,
    pub max_maxim_chars: usize,
}

impl Default for MessageLimits {
    fn default() -> Self {
        Self {
            max_narrative_chars: 2000,
            max_maxim_chars: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedMessage {
    pub narrative: String,
    pub maxim: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MessageError {
    #[error("Invalid message format. Use 'narrative|maxim'")]
    MissingDelimiter,
    #[error("{field} too long ({actual} characters, maximum {max})")]
    TooLong {
        field: &'static str,
        actual: usize,
        max: usize,
    },
}

fn check_length(field: &'static str, value: &str, max: usize) -> Result<(), MessageError> {
    let actual = value.chars().count();
    if actual > max {
        warn!(field, actual, max, "message part exceeds length limit");
        return Err(MessageError::TooLong { field, actual, max });
    }
    Ok(())
}

/// Splits on the first `|` only; anything after it, further delimiters
/// included, belongs to the maxim. Empty halves are accepted here.
pub fn parse_message(message: &str, limits: &MessageLimits) -> Result<ParsedMessage, MessageError> {
    let (narrative, maxim) = message
        .split_once(MESSAGE_DELIMITER)
        .ok_or(MessageError::MissingDelimiter)?;
    let narrative = narrative.trim();
    let maxim = maxim.trim();

    check_length("Narrative", narrative, limits.max_narrative_chars)?;
    check_length("Maxim", maxim, limits.max_maxim_chars)?;

    debug!(
        narrative_chars = narrative.chars().count(),
        maxim_chars = maxim.chars().count(),
        "message parsed"
    );
    Ok(ParsedMessage {
        narrative: narrative.to_string(),
        maxim: maxim.to_string(),
    })
}

/// Inbound WAHA webhook body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub timestamp: Option<serde_json::Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PayloadError {
    #[error("Missing required field: body")]
    MissingBody,
    #[error("Message body cannot be empty")]
    EmptyBody,
    #[error("Workflow ID cannot be empty")]
    EmptyWorkflowId,
}

impl PayloadError {
    /// Payload field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            PayloadError::MissingBody | PayloadError::EmptyBody => "body",
            PayloadError::EmptyWorkflowId => "from",
        }
    }

    pub fn expected_format(&self) -> &'static str {
        match self {
            PayloadError::MissingBody | PayloadError::EmptyBody => "non-empty string",
            PayloadError::EmptyWorkflowId => "non-empty phone number",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedPayload {
    pub workflow_id: String,
    pub body: String,
}

impl WebhookPayload {
    pub fn validate(&self) -> Result<ValidatedPayload, PayloadError> {
        let body = self.body.as_deref().ok_or(PayloadError::MissingBody)?;
        if body.is_empty() {
            return Err(PayloadError::EmptyBody);
        }

        let workflow_id = match self.from.as_deref() {
            None => {
                info!("webhook payload has no sender; using fallback workflow id");
                FALLBACK_WORKFLOW_ID
            }
            Some(from) if from.trim().is_empty() => return Err(PayloadError::EmptyWorkflowId),
            Some(from) => from,
        };

        Ok(ValidatedPayload {
            workflow_id: workflow_id.to_string(),
            body: body.to_string(),
        })
    }
}

/// Non-failing description of a message, logged before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationSummary {
    pub message_chars: usize,
    pub has_delimiter: bool,
    pub is_blank: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrative_chars: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maxim_chars: Option<usize>,
    pub exceeds_limit: bool,
}

pub fn validation_summary(message: &str, limits: &MessageLimits) -> ValidationSummary {
    let split = message
        .split_once(MESSAGE_DELIMITER)
        .map(|(narrative, maxim)| (narrative.trim().chars().count(), maxim.trim().chars().count()));
    let exceeds_limit = split.is_some_and(|(narrative, maxim)| {
        narrative > limits.max_narrative_chars || maxim > limits.max_maxim_chars
    });

    ValidationSummary {
        message_chars: message.chars().count(),
        has_delimiter: split.is_some(),
        is_blank: message.trim().is_empty(),
        narrative_chars: split.map(|(narrative, _)| narrative),
        maxim_chars: split.map(|(_, maxim)| maxim),
        exceeds_limit,
    }
}

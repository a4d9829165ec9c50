//! WhatsApp chat-ops agent: receives webhook messages and drives the backend
//! workflow over HTTP.

pub mod agent;
pub mod client;
pub mod correlation;
pub mod diagnostics;
pub mod health;
pub mod message;
pub mod router;


pub use agent::{ChatOpsAgent, WebhookError, WorkflowResult};
pub use client::{ClientError, UnionActionClient};
pub use correlation::{correlation_layer, CorrelationId, CORRELATION_HEADER};
pub use diagnostics::{log_slow_operation, ErrorCategory, ErrorSummary, ErrorTracker};
pub use health::{
    aggregate_status, format_uptime, CheckStatus, HealthCache, HealthMonitor, DEBUG_RECENT_ERRORS,
};
pub use message::{parse_message, MessageError, MessageLimits, PayloadError, WebhookPayload};
pub use router::agent_router;

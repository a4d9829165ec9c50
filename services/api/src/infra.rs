use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use union_action::chatops::{ChatOpsAgent, ErrorTracker, HealthMonitor, UnionActionClient};
use union_action::config::AppConfig;
use union_action::error::AppError;
use union_action::pipeline::UnionActionService;
use union_action::survey::deployer_from_config;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    /// Present only where the chat-ops agent is hosted.
    pub(crate) errors: Option<Arc<ErrorTracker>>,
    pub(crate) started: Instant,
}

pub(crate) fn build_backend(config: &AppConfig) -> Result<Arc<UnionActionService>, AppError> {
    let deployer = deployer_from_config(&config.survey)?;
    Ok(Arc::new(UnionActionService::new(
        deployer,
        config.survey.clone(),
    )))
}

/// Wires the agent's client, error tracker and health monitor. The tracker is
/// returned alongside so `/metrics?format=json` can report on it.
pub(crate) fn build_agent(
    config: &AppConfig,
) -> Result<(Arc<ChatOpsAgent>, Arc<ErrorTracker>), AppError> {
    let bridge = &config.bridge;
    let client = Arc::new(UnionActionClient::new(
        bridge.union_action_url.clone(),
        bridge.request_timeout,
        bridge.complaint_context.clone(),
    )?);
    let tracker = Arc::new(ErrorTracker::new());
    let health = HealthMonitor::new(
        client.clone(),
        tracker.clone(),
        bridge.health_cache_ttl,
        config.environment,
    )
    .with_log_level(config.telemetry.log_level.clone());
    let agent = ChatOpsAgent::new(client, tracker.clone(), health, bridge.limits);
    Ok((Arc::new(agent), tracker))
}

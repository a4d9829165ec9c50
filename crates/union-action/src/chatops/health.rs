use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use sysinfo::System;
use tracing::{debug, info};

use super::client::{ClientError, UnionActionClient};
use super::diagnostics::ErrorTracker;
use crate::config::AppEnvironment;

pub const RECENT_ERROR_WINDOW: Duration = Duration::from_secs(300);
pub const RECENT_ERROR_LIMIT: usize = 10;
pub const MEMORY_WARNING_PERCENT: f64 = 80.0;
pub const DEBUG_RECENT_ERRORS: usize = 20;
const HEALTH_CACHE_KEY: &str = "health_check";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
    Timeout,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Ok,
    Degraded,
    Down,
    Unknown,
}

/// Result of one dependency or resource check.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckResult {
    pub status: CheckStatus,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl CheckResult {
    fn new(status: CheckStatus, details: Value) -> Self {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self { status, details }
    }
}

/// No checks is unknown, all clean is ok, all errored is down, and any
/// other failure mix is degraded.
pub fn aggregate_status(checks: &[CheckStatus]) -> OverallStatus {
    if checks.is_empty() {
        return OverallStatus::Unknown;
    }
    let errors = checks.iter().filter(|s| **s == CheckStatus::Error).count();
    let timeouts = checks.iter().filter(|s| **s == CheckStatus::Timeout).count();

    if errors == 0 && timeouts == 0 {
        OverallStatus::Ok
    } else if errors == checks.len() {
        OverallStatus::Down
    } else {
        OverallStatus::Degraded
    }
}

pub fn format_uptime(uptime: Duration) -> String {
    let total = uptime.as_secs();
    let (hours, minutes, seconds) = (total / 3600, (total % 3600) / 60, total % 60);

    let mut parts = Vec::new();
    if hours > 0 {
        parts.push(format!("{hours}h"));
    }
    if minutes > 0 {
        parts.push(format!("{minutes}m"));
    }
    if seconds > 0 || parts.is_empty() {
        parts.push(format!("{seconds}s"));
    }
    parts.join(" ")
}

/// Process memory plus a warning when system memory use crosses the
/// threshold.
pub fn check_memory(threshold_percent: f64) -> CheckResult {
    let (usage_mb, system_percent) = memory_snapshot();

    let status = match system_percent {
        Some(percent) if percent > threshold_percent => CheckStatus::Warning,
        _ => CheckStatus::Ok,
    };
    CheckResult::new(
        status,
        json!({
            "usage_mb": (usage_mb * 100.0).round() / 100.0,
            "system_percent": system_percent.map(|percent| (percent * 10.0).round() / 10.0),
            "threshold_percent": threshold_percent,
        }),
    )
}

/// Resident memory of this process in MB, and system-wide memory use in
/// percent when the total is known.
fn memory_snapshot() -> (f64, Option<f64>) {
    let mut system = System::new();
    system.refresh_memory();
    let pid = sysinfo::Pid::from_u32(std::process::id());
    system.refresh_process(pid);

    let usage_mb = system
        .process(pid)
        .map(|process| process.memory() as f64 / (1024.0 * 1024.0))
        .unwrap_or(0.0);
    let total = system.total_memory();
    let system_percent = (total > 0).then(|| system.used_memory() as f64 * 100.0 / total as f64);
    (usage_mb, system_percent)
}

pub async fn check_backend(client: &UnionActionClient) -> CheckResult {
    let url = format!("{}/health", client.base_url());
    let started = Instant::now();
    match client.health_check().await {
        Ok(body) => {
            let reported = body
                .get("status")
                .and_then(Value::as_str)
                .unwrap_or("unknown")
                .to_string();
            let status = match reported.as_str() {
                "healthy" | "ok" => CheckStatus::Ok,
                _ => CheckStatus::Unknown,
            };
            CheckResult::new(
                status,
                json!({
                    "url": url,
                    "reported_status": reported,
                    "response_time_ms": started.elapsed().as_millis() as u64,
                }),
            )
        }
        Err(ClientError::Timeout(_)) => CheckResult::new(
            CheckStatus::Timeout,
            json!({"url": url, "error": "Union Action API health check timed out"}),
        ),
        Err(err) => CheckResult::new(
            CheckStatus::Error,
            json!({"url": url, "error": err.to_string()}),
        ),
    }
}

/// Mutex-guarded map whose entries expire after a fixed TTL.
#[derive(Debug)]
pub struct HealthCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl HealthCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, (Instant, Value)>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries();
        match entries.get(key) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub fn set(&self, key: impl Into<String>, value: Value) {
        self.entries().insert(key.into(), (Instant::now(), value));
    }

    pub fn clear(&self) {
        self.entries().clear();
    }
}

impl Default for HealthCache {
    fn default() -> Self {
        Self::new(Duration::from_secs(10))
    }
}

/// Builds the agent's health report, cached for the configured TTL.
pub struct HealthMonitor {
    client: Arc<UnionActionClient>,
    tracker: Arc<ErrorTracker>,
    cache: HealthCache,
    started: Instant,
    environment: AppEnvironment,
    log_level: String,
}

impl HealthMonitor {
    pub fn new(
        client: Arc<UnionActionClient>,
        tracker: Arc<ErrorTracker>,
        cache_ttl: Duration,
        environment: AppEnvironment,
    ) -> Self {
        Self {
            client,
            tracker,
            cache: HealthCache::new(cache_ttl),
            started: Instant::now(),
            environment,
            log_level: "info".to_string(),
        }
    }

    /// Log level echoed by [`HealthMonitor::debug_report`].
    pub fn with_log_level(mut self, log_level: impl Into<String>) -> Self {
        self.log_level = log_level.into();
        self
    }

    pub fn uptime(&self) -> Duration {
        self.started.elapsed()
    }

    pub async fn report(&self) -> Value {
        if let Some(cached) = self.cache.get(HEALTH_CACHE_KEY) {
            debug!("health report served from cache");
            return cached;
        }

        let memory = check_memory(MEMORY_WARNING_PERCENT);
        let backend = check_backend(&self.client).await;
        let recent = self.tracker.count_since(RECENT_ERROR_WINDOW);
        let summary = self.tracker.summary();

        let mut status = aggregate_status(&[memory.status, backend.status]);
        if recent > RECENT_ERROR_LIMIT {
            status = OverallStatus::Degraded;
        }

        let uptime = self.uptime();
        let report = json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "uptime_seconds": uptime.as_secs(),
            "uptime": format_uptime(uptime),
            "timestamp": Utc::now().to_rfc3339(),
            "service": "union-action-agent",
            "environment": self.environment.label(),
            "dependencies": {
                "union_action_api": backend,
                "memory": memory,
            },
            "error_metrics": {
                "total_errors": summary.total_errors,
                "errors_by_category": summary.errors,
                "recent_errors_count": summary.recent_errors_count,
                "recent_errors_last_5min": recent,
                "time_since_reset_seconds": summary.time_since_reset_seconds,
            },
        });

        info!(
            status = ?status,
            backend = ?backend.status,
            memory = ?memory.status,
            recent_errors = recent,
            "health check complete"
        );
        self.cache.set(HEALTH_CACHE_KEY, report.clone());
        report
    }

    /// Process and error-tracker state for local debugging. `None` outside
    /// the development environment.
    pub fn debug_report(&self) -> Option<Value> {
        if self.environment != AppEnvironment::Development {
            return None;
        }

        let (memory_mb, _) = memory_snapshot();
        let summary = self.tracker.summary();
        Some(json!({
            "status": "debug",
            "timestamp": Utc::now().to_rfc3339(),
            "service": {
                "name": "union-action-agent",
                "version": env!("CARGO_PKG_VERSION"),
                "uptime_seconds": self.uptime().as_secs(),
                "environment": self.environment.label(),
            },
            "system": {
                "memory_mb": (memory_mb * 100.0).round() / 100.0,
                "pid": std::process::id(),
            },
            "errors": {
                "total": summary.total_errors,
                "by_category": summary.errors,
                "recent": self.tracker.recent(DEBUG_RECENT_ERRORS),
            },
            "config": {
                "union_action_url": self.client.base_url(),
                "log_level": self.log_level,
                "environment": self.environment.label(),
            },
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregation_rules() {
        let (ok, warning, error, timeout) = (
            CheckStatus::Ok,
            CheckStatus::Warning,
            CheckStatus::Error,
            CheckStatus::Timeout,
        );

        assert_eq!(aggregate_status(&[]), OverallStatus::Unknown);
        assert_eq!(aggregate_status(&[ok, warning]), OverallStatus::Ok);
        assert_eq!(aggregate_status(&[error, error]), OverallStatus::Down);
        assert_eq!(aggregate_status(&[ok, error]), OverallStatus::Degraded);
        assert_eq!(aggregate_status(&[ok, timeout]), OverallStatus::Degraded);
        assert_eq!(aggregate_status(&[timeout, timeout]), OverallStatus::Degraded);
    }

    #[test]
    fn uptime_formatting() {
        assert_eq!(format_uptime(Duration::from_secs(9015)), "2h 30m 15s");
        assert_eq!(format_uptime(Duration::from_secs(3600)), "1h");
        assert_eq!(format_uptime(Duration::from_secs(61)), "1m 1s");
        assert_eq!(format_uptime(Duration::ZERO), "0s");
    }

    #[test]
    fn cache_entries_expire() {
        let cache = HealthCache::new(Duration::from_millis(30));
        cache.set("health_check", json!({"status": "ok"}));

        assert_eq!(cache.get("health_check"), Some(json!({"status": "ok"})));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get("health_check"), None);
    }

    #[test]
    fn cache_clear_drops_entries() {
        let cache = HealthCache::default();
        cache.set("a", json!(1));

        cache.clear();

        assert_eq!(cache.get("a"), None);
    }

    #[test]
    fn memory_check_reports_usage() {
        let result = check_memory(100.0);

        assert_eq!(result.status, CheckStatus::Ok);
        assert!(result.details.contains_key("usage_mb"));
    }

    #[test]
    fn check_results_flatten_details() {
        let result = CheckResult::new(CheckStatus::Timeout, json!({"url": "http://x/health"}));
        let value = serde_json::to_value(&result).expect("serialize");

        assert_eq!(value["status"], "timeout");
        assert_eq!(value["url"], "http://x/health");
    }
}

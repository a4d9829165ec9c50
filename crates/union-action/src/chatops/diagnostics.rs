use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

pub const RECENT_ERROR_CAPACITY: usize = 100;
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    Parsing,
    Integration,
    Unknown,
}

impl ErrorCategory {
    pub const ALL: [ErrorCategory; 4] = [
        ErrorCategory::Validation,
        ErrorCategory::Parsing,
        ErrorCategory::Integration,
        ErrorCategory::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "validation",
            ErrorCategory::Parsing => "parsing",
            ErrorCategory::Integration => "integration",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrackedError {
    pub category: ErrorCategory,
    pub timestamp: DateTime<Utc>,
    pub details: Value,
    #[serde(skip)]
    recorded_at: Instant,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorSummary {
    pub errors: BTreeMap<&'static str, u64>,
    pub total_errors: u64,
    pub recent_errors_count: usize,
    pub recent_errors: Vec<TrackedError>,
    pub time_since_reset_seconds: u64,
}

#[derive(Debug)]
struct TrackerState {
    counts: BTreeMap<ErrorCategory, u64>,
    recent: VecDeque<TrackedError>,
    reset_at: Instant,
}

impl TrackerState {
    fn new() -> Self {
        Self {
            counts: ErrorCategory::ALL.into_iter().map(|category| (category, 0)).collect(),
            recent: VecDeque::with_capacity(RECENT_ERROR_CAPACITY),
            reset_at: Instant::now(),
        }
    }
}

/// Process-wide error counts plus a bounded log of the most recent errors.
#[derive(Debug)]
pub struct ErrorTracker {
    state: Mutex<TrackerState>,
}

impl Default for ErrorTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TrackerState::new()),
        }
    }

    fn state(&self) -> MutexGuard<'_, TrackerState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn track(&self, category: ErrorCategory, details: Value) {
        let mut state = self.state();
        *state.counts.entry(category).or_insert(0) += 1;
        if state.recent.len() == RECENT_ERROR_CAPACITY {
            state.recent.pop_front();
        }
        state.recent.push_back(TrackedError {
            category,
            timestamp: Utc::now(),
            details,
            recorded_at: Instant::now(),
        });
    }

    pub fn count(&self, category: ErrorCategory) -> u64 {
        self.state().counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> u64 {
        self.state().counts.values().sum()
    }

    /// Newest last, at most `limit` entries.
    pub fn recent(&self, limit: usize) -> Vec<TrackedError> {
        let state = self.state();
        let skip = state.recent.len().saturating_sub(limit);
        state.recent.iter().skip(skip).cloned().collect()
    }

    /// Errors still held in the recent log that were recorded within `window`.
    pub fn count_since(&self, window: Duration) -> usize {
        self.state()
            .recent
            .iter()
            .filter(|error| error.recorded_at.elapsed() <= window)
            .count()
    }

    pub fn summary(&self) -> ErrorSummary {
        let state = self.state();
        let skip = state.recent.len().saturating_sub(10);
        ErrorSummary {
            errors: state
                .counts
                .iter()
                .map(|(category, count)| (category.as_str(), *count))
                .collect(),
            total_errors: state.counts.values().sum(),
            recent_errors_count: state.recent.len(),
            recent_errors: state.recent.iter().skip(skip).cloned().collect(),
            time_since_reset_seconds: state.reset_at.elapsed().as_secs(),
        }
    }

    pub fn reset(&self) {
        *self.state() = TrackerState::new();
    }
}

/// Emits a warning when `elapsed` exceeds the slow-operation threshold.
pub fn log_slow_operation(operation: &str, elapsed: Duration) -> bool {
    let slow = elapsed > SLOW_OPERATION_THRESHOLD;
    if slow {
        warn!(
            operation,
            duration_ms = elapsed.as_millis() as u64,
            threshold_ms = SLOW_OPERATION_THRESHOLD.as_millis() as u64,
            "slow operation"
        );
    }
    slow
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn counts_errors_per_category() {
        let tracker = ErrorTracker::new();

        tracker.track(ErrorCategory::Validation, json!({"reason": "empty"}));
        tracker.track(ErrorCategory::Validation, Value::Null);
        tracker.track(ErrorCategory::Integration, Value::Null);

        assert_eq!(tracker.count(ErrorCategory::Validation), 2);
        assert_eq!(tracker.count(ErrorCategory::Parsing), 0);
        assert_eq!(tracker.total(), 3);

        let summary = tracker.summary();
        assert_eq!(summary.errors["validation"], 2);
        assert_eq!(summary.errors["unknown"], 0);
        assert_eq!(summary.total_errors, 3);
        assert_eq!(summary.recent_errors_count, 3);
    }

    #[test]
    fn recent_log_is_bounded() {
        let tracker = ErrorTracker::new();

        for index in 0..RECENT_ERROR_CAPACITY + 5 {
            tracker.track(ErrorCategory::Parsing, json!({ "index": index }));
        }

        let recent = tracker.recent(usize::MAX);
        assert_eq!(recent.len(), RECENT_ERROR_CAPACITY);
        assert_eq!(recent[0].details["index"], 5);
        assert_eq!(tracker.recent(2).len(), 2);
        assert_eq!(tracker.summary().recent_errors.len(), 10);
        assert_eq!(tracker.total(), (RECENT_ERROR_CAPACITY + 5) as u64);
    }

    #[test]
    fn count_since_uses_window() {
        let tracker = ErrorTracker::new();
        tracker.track(ErrorCategory::Unknown, Value::Null);

        assert_eq!(tracker.count_since(Duration::from_secs(300)), 1);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(tracker.count_since(Duration::from_millis(5)), 0);
    }

    #[test]
    fn reset_clears_everything() {
        let tracker = ErrorTracker::new();
        tracker.track(ErrorCategory::Unknown, Value::Null);

        tracker.reset();

        assert_eq!(tracker.total(), 0);
        assert!(tracker.recent(10).is_empty());
    }

    #[test]
    fn slow_operation_threshold() {
        assert!(!log_slow_operation("webhook", Duration::from_millis(2000)));
        assert!(log_slow_operation("webhook", Duration::from_millis(2001)));
    }
}

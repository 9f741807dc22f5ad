//! Aggregated failure monitoring across outbound error categories.
//!
//! One `ErrorMonitor` lives on the process-wide state. Network-facing
//! callers report each failure into the matching category and consult the
//! single suspension gate before issuing new outbound work. Diagnostics read
//! the snapshot; they never mutate tracker state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backoff::{BackoffPolicy, TimeoutTracker};

/// Classification of an outbound failure.
///
/// Callers classify each failure exactly once: cancellations and timeouts
/// are aborts, a response with a non-success status is an HTTP failure, and
/// everything else is generic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    Abort,
    Http,
    Generic,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FailureKind::Abort => "abort",
            FailureKind::Http => "http",
            FailureKind::Generic => "generic",
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-category backoff tuning for the monitor.
#[derive(Debug, Clone, Copy)]
pub struct MonitorConfig {
    pub abort: BackoffPolicy,
    pub http: BackoffPolicy,
    pub generic: BackoffPolicy,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        // Aborts only count; HTTP failures pause far longer than generic
        // ones because they indicate upstream distress.
        Self {
            abort: BackoffPolicy::new(Duration::ZERO),
            http: BackoffPolicy::new(Duration::from_secs(180)),
            generic: BackoffPolicy::new(Duration::from_secs(30)),
        }
    }
}

/// Diagnostic view of a single category.
#[derive(Debug, Clone, Serialize)]
pub struct CategorySnapshot {
    pub last_minute: usize,
    pub last_hour: usize,
    pub current_timeout_ms: u64,
    pub remaining_ms: u64,
}

/// Diagnostic view of the whole monitor.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorSnapshot {
    pub abort: CategorySnapshot,
    pub http: CategorySnapshot,
    pub generic: CategorySnapshot,
    pub suspended: bool,
    pub resume_in_ms: u64,
    pub global: bool,
}

/// Thread-safe failure aggregator with one tracker per category.
///
/// Every operation takes `&self`; each tracker sits behind its own mutex so
/// two near-simultaneous records cannot both win the "not suspended" race
/// and double-apply backoff growth.
pub struct ErrorMonitor {
    abort: Mutex<TimeoutTracker>,
    http: Mutex<TimeoutTracker>,
    generic: Mutex<TimeoutTracker>,
    is_global: AtomicBool,
}

impl ErrorMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            abort: Mutex::new(TimeoutTracker::new(config.abort)),
            http: Mutex::new(TimeoutTracker::new(config.http)),
            generic: Mutex::new(TimeoutTracker::new(config.generic)),
            is_global: AtomicBool::new(false),
        }
    }

    /// Route a classified failure to its category tracker.
    pub fn record(&self, kind: FailureKind) {
        lock(self.tracker(kind)).record_failure();
        self.refresh_global();
    }

    pub fn record_abort(&self) {
        self.record(FailureKind::Abort);
    }

    pub fn record_http(&self) {
        self.record(FailureKind::Http);
    }

    pub fn record_generic(&self) {
        self.record(FailureKind::Generic);
    }

    /// The single gate callers check before issuing outbound work.
    pub fn is_suspended(&self) -> bool {
        lock(&self.abort).is_suspended()
            || lock(&self.http).is_suspended()
            || lock(&self.generic).is_suspended()
    }

    /// Longest remaining pause across all categories, zero when idle.
    ///
    /// Callers wait out the longest-lived active suspension, not just the
    /// one that happened to trigger last.
    pub fn suspension_remaining(&self) -> Duration {
        lock(&self.abort)
            .remaining()
            .max(lock(&self.http).remaining())
            .max(lock(&self.generic).remaining())
    }

    /// Whether the current suspension spans more than one category.
    pub fn is_global(&self) -> bool {
        self.is_global.load(Ordering::SeqCst)
    }

    /// Immutable diagnostic view; reads never alter suspension state.
    pub fn snapshot(&self) -> MonitorSnapshot {
        let abort = category_snapshot(&mut lock(&self.abort));
        let http = category_snapshot(&mut lock(&self.http));
        let generic = category_snapshot(&mut lock(&self.generic));

        let resume_in_ms = abort
            .remaining_ms
            .max(http.remaining_ms)
            .max(generic.remaining_ms);

        MonitorSnapshot {
            abort,
            http,
            generic,
            suspended: self.is_suspended(),
            resume_in_ms,
            global: self.is_global(),
        }
    }

    fn tracker(&self, kind: FailureKind) -> &Mutex<TimeoutTracker> {
        match kind {
            FailureKind::Abort => &self.abort,
            FailureKind::Http => &self.http,
            FailureKind::Generic => &self.generic,
        }
    }

    fn refresh_global(&self) {
        let suspended = [&self.abort, &self.http, &self.generic]
            .into_iter()
            .filter(|tracker| lock(tracker).is_suspended())
            .count();
        self.is_global.store(suspended >= 2, Ordering::SeqCst);
    }
}

fn category_snapshot(tracker: &mut TimeoutTracker) -> CategorySnapshot {
    CategorySnapshot {
        last_minute: tracker.last_minute(),
        last_hour: tracker.last_hour(),
        current_timeout_ms: tracker.current_timeout().as_millis() as u64,
        remaining_ms: tracker.remaining().as_millis() as u64,
    }
}

// A tracker behind a poisoned mutex still holds consistent counters, so
// recover the guard instead of surfacing the poison to callers.
fn lock(tracker: &Mutex<TimeoutTracker>) -> MutexGuard<'_, TimeoutTracker> {
    tracker
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn categories_are_tracked_independently() {
        let monitor = ErrorMonitor::new(MonitorConfig::default());

        monitor.record_http();

        assert!(monitor.is_suspended());
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.http.last_minute, 1);
        assert_eq!(snapshot.generic.last_minute, 0);
        assert_eq!(snapshot.abort.last_minute, 0);
        assert_eq!(snapshot.generic.current_timeout_ms, 0);
    }

    #[test]
    fn aborts_count_but_never_gate() {
        let monitor = ErrorMonitor::new(MonitorConfig::default());

        for _ in 0..3 {
            monitor.record_abort();
        }

        assert!(!monitor.is_suspended());
        assert_eq!(monitor.suspension_remaining(), Duration::ZERO);
        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.abort.last_minute, 3);
        assert_eq!(snapshot.abort.remaining_ms, 0);
    }

    #[test]
    fn suspension_remaining_takes_longest_window() {
        let monitor = ErrorMonitor::new(MonitorConfig::default());

        monitor.record_generic();
        monitor.record_http();

        let remaining = monitor.suspension_remaining();
        assert!(remaining > Duration::from_secs(60));
        assert!(remaining <= Duration::from_secs(180));
    }

    #[test]
    fn global_flag_tracks_cross_category_suspension() {
        let monitor = ErrorMonitor::new(MonitorConfig::default());

        monitor.record_generic();
        assert!(!monitor.is_global());

        monitor.record_http();
        assert!(monitor.is_global());
    }

    #[test]
    fn concurrent_records_commit_a_single_window() {
        let monitor = Arc::new(ErrorMonitor::new(MonitorConfig::default()));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let monitor = monitor.clone();
                std::thread::spawn(move || monitor.record_generic())
            })
            .collect();
        for handle in handles {
            handle.join().expect("recorder thread panicked");
        }

        let snapshot = monitor.snapshot();
        assert_eq!(snapshot.generic.last_minute, 8);
        // Only the first record opens a window; the rest land inside it.
        assert_eq!(snapshot.generic.current_timeout_ms, 30_000);
    }

    #[test]
    fn snapshot_serializes_for_status_payloads() {
        let monitor = ErrorMonitor::new(MonitorConfig::default());
        monitor.record_http();

        let value = serde_json::to_value(monitor.snapshot()).expect("snapshot to json");

        assert_eq!(value["suspended"], serde_json::json!(true));
        assert_eq!(value["http"]["last_minute"], serde_json::json!(1));
        assert!(value["resume_in_ms"].as_u64().unwrap() > 0);
    }
}

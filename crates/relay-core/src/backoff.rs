//! Sliding-window failure tracking with an escalating pause.
//!
//! Each outbound failure category keeps its own tracker. A failure opens a
//! suspension window that callers must honor before retrying; consecutive
//! triggering failures grow the window geometrically up to a ceiling, and a
//! quiet cool-down collapses the growth back to the base.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

const MINUTE_WINDOW: Duration = Duration::from_secs(60);
const HOUR_WINDOW: Duration = Duration::from_secs(3_600);

/// Tuning for a single failure category.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Minimum pause once a failure opens a suspension window. A zero base
    /// disables suspensions entirely, leaving the tracker as a pure counter.
    pub base_timeout: Duration,
    /// Multiplier applied to the previous pause on the next trigger.
    pub growth: u32,
    /// Upper bound on any computed pause.
    pub ceiling: Duration,
    /// Quiet period after which pause growth falls back to the base.
    pub cooldown: Duration,
}

impl BackoffPolicy {
    pub fn new(base_timeout: Duration) -> Self {
        Self {
            base_timeout,
            ..Self::default()
        }
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_timeout: Duration::from_secs(30),
            growth: 2,
            ceiling: Duration::from_secs(900),
            cooldown: Duration::from_secs(900),
        }
    }
}

/// Per-category failure log with an escalating suspension window.
///
/// The event log retains the trailing hour of failures for diagnostics.
/// Suspension state is evaluated lazily on query; an expired window simply
/// reads as not suspended.
#[derive(Debug)]
pub struct TimeoutTracker {
    policy: BackoffPolicy,
    events: VecDeque<Instant>,
    timeout_end: Option<Instant>,
    current_timeout: Duration,
    last_triggered: Option<Instant>,
}

impl TimeoutTracker {
    pub fn new(policy: BackoffPolicy) -> Self {
        Self {
            policy,
            events: VecDeque::new(),
            timeout_end: None,
            current_timeout: Duration::ZERO,
            last_triggered: None,
        }
    }

    /// Log a failure and, unless a suspension is already active, open a new
    /// suspension window. Failures inside an active window only append to
    /// the log; the committed window never moves.
    pub fn record_failure(&mut self) {
        self.record_failure_at(Instant::now());
    }

    fn record_failure_at(&mut self, now: Instant) {
        self.events.push_back(now);
        self.prune(now);

        if self.suspended_at(now) {
            return;
        }

        if let Some(last) = self.last_triggered {
            if now.saturating_duration_since(last) >= self.policy.cooldown {
                self.current_timeout = Duration::ZERO;
            }
        }

        let grown = self.current_timeout.saturating_mul(self.policy.growth);
        let next = grown
            .max(self.policy.base_timeout)
            .min(self.policy.ceiling);

        self.current_timeout = next;
        if !next.is_zero() {
            self.timeout_end = Some(now + next);
            self.last_triggered = Some(now);
        }
    }

    /// Whether callers must still hold off.
    pub fn is_suspended(&self) -> bool {
        self.suspended_at(Instant::now())
    }

    fn suspended_at(&self, now: Instant) -> bool {
        self.timeout_end.is_some_and(|end| now < end)
    }

    /// Time left on the active suspension, zero when idle.
    pub fn remaining(&self) -> Duration {
        self.remaining_at(Instant::now())
    }

    fn remaining_at(&self, now: Instant) -> Duration {
        self.timeout_end
            .map(|end| end.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }

    /// Length of the most recently opened suspension window.
    pub fn current_timeout(&self) -> Duration {
        self.current_timeout
    }

    /// Failures logged in the trailing minute.
    pub fn last_minute(&mut self) -> usize {
        self.count_within(MINUTE_WINDOW, Instant::now())
    }

    /// Failures logged in the trailing hour.
    pub fn last_hour(&mut self) -> usize {
        self.count_within(HOUR_WINDOW, Instant::now())
    }

    fn count_within(&mut self, window: Duration, now: Instant) -> usize {
        self.prune(now);
        self.events
            .iter()
            .filter(|event| now.saturating_duration_since(**event) <= window)
            .count()
    }

    fn prune(&mut self, now: Instant) {
        while let Some(front) = self.events.front() {
            if now.saturating_duration_since(*front) > HOUR_WINDOW {
                self.events.pop_front();
            } else {
                break;
            }
        }
    }
}

//! Operator-facing incident reporting.
//!
//! Each failed outbound request gets one structured log record carrying an
//! incident id, the failure classification, and the monitor's counts, so an
//! operator can tell at a glance whether the upstream is melting down.

use std::time::Duration;

use relay_core::clean_length;
use relay_feed::FeedError;
use uuid::Uuid;

use crate::state::AppState;

/// Log one failed outbound request with full monitor context.
///
/// Reads the monitor snapshot only. Recording the failure is the caller's
/// job, so each failure is counted exactly once.
pub fn log_incident(state: &AppState, target: &str, error: &FeedError) {
    let snapshot = state.monitor().snapshot();
    let resuming_in = clean_length(Duration::from_millis(snapshot.resume_in_ms));

    tracing::error!(
        incident_id = %Uuid::new_v4(),
        target,
        kind = %error.kind(),
        global = snapshot.global,
        resuming_in = %resuming_in,
        last_minute_abort = snapshot.abort.last_minute,
        last_minute_http = snapshot.http.last_minute,
        last_minute_generic = snapshot.generic.last_minute,
        last_hour_abort = snapshot.abort.last_hour,
        last_hour_http = snapshot.http.last_hour,
        last_hour_generic = snapshot.generic.last_hour,
        next_timeout_abort_ms = snapshot.abort.current_timeout_ms,
        next_timeout_http_ms = snapshot.http.current_timeout_ms,
        next_timeout_generic_ms = snapshot.generic.current_timeout_ms,
        uses = state.uses(),
        "Outbound request failed: {}",
        error
    );
}

//! Human-readable duration formatting for operator output.

use std::time::Duration;

/// Format a duration as its largest whole units, e.g. "1d 2h 3m 4s".
///
/// Sub-second precision is dropped; a zero duration renders as "0s".
pub fn clean_length(duration: Duration) -> String {
    let total_secs = duration.as_secs();

    let days = total_secs / 86_400;
    let hours = (total_secs % 86_400) / 3_600;
    let minutes = (total_secs % 3_600) / 60;
    let seconds = total_secs % 60;

    if days > 0 {
        format!("{}d {}h {}m {}s", days, hours, minutes, seconds)
    } else if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_each_magnitude() {
        assert_eq!(clean_length(Duration::ZERO), "0s");
        assert_eq!(clean_length(Duration::from_secs(59)), "59s");
        assert_eq!(clean_length(Duration::from_secs(90)), "1m 30s");
        assert_eq!(clean_length(Duration::from_secs(3_661)), "1h 1m 1s");
        assert_eq!(clean_length(Duration::from_secs(90_061)), "1d 1h 1m 1s");
    }

    #[test]
    fn drops_subsecond_precision() {
        assert_eq!(clean_length(Duration::from_millis(2_800)), "2s");
        assert_eq!(clean_length(Duration::from_millis(400)), "0s");
    }
}

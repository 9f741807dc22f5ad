pub mod backoff;
pub mod duration_fmt;
pub mod monitor;

pub use backoff::{BackoffPolicy, TimeoutTracker};
pub use duration_fmt::clean_length;
pub use monitor::{
    CategorySnapshot, ErrorMonitor, FailureKind, MonitorConfig, MonitorSnapshot,
};

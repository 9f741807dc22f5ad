//! Shared runtime state.

use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use relay_core::ErrorMonitor;
use relay_feed::FeedItem;

use crate::config::Config;

/// Application state - owns the single process-wide failure monitor.
///
/// Constructed once in `main` and shared by reference; no other component
/// constructs a competing monitor.
pub struct AppState {
    monitor: ErrorMonitor,
    uses: AtomicU64,
    started_at: Instant,
    seen_items: DashMap<String, HashSet<String>>,
    loop_heartbeats: DashMap<String, Instant>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            monitor: ErrorMonitor::new(config.monitor_config()),
            uses: AtomicU64::new(0),
            started_at: Instant::now(),
            seen_items: DashMap::new(),
            loop_heartbeats: DashMap::new(),
        }
    }

    pub fn monitor(&self) -> &ErrorMonitor {
        &self.monitor
    }

    /// Count one outbound request attempt.
    pub fn record_use(&self) {
        self.uses.fetch_add(1, Ordering::SeqCst);
    }

    pub fn uses(&self) -> u64 {
        self.uses.load(Ordering::SeqCst)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn mark_loop_heartbeat(&self, name: &str) {
        self.loop_heartbeats.insert(name.to_string(), Instant::now());
    }

    /// Seconds since each background loop last checked in.
    pub fn loop_heartbeat_ages(&self) -> BTreeMap<String, u64> {
        self.loop_heartbeats
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().elapsed().as_secs()))
            .collect()
    }

    /// Items not yet seen for this feed.
    ///
    /// The first fetch of a feed seeds the cache and relays nothing, so a
    /// restart does not replay the upstream's history.
    pub fn filter_new_items(&self, feed: &str, items: &[FeedItem]) -> Vec<FeedItem> {
        match self.seen_items.get_mut(feed) {
            None => {
                let ids: HashSet<String> =
                    items.iter().map(|item| item.id.clone()).collect();
                self.seen_items.insert(feed.to_string(), ids);
                Vec::new()
            }
            Some(mut seen) => items
                .iter()
                .filter(|item| seen.insert(item.id.clone()))
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(id: &str) -> FeedItem {
        FeedItem {
            id: id.to_string(),
            title: format!("Post {}", id),
            link: format!("https://upstream.example/{}", id),
            author: None,
            published: None,
        }
    }

    fn state() -> AppState {
        AppState::new(&Config::from_env())
    }

    #[test]
    fn first_fetch_seeds_without_relaying() {
        let state = state();

        let fresh = state.filter_new_items("news", &[item("a"), item("b")]);

        assert!(fresh.is_empty());
    }

    #[test]
    fn later_fetches_surface_only_new_items() {
        let state = state();
        state.filter_new_items("news", &[item("a"), item("b")]);

        let fresh = state.filter_new_items("news", &[item("a"), item("b"), item("c")]);
        assert_eq!(fresh.len(), 1);
        assert_eq!(fresh[0].id, "c");

        // Already-relayed items stay quiet on the next pass.
        let fresh = state.filter_new_items("news", &[item("b"), item("c")]);
        assert!(fresh.is_empty());
    }

    #[test]
    fn feeds_keep_separate_seen_caches() {
        let state = state();
        state.filter_new_items("news", &[item("a")]);
        state.filter_new_items("status", &[]);

        let fresh = state.filter_new_items("status", &[item("a")]);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn record_use_counts_attempts() {
        let state = state();
        assert_eq!(state.uses(), 0);

        state.record_use();
        state.record_use();

        assert_eq!(state.uses(), 2);
    }
}

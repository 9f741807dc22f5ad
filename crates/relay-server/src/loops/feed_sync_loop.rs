//! Feed polling loop.
//!
//! Polls upstream announcement feeds on an interval and relays new items to
//! the configured webhook. Every outbound attempt honors the shared failure
//! monitor: while a suspension is active the loop idles instead of hammering
//! a struggling upstream.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::time::interval;

use relay_core::clean_length;
use relay_feed::{FeedClient, FeedItem, Notification};

use crate::config::Config;
use crate::report;
use crate::state::AppState;

pub async fn run_feed_sync_loop(
    state: Arc<AppState>,
    config: Config,
    mut shutdown: broadcast::Receiver<()>,
) {
    let client = FeedClient::new(&config.feed_url, &config.feed_auth_token);
    let mut ticker = interval(Duration::from_secs(config.poll_interval_secs.max(1)));
    state.mark_loop_heartbeat("feed-sync");

    loop {
        tokio::select! {
            _ = shutdown.recv() => {
                tracing::info!("Feed sync loop shutting down");
                break;
            }
            _ = ticker.tick() => {
                state.mark_loop_heartbeat("feed-sync");

                let pause = state.monitor().suspension_remaining();
                if !pause.is_zero() {
                    tracing::warn!(
                        "Outbound requests suspended, resuming in {}",
                        clean_length(pause)
                    );
                    continue;
                }

                sync_feeds(&state, &client, &config).await;
            }
        }
    }
}

async fn sync_feeds(state: &AppState, client: &FeedClient, config: &Config) {
    for feed in &config.feeds {
        // A failure earlier in the pass can open a suspension.
        if state.monitor().is_suspended() {
            break;
        }

        state.record_use();
        match client.fetch_feed(feed).await {
            Ok(payload) => {
                let fresh = state.filter_new_items(feed, &payload.items);
                if !fresh.is_empty() {
                    tracing::info!("Feed {} has {} new item(s)", feed, fresh.len());
                    dispatch_items(state, client, config, feed, &fresh).await;
                }
            }
            Err(err) => {
                state.monitor().record(err.kind());
                report::log_incident(state, feed, &err);
            }
        }
    }
}

async fn dispatch_items(
    state: &AppState,
    client: &FeedClient,
    config: &Config,
    feed: &str,
    items: &[FeedItem],
) {
    let Some(webhook) = config.webhook_url.as_deref() else {
        return;
    };

    for item in items {
        if state.monitor().is_suspended() {
            tracing::warn!("Suspension opened mid-dispatch, dropping remaining items");
            break;
        }

        state.record_use();
        let notification = Notification::from_item(feed, item);
        if let Err(err) = client.post_webhook(webhook, &notification).await {
            state.monitor().record(err.kind());
            report::log_incident(state, "webhook", &err);
        }
    }
}

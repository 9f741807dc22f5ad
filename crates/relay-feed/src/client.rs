//! Upstream feed API HTTP client.

use std::time::Duration;

use relay_core::FailureKind;
use reqwest::Client;
use thiserror::Error;

use crate::models::{Feed, Notification};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Failure from an outbound feed or webhook request.
///
/// Variants map onto the monitor's failure categories via [`FeedError::kind`];
/// callers record each failure exactly once.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("request timed out")]
    Timeout,
    #[error("upstream returned status {status}")]
    Status { status: u16 },
    #[error("failed to decode feed payload: {0}")]
    Decode(#[source] reqwest::Error),
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),
}

impl FeedError {
    /// Category this failure is recorded under.
    pub fn kind(&self) -> FailureKind {
        match self {
            FeedError::Timeout => FailureKind::Abort,
            FeedError::Status { .. } => FailureKind::Http,
            FeedError::Decode(_) | FeedError::Transport(_) => FailureKind::Generic,
        }
    }

    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else {
            FeedError::Transport(err)
        }
    }

    fn from_decode(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FeedError::Timeout
        } else {
            FeedError::Decode(err)
        }
    }
}

/// HTTP client for the upstream feed API and notification webhooks.
pub struct FeedClient {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
}

impl FeedClient {
    /// Create a new feed client. An empty token disables authentication.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let token = token.into();
        let auth_token = if token.trim().is_empty() {
            None
        } else {
            Some(token)
        };
        Self {
            client: Client::builder()
                .timeout(REQUEST_TIMEOUT)
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.into(),
            auth_token,
        }
    }

    /// Fetch one named feed from the upstream API.
    pub async fn fetch_feed(&self, feed: &str) -> Result<Feed, FeedError> {
        let url = format!("{}/v1/feeds/{}", self.base_url, feed);

        let mut request = self.client.get(&url);
        if let Some(token) = self.auth_token.as_deref() {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(FeedError::from_transport)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        tracing::debug!("Fetched feed {} ({})", feed, status);
        response.json::<Feed>().await.map_err(FeedError::from_decode)
    }

    /// Deliver one notification to a subscriber webhook.
    pub async fn post_webhook(
        &self,
        url: &str,
        notification: &Notification,
    ) -> Result<(), FeedError> {
        let response = self
            .client
            .post(url)
            .json(notification)
            .send()
            .await
            .map_err(FeedError::from_transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status {
                status: status.as_u16(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeouts_classify_as_aborts() {
        assert_eq!(FeedError::Timeout.kind(), FailureKind::Abort);
    }

    #[test]
    fn status_failures_classify_as_http() {
        let err = FeedError::Status { status: 503 };
        assert_eq!(err.kind(), FailureKind::Http);
        assert_eq!(err.to_string(), "upstream returned status 503");
    }

    #[test]
    fn empty_token_disables_auth() {
        let client = FeedClient::new("http://localhost:8000", "  ");
        assert!(client.auth_token.is_none());

        let client = FeedClient::new("http://localhost:8000", "secret");
        assert_eq!(client.auth_token.as_deref(), Some("secret"));
    }
}

//! Feed payload models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One upstream announcement feed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Feed {
    pub name: String,
    #[serde(default)]
    pub items: Vec<FeedItem>,
}

/// Single feed entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedItem {
    pub id: String,
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published: Option<DateTime<Utc>>,
}

/// Outbound webhook payload for one relayed item.
#[derive(Debug, Clone, Serialize)]
pub struct Notification {
    pub feed: String,
    pub title: String,
    pub link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn from_item(feed: &str, item: &FeedItem) -> Self {
        Self {
            feed: feed.to_string(),
            title: item.title.clone(),
            link: item.link.clone(),
            published: item.published,
        }
    }
}

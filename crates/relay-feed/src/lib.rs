pub mod client;
pub mod models;

pub use client::{FeedClient, FeedError};
pub use models::{Feed, FeedItem, Notification};

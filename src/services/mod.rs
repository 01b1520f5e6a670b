//! Service layer: the collaborators wired around the change detector.
//!
//! - Notice list and page fetching (`BoardCrawler`)
//! - Summary generation (`OpenAiSummarizer`, `ExcerptSummarizer`)
//! - Subscriber lookup (`FileSubscriberRegistry`)

mod notices;
mod subscribers;
mod summarizer;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Notice, NoticeContent, Subscriber};

pub use notices::BoardCrawler;
pub use subscribers::FileSubscriberRegistry;
pub use summarizer::{ExcerptSummarizer, OpenAiSummarizer, fallback_summary};

/// Source of notices from the live board.
#[async_trait]
pub trait NoticeSource: Send + Sync {
    /// Currently visible notices, newest first, unique by URL.
    async fn fetch_notice_list(&self) -> Result<Vec<Notice>>;

    /// Full contents of one notice page.
    async fn fetch_notice_content(&self, url: &str) -> Result<NoticeContent>;
}

/// Produces a short human-readable summary of a notice.
///
/// Never fails: implementations degrade to a fallback string.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, title: &str, content: &str) -> String;
}

/// Source of notification targets.
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// Subscribers that are currently opted in.
    async fn get_active_subscribers(&self) -> Vec<Subscriber>;
}

//! Notification delivery.
//!
//! - `Notifier`: delivers one message to one target (email address,
//!   chat channel id).
//! - `Broadcaster`: delivers one message to every target a chat platform
//!   exposes for announcements.

pub mod discord;
pub mod email;
pub mod render;
pub mod telegram;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::DeliveryStats;

pub use discord::DiscordNotifier;
pub use email::EmailNotifier;
pub use render::{NoticeDigest, render};
pub use telegram::TelegramNotifier;

/// A rendered notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    /// HTML fragment for email
    pub html: String,
    /// Markdown text for chat platforms
    pub text: String,
}

/// Delivers a notification to a single target.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name, for logs.
    fn channel(&self) -> &'static str;

    async fn send(&self, message: &Notification, target: &str) -> Result<()>;
}

/// Broadcasts a notification to a chat platform.
#[async_trait]
pub trait Broadcaster: Send + Sync {
    /// Channel name, for logs.
    fn channel(&self) -> &'static str;

    async fn broadcast(&self, message: &Notification) -> DeliveryStats;
}

/// Fixed message used by the `ping` command.
pub fn test_notification() -> Notification {
    Notification {
        subject: "공지 알리미 서비스 테스트".to_string(),
        html: "<p>🐞 공지 알리미 시스템 테스트</p><p>🚧 공지 알리미 시스템 점검입니다.</p>"
            .to_string(),
        text: "🐞 *공지 알리미 시스템 테스트*\n\n🚧 공지 알리미 시스템 점검입니다.".to_string(),
    }
}

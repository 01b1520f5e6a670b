// src/models/mod.rs

//! Domain models for the notifier.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod notice;
mod report;
mod subscriber;

// Re-export all public types
pub use config::{
    BoardConfig, Config, ContentConfig, CrawlerConfig, DiscordConfig, EmailConfig, HistoryConfig,
    SubscribersConfig, SummarizerConfig, TelegramConfig, compile_regex, parse_selector,
};
pub use notice::{Attachment, Notice, NoticeContent};
pub use report::{DeliveryStats, RunOutcome, RunReport, RunStatus};
pub use subscriber::{Subscriber, SubscriberFile};

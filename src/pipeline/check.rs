// src/pipeline/check.rs

//! One check of the notice board, start to finish.
//!
//! Collect → detect → summarise each new notice → notify subscribers →
//! optional chat broadcast. Runs strictly one step after another; callers
//! must not run two checks against the same history at once.

use crate::error::{AppError, Result};
use crate::models::{DeliveryStats, Notice, RunReport};
use crate::notify::{Broadcaster, NoticeDigest, Notification, Notifier, render};
use crate::services::{NoticeSource, SubscriberRegistry, Summarizer};
use crate::storage::HistoryBackend;
use crate::utils;

use super::detect::ChangeDetector;

/// Summary used when a notice page cannot be fetched.
pub const CONTENT_UNAVAILABLE: &str = "공지사항 내용을 가져올 수 없습니다.";

/// The check pipeline and the collaborators it drives.
pub struct Pipeline<'a, B> {
    detector: &'a ChangeDetector<B>,
    source: &'a dyn NoticeSource,
    summarizer: &'a dyn Summarizer,
    registry: &'a dyn SubscriberRegistry,
    mailer: Option<&'a dyn Notifier>,
    broadcasters: Vec<&'a dyn Broadcaster>,
}

impl<'a, B: HistoryBackend> Pipeline<'a, B> {
    pub fn new(
        detector: &'a ChangeDetector<B>,
        source: &'a dyn NoticeSource,
        summarizer: &'a dyn Summarizer,
        registry: &'a dyn SubscriberRegistry,
    ) -> Self {
        Self {
            detector,
            source,
            summarizer,
            registry,
            mailer: None,
            broadcasters: Vec::new(),
        }
    }

    /// Deliver to subscribers through `mailer`.
    pub fn with_mailer(mut self, mailer: &'a dyn Notifier) -> Self {
        self.mailer = Some(mailer);
        self
    }

    /// Also broadcast every notification through `broadcaster`.
    pub fn with_broadcaster(mut self, broadcaster: &'a dyn Broadcaster) -> Self {
        self.broadcasters.push(broadcaster);
        self
    }

    /// Run one check and always return a structured report.
    pub async fn check_and_notify(&self) -> RunReport {
        utils::log::header("Checking notice board");

        match self.run().await {
            Ok(report) => {
                utils::log::success(&report.message);
                report
            }
            Err(e) => {
                log::error!("Check failed: {}", e);
                RunReport::error(e.to_string())
            }
        }
    }

    async fn run(&self) -> Result<RunReport> {
        utils::log::step(1, 3, "Collecting notice list");
        let observed = self.source.fetch_notice_list().await?;
        if observed.is_empty() {
            return Err(AppError::collect("board returned no notices"));
        }
        utils::log::success(&format!("Collected {} notices", observed.len()));

        utils::log::step(2, 3, "Detecting new notices");
        let new_notices = self.detector.get_new_notices(&observed).await;
        if new_notices.is_empty() {
            return Ok(RunReport::no_new_notices());
        }

        utils::log::step(3, 3, "Summarising new notices");
        let digests = self.summarize_all(&new_notices).await;
        let processed = digests.len();

        let subscribers = self.registry.get_active_subscribers().await;
        if subscribers.is_empty() {
            log::info!("📭 No active subscribers");
            return Ok(RunReport::no_active_subscribers(processed));
        }

        let message = render(&digests);
        log::info!("📧 Sending to {} subscribers", subscribers.len());

        let mut email = DeliveryStats::default();
        for subscriber in &subscribers {
            email.record(self.deliver(&message, &subscriber.email).await);
        }

        let mut chat = DeliveryStats::default();
        for broadcaster in &self.broadcasters {
            let stats = broadcaster.broadcast(&message).await;
            log::info!(
                "{} broadcast: {}/{} delivered",
                broadcaster.channel(),
                stats.succeeded,
                stats.attempted
            );
            chat.merge(stats);
        }

        utils::log::summary(
            "Notifications",
            &[
                ("notices", processed.to_string()),
                ("email", format!("{}/{}", email.succeeded, email.attempted)),
                ("chat", format!("{}/{}", chat.succeeded, chat.attempted)),
            ],
        );

        Ok(RunReport::delivered(processed, email, chat))
    }

    /// Summarise each notice; a failure only affects that notice.
    async fn summarize_all(&self, notices: &[Notice]) -> Vec<NoticeDigest> {
        let total = notices.len();
        let mut digests = Vec::with_capacity(total);

        for (i, notice) in notices.iter().enumerate() {
            utils::log::progress(i + 1, total, &notice.title);

            let summary = match self.source.fetch_notice_content(&notice.url).await {
                Ok(content) => {
                    self.summarizer
                        .summarize(&notice.title, &content.summary_input())
                        .await
                }
                Err(e) => {
                    log::warn!("Could not fetch '{}': {}", notice.title, e);
                    CONTENT_UNAVAILABLE.to_string()
                }
            };

            digests.push(NoticeDigest {
                title: notice.title.clone(),
                url: notice.url.clone(),
                summary,
            });
        }
        digests
    }

    async fn deliver(&self, message: &Notification, target: &str) -> bool {
        let Some(mailer) = self.mailer else {
            log::error!("Email delivery to {} skipped: email is not configured", target);
            return false;
        };

        match mailer.send(message, target).await {
            Ok(()) => true,
            Err(e) => {
                log::error!("{} delivery to {} failed: {}", mailer.channel(), target, e);
                false
            }
        }
    }
}

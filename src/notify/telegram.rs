//! Telegram bot delivery.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use super::{Broadcaster, Notification, Notifier};
use crate::error::{AppError, Result};
use crate::models::{DeliveryStats, TelegramConfig};

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

#[derive(Clone)]
pub struct TelegramNotifier {
    client: Client,
    token: String,
    api_base: String,
    chat_id: Option<String>,
}

impl TelegramNotifier {
    pub fn new(client: Client, token: impl Into<String>, config: &TelegramConfig) -> Self {
        Self {
            client,
            token: token.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            chat_id: config.chat_id.clone(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, message: &Notification, target: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.token);
        let response = self
            .client
            .post(url)
            .form(&SendMessage {
                chat_id: target,
                text: &message.text,
                parse_mode: "Markdown",
            })
            .send()
            .await
            // The request URL carries the bot token.
            .map_err(|e| AppError::notify("telegram", e.without_url()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify("telegram", format!("{status} - {body}")));
        }

        log::info!("Telegram message sent");
        Ok(())
    }
}

#[async_trait]
impl Broadcaster for TelegramNotifier {
    fn channel(&self) -> &'static str {
        "telegram"
    }

    async fn broadcast(&self, message: &Notification) -> DeliveryStats {
        let mut stats = DeliveryStats::default();
        let Some(chat_id) = self.chat_id.as_deref() else {
            log::warn!("Telegram broadcast skipped: no chat id configured");
            return stats;
        };

        let result = Notifier::send(self, message, chat_id).await;
        if let Err(e) = &result {
            log::error!("Telegram delivery failed: {}", e);
        }
        stats.record(result.is_ok());
        stats
    }
}

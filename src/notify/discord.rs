//! Discord bot delivery.
//!
//! Broadcasting posts to every text channel, in every guild the bot has
//! joined, whose name contains one of the configured announcement keywords.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::{Broadcaster, Notification, Notifier};
use crate::error::{AppError, Result};
use crate::models::{DeliveryStats, DiscordConfig};
use crate::utils::text::truncate_graphemes;

/// Discord rejects message content longer than this.
const MAX_CONTENT: usize = 2000;

/// Channel type id of guild text channels.
const GUILD_TEXT: u8 = 0;

#[derive(Deserialize)]
struct Guild {
    id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Channel {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

#[derive(Serialize)]
struct CreateMessage<'a> {
    content: &'a str,
}

#[derive(Clone)]
pub struct DiscordNotifier {
    client: Client,
    token: String,
    api_base: String,
    keywords: Vec<String>,
}

impl DiscordNotifier {
    pub fn new(client: Client, token: impl Into<String>, config: &DiscordConfig) -> Self {
        Self {
            client,
            token: token.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            keywords: config
                .channel_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
        }
    }

    fn auth(&self) -> String {
        format!("Bot {}", self.token)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.api_base, path);
        let value = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(value)
    }

    /// Ids of the guilds the bot belongs to.
    pub async fn guilds(&self) -> Result<Vec<String>> {
        let guilds: Vec<Guild> = self.get_json("/users/@me/guilds").await?;
        Ok(guilds.into_iter().map(|g| g.id).collect())
    }

    /// Text channels of a guild.
    pub async fn text_channels(&self, guild_id: &str) -> Result<Vec<Channel>> {
        let channels: Vec<Channel> = self
            .get_json(&format!("/guilds/{guild_id}/channels"))
            .await?;
        Ok(channels
            .into_iter()
            .filter(|c| c.kind == GUILD_TEXT)
            .collect())
    }

    /// Whether a channel name marks an announcement channel.
    pub fn is_announcement_channel(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.keywords.iter().any(|k| name.contains(k.as_str()))
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn channel(&self) -> &'static str {
        "discord"
    }

    async fn send(&self, message: &Notification, target: &str) -> Result<()> {
        let content = truncate_graphemes(&message.text, MAX_CONTENT);
        let url = format!("{}/channels/{}/messages", self.api_base, target);

        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.auth())
            .json(&CreateMessage { content: &content })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::notify("discord", format!("{status} - {body}")));
        }

        log::info!("Discord message sent (channel: {})", target);
        Ok(())
    }
}

#[async_trait]
impl Broadcaster for DiscordNotifier {
    fn channel(&self) -> &'static str {
        "discord"
    }

    async fn broadcast(&self, message: &Notification) -> DeliveryStats {
        let mut stats = DeliveryStats::default();

        let guilds = match self.guilds().await {
            Ok(guilds) => guilds,
            Err(e) => {
                log::error!("Failed to list Discord guilds: {}", e);
                return stats;
            }
        };
        log::info!("Discord bot is in {} guilds", guilds.len());

        for guild_id in guilds {
            let channels = match self.text_channels(&guild_id).await {
                Ok(channels) => channels,
                Err(e) => {
                    log::error!("Failed to list channels of guild {}: {}", guild_id, e);
                    continue;
                }
            };

            for channel in channels
                .iter()
                .filter(|c| self.is_announcement_channel(&c.name))
            {
                let result = Notifier::send(self, message, &channel.id).await;
                if let Err(e) = &result {
                    log::error!("Discord delivery to #{} failed: {}", channel.name, e);
                }
                stats.record(result.is_ok());
            }
        }
        stats
    }
}

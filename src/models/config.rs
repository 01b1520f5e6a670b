//! Application configuration structures.

use std::fs;
use std::path::Path;

use regex::Regex;
use scraper::Selector;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP client settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Notice list page and how to read it
    #[serde(default)]
    pub board: BoardConfig,

    /// Notice detail page selectors
    #[serde(default)]
    pub content: ContentConfig,

    /// Seen-notice history
    #[serde(default)]
    pub history: HistoryConfig,

    /// Summary generation
    #[serde(default)]
    pub summarizer: SummarizerConfig,

    /// SMTP delivery
    #[serde(default)]
    pub email: EmailConfig,

    /// Discord announcement broadcast
    #[serde(default)]
    pub discord: DiscordConfig,

    /// Telegram broadcast
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Subscriber list
    #[serde(default)]
    pub subscribers: SubscribersConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.board.limit == 0 {
            return Err(AppError::validation("board.limit must be > 0"));
        }
        if self.history.max_entries == 0 {
            return Err(AppError::validation("history.max_entries must be > 0"));
        }
        if self.summarizer.max_length == 0 {
            return Err(AppError::validation("summarizer.max_length must be > 0"));
        }
        if !self.board.article_url_template.contains("{id}") {
            return Err(AppError::validation(
                "board.article_url_template must contain {id}",
            ));
        }

        url::Url::parse(&self.board.url)?;

        for selector in [&self.board.row_selector]
            .into_iter()
            .chain(self.content.selectors())
        {
            parse_selector(selector)?;
        }

        for pattern in self
            .board
            .title_remove_patterns
            .iter()
            .chain(std::iter::once(&self.board.article_id_pattern))
        {
            compile_regex(pattern)?;
        }

        if self.telegram.enabled && self.telegram.chat_id.is_none() {
            return Err(AppError::validation(
                "telegram.enabled requires telegram.chat_id (or TELEGRAM_CHAT_ID)",
            ));
        }
        Ok(())
    }
}

/// Parse a CSS selector, mapping the error into `AppError`.
pub fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Compile a regular expression, mapping the error into `AppError`.
pub fn compile_regex(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AppError::config(format!("invalid regex '{pattern}': {e}")))
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Notice list page settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardConfig {
    /// URL of the notice list page
    #[serde(default = "defaults::board_url")]
    pub url: String,

    /// CSS selector for notice rows
    #[serde(default = "defaults::row_selector")]
    pub row_selector: String,

    /// Rows carrying this class are pinned notices and are skipped
    #[serde(default = "defaults::pinned_class")]
    pub pinned_class: String,

    /// Cell index of the title link
    #[serde(default = "defaults::title_column")]
    pub title_column: usize,

    /// Cell index of the writer
    #[serde(default = "defaults::writer_column")]
    pub writer_column: usize,

    /// Cell index of the posting date
    #[serde(default = "defaults::date_column")]
    pub date_column: usize,

    /// Maximum number of notices taken from the list
    #[serde(default = "defaults::limit")]
    pub limit: usize,

    /// Regexes removed from titles after whitespace normalisation
    #[serde(default = "defaults::title_remove_patterns")]
    pub title_remove_patterns: Vec<String>,

    /// Regex capturing the article id from a javascript href
    #[serde(default = "defaults::article_id_pattern")]
    pub article_id_pattern: String,

    /// Article URL with an `{id}` placeholder
    #[serde(default = "defaults::article_url_template")]
    pub article_url_template: String,
}

impl BoardConfig {
    /// Minimum number of cells a row must have.
    pub fn min_columns(&self) -> usize {
        self.title_column
            .max(self.writer_column)
            .max(self.date_column)
            + 1
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            url: defaults::board_url(),
            row_selector: defaults::row_selector(),
            pinned_class: defaults::pinned_class(),
            title_column: defaults::title_column(),
            writer_column: defaults::writer_column(),
            date_column: defaults::date_column(),
            limit: defaults::limit(),
            title_remove_patterns: defaults::title_remove_patterns(),
            article_id_pattern: defaults::article_id_pattern(),
            article_url_template: defaults::article_url_template(),
        }
    }
}

/// Notice detail page selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    #[serde(default = "defaults::content_title")]
    pub title_selector: String,
    #[serde(default = "defaults::content_writer")]
    pub writer_selector: String,
    #[serde(default = "defaults::content_date")]
    pub date_selector: String,
    #[serde(default = "defaults::content_modified")]
    pub modified_selector: String,
    #[serde(default = "defaults::content_views")]
    pub views_selector: String,
    #[serde(default = "defaults::content_body")]
    pub body_selector: String,
    #[serde(default = "defaults::content_attachment")]
    pub attachment_selector: String,
}

impl ContentConfig {
    /// All selectors, for validation.
    pub fn selectors(&self) -> impl Iterator<Item = &String> {
        [
            &self.title_selector,
            &self.writer_selector,
            &self.date_selector,
            &self.modified_selector,
            &self.views_selector,
            &self.body_selector,
            &self.attachment_selector,
        ]
        .into_iter()
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            title_selector: defaults::content_title(),
            writer_selector: defaults::content_writer(),
            date_selector: defaults::content_date(),
            modified_selector: defaults::content_modified(),
            views_selector: defaults::content_views(),
            body_selector: defaults::content_body(),
            attachment_selector: defaults::content_attachment(),
        }
    }
}

/// History file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// File name inside the storage directory
    #[serde(default = "defaults::history_file")]
    pub file: String,

    /// Number of notices kept
    #[serde(default = "defaults::max_entries")]
    pub max_entries: usize,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            file: defaults::history_file(),
            max_entries: defaults::max_entries(),
        }
    }
}

/// Summarizer settings. The API key comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "defaults::model")]
    pub model: String,

    /// Maximum summary length in characters
    #[serde(default = "defaults::max_length")]
    pub max_length: usize,

    #[serde(default = "defaults::openai_base")]
    pub api_base: String,

    #[serde(default = "defaults::temperature")]
    pub temperature: f32,
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            model: defaults::model(),
            max_length: defaults::max_length(),
            api_base: defaults::openai_base(),
            temperature: defaults::temperature(),
        }
    }
}

/// SMTP settings. Credentials come from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "defaults::smtp_host")]
    pub host: String,

    #[serde(default = "defaults::smtp_port")]
    pub port: u16,

    /// Sender address; defaults to the SMTP user
    #[serde(default)]
    pub from: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            host: defaults::smtp_host(),
            port: defaults::smtp_port(),
            from: None,
        }
    }
}

/// Discord broadcast settings. The bot token comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::discord_base")]
    pub api_base: String,

    /// Channels whose lowercase name contains one of these receive posts
    #[serde(default = "defaults::channel_keywords")]
    pub channel_keywords: Vec<String>,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: defaults::discord_base(),
            channel_keywords: defaults::channel_keywords(),
        }
    }
}

/// Telegram broadcast settings. The bot token comes from the environment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::telegram_base")]
    pub api_base: String,

    #[serde(default)]
    pub chat_id: Option<String>,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_base: defaults::telegram_base(),
            chat_id: None,
        }
    }
}

/// Subscriber file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscribersConfig {
    #[serde(default = "defaults::subscribers_file")]
    pub file: String,
}

impl Default for SubscribersConfig {
    fn default() -> Self {
        Self {
            file: defaults::subscribers_file(),
        }
    }
}

mod defaults {
    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; notifier/0.1)".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Board defaults
    pub fn board_url() -> String {
        "https://www.gachon.ac.kr/kor/7986/subview.do".into()
    }
    pub fn row_selector() -> String {
        "div.scroll-table > table.board-table.horizon > tbody > tr".into()
    }
    pub fn pinned_class() -> String {
        "notice".into()
    }
    pub fn title_column() -> usize {
        1
    }
    pub fn writer_column() -> usize {
        2
    }
    pub fn date_column() -> usize {
        3
    }
    pub fn limit() -> usize {
        10
    }
    pub fn title_remove_patterns() -> Vec<String> {
        vec![r"\s+N$".into()]
    }
    pub fn article_id_pattern() -> String {
        r"jf_viewArtcl\('kor',\s*'(\d+)'\)".into()
    }
    pub fn article_url_template() -> String {
        "https://www.gachon.ac.kr/bbs/kor/7986/{id}/artclView.do".into()
    }

    // Content defaults
    pub fn content_title() -> String {
        "h2.view-title".into()
    }
    pub fn content_writer() -> String {
        "dl.writer dd".into()
    }
    pub fn content_date() -> String {
        "dl.write dd".into()
    }
    pub fn content_modified() -> String {
        "dl.modify dd".into()
    }
    pub fn content_views() -> String {
        "dl.count dd".into()
    }
    pub fn content_body() -> String {
        "div.view-con".into()
    }
    pub fn content_attachment() -> String {
        "div.view-file a[href*='download']".into()
    }

    // History defaults
    pub fn history_file() -> String {
        "history.json".into()
    }
    pub fn max_entries() -> usize {
        50
    }

    // Summarizer defaults
    pub fn model() -> String {
        "gpt-3.5-turbo".into()
    }
    pub fn max_length() -> usize {
        250
    }
    pub fn openai_base() -> String {
        "https://api.openai.com/v1".into()
    }
    pub fn temperature() -> f32 {
        0.3
    }

    // Delivery defaults
    pub fn smtp_host() -> String {
        "smtp.gmail.com".into()
    }
    pub fn smtp_port() -> u16 {
        587
    }
    pub fn discord_base() -> String {
        "https://discord.com/api/v10".into()
    }
    pub fn channel_keywords() -> Vec<String> {
        vec![
            "공지".into(),
            "announcement".into(),
            "notice".into(),
            "알림".into(),
        ]
    }
    pub fn telegram_base() -> String {
        "https://api.telegram.org".into()
    }

    // Subscriber defaults
    pub fn subscribers_file() -> String {
        "subscribers.json".into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_default_config_ok() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_empty_user_agent() {
        let mut config = Config::default();
        config.crawler.user_agent = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_history_bound() {
        let mut config = Config::default();
        config.history.max_entries = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_selector() {
        let mut config = Config::default();
        config.content.body_selector = "[[invalid".to_string();
        assert!(matches!(
            config.validate(),
            Err(AppError::Selector { .. })
        ));
    }

    #[test]
    fn validate_rejects_template_without_placeholder() {
        let mut config = Config::default();
        config.board.article_url_template = "https://example.com/view".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_requires_telegram_chat() {
        let mut config = Config::default();
        config.telegram.enabled = true;
        assert!(config.validate().is_err());
        config.telegram.chat_id = Some("-100123".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [board]
            limit = 5

            [history]
            file = "seen.json"
            "#,
        )
        .unwrap();

        assert_eq!(config.board.limit, 5);
        assert_eq!(config.board.row_selector, defaults::row_selector());
        assert_eq!(config.history.file, "seen.json");
        assert_eq!(config.history.max_entries, 50);
        assert_eq!(config.summarizer.max_length, 250);
        assert_eq!(config.board.min_columns(), 4);
    }

    #[test]
    fn sample_config_is_valid() {
        let config: Config = toml::from_str(include_str!("../../storage/config.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.board.article_id_pattern, defaults::article_id_pattern());
        assert_eq!(config.board.title_remove_patterns, defaults::title_remove_patterns());
    }
}

// src/services/summarizer.rs

//! Notice summarizers.
//!
//! `OpenAiSummarizer` asks a chat-completions endpoint for a short summary.
//! `ExcerptSummarizer` is used when no API key is configured and simply
//! takes the head of the notice body. Both cap output at `max_length`
//! characters and never fail.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::SummarizerConfig;
use crate::services::Summarizer;
use crate::utils::text::truncate_graphemes;

const SYSTEM_PROMPT: &str = "당신은 대학교 공지사항을 간결하게 요약하는 전문가입니다.";

/// Summary used when summarization fails.
pub fn fallback_summary(title: &str) -> String {
    format!("요약 실패: {title}")
}

fn user_prompt(title: &str, content: &str, max_length: usize) -> String {
    format!(
        "다음 공지사항을 간단하고 명확하게 요약해주세요:\n\n\
         제목: {title}\n\
         내용: {content}\n\n\
         요구사항:\n\
         - 핵심 내용만 추출\n\
         - {max_length}자 이내로 요약\n\
         - 학생들이 알아야 할 중요한 정보 위주로\n\
         - 마감일, 신청기간, 문의처 등 중요 정보 포함\n\
         - 간결하고 읽기 쉽게 작성"
    )
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: usize,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Summarizer backed by the OpenAI chat-completions API.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    http: Client,
    api_key: String,
    config: SummarizerConfig,
}

impl OpenAiSummarizer {
    pub fn new(http: Client, api_key: impl Into<String>, config: SummarizerConfig) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            config,
        }
    }

    async fn request(&self, title: &str, content: &str) -> Result<String> {
        let prompt = user_prompt(title, content, self.config.max_length);
        let body = ChatRequest {
            model: &self.config.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt,
                },
            ],
            max_tokens: self.config.max_length,
            temperature: self.config.temperature,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.api_base.trim_end_matches('/')
        );
        let response: ChatResponse = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .unwrap_or_default())
    }
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, title: &str, content: &str) -> String {
        match self.request(title, content).await {
            Ok(summary) if !summary.is_empty() => {
                let summary = truncate_graphemes(&summary, self.config.max_length);
                log::info!("Summary ready: {} chars", summary.chars().count());
                summary
            }
            Ok(_) => {
                log::warn!("Summarizer returned an empty answer for '{}'", title);
                fallback_summary(title)
            }
            Err(e) => {
                log::error!("Summarizer failed for '{}': {}", title, e);
                fallback_summary(title)
            }
        }
    }
}

/// Summarizer that takes the first `max_length` characters of the body.
#[derive(Debug, Clone)]
pub struct ExcerptSummarizer {
    max_length: usize,
}

impl ExcerptSummarizer {
    pub fn new(max_length: usize) -> Self {
        Self { max_length }
    }
}

#[async_trait]
impl Summarizer for ExcerptSummarizer {
    async fn summarize(&self, title: &str, content: &str) -> String {
        let body = content.trim();
        if body.is_empty() {
            return fallback_summary(title);
        }

        let excerpt = truncate_graphemes(body, self.max_length);
        if excerpt.len() < body.len() {
            format!("{}…", excerpt.trim_end())
        } else {
            excerpt
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_limit() {
        let prompt = user_prompt("제목", "본문", 250);
        assert!(prompt.contains("제목: 제목"));
        assert!(prompt.contains("250자 이내로 요약"));
    }

    #[tokio::test]
    async fn test_excerpt_short_body_kept() {
        let summarizer = ExcerptSummarizer::new(10);
        assert_eq!(summarizer.summarize("t", "  짧은 본문 ").await, "짧은 본문");
    }

    #[tokio::test]
    async fn test_excerpt_long_body_cut() {
        let summarizer = ExcerptSummarizer::new(3);
        assert_eq!(summarizer.summarize("t", "가나다라마").await, "가나다…");
    }

    #[tokio::test]
    async fn test_excerpt_empty_body_falls_back() {
        let summarizer = ExcerptSummarizer::new(3);
        assert_eq!(summarizer.summarize("공지", "   ").await, "요약 실패: 공지");
    }
}

// src/services/notices.rs

//! Notice board crawler.
//!
//! Reads the notice list page and individual notice pages using the
//! configured CSS selectors.

use std::collections::HashSet;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{
    Attachment, BoardConfig, Config, Notice, NoticeContent, compile_regex, parse_selector,
};
use crate::services::NoticeSource;
use crate::utils::http::{create_async_client, fetch_text};
use crate::utils::resolve_url;
use crate::utils::text::{collapse_lines, normalize_whitespace};
use crate::utils::url::{extract_article_id, is_navigable};

/// Compiled selectors for a notice detail page.
#[derive(Debug, Clone)]
struct ContentSelectors {
    title: Selector,
    writer: Selector,
    date: Selector,
    modified: Selector,
    views: Selector,
    body: Selector,
    attachment: Selector,
}

/// Crawler for a single notice board.
#[derive(Debug, Clone)]
pub struct BoardCrawler {
    client: Client,
    board: BoardConfig,
    base_url: Url,
    row_sel: Selector,
    cell_sel: Selector,
    link_sel: Selector,
    content: ContentSelectors,
    title_patterns: Vec<Regex>,
    article_id: Regex,
}

impl BoardCrawler {
    /// Create a crawler with its own HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = create_async_client(&config.crawler)?;
        Self::with_client(client, config)
    }

    /// Create a crawler using an existing HTTP client.
    pub fn with_client(client: Client, config: &Config) -> Result<Self> {
        let board = config.board.clone();
        let content = &config.content;

        let title_patterns = board
            .title_remove_patterns
            .iter()
            .map(|p| compile_regex(p))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            client,
            base_url: Url::parse(&board.url)?,
            row_sel: parse_selector(&board.row_selector)?,
            cell_sel: parse_selector("td")?,
            link_sel: parse_selector("a")?,
            content: ContentSelectors {
                title: parse_selector(&content.title_selector)?,
                writer: parse_selector(&content.writer_selector)?,
                date: parse_selector(&content.date_selector)?,
                modified: parse_selector(&content.modified_selector)?,
                views: parse_selector(&content.views_selector)?,
                body: parse_selector(&content.body_selector)?,
                attachment: parse_selector(&content.attachment_selector)?,
            },
            title_patterns,
            article_id: compile_regex(&board.article_id_pattern)?,
            board,
        })
    }

    /// Parse the notice list page.
    ///
    /// Pinned rows are skipped, the page order is kept, and the result is
    /// unique by URL and at most `limit` long.
    pub fn parse_list(&self, html: &str) -> Vec<Notice> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut notices = Vec::new();

        for row in document.select(&self.row_sel) {
            if notices.len() >= self.board.limit {
                break;
            }
            if self.is_pinned(&row) {
                continue;
            }
            let Some(notice) = self.parse_row(&row) else {
                continue;
            };
            if seen.insert(notice.url.clone()) {
                notices.push(notice);
            }
        }
        notices
    }

    /// Parse a notice detail page.
    pub fn parse_content(&self, html: &str, page_url: &str) -> Result<NoticeContent> {
        let document = Html::parse_document(html);
        let sel = &self.content;

        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .next()
                .map(|el| element_text(&el))
                .filter(|text| !text.is_empty())
        };

        let content = document
            .select(&sel.body)
            .next()
            .map(|el| collapse_lines(&el.text().collect::<Vec<_>>().join("\n")))
            .filter(|text| !text.is_empty());

        let title = first_text(&sel.title);
        if title.is_none() && content.is_none() {
            return Err(AppError::fetch(page_url, "no notice title or body on page"));
        }

        let base = Url::parse(page_url).unwrap_or_else(|_| self.base_url.clone());
        let attachments = document
            .select(&sel.attachment)
            .map(|a| Attachment {
                name: element_text(&a),
                url: resolve_url(&base, a.value().attr("href").unwrap_or("")),
            })
            .collect();

        Ok(NoticeContent {
            title,
            writer: first_text(&sel.writer),
            date: first_text(&sel.date),
            modified_date: first_text(&sel.modified),
            views: first_text(&sel.views),
            content,
            attachments,
        })
    }

    fn is_pinned(&self, row: &ElementRef) -> bool {
        row.value()
            .classes()
            .any(|class| class == self.board.pinned_class)
    }

    fn parse_row(&self, row: &ElementRef) -> Option<Notice> {
        let cells: Vec<ElementRef> = row.select(&self.cell_sel).collect();
        if cells.len() < self.board.min_columns() {
            return None;
        }

        let link = cells[self.board.title_column].select(&self.link_sel).next()?;
        let title = self.clean_title(&element_text(&link));
        if title.is_empty() {
            return None;
        }

        let href = link.value().attr("href").unwrap_or("");
        let url = if let Some(id) = extract_article_id(href, &self.article_id) {
            self.board.article_url_template.replace("{id}", &id)
        } else if is_navigable(href) {
            resolve_url(&self.base_url, href)
        } else {
            return None;
        };

        Some(Notice {
            title,
            url,
            date: element_text(&cells[self.board.date_column]),
            author: element_text(&cells[self.board.writer_column]),
        })
    }

    fn clean_title(&self, raw: &str) -> String {
        let mut title = normalize_whitespace(raw);
        for pattern in &self.title_patterns {
            title = pattern.replace_all(&title, "").into_owned();
        }
        title.trim().to_string()
    }
}

#[async_trait]
impl NoticeSource for BoardCrawler {
    async fn fetch_notice_list(&self) -> Result<Vec<Notice>> {
        let url = self.board.url.as_str();
        let html = fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::collect(format!("{url}: {e}")))?;

        let notices = self.parse_list(&html);
        if notices.is_empty() {
            return Err(AppError::collect(format!(
                "no notices matched '{}' on {}",
                self.board.row_selector, url
            )));
        }

        log::info!("Collected {} notices from {}", notices.len(), url);
        Ok(notices)
    }

    async fn fetch_notice_content(&self, url: &str) -> Result<NoticeContent> {
        let html = fetch_text(&self.client, url)
            .await
            .map_err(|e| AppError::fetch(url, e))?;
        self.parse_content(&html, url)
    }
}

fn element_text(el: &ElementRef) -> String {
    normalize_whitespace(&el.text().collect::<Vec<_>>().join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_PAGE: &str = r#"
        <html><body>
        <div class="scroll-table">
          <table class="board-table horizon">
            <tbody>
              <tr class="notice">
                <td>공지</td>
                <td><a href="javascript:jf_viewArtcl('kor', '100')">고정 공지</a></td>
                <td>총무팀</td><td>2025.07.01</td>
              </tr>
              <tr>
                <td>3</td>
                <td><a href="javascript:jf_viewArtcl('kor', '111776')">  수강신청   안내 N</a></td>
                <td>학사지원팀</td><td>2025.07.21</td>
              </tr>
              <tr>
                <td>2</td>
                <td><a href="/bbs/kor/7986/111700/artclView.do">장학금 신청</a></td>
                <td>장학팀</td><td>2025.07.20</td>
              </tr>
              <tr>
                <td>2</td>
                <td><a href="javascript:jf_viewArtcl('kor', '111776')">중복 행</a></td>
                <td>학사지원팀</td><td>2025.07.21</td>
              </tr>
              <tr><td>짧은 행</td></tr>
              <tr>
                <td>1</td>
                <td><a href="javascript:void(0)">링크 없음</a></td>
                <td>기타</td><td>2025.07.19</td>
              </tr>
            </tbody>
          </table>
        </div>
        </body></html>
    "#;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <h2 class="view-title">수강신청 안내</h2>
          <dl class="writer"><dt>작성자</dt><dd>학사지원팀</dd></dl>
          <dl class="write"><dt>등록일</dt><dd>2025.07.21</dd></dl>
          <dl class="count"><dt>조회수</dt><dd>512</dd></dl>
          <div class="view-con">
            <p>수강신청 기간:   8월 1일 ~ 8월 3일</p>

            <p>문의: 학사지원팀</p>
          </div>
          <div class="view-file">
            <a href="/bbs/kor/download/1">안내문.pdf</a>
            <a href="/other/link">무관한 링크</a>
          </div>
        </body></html>
    "#;

    fn crawler() -> BoardCrawler {
        BoardCrawler::new(&Config::default()).unwrap()
    }

    #[test]
    fn test_parse_list() {
        let notices = crawler().parse_list(LIST_PAGE);

        assert_eq!(notices.len(), 2);
        assert_eq!(notices[0].title, "수강신청 안내");
        assert_eq!(
            notices[0].url,
            "https://www.gachon.ac.kr/bbs/kor/7986/111776/artclView.do"
        );
        assert_eq!(notices[0].author, "학사지원팀");
        assert_eq!(notices[0].date, "2025.07.21");
        assert_eq!(
            notices[1].url,
            "https://www.gachon.ac.kr/bbs/kor/7986/111700/artclView.do"
        );
    }

    #[test]
    fn test_parse_list_respects_limit() {
        let mut config = Config::default();
        config.board.limit = 1;
        let crawler = BoardCrawler::new(&config).unwrap();

        let notices = crawler.parse_list(LIST_PAGE);
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].title, "수강신청 안내");
    }

    #[test]
    fn test_parse_list_unexpected_page() {
        assert!(crawler().parse_list("<html><p>점검 중</p></html>").is_empty());
    }

    #[test]
    fn test_parse_content() {
        let content = crawler()
            .parse_content(DETAIL_PAGE, "https://www.gachon.ac.kr/bbs/kor/7986/1/artclView.do")
            .unwrap();

        assert_eq!(content.title.as_deref(), Some("수강신청 안내"));
        assert_eq!(content.writer.as_deref(), Some("학사지원팀"));
        assert_eq!(content.date.as_deref(), Some("2025.07.21"));
        assert_eq!(content.views.as_deref(), Some("512"));
        assert_eq!(content.modified_date, None);
        assert_eq!(
            content.content.as_deref(),
            Some("수강신청 기간: 8월 1일 ~ 8월 3일\n문의: 학사지원팀")
        );
        assert_eq!(
            content.attachments,
            vec![Attachment {
                name: "안내문.pdf".into(),
                url: "https://www.gachon.ac.kr/bbs/kor/download/1".into(),
            }]
        );
    }

    #[test]
    fn test_parse_content_rejects_empty_page() {
        let result = crawler().parse_content("<html></html>", "https://example.com/1");
        assert!(matches!(result, Err(AppError::Fetch { .. })));
    }
}

//! Notice data structures.

use serde::{Deserialize, Serialize};

/// A notice as it appears in the board list.
///
/// `url` is the identity key: two notices with the same URL are the same
/// notice no matter what the other fields say.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Notice {
    /// Notice title
    pub title: String,

    /// Canonical URL of the notice page
    pub url: String,

    /// Posting date as shown on the board
    #[serde(default)]
    pub date: String,

    /// Posting office or author
    #[serde(default, rename = "writer")]
    pub author: String,
}

impl Notice {
    /// Create a notice with the given title and URL and no metadata.
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            date: String::new(),
            author: String::new(),
        }
    }

    /// Set the posting date.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Set the author.
    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }
}

/// A file attached to a notice page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub url: String,
}

/// Full contents of a notice page.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct NoticeContent {
    pub title: Option<String>,
    pub writer: Option<String>,
    pub date: Option<String>,
    pub modified_date: Option<String>,
    pub views: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl NoticeContent {
    /// Render the text block handed to the summarizer.
    ///
    /// Missing fields are replaced by a placeholder so the summarizer
    /// always sees the same layout.
    pub fn summary_input(&self) -> String {
        fn or<'a>(value: &'a Option<String>, missing: &'a str) -> &'a str {
            value.as_deref().filter(|v| !v.is_empty()).unwrap_or(missing)
        }

        format!(
            "제목: {}\n작성자: {}\n등록일: {}\n조회수: {}\n내용:\n{}\n\n첨부파일: {}개",
            or(&self.title, "제목 없음"),
            or(&self.writer, "작성자 없음"),
            or(&self.date, "날짜 없음"),
            or(&self.views, "조회수 없음"),
            or(&self.content, "내용 없음"),
            self.attachments.len()
        )
    }
}

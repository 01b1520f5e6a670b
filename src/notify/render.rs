//! Builds the aggregated notification for a batch of new notices.

use html_escape::encode_text;

use super::Notification;

/// One summarised notice ready to be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeDigest {
    pub title: String,
    pub url: String,
    pub summary: String,
}

/// Render a batch of digests into a single notification.
///
/// A single notice uses its own title as the subject; several notices get
/// a counting subject and one section each.
pub fn render(items: &[NoticeDigest]) -> Notification {
    match items {
        [single] => Notification {
            subject: single.title.clone(),
            html: html_item(single),
            text: format!(
                "*{}*\n\n{}\n\n🔗 {}",
                escape_markdown(&single.title),
                escape_markdown(&single.summary),
                single.url
            ),
        },
        _ => Notification {
            subject: format!("📢 {}개의 새로운 공지사항이 있어요!", items.len()),
            html: items.iter().map(html_section).collect::<Vec<_>>().join("\n"),
            text: std::iter::once(format!(
                "📢 *{}개의 새로운 공지사항이 있어요!*",
                items.len()
            ))
            .chain(items.iter().map(|item| {
                format!(
                    "📌 *{}*\n{}\n🔗 {}",
                    escape_markdown(&item.title),
                    escape_markdown(&item.summary),
                    item.url
                )
            }))
            .collect::<Vec<_>>()
            .join("\n\n"),
        },
    }
}

fn html_item(item: &NoticeDigest) -> String {
    format!(
        r#"<p style="margin-bottom: 10px;">{}</p>
<p>🔗 링크: <a href="{}" style="color: #3498db; text-decoration: none;">바로가기</a></p>"#,
        encode_text(&item.summary).replace('\n', "<br>"),
        html_escape::encode_double_quoted_attribute(&item.url)
    )
}

fn html_section(item: &NoticeDigest) -> String {
    format!(
        r#"<div style="margin-bottom: 30px; border: 1px solid #ddd; border-radius: 8px; padding: 15px; background-color: #f8f9fa;">
<h3 style="margin: 0 0 15px 0; color: #2c3e50; font-size: 16px; border-bottom: 2px solid #3498db; padding-bottom: 8px;">📌{}</h3>
<div style="color: #34495e; line-height: 1.6;">{}</div>
</div>"#,
        encode_text(&item.title),
        html_item(item)
    )
}

/// Escape characters that legacy Telegram Markdown treats as markup.
fn escape_markdown(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '_' | '*' | '`' | '[') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn digest(n: usize) -> NoticeDigest {
        NoticeDigest {
            title: format!("공지 {n}"),
            url: format!("https://example.com/{n}"),
            summary: format!("요약 {n}"),
        }
    }

    #[test]
    fn test_single_notice_uses_title() {
        let message = render(&[digest(1)]);
        assert_eq!(message.subject, "공지 1");
        assert!(message.html.contains("요약 1"));
        assert!(message.html.contains(r#"href="https://example.com/1""#));
        assert!(message.text.contains("🔗 https://example.com/1"));
    }

    #[test]
    fn test_many_notices_counted() {
        let message = render(&[digest(1), digest(2), digest(3)]);
        assert_eq!(message.subject, "📢 3개의 새로운 공지사항이 있어요!");
        assert_eq!(message.html.matches("📌").count(), 3);
        assert!(message.text.contains("📌 *공지 2*"));
    }

    #[test]
    fn test_html_is_escaped() {
        let message = render(&[NoticeDigest {
            title: "<script>".into(),
            url: "https://example.com/1".into(),
            summary: "a < b\n& c".into(),
        }]);
        assert!(message.html.contains("a &lt; b<br>&amp; c"));
        assert!(!message.html.contains("<script>"));
    }

    #[test]
    fn test_markdown_is_escaped() {
        assert_eq!(escape_markdown("snake_case *x*"), r"snake\_case \*x\*");
    }
}

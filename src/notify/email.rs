//! SMTP email delivery.

use async_trait::async_trait;
use lettre::message::{Mailbox, Message, MultiPart};
use lettre::transport::smtp::{AsyncSmtpTransport, authentication::Credentials};
use lettre::{AsyncTransport, Tokio1Executor};

use super::{Notification, Notifier};
use crate::error::{AppError, Result};
use crate::models::EmailConfig;

const FOOTER: &str = "이 메시지는 공지 알리미 시스템에서 자동으로 전송되었습니다.<br>\
                      구독 해제를 원하시면 웹사이트에서 해제해주세요.";

/// Sends notifications as HTML email over STARTTLS.
pub struct EmailNotifier {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
}

impl EmailNotifier {
    /// Build a notifier for the configured relay.
    ///
    /// The sender defaults to the SMTP user when `from` is not configured.
    pub fn new(config: &EmailConfig, user: &str, password: &str) -> Result<Self> {
        let creds = Credentials::new(user.to_string(), password.to_string());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
            .map_err(AppError::mail)?
            .port(config.port)
            .credentials(creds)
            .build();

        let from = config
            .from
            .as_deref()
            .unwrap_or(user)
            .parse()
            .map_err(AppError::mail)?;

        Ok(Self { mailer, from })
    }

    fn build(&self, message: &Notification, to: Mailbox) -> Result<Message> {
        Message::builder()
            .from(self.from.clone())
            .to(to)
            .subject(message.subject.as_str())
            .multipart(MultiPart::alternative_plain_html(
                message.text.clone(),
                wrap_html(&message.html),
            ))
            .map_err(AppError::mail)
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn channel(&self) -> &'static str {
        "email"
    }

    async fn send(&self, message: &Notification, target: &str) -> Result<()> {
        let to: Mailbox = target.parse().map_err(AppError::mail)?;
        let email = self.build(message, to)?;

        self.mailer.send(email).await.map_err(AppError::mail)?;
        log::info!("Email sent to {}", target);
        Ok(())
    }
}

/// Wrap an HTML fragment in the mail page layout.
pub fn wrap_html(fragment: &str) -> String {
    format!(
        r#"<html>
<body>
<div style="background-color: #f5f5f5; padding: 20px; border-radius: 10px;">
{fragment}
</div>
<hr>
<p style="color: #666; font-size: 12px;">
{FOOTER}
</p>
</body>
</html>"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn notification() -> Notification {
        Notification {
            subject: "공지".into(),
            html: "<p>요약</p>".into(),
            text: "요약".into(),
        }
    }

    #[test]
    fn test_wrap_html_contains_fragment_and_footer() {
        let page = wrap_html("<p>요약</p>");
        assert!(page.starts_with("<html>"));
        assert!(page.contains("<p>요약</p>"));
        assert!(page.contains("자동으로 전송되었습니다"));
    }

    #[test]
    fn test_rejects_bad_sender() {
        let config = EmailConfig {
            from: Some("not an address".into()),
            ..EmailConfig::default()
        };
        assert!(matches!(
            EmailNotifier::new(&config, "user@example.com", "secret"),
            Err(AppError::Mail(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_bad_recipient() {
        let notifier =
            EmailNotifier::new(&EmailConfig::default(), "user@example.com", "secret").unwrap();
        let result = notifier.send(&notification(), "nobody").await;
        assert!(matches!(result, Err(AppError::Mail(_))));
    }

    #[test]
    fn test_builds_message() {
        let notifier =
            EmailNotifier::new(&EmailConfig::default(), "user@example.com", "secret").unwrap();
        let to: Mailbox = "reader@example.com".parse().unwrap();
        let message = notifier.build(&notification(), to).unwrap();

        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("reader@example.com"));
        assert!(raw.contains("user@example.com"));
        assert!(raw.contains("text/html"));
    }
}

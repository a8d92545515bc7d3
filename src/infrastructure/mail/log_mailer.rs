//! Notifier that writes messages to the log

use async_trait::async_trait;
use tracing::info;

use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::DomainError;

/// Development notifier. Messages are logged instead of delivered. The body
/// may carry a reset link, so only its length is logged.
#[derive(Debug, Default, Clone)]
pub struct LogMailer;

impl LogMailer {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LogMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        info!(
            to = %message.to,
            subject = %message.subject,
            body_len = message.body.len(),
            "Email not delivered (log mailer)"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::logging::capture::CapturedLogs;

    #[tokio::test]
    async fn test_send_always_succeeds() {
        let mailer = LogMailer::new();
        let result = mailer
            .send(EmailMessage::new("a@x.com", "Subject", "Body"))
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_body_is_not_logged() {
        let logs = CapturedLogs::default();
        let _guard = logs.install();

        LogMailer::new()
            .send(EmailMessage::new(
                "a@x.com",
                "Recovery",
                "https://dash.test/password/reset/0123456789abcdef",
            ))
            .await
            .unwrap();

        let output = logs.contents();
        assert!(output.contains("a@x.com"));
        assert!(!output.contains("0123456789abcdef"));
    }
}

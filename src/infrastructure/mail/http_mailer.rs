//! Notifier backed by an HTTP email API

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{info, warn};

use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::DomainError;

/// HTTP email provider settings
#[derive(Clone)]
pub struct HttpMailerConfig {
    pub endpoint: String,
    pub api_key: String,
    pub from: String,
    pub timeout: Duration,
}

impl HttpMailerConfig {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        from: impl Into<String>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            from: from.into(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for HttpMailerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpMailerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[hidden]")
            .field("from", &self.from)
            .finish()
    }
}

#[derive(Debug, Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    text: &'a str,
}

/// Sends plaintext email through a JSON HTTP API
#[derive(Debug, Clone)]
pub struct HttpMailer {
    config: HttpMailerConfig,
    http_client: Client,
}

impl HttpMailer {
    pub fn new(config: HttpMailerConfig) -> Result<Self, DomainError> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DomainError::configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }
}

#[async_trait]
impl Notifier for HttpMailer {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        let payload = SendRequest {
            from: &self.config.from,
            to: &message.to,
            subject: &message.subject,
            text: &message.body,
        };

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| DomainError::notifier(format!("Email request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(500)
                .collect();
            warn!(status = status.as_u16(), to = %message.to, "Email delivery rejected");

            let reason = if body.is_empty() {
                format!("Email provider returned status {}", status)
            } else {
                body
            };
            return Err(DomainError::notifier(reason));
        }

        info!(to = %message.to, subject = %message.subject, "Email delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn mailer(server: &MockServer) -> HttpMailer {
        let config = HttpMailerConfig::new(
            format!("{}/send", server.uri()),
            "mail-key",
            "noreply@portfolio.test",
        );
        HttpMailer::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_send_posts_json_with_bearer_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .and(header("authorization", "Bearer mail-key"))
            .and(body_json(json!({
                "from": "noreply@portfolio.test",
                "to": "a@x.com",
                "subject": "Hello",
                "text": "Body"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let result = mailer(&server)
            .send(EmailMessage::new("a@x.com", "Hello", "Body"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_send_failure_carries_provider_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/send"))
            .respond_with(ResponseTemplate::new(422).set_body_string("Mailbox unavailable"))
            .mount(&server)
            .await;

        let result = mailer(&server)
            .send(EmailMessage::new("a@x.com", "Hello", "Body"))
            .await;

        match result {
            Err(DomainError::Notifier { message }) => assert_eq!(message, "Mailbox unavailable"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_debug_hides_api_key() {
        let config = HttpMailerConfig::new("https://mail.test", "secret-key", "a@x.com");
        assert!(!format!("{:?}", config).contains("secret-key"));
    }
}

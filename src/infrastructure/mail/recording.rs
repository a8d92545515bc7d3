//! Notifier test double that keeps every message

use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::notification::{EmailMessage, Notifier};
use crate::domain::DomainError;

#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailMessage>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last(&self) -> Option<EmailMessage> {
        self.sent.lock().unwrap().last().cloned()
    }

    /// Raw reset token from the link in the most recent message
    pub fn last_reset_token(&self) -> Option<String> {
        let message = self.last()?;
        message
            .body
            .split_whitespace()
            .find_map(|word| word.split_once("/password/reset/"))
            .map(|(_, token)| token.to_string())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, message: EmailMessage) -> Result<(), DomainError> {
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

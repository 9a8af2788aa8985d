//! Mock notifier for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::notify::{EmailMessage, NotifyError, Notifier};

/// Mock implementation of the Notifier trait; keeps every message sent.
#[derive(Debug)]
pub struct MockNotifier {
    sent: Arc<RwLock<Vec<EmailMessage>>>,
    /// If set, the next send will fail with this error.
    next_error: Arc<RwLock<Option<NotifyError>>>,
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl MockNotifier {
    /// Create a new mock notifier.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(RwLock::new(Vec::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Get all delivered messages.
    pub async fn sent_messages(&self) -> Vec<EmailMessage> {
        self.sent.read().await.clone()
    }

    /// The first delivered message with the given subject.
    pub async fn find_by_subject(&self, subject: &str) -> Option<EmailMessage> {
        self.sent
            .read()
            .await
            .iter()
            .find(|m| m.subject == subject)
            .cloned()
    }

    /// Configure the next send to fail with the given error.
    pub async fn set_next_error(&self, error: NotifyError) {
        *self.next_error.write().await = Some(error);
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn send(&self, message: &EmailMessage) -> Result<(), NotifyError> {
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        self.sent.write().await.push(message.clone());
        Ok(())
    }
}

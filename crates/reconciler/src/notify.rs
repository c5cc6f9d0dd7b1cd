//! Notification seam toward the messaging front-end.

use async_trait::async_trait;

use crate::error::NotifyError;

/// Trait for delivering new-review notifications to an account's owner.
///
/// Abstracted so the core stays independent of the chat transport; the
/// front-end collaborator supplies the real implementation.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Deliver a notification message to the account owner's chat.
    async fn notify(&self, account_id: i64, text: &str) -> Result<(), NotifyError>;
}

/// Message shown for a delta of newly ingested reviews.
pub fn new_reviews_message(count: u32) -> String {
    format!("📬 Получено новых отзывов: {count}")
}

/// A no-op notifier for tests that discards all notifications.
#[derive(Debug, Clone, Default)]
pub struct NoOpNotifier;

#[async_trait]
impl Notifier for NoOpNotifier {
    async fn notify(&self, _account_id: i64, _text: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// A logging notifier for headless runs that logs all notifications.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn notify(&self, account_id: i64, text: &str) -> Result<(), NotifyError> {
        tracing::info!(account_id, "Notification: {text}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_carries_count() {
        assert_eq!(new_reviews_message(3), "📬 Получено новых отзывов: 3");
    }

    #[tokio::test]
    async fn noop_notifier() {
        NoOpNotifier.notify(1, "test").await.unwrap();
    }

    #[tokio::test]
    async fn logging_notifier() {
        LoggingNotifier.notify(1, "test").await.unwrap();
    }
}

use crate::domain::notification::Notification;
use crate::domain::ports::Notifier;
use crate::error::{PortalError, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::info;

/// Writes every notification to the log instead of an SMTP or SMS provider.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        info!(
            channel = ?notification.channel(),
            to = notification.recipient(),
            subject = %notification.subject(),
            body = %notification.body(),
            "notification"
        );
        Ok(())
    }
}

/// Keeps delivered notifications in memory. Can be switched to fail every
/// delivery to exercise the error path.
#[derive(Debug, Default, Clone)]
pub struct OutboxNotifier {
    sent: Arc<Mutex<Vec<Notification>>>,
    failing: bool,
}

impl OutboxNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// An outbox whose provider is permanently down.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Snapshot of everything delivered so far.
    pub fn sent(&self) -> Vec<Notification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for OutboxNotifier {
    async fn deliver(&self, notification: &Notification) -> Result<()> {
        if self.failing {
            return Err(PortalError::UpstreamFailure(
                "notification provider unavailable".to_string(),
            ));
        }
        self.sent
            .lock()
            .map_err(|_| PortalError::InternalError("outbox lock poisoned".into()))?
            .push(notification.clone());
        Ok(())
    }
}

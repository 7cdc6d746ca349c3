use crate::domain::notification::Notification;
use crate::domain::ports::SharedNotifier;
use std::time::Duration;
use tracing::{debug, error, warn};

/// Best-effort delivery of notifications with a bounded number of attempts.
///
/// Failures are logged and swallowed: a notification never turns a committed
/// grade or payment write into an error for the caller.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: SharedNotifier,
    max_attempts: u32,
    backoff: Duration,
}

impl NotificationDispatcher {
    pub fn new(notifier: SharedNotifier, max_attempts: u32, backoff: Duration) -> Self {
        Self {
            notifier,
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Returns whether the notification was delivered.
    pub async fn dispatch(&self, notification: Notification) -> bool {
        for attempt in 1..=self.max_attempts {
            match self.notifier.deliver(&notification).await {
                Ok(()) => {
                    debug!(
                        channel = ?notification.channel(),
                        recipient = notification.recipient(),
                        attempt,
                        "notification delivered"
                    );
                    return true;
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        channel = ?notification.channel(),
                        attempt,
                        error = %e,
                        "notification delivery failed, retrying"
                    );
                    tokio::time::sleep(self.backoff).await;
                }
                Err(e) => {
                    error!(
                        channel = ?notification.channel(),
                        recipient = notification.recipient(),
                        attempts = self.max_attempts,
                        error = %e,
                        "giving up on notification"
                    );
                }
            }
        }
        false
    }
}

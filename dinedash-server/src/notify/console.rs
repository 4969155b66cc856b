//! Console notifier - logs instead of sending mail

use async_trait::async_trait;

use super::{Notifier, NotifyError};

/// Development channel, used when SMTP is not configured
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError> {
        tracing::info!(
            target: "notify",
            recipient = %recipient,
            subject = %subject,
            body = %body,
            "Notification (console)"
        );
        Ok(())
    }
}

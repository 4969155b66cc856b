//! Notification Dispatcher
//!
//! Fire-and-forget notifications for reservation transitions. The
//! worker consumes routed workflow events and mails the party that did
//! NOT trigger the transition. Delivery failures are logged and never
//! surface to the request that caused the event.

pub mod console;
pub mod email;
pub mod worker;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use console::ConsoleNotifier;
pub use email::EmailNotifier;
pub use worker::NotifyWorker;

use crate::core::config::EmailConfig;

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Invalid address: {0}")]
    Address(#[from] lettre::address::AddressError),

    #[error("Message build failed: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),

    #[error("Transport setup failed: {0}")]
    Setup(String),
}

/// Delivery channel for notifications
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, recipient: &str, subject: &str, body: &str) -> Result<(), NotifyError>;
}

/// Pick the configured channel: SMTP when `USE_SMTP_FOR_EMAIL` is set,
/// console logging otherwise.
pub fn build_notifier(config: &EmailConfig) -> Result<Arc<dyn Notifier>, NotifyError> {
    if config.use_smtp {
        Ok(Arc::new(EmailNotifier::new(config)?))
    } else {
        Ok(Arc::new(ConsoleNotifier))
    }
}

//! Outgoing notifications and failure deduplication.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NotifyError {
    #[error("messaging channel rejected the message: {0}")]
    Rejected(String),

    #[error("messaging channel is unreachable: {0}")]
    Network(String),
}

/// Where notifications go. The destination is fixed when the channel is built.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError>;
}

#[async_trait]
impl<T: MessageChannel + ?Sized> MessageChannel for std::sync::Arc<T> {
    async fn send_message(&self, text: &str) -> Result<(), NotifyError> {
        (**self).send_message(text).await
    }
}

/// What happened to a failure notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureDelivery {
    Sent,
    /// Same text as the last failure sent; not retransmitted.
    Suppressed,
    /// The channel itself failed. Logged only.
    SendFailed(NotifyError),
}

/// Sends notifications and remembers the last failure text sent.
///
/// The last failure is never cleared by a successful cycle: after
/// `A, success, A` only the first `A` is sent. It changes only when a
/// different failure text goes out.
pub struct Notifier<C> {
    channel: C,
    last_error: Option<String>,
}

impl<C: MessageChannel> Notifier<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            last_error: None,
        }
    }

    /// Text of the most recent failure notification delivered, if any.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Send `text` verbatim. Channel errors are logged and returned but
    /// never turned into another notification.
    pub async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        match self.channel.send_message(text).await {
            Ok(()) => {
                info!("Sent notification: {}", text);
                Ok(())
            }
            Err(e) => {
                error!("Failed to send notification {:?}: {}", text, e);
                Err(e)
            }
        }
    }

    /// Send a failure notification unless it repeats the last one sent.
    ///
    /// The remembered text only changes when delivery succeeds, so a failure
    /// that could not be delivered is tried again the next time it occurs.
    pub async fn notify_failure(&mut self, text: &str) -> FailureDelivery {
        if self.last_error.as_deref() == Some(text) {
            warn!("Suppressing repeated failure notification: {}", text);
            return FailureDelivery::Suppressed;
        }

        match self.notify(text).await {
            Ok(()) => {
                self.last_error = Some(text.to_string());
                FailureDelivery::Sent
            }
            Err(e) => FailureDelivery::SendFailed(e),
        }
    }
}

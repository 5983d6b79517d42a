//! The poll cycle: fetch, validate, interpret, notify, sleep.
//!
//! A cycle never ends the loop. Fetch, validation and interpretation errors
//! short-circuit the rest of the cycle and go to the deduplicating failure
//! notifier; the loop then sleeps and polls again.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::{error, info};

use crate::cursor::TimeCursor;
use crate::fetch::{FetchError, ReviewApi};
use crate::notify::{FailureDelivery, MessageChannel, Notifier};
use crate::review::{InterpretationError, StatusCatalog};
use crate::validate::{validate, ValidationError};

/// Default pause between cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(600);

/// Prefix of every failure notification.
pub const FAILURE_PREFIX: &str = "Сбой в работе программы: ";

/// A failure in the fetch, validate or interpret stage of a cycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CycleError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Interpretation(#[from] InterpretationError),
}

impl CycleError {
    /// Text sent to the operator. Deduplication compares this string.
    pub fn operator_message(&self) -> String {
        format!("{}{}", FAILURE_PREFIX, self)
    }

    pub fn stage(&self) -> &'static str {
        match self {
            CycleError::Fetch(_) => "fetch",
            CycleError::Validation(_) => "validate",
            CycleError::Interpretation(_) => "interpret",
        }
    }
}

/// Result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    Completed {
        /// Review items in the response.
        items: usize,
        /// Notifications the channel accepted.
        delivered: usize,
        /// Cursor after the cycle.
        cursor: TimeCursor,
    },
    Failed {
        error: CycleError,
        delivery: FailureDelivery,
    },
}

/// Monitors one homework feed.
///
/// Owns all cross-cycle state: the poll cursor and, through the notifier,
/// the last failure text sent.
pub struct Monitor<A, C> {
    api: A,
    notifier: Notifier<C>,
    catalog: StatusCatalog,
    cursor: TimeCursor,
    poll_interval: Duration,
}

impl<A: ReviewApi, C: MessageChannel> Monitor<A, C> {
    pub fn new(api: A, channel: C, cursor: TimeCursor) -> Self {
        Self {
            api,
            notifier: Notifier::new(channel),
            catalog: StatusCatalog::default(),
            cursor,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn cursor(&self) -> TimeCursor {
        self.cursor
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    pub fn notifier(&self) -> &Notifier<C> {
        &self.notifier
    }

    /// Fetch, validate and interpret. Nothing is sent and the cursor is not
    /// touched here, so an error in any item leaves no partial effects.
    async fn poll(&self) -> Result<(Vec<String>, TimeCursor), CycleError> {
        let payload = self.api.fetch(self.cursor).await?;
        let response = validate(&payload, self.cursor)?;

        let messages = response
            .items
            .iter()
            .map(|item| self.catalog.interpret(item))
            .collect::<Result<Vec<_>, _>>()?;

        Ok((messages, response.next_cursor))
    }

    /// Run one cycle without sleeping.
    pub async fn run_cycle(&mut self) -> CycleOutcome {
        match self.poll().await {
            Ok((messages, next_cursor)) => {
                let mut delivered = 0;
                for message in &messages {
                    // Channel errors are logged inside notify and never escalated.
                    if self.notifier.notify(message).await.is_ok() {
                        delivered += 1;
                    }
                }

                let previous = self.cursor;
                self.cursor.advance(next_cursor);

                info!(
                    items = messages.len(),
                    delivered,
                    from = %previous,
                    cursor = %self.cursor,
                    "Poll cycle complete"
                );

                CycleOutcome::Completed {
                    items: messages.len(),
                    delivered,
                    cursor: self.cursor,
                }
            }
            Err(e) => {
                // Logged on every occurrence, even when the notification is suppressed.
                error!(stage = e.stage(), cursor = %self.cursor, "Poll cycle failed: {}", e);
                let delivery = self.notifier.notify_failure(&e.operator_message()).await;
                CycleOutcome::Failed { error: e, delivery }
            }
        }
    }

    /// Run cycles until `shutdown` completes.
    ///
    /// Shutdown is checked only between cycles: an in-flight cycle always
    /// finishes, and the sleep after it is cut short.
    pub async fn run_until<F>(&mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);

        info!(
            cursor = %self.cursor,
            interval_secs = self.poll_interval.as_secs(),
            "Starting homework status monitor"
        );

        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping monitor");
                    break;
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }
        }
    }

    /// Run cycles forever.
    pub async fn run(&mut self) {
        self.run_until(std::future::pending()).await
    }
}

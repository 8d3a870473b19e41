//! Order-confirmation notifications.
//!
//! Delivery is best-effort: the dispatcher retries transient failures a few
//! times with linear backoff, and the order workflow runs it detached from
//! the response path. A notification that never arrives does not fail, block,
//! or roll back an order.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use thiserror::Error;

use crate::config::WhatsAppConfig;

/// WhatsApp Cloud API base URL.
const BASE_URL: &str = "https://graph.facebook.com/v17.0";

/// Maximum delivery attempts per message.
const MAX_ATTEMPTS: u32 = 3;

/// Base backoff delay; attempt N waits N times this.
const BASE_DELAY: Duration = Duration::from_millis(500);

/// Errors that can occur when sending a notification.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Messaging API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
}

/// Sends one text message to a contact handle. Implemented by
/// [`WhatsAppClient`] in production and by stubs in tests.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Send a single text message, no retries at this layer.
    ///
    /// # Errors
    ///
    /// Returns `NotifyError` on transport failure or a non-success provider
    /// response.
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError>;
}

/// WhatsApp Cloud API client.
#[derive(Clone)]
pub struct WhatsAppClient {
    client: reqwest::Client,
    url: String,
    bearer: String,
}

impl WhatsAppClient {
    /// Create a new WhatsApp client.
    #[must_use]
    pub fn new(config: &WhatsAppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: format!("{BASE_URL}/{}/messages", config.phone_id),
            bearer: config.access_token.expose_secret().to_owned(),
        }
    }
}

#[async_trait]
impl Notifier for WhatsAppClient {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "messaging_product": "whatsapp",
            "to": to,
            "type": "text",
            "text": { "body": body }
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.bearer)
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(())
    }
}

/// Bounded-retry wrapper around a [`Notifier`].
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn Notifier>,
    max_attempts: u32,
    base_delay: Duration,
}

impl NotificationDispatcher {
    /// Create a dispatcher with the production retry envelope
    /// (3 attempts, 500 ms linear backoff).
    #[must_use]
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::with_policy(notifier, MAX_ATTEMPTS, BASE_DELAY)
    }

    /// Create a dispatcher with an explicit retry policy.
    #[must_use]
    pub fn with_policy(notifier: Arc<dyn Notifier>, max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            notifier,
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    /// Send a message, retrying transient failures up to the attempt
    /// ceiling with linear backoff between attempts.
    ///
    /// # Errors
    ///
    /// Returns the last observed error once attempts are exhausted.
    pub async fn send_with_retry(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        let mut last_err = None;

        for attempt in 1..=self.max_attempts {
            match self.notifier.send_text(to, body).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        error = %e,
                        "notification delivery attempt failed"
                    );
                    last_err = Some(e);
                }
            }

            if attempt < self.max_attempts {
                tokio::time::sleep(self.base_delay * attempt).await;
            }
        }

        // max_attempts >= 1, so at least one error was recorded.
        Err(last_err.unwrap_or(NotifyError::Api {
            status: 0,
            message: "no delivery attempt made".to_owned(),
        }))
    }

    /// Fire-and-forget delivery, detached from the caller's response path.
    /// Exhausted retries are logged and dropped.
    pub fn dispatch(&self, to: String, body: String) {
        let dispatcher = self.clone();
        tokio::spawn(async move {
            if let Err(e) = dispatcher.send_with_retry(&to, &body).await {
                tracing::error!(to = %to, error = %e, "order notification failed after retries");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Notifier that fails a fixed number of times before succeeding.
    struct FlakyNotifier {
        failures_before_success: u32,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Notifier for FlakyNotifier {
        async fn send_text(&self, _to: &str, _body: &str) -> Result<(), NotifyError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures_before_success {
                Err(NotifyError::Api {
                    status: 500,
                    message: "transient".to_owned(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn dispatcher(failures: u32, max_attempts: u32) -> (NotificationDispatcher, Arc<FlakyNotifier>) {
        let notifier = Arc::new(FlakyNotifier {
            failures_before_success: failures,
            calls: AtomicU32::new(0),
        });
        let dispatcher = NotificationDispatcher::with_policy(
            Arc::clone(&notifier) as Arc<dyn Notifier>,
            max_attempts,
            Duration::from_millis(1),
        );
        (dispatcher, notifier)
    }

    #[tokio::test]
    async fn test_succeeds_first_try() {
        let (dispatcher, notifier) = dispatcher(0, 3);
        assert!(dispatcher.send_with_retry("123", "hi").await.is_ok());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retries_transient_failures() {
        let (dispatcher, notifier) = dispatcher(2, 3);
        assert!(dispatcher.send_with_retry("123", "hi").await.is_ok());
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhausts_attempts_and_returns_last_error() {
        let (dispatcher, notifier) = dispatcher(10, 3);
        let err = dispatcher
            .send_with_retry("123", "hi")
            .await
            .expect_err("should exhaust");
        assert!(matches!(err, NotifyError::Api { status: 500, .. }));
        assert_eq!(notifier.calls.load(Ordering::SeqCst), 3);
    }
}

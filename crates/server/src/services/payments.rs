//! Khalti wallet payment verification.
//!
//! Wallet payments are verified synchronously against the provider before an
//! order is committed. Verification is deliberately not retried: a failed
//! verification must never silently become a retried success.

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::KhaltiConfig;

/// Khalti verification endpoint.
const VERIFY_URL: &str = "https://khalti.com/api/v2/payment/verify/";

/// Errors that can occur while verifying a payment.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("provider error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Provider responded but did not confirm the payment.
    #[error("payment not confirmed by provider")]
    NotConfirmed,
}

/// A confirmed payment, as attested by the provider.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    /// Provider-side transaction reference (Khalti's `idx`).
    pub reference: String,
}

/// Verifies that a wallet payment actually happened before an order commits.
///
/// Implemented by [`KhaltiClient`] in production and by stubs in tests.
#[async_trait]
pub trait PaymentVerifier: Send + Sync {
    /// Verify a payment proof token against the claimed amount (in the
    /// smallest currency unit).
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::NotConfirmed` when the provider declines,
    /// `PaymentError::Http`/`Api` for transport or provider failures.
    async fn verify(&self, token: &str, amount: i64)
    -> Result<PaymentConfirmation, PaymentError>;
}

/// Khalti wallet verification client.
#[derive(Clone)]
pub struct KhaltiClient {
    client: reqwest::Client,
    auth_header: String,
}

impl KhaltiClient {
    /// Create a new Khalti client.
    #[must_use]
    pub fn new(config: &KhaltiConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            auth_header: format!("Key {}", config.secret_key.expose_secret()),
        }
    }
}

/// Successful verification response body. Khalti confirms with a non-empty
/// transaction `idx`.
#[derive(Debug, Deserialize)]
struct VerifyResponse {
    #[serde(default)]
    idx: Option<String>,
}

#[async_trait]
impl PaymentVerifier for KhaltiClient {
    async fn verify(
        &self,
        token: &str,
        amount: i64,
    ) -> Result<PaymentConfirmation, PaymentError> {
        let response = self
            .client
            .post(VERIFY_URL)
            .header(AUTHORIZATION, &self.auth_header)
            .json(&serde_json::json!({ "token": token, "amount": amount }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: VerifyResponse = response.json().await?;

        match body.idx {
            Some(idx) if !idx.is_empty() => Ok(PaymentConfirmation { reference: idx }),
            _ => Err(PaymentError::NotConfirmed),
        }
    }
}

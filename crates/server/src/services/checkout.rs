//! Stripe hosted-checkout sessions.
//!
//! Card payments never touch the order pipeline directly. The server creates
//! a checkout session for the cart total and redirects the shopper to
//! Stripe's hosted page; order creation for card payments happens out of band.

use secrecy::ExposeSecret;
use serde::Deserialize;
use thiserror::Error;

use crate::config::StripeConfig;

const BASE_URL: &str = "https://api.stripe.com/v1";

/// Errors that can occur while creating a checkout session.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Stripe returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The amount is not chargeable.
    #[error("amount must be positive, got {0}")]
    InvalidAmount(i64),
}

/// A created hosted-checkout session.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSession {
    pub id: String,
    pub url: String,
}

/// Stripe checkout client.
#[derive(Clone)]
pub struct StripeCheckoutClient {
    client: reqwest::Client,
    secret_key: String,
    success_url: String,
    cancel_url: String,
}

impl StripeCheckoutClient {
    /// Create a new Stripe checkout client.
    #[must_use]
    pub fn new(config: &StripeConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            secret_key: config.secret_key.expose_secret().to_owned(),
            success_url: config.success_url.clone(),
            cancel_url: config.cancel_url.clone(),
        }
    }

    /// Create a hosted checkout session charging `amount_minor` (smallest
    /// currency unit) as a single "Food Order" line. Redirect URLs fall back
    /// to the configured defaults when the caller supplies none.
    ///
    /// # Errors
    ///
    /// Returns `CheckoutError::InvalidAmount` for a non-positive amount, and
    /// `CheckoutError::Http`/`Api` for transport or provider failures.
    pub async fn create_session(
        &self,
        amount_minor: i64,
        currency: &str,
        success_url: Option<&str>,
        cancel_url: Option<&str>,
    ) -> Result<CheckoutSession, CheckoutError> {
        if amount_minor <= 0 {
            return Err(CheckoutError::InvalidAmount(amount_minor));
        }

        // Stripe's form encoding for nested fields: line_items[0][field].
        let form: Vec<(&str, String)> = vec![
            ("mode", "payment".to_owned()),
            (
                "success_url",
                success_url.unwrap_or(&self.success_url).to_owned(),
            ),
            (
                "cancel_url",
                cancel_url.unwrap_or(&self.cancel_url).to_owned(),
            ),
            ("payment_method_types[0]", "card".to_owned()),
            ("line_items[0][price_data][currency]", currency.to_owned()),
            (
                "line_items[0][price_data][product_data][name]",
                "Food Order".to_owned(),
            ),
            (
                "line_items[0][price_data][unit_amount]",
                amount_minor.to_string(),
            ),
            ("line_items[0][quantity]", "1".to_owned()),
        ];

        let response = self
            .client
            .post(format!("{BASE_URL}/checkout/sessions"))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(CheckoutError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> StripeCheckoutClient {
        StripeCheckoutClient {
            client: reqwest::Client::new(),
            secret_key: "sk_test".to_owned(),
            success_url: "http://localhost:3000/success".to_owned(),
            cancel_url: "http://localhost:3000/cancel".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_rejects_zero_amount() {
        let err = client()
            .create_session(0, "usd", None, None)
            .await
            .expect_err("zero amount");
        assert!(matches!(err, CheckoutError::InvalidAmount(0)));
    }

    #[tokio::test]
    async fn test_rejects_negative_amount() {
        let err = client()
            .create_session(-500, "usd", None, None)
            .await
            .expect_err("negative amount");
        assert!(matches!(err, CheckoutError::InvalidAmount(-500)));
    }
}

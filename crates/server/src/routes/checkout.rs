//! Hosted checkout-session endpoint for card payments.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    amount: Option<i64>,
    currency: Option<String>,
    #[serde(rename = "successUrl")]
    success_url: Option<String>,
    #[serde(rename = "cancelUrl")]
    cancel_url: Option<String>,
}

/// `POST /api/create-checkout-session` - create a Stripe hosted checkout
/// session for the cart total. 500 when card payments are not configured.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<Json<Value>, AppError> {
    let Some(client) = state.checkout() else {
        tracing::error!("checkout session requested but card payments are not configured");
        return Err(AppError::ProviderUnavailable);
    };

    let Some(amount) = body.amount else {
        return Err(AppError::Payload("missing amount".to_owned()));
    };

    let session = client
        .create_session(
            amount,
            body.currency.as_deref().unwrap_or("usd"),
            body.success_url.as_deref(),
            body.cancel_url.as_deref(),
        )
        .await?;

    Ok(Json(json!({ "id": session.id, "url": session.url })))
}

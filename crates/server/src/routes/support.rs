//! Support message endpoint.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use khaja_core::UserId;

use crate::db::SupportRepository;
use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SupportRequest {
    user_id: Option<UserId>,
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    message: Option<String>,
}

/// `POST /api/support` - persist a support/chat message.
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<SupportRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let id = SupportRepository::new(state.pool())
        .create(
            body.user_id,
            body.name.as_deref(),
            body.phone.as_deref(),
            body.email.as_deref(),
            body.message.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

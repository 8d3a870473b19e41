//! Registration and login endpoints.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::user::UserProfile;
use crate::services::auth::AuthService;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    name: String,
    phone: String,
    password: String,
}

/// `POST /api/register` - create a customer account.
pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if body.name.trim().is_empty() {
        return Err(AppError::Payload("name is required".to_owned()));
    }

    let id = AuthService::new(state.pool())
        .register(&body.name, &body.phone, &body.password)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "success": true, "id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    phone: String,
    password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    success: bool,
    user: UserProfile,
}

/// `POST /api/login` - verify credentials and return the account profile.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = AuthService::new(state.pool())
        .login(&body.phone, &body.password)
        .await?;

    Ok(Json(LoginResponse {
        success: true,
        user: user.into(),
    }))
}

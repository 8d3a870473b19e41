//! HTTP routes and router assembly.

pub mod auth;
pub mod catalog;
pub mod checkout;
pub mod orders;
pub mod support;

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post, put};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(ready))
        .route("/api/orders", post(orders::create).get(orders::list))
        .route("/api/orders/{id}", get(orders::get))
        .route("/api/orders/{id}/status", put(orders::update_status))
        .route("/api/items", get(catalog::list_items).post(catalog::create_item))
        .route(
            "/api/items/{id}",
            put(catalog::update_item).delete(catalog::delete_item),
        )
        .route("/api/categories", get(catalog::list_categories))
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))
        .route("/api/create-checkout-session", post(checkout::create_session))
        .route("/api/support", post(support::create))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Liveness probe.
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Readiness probe; verifies the database answers.
async fn ready(State(state): State<AppState>) -> StatusCode {
    match sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(state.pool())
        .await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

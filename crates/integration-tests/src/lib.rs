//! Integration test harness for Khaja.
//!
//! Tests run against an in-memory `SQLite` database and the real axum
//! router; external providers are replaced with the stubs in this crate.
//!
//! The pool is capped at one connection so every query sees the same
//! in-memory database.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::Value;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;

use khaja_core::{Phone, Role, UserId};
use khaja_server::db::{MIGRATOR, UserRepository};
use khaja_server::routes;
use khaja_server::services::auth::hash_password;
use khaja_server::services::notifications::{Notifier, NotifyError};
use khaja_server::services::payments::{PaymentConfirmation, PaymentError, PaymentVerifier};
use khaja_server::state::AppState;

/// Fresh migrated in-memory database.
pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("connect to in-memory sqlite");

    MIGRATOR.run(&pool).await.expect("run migrations");

    pool
}

/// App state with no payment verifier and no notifications.
pub fn bare_state(pool: SqlitePool) -> AppState {
    AppState::with_services(pool, None, None, None)
}

/// Router over a bare state sharing `pool`.
pub fn test_app(pool: SqlitePool) -> Router {
    routes::router(bare_state(pool))
}

/// Payment verifier stub with a fixed verdict.
pub struct StubVerifier {
    confirm: bool,
    calls: AtomicU32,
}

impl StubVerifier {
    #[must_use]
    pub const fn confirming() -> Self {
        Self {
            confirm: true,
            calls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub const fn declining() -> Self {
        Self {
            confirm: false,
            calls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PaymentVerifier for StubVerifier {
    async fn verify(
        &self,
        _token: &str,
        _amount: i64,
    ) -> Result<PaymentConfirmation, PaymentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.confirm {
            Ok(PaymentConfirmation {
                reference: "stub-idx-001".to_owned(),
            })
        } else {
            Err(PaymentError::NotConfirmed)
        }
    }
}

/// Notifier stub that always fails delivery.
pub struct FailingNotifier {
    calls: AtomicU32,
}

impl FailingNotifier {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            calls: AtomicU32::new(0),
        }
    }

    #[must_use]
    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for FailingNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for FailingNotifier {
    async fn send_text(&self, _to: &str, _body: &str) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(NotifyError::Api {
            status: 503,
            message: "stub outage".to_owned(),
        })
    }
}

/// Notifier stub that records delivered messages.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: std::sync::Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    #[must_use]
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("lock").clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_text(&self, to: &str, body: &str) -> Result<(), NotifyError> {
        self.sent
            .lock()
            .expect("lock")
            .push((to.to_owned(), body.to_owned()));
        Ok(())
    }
}

/// Insert an account directly and return its id.
pub async fn create_user(pool: &SqlitePool, name: &str, phone: &str, role: Role) -> UserId {
    let phone = Phone::parse(phone).expect("valid phone");
    let hash = hash_password("test-password").expect("hash password");

    UserRepository::new(pool)
        .create(name, &phone, &hash, role)
        .await
        .expect("create user")
}

/// Drive one request through the router and parse the JSON response body.
///
/// `user_id` populates the `x-user-id` header when given. An empty response
/// body parses as `Value::Null`.
pub async fn request(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<i64>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(id) = user_id {
        builder = builder.header("x-user-id", id.to_string());
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .expect("build request"),
        None => builder.body(Body::empty()).expect("build request"),
    };

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router response");

    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("JSON body")
    };

    (status, value)
}

/// Count rows in a table.
pub async fn count_rows(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .expect("count rows")
}

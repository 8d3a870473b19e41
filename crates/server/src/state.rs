//! Shared application state.

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::services::checkout::StripeCheckoutClient;
use crate::services::notifications::{NotificationDispatcher, WhatsAppClient};
use crate::services::orders::OrderService;
use crate::services::payments::{KhaltiClient, PaymentVerifier};

/// Shared application state, cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: SqlitePool,
    payment_verifier: Option<Arc<dyn PaymentVerifier>>,
    checkout: Option<StripeCheckoutClient>,
    notifications: Option<NotificationDispatcher>,
}

impl AppState {
    /// Build state from configuration, constructing the provider clients the
    /// config enables.
    #[must_use]
    pub fn new(config: &AppConfig, pool: SqlitePool) -> Self {
        let payment_verifier = config
            .khalti
            .as_ref()
            .map(|c| Arc::new(KhaltiClient::new(c)) as Arc<dyn PaymentVerifier>);
        let checkout = config.stripe.as_ref().map(StripeCheckoutClient::new);
        let notifications = config
            .whatsapp
            .as_ref()
            .map(|c| NotificationDispatcher::new(Arc::new(WhatsAppClient::new(c))));

        Self::with_services(pool, payment_verifier, checkout, notifications)
    }

    /// Build state with explicit service implementations. Used by tests to
    /// inject stubs.
    #[must_use]
    pub fn with_services(
        pool: SqlitePool,
        payment_verifier: Option<Arc<dyn PaymentVerifier>>,
        checkout: Option<StripeCheckoutClient>,
        notifications: Option<NotificationDispatcher>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                pool,
                payment_verifier,
                checkout,
                notifications,
            }),
        }
    }

    /// Database connection pool.
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.inner.pool
    }

    /// Stripe checkout client, when card payments are configured.
    #[must_use]
    pub fn checkout(&self) -> Option<&StripeCheckoutClient> {
        self.inner.checkout.as_ref()
    }

    /// Order workflow service wired to this state's providers.
    #[must_use]
    pub fn order_service(&self) -> OrderService<'_> {
        OrderService::new(
            &self.inner.pool,
            self.inner.payment_verifier.as_ref(),
            self.inner.notifications.as_ref(),
        )
    }
}

//! Order placement and status workflow.
//!
//! This is the one place that sequences validation, payment verification,
//! contact resolution, persistence, and the confirmation notification.
//! Payment is verified before anything is written; the notification runs
//! detached after the commit.

use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::sync::Arc;
use thiserror::Error;

use khaja_core::{ItemId, OrderId, OrderStatus, PaymentMethod, UserId, order_total};

use crate::db::{OrderRepository, RepositoryError, UserRepository};
use crate::models::order::{NewOrder, NewOrderItem};
use crate::services::notifications::NotificationDispatcher;
use crate::services::payments::{PaymentError, PaymentVerifier};

/// Errors that can occur in the order workflow.
#[derive(Debug, Error)]
pub enum OrderError {
    /// The submitted order failed validation.
    #[error("invalid order: {0}")]
    InvalidPayload(String),

    /// The payment method tag is not accepted by this endpoint.
    #[error("unsupported payment method: {0}")]
    UnsupportedPaymentMethod(String),

    /// The matching payment provider is not configured or not reachable.
    #[error("payment provider unavailable")]
    ProviderUnavailable,

    /// The provider declined to confirm the payment.
    #[error("payment not confirmed")]
    PaymentNotConfirmed,

    /// The status value is not an updatable order status.
    #[error("invalid status: {0}")]
    InvalidStatus(String),

    /// The requested status is not the next step from the current one.
    #[error("cannot move order from {from} to {to}")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// No order exists with the given id.
    #[error("order not found")]
    NotFound,

    /// Database error.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// An incoming checkout submission, as the client sent it.
#[derive(Debug, Clone)]
pub struct PlaceOrder {
    pub user_id: Option<UserId>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub address: String,
    pub payment_method: String,
    pub payment_token: Option<String>,
    /// Wallet charge amount in the smallest currency unit (paisa).
    pub amount: Option<i64>,
    pub lines: Vec<PlaceOrderLine>,
}

/// One cart line of a [`PlaceOrder`].
#[derive(Debug, Clone)]
pub struct PlaceOrderLine {
    pub item_id: Option<ItemId>,
    pub qty: i64,
    pub price: Decimal,
}

/// The outcome of a successful placement.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub id: OrderId,
    pub total: Decimal,
}

/// Order placement and admin status updates.
pub struct OrderService<'a> {
    orders: OrderRepository<'a>,
    users: UserRepository<'a>,
    verifier: Option<&'a Arc<dyn PaymentVerifier>>,
    notifications: Option<&'a NotificationDispatcher>,
}

impl<'a> OrderService<'a> {
    /// Create a new order service. `verifier` gates the wallet path and
    /// `notifications` the confirmation message; either may be absent.
    #[must_use]
    pub const fn new(
        pool: &'a SqlitePool,
        verifier: Option<&'a Arc<dyn PaymentVerifier>>,
        notifications: Option<&'a NotificationDispatcher>,
    ) -> Self {
        Self {
            orders: OrderRepository::new(pool),
            users: UserRepository::new(pool),
            verifier,
            notifications,
        }
    }

    /// Place an order: validate, verify payment, resolve contact details,
    /// persist atomically, then fire the confirmation notification.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidPayload` for malformed submissions,
    /// `UnsupportedPaymentMethod` for tags this endpoint does not take,
    /// `ProviderUnavailable`/`PaymentNotConfirmed` for wallet failures, and
    /// `Repository` for database failures. Nothing is written unless the
    /// order commits.
    pub async fn place(&self, submission: PlaceOrder) -> Result<PlacedOrder, OrderError> {
        validate(&submission)?;

        let total = order_total(
            submission
                .lines
                .iter()
                .map(|line| (line.price, line.qty)),
        );

        self.verify_payment(&submission).await?;

        let (guest_name, guest_phone) = self
            .resolve_contact(
                submission.user_id,
                submission.guest_name.clone(),
                submission.guest_phone.clone(),
            )
            .await;

        let new_order = NewOrder {
            user_id: submission.user_id,
            guest_name,
            guest_phone: guest_phone.clone(),
            guest_email: submission.guest_email,
            address: submission.address,
            total,
            items: submission
                .lines
                .into_iter()
                .map(|line| NewOrderItem {
                    item_id: line.item_id,
                    qty: line.qty,
                    price: line.price,
                })
                .collect(),
        };

        let id = self.orders.create(&new_order).await?;

        tracing::info!(order_id = %id, %total, "order placed");

        if let Some(dispatcher) = self.notifications
            && let Some(phone) = guest_phone
        {
            dispatcher.dispatch(
                phone,
                format!("Your order #{id} of Rs. {total} has been placed successfully!"),
            );
        }

        Ok(PlacedOrder { id, total })
    }

    /// Move an order to `target`, which must be the immediate next step in
    /// the pending -> approved -> dispatched -> delivered chain.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::InvalidStatus` for unparsable or non-updatable
    /// targets, `NotFound` for unknown orders, `InvalidTransition` for
    /// skips and reversals, and `Repository` for database failures.
    pub async fn update_status(
        &self,
        id: OrderId,
        target: &str,
    ) -> Result<OrderStatus, OrderError> {
        let target: OrderStatus = target
            .parse()
            .map_err(|_| OrderError::InvalidStatus(target.to_owned()))?;
        if !target.is_updatable_target() {
            return Err(OrderError::InvalidStatus(target.to_string()));
        }

        let Some(current) = self.orders.get_status(id).await? else {
            return Err(OrderError::NotFound);
        };

        if !current.can_transition_to(target) {
            return Err(OrderError::InvalidTransition {
                from: current,
                to: target,
            });
        }

        let updated = self.orders.update_status(id, current, target).await?;
        if updated == 0 {
            // Lost a race: the status moved (or the order vanished) between
            // the read and the conditional write.
            return match self.orders.get_status(id).await? {
                Some(now) => Err(OrderError::InvalidTransition {
                    from: now,
                    to: target,
                }),
                None => Err(OrderError::NotFound),
            };
        }

        tracing::info!(order_id = %id, from = %current, to = %target, "order status updated");

        Ok(target)
    }

    /// Verify the payment claim before anything is persisted.
    async fn verify_payment(&self, submission: &PlaceOrder) -> Result<(), OrderError> {
        let method: PaymentMethod = submission
            .payment_method
            .parse()
            .map_err(|_| {
                OrderError::UnsupportedPaymentMethod(submission.payment_method.clone())
            })?;

        match method {
            PaymentMethod::Cod => Ok(()),
            PaymentMethod::Khalti => {
                let Some(verifier) = self.verifier else {
                    tracing::error!("wallet payment submitted but no verifier is configured");
                    return Err(OrderError::ProviderUnavailable);
                };
                let Some(token) = submission.payment_token.as_deref() else {
                    return Err(OrderError::InvalidPayload(
                        "wallet payments require a payment token".to_owned(),
                    ));
                };
                let Some(amount) = submission.amount else {
                    return Err(OrderError::InvalidPayload(
                        "wallet payments require an amount in paisa".to_owned(),
                    ));
                };

                match verifier.verify(token, amount).await {
                    Ok(confirmation) => {
                        tracing::info!(reference = %confirmation.reference, "wallet payment verified");
                        Ok(())
                    }
                    Err(PaymentError::NotConfirmed) => Err(OrderError::PaymentNotConfirmed),
                    Err(e) => {
                        tracing::error!(error = %e, "wallet verification failed");
                        Err(OrderError::ProviderUnavailable)
                    }
                }
            }
            // Card payments go through the hosted checkout endpoint, never
            // through direct order placement.
            PaymentMethod::Stripe => Err(OrderError::UnsupportedPaymentMethod(
                submission.payment_method.clone(),
            )),
        }
    }

    /// Fill missing contact fields from the owning account. A failed lookup
    /// is logged and ignored; the order still goes through with whatever
    /// contact details the client sent.
    async fn resolve_contact(
        &self,
        user_id: Option<UserId>,
        name: Option<String>,
        phone: Option<String>,
    ) -> (Option<String>, Option<String>) {
        if name.is_some() && phone.is_some() {
            return (name, phone);
        }
        let Some(user_id) = user_id else {
            return (name, phone);
        };

        match self.users.get_by_id(user_id).await {
            Ok(Some(user)) => (
                name.or(Some(user.name)),
                phone.or(Some(user.phone)),
            ),
            Ok(None) => (name, phone),
            Err(e) => {
                tracing::warn!(user_id = %user_id, error = %e, "contact lookup failed");
                (name, phone)
            }
        }
    }
}

/// Fail-fast shape validation of an incoming submission.
fn validate(submission: &PlaceOrder) -> Result<(), OrderError> {
    if submission.user_id.is_none()
        && submission
            .guest_name
            .as_deref()
            .is_none_or(|name| name.trim().is_empty())
    {
        return Err(OrderError::InvalidPayload(
            "a user reference or guest name is required".to_owned(),
        ));
    }
    if submission.address.trim().is_empty() {
        return Err(OrderError::InvalidPayload(
            "delivery address is required".to_owned(),
        ));
    }
    if submission.lines.is_empty() {
        return Err(OrderError::InvalidPayload(
            "order must contain at least one item".to_owned(),
        ));
    }
    for line in &submission.lines {
        if line.qty <= 0 {
            return Err(OrderError::InvalidPayload(format!(
                "quantity must be positive, got {}",
                line.qty
            )));
        }
        if line.price < Decimal::ZERO {
            return Err(OrderError::InvalidPayload(format!(
                "price must not be negative, got {}",
                line.price
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(lines: Vec<PlaceOrderLine>) -> PlaceOrder {
        PlaceOrder {
            user_id: None,
            guest_name: Some("Asha".to_owned()),
            guest_phone: Some("9800000000".to_owned()),
            guest_email: None,
            address: "Patan Durbar Square".to_owned(),
            payment_method: "cod".to_owned(),
            payment_token: None,
            amount: None,
            lines,
        }
    }

    fn line(price: &str, qty: i64) -> PlaceOrderLine {
        PlaceOrderLine {
            item_id: None,
            qty,
            price: price.parse().expect("valid decimal"),
        }
    }

    #[test]
    fn test_validate_accepts_well_formed_submission() {
        assert!(validate(&submission(vec![line("5.50", 2)])).is_ok());
    }

    #[test]
    fn test_validate_rejects_missing_identity() {
        let mut s = submission(vec![line("5.50", 2)]);
        s.user_id = None;
        s.guest_name = None;
        assert!(matches!(validate(&s), Err(OrderError::InvalidPayload(_))));
    }

    #[test]
    fn test_validate_rejects_blank_address() {
        let mut s = submission(vec![line("5.50", 2)]);
        s.address = "   ".to_owned();
        assert!(matches!(validate(&s), Err(OrderError::InvalidPayload(_))));
    }

    #[test]
    fn test_validate_rejects_empty_cart() {
        assert!(matches!(
            validate(&submission(vec![])),
            Err(OrderError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_validate_rejects_zero_quantity() {
        assert!(matches!(
            validate(&submission(vec![line("5.50", 0)])),
            Err(OrderError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        assert!(matches!(
            validate(&submission(vec![line("-1.00", 1)])),
            Err(OrderError::InvalidPayload(_))
        ));
    }
}

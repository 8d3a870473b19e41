//! Order and line-item models.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use khaja_core::{ItemId, OrderId, OrderItemId, OrderStatus, UserId};

/// One checkout transaction.
///
/// `user_name`/`user_phone` come from the joined owning user (when any) and
/// `items` is attached only when the caller asked for it; absent fields are
/// omitted from the serialized form.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    pub id: OrderId,
    pub user_id: Option<UserId>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub address: String,
    pub total: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<OrderItem>>,
}

/// One line within an order.
///
/// `price` is the unit price snapshotted at order time; it is never
/// re-derived from the current catalog. `item_id` goes `None` when the
/// catalog item is later deleted, the snapshot stands on its own.
#[derive(Debug, Clone, Serialize)]
pub struct OrderItem {
    pub id: OrderItemId,
    pub order_id: OrderId,
    pub item_id: Option<ItemId>,
    pub qty: i64,
    pub price: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_name: Option<String>,
}

/// A validated order ready for persistence. Built only by the order
/// workflow, after payment verification and contact resolution.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: Option<UserId>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub address: String,
    pub total: Decimal,
    pub items: Vec<NewOrderItem>,
}

/// A line of a [`NewOrder`].
#[derive(Debug, Clone)]
pub struct NewOrderItem {
    pub item_id: Option<ItemId>,
    pub qty: i64,
    pub price: Decimal,
}

//! Order endpoints.

use axum::Json;
use axum::extract::{Path, State};
use axum_extra::extract::Query;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use khaja_core::{ItemId, OrderId, OrderStatus, UserId};

use crate::db::{OrderFilter, OrderRepository};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::models::order::Order;
use crate::services::orders::{PlaceOrder, PlaceOrderLine};
use crate::state::AppState;

/// Checkout submission body. `paymentIntentId` is accepted for client
/// compatibility and ignored.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(rename = "paymentMethod")]
    payment_method: Option<String>,
    #[serde(rename = "paymentToken")]
    payment_token: Option<String>,
    #[serde(rename = "paymentIntentId")]
    #[allow(dead_code)]
    payment_intent_id: Option<String>,
    /// Wallet charge amount, smallest currency unit.
    amount: Option<i64>,
    user_id: Option<UserId>,
    guest_name: Option<String>,
    guest_phone: Option<String>,
    guest_email: Option<String>,
    address: Option<String>,
    #[serde(default)]
    items: Vec<OrderLineRequest>,
}

#[derive(Debug, Deserialize)]
pub struct OrderLineRequest {
    item_id: Option<ItemId>,
    qty: i64,
    price: Decimal,
}

#[derive(Debug, Serialize)]
pub struct CreateOrderResponse {
    success: bool,
    #[serde(rename = "orderId")]
    order_id: OrderId,
    total: Decimal,
}

/// `POST /api/orders` - place an order (cod or wallet).
pub async fn create(
    State(state): State<AppState>,
    Json(body): Json<CreateOrderRequest>,
) -> Result<Json<CreateOrderResponse>, AppError> {
    let submission = PlaceOrder {
        user_id: body.user_id,
        guest_name: body.guest_name,
        guest_phone: body.guest_phone,
        guest_email: body.guest_email,
        address: body.address.unwrap_or_default(),
        // Absent method means cash on delivery.
        payment_method: body.payment_method.unwrap_or_else(|| "cod".to_owned()),
        payment_token: body.payment_token,
        amount: body.amount,
        lines: body
            .items
            .into_iter()
            .map(|line| PlaceOrderLine {
                item_id: line.item_id,
                qty: line.qty,
                price: line.price,
            })
            .collect(),
    };

    let placed = state.order_service().place(submission).await?;

    Ok(Json(CreateOrderResponse {
        success: true,
        order_id: placed.id,
        total: placed.total,
    }))
}

/// Order list query. `status` may be repeated or comma-separated;
/// `include_items` takes `1` or `true`.
#[derive(Debug, Default, Deserialize)]
pub struct ListOrdersQuery {
    #[serde(default)]
    status: Vec<String>,
    user_id: Option<UserId>,
    include_items: Option<String>,
}

/// `GET /api/orders` - list orders newest-first.
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<Json<Vec<Order>>, AppError> {
    let mut statuses: Vec<OrderStatus> = Vec::new();
    for entry in &query.status {
        for part in entry.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let status = part
                .parse()
                .map_err(|_| AppError::Payload(format!("invalid status: {part}")))?;
            statuses.push(status);
        }
    }

    let include_items = query
        .include_items
        .as_deref()
        .is_some_and(|v| v == "1" || v == "true");

    let filter = OrderFilter {
        statuses,
        user_id: query.user_id,
        include_items,
    };

    let orders = OrderRepository::new(state.pool()).list(&filter).await?;

    Ok(Json(orders))
}

/// `GET /api/orders/{id}` - fetch one order with its line items.
pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
) -> Result<Json<Order>, AppError> {
    let order = OrderRepository::new(state.pool())
        .get(id)
        .await?
        .ok_or(AppError::NotFound("order"))?;

    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    status: String,
}

/// `PUT /api/orders/{id}/status` - admin-only forward step in the fulfilment
/// chain.
pub async fn update_status(
    RequireAdmin(_admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    Json(body): Json<UpdateStatusRequest>,
) -> Result<Json<Value>, AppError> {
    let status = state
        .order_service()
        .update_status(id, &body.status)
        .await?;

    Ok(Json(json!({ "success": true, "status": status })))
}

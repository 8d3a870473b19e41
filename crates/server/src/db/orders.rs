//! Order repository.
//!
//! Persistence for orders and their line items. The order row and its lines
//! are written inside one transaction so a failure between the two inserts
//! can never leave an order with zero items.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use khaja_core::{ItemId, OrderId, OrderItemId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::order::{NewOrder, Order, OrderItem};

/// Filter for listing orders.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Match any of these statuses (empty = all statuses).
    pub statuses: Vec<OrderStatus>,
    /// Match a single owning user.
    pub user_id: Option<UserId>,
    /// Attach line items to each order (one batched query, no N+1).
    pub include_items: bool,
}

/// Raw order row as selected; decimals and statuses live as text in `SQLite`
/// and are validated on the way out.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: Option<i64>,
    guest_name: Option<String>,
    guest_phone: Option<String>,
    guest_email: Option<String>,
    address: String,
    total: String,
    status: String,
    created_at: DateTime<Utc>,
    user_name: Option<String>,
    user_phone: Option<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: i64,
    order_id: i64,
    item_id: Option<i64>,
    qty: i64,
    price: String,
    item_name: Option<String>,
}

const SELECT_ORDER: &str = "\
    SELECT o.id, o.user_id, o.guest_name, o.guest_phone, o.guest_email, \
           o.address, o.total, o.status, o.created_at, \
           u.name AS user_name, u.phone AS user_phone \
    FROM orders o \
    LEFT JOIN users u ON o.user_id = u.id";

const SELECT_ITEMS: &str = "\
    SELECT oi.id, oi.order_id, oi.item_id, oi.qty, oi.price, \
           i.name AS item_name \
    FROM order_items oi \
    LEFT JOIN items i ON oi.item_id = i.id";

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let total = parse_decimal(&row.total, "orders.total")?;
        let status: OrderStatus = row.status.parse().map_err(|e: String| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;

        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            guest_name: row.guest_name,
            guest_phone: row.guest_phone,
            guest_email: row.guest_email,
            address: row.address,
            total,
            status,
            created_at: row.created_at,
            user_name: row.user_name,
            user_phone: row.user_phone,
            items: None,
        })
    }
}

impl TryFrom<OrderItemRow> for OrderItem {
    type Error = RepositoryError;

    fn try_from(row: OrderItemRow) -> Result<Self, Self::Error> {
        let price = parse_decimal(&row.price, "order_items.price")?;

        Ok(Self {
            id: OrderItemId::new(row.id),
            order_id: OrderId::new(row.order_id),
            item_id: row.item_id.map(ItemId::new),
            qty: row.qty,
            price,
            item_name: row.item_name,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist an order and its line items atomically.
    ///
    /// The order is inserted with status `pending`; line items reference the
    /// freshly assigned order id. Both inserts share one transaction.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails; nothing
    /// is persisted in that case.
    pub async fn create(&self, new_order: &NewOrder) -> Result<OrderId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "INSERT INTO orders \
             (user_id, guest_name, guest_phone, guest_email, address, total, status, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .bind(new_order.user_id.map(|id| id.as_i64()))
        .bind(new_order.guest_name.as_deref())
        .bind(new_order.guest_phone.as_deref())
        .bind(new_order.guest_email.as_deref())
        .bind(new_order.address.as_str())
        .bind(new_order.total.to_string())
        .bind(OrderStatus::Pending.to_string())
        .bind(Utc::now())
        .execute(&mut *tx)
        .await?;

        let order_id = OrderId::new(result.last_insert_rowid());

        for line in &new_order.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, item_id, qty, price) \
                 VALUES (?1, ?2, ?3, ?4)",
            )
            .bind(order_id.as_i64())
            .bind(line.item_id.map(|id| id.as_i64()))
            .bind(line.qty)
            .bind(line.price.to_string())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(order_id)
    }

    /// Fetch one order by id, with its line items attached.
    ///
    /// Returns `Ok(None)` when the order does not exist; database failures
    /// are errors, not "not found".
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails, or
    /// `RepositoryError::DataCorruption` if a stored decimal or status is
    /// unparsable.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("{SELECT_ORDER} WHERE o.id = ?1"))
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut order = Order::try_from(row)?;

        let item_rows: Vec<OrderItemRow> =
            sqlx::query_as(&format!("{SELECT_ITEMS} WHERE oi.order_id = ?1"))
                .bind(id.as_i64())
                .fetch_all(self.pool)
                .await?;

        let items = item_rows
            .into_iter()
            .map(OrderItem::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        order.items = Some(items);

        Ok(Some(order))
    }

    /// Fetch only an order's current status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure or
    /// `RepositoryError::DataCorruption` for an unparsable stored status.
    pub async fn get_status(
        &self,
        id: OrderId,
    ) -> Result<Option<OrderStatus>, RepositoryError> {
        let status: Option<String> =
            sqlx::query_scalar("SELECT status FROM orders WHERE id = ?1")
                .bind(id.as_i64())
                .fetch_optional(self.pool)
                .await?;

        status
            .map(|s| {
                s.parse().map_err(|e: String| {
                    RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
                })
            })
            .transpose()
    }

    /// List orders newest-first, optionally filtered by status set and/or
    /// owning user, optionally with line items attached.
    ///
    /// Item attachment is a single batched `IN` query grouped in memory by
    /// order id, one round trip for N orders.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` on query failure or
    /// `RepositoryError::DataCorruption` for unparsable stored data.
    pub async fn list(&self, filter: &OrderFilter) -> Result<Vec<Order>, RepositoryError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_ORDER);

        let mut has_where = false;
        if !filter.statuses.is_empty() {
            qb.push(" WHERE o.status IN (");
            {
                let mut separated = qb.separated(", ");
                for status in &filter.statuses {
                    separated.push_bind(status.to_string());
                }
            }
            qb.push(")");
            has_where = true;
        }
        if let Some(user_id) = filter.user_id {
            qb.push(if has_where { " AND " } else { " WHERE " });
            qb.push("o.user_id = ");
            qb.push_bind(user_id.as_i64());
        }
        qb.push(" ORDER BY o.id DESC");

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut orders = rows
            .into_iter()
            .map(Order::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        if filter.include_items && !orders.is_empty() {
            let mut grouped = self.fetch_items_for(&orders).await?;
            for order in &mut orders {
                order.items = Some(grouped.remove(&order.id).unwrap_or_default());
            }
        }

        Ok(orders)
    }

    /// Move an order's status from `from` to `to` in one conditional
    /// update, so a concurrent transition cannot overwrite the same stale
    /// status twice.
    ///
    /// Returns the number of affected rows; zero means the order id is
    /// unknown or its status is no longer `from`, and nothing was written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update_status(
        &self,
        id: OrderId,
        from: OrderStatus,
        to: OrderStatus,
    ) -> Result<u64, RepositoryError> {
        let result = sqlx::query("UPDATE orders SET status = ?1 WHERE id = ?2 AND status = ?3")
            .bind(to.to_string())
            .bind(id.as_i64())
            .bind(from.to_string())
            .execute(self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Batched line-item lookup for a set of orders, grouped by order id.
    async fn fetch_items_for(
        &self,
        orders: &[Order],
    ) -> Result<HashMap<OrderId, Vec<OrderItem>>, RepositoryError> {
        let mut qb = QueryBuilder::<Sqlite>::new(SELECT_ITEMS);
        qb.push(" WHERE oi.order_id IN (");
        {
            let mut separated = qb.separated(", ");
            for order in orders {
                separated.push_bind(order.id.as_i64());
            }
        }
        qb.push(")");

        let rows: Vec<OrderItemRow> = qb.build_query_as().fetch_all(self.pool).await?;

        let mut grouped: HashMap<OrderId, Vec<OrderItem>> = HashMap::new();
        for row in rows {
            let item = OrderItem::try_from(row)?;
            grouped.entry(item.order_id).or_default().push(item);
        }

        Ok(grouped)
    }
}

/// Parse a stored decimal string, mapping failure to `DataCorruption`.
fn parse_decimal(raw: &str, field: &str) -> Result<Decimal, RepositoryError> {
    raw.parse().map_err(|e| {
        RepositoryError::DataCorruption(format!("invalid decimal in {field}: {e}"))
    })
}

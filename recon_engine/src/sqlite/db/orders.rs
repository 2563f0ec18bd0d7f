use log::{debug, trace};
use sqlx::{QueryBuilder, SqliteConnection};

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{NewOrder, Order, OrderId, OrderNumber, OrderStatus},
    traits::ReconciliationError,
};

/// Inserts a new order row using the given connection. Not atomic on its own; embed the call in a
/// transaction and pass `&mut *tx` to pair it with the initial ledger entry.
pub async fn insert_order(
    order: NewOrder,
    number: &OrderNumber,
    intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Order, ReconciliationError> {
    let items = serde_json::to_string(&order.items)
        .map_err(|e| ReconciliationError::DatabaseError(format!("Could not serialize line items: {e}")))?;
    let order: Order = sqlx::query_as(
        r#"
            INSERT INTO orders (
                order_number,
                payment_intent_id,
                currency,
                subtotal,
                shipping,
                total,
                customer_name,
                customer_email,
                customer_phone,
                shipping_address,
                items
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *;
        "#,
    )
    .bind(number.as_str())
    .bind(intent_id)
    .bind(order.currency)
    .bind(order.subtotal)
    .bind(order.shipping)
    .bind(order.total)
    .bind(order.customer.name)
    .bind(order.customer.email)
    .bind(order.customer.phone)
    .bind(order.customer.shipping_address)
    .bind(items)
    .fetch_one(conn)
    .await?;
    debug!("📝️ Order {} inserted with id {}", order.order_number, order.id);
    Ok(order)
}

pub async fn fetch_order_by_id(id: OrderId, conn: &mut SqliteConnection) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_order_by_intent_id(
    intent_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE payment_intent_id = $1").bind(intent_id).fetch_optional(conn).await
}

pub async fn fetch_order_by_number(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM orders WHERE order_number = $1").bind(number.as_str()).fetch_optional(conn).await
}

pub async fn order_number_exists(
    number: &OrderNumber,
    conn: &mut SqliteConnection,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM orders WHERE order_number = $1").bind(number.as_str()).fetch_optional(conn).await?;
    Ok(row.is_some())
}

/// The conditional write at the heart of reconciliation: the status is set only if it still has
/// the value the caller observed. A `None` result means another caller got there first (or the
/// order vanished); nothing was changed.
pub(crate) async fn conditional_status_update(
    id: OrderId,
    expected: OrderStatus,
    new_status: OrderStatus,
    conn: &mut SqliteConnection,
) -> Result<Option<Order>, ReconciliationError> {
    let result: Option<Order> = sqlx::query_as(
        "UPDATE orders SET status = $1, updated_at = CURRENT_TIMESTAMP WHERE id = $2 AND status = $3 RETURNING *",
    )
    .bind(new_status.to_string())
    .bind(id)
    .bind(expected.to_string())
    .fetch_optional(conn)
    .await?;
    Ok(result)
}

/// Fetches orders according to the criteria in the `OrderQueryFilter`, ordered by `created_at`
/// ascending.
pub async fn search_orders(query: OrderQueryFilter, conn: &mut SqliteConnection) -> Result<Vec<Order>, sqlx::Error> {
    let mut builder = QueryBuilder::new("SELECT * FROM orders ");
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(number) = query.order_number {
        where_clause.push("order_number = ");
        where_clause.push_bind_unseparated(number.as_str().to_string());
    }
    if let Some(email) = query.customer_email {
        where_clause.push("customer_email = ");
        where_clause.push_bind_unseparated(email);
    }
    if let Some(currency) = query.currency {
        where_clause.push("currency = ");
        where_clause.push_bind_unseparated(currency);
    }
    if query.status.as_ref().map(|s| !s.is_empty()).unwrap_or(false) {
        let statuses =
            query.status.as_ref().unwrap().iter().map(|s| format!("'{s}'")).collect::<Vec<_>>().join(",");
        where_clause.push(format!("status IN ({statuses})"));
    }
    if let Some(since) = query.since {
        where_clause.push("created_at >= ");
        where_clause.push_bind_unseparated(since);
    }
    if let Some(until) = query.until {
        where_clause.push("created_at <= ");
        where_clause.push_bind_unseparated(until);
    }
    builder.push(" ORDER BY created_at ASC");
    trace!("📝️ Executing query: {}", builder.sql());
    let orders = builder.build_query_as::<Order>().fetch_all(conn).await?;
    trace!("📝️ search_orders returned {} orders", orders.len());
    Ok(orders)
}

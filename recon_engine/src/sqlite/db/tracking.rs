//! The tracking ledger. Insert and select only: no UPDATE or DELETE exists against
//! `tracking_events`, in this module or anywhere else.

use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{EventKind, OrderId, OrderStatus, TrackingEvent},
    traits::ReconciliationError,
};

/// Appends a `StatusChange` entry recording the status an order has just reached.
pub async fn append_status_event(
    order_id: OrderId,
    status: OrderStatus,
    title: &str,
    description: &str,
    conn: &mut SqliteConnection,
) -> Result<TrackingEvent, ReconciliationError> {
    let event: TrackingEvent = sqlx::query_as(
        r#"
            INSERT INTO tracking_events (order_id, kind, status, title, description)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(EventKind::StatusChange.to_string())
    .bind(status.to_string())
    .bind(title)
    .bind(description)
    .fetch_one(conn)
    .await?;
    debug!("🧾️ Ledger entry {} appended for order {order_id}: {title}", event.id);
    Ok(event)
}

/// Appends an `Informational` entry. Carries no status; optionally records a location and a
/// carrier tracking number.
pub async fn append_info_event(
    order_id: OrderId,
    title: &str,
    description: &str,
    location: Option<String>,
    tracking_number: Option<String>,
    conn: &mut SqliteConnection,
) -> Result<TrackingEvent, ReconciliationError> {
    let event: TrackingEvent = sqlx::query_as(
        r#"
            INSERT INTO tracking_events (order_id, kind, title, description, location, tracking_number)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(EventKind::Informational.to_string())
    .bind(title)
    .bind(description)
    .bind(location)
    .bind(tracking_number)
    .fetch_one(conn)
    .await?;
    debug!("🧾️ Informational ledger entry {} appended for order {order_id}", event.id);
    Ok(event)
}

/// The full ledger for an order, oldest first. Ties on `created_at` (same-second inserts) break
/// on insertion order.
pub async fn events_for_order(
    order_id: OrderId,
    conn: &mut SqliteConnection,
) -> Result<Vec<TrackingEvent>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM tracking_events WHERE order_id = $1 ORDER BY created_at ASC, id ASC")
        .bind(order_id)
        .fetch_all(conn)
        .await
}

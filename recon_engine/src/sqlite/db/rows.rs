//! Row decoding for the order and ledger types.
//!
//! Orders carry their line items as a JSON snapshot column, so `FromRow` is implemented by hand
//! here instead of derived.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, FromRow, Row};

use crate::db_types::{CustomerInfo, EventKind, Order, OrderStatus, TrackingEvent};

fn decode_err(column: &str, source: impl std::error::Error + Send + Sync + 'static) -> sqlx::Error {
    sqlx::Error::ColumnDecode { index: column.to_string(), source: Box::new(source) }
}

impl FromRow<'_, SqliteRow> for Order {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let items_json: String = row.try_get("items")?;
        let items = serde_json::from_str(&items_json).map_err(|e| decode_err("items", e))?;
        let status: String = row.try_get("status")?;
        let customer = CustomerInfo {
            name: row.try_get("customer_name")?,
            email: row.try_get("customer_email")?,
            phone: row.try_get("customer_phone")?,
            shipping_address: row.try_get("shipping_address")?,
        };
        Ok(Order {
            id: row.try_get("id")?,
            order_number: row.try_get("order_number")?,
            status: OrderStatus::from(status),
            payment_intent_id: row.try_get("payment_intent_id")?,
            currency: row.try_get("currency")?,
            subtotal: row.try_get("subtotal")?,
            shipping: row.try_get("shipping")?,
            total: row.try_get("total")?,
            customer,
            items,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
            updated_at: row.try_get::<DateTime<Utc>, _>("updated_at")?,
        })
    }
}

impl FromRow<'_, SqliteRow> for TrackingEvent {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let kind: String = row.try_get("kind")?;
        let kind = EventKind::from_str(&kind).map_err(|e| decode_err("kind", e))?;
        let status: Option<String> = row.try_get("status")?;
        let status = status
            .map(|s| OrderStatus::from_str(&s).map_err(|e| decode_err("status", e)))
            .transpose()?;
        Ok(TrackingEvent {
            id: row.try_get("id")?,
            order_id: row.try_get("order_id")?,
            kind,
            status,
            title: row.try_get("title")?,
            description: row.try_get("description")?,
            location: row.try_get("location")?,
            tracking_number: row.try_get("tracking_number")?,
            created_at: row.try_get::<DateTime<Utc>, _>("created_at")?,
        })
    }
}

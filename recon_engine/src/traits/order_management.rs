use thiserror::Error;

use crate::{
    api::order_objects::OrderQueryFilter,
    db_types::{Order, OrderId, OrderNumber, TrackingEvent},
};

#[derive(Debug, Clone, Error)]
pub enum OrderQueryError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("User error constructing query: {0}")]
    QueryError(String),
}

impl From<sqlx::Error> for OrderQueryError {
    fn from(e: sqlx::Error) -> Self {
        OrderQueryError::DatabaseError(e.to_string())
    }
}

/// Read-side queries over orders and their tracking ledgers.
#[allow(async_fn_in_trait)]
pub trait OrderManagement: Clone {
    async fn fetch_order_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderQueryError>;

    /// Resolves a gateway payment-intent identifier to the single order that references it.
    async fn fetch_order_by_intent_id(&self, intent_id: &str) -> Result<Option<Order>, OrderQueryError>;

    async fn fetch_order_by_order_number(&self, number: &OrderNumber) -> Result<Option<Order>, OrderQueryError>;

    /// The order's tracking ledger, ordered by creation time then insertion order.
    async fn events_for_order(&self, id: OrderId) -> Result<Vec<TrackingEvent>, OrderQueryError>;

    /// Fetches orders matching the filter, ordered by `created_at` ascending.
    async fn search_orders(&self, query: OrderQueryFilter) -> Result<Vec<Order>, OrderQueryError>;
}
